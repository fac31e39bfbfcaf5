use core::str::FromStr;
use std::path::{Path, PathBuf};

use anyhow::{bail, ensure, Context as _};

use crate::barnsley::Barnsley;
use crate::mandel::{mandel, mandel_view, Viewport};
use crate::primitive::{Color, Pixel, Rect};

const SQUARE_SIZE: usize = 5;
const NOISE_EXTENT: usize = 512;

/// Side of the raw grayscale images drawn by `file:`.
pub const IMAGE_SIZE: usize = 512;

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// 5×5 yellow square in the top-left corner.
    Square,
    /// A single white pixel at the origin.
    Dot,
    Rect { rect: Rect, color: Color },
    /// Gray disc of radius 10 around (200, 200), darkest at the center.
    Circle,
    /// 256×256 square colored `(x, y, x)`.
    Gradient,
    /// Endless when `count` is `None`.
    Barnsley { count: Option<usize> },
    /// Fixed 1/100 grid without a viewport, 512×512 otherwise.
    Mandel { view: Option<Viewport> },
    /// Endless when `count` is `None`.
    Noise { count: Option<usize> },
    /// Raw 512×512 8-bit grayscale image, row by row.
    File { path: PathBuf },
}

pub const PATTERN_FORMATS: &str = r#"Pattern formats:
    `square`: 5x5 yellow square at the origin
    `dot`: single white pixel at the origin
    `rect:<X> <Y> <W> <H> <RRGGBB>`: filled rectangle
    `circle`: gray disc around (200, 200)
    `gradient`: 256x256 color gradient
    `barnsley[:<COUNT>]`: points of the Barnsley fern (endless without a count)
    `mandel[:<RMIN> <RMAX> <IMIN> <IMAX>]`: Mandelbrot set, optionally a 512x512 view of the given region
    `noise[:<COUNT>]`: random pixels (endless without a count)
    `file:<PATH>`: raw 512x512 grayscale image, one byte per pixel"#;

impl Pattern {
    /// Pixels of this pattern, in drawing order.
    pub fn pixels(&self, rng: fastrand::Rng) -> anyhow::Result<Box<dyn Iterator<Item = Pixel>>> {
        let pixels: Box<dyn Iterator<Item = Pixel>> = match self {
            Pattern::Square => Box::new(fill_columns(Rect::new(0, 0, SQUARE_SIZE, SQUARE_SIZE), Color::YELLOW)),
            Pattern::Dot => Box::new(core::iter::once(Pixel::new(0, 0, Color::WHITE))),
            Pattern::Rect { rect, color } => Box::new(fill_rows(*rect, *color)),
            Pattern::Circle => Box::new(circle(200, 200, 10)),
            Pattern::Gradient => Box::new(gradient(256)),
            Pattern::Barnsley { count } => limit(Barnsley::new(rng), *count),
            Pattern::Mandel { view: None } => Box::new(mandel()),
            Pattern::Mandel { view: Some(view) } => Box::new(mandel_view(*view, IMAGE_SIZE)),
            Pattern::Noise { count } => limit(noise(rng), *count),
            Pattern::File { path } => Box::new(gray_image(load_image(path)?)),
        };
        Ok(pixels)
    }
}

fn limit<I>(pixels: I, count: Option<usize>) -> Box<dyn Iterator<Item = Pixel>>
where
    I: Iterator<Item = Pixel> + 'static,
{
    match count {
        Some(count) => Box::new(pixels.take(count)),
        None => Box::new(pixels),
    }
}

impl FromStr for Pattern {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };

        let count = |arg: Option<&str>| -> anyhow::Result<Option<usize>> {
            arg.map(|arg| arg.trim().parse().with_context(|| format!("invalid point count `{arg}`")))
                .transpose()
        };

        let pattern = match (name, arg) {
            ("square", None) => Pattern::Square,
            ("dot", None) => Pattern::Dot,
            ("circle", None) => Pattern::Circle,
            ("gradient", None) => Pattern::Gradient,
            ("mandel", None) => Pattern::Mandel { view: None },
            ("mandel", Some(arg)) => {
                let view = parse_viewport_arg(arg).with_context(|| format!("bad mandel argument `{arg}`"))?;
                Pattern::Mandel { view: Some(view) }
            }
            ("rect", Some(arg)) => {
                let (rect, color) = parse_rect_arg(arg).with_context(|| format!("bad rect argument `{arg}`"))?;
                Pattern::Rect { rect, color }
            }
            ("rect", None) => bail!("rect requires `<X> <Y> <W> <H> <RRGGBB>`"),
            ("file", Some(path)) if !path.is_empty() => Pattern::File { path: PathBuf::from(path) },
            ("file", _) => bail!("file requires `<PATH>`"),
            ("barnsley", arg) => Pattern::Barnsley { count: count(arg)? },
            ("noise", arg) => Pattern::Noise { count: count(arg)? },
            ("square" | "dot" | "circle" | "gradient", Some(_)) => {
                bail!("pattern `{name}` takes no argument")
            }
            _ => bail!("unknown pattern `{name}`"),
        };

        Ok(pattern)
    }
}

/// Parses `<X> <Y> <W> <H> <RRGGBB>`.
fn parse_rect_arg(arg: &str) -> anyhow::Result<(Rect, Color)> {
    let fields: Vec<&str> = arg.split_whitespace().collect();
    ensure!(fields.len() == 5, "expected 5 fields, got {}", fields.len());

    let mut dims = [0usize; 4];
    for (dim, field) in dims.iter_mut().zip(&fields[..4]) {
        *dim = field.parse().with_context(|| format!("invalid number `{field}`"))?;
    }
    let [x, y, w, h] = dims;
    ensure!(
        x.checked_add(w).is_some() && y.checked_add(h).is_some(),
        "rectangle reaches past the coordinate range"
    );
    let color = Color::from_hex(fields[4])?;

    Ok((Rect::new(x, y, w, h), color))
}

/// Parses `<RMIN> <RMAX> <IMIN> <IMAX>`.
fn parse_viewport_arg(arg: &str) -> anyhow::Result<Viewport> {
    let fields: Vec<&str> = arg.split_whitespace().collect();
    ensure!(fields.len() == 4, "expected 4 fields, got {}", fields.len());

    let mut bounds = [0f64; 4];
    for (bound, field) in bounds.iter_mut().zip(&fields) {
        *bound = field.parse().with_context(|| format!("invalid number `{field}`"))?;
        ensure!(bound.is_finite(), "non-finite bound `{field}`");
    }
    let [rmin, rmax, imin, imax] = bounds;
    ensure!(rmin < rmax && imin < imax, "empty region");

    Ok(Viewport { rmin, rmax, imin, imax })
}

fn load_image(path: &Path) -> anyhow::Result<Vec<u8>> {
    let mut image = std::fs::read(path).with_context(|| format!("couldn't read {}", path.display()))?;
    ensure!(
        image.len() >= IMAGE_SIZE * IMAGE_SIZE,
        "{} holds {} bytes, expected a {IMAGE_SIZE}x{IMAGE_SIZE} grayscale image",
        path.display(),
        image.len()
    );
    image.truncate(IMAGE_SIZE * IMAGE_SIZE);
    Ok(image)
}

/// One gray pixel per byte, row by row.
fn gray_image(image: Vec<u8>) -> impl Iterator<Item = Pixel> {
    image
        .into_iter()
        .enumerate()
        .map(|(i, level)| Pixel::new(i % IMAGE_SIZE, i / IMAGE_SIZE, Color::gray(level)))
}

/// Every pixel of `rect`, column by column.
pub fn fill_columns(rect: Rect, color: Color) -> impl Iterator<Item = Pixel> {
    rect.xs().flat_map(move |x| rect.ys().map(move |y| Pixel::new(x, y, color)))
}

/// Every pixel of `rect`, row by row.
pub fn fill_rows(rect: Rect, color: Color) -> impl Iterator<Item = Pixel> {
    rect.ys().flat_map(move |y| rect.xs().map(move |x| Pixel::new(x, y, color)))
}

/// Disc shaded by squared distance from the center; points left or above the
/// canvas edge are skipped.
pub fn circle(cx: usize, cy: usize, radius: usize) -> impl Iterator<Item = Pixel> {
    let r = radius as isize;
    let r2 = r * r;
    (-r..=r).flat_map(move |dx| {
        (-r..=r).filter_map(move |dy| {
            let dist = dx * dx + dy * dy;
            if dist > r2 {
                return None;
            }
            let x = usize::try_from(cx as isize + dx).ok()?;
            let y = usize::try_from(cy as isize + dy).ok()?;
            let level = if r2 == 0 { 0 } else { (dist * 255 / r2) as u8 };
            Some(Pixel::new(x, y, Color::gray(level)))
        })
    })
}

pub fn gradient(size: usize) -> impl Iterator<Item = Pixel> {
    (0..size).flat_map(move |x| (0..size).map(move |y| Pixel::new(x, y, Color(x as u8, y as u8, x as u8))))
}

pub fn noise(mut rng: fastrand::Rng) -> impl Iterator<Item = Pixel> {
    core::iter::from_fn(move || {
        let x = rng.usize(..NOISE_EXTENT);
        let y = rng.usize(..NOISE_EXTENT);
        Some(Pixel::new(x, y, Color(rng.u8(..), rng.u8(..), rng.u8(..))))
    })
}
