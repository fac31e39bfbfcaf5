use crate::primitive::{Color, Pixel};

const MAX_ITER: usize = 20;
const THRESHOLD: f64 = 100_000.0;

/// Region of the complex plane, real axis first.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub rmin: f64,
    pub rmax: f64,
    pub imin: f64,
    pub imax: f64,
}

/// Iteration at which `z -> z² + c` leaves the threshold, if it does within
/// `max_iter`.
fn escape_time(cr: f64, ci: f64, max_iter: usize, thresh: f64) -> Option<usize> {
    let (mut zr, mut zi) = (0.0f64, 0.0f64);
    for i in 0..max_iter {
        (zr, zi) = (zr * zr - zi * zi + cr, 2.0 * zr * zi + ci);
        if zr * zr + zi * zi > thresh {
            return Some(i);
        }
    }
    None
}

fn shade(cr: f64, ci: f64) -> Color {
    match escape_time(cr, ci, MAX_ITER, THRESHOLD) {
        Some(i) => Color::gray((10 * i).min(255) as u8),
        None => Color::WHITE,
    }
}

/// Escape-time plot of re in [-2, 1] and im in [-1, 1] at a resolution of 1/100,
/// one pixel per sample, positive imaginary axis pointing up.
pub fn mandel() -> impl Iterator<Item = Pixel> {
    (-200i32..=100).flat_map(|i| {
        (-100i32..=100).map(move |j| {
            let x = (i + 200) as usize;
            let y = (100 - j) as usize;
            Pixel::new(x, y, shade(f64::from(i) / 100.0, f64::from(j) / 100.0))
        })
    })
}

/// `view` stretched onto a `size`×`size` square, row by row, imaginary axis
/// pointing up.
pub fn mandel_view(view: Viewport, size: usize) -> impl Iterator<Item = Pixel> {
    let side = size as f64;
    (0..size).flat_map(move |y| {
        (0..size).map(move |x| {
            let cr = view.rmin + (view.rmax - view.rmin) * (x as f64 / side);
            let ci = view.imin + (view.imax - view.imin) * ((size - (y + 1)) as f64 / side);
            Pixel::new(x, y, shade(cr, ci))
        })
    })
}
