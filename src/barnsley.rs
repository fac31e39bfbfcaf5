use crate::primitive::{Color, Pixel};

const FERN_COLOR: Color = Color(200, 200, 40);

/// Endless walk through the Barnsley fern's iterated function system.
pub struct Barnsley {
    x: f64,
    y: f64,
    rng: fastrand::Rng,
}

impl Barnsley {
    pub fn new(rng: fastrand::Rng) -> Self {
        Self { x: 0.0, y: 0.0, rng }
    }

    fn step(&mut self) {
        let (x, y) = (self.x, self.y);
        let num = self.rng.f64();
        let (xn, yn) = if num < 0.01 {
            (0.0, 0.16 * y)
        } else if num < 0.86 {
            (0.85 * x + 0.04 * y, -0.04 * x + 0.85 * y + 1.6)
        } else if num < 0.93 {
            (0.2 * x - 0.26 * y, 0.23 * x + 0.22 * y + 1.6)
        } else {
            (-0.15 * x + 0.28 * y, 0.26 * x + 0.24 * y + 0.44)
        };
        self.x = xn;
        self.y = yn;
    }
}

impl Iterator for Barnsley {
    type Item = Pixel;

    fn next(&mut self) -> Option<Pixel> {
        self.step();
        // the fern stays within x in [-2.2, 2.7], y in [0, 10]
        let x = ((self.x + 5.0) * 50.0).round().max(0.0) as usize;
        let y = (self.y * 50.0).round().max(0.0) as usize;
        Some(Pixel::new(x, y, FERN_COLOR))
    }
}
