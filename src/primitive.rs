use core::fmt;

use anyhow::{ensure, Context as _};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const BLACK: Self = Self(0, 0, 0);
    pub const WHITE: Self = Self(255, 255, 255);
    pub const YELLOW: Self = Self(255, 255, 0);

    pub fn gray(level: u8) -> Self {
        Self(level, level, level)
    }

    /// Parses exactly six hex digits, `rrggbb`.
    pub fn from_hex(s: &str) -> anyhow::Result<Self> {
        ensure!(
            s.len() == 6 && s.bytes().all(|b| b.is_ascii_hexdigit()),
            "invalid color `{s}`: expected six hex digits (rrggbb)"
        );
        let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).context("bad color channel");
        Ok(Self(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Pixel {
    pub x: usize,
    pub y: usize,
    pub color: Color,
}

impl Pixel {
    pub fn new(x: usize, y: usize, color: Color) -> Self {
        Self { x, y, color }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl Rect {
    pub fn new(x: usize, y: usize, w: usize, h: usize) -> Self {
        Self { x, y, w, h }
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.xs().contains(&x) && self.ys().contains(&y)
    }

    pub fn xs(&self) -> std::ops::Range<usize> {
        self.x..(self.x + self.w)
    }

    pub fn ys(&self) -> std::ops::Range<usize> {
        self.y..(self.y + self.h)
    }
}
