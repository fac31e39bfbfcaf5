use std::io::Write as _;

use crate::primitive::Pixel;

/// strlen("PX xxxx xxxx rrggbbaa\n")
pub const MAX_TEXT_LEN: usize = 22;

pub const BINARY_FRAME_LEN: usize = 8;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Encoding {
    /// `PX <x> <y> <rrggbb>\n`
    #[default]
    Text,
    /// `'P'`, x and y as little-endian u16, then r, g, b.
    Binary,
}

impl Encoding {
    pub fn encode(self, px: &Pixel, out: &mut Vec<u8>) {
        match self {
            Encoding::Text => {
                // writing into a Vec never fails
                let _ = writeln!(out, "PX {} {} {}", px.x, px.y, px.color);
            }
            Encoding::Binary => {
                out.extend_from_slice(&[
                    b'P',
                    px.x as u8,
                    (px.x >> 8) as u8,
                    px.y as u8,
                    (px.y >> 8) as u8,
                    px.color.0,
                    px.color.1,
                    px.color.2,
                ]);
            }
        }
    }
}

pub fn text_line(px: &Pixel) -> String {
    format!("PX {} {} {}\n", px.x, px.y, px.color)
}
