/// Drawing surface boundary and colors
use std::fmt;
use std::str::FromStr;

use nalgebra::Point2;
use rand::Rng;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::rgb(rng.gen(), rng.gen(), rng.gen())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Parses `#rrggbb` or the short `#rgb` form.
impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
        match hex.len() {
            6 => Ok(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => Ok(Self::rgb(
                channel(&hex[0..1])? * 17,
                channel(&hex[1..2])? * 17,
                channel(&hex[2..3])? * 17,
            )),
            _ => Err(invalid()),
        }
    }
}

/// A 2D raster surface the scene draws onto. The core never reads it back.
pub trait Canvas {
    fn clear(&mut self, width: f64, height: f64);

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color);

    /// Fill the closed path through `vertices` in order.
    fn fill_path(&mut self, vertices: &[Point2<f64>], color: Color);
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawCommand {
        Clear(f64, f64),
        Rect {
            x: f64,
            y: f64,
            width: f64,
            height: f64,
            color: Color,
        },
        Path(Vec<Point2<f64>>, Color),
    }

    /// Canvas that records every call, for asserting on draw order.
    #[derive(Debug, Default)]
    pub struct RecordingCanvas {
        pub commands: Vec<DrawCommand>,
    }

    impl Canvas for RecordingCanvas {
        fn clear(&mut self, width: f64, height: f64) {
            self.commands.push(DrawCommand::Clear(width, height));
        }

        fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) {
            self.commands.push(DrawCommand::Rect {
                x,
                y,
                width,
                height,
                color,
            });
        }

        fn fill_path(&mut self, vertices: &[Point2<f64>], color: Color) {
            self.commands.push(DrawCommand::Path(vertices.to_vec(), color));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_color_hex_round_trip() {
        let color: Color = "#00ff7f".parse().unwrap();
        assert_eq!(color, Color::rgb(0, 255, 127));
        assert_eq!(color.to_string(), "#00ff7f");
        assert_eq!("#000".parse::<Color>().unwrap(), Color::BLACK);
        assert_eq!("#fff".parse::<Color>().unwrap(), Color::WHITE);
    }

    #[test]
    fn test_color_rejects_garbage() {
        for bad in ["00ff00", "#00ff0", "#gg0000", "#", "#ééé"] {
            assert!(bad.parse::<Color>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_random_colors_are_seedable() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        assert_eq!(Color::random(&mut a), Color::random(&mut b));
    }
}
