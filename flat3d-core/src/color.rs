/// RGB colour with 0-255 channels
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const WHITE: Color = Color::new(255.0, 255.0, 255.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Linear blend towards `other` by `amount`, rounding each channel with
    /// halves going up (so `-0.5` becomes `0`, not `-1`).
    ///
    /// `amount` is not clamped: values outside `[0, 1]` extrapolate.
    pub fn mix(self, other: Color, amount: f64) -> Color {
        let channel = |a: f64, b: f64| (a * (1.0 - amount) + b * amount + 0.5).floor();
        Color {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
        }
    }

    /// Channels saturated into bytes, for pixel buffers and terminals.
    pub fn to_rgb8(self) -> [u8; 3] {
        [
            self.r.clamp(0.0, 255.0) as u8,
            self.g.clamp(0.0, 255.0) as u8,
            self.b.clamp(0.0, 255.0) as u8,
        ]
    }

    pub fn from_rgb8(rgb: [u8; 3]) -> Self {
        Self::new(rgb[0] as f64, rgb[1] as f64, rgb[2] as f64)
    }
}
