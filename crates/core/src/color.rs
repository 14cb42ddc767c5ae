use serde::{Deserialize, Serialize};

/// A CMYK color, each channel in [0, 1].
pub type Cmyk = [f32; 4];

pub const CYAN: Cmyk = [1.0, 0.0, 0.0, 0.0];
pub const MAGENTA: Cmyk = [0.0, 1.0, 0.0, 0.0];
pub const BLACK: Cmyk = [0.0, 0.0, 0.0, 1.0];
pub const LIGHT_GREY: Cmyk = [0.0, 0.0, 0.0, 0.2];
pub const DARK_GREY: Cmyk = [0.0, 0.0, 0.0, 0.5];
pub const RED: Cmyk = [0.0, 1.0, 1.0, 0.0];
pub const WHITE: Cmyk = [0.0, 0.0, 0.0, 0.0];

/// Rainbow, red high (11 colors, blue → red).
const RAINBOW_RH: [Cmyk; 11] = [
    [0.92, 0.84, 0.0, 0.08], // dark blue
    [0.78, 0.56, 0.0, 0.22],
    [0.5, 0.0, 0.0, 0.5],
    [0.61, 0.0, 0.56, 0.22],
    [0.42, 0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0, 0.0], // yellow
    [0.0, 0.21, 1.0, 0.0],
    [0.0, 0.42, 1.0, 0.0],
    [0.0, 0.63, 1.0, 0.0],
    [0.0, 0.84, 1.0, 0.0],
    [0.0, 0.94, 1.0, 0.0], // red
];

/// Six-bin subset of the rainbow, red high.
const SIX_RH: [Cmyk; 6] = [
    [0.92, 0.84, 0.0, 0.08],
    [0.5, 0.0, 0.0, 0.5],
    [0.42, 0.0, 1.0, 0.0],
    [0.0, 0.21, 1.0, 0.0],
    [0.0, 0.63, 1.0, 0.0],
    [0.0, 0.94, 1.0, 0.0],
];

/// Color schemes a scheme legend can bin values into.
///
/// "Red high" schemes paint the largest values red, "red low" the smallest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scheme {
    RainbowRedHigh,
    RainbowRedLow,
    SixRedHigh,
    SixRedLow,
}

impl Scheme {
    /// Colors of this scheme, lowest bin first.
    pub fn colors(self) -> Vec<Cmyk> {
        match self {
            Scheme::RainbowRedHigh => RAINBOW_RH.to_vec(),
            Scheme::RainbowRedLow => RAINBOW_RH.iter().rev().copied().collect(),
            Scheme::SixRedHigh => SIX_RH.to_vec(),
            Scheme::SixRedLow => SIX_RH.iter().rev().copied().collect(),
        }
    }

    pub fn nbins(self) -> usize {
        match self {
            Scheme::RainbowRedHigh | Scheme::RainbowRedLow => RAINBOW_RH.len(),
            Scheme::SixRedHigh | Scheme::SixRedLow => SIX_RH.len(),
        }
    }
}
