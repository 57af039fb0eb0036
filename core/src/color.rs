//! Color model used by the bar renderer.
//!
//! Three floating point spaces are involved:
//!
//! - [`LinearRgb`]: physical light intensity, before display gamma.
//! - [`Srgb`]: gamma-encoded values, the space display pixels live in.
//! - [`Oklab`]: a perceptually uniform space. Charge-level color ramps are
//!   interpolated here so that the midpoints look even to the eye.
//!
//! [`PackedColor`] is the 8-bit RGBA wire format handed to the drawing surface.
//!
//! # Examples
//!
//! ```rust
//! use xbattbar_rs_core::color::{LinearRgb, Oklab};
//!
//! let red = LinearRgb::new(1.0, 0.0, 0.0).to_oklab();
//! let green = LinearRgb::new(0.0, 1.0, 0.0).to_oklab();
//! let halfway = red.lerp(green, 0.5).to_srgb().to_packed(255);
//! assert_eq!(halfway.a, 255);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Linear segment threshold on the encoded side of the sRGB curve.
const SRGB_DECODE_THRESHOLD: f32 = 0.04045;
/// Linear segment threshold on the linear side of the sRGB curve.
const SRGB_ENCODE_THRESHOLD: f32 = 0.003_130_8;
const SRGB_LINEAR_SLOPE: f32 = 12.92;
const SRGB_GAMMA: f32 = 2.4;
const SRGB_OFFSET: f32 = 0.055;

/// Apply the sRGB transfer function to a linear-light channel value.
#[must_use]
pub fn srgb_encode(linear: f32) -> f32 {
    if linear <= SRGB_ENCODE_THRESHOLD {
        linear * SRGB_LINEAR_SLOPE
    } else {
        (1.0 + SRGB_OFFSET) * linear.powf(1.0 / SRGB_GAMMA) - SRGB_OFFSET
    }
}

/// Inverse of [`srgb_encode`].
#[must_use]
pub fn srgb_decode(encoded: f32) -> f32 {
    if encoded <= SRGB_DECODE_THRESHOLD {
        encoded / SRGB_LINEAR_SLOPE
    } else {
        ((encoded + SRGB_OFFSET) / (1.0 + SRGB_OFFSET)).powf(SRGB_GAMMA)
    }
}

/// Quantize a [0,1] channel to 8 bits, clamping out-of-range input first.
fn quantize(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Linear-light RGB triple. Not clamped on construction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LinearRgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Gamma-encoded sRGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Srgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// A color in the Oklab perceptual space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Oklab {
    /// Perceptual lightness
    pub l: f32,
    /// Green/red axis
    pub a: f32,
    /// Blue/yellow axis
    pub b: f32,
}

impl LinearRgb {
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Gamma-encode every channel.
    #[must_use]
    pub fn to_srgb(self) -> Srgb {
        Srgb {
            r: srgb_encode(self.r),
            g: srgb_encode(self.g),
            b: srgb_encode(self.b),
        }
    }

    /// Convert to Oklab using the published forward matrices.
    #[must_use]
    pub fn to_oklab(self) -> Oklab {
        let l = 0.412_221_47 * self.r + 0.536_332_55 * self.g + 0.051_445_995 * self.b;
        let m = 0.211_903_5 * self.r + 0.680_699_5 * self.g + 0.107_396_96 * self.b;
        let s = 0.088_302_46 * self.r + 0.281_718_85 * self.g + 0.629_978_7 * self.b;

        let l = l.cbrt();
        let m = m.cbrt();
        let s = s.cbrt();

        Oklab {
            l: 0.210_454_26 * l + 0.793_617_8 * m - 0.004_072_047 * s,
            a: 1.977_998_5 * l - 2.428_592_2 * m + 0.450_593_7 * s,
            b: 0.025_904_037 * l + 0.782_771_77 * m - 0.808_675_77 * s,
        }
    }

    /// Pack the raw channel values, without applying gamma.
    #[must_use]
    pub fn to_packed(self, alpha: u8) -> PackedColor {
        PackedColor::new(quantize(self.r), quantize(self.g), quantize(self.b), alpha)
    }
}

impl Srgb {
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Decode every channel back to linear light.
    #[must_use]
    pub fn to_linear_rgb(self) -> LinearRgb {
        LinearRgb {
            r: srgb_decode(self.r),
            g: srgb_decode(self.g),
            b: srgb_decode(self.b),
        }
    }

    #[must_use]
    pub fn to_oklab(self) -> Oklab {
        self.to_linear_rgb().to_oklab()
    }

    /// Pack into an 8-bit display color with the given alpha.
    #[must_use]
    pub fn to_packed(self, alpha: u8) -> PackedColor {
        PackedColor::new(quantize(self.r), quantize(self.g), quantize(self.b), alpha)
    }
}

impl Oklab {
    #[must_use]
    pub const fn new(l: f32, a: f32, b: f32) -> Self {
        Self { l, a, b }
    }

    /// Convert back to linear RGB, clamping each channel to [0,1].
    ///
    /// Oklab values produced by interpolation can fall outside the sRGB gamut;
    /// clamping keeps the result displayable.
    #[must_use]
    pub fn to_linear_rgb(self) -> LinearRgb {
        let l = self.l + 0.396_337_78 * self.a + 0.215_803_76 * self.b;
        let m = self.l - 0.105_561_346 * self.a - 0.063_854_17 * self.b;
        let s = self.l - 0.089_484_18 * self.a - 1.291_485_5 * self.b;

        let l = l * l * l;
        let m = m * m * m;
        let s = s * s * s;

        LinearRgb {
            r: (4.076_741_7 * l - 3.307_711_6 * m + 0.230_969_94 * s).clamp(0.0, 1.0),
            g: (-1.268_438 * l + 2.609_757_4 * m - 0.341_319_4 * s).clamp(0.0, 1.0),
            b: (-0.004_196_086_3 * l - 0.703_418_6 * m + 1.707_614_7 * s).clamp(0.0, 1.0),
        }
    }

    #[must_use]
    pub fn to_srgb(self) -> Srgb {
        self.to_linear_rgb().to_srgb()
    }

    /// Per-channel affine interpolation towards `other`.
    ///
    /// `t` is not clamped; values outside [0,1] extrapolate.
    #[must_use]
    pub fn lerp(self, other: Oklab, t: f32) -> Oklab {
        let it = 1.0 - t;
        Oklab {
            l: self.l * it + other.l * t,
            a: self.a * it + other.a * t,
            b: self.b * it + other.b * t,
        }
    }

    /// Same hue and chroma with lightness scaled by `factor`.
    #[must_use]
    pub fn with_lightness_scaled(self, factor: f32) -> Oklab {
        Oklab {
            l: self.l * factor,
            ..self
        }
    }
}

/// 8-bit RGBA color as consumed by the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackedColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl PackedColor {
    pub const BLACK: PackedColor = PackedColor::new(0, 0, 0, 255);
    pub const WHITE: PackedColor = PackedColor::new(255, 255, 255, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build from a `0xAARRGGBB` pixel value.
    #[must_use]
    pub const fn from_argb(pixel: u32) -> Self {
        Self {
            a: (pixel >> 24) as u8,
            r: (pixel >> 16) as u8,
            g: (pixel >> 8) as u8,
            b: pixel as u8,
        }
    }

    /// Pixel value in `0xAARRGGBB` layout, as X11 true-color visuals expect.
    #[must_use]
    pub const fn to_argb(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    #[must_use]
    pub fn to_srgb(self) -> Srgb {
        Srgb::new(
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }

    /// Raw channel values scaled to [0,1], without removing gamma.
    #[must_use]
    pub fn to_linear_rgb(self) -> LinearRgb {
        LinearRgb::new(
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }

    /// Per-channel interpolation in packed space.
    ///
    /// Results are truncated, not rounded, to stay bit-exact with earlier
    /// renders.
    #[must_use]
    pub fn lerp(self, other: PackedColor, t: f32) -> PackedColor {
        let it = 1.0 - t;
        let mix = |x: u8, y: u8| (f32::from(x) * it + f32::from(y) * t) as u8;
        PackedColor {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

impl fmt::Display for PackedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.a, self.r, self.g, self.b)
        }
    }
}

impl FromStr for PackedColor {
    type Err = ColorParseError;

    /// Parse `#RRGGBB` (opaque) or `#AARRGGBB`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError {
            input: s.to_owned(),
        };
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let value = u32::from_str_radix(hex, 16).map_err(|_| err())?;
        match hex.len() {
            6 => Ok(Self::from_argb(0xFF00_0000 | value)),
            8 => Ok(Self::from_argb(value)),
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for PackedColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PackedColor> for String {
    fn from(color: PackedColor) -> Self {
        color.to_string()
    }
}

/// Error type for parsing [`PackedColor`] from a hex string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid color '{input}'. Expected #RRGGBB or #AARRGGBB")]
pub struct ColorParseError {
    input: String,
}
