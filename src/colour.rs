//! 8-bit RGBA colour value and the brightness helpers built on it.
//!
//! Shading never mutates a colour in place: [`Colour::scaled`] and
//! [`Colour::blend_over`] return fresh values.

use serde::Deserialize;

use crate::renderer::Rgba;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Colour {
    pub const BLACK: Colour = Colour::rgb(0, 0, 0);
    pub const WHITE: Colour = Colour::rgb(255, 255, 255);
    pub const GREY: Colour = Colour::rgb(196, 196, 196);
    pub const RED: Colour = Colour::rgb(255, 0, 0);
    pub const GREEN: Colour = Colour::rgb(0, 255, 0);
    pub const BLUE: Colour = Colour::rgb(0, 0, 255);
    /// Fully transparent black.
    pub const CLEAR: Colour = Colour::rgba(0, 0, 0, 0);

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Multiply the colour channels by `factor`, saturating at 255.
    /// Alpha is left alone.
    #[inline]
    pub fn scaled(self, factor: f64) -> Self {
        debug_assert!(factor >= 0.0, "negative colour factor {factor}");
        let ch = |c: u8| (c as f64 * factor).clamp(0.0, 255.0) as u8;
        Self {
            r: ch(self.r),
            g: ch(self.g),
            b: ch(self.b),
            a: self.a,
        }
    }

    /// Composite `self` over an opaque `dst` using `self.a` as coverage.
    #[inline]
    pub fn blend_over(self, dst: Colour) -> Self {
        match self.a {
            255 => self,
            0 => dst,
            a => {
                let a = a as u32;
                let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * (255 - a) + 127) / 255) as u8;
                Self::rgb(mix(self.r, dst.r), mix(self.g, dst.g), mix(self.b, dst.b))
            }
        }
    }

    /// Pack into the frame-buffer format (0xAARRGGBB).
    #[inline]
    pub const fn to_argb(self) -> Rgba {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    #[inline]
    pub const fn from_argb(px: Rgba) -> Self {
        Self {
            a: (px >> 24) as u8,
            r: (px >> 16) as u8,
            g: (px >> 8) as u8,
            b: px as u8,
        }
    }
}

/// Brightness multiplier for a surface `distance` units away:
/// `1/sqrt(d)` beyond one unit, never brighter than 1 up close.
#[inline]
pub fn distance_factor(distance: f64) -> f64 {
    if distance > 1.0 {
        1.0 / distance.sqrt()
    } else {
        1.0
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
