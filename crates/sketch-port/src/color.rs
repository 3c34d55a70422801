// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! RGBA color type.
//!
//! The packed form is `0xAARRGGBB`, which is also the wire representation.

use core::fmt;
use core::str::FromStr;

use alloc::string::String;
use thiserror::Error;

/// RGBA color with 8-bit components.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 is opaque).
    pub a: u8,
}

/// Error returned when a `#AARRGGBB` / `#RRGGBB` color string is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color {input:?}: expected #AARRGGBB or #RRGGBB")]
pub struct ColorParseError {
    /// The rejected input.
    pub input: String,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque red.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Opaque green.
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    /// Create a color with explicit RGBA components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color (alpha = 255).
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Unpack a `0xAARRGGBB` value.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// Pack into `0xAARRGGBB`.
    pub const fn to_argb(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

impl From<u32> for Color {
    fn from(argb: u32) -> Self {
        Self::from_argb(argb)
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.to_argb()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.to_argb())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError { input: s.into() };
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        let value = u32::from_str_radix(hex, 16).map_err(|_| err())?;
        match hex.len() {
            8 => Ok(Self::from_argb(value)),
            6 => Ok(Self::from_argb(0xFF00_0000 | value)),
            _ => Err(err()),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ColorVisitor;

        impl serde::de::Visitor<'_> for ColorVisitor {
            type Value = Color;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a \"#AARRGGBB\" string or a packed 0xAARRGGBB integer")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Color, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Color, E> {
                u32::try_from(v)
                    .map(Color::from_argb)
                    .map_err(|_| E::custom("packed color exceeds 32 bits"))
            }
        }

        deserializer.deserialize_any(ColorVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack_roundtrip() {
        for color in [
            Color::WHITE,
            Color::BLACK,
            Color::TRANSPARENT,
            Color::new(0x12, 0x34, 0x56, 0x78),
        ] {
            assert_eq!(Color::from_argb(color.to_argb()), color);
        }
    }

    #[test]
    fn test_packed_channel_order() {
        let color = Color::new(0xAA, 0xBB, 0xCC, 0xDD);
        assert_eq!(color.to_argb(), 0xDDAA_BBCC);
        assert_eq!(Color::from_argb(0xFFFF_0000), Color::RED);
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("#FFFF0000".parse::<Color>().unwrap(), Color::RED);
        assert_eq!("#00ff00".parse::<Color>().unwrap(), Color::GREEN);
        assert_eq!(Color::BLUE.to_string(), "#FF0000FF");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "FF0000", "#F00", "#GG000000", "#+FF0000", "#FF00000000"] {
            assert!(bad.parse::<Color>().is_err(), "{bad:?} should be rejected");
        }
    }
}
