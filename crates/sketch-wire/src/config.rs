// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Out-of-band stream parameters.
//!
//! Nothing here is transmitted; both ends must agree on these values before
//! the first byte.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cursor::Endian;

/// Default decode bound for NUL-terminated strings, terminator included.
pub const DEFAULT_MAX_STRING_LEN: usize = 1024;
/// Default cap on points in one polyline/polygon record.
pub const DEFAULT_MAX_POINTS: u32 = 1 << 20;
/// Default cap on pixels in one image block.
pub const DEFAULT_MAX_IMAGE_PIXELS: u64 = 1 << 24;

/// Record layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Framing {
    /// `opcode, operands`, back to back. The reference layout.
    #[default]
    Dense,
    /// `opcode, u32 operand byte length, operands`. Lets a decoder skip
    /// records it does not understand and detect layout drift.
    LengthPrefixed,
}

/// What the encoder does with gradient and pattern fills, which have no
/// operand format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum PaintFallback {
    /// Emit a solid fill: first gradient stop, mean pattern color.
    #[default]
    Approximate,
    /// Latch [`crate::WireError::UnsupportedOperand`].
    Reject,
}

/// Parameters shared by an encoder and the decoder reading its output.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct WireConfig {
    /// Byte order of every multi-byte field.
    pub endian: Endian,
    /// Record layout.
    pub framing: Framing,
    /// Decode bound for strings, terminator included. Longer strings are
    /// truncated to `max_string_len - 1` bytes.
    pub max_string_len: usize,
    /// Decode limit on a point-list count.
    pub max_points: u32,
    /// Decode limit on `width * height` of an image block.
    pub max_image_pixels: u64,
    /// Whether a new encoder first writes the default-state records.
    pub prologue: bool,
    /// Encoder policy for gradient and pattern fills.
    pub paint_fallback: PaintFallback,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            endian: Endian::Little,
            framing: Framing::Dense,
            max_string_len: DEFAULT_MAX_STRING_LEN,
            max_points: DEFAULT_MAX_POINTS,
            max_image_pixels: DEFAULT_MAX_IMAGE_PIXELS,
            prologue: true,
            paint_fallback: PaintFallback::Approximate,
        }
    }
}

impl WireConfig {
    /// Same config with a different byte order.
    #[must_use]
    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    /// Same config with a different framing.
    #[must_use]
    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    /// Same config with the prologue switched on or off.
    #[must_use]
    pub fn with_prologue(mut self, prologue: bool) -> Self {
        self.prologue = prologue;
        self
    }

    /// Same config with a different paint fallback.
    #[must_use]
    pub fn with_paint_fallback(mut self, paint_fallback: PaintFallback) -> Self {
        self.paint_fallback = paint_fallback;
        self
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let cfg: WireConfig =
            serde_json::from_str(r#"{"endian":"big","framing":"lengthPrefixed"}"#).unwrap();
        assert_eq!(cfg.endian, Endian::Big);
        assert_eq!(cfg.framing, Framing::LengthPrefixed);
        assert_eq!(cfg.max_string_len, DEFAULT_MAX_STRING_LEN);
        assert!(cfg.prologue);
    }

    #[test]
    fn test_json_roundtrip() {
        let cfg = WireConfig::default()
            .with_prologue(false)
            .with_paint_fallback(PaintFallback::Reject);
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains(r#""paintFallback":"reject""#));
        let back: WireConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
