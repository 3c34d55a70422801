// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Stream-level errors.

use thiserror::Error;

use crate::cursor::CursorError;
use crate::opcode::Opcode;

/// Errors produced while encoding or decoding a command stream.
///
/// Every variant carries `offset`, the byte position of the start of the
/// record that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// The encoder ran out of buffer; the failing record was not written.
    #[error("buffer exhausted writing {opcode} at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    BufferExhausted {
        /// Record being written.
        opcode: Opcode,
        /// Start of that record.
        offset: usize,
        /// Bytes the failing write required.
        needed: usize,
        /// Space left when it failed.
        remaining: usize,
    },
    /// An opcode outside the catalogue; the rest of the stream is unreadable.
    #[error("desynchronized at offset {offset}: unknown opcode {value:#010x}")]
    Desynchronization {
        /// Raw tag value.
        value: u32,
        /// Where the tag was read.
        offset: usize,
    },
    /// The stream ended inside a record.
    #[error("truncated {} record at offset {offset}: needed {needed} bytes, {remaining} remaining", opcode_label(.opcode))]
    Truncation {
        /// Opcode, when the tag itself was complete.
        opcode: Option<Opcode>,
        /// Start of the record.
        offset: usize,
        /// Bytes the failing read required.
        needed: usize,
        /// Bytes that were left.
        remaining: usize,
    },
    /// The operand has no wire representation.
    #[error("unsupported operand for {opcode} at offset {offset}: {reason}")]
    UnsupportedOperand {
        /// Record concerned.
        opcode: Opcode,
        /// Start of the record.
        offset: usize,
        /// What is missing.
        reason: &'static str,
    },
    /// The operand is malformed: an enum value outside its set, a string with
    /// an interior NUL, an image whose pixels do not match its size.
    #[error("invalid {field} for {opcode} at offset {offset}: {detail}")]
    InvalidOperand {
        /// Record concerned.
        opcode: Opcode,
        /// Start of the record.
        offset: usize,
        /// Which operand.
        field: &'static str,
        /// What was wrong with it.
        detail: String,
    },
    /// A declared count is above the configured allocation limit.
    #[error("{opcode} at offset {offset} declares {count} {what}; limit is {max}")]
    LimitExceeded {
        /// Record concerned.
        opcode: Opcode,
        /// Start of the record.
        offset: usize,
        /// What was counted (`"points"`, `"pixels"`).
        what: &'static str,
        /// Declared count.
        count: u64,
        /// Configured limit.
        max: u64,
    },
    /// In framed mode, operands did not fill the declared frame exactly.
    #[error("{opcode} frame at offset {offset} declares {declared} operand bytes, operands use {consumed}")]
    FrameMismatch {
        /// Record concerned.
        opcode: Opcode,
        /// Start of the record.
        offset: usize,
        /// Length from the frame header.
        declared: usize,
        /// Bytes the operands actually occupied (or needed).
        consumed: usize,
    },
}

impl WireError {
    /// Byte offset of the record that failed.
    pub const fn offset(&self) -> usize {
        match self {
            Self::BufferExhausted { offset, .. }
            | Self::Desynchronization { offset, .. }
            | Self::Truncation { offset, .. }
            | Self::UnsupportedOperand { offset, .. }
            | Self::InvalidOperand { offset, .. }
            | Self::LimitExceeded { offset, .. }
            | Self::FrameMismatch { offset, .. } => *offset,
        }
    }

    /// Opcode of the failing record, when known.
    pub const fn opcode(&self) -> Option<Opcode> {
        match self {
            Self::Desynchronization { .. } => None,
            Self::Truncation { opcode, .. } => *opcode,
            Self::BufferExhausted { opcode, .. }
            | Self::UnsupportedOperand { opcode, .. }
            | Self::InvalidOperand { opcode, .. }
            | Self::LimitExceeded { opcode, .. }
            | Self::FrameMismatch { opcode, .. } => Some(*opcode),
        }
    }

    /// Whether the failure happened while decoding.
    pub const fn is_decode(&self) -> bool {
        !matches!(self, Self::BufferExhausted { .. })
    }

    /// Attach record context to a cursor failure on the decode side.
    pub(crate) fn from_read(opcode: Option<Opcode>, offset: usize, err: &CursorError) -> Self {
        let (needed, remaining) = match *err {
            CursorError::EndOfStream { needed, remaining }
            | CursorError::BufferExhausted { needed, remaining } => (needed, remaining),
            CursorError::InvalidRange {
                offset: start,
                size,
                len,
            } => (size, len.saturating_sub(start)),
            CursorError::OutOfRange { .. } | CursorError::InteriorNul => (0, 0),
        };
        Self::Truncation {
            opcode,
            offset,
            needed,
            remaining,
        }
    }

    /// Attach record context to a cursor failure on the encode side.
    pub(crate) fn from_write(opcode: Opcode, offset: usize, err: &CursorError) -> Self {
        match *err {
            CursorError::InteriorNul => Self::InvalidOperand {
                opcode,
                offset,
                field: "string",
                detail: "contains an interior NUL".to_owned(),
            },
            CursorError::BufferExhausted { needed, remaining }
            | CursorError::EndOfStream { needed, remaining } => Self::BufferExhausted {
                opcode,
                offset,
                needed,
                remaining,
            },
            CursorError::OutOfRange { .. } | CursorError::InvalidRange { .. } => {
                Self::BufferExhausted {
                    opcode,
                    offset,
                    needed: 0,
                    remaining: 0,
                }
            }
        }
    }
}

#[allow(clippy::ref_option)]
fn opcode_label(opcode: &Option<Opcode>) -> &'static str {
    opcode.map_or("opcode", Opcode::name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_offset_and_opcode() {
        let err = WireError::Truncation {
            opcode: Some(Opcode::Rect),
            offset: 12,
            needed: 4,
            remaining: 1,
        };
        assert_eq!(
            err.to_string(),
            "truncated rect record at offset 12: needed 4 bytes, 1 remaining"
        );
        let err = WireError::Truncation {
            opcode: None,
            offset: 0,
            needed: 4,
            remaining: 2,
        };
        assert!(err.to_string().starts_with("truncated opcode record"));
        let err = WireError::Desynchronization {
            value: 0xFF,
            offset: 8,
        };
        assert_eq!(
            err.to_string(),
            "desynchronized at offset 8: unknown opcode 0x000000ff"
        );
    }

    #[test]
    fn test_accessors() {
        let err = WireError::from_write(Opcode::Text, 40, &CursorError::InteriorNul);
        assert_eq!(err.offset(), 40);
        assert_eq!(err.opcode(), Some(Opcode::Text));
        assert!(matches!(err, WireError::InvalidOperand { .. }));

        let err = WireError::from_read(
            Some(Opcode::Line),
            4,
            &CursorError::EndOfStream {
                needed: 4,
                remaining: 3,
            },
        );
        assert!(err.is_decode());
        assert_eq!(
            err,
            WireError::Truncation {
                opcode: Some(Opcode::Line),
                offset: 4,
                needed: 4,
                remaining: 3
            }
        );
    }
}
