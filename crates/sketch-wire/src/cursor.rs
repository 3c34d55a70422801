// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Bounds-checked, endian-aware cursor over a fixed byte buffer.
//!
//! The cursor never grows or reallocates its buffer. Reads that cannot
//! complete fail with [`CursorError::EndOfStream`] and writes that do not fit
//! fail with [`CursorError::BufferExhausted`]; in both cases the cursor and
//! the buffer are left untouched.

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Byte order for multi-byte fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Endian {
    /// Least significant byte first.
    #[default]
    Little,
    /// Most significant byte first.
    Big,
}

/// Errors produced by cursor operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// A read needed more bytes than remain.
    #[error("end of stream: needed {needed} bytes, {remaining} remaining")]
    EndOfStream {
        /// Bytes the read required.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },
    /// A write needed more space than remains.
    #[error("buffer exhausted: needed {needed} bytes, {remaining} remaining")]
    BufferExhausted {
        /// Bytes the write required.
        needed: usize,
        /// Space left in the buffer.
        remaining: usize,
    },
    /// A seek or skip targeted a position outside the buffer.
    #[error("seek target outside 0..={len}; clamped to end")]
    OutOfRange {
        /// Buffer length (the clamped position).
        len: usize,
    },
    /// A sub-range fell outside the buffer.
    #[error("range {offset}+{size} outside buffer of {len} bytes")]
    InvalidRange {
        /// Requested start.
        offset: usize,
        /// Requested size.
        size: usize,
        /// Buffer length.
        len: usize,
    },
    /// A NUL-terminated string contained a NUL before its end.
    #[error("string contains an interior NUL")]
    InteriorNul,
}

/// Result of [`ByteCursor::read_string_z_full`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZString {
    /// Decoded text (invalid UTF-8 replaced with U+FFFD).
    pub text: String,
    /// `true` when the terminator was found and consumed; `false` when the
    /// length bound was hit first and the rest of the string is still unread.
    pub terminated: bool,
}

/// Seekable cursor over a byte buffer.
///
/// `B` is anything viewable as bytes: `&[u8]`, `&mut [u8]`, `Vec<u8>`, a
/// memory map. Writing additionally needs `AsMut<[u8]>`. The cursor does not
/// own the lifetime of a borrowed buffer; it only observes or mutates it.
#[derive(Clone, Debug)]
pub struct ByteCursor<B> {
    buf: B,
    pos: usize,
    endian: Endian,
}

macro_rules! numeric_io {
    ($($read:ident, $write:ident, $ty:ty;)+) => {
        impl<B: AsRef<[u8]>> ByteCursor<B> {
            $(
                #[doc = concat!("Read a `", stringify!($ty), "` in the cursor's byte order.")]
                pub fn $read(&mut self) -> Result<$ty, CursorError> {
                    let raw = self.take_array()?;
                    Ok(match self.endian {
                        Endian::Little => <$ty>::from_le_bytes(raw),
                        Endian::Big => <$ty>::from_be_bytes(raw),
                    })
                }
            )+
        }

        impl<B: AsRef<[u8]> + AsMut<[u8]>> ByteCursor<B> {
            $(
                #[doc = concat!("Write a `", stringify!($ty), "` in the cursor's byte order.")]
                pub fn $write(&mut self, value: $ty) -> Result<(), CursorError> {
                    let raw = match self.endian {
                        Endian::Little => value.to_le_bytes(),
                        Endian::Big => value.to_be_bytes(),
                    };
                    self.write_bytes(&raw)
                }
            )+
        }
    };
}

numeric_io! {
    read_u8, write_u8, u8;
    read_u16, write_u16, u16;
    read_u32, write_u32, u32;
    read_u64, write_u64, u64;
    read_i8, write_i8, i8;
    read_i16, write_i16, i16;
    read_i32, write_i32, i32;
    read_i64, write_i64, i64;
    read_f32, write_f32, f32;
    read_f64, write_f64, f64;
}

impl<B: AsRef<[u8]>> ByteCursor<B> {
    /// Little-endian cursor at offset 0.
    pub fn new(buf: B) -> Self {
        Self::with_endian(buf, Endian::Little)
    }

    /// Cursor at offset 0 with an explicit byte order.
    pub fn with_endian(buf: B, endian: Endian) -> Self {
        Self {
            buf,
            pos: 0,
            endian,
        }
    }

    /// Cursor starting at `start`.
    pub fn at(buf: B, start: usize, endian: Endian) -> Result<Self, CursorError> {
        let mut cursor = Self::with_endian(buf, endian);
        cursor.seek(start)?;
        Ok(cursor)
    }

    /// Total buffer length.
    pub fn len(&self) -> usize {
        self.buf.as_ref().len()
    }

    /// Whether the buffer has zero length.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Byte order fixed at construction.
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Bytes between the cursor and the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.pos)
    }

    /// `true` once nothing remains.
    pub fn at_end(&self) -> bool {
        self.remaining() == 0
    }

    /// The whole buffer.
    pub fn as_slice(&self) -> &[u8] {
        self.buf.as_ref()
    }

    /// Bytes before the cursor (what an encoder has written).
    pub fn written(&self) -> &[u8] {
        &self.buf.as_ref()[..self.pos]
    }

    /// Bytes from the cursor to the end.
    pub fn unread(&self) -> &[u8] {
        &self.buf.as_ref()[self.pos..]
    }

    /// Release the buffer.
    pub fn into_inner(self) -> B {
        self.buf
    }

    /// Absolute reposition.
    ///
    /// A target beyond the buffer clamps the cursor to the end and fails, so a
    /// corrupt offset terminates decoding rather than wrapping around.
    pub fn seek(&mut self, pos: usize) -> Result<(), CursorError> {
        let len = self.len();
        if pos > len {
            self.pos = len;
            return Err(CursorError::OutOfRange { len });
        }
        self.pos = pos;
        Ok(())
    }

    /// Relative reposition with the same clamping policy as [`ByteCursor::seek`].
    pub fn skip(&mut self, offset: isize) -> Result<(), CursorError> {
        match self.pos.checked_add_signed(offset) {
            Some(target) => self.seek(target),
            None => {
                let len = self.len();
                self.pos = len;
                Err(CursorError::OutOfRange { len })
            }
        }
    }

    fn take(&mut self, n: usize) -> Result<&[u8], CursorError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(CursorError::EndOfStream {
                needed: n,
                remaining,
            });
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.buf.as_ref()[start..start + n])
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], CursorError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Read one byte.
    pub fn read_octet(&mut self) -> Result<u8, CursorError> {
        self.read_u8()
    }

    /// Copy up to `dst.len()` bytes; returns how many were copied.
    ///
    /// Copies fewer than requested on short input. Never reads out of bounds.
    pub fn read_bytes(&mut self, dst: &mut [u8]) -> usize {
        let n = dst.len().min(self.remaining());
        dst[..n].copy_from_slice(&self.buf.as_ref()[self.pos..self.pos + n]);
        self.pos += n;
        n
    }

    /// Read a NUL-terminated string of at most `max_len - 1` bytes.
    ///
    /// See [`ByteCursor::read_string_z_full`] for the exact contract; this
    /// variant drops the `terminated` flag.
    pub fn read_string_z(&mut self, max_len: usize) -> Result<String, CursorError> {
        self.read_string_z_full(max_len).map(|z| z.text)
    }

    /// Read a NUL-terminated string of at most `max_len - 1` bytes.
    ///
    /// - Terminator within the bound: the text and the NUL are consumed.
    /// - Bound reached first: exactly `max_len - 1` bytes are consumed and
    ///   `terminated` is `false`; the caller decides what to do with the rest.
    /// - Buffer ends first: `EndOfStream`, nothing consumed.
    pub fn read_string_z_full(&mut self, max_len: usize) -> Result<ZString, CursorError> {
        let limit = max_len.max(1) - 1;
        let unread = self.unread();
        let scan = &unread[..unread.len().min(limit + 1)];
        let (text, consumed, terminated) = match scan.iter().position(|&b| b == 0) {
            Some(nul) => (lossy(&scan[..nul]), nul + 1, true),
            None if unread.len() > limit => (lossy(&scan[..limit]), limit, false),
            None => {
                return Err(CursorError::EndOfStream {
                    needed: unread.len() + 1,
                    remaining: unread.len(),
                })
            }
        };
        self.pos += consumed;
        Ok(ZString { text, terminated })
    }

    /// Advance past the next NUL; returns the number of bytes skipped
    /// (terminator included).
    pub fn skip_past_nul(&mut self) -> Result<usize, CursorError> {
        let unread = self.unread();
        let nul = unread
            .iter()
            .position(|&b| b == 0)
            .ok_or(CursorError::EndOfStream {
                needed: unread.len() + 1,
                remaining: unread.len(),
            })?;
        self.pos += nul + 1;
        Ok(nul + 1)
    }

    /// Independent cursor over `offset..offset + size` of the same buffer.
    ///
    /// Shares the backing bytes (no copy) and the byte order; has its own
    /// position starting at 0.
    pub fn range(&self, offset: usize, size: usize) -> Result<ByteCursor<&[u8]>, CursorError> {
        let span = self.span(offset, size)?;
        Ok(ByteCursor::with_endian(
            &self.buf.as_ref()[span],
            self.endian,
        ))
    }

    fn span(&self, offset: usize, size: usize) -> Result<core::ops::Range<usize>, CursorError> {
        let len = self.len();
        match offset.checked_add(size) {
            Some(end) if end <= len => Ok(offset..end),
            _ => Err(CursorError::InvalidRange { offset, size, len }),
        }
    }

    /// Same cursor with a different byte order.
    pub fn into_endian(self, endian: Endian) -> Self {
        Self { endian, ..self }
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> ByteCursor<B> {
    /// Write one byte.
    pub fn write_octet(&mut self, value: u8) -> Result<(), CursorError> {
        self.write_bytes(&[value])
    }

    /// Copy `src` in full, or fail without writing anything.
    pub fn write_bytes(&mut self, src: &[u8]) -> Result<(), CursorError> {
        let remaining = self.remaining();
        if src.len() > remaining {
            return Err(CursorError::BufferExhausted {
                needed: src.len(),
                remaining,
            });
        }
        let start = self.pos;
        self.buf.as_mut()[start..start + src.len()].copy_from_slice(src);
        self.pos += src.len();
        Ok(())
    }

    /// Write `value` followed by a NUL terminator.
    pub fn write_string_z(&mut self, value: &str) -> Result<(), CursorError> {
        let bytes = value.as_bytes();
        if bytes.contains(&0) {
            return Err(CursorError::InteriorNul);
        }
        let remaining = self.remaining();
        if bytes.len() + 1 > remaining {
            return Err(CursorError::BufferExhausted {
                needed: bytes.len() + 1,
                remaining,
            });
        }
        self.write_bytes(bytes)?;
        self.write_octet(0)
    }

    /// Mutable counterpart of [`ByteCursor::range`].
    pub fn range_mut(
        &mut self,
        offset: usize,
        size: usize,
    ) -> Result<ByteCursor<&mut [u8]>, CursorError> {
        let span = self.span(offset, size)?;
        let endian = self.endian;
        Ok(ByteCursor::with_endian(&mut self.buf.as_mut()[span], endian))
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endianness() {
        let bytes = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(ByteCursor::new(&bytes[..]).read_u32().unwrap(), 0x0403_0201);
        assert_eq!(
            ByteCursor::with_endian(&bytes[..], Endian::Big)
                .read_u32()
                .unwrap(),
            0x0102_0304
        );
    }

    #[test]
    fn test_write_then_read_mixed_widths() {
        let mut c = ByteCursor::with_endian(vec![0u8; 32], Endian::Big);
        c.write_u16(0xBEEF).unwrap();
        c.write_i32(-7).unwrap();
        c.write_f32(1.5).unwrap();
        c.write_u64(u64::MAX - 1).unwrap();
        assert_eq!(c.position(), 18);

        c.seek(0).unwrap();
        assert_eq!(c.read_u16().unwrap(), 0xBEEF);
        assert_eq!(c.read_i32().unwrap(), -7);
        assert_eq!(c.read_f32().unwrap(), 1.5);
        assert_eq!(c.read_u64().unwrap(), u64::MAX - 1);
    }

    #[test]
    fn test_read_octet_at_eof_is_an_error() {
        let mut c = ByteCursor::new(&[7u8][..]);
        assert_eq!(c.read_octet().unwrap(), 7);
        assert_eq!(
            c.read_octet(),
            Err(CursorError::EndOfStream {
                needed: 1,
                remaining: 0
            })
        );
    }

    #[test]
    fn test_short_read_does_not_advance() {
        let mut c = ByteCursor::new(&[1u8, 2, 3][..]);
        assert!(c.read_u32().is_err());
        assert_eq!(c.position(), 0);
        assert_eq!(c.read_u16().unwrap(), 0x0201);
    }

    #[test]
    fn test_seek_past_end_clamps_to_len() {
        let mut c = ByteCursor::new(&[0u8; 10][..]);
        assert_eq!(c.seek(11), Err(CursorError::OutOfRange { len: 10 }));
        assert_eq!(c.position(), 10);
        assert!(c.at_end());
        assert!(c.seek(10).is_ok());
        assert!(c.seek(0).is_ok());
        assert_eq!(c.skip(-1), Err(CursorError::OutOfRange { len: 10 }));
        assert_eq!(c.position(), 10);
        c.seek(4).unwrap();
        c.skip(-2).unwrap();
        assert_eq!(c.position(), 2);
    }

    #[test]
    fn test_read_bytes_copies_at_most_remaining() {
        let mut c = ByteCursor::new(&[1u8, 2, 3, 4, 5][..]);
        c.seek(3).unwrap();
        let mut dst = [0u8; 8];
        assert_eq!(c.read_bytes(&mut dst), 2);
        assert_eq!(&dst[..3], &[4, 5, 0]);
        assert_eq!(c.read_bytes(&mut dst), 0);
    }

    #[test]
    fn test_write_bytes_refuses_overrun() {
        let mut buf = [0xAAu8; 4];
        let mut c = ByteCursor::new(&mut buf[..]);
        c.write_u8(1).unwrap();
        assert_eq!(
            c.write_u32(0),
            Err(CursorError::BufferExhausted {
                needed: 4,
                remaining: 3
            })
        );
        assert_eq!(c.position(), 1);
        assert_eq!(buf, [1, 0xAA, 0xAA, 0xAA]);
    }

    #[test]
    fn test_string_z_within_bound() {
        let mut c = ByteCursor::new(&b"hi\0rest"[..]);
        let z = c.read_string_z_full(16).unwrap();
        assert_eq!(z.text, "hi");
        assert!(z.terminated);
        assert_eq!(c.position(), 3);
    }

    #[test]
    fn test_string_z_exactly_at_bound_keeps_terminator() {
        // 3 bytes of text + NUL fits max_len = 4.
        let mut c = ByteCursor::new(&b"abc\0"[..]);
        let z = c.read_string_z_full(4).unwrap();
        assert_eq!(z.text, "abc");
        assert!(z.terminated);
        assert!(c.at_end());
    }

    #[test]
    fn test_string_z_over_bound_truncates() {
        let mut c = ByteCursor::new(&b"abcdef\0"[..]);
        let z = c.read_string_z_full(4).unwrap();
        assert_eq!(z.text, "abc");
        assert!(!z.terminated);
        assert_eq!(c.position(), 3);
        assert_eq!(c.skip_past_nul().unwrap(), 4);
        assert!(c.at_end());
    }

    #[test]
    fn test_string_z_unterminated_is_end_of_stream() {
        let mut c = ByteCursor::new(&b"abc"[..]);
        assert!(matches!(
            c.read_string_z(64),
            Err(CursorError::EndOfStream { .. })
        ));
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn test_write_string_z() {
        let mut c = ByteCursor::new(vec![0u8; 4]);
        assert_eq!(c.write_string_z("a\0b"), Err(CursorError::InteriorNul));
        assert!(c.write_string_z("abcd").is_err());
        c.write_string_z("abc").unwrap();
        assert_eq!(c.written(), b"abc\0");
    }

    #[test]
    fn test_range_is_independent_view() {
        let bytes = [0u8, 1, 2, 3, 4, 5, 6, 7];
        let mut outer = ByteCursor::with_endian(&bytes[..], Endian::Big);
        outer.seek(1).unwrap();
        let mut inner = outer.range(4, 4).unwrap();
        assert_eq!(inner.endian(), Endian::Big);
        assert_eq!(inner.read_u16().unwrap(), 0x0405);
        assert_eq!(outer.position(), 1);
        assert_eq!(outer.read_u8().unwrap(), 1);
        assert_eq!(
            outer.range(6, 4).unwrap_err(),
            CursorError::InvalidRange {
                offset: 6,
                size: 4,
                len: 8
            }
        );
        assert!(outer.range(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_at_starts_mid_buffer() {
        let bytes = [0u8, 1, 2, 3, 4, 5];
        let mut c = ByteCursor::at(&bytes[..], 2, Endian::Big).unwrap();
        assert_eq!(c.position(), 2);
        assert_eq!(c.read_u16().unwrap(), 0x0203);
        assert_eq!(c.remaining(), 2);
        assert!(ByteCursor::at(&bytes[..], 6, Endian::Little)
            .unwrap()
            .at_end());
        assert_eq!(
            ByteCursor::at(&bytes[..], 7, Endian::Little).unwrap_err(),
            CursorError::OutOfRange { len: 6 }
        );
    }

    #[test]
    fn test_range_endian_override() {
        let bytes = [0u8, 1, 2, 3, 4, 5, 6, 7];
        let outer = ByteCursor::with_endian(&bytes[..], Endian::Big);
        let mut same = outer.range(4, 4).unwrap();
        let mut flipped = outer.range(4, 4).unwrap().into_endian(Endian::Little);
        assert_eq!(flipped.endian(), Endian::Little);
        assert_eq!(same.read_u32().unwrap(), 0x0405_0607);
        assert_eq!(flipped.read_u32().unwrap(), 0x0706_0504);
        assert_eq!(outer.endian(), Endian::Big);
    }

    #[test]
    fn test_range_mut_writes_through() {
        let mut c = ByteCursor::new(vec![0u8; 8]);
        {
            let mut sub = c.range_mut(2, 4).unwrap();
            sub.write_u32(0xDDCC_BBAA).unwrap();
            assert!(sub.write_u8(0).is_err());
        }
        assert_eq!(c.as_slice(), &[0, 0, 0xAA, 0xBB, 0xCC, 0xDD, 0, 0]);
    }
}
