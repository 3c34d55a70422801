// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Stream decoder: reads records and replays them onto a [`Graphics`].
//!
//! A record is decoded completely into an owned [`Command`] before anything is
//! called, so a truncated or malformed record never reaches the renderer. The
//! first fault latches; the stream has no resynchronization points.

use sketch_port::{Color, Command, Graphics, Image, Point};
use tracing::{trace, warn};

use crate::config::{Framing, WireConfig};
use crate::cursor::{ByteCursor, CursorError};
use crate::error::WireError;
use crate::opcode::{Opcode, WireEnum};

/// Where a decoder stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecoderState {
    /// More bytes remain.
    Ready,
    /// The stream ended on a record boundary.
    Done,
    /// A record failed to decode; see [`Decoder::fault`].
    Faulted,
}

/// One decoded record.
#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    /// The `none` opcode.
    Nop,
    /// A framed record passed over without decoding its operands.
    Skipped {
        /// Raw tag value.
        value: u32,
        /// Operand bytes skipped.
        len: usize,
    },
    /// A drawing call.
    Command(Command),
}

/// Counters for a decode pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeSummary {
    /// Records read, including `none` and skipped frames.
    pub records: usize,
    /// Renderer methods invoked.
    pub calls: usize,
    /// Bytes consumed.
    pub bytes: usize,
}

#[derive(Debug)]
enum Phase {
    Ready,
    Done,
    Faulted(WireError),
}

/// Stream decoder over a byte buffer.
#[derive(Debug)]
pub struct Decoder<B> {
    cursor: ByteCursor<B>,
    config: WireConfig,
    phase: Phase,
    records: usize,
    calls: usize,
}

impl<B: AsRef<[u8]>> Decoder<B> {
    /// Decoder starting at offset 0 of `buffer`.
    pub fn new(buffer: B, config: WireConfig) -> Self {
        let cursor = ByteCursor::with_endian(buffer, config.endian);
        let phase = if cursor.at_end() {
            Phase::Done
        } else {
            Phase::Ready
        };
        Self {
            cursor,
            config,
            phase,
            records: 0,
            calls: 0,
        }
    }

    /// Current state.
    pub const fn state(&self) -> DecoderState {
        match self.phase {
            Phase::Ready => DecoderState::Ready,
            Phase::Done => DecoderState::Done,
            Phase::Faulted(_) => DecoderState::Faulted,
        }
    }

    /// The latched fault, if any.
    pub const fn fault(&self) -> Option<&WireError> {
        match &self.phase {
            Phase::Faulted(err) => Some(err),
            Phase::Ready | Phase::Done => None,
        }
    }

    /// Offset of the next record.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Counters so far.
    pub fn summary(&self) -> DecodeSummary {
        DecodeSummary {
            records: self.records,
            calls: self.calls,
            bytes: self.cursor.position(),
        }
    }

    /// Decode the next record with its byte offset.
    ///
    /// `Ok(None)` once the stream is done.
    ///
    /// # Errors
    /// The fault that ended decoding; returned again on every later call.
    pub fn next_record(&mut self) -> Result<Option<(usize, Record)>, WireError> {
        match &self.phase {
            Phase::Faulted(err) => return Err(err.clone()),
            Phase::Done => return Ok(None),
            Phase::Ready => {}
        }
        let offset = self.cursor.position();
        match self.read_record(offset) {
            Ok(record) => {
                self.records += 1;
                trace!(offset, record = record_label(&record), "record decoded");
                if self.cursor.at_end() {
                    self.phase = Phase::Done;
                }
                Ok(Some((offset, record)))
            }
            Err(err) => {
                warn!(%err, offset, "stream decode faulted");
                self.phase = Phase::Faulted(err.clone());
                Err(err)
            }
        }
    }

    /// Decode the next drawing call, passing over `none` and skipped records.
    ///
    /// # Errors
    /// As [`Decoder::next_record`].
    pub fn next_command(&mut self) -> Result<Option<(usize, Command)>, WireError> {
        while let Some((offset, record)) = self.next_record()? {
            if let Record::Command(command) = record {
                return Ok(Some((offset, command)));
            }
        }
        Ok(None)
    }

    /// Decode one record and, if it is a drawing call, apply it to `g`.
    ///
    /// # Errors
    /// The fault that ended decoding. `g` is not called for the failing record.
    pub fn step<G: Graphics + ?Sized>(&mut self, g: &mut G) -> Result<DecoderState, WireError> {
        if let Some((_, Record::Command(command))) = self.next_record()? {
            command.apply(g);
            self.calls += 1;
        }
        Ok(self.state())
    }

    /// Decode until the stream ends or faults.
    ///
    /// # Errors
    /// The first fault. Calls made before it stand.
    pub fn run<G: Graphics + ?Sized>(&mut self, g: &mut G) -> Result<DecodeSummary, WireError> {
        while self.step(g)? == DecoderState::Ready {}
        Ok(self.summary())
    }

    fn read_record(&mut self, offset: usize) -> Result<Record, WireError> {
        let value = self
            .cursor
            .read_u32()
            .map_err(|e| WireError::from_read(None, offset, &e))?;
        let opcode = Opcode::from_u32(value);
        match self.config.framing {
            Framing::Dense => {
                let opcode = opcode.ok_or(WireError::Desynchronization { value, offset })?;
                Operands {
                    cursor: &mut self.cursor,
                    opcode,
                    offset,
                    config: &self.config,
                }
                .record()
            }
            Framing::LengthPrefixed => self.read_frame(value, opcode, offset),
        }
    }

    fn read_frame(
        &mut self,
        value: u32,
        opcode: Option<Opcode>,
        offset: usize,
    ) -> Result<Record, WireError> {
        let declared = self
            .cursor
            .read_u32()
            .map_err(|e| WireError::from_read(opcode, offset, &e))? as usize;
        let start = self.cursor.position();
        let remaining = self.cursor.remaining();
        if declared > remaining {
            return Err(WireError::Truncation {
                opcode,
                offset,
                needed: declared,
                remaining,
            });
        }

        let record = match opcode {
            // Padding: the body is skipped unread.
            Some(Opcode::Nop) => Record::Nop,
            Some(op) if !op.is_reserved() => {
                let mut frame = self
                    .cursor
                    .range(start, declared)
                    .map_err(|e| WireError::from_read(opcode, offset, &e))?;
                let result = Operands {
                    cursor: &mut frame,
                    opcode: op,
                    offset,
                    config: &self.config,
                }
                .record();
                let consumed = frame.position();
                match result {
                    Ok(record) if consumed == declared => record,
                    Ok(_) => {
                        return Err(WireError::FrameMismatch {
                            opcode: op,
                            offset,
                            declared,
                            consumed,
                        })
                    }
                    Err(WireError::Truncation { needed, .. }) => {
                        return Err(WireError::FrameMismatch {
                            opcode: op,
                            offset,
                            declared,
                            consumed: consumed + needed,
                        })
                    }
                    Err(other) => return Err(other),
                }
            }
            _ => {
                warn!(
                    value,
                    offset,
                    len = declared,
                    "skipping framed record without a decodable layout"
                );
                Record::Skipped {
                    value,
                    len: declared,
                }
            }
        };

        self.cursor
            .seek(start + declared)
            .map_err(|e| WireError::from_read(opcode, offset, &e))?;
        Ok(record)
    }
}

/// Decode `bytes` and replay every call onto `g`.
///
/// # Errors
/// The first fault; calls made before it stand.
pub fn decode_into<G: Graphics + ?Sized>(
    bytes: &[u8],
    config: &WireConfig,
    g: &mut G,
) -> Result<DecodeSummary, WireError> {
    Decoder::new(bytes, config.clone()).run(g)
}

fn record_label(record: &Record) -> &'static str {
    match record {
        Record::Nop => "none",
        Record::Skipped { .. } => "skipped",
        Record::Command(command) => command.name(),
    }
}

/// Operand reader for one record.
struct Operands<'a, C> {
    cursor: &'a mut ByteCursor<C>,
    opcode: Opcode,
    offset: usize,
    config: &'a WireConfig,
}

impl<C: AsRef<[u8]>> Operands<'_, C> {
    fn truncated(&self, err: &CursorError) -> WireError {
        WireError::from_read(Some(self.opcode), self.offset, err)
    }

    fn u32(&mut self) -> Result<u32, WireError> {
        self.cursor.read_u32().map_err(|e| self.truncated(&e))
    }

    fn scalar(&mut self) -> Result<f64, WireError> {
        let v = self.cursor.read_f32().map_err(|e| self.truncated(&e))?;
        Ok(f64::from(v))
    }

    fn point(&mut self) -> Result<Point, WireError> {
        let x = self.scalar()?;
        let y = self.scalar()?;
        Ok(Point::new(x, y))
    }

    fn color(&mut self) -> Result<Color, WireError> {
        self.u32().map(Color::from_argb)
    }

    fn mode<T: WireEnum>(&mut self) -> Result<T, WireError> {
        let value = self.u32()?;
        T::from_wire(value).ok_or_else(|| WireError::InvalidOperand {
            opcode: self.opcode,
            offset: self.offset,
            field: T::FIELD,
            detail: format!("value {value} is not defined"),
        })
    }

    /// Fail before allocating when `needed` bytes cannot be present.
    fn ensure(&self, needed: usize) -> Result<(), WireError> {
        let remaining = self.cursor.remaining();
        if needed > remaining {
            return Err(WireError::Truncation {
                opcode: Some(self.opcode),
                offset: self.offset,
                needed,
                remaining,
            });
        }
        Ok(())
    }

    fn points(&mut self) -> Result<Vec<Point>, WireError> {
        let count = self.u32()?;
        if count > self.config.max_points {
            return Err(WireError::LimitExceeded {
                opcode: self.opcode,
                offset: self.offset,
                what: "points",
                count: u64::from(count),
                max: u64::from(self.config.max_points),
            });
        }
        self.ensure((count as usize).saturating_mul(8))?;
        (0..count).map(|_| self.point()).collect()
    }

    fn image(&mut self) -> Result<Image, WireError> {
        let width = self.u32()?;
        let height = self.u32()?;
        let count = u64::from(width) * u64::from(height);
        if count > self.config.max_image_pixels {
            return Err(WireError::LimitExceeded {
                opcode: self.opcode,
                offset: self.offset,
                what: "pixels",
                count,
                max: self.config.max_image_pixels,
            });
        }
        self.ensure(usize::try_from(count.saturating_mul(4)).unwrap_or(usize::MAX))?;
        let pixels = (0..count)
            .map(|_| self.color())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Image {
            width,
            height,
            pixels,
        })
    }

    /// NUL-terminated string, truncated to the configured bound.
    ///
    /// Bytes past the bound are consumed through the terminator so the next
    /// record starts where the encoder put it.
    fn string(&mut self) -> Result<String, WireError> {
        let max = self.config.max_string_len;
        let z = self
            .cursor
            .read_string_z_full(max)
            .map_err(|e| self.truncated(&e))?;
        if !z.terminated {
            let dropped = self
                .cursor
                .skip_past_nul()
                .map_err(|e| self.truncated(&e))?;
            warn!(
                opcode = self.opcode.name(),
                offset = self.offset,
                kept = z.text.len(),
                dropped,
                "string truncated to fit {max}-byte bound"
            );
        }
        Ok(z.text)
    }

    fn reserved(&self) -> WireError {
        WireError::UnsupportedOperand {
            opcode: self.opcode,
            offset: self.offset,
            reason: "no operand format is defined for this opcode",
        }
    }

    fn record(mut self) -> Result<Record, WireError> {
        let command = match self.opcode {
            Opcode::Nop => return Ok(Record::Nop),
            Opcode::FillGradient | Opcode::FillPattern => return Err(self.reserved()),
            Opcode::AngleMode => Command::AngleMode { mode: self.mode()? },
            Opcode::EllipseMode => Command::EllipseMode { mode: self.mode()? },
            Opcode::RectMode => Command::RectMode { mode: self.mode()? },
            Opcode::BlendMode => Command::BlendMode { mode: self.mode()? },
            Opcode::StrokeCaps => Command::StrokeCaps { cap: self.mode()? },
            Opcode::StrokeJoin => Command::StrokeJoin { join: self.mode()? },
            Opcode::StrokeWeight => Command::StrokeWeight {
                weight: self.scalar()?,
            },
            Opcode::Push => Command::Push,
            Opcode::Pop => Command::Pop,
            Opcode::Translate => Command::Translate {
                x: self.scalar()?,
                y: self.scalar()?,
            },
            Opcode::Scale => Command::Scale {
                sx: self.scalar()?,
                sy: self.scalar()?,
            },
            Opcode::Rotate => Command::Rotate {
                angle: self.scalar()?,
            },
            Opcode::FillColor => Command::Fill {
                color: self.color()?,
            },
            Opcode::FillNone => Command::NoFill,
            Opcode::StrokeColor => Command::Stroke {
                color: self.color()?,
            },
            Opcode::StrokeNone => Command::NoStroke,
            Opcode::Flush => Command::Flush,
            Opcode::LoadPixels => Command::LoadPixels,
            Opcode::UpdatePixels => Command::UpdatePixels,
            Opcode::Clear => Command::Clear,
            Opcode::Background => Command::Background {
                color: self.color()?,
            },
            Opcode::Clip => Command::Clip {
                x: self.scalar()?,
                y: self.scalar()?,
                width: self.scalar()?,
                height: self.scalar()?,
            },
            Opcode::NoClip => Command::NoClip,
            Opcode::Set => Command::Set {
                x: self.scalar()?,
                y: self.scalar()?,
                color: self.color()?,
            },
            Opcode::Point => Command::Point {
                x: self.scalar()?,
                y: self.scalar()?,
            },
            Opcode::Line => Command::Line {
                from: self.point()?,
                to: self.point()?,
            },
            Opcode::Rect => Command::Rect {
                x: self.scalar()?,
                y: self.scalar()?,
                width: self.scalar()?,
                height: self.scalar()?,
            },
            Opcode::RoundRect => Command::RoundRect {
                x: self.scalar()?,
                y: self.scalar()?,
                width: self.scalar()?,
                height: self.scalar()?,
                rx: self.scalar()?,
                ry: self.scalar()?,
            },
            Opcode::Ellipse => Command::Ellipse {
                a: self.scalar()?,
                b: self.scalar()?,
                c: self.scalar()?,
                d: self.scalar()?,
            },
            Opcode::Circle => Command::Circle {
                cx: self.scalar()?,
                cy: self.scalar()?,
                diameter: self.scalar()?,
            },
            Opcode::Triangle => Command::Triangle {
                p1: self.point()?,
                p2: self.point()?,
                p3: self.point()?,
            },
            Opcode::Bezier => Command::Bezier {
                p1: self.point()?,
                c1: self.point()?,
                c2: self.point()?,
                p2: self.point()?,
            },
            Opcode::Polyline => Command::Polyline {
                points: self.points()?,
            },
            Opcode::Polygon => Command::Polygon {
                points: self.points()?,
            },
            Opcode::Quad => Command::Quad {
                p1: self.point()?,
                p2: self.point()?,
                p3: self.point()?,
                p4: self.point()?,
            },
            Opcode::Image => {
                let x = self.scalar()?;
                let y = self.scalar()?;
                let image = self.image()?;
                Command::Image { image, x, y }
            }
            Opcode::ImageScale => {
                let x = self.scalar()?;
                let y = self.scalar()?;
                let width = self.scalar()?;
                let height = self.scalar()?;
                let image = self.image()?;
                Command::ImageScale {
                    image,
                    x,
                    y,
                    width,
                    height,
                }
            }
            Opcode::TextAlign => Command::TextAlign {
                horizontal: self.mode()?,
                vertical: self.mode()?,
            },
            Opcode::TextFont => Command::TextFont {
                name: self.string()?,
            },
            Opcode::TextSize => Command::TextSize {
                size: self.scalar()?,
            },
            Opcode::Text => {
                let x = self.scalar()?;
                let y = self.scalar()?;
                let text = self.string()?;
                Command::Text { text, x, y }
            }
            Opcode::BeginShape => Command::BeginShape { kind: self.mode()? },
            Opcode::Vertex => Command::Vertex {
                x: self.scalar()?,
                y: self.scalar()?,
            },
            Opcode::EndShape => Command::EndShape { mode: self.mode()? },
        };
        Ok(Record::Command(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Recorder;

    fn bare() -> WireConfig {
        WireConfig::default().with_prologue(false)
    }

    fn stream(words: &[u32]) -> Vec<u8> {
        words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    #[test]
    fn test_empty_stream_is_done() {
        let mut rec = Recorder::new();
        let mut dec = Decoder::new(&[0u8; 0][..], bare());
        assert_eq!(dec.state(), DecoderState::Done);
        assert_eq!(dec.run(&mut rec).unwrap(), DecodeSummary::default());
    }

    #[test]
    fn test_fault_is_sticky() {
        let bytes = stream(&[8, 999, 9]);
        let mut rec = Recorder::new();
        let mut dec = Decoder::new(&bytes[..], bare());
        assert_eq!(dec.step(&mut rec).unwrap(), DecoderState::Ready);
        assert_eq!(dec.fault(), None);
        let err = dec.step(&mut rec).unwrap_err();
        assert_eq!(
            err,
            WireError::Desynchronization {
                value: 999,
                offset: 4
            }
        );
        assert_eq!(dec.state(), DecoderState::Faulted);
        assert_eq!(dec.fault(), Some(&err));
        assert_eq!(dec.step(&mut rec).unwrap_err(), err);
        assert_eq!(dec.position(), 8);
        assert_eq!(rec.len(), 1);
    }

    #[test]
    fn test_enum_out_of_range_is_invalid_operand() {
        let bytes = stream(&[3, 7]);
        let mut rec = Recorder::new();
        let err = decode_into(&bytes, &bare(), &mut rec).unwrap_err();
        assert!(matches!(
            err,
            WireError::InvalidOperand {
                opcode: Opcode::RectMode,
                field: "shape mode",
                offset: 0,
                ..
            }
        ));
        assert!(rec.is_empty());
    }

    #[test]
    fn test_reserved_paint_opcode_faults_in_dense_mode() {
        let bytes = stream(&[14]);
        let err = decode_into(&bytes, &bare(), &mut Recorder::new()).unwrap_err();
        assert!(matches!(
            err,
            WireError::UnsupportedOperand {
                opcode: Opcode::FillGradient,
                ..
            }
        ));
    }

    #[test]
    fn test_point_limit_checked_before_allocating() {
        let cfg = WireConfig {
            max_points: 2,
            ..bare()
        };
        let bytes = stream(&[36, 3, 0, 0, 0, 0, 0, 0]);
        let err = decode_into(&bytes, &cfg, &mut Recorder::new()).unwrap_err();
        assert_eq!(
            err,
            WireError::LimitExceeded {
                opcode: Opcode::Polygon,
                offset: 0,
                what: "points",
                count: 3,
                max: 2
            }
        );

        let bytes = stream(&[35, 0x00FF_FFFF]);
        let err = decode_into(&bytes, &bare(), &mut Recorder::new()).unwrap_err();
        assert!(matches!(err, WireError::LimitExceeded { .. }));

        let bytes = stream(&[35, 1000]);
        let err = decode_into(&bytes, &bare(), &mut Recorder::new()).unwrap_err();
        assert_eq!(
            err,
            WireError::Truncation {
                opcode: Some(Opcode::Polyline),
                offset: 0,
                needed: 8000,
                remaining: 0
            }
        );
    }

    #[test]
    fn test_image_limit() {
        let bytes = stream(&[38, 0, 0, 0x1_0000, 0x1_0000]);
        let err = decode_into(&bytes, &bare(), &mut Recorder::new()).unwrap_err();
        assert!(matches!(
            err,
            WireError::LimitExceeded {
                what: "pixels",
                count: 0x1_0000_0000,
                ..
            }
        ));
    }

    #[test]
    fn test_long_string_truncated_and_stream_stays_aligned() {
        let cfg = WireConfig {
            max_string_len: 4,
            ..bare()
        };
        let mut bytes = stream(&[41]);
        bytes.extend_from_slice(b"monospace\0");
        bytes.extend(stream(&[8]));
        let mut rec = Recorder::new();
        decode_into(&bytes, &cfg, &mut rec).unwrap();
        assert_eq!(
            rec.commands(),
            &[
                Command::TextFont {
                    name: "mon".to_owned()
                },
                Command::Push
            ]
        );
    }

    #[test]
    fn test_next_command_skips_nops() {
        let bytes = stream(&[0, 0, 8, 0]);
        let mut dec = Decoder::new(&bytes[..], bare());
        assert_eq!(dec.next_command().unwrap(), Some((8, Command::Push)));
        assert_eq!(dec.next_command().unwrap(), None);
        assert_eq!(dec.summary().records, 4);
        assert_eq!(dec.summary().calls, 0);
    }

    #[test]
    fn test_framed_nop_body_is_padding() {
        let bytes = stream(&[0, 4, 0xDEAD, 8, 0]);
        let mut dec = Decoder::new(&bytes[..], bare().with_framing(Framing::LengthPrefixed));
        assert_eq!(dec.next_record().unwrap(), Some((0, Record::Nop)));
        assert_eq!(
            dec.next_record().unwrap(),
            Some((12, Record::Command(Command::Push)))
        );
        assert_eq!(dec.next_record().unwrap(), None);
        assert_eq!(dec.fault(), None);
        assert_eq!(dec.summary().records, 2);
        assert_eq!(dec.summary().calls, 0);
    }
}
