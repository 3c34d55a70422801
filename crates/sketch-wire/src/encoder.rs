// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! [`Graphics`] implementation that serializes calls into a byte buffer.
//!
//! Every call becomes one record. Records are atomic: a record that does not
//! fit is rolled back and the encoder latches the error, refusing every later
//! call. A stream is therefore always a whole-record prefix of what the caller
//! drew, and [`Encoder::finish`] says whether it is the whole thing.
//!
//! Coordinates narrow from `f64` to `f32` on the way out.

use sketch_port::{
    AngleMode, BlendMode, Color, Command, EndShape, Gradient, Graphics, HAlign, Image, Pattern,
    Point, ShapeKind, ShapeMode, StrokeCap, StrokeJoin, VAlign,
};
use tracing::{debug, trace, warn};

use crate::config::{Framing, PaintFallback, WireConfig};
use crate::cursor::{ByteCursor, CursorError};
use crate::error::WireError;
use crate::opcode::{Opcode, WireEnum};

/// Records written by a new encoder when [`WireConfig::prologue`] is set.
///
/// They pin every piece of renderer state a stream might otherwise inherit
/// from whatever drew before it.
pub fn prologue() -> Vec<Command> {
    vec![
        Command::Fill {
            color: Color::WHITE,
        },
        Command::Stroke {
            color: Color::BLACK,
        },
        Command::StrokeWeight { weight: 1.0 },
        Command::RectMode {
            mode: ShapeMode::Corner,
        },
        Command::EllipseMode {
            mode: ShapeMode::Center,
        },
        Command::AngleMode {
            mode: AngleMode::Radians,
        },
        Command::TextFont {
            name: "sans-serif".to_owned(),
        },
        Command::TextSize { size: 12.0 },
    ]
}

/// Stream encoder over a fixed buffer.
#[derive(Debug)]
pub struct Encoder<B> {
    cursor: ByteCursor<B>,
    config: WireConfig,
    records: usize,
    error: Option<WireError>,
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Encoder<B> {
    /// Encoder writing from the start of `buffer`.
    ///
    /// Emits the prologue first when the config asks for it; a buffer too small
    /// for the prologue yields an encoder that is already failed.
    pub fn new(buffer: B, config: WireConfig) -> Self {
        let cursor = ByteCursor::with_endian(buffer, config.endian);
        let mut encoder = Self {
            cursor,
            config,
            records: 0,
            error: None,
        };
        debug!(
            capacity = encoder.cursor.len(),
            framing = ?encoder.config.framing,
            endian = ?encoder.config.endian,
            prologue = encoder.config.prologue,
            "encoder ready"
        );
        if encoder.config.prologue {
            for command in prologue() {
                command.apply(&mut encoder);
            }
        }
        encoder
    }

    /// Bytes written so far.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Records written so far (prologue included).
    pub fn records(&self) -> usize {
        self.records
    }

    /// The latched error, if any.
    pub fn error(&self) -> Option<&WireError> {
        self.error.as_ref()
    }

    /// `Ok` while every record so far has been written.
    pub fn status(&self) -> Result<(), WireError> {
        self.error.clone().map_or(Ok(()), Err)
    }

    /// Number of bytes in a complete stream, or the latched error.
    pub fn finish(&self) -> Result<usize, WireError> {
        self.status().map(|()| self.cursor.position())
    }

    /// The encoded bytes so far. Always a whole number of records.
    pub fn as_bytes(&self) -> &[u8] {
        self.cursor.written()
    }

    /// Release the buffer together with the number of valid bytes in it.
    pub fn into_inner(self) -> (B, usize) {
        let len = self.cursor.position();
        (self.cursor.into_inner(), len)
    }

    /// Write one record. `operands` writes everything after the tag.
    fn emit<F>(&mut self, opcode: Opcode, operands: F)
    where
        F: FnOnce(&mut ByteCursor<B>) -> Result<(), CursorError>,
    {
        if self.error.is_some() {
            return;
        }
        let start = self.cursor.position();
        match self.write_record(opcode, operands) {
            Ok(()) => {
                self.records += 1;
                trace!(offset = start, opcode = opcode.name(), "record written");
            }
            Err(err) => {
                // Records are atomic: drop whatever part of this one landed.
                let _ = self.cursor.seek(start);
                self.latch(WireError::from_write(opcode, start, &err));
            }
        }
    }

    fn write_record<F>(&mut self, opcode: Opcode, operands: F) -> Result<(), CursorError>
    where
        F: FnOnce(&mut ByteCursor<B>) -> Result<(), CursorError>,
    {
        self.cursor.write_u32(opcode.as_u32())?;
        match self.config.framing {
            Framing::Dense => operands(&mut self.cursor),
            Framing::LengthPrefixed => {
                let len_at = self.cursor.position();
                self.cursor.write_u32(0)?;
                operands(&mut self.cursor)?;
                let end = self.cursor.position();
                let body = end - len_at - 4;
                let body_len = u32::try_from(body).map_err(|_| CursorError::BufferExhausted {
                    needed: body,
                    remaining: u32::MAX as usize,
                })?;
                self.cursor.seek(len_at)?;
                self.cursor.write_u32(body_len)?;
                self.cursor.seek(end)
            }
        }
    }

    fn latch(&mut self, err: WireError) {
        if self.error.is_none() {
            warn!(%err, "encoder failed; further records refused");
            self.error = Some(err);
        }
    }

    /// Fail the next record without writing it.
    fn refuse(&mut self, opcode: Opcode, err: impl FnOnce(usize) -> WireError) {
        if self.error.is_none() {
            let offset = self.cursor.position();
            debug!(opcode = opcode.name(), offset, "record refused");
            self.latch(err(offset));
        }
    }

    fn mode<T: WireEnum>(&mut self, opcode: Opcode, value: T) {
        self.emit(opcode, |c| c.write_u32(value.to_wire()));
    }

    fn scalars(&mut self, opcode: Opcode, values: &[f64]) {
        self.emit(opcode, |c| put_scalars(c, values));
    }

    fn points(&mut self, opcode: Opcode, points: &[Point]) {
        self.emit(opcode, |c| points.iter().try_for_each(|p| put_point(c, *p)));
    }

    fn color(&mut self, opcode: Opcode, color: Color) {
        self.emit(opcode, |c| c.write_u32(color.to_argb()));
    }

    fn point_list(&mut self, opcode: Opcode, points: &[Point]) {
        let Ok(count) = u32::try_from(points.len()) else {
            self.refuse(opcode, |offset| WireError::UnsupportedOperand {
                opcode,
                offset,
                reason: "more points than a u32 count can describe",
            });
            return;
        };
        self.emit(opcode, |c| {
            c.write_u32(count)?;
            points.iter().try_for_each(|p| put_point(c, *p))
        });
    }

    fn image_record(&mut self, opcode: Opcode, image: &Image, placement: &[f64]) {
        if !image.is_valid() {
            let detail = format!(
                "{}x{} image carries {} pixels",
                image.width,
                image.height,
                image.pixels.len()
            );
            self.refuse(opcode, |offset| WireError::InvalidOperand {
                opcode,
                offset,
                field: "image",
                detail,
            });
            return;
        }
        self.emit(opcode, |c| {
            put_scalars(c, placement)?;
            c.write_u32(image.width)?;
            c.write_u32(image.height)?;
            image
                .pixels
                .iter()
                .try_for_each(|p| c.write_u32(p.to_argb()))
        });
    }

    fn string_record(&mut self, opcode: Opcode, prefix: &[f64], text: &str) {
        self.emit(opcode, |c| {
            put_scalars(c, prefix)?;
            c.write_string_z(text)
        });
    }
}

impl Encoder<Vec<u8>> {
    /// Encoder over an owned, zeroed buffer of `capacity` bytes.
    pub fn with_capacity(capacity: usize, config: WireConfig) -> Self {
        Self::new(vec![0; capacity], config)
    }

    /// Exactly the encoded bytes, or the latched error.
    pub fn into_bytes(self) -> Result<Vec<u8>, WireError> {
        self.status()?;
        let (mut buf, len) = self.into_inner();
        buf.truncate(len);
        Ok(buf)
    }
}

/// Encode a command log into a new buffer of at most `capacity` bytes.
///
/// # Errors
/// Returns the first record that could not be written.
pub fn encode_commands(
    commands: &[Command],
    config: &WireConfig,
    capacity: usize,
) -> Result<Vec<u8>, WireError> {
    let mut encoder = Encoder::with_capacity(capacity, config.clone());
    sketch_port::replay(commands, &mut encoder);
    encoder.into_bytes()
}

#[allow(clippy::cast_possible_truncation)]
fn narrow(value: f64) -> f32 {
    value as f32
}

fn put_scalars<B>(c: &mut ByteCursor<B>, values: &[f64]) -> Result<(), CursorError>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    values.iter().try_for_each(|v| c.write_f32(narrow(*v)))
}

fn put_point<B>(c: &mut ByteCursor<B>, p: Point) -> Result<(), CursorError>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    c.write_f32(narrow(p.x))?;
    c.write_f32(narrow(p.y))
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Graphics for Encoder<B> {
    fn angle_mode(&mut self, mode: AngleMode) {
        self.mode(Opcode::AngleMode, mode);
    }

    fn ellipse_mode(&mut self, mode: ShapeMode) {
        self.mode(Opcode::EllipseMode, mode);
    }

    fn rect_mode(&mut self, mode: ShapeMode) {
        self.mode(Opcode::RectMode, mode);
    }

    fn blend_mode(&mut self, mode: BlendMode) {
        self.mode(Opcode::BlendMode, mode);
    }

    fn stroke_caps(&mut self, cap: StrokeCap) {
        self.mode(Opcode::StrokeCaps, cap);
    }

    fn stroke_join(&mut self, join: StrokeJoin) {
        self.mode(Opcode::StrokeJoin, join);
    }

    fn stroke_weight(&mut self, weight: f64) {
        self.scalars(Opcode::StrokeWeight, &[weight]);
    }

    fn push(&mut self) {
        self.emit(Opcode::Push, |_| Ok(()));
    }

    fn pop(&mut self) {
        self.emit(Opcode::Pop, |_| Ok(()));
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.scalars(Opcode::Translate, &[x, y]);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.scalars(Opcode::Scale, &[sx, sy]);
    }

    fn rotate(&mut self, angle: f64) {
        self.scalars(Opcode::Rotate, &[angle]);
    }

    fn fill(&mut self, color: Color) {
        self.color(Opcode::FillColor, color);
    }

    fn fill_gradient(&mut self, gradient: &Gradient) {
        match self.config.paint_fallback {
            PaintFallback::Approximate => {
                warn!(
                    stops = gradient.stops.len(),
                    "gradient fill approximated by its first stop"
                );
                match gradient.first_color() {
                    Some(color) => self.fill(color),
                    None => self.no_fill(),
                }
            }
            PaintFallback::Reject => {
                self.refuse(Opcode::FillGradient, |offset| {
                    WireError::UnsupportedOperand {
                        opcode: Opcode::FillGradient,
                        offset,
                        reason: "gradient fills have no wire encoding",
                    }
                });
            }
        }
    }

    fn fill_pattern(&mut self, pattern: &Pattern) {
        match self.config.paint_fallback {
            PaintFallback::Approximate => {
                warn!(
                    width = pattern.image.width,
                    height = pattern.image.height,
                    "pattern fill approximated by its mean color"
                );
                match pattern.image.mean_color() {
                    Some(color) => self.fill(color),
                    None => self.no_fill(),
                }
            }
            PaintFallback::Reject => {
                self.refuse(Opcode::FillPattern, |offset| {
                    WireError::UnsupportedOperand {
                        opcode: Opcode::FillPattern,
                        offset,
                        reason: "pattern fills have no wire encoding",
                    }
                });
            }
        }
    }

    fn no_fill(&mut self) {
        self.emit(Opcode::FillNone, |_| Ok(()));
    }

    fn stroke(&mut self, color: Color) {
        self.color(Opcode::StrokeColor, color);
    }

    fn no_stroke(&mut self) {
        self.emit(Opcode::StrokeNone, |_| Ok(()));
    }

    fn flush(&mut self) {
        self.emit(Opcode::Flush, |_| Ok(()));
    }

    fn load_pixels(&mut self) {
        self.emit(Opcode::LoadPixels, |_| Ok(()));
    }

    fn update_pixels(&mut self) {
        self.emit(Opcode::UpdatePixels, |_| Ok(()));
    }

    fn clear(&mut self) {
        self.emit(Opcode::Clear, |_| Ok(()));
    }

    fn background(&mut self, color: Color) {
        self.color(Opcode::Background, color);
    }

    fn clip(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.scalars(Opcode::Clip, &[x, y, width, height]);
    }

    fn no_clip(&mut self) {
        self.emit(Opcode::NoClip, |_| Ok(()));
    }

    fn set(&mut self, x: f64, y: f64, color: Color) {
        self.emit(Opcode::Set, |c| {
            put_scalars(c, &[x, y])?;
            c.write_u32(color.to_argb())
        });
    }

    fn point(&mut self, x: f64, y: f64) {
        self.scalars(Opcode::Point, &[x, y]);
    }

    fn line(&mut self, from: Point, to: Point) {
        self.points(Opcode::Line, &[from, to]);
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.scalars(Opcode::Rect, &[x, y, width, height]);
    }

    fn round_rect(&mut self, x: f64, y: f64, width: f64, height: f64, rx: f64, ry: f64) {
        self.scalars(Opcode::RoundRect, &[x, y, width, height, rx, ry]);
    }

    fn ellipse(&mut self, a: f64, b: f64, c: f64, d: f64) {
        self.scalars(Opcode::Ellipse, &[a, b, c, d]);
    }

    fn circle(&mut self, cx: f64, cy: f64, diameter: f64) {
        self.scalars(Opcode::Circle, &[cx, cy, diameter]);
    }

    fn triangle(&mut self, p1: Point, p2: Point, p3: Point) {
        self.points(Opcode::Triangle, &[p1, p2, p3]);
    }

    fn bezier(&mut self, p1: Point, c1: Point, c2: Point, p2: Point) {
        self.points(Opcode::Bezier, &[p1, c1, c2, p2]);
    }

    fn polyline(&mut self, points: &[Point]) {
        self.point_list(Opcode::Polyline, points);
    }

    fn polygon(&mut self, points: &[Point]) {
        self.point_list(Opcode::Polygon, points);
    }

    fn quad(&mut self, p1: Point, p2: Point, p3: Point, p4: Point) {
        self.points(Opcode::Quad, &[p1, p2, p3, p4]);
    }

    fn image(&mut self, image: &Image, x: f64, y: f64) {
        self.image_record(Opcode::Image, image, &[x, y]);
    }

    fn image_scale(&mut self, image: &Image, x: f64, y: f64, width: f64, height: f64) {
        self.image_record(Opcode::ImageScale, image, &[x, y, width, height]);
    }

    fn text_align(&mut self, horizontal: HAlign, vertical: VAlign) {
        self.emit(Opcode::TextAlign, |c| {
            c.write_u32(horizontal.to_wire())?;
            c.write_u32(vertical.to_wire())
        });
    }

    fn text_font(&mut self, name: &str) {
        self.string_record(Opcode::TextFont, &[], name);
    }

    fn text_size(&mut self, size: f64) {
        self.scalars(Opcode::TextSize, &[size]);
    }

    fn text(&mut self, text: &str, x: f64, y: f64) {
        self.string_record(Opcode::Text, &[x, y], text);
    }

    fn begin_shape(&mut self, kind: ShapeKind) {
        self.mode(Opcode::BeginShape, kind);
    }

    fn vertex(&mut self, x: f64, y: f64) {
        self.scalars(Opcode::Vertex, &[x, y]);
    }

    fn end_shape(&mut self, mode: EndShape) {
        self.mode(Opcode::EndShape, mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Endian;

    fn bare() -> WireConfig {
        WireConfig::default().with_prologue(false)
    }

    fn words(bytes: &[u8]) -> Vec<u32> {
        bytes
            .chunks_exact(4)
            .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
            .collect()
    }

    #[test]
    fn test_fixed_records_match_table_lengths() {
        let mut enc = Encoder::with_capacity(256, bare());
        let cases = [
            Command::Push,
            Command::Rect {
                x: 1.0,
                y: 2.0,
                width: 3.0,
                height: 4.0,
            },
            Command::RoundRect {
                x: 0.0,
                y: 0.0,
                width: 1.0,
                height: 1.0,
                rx: 0.5,
                ry: 0.5,
            },
            Command::Set {
                x: 1.0,
                y: 1.0,
                color: Color::RED,
            },
            Command::Bezier {
                p1: Point::new(0.0, 0.0),
                c1: Point::new(1.0, 1.0),
                c2: Point::new(2.0, 2.0),
                p2: Point::new(3.0, 3.0),
            },
            Command::TextAlign {
                horizontal: HAlign::Center,
                vertical: VAlign::Top,
            },
        ];
        for command in &cases {
            let before = enc.position();
            command.apply(&mut enc);
            let opcode = Opcode::of(command);
            let fixed = opcode.fixed_operand_len().unwrap();
            assert_eq!(enc.position() - before, 4 + fixed, "{opcode}");
        }
        assert_eq!(enc.records(), cases.len());
    }

    #[test]
    fn test_prologue_is_written_first() {
        let enc = Encoder::with_capacity(256, WireConfig::default());
        assert_eq!(enc.records(), prologue().len());
        let bytes = enc.into_bytes().unwrap();
        assert_eq!(words(&bytes[..8]), vec![13, 0xFFFF_FFFF]);
        assert_eq!(words(&bytes[8..16]), vec![17, 0xFF00_0000]);
    }

    #[test]
    fn test_prologue_that_does_not_fit_fails_the_encoder() {
        let enc = Encoder::with_capacity(10, WireConfig::default());
        assert!(matches!(
            enc.error(),
            Some(WireError::BufferExhausted {
                opcode: Opcode::StrokeColor,
                offset: 8,
                ..
            })
        ));
        assert_eq!(enc.position(), 8);
    }

    #[test]
    fn test_exhaustion_rolls_back_and_latches() {
        let mut enc = Encoder::with_capacity(20, bare());
        enc.push();
        enc.rect(0.0, 0.0, 5.0, 5.0);
        assert_eq!(enc.position(), 4);
        enc.pop();
        assert_eq!(enc.position(), 4);
        assert_eq!(enc.records(), 1);
        let err = enc.finish().unwrap_err();
        assert_eq!(
            err,
            WireError::BufferExhausted {
                opcode: Opcode::Rect,
                offset: 4,
                needed: 4,
                remaining: 0,
            }
        );
        assert_eq!(enc.as_bytes(), &[8, 0, 0, 0]);
    }

    #[test]
    fn test_big_endian_output() {
        let cfg = bare().with_endian(Endian::Big);
        let mut enc = Encoder::with_capacity(16, cfg);
        enc.fill(Color::RED);
        assert_eq!(
            enc.into_bytes().unwrap(),
            vec![0, 0, 0, 13, 0xFF, 0xFF, 0, 0]
        );
    }

    #[test]
    fn test_interior_nul_is_invalid_operand() {
        let mut enc = Encoder::with_capacity(64, bare());
        enc.text("a\0b", 0.0, 0.0);
        enc.push();
        assert!(matches!(
            enc.error(),
            Some(WireError::InvalidOperand {
                opcode: Opcode::Text,
                offset: 0,
                ..
            })
        ));
        assert_eq!(enc.position(), 0);
    }

    #[test]
    fn test_invalid_image_is_refused() {
        let mut enc = Encoder::with_capacity(64, bare());
        let bad = Image {
            width: 2,
            height: 2,
            pixels: vec![Color::RED],
        };
        enc.image(&bad, 0.0, 0.0);
        assert!(matches!(
            enc.finish(),
            Err(WireError::InvalidOperand {
                field: "image",
                ..
            })
        ));
    }

    #[test]
    fn test_gradient_fallback_writes_first_stop() {
        use sketch_port::{ColorStop, GradientKind};
        let gradient = Gradient {
            kind: GradientKind::Linear {
                start: Point::new(0.0, 0.0),
                end: Point::new(1.0, 0.0),
            },
            stops: vec![ColorStop {
                offset: 0.0,
                color: Color::BLUE,
            }],
        };
        let mut enc = Encoder::with_capacity(64, bare());
        enc.fill_gradient(&gradient);
        enc.fill_gradient(&Gradient {
            stops: vec![],
            ..gradient.clone()
        });
        assert_eq!(words(enc.as_bytes()), vec![13, 0xFF00_00FF, 16]);

        let mut strict = Encoder::with_capacity(
            64,
            bare().with_paint_fallback(PaintFallback::Reject),
        );
        strict.fill_gradient(&gradient);
        assert!(matches!(
            strict.error(),
            Some(WireError::UnsupportedOperand {
                opcode: Opcode::FillGradient,
                ..
            })
        ));
    }

    #[test]
    fn test_pattern_fallback_writes_mean_color() {
        let mut enc = Encoder::with_capacity(64, bare());
        enc.fill_pattern(&Pattern {
            image: Image::filled(2, 2, Color::GREEN),
        });
        assert_eq!(words(enc.as_bytes()), vec![13, 0xFF00_FF00]);
    }

    #[test]
    fn test_framed_records_carry_operand_length() {
        let cfg = bare().with_framing(Framing::LengthPrefixed);
        let mut enc = Encoder::with_capacity(64, cfg);
        enc.push();
        enc.translate(1.0, 2.0);
        enc.text_font("ab");
        let bytes = enc.into_bytes().unwrap();
        assert_eq!(words(&bytes[..8]), vec![8, 0]);
        assert_eq!(words(&bytes[8..16]), vec![10, 8]);
        assert_eq!(words(&bytes[24..32]), vec![41, 3]);
        assert_eq!(&bytes[32..], b"ab\0");
    }

    #[test]
    fn test_encode_commands() {
        let bytes = encode_commands(&[Command::Push, Command::Pop], &bare(), 8).unwrap();
        assert_eq!(words(&bytes), vec![8, 9]);
        assert!(encode_commands(&[Command::Push, Command::Pop], &bare(), 7).is_err());
    }
}
