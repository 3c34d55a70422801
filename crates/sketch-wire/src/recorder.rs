// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Recording renderer for headless testing of command streams.
//!
//! `Recorder` draws nothing. It appends every call as a [`Command`] and keeps
//! an eye on the push/pop stack, which is enough to check that a stream
//! decodes to exactly the calls that produced it.

use sketch_port::{
    AngleMode, BlendMode, Color, Command, EndShape, Gradient, Graphics, HAlign, Image, Pattern,
    Point, ShapeKind, ShapeMode, StrokeCap, StrokeJoin, VAlign,
};

use crate::opcode::Opcode;

/// Recording renderer.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    commands: Vec<Command>,
    depth: usize,
    max_depth: usize,
    underflows: usize,
}

impl Recorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls received, in order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Number of calls received.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no call has been received.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Calls that encode as `opcode`.
    pub fn count(&self, opcode: Opcode) -> usize {
        self.commands
            .iter()
            .filter(|c| Opcode::of(c) == opcode)
            .count()
    }

    /// Current push depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Deepest push depth reached.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Pops received with nothing pushed.
    pub fn underflows(&self) -> usize {
        self.underflows
    }

    /// Whether every push was matched by a pop, and no pop came early.
    pub fn is_balanced(&self) -> bool {
        self.depth == 0 && self.underflows == 0
    }

    /// Take the recorded calls, leaving the stack counters alone.
    pub fn take(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Consume the recorder, keeping its calls.
    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }

    fn record(&mut self, command: Command) {
        self.commands.push(command);
    }
}

impl Graphics for Recorder {
    fn angle_mode(&mut self, mode: AngleMode) {
        self.record(Command::AngleMode { mode });
    }

    fn ellipse_mode(&mut self, mode: ShapeMode) {
        self.record(Command::EllipseMode { mode });
    }

    fn rect_mode(&mut self, mode: ShapeMode) {
        self.record(Command::RectMode { mode });
    }

    fn blend_mode(&mut self, mode: BlendMode) {
        self.record(Command::BlendMode { mode });
    }

    fn stroke_caps(&mut self, cap: StrokeCap) {
        self.record(Command::StrokeCaps { cap });
    }

    fn stroke_join(&mut self, join: StrokeJoin) {
        self.record(Command::StrokeJoin { join });
    }

    fn stroke_weight(&mut self, weight: f64) {
        self.record(Command::StrokeWeight { weight });
    }

    fn push(&mut self) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        self.record(Command::Push);
    }

    fn pop(&mut self) {
        match self.depth.checked_sub(1) {
            Some(depth) => self.depth = depth,
            None => self.underflows += 1,
        }
        self.record(Command::Pop);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.record(Command::Translate { x, y });
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.record(Command::Scale { sx, sy });
    }

    fn rotate(&mut self, angle: f64) {
        self.record(Command::Rotate { angle });
    }

    fn fill(&mut self, color: Color) {
        self.record(Command::Fill { color });
    }

    fn fill_gradient(&mut self, gradient: &Gradient) {
        self.record(Command::FillGradient {
            gradient: gradient.clone(),
        });
    }

    fn fill_pattern(&mut self, pattern: &Pattern) {
        self.record(Command::FillPattern {
            pattern: pattern.clone(),
        });
    }

    fn no_fill(&mut self) {
        self.record(Command::NoFill);
    }

    fn stroke(&mut self, color: Color) {
        self.record(Command::Stroke { color });
    }

    fn no_stroke(&mut self) {
        self.record(Command::NoStroke);
    }

    fn flush(&mut self) {
        self.record(Command::Flush);
    }

    fn load_pixels(&mut self) {
        self.record(Command::LoadPixels);
    }

    fn update_pixels(&mut self) {
        self.record(Command::UpdatePixels);
    }

    fn clear(&mut self) {
        self.record(Command::Clear);
    }

    fn background(&mut self, color: Color) {
        self.record(Command::Background { color });
    }

    fn clip(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.record(Command::Clip {
            x,
            y,
            width,
            height,
        });
    }

    fn no_clip(&mut self) {
        self.record(Command::NoClip);
    }

    fn set(&mut self, x: f64, y: f64, color: Color) {
        self.record(Command::Set { x, y, color });
    }

    fn point(&mut self, x: f64, y: f64) {
        self.record(Command::Point { x, y });
    }

    fn line(&mut self, from: Point, to: Point) {
        self.record(Command::Line { from, to });
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.record(Command::Rect {
            x,
            y,
            width,
            height,
        });
    }

    fn round_rect(&mut self, x: f64, y: f64, width: f64, height: f64, rx: f64, ry: f64) {
        self.record(Command::RoundRect {
            x,
            y,
            width,
            height,
            rx,
            ry,
        });
    }

    fn ellipse(&mut self, a: f64, b: f64, c: f64, d: f64) {
        self.record(Command::Ellipse { a, b, c, d });
    }

    fn circle(&mut self, cx: f64, cy: f64, diameter: f64) {
        self.record(Command::Circle { cx, cy, diameter });
    }

    fn triangle(&mut self, p1: Point, p2: Point, p3: Point) {
        self.record(Command::Triangle { p1, p2, p3 });
    }

    fn bezier(&mut self, p1: Point, c1: Point, c2: Point, p2: Point) {
        self.record(Command::Bezier { p1, c1, c2, p2 });
    }

    fn polyline(&mut self, points: &[Point]) {
        self.record(Command::Polyline {
            points: points.to_vec(),
        });
    }

    fn polygon(&mut self, points: &[Point]) {
        self.record(Command::Polygon {
            points: points.to_vec(),
        });
    }

    fn quad(&mut self, p1: Point, p2: Point, p3: Point, p4: Point) {
        self.record(Command::Quad { p1, p2, p3, p4 });
    }

    fn image(&mut self, image: &Image, x: f64, y: f64) {
        self.record(Command::Image {
            image: image.clone(),
            x,
            y,
        });
    }

    fn image_scale(&mut self, image: &Image, x: f64, y: f64, width: f64, height: f64) {
        self.record(Command::ImageScale {
            image: image.clone(),
            x,
            y,
            width,
            height,
        });
    }

    fn text_align(&mut self, horizontal: HAlign, vertical: VAlign) {
        self.record(Command::TextAlign {
            horizontal,
            vertical,
        });
    }

    fn text_font(&mut self, name: &str) {
        self.record(Command::TextFont {
            name: name.to_owned(),
        });
    }

    fn text_size(&mut self, size: f64) {
        self.record(Command::TextSize { size });
    }

    fn text(&mut self, text: &str, x: f64, y: f64) {
        self.record(Command::Text {
            text: text.to_owned(),
            x,
            y,
        });
    }

    fn begin_shape(&mut self, kind: ShapeKind) {
        self.record(Command::BeginShape { kind });
    }

    fn vertex(&mut self, x: f64, y: f64) {
        self.record(Command::Vertex { x, y });
    }

    fn end_shape(&mut self, mode: EndShape) {
        self.record(Command::EndShape { mode });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let mut rec = Recorder::new();
        rec.push();
        rec.fill(Color::RED);
        rec.rect(10.0, 10.0, 50.0, 50.0);
        rec.pop();
        assert_eq!(
            rec.commands(),
            &[
                Command::Push,
                Command::Fill { color: Color::RED },
                Command::Rect {
                    x: 10.0,
                    y: 10.0,
                    width: 50.0,
                    height: 50.0
                },
                Command::Pop,
            ]
        );
        assert_eq!(rec.count(Opcode::FillColor), 1);
        assert_eq!(rec.count(Opcode::Polygon), 0);
    }

    #[test]
    fn test_stack_tracking() {
        let mut rec = Recorder::new();
        rec.push();
        rec.push();
        rec.pop();
        assert_eq!(rec.depth(), 1);
        assert_eq!(rec.max_depth(), 2);
        rec.pop();
        rec.pop();
        assert_eq!(rec.depth(), 0);
        assert_eq!(rec.underflows(), 1);
        assert!(!rec.is_balanced());
        rec.clear();
        assert!(rec.is_balanced());
        assert!(rec.is_empty());
    }

    #[test]
    fn test_take_empties_the_log() {
        let mut rec = Recorder::new();
        rec.no_fill();
        rec.push();
        let taken = rec.take();
        assert_eq!(taken, vec![Command::NoFill, Command::Push]);
        assert!(rec.is_empty());
        assert_eq!(rec.depth(), 1);
    }
}
