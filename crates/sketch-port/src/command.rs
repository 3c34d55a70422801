// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Owned, replayable form of a single [`Graphics`] call.

use alloc::string::String;
use alloc::vec::Vec;

use crate::{
    AngleMode, BlendMode, Color, EndShape, Gradient, Graphics, HAlign, Image, Pattern, Point,
    ShapeKind, ShapeMode, StrokeCap, StrokeJoin, VAlign,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One drawing call with its arguments.
///
/// There is exactly one variant per [`Graphics`] method. Commands are applied
/// in order; a `Vec<Command>` is a replay log, not a set.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "op", rename_all = "camelCase"))]
pub enum Command {
    /// [`Graphics::angle_mode`].
    AngleMode {
        /// Unit for later rotations.
        mode: AngleMode,
    },
    /// [`Graphics::ellipse_mode`].
    EllipseMode {
        /// How ellipse numbers are read.
        mode: ShapeMode,
    },
    /// [`Graphics::rect_mode`].
    RectMode {
        /// How rectangle numbers are read.
        mode: ShapeMode,
    },
    /// [`Graphics::blend_mode`].
    BlendMode {
        /// Compositing operator.
        mode: BlendMode,
    },
    /// [`Graphics::stroke_caps`].
    StrokeCaps {
        /// Line end style.
        cap: StrokeCap,
    },
    /// [`Graphics::stroke_join`].
    StrokeJoin {
        /// Line corner style.
        join: StrokeJoin,
    },
    /// [`Graphics::stroke_weight`].
    StrokeWeight {
        /// Line width.
        weight: f64,
    },
    /// [`Graphics::push`].
    Push,
    /// [`Graphics::pop`].
    Pop,
    /// [`Graphics::translate`].
    Translate {
        /// Horizontal offset.
        x: f64,
        /// Vertical offset.
        y: f64,
    },
    /// [`Graphics::scale`].
    Scale {
        /// Horizontal factor.
        sx: f64,
        /// Vertical factor.
        sy: f64,
    },
    /// [`Graphics::rotate`].
    Rotate {
        /// Angle in the current [`AngleMode`] unit.
        angle: f64,
    },
    /// [`Graphics::fill`].
    Fill {
        /// Solid fill.
        color: Color,
    },
    /// [`Graphics::fill_gradient`].
    FillGradient {
        /// Gradient fill.
        gradient: Gradient,
    },
    /// [`Graphics::fill_pattern`].
    FillPattern {
        /// Tiled image fill.
        pattern: Pattern,
    },
    /// [`Graphics::no_fill`].
    NoFill,
    /// [`Graphics::stroke`].
    Stroke {
        /// Stroke color.
        color: Color,
    },
    /// [`Graphics::no_stroke`].
    NoStroke,
    /// [`Graphics::flush`].
    Flush,
    /// [`Graphics::load_pixels`].
    LoadPixels,
    /// [`Graphics::update_pixels`].
    UpdatePixels,
    /// [`Graphics::clear`].
    Clear,
    /// [`Graphics::background`].
    Background {
        /// Color covering the whole surface.
        color: Color,
    },
    /// [`Graphics::clip`].
    Clip {
        /// Left edge.
        x: f64,
        /// Top edge.
        y: f64,
        /// Clip width.
        width: f64,
        /// Clip height.
        height: f64,
    },
    /// [`Graphics::no_clip`].
    NoClip,
    /// [`Graphics::set`].
    Set {
        /// Pixel column.
        x: f64,
        /// Pixel row.
        y: f64,
        /// New pixel value.
        color: Color,
    },
    /// [`Graphics::point`].
    Point {
        /// Horizontal position.
        x: f64,
        /// Vertical position.
        y: f64,
    },
    /// [`Graphics::line`].
    Line {
        /// Start of the segment.
        from: Point,
        /// End of the segment.
        to: Point,
    },
    /// [`Graphics::rect`]; the four numbers follow the current rect mode.
    Rect {
        /// First horizontal number.
        x: f64,
        /// First vertical number.
        y: f64,
        /// Second horizontal number.
        width: f64,
        /// Second vertical number.
        height: f64,
    },
    /// [`Graphics::round_rect`].
    RoundRect {
        /// Left edge.
        x: f64,
        /// Top edge.
        y: f64,
        /// Rectangle width.
        width: f64,
        /// Rectangle height.
        height: f64,
        /// Horizontal corner radius.
        rx: f64,
        /// Vertical corner radius.
        ry: f64,
    },
    /// [`Graphics::ellipse`]; `a`..`d` follow the current ellipse mode.
    Ellipse {
        /// First horizontal number.
        a: f64,
        /// First vertical number.
        b: f64,
        /// Second horizontal number.
        c: f64,
        /// Second vertical number.
        d: f64,
    },
    /// [`Graphics::circle`].
    Circle {
        /// Center x.
        cx: f64,
        /// Center y.
        cy: f64,
        /// Diameter, not radius.
        diameter: f64,
    },
    /// [`Graphics::triangle`].
    Triangle {
        /// First corner.
        p1: Point,
        /// Second corner.
        p2: Point,
        /// Third corner.
        p3: Point,
    },
    /// [`Graphics::bezier`].
    Bezier {
        /// Start point.
        p1: Point,
        /// Control near the start.
        c1: Point,
        /// Control near the end.
        c2: Point,
        /// End point.
        p2: Point,
    },
    /// [`Graphics::polyline`].
    Polyline {
        /// Vertices in drawing order.
        points: Vec<Point>,
    },
    /// [`Graphics::polygon`].
    Polygon {
        /// Vertices in drawing order; the last joins the first.
        points: Vec<Point>,
    },
    /// [`Graphics::quad`].
    Quad {
        /// First corner.
        p1: Point,
        /// Second corner.
        p2: Point,
        /// Third corner.
        p3: Point,
        /// Fourth corner.
        p4: Point,
    },
    /// [`Graphics::image`].
    Image {
        /// Pixels to draw.
        image: Image,
        /// Left edge.
        x: f64,
        /// Top edge.
        y: f64,
    },
    /// [`Graphics::image_scale`].
    ImageScale {
        /// Pixels to draw.
        image: Image,
        /// Left edge of the target rectangle.
        x: f64,
        /// Top edge of the target rectangle.
        y: f64,
        /// Target width.
        width: f64,
        /// Target height.
        height: f64,
    },
    /// [`Graphics::text_align`].
    TextAlign {
        /// Placement relative to the anchor x.
        horizontal: HAlign,
        /// Placement relative to the anchor y.
        vertical: VAlign,
    },
    /// [`Graphics::text_font`].
    TextFont {
        /// Font family.
        name: String,
    },
    /// [`Graphics::text_size`].
    TextSize {
        /// Font size.
        size: f64,
    },
    /// [`Graphics::text`].
    Text {
        /// String to draw.
        text: String,
        /// Anchor x.
        x: f64,
        /// Anchor y.
        y: f64,
    },
    /// [`Graphics::begin_shape`].
    BeginShape {
        /// Primitive the vertices form.
        kind: ShapeKind,
    },
    /// [`Graphics::vertex`].
    Vertex {
        /// Horizontal position.
        x: f64,
        /// Vertical position.
        y: f64,
    },
    /// [`Graphics::end_shape`].
    EndShape {
        /// Whether to close the outline.
        mode: EndShape,
    },
}

impl Command {
    /// Invoke the matching method on `g`.
    pub fn apply<G: Graphics + ?Sized>(&self, g: &mut G) {
        match self {
            Self::AngleMode { mode } => g.angle_mode(*mode),
            Self::EllipseMode { mode } => g.ellipse_mode(*mode),
            Self::RectMode { mode } => g.rect_mode(*mode),
            Self::BlendMode { mode } => g.blend_mode(*mode),
            Self::StrokeCaps { cap } => g.stroke_caps(*cap),
            Self::StrokeJoin { join } => g.stroke_join(*join),
            Self::StrokeWeight { weight } => g.stroke_weight(*weight),
            Self::Push => g.push(),
            Self::Pop => g.pop(),
            Self::Translate { x, y } => g.translate(*x, *y),
            Self::Scale { sx, sy } => g.scale(*sx, *sy),
            Self::Rotate { angle } => g.rotate(*angle),
            Self::Fill { color } => g.fill(*color),
            Self::FillGradient { gradient } => g.fill_gradient(gradient),
            Self::FillPattern { pattern } => g.fill_pattern(pattern),
            Self::NoFill => g.no_fill(),
            Self::Stroke { color } => g.stroke(*color),
            Self::NoStroke => g.no_stroke(),
            Self::Flush => g.flush(),
            Self::LoadPixels => g.load_pixels(),
            Self::UpdatePixels => g.update_pixels(),
            Self::Clear => g.clear(),
            Self::Background { color } => g.background(*color),
            Self::Clip {
                x,
                y,
                width,
                height,
            } => g.clip(*x, *y, *width, *height),
            Self::NoClip => g.no_clip(),
            Self::Set { x, y, color } => g.set(*x, *y, *color),
            Self::Point { x, y } => g.point(*x, *y),
            Self::Line { from, to } => g.line(*from, *to),
            Self::Rect {
                x,
                y,
                width,
                height,
            } => g.rect(*x, *y, *width, *height),
            Self::RoundRect {
                x,
                y,
                width,
                height,
                rx,
                ry,
            } => g.round_rect(*x, *y, *width, *height, *rx, *ry),
            Self::Ellipse { a, b, c, d } => g.ellipse(*a, *b, *c, *d),
            Self::Circle { cx, cy, diameter } => g.circle(*cx, *cy, *diameter),
            Self::Triangle { p1, p2, p3 } => g.triangle(*p1, *p2, *p3),
            Self::Bezier { p1, c1, c2, p2 } => g.bezier(*p1, *c1, *c2, *p2),
            Self::Polyline { points } => g.polyline(points),
            Self::Polygon { points } => g.polygon(points),
            Self::Quad { p1, p2, p3, p4 } => g.quad(*p1, *p2, *p3, *p4),
            Self::Image { image, x, y } => g.image(image, *x, *y),
            Self::ImageScale {
                image,
                x,
                y,
                width,
                height,
            } => g.image_scale(image, *x, *y, *width, *height),
            Self::TextAlign {
                horizontal,
                vertical,
            } => g.text_align(*horizontal, *vertical),
            Self::TextFont { name } => g.text_font(name),
            Self::TextSize { size } => g.text_size(*size),
            Self::Text { text, x, y } => g.text(text, *x, *y),
            Self::BeginShape { kind } => g.begin_shape(*kind),
            Self::Vertex { x, y } => g.vertex(*x, *y),
            Self::EndShape { mode } => g.end_shape(*mode),
        }
    }

    /// Method name in lower camel case (`"fill"`, `"roundRect"`, …).
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AngleMode { .. } => "angleMode",
            Self::EllipseMode { .. } => "ellipseMode",
            Self::RectMode { .. } => "rectMode",
            Self::BlendMode { .. } => "blendMode",
            Self::StrokeCaps { .. } => "strokeCaps",
            Self::StrokeJoin { .. } => "strokeJoin",
            Self::StrokeWeight { .. } => "strokeWeight",
            Self::Push => "push",
            Self::Pop => "pop",
            Self::Translate { .. } => "translate",
            Self::Scale { .. } => "scale",
            Self::Rotate { .. } => "rotate",
            Self::Fill { .. } => "fill",
            Self::FillGradient { .. } => "fillGradient",
            Self::FillPattern { .. } => "fillPattern",
            Self::NoFill => "noFill",
            Self::Stroke { .. } => "stroke",
            Self::NoStroke => "noStroke",
            Self::Flush => "flush",
            Self::LoadPixels => "loadPixels",
            Self::UpdatePixels => "updatePixels",
            Self::Clear => "clear",
            Self::Background { .. } => "background",
            Self::Clip { .. } => "clip",
            Self::NoClip => "noClip",
            Self::Set { .. } => "set",
            Self::Point { .. } => "point",
            Self::Line { .. } => "line",
            Self::Rect { .. } => "rect",
            Self::RoundRect { .. } => "roundRect",
            Self::Ellipse { .. } => "ellipse",
            Self::Circle { .. } => "circle",
            Self::Triangle { .. } => "triangle",
            Self::Bezier { .. } => "bezier",
            Self::Polyline { .. } => "polyline",
            Self::Polygon { .. } => "polygon",
            Self::Quad { .. } => "quad",
            Self::Image { .. } => "image",
            Self::ImageScale { .. } => "imageScale",
            Self::TextAlign { .. } => "textAlign",
            Self::TextFont { .. } => "textFont",
            Self::TextSize { .. } => "textSize",
            Self::Text { .. } => "text",
            Self::BeginShape { .. } => "beginShape",
            Self::Vertex { .. } => "vertex",
            Self::EndShape { .. } => "endShape",
        }
    }
}

/// Replay a command log onto `g`, in order.
pub fn replay<G: Graphics + ?Sized>(commands: &[Command], g: &mut G) {
    for command in commands {
        command.apply(g);
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let cmd = Command::Rect {
            x: 10.0,
            y: 10.0,
            width: 50.0,
            height: 50.0,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(
            json,
            r#"{"op":"rect","x":10.0,"y":10.0,"width":50.0,"height":50.0}"#
        );
    }

    #[test]
    fn test_json_names_match_method_names() {
        let cmds = [
            Command::Push,
            Command::Fill { color: Color::RED },
            Command::RoundRect {
                x: 0.0,
                y: 0.0,
                width: 1.0,
                height: 1.0,
                rx: 0.5,
                ry: 0.5,
            },
            Command::TextAlign {
                horizontal: HAlign::Center,
                vertical: VAlign::Baseline,
            },
        ];
        for cmd in cmds {
            let value = serde_json::to_value(&cmd).unwrap();
            assert_eq!(value["op"], cmd.name());
        }
    }

    #[test]
    fn test_json_color_roundtrip() {
        let parsed: Command =
            serde_json::from_str(r##"{"op":"background","color":"#80102030"}"##).unwrap();
        assert_eq!(
            parsed,
            Command::Background {
                color: Color::new(0x10, 0x20, 0x30, 0x80)
            }
        );
    }
}
