// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Opcode catalogue: the one place numeric wire values are assigned.
//!
//! Encoder and decoder both import this table. Adding an opcode means adding a
//! row here and an arm in each direction; the numbering is append-only.

use core::fmt;

use sketch_port::{
    AngleMode, BlendMode, Command, EndShape, HAlign, ShapeKind, ShapeMode, StrokeCap, StrokeJoin,
    VAlign,
};

macro_rules! opcodes {
    ($($(#[$doc:meta])* $variant:ident = $value:literal => $name:literal,)+) => {
        /// Record tag, transmitted as a `u32`.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u32)]
        pub enum Opcode {
            $($(#[$doc])* $variant = $value,)+
        }

        impl Opcode {
            /// Every opcode, in wire order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Look up a wire value; `None` for values outside the table.
            pub const fn from_u32(value: u32) -> Option<Self> {
                match value {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Stable lower-camel name for logs and tooling.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }
    };
}

opcodes! {
    /// Padding; no operands, no call.
    Nop = 0 => "none",
    /// `u32` angle mode.
    AngleMode = 1 => "angleMode",
    /// `u32` shape mode.
    EllipseMode = 2 => "ellipseMode",
    /// `u32` shape mode.
    RectMode = 3 => "rectMode",
    /// `u32` blend mode.
    BlendMode = 4 => "blendMode",
    /// `u32` cap.
    StrokeCaps = 5 => "strokeCaps",
    /// `u32` join.
    StrokeJoin = 6 => "strokeJoin",
    /// `f32` weight.
    StrokeWeight = 7 => "strokeWeight",
    /// No operands.
    Push = 8 => "push",
    /// No operands.
    Pop = 9 => "pop",
    /// `f32` x, y.
    Translate = 10 => "translate",
    /// `f32` sx, sy.
    Scale = 11 => "scale",
    /// `f32` angle.
    Rotate = 12 => "rotate",
    /// `u32` color.
    FillColor = 13 => "fillColor",
    /// Reserved; no operand format is defined.
    FillGradient = 14 => "fillGradient",
    /// Reserved; no operand format is defined.
    FillPattern = 15 => "fillPattern",
    /// No operands.
    FillNone = 16 => "fillNone",
    /// `u32` color.
    StrokeColor = 17 => "strokeColor",
    /// No operands.
    StrokeNone = 18 => "strokeNone",
    /// No operands.
    Flush = 19 => "flush",
    /// No operands.
    LoadPixels = 20 => "loadPixels",
    /// No operands.
    UpdatePixels = 21 => "updatePixels",
    /// No operands.
    Clear = 22 => "clear",
    /// `u32` color.
    Background = 23 => "background",
    /// `f32` x, y, width, height.
    Clip = 24 => "clip",
    /// No operands.
    NoClip = 25 => "noClip",
    /// `f32` x, y, `u32` color.
    Set = 26 => "set",
    /// `f32` x, y.
    Point = 27 => "point",
    /// Two points.
    Line = 28 => "line",
    /// `f32` x, y, width, height.
    Rect = 29 => "rect",
    /// `f32` x, y, width, height, rx, ry.
    RoundRect = 30 => "roundRect",
    /// `f32` a, b, c, d.
    Ellipse = 31 => "ellipse",
    /// `f32` cx, cy, diameter.
    Circle = 32 => "circle",
    /// Three points.
    Triangle = 33 => "triangle",
    /// Four points: anchor, control, control, anchor.
    Bezier = 34 => "bezier",
    /// `u32` count, then that many points.
    Polyline = 35 => "polyline",
    /// `u32` count, then that many points.
    Polygon = 36 => "polygon",
    /// Four points.
    Quad = 37 => "quad",
    /// `f32` x, y, image block.
    Image = 38 => "image",
    /// `f32` x, y, width, height, image block.
    ImageScale = 39 => "imageScale",
    /// `u32` horizontal, `u32` vertical.
    TextAlign = 40 => "textAlign",
    /// NUL-terminated family name.
    TextFont = 41 => "textFont",
    /// `f32` size.
    TextSize = 42 => "textSize",
    /// `f32` x, y, NUL-terminated text.
    Text = 43 => "text",
    /// `u32` shape kind.
    BeginShape = 44 => "beginShape",
    /// `f32` x, y.
    Vertex = 45 => "vertex",
    /// `u32` end mode.
    EndShape = 46 => "endShape",
}

impl Opcode {
    /// Wire value.
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Opcode a command encodes as, before any paint fallback.
    pub const fn of(command: &Command) -> Self {
        match command {
            Command::AngleMode { .. } => Self::AngleMode,
            Command::EllipseMode { .. } => Self::EllipseMode,
            Command::RectMode { .. } => Self::RectMode,
            Command::BlendMode { .. } => Self::BlendMode,
            Command::StrokeCaps { .. } => Self::StrokeCaps,
            Command::StrokeJoin { .. } => Self::StrokeJoin,
            Command::StrokeWeight { .. } => Self::StrokeWeight,
            Command::Push => Self::Push,
            Command::Pop => Self::Pop,
            Command::Translate { .. } => Self::Translate,
            Command::Scale { .. } => Self::Scale,
            Command::Rotate { .. } => Self::Rotate,
            Command::Fill { .. } => Self::FillColor,
            Command::FillGradient { .. } => Self::FillGradient,
            Command::FillPattern { .. } => Self::FillPattern,
            Command::NoFill => Self::FillNone,
            Command::Stroke { .. } => Self::StrokeColor,
            Command::NoStroke => Self::StrokeNone,
            Command::Flush => Self::Flush,
            Command::LoadPixels => Self::LoadPixels,
            Command::UpdatePixels => Self::UpdatePixels,
            Command::Clear => Self::Clear,
            Command::Background { .. } => Self::Background,
            Command::Clip { .. } => Self::Clip,
            Command::NoClip => Self::NoClip,
            Command::Set { .. } => Self::Set,
            Command::Point { .. } => Self::Point,
            Command::Line { .. } => Self::Line,
            Command::Rect { .. } => Self::Rect,
            Command::RoundRect { .. } => Self::RoundRect,
            Command::Ellipse { .. } => Self::Ellipse,
            Command::Circle { .. } => Self::Circle,
            Command::Triangle { .. } => Self::Triangle,
            Command::Bezier { .. } => Self::Bezier,
            Command::Polyline { .. } => Self::Polyline,
            Command::Polygon { .. } => Self::Polygon,
            Command::Quad { .. } => Self::Quad,
            Command::Image { .. } => Self::Image,
            Command::ImageScale { .. } => Self::ImageScale,
            Command::TextAlign { .. } => Self::TextAlign,
            Command::TextFont { .. } => Self::TextFont,
            Command::TextSize { .. } => Self::TextSize,
            Command::Text { .. } => Self::Text,
            Command::BeginShape { .. } => Self::BeginShape,
            Command::Vertex { .. } => Self::Vertex,
            Command::EndShape { .. } => Self::EndShape,
        }
    }

    /// Operand byte count for fixed-layout opcodes.
    ///
    /// `None` for variable layouts (point lists, images, strings) and for the
    /// reserved paint opcodes.
    pub const fn fixed_operand_len(self) -> Option<usize> {
        match self {
            Self::Nop
            | Self::Push
            | Self::Pop
            | Self::FillNone
            | Self::StrokeNone
            | Self::Flush
            | Self::LoadPixels
            | Self::UpdatePixels
            | Self::Clear
            | Self::NoClip => Some(0),
            Self::AngleMode
            | Self::EllipseMode
            | Self::RectMode
            | Self::BlendMode
            | Self::StrokeCaps
            | Self::StrokeJoin
            | Self::StrokeWeight
            | Self::Rotate
            | Self::FillColor
            | Self::StrokeColor
            | Self::Background
            | Self::TextSize
            | Self::BeginShape
            | Self::EndShape => Some(4),
            Self::Translate | Self::Scale | Self::Point | Self::Vertex | Self::TextAlign => Some(8),
            Self::Set | Self::Circle => Some(12),
            Self::Clip | Self::Rect | Self::Ellipse | Self::Line => Some(16),
            Self::RoundRect | Self::Triangle => Some(24),
            Self::Bezier | Self::Quad => Some(32),
            Self::FillGradient
            | Self::FillPattern
            | Self::Polyline
            | Self::Polygon
            | Self::Image
            | Self::ImageScale
            | Self::TextFont
            | Self::Text => None,
        }
    }

    /// Whether this is one of the reserved paint opcodes with no operand format.
    pub const fn is_reserved(self) -> bool {
        matches!(self, Self::FillGradient | Self::FillPattern)
    }
}

impl TryFrom<u32> for Opcode {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_u32(value).ok_or(value)
    }
}

impl From<Opcode> for u32 {
    fn from(op: Opcode) -> Self {
        op.as_u32()
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mapping between a mode enum and its `u32` wire value.
pub trait WireEnum: Copy + Sized {
    /// Operand name used in error messages.
    const FIELD: &'static str;

    /// Decode a wire value; `None` when it names no variant.
    fn from_wire(value: u32) -> Option<Self>;

    /// Encode to the wire value.
    fn to_wire(self) -> u32;
}

macro_rules! wire_enum {
    ($($ty:ident : $field:literal { $($variant:ident),+ $(,)? })+) => {$(
        impl WireEnum for $ty {
            const FIELD: &'static str = $field;

            fn from_wire(value: u32) -> Option<Self> {
                [$($ty::$variant),+].into_iter().find(|v| *v as u32 == value)
            }

            fn to_wire(self) -> u32 {
                self as u32
            }
        }
    )+};
}

wire_enum! {
    AngleMode: "angle mode" { Radians, Degrees }
    ShapeMode: "shape mode" { Corner, Corners, Center, Radius }
    BlendMode: "blend mode" {
        Blend, Add, Subtract, Darkest, Lightest, Difference, Exclusion, Multiply, Screen, Replace,
    }
    StrokeCap: "stroke cap" { Butt, Square, Round }
    StrokeJoin: "stroke join" { Miter, Bevel, Round }
    HAlign: "horizontal alignment" { Left, Center, Right }
    VAlign: "vertical alignment" { Top, Center, Baseline, Bottom }
    ShapeKind: "shape kind" {
        Polygon, Points, Lines, Triangles, TriangleStrip, TriangleFan, Quads, QuadStrip,
    }
    EndShape: "end mode" { Open, Close }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_dense_and_ordered() {
        for (i, op) in Opcode::ALL.iter().enumerate() {
            assert_eq!(op.as_u32() as usize, i);
            assert_eq!(Opcode::from_u32(op.as_u32()), Some(*op));
        }
        assert_eq!(Opcode::ALL.len(), 47);
        assert_eq!(Opcode::from_u32(47), None);
        assert_eq!(Opcode::try_from(0xDEAD_BEEF), Err(0xDEAD_BEEF));
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = Opcode::ALL.iter().map(|op| op.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Opcode::ALL.len());
        assert_eq!(Opcode::Nop.to_string(), "none");
        assert_eq!(Opcode::RoundRect.to_string(), "roundRect");
    }

    #[test]
    fn test_pinned_values() {
        assert_eq!(Opcode::Push.as_u32(), 8);
        assert_eq!(Opcode::Pop.as_u32(), 9);
        assert_eq!(Opcode::FillColor.as_u32(), 13);
        assert_eq!(Opcode::Rect.as_u32(), 29);
        assert_eq!(Opcode::Polygon.as_u32(), 36);
        assert_eq!(Opcode::EndShape.as_u32(), 46);
    }

    #[test]
    fn test_wire_enum_values() {
        assert_eq!(ShapeMode::from_wire(2), Some(ShapeMode::Center));
        assert_eq!(ShapeMode::from_wire(4), None);
        assert_eq!(BlendMode::Replace.to_wire(), 9);
        assert_eq!(BlendMode::from_wire(10), None);
        assert_eq!(VAlign::from_wire(3), Some(VAlign::Bottom));
        assert_eq!(EndShape::from_wire(1), Some(EndShape::Close));
        assert_eq!(AngleMode::FIELD, "angle mode");
    }
}
