// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Value types passed through the drawing contract.
//!
//! These are plain domain objects with no wire knowledge; byte layouts live in
//! sketch-wire. Mode enums carry explicit `u32` discriminants because those
//! values are what the wire transmits.

use alloc::vec::Vec;

use crate::Color;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 2D coordinate.
///
/// Renderers see `f64`; command streams carry `f32`.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Unit used by `rotate`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[repr(u32)]
pub enum AngleMode {
    /// Angles in radians.
    #[default]
    Radians = 0,
    /// Angles in degrees.
    Degrees = 1,
}

/// How the four numbers of `rect` / `ellipse` are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[repr(u32)]
pub enum ShapeMode {
    /// x, y is the top-left corner; then width, height.
    #[default]
    Corner = 0,
    /// Two opposite corners.
    Corners = 1,
    /// x, y is the center; then width, height.
    Center = 2,
    /// x, y is the center; then half-width, half-height.
    Radius = 3,
}

/// Compositing operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[repr(u32)]
pub enum BlendMode {
    /// Source over destination.
    #[default]
    Blend = 0,
    /// Additive.
    Add = 1,
    /// Subtractive.
    Subtract = 2,
    /// Per-channel minimum.
    Darkest = 3,
    /// Per-channel maximum.
    Lightest = 4,
    /// Absolute difference.
    Difference = 5,
    /// Exclusion.
    Exclusion = 6,
    /// Multiply.
    Multiply = 7,
    /// Screen.
    Screen = 8,
    /// Source replaces destination.
    Replace = 9,
}

/// Line end style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[repr(u32)]
pub enum StrokeCap {
    /// Flat, ends exactly at the endpoint.
    Butt = 0,
    /// Flat, extended by half the stroke weight.
    Square = 1,
    /// Semicircular.
    #[default]
    Round = 2,
}

/// Line corner style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[repr(u32)]
pub enum StrokeJoin {
    /// Sharp corner.
    #[default]
    Miter = 0,
    /// Cut corner.
    Bevel = 1,
    /// Rounded corner.
    Round = 2,
}

/// Horizontal text alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[repr(u32)]
pub enum HAlign {
    /// Text starts at x.
    #[default]
    Left = 0,
    /// Text is centered on x.
    Center = 1,
    /// Text ends at x.
    Right = 2,
}

/// Vertical text alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[repr(u32)]
pub enum VAlign {
    /// y is the top of the line box.
    Top = 0,
    /// y is the middle of the line box.
    Center = 1,
    /// y is the baseline.
    #[default]
    Baseline = 2,
    /// y is the bottom of the line box.
    Bottom = 3,
}

/// Primitive assembled by `begin_shape` … `end_shape`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[repr(u32)]
pub enum ShapeKind {
    /// One outline through every vertex.
    #[default]
    Polygon = 0,
    /// Each vertex is a point.
    Points = 1,
    /// Vertex pairs are segments.
    Lines = 2,
    /// Vertex triples are triangles.
    Triangles = 3,
    /// Triangle strip.
    TriangleStrip = 4,
    /// Triangle fan.
    TriangleFan = 5,
    /// Vertex quadruples are quads.
    Quads = 6,
    /// Quad strip.
    QuadStrip = 7,
}

/// Whether `end_shape` closes the outline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[repr(u32)]
pub enum EndShape {
    /// Leave the outline open.
    #[default]
    Open = 0,
    /// Connect the last vertex back to the first.
    Close = 1,
}

/// Row-major RGBA raster.
///
/// Invariant: `pixels.len() == width * height`. Use [`Image::is_valid`] before
/// trusting an image built from untrusted fields.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Image {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixels, row-major, top row first.
    pub pixels: Vec<Color>,
}

impl Image {
    /// Build an image, checking the pixel count against the dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<Color>) -> Option<Self> {
        let image = Self {
            width,
            height,
            pixels,
        };
        image.is_valid().then_some(image)
    }

    /// An image of one uniform color.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        let count = (width as usize).saturating_mul(height as usize);
        Self {
            width,
            height,
            pixels: alloc::vec![color; count],
        }
    }

    /// Number of pixels implied by the dimensions, if it fits in `usize`.
    pub fn pixel_count(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.height as usize)
    }

    /// Whether the pixel buffer matches the dimensions.
    pub fn is_valid(&self) -> bool {
        self.pixel_count() == Some(self.pixels.len())
    }

    /// Channel-wise mean of all pixels; `None` for an empty image.
    pub fn mean_color(&self) -> Option<Color> {
        let n = self.pixels.len() as u64;
        if n == 0 {
            return None;
        }
        let mut sum = [0u64; 4];
        for p in &self.pixels {
            sum[0] += u64::from(p.r);
            sum[1] += u64::from(p.g);
            sum[2] += u64::from(p.b);
            sum[3] += u64::from(p.a);
        }
        #[allow(clippy::cast_possible_truncation)]
        let avg = |s: u64| (s / n) as u8;
        Some(Color::new(avg(sum[0]), avg(sum[1]), avg(sum[2]), avg(sum[3])))
    }
}

/// Gradient geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "camelCase"))]
pub enum GradientKind {
    /// Color varies along the segment `start` → `end`.
    Linear {
        /// Where offset 0 lies.
        start: Point,
        /// Where offset 1 lies.
        end: Point,
    },
    /// Color varies with distance from `center`.
    Radial {
        /// Circle center (offset 1 at `radius`).
        center: Point,
        /// Focal point (offset 0).
        focal: Point,
        /// Circle radius.
        radius: f64,
    },
}

/// One color stop of a gradient.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColorStop {
    /// Position along the gradient in `0.0..=1.0`.
    pub offset: f64,
    /// Color at that position.
    pub color: Color,
}

/// Gradient fill description.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Gradient {
    /// Geometry.
    pub kind: GradientKind,
    /// Stops in ascending offset order.
    pub stops: Vec<ColorStop>,
}

impl Gradient {
    /// Color of the first stop, the solid-color stand-in for the whole gradient.
    pub fn first_color(&self) -> Option<Color> {
        self.stops.first().map(|s| s.color)
    }
}

/// Image-tiled fill description.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pattern {
    /// The tile.
    pub image: Image,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_new_checks_pixel_count() {
        assert!(Image::new(2, 2, alloc::vec![Color::RED; 4]).is_some());
        assert!(Image::new(2, 2, alloc::vec![Color::RED; 3]).is_none());
        assert!(Image::new(0, 5, alloc::vec![]).is_some());
    }

    #[test]
    fn test_mean_color() {
        let image = Image::new(
            2,
            1,
            alloc::vec![Color::new(0, 0, 0, 255), Color::new(200, 100, 50, 255)],
        )
        .unwrap();
        assert_eq!(image.mean_color(), Some(Color::new(100, 50, 25, 255)));
        assert_eq!(Image::default().mean_color(), None);
    }

    #[test]
    fn test_gradient_first_color() {
        let gradient = Gradient {
            kind: GradientKind::Linear {
                start: Point::new(0.0, 0.0),
                end: Point::new(1.0, 0.0),
            },
            stops: alloc::vec![
                ColorStop {
                    offset: 0.0,
                    color: Color::BLUE,
                },
                ColorStop {
                    offset: 1.0,
                    color: Color::RED,
                },
            ],
        };
        assert_eq!(gradient.first_color(), Some(Color::BLUE));
    }
}
