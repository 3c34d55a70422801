// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Drawing port trait defining the renderer contract.

use crate::{
    AngleMode, BlendMode, Color, EndShape, Gradient, HAlign, Image, Pattern, Point, ShapeKind,
    ShapeMode, StrokeCap, StrokeJoin, VAlign,
};

/// Immediate-mode drawing port.
///
/// A raster backend draws; the stream encoder serializes. Callers cannot
/// tell them apart.
///
/// # State
///
/// Everything stateful (current fill, stroke, transform, clip, the shape
/// being built, the push/pop stack) lives inside the implementor. A caller
/// issuing `push`, `fill`, `rect`, `pop` relies on the implementor applying
/// them in exactly that order.
///
/// # Errors
///
/// Methods return nothing. Whether a draw succeeded is the implementor's own
/// concern; an implementor that can fail (an encoder running out of buffer)
/// latches the failure and reports it through its own API.
pub trait Graphics {
    /// Set the unit used by [`Graphics::rotate`].
    fn angle_mode(&mut self, mode: AngleMode);

    /// Set how [`Graphics::ellipse`] interprets its four numbers.
    fn ellipse_mode(&mut self, mode: ShapeMode);

    /// Set how [`Graphics::rect`] interprets its four numbers.
    fn rect_mode(&mut self, mode: ShapeMode);

    /// Set the compositing operator.
    fn blend_mode(&mut self, mode: BlendMode);

    /// Set the line end style.
    fn stroke_caps(&mut self, cap: StrokeCap);

    /// Set the line corner style.
    fn stroke_join(&mut self, join: StrokeJoin);

    /// Set the line width.
    fn stroke_weight(&mut self, weight: f64);

    /// Save the drawing state.
    fn push(&mut self);

    /// Restore the most recently saved drawing state.
    fn pop(&mut self);

    /// Translate the coordinate system.
    fn translate(&mut self, x: f64, y: f64);

    /// Scale the coordinate system.
    fn scale(&mut self, sx: f64, sy: f64);

    /// Rotate the coordinate system (unit per [`Graphics::angle_mode`]).
    fn rotate(&mut self, angle: f64);

    /// Fill subsequent shapes with a solid color.
    fn fill(&mut self, color: Color);

    /// Fill subsequent shapes with a gradient.
    fn fill_gradient(&mut self, gradient: &Gradient);

    /// Fill subsequent shapes with a tiled image.
    fn fill_pattern(&mut self, pattern: &Pattern);

    /// Disable filling.
    fn no_fill(&mut self);

    /// Stroke subsequent shapes with a solid color.
    fn stroke(&mut self, color: Color);

    /// Disable stroking.
    fn no_stroke(&mut self);

    /// Push pending drawing to the surface.
    fn flush(&mut self);

    /// Make the surface pixels readable.
    fn load_pixels(&mut self);

    /// Write modified surface pixels back.
    fn update_pixels(&mut self);

    /// Clear the surface to transparent.
    fn clear(&mut self);

    /// Fill the whole surface with a color.
    fn background(&mut self, color: Color);

    /// Restrict drawing to a rectangle.
    fn clip(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Remove the clip rectangle.
    fn no_clip(&mut self);

    /// Set one pixel.
    fn set(&mut self, x: f64, y: f64, color: Color);

    /// Draw a point with the stroke.
    fn point(&mut self, x: f64, y: f64);

    /// Draw a line segment.
    fn line(&mut self, from: Point, to: Point);

    /// Draw a rectangle (interpreted per [`Graphics::rect_mode`]).
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Draw a rectangle with rounded corners.
    fn round_rect(&mut self, x: f64, y: f64, width: f64, height: f64, rx: f64, ry: f64);

    /// Draw an ellipse (interpreted per [`Graphics::ellipse_mode`]).
    fn ellipse(&mut self, a: f64, b: f64, c: f64, d: f64);

    /// Draw a circle.
    fn circle(&mut self, cx: f64, cy: f64, diameter: f64);

    /// Draw a triangle.
    fn triangle(&mut self, p1: Point, p2: Point, p3: Point);

    /// Draw a cubic Bézier from `p1` to `p2` with controls `c1`, `c2`.
    fn bezier(&mut self, p1: Point, c1: Point, c2: Point, p2: Point);

    /// Draw an open polyline.
    fn polyline(&mut self, points: &[Point]);

    /// Draw a closed polygon.
    fn polygon(&mut self, points: &[Point]);

    /// Draw a quadrilateral.
    fn quad(&mut self, p1: Point, p2: Point, p3: Point, p4: Point);

    /// Draw an image at its natural size.
    fn image(&mut self, image: &Image, x: f64, y: f64);

    /// Draw an image scaled into a rectangle.
    fn image_scale(&mut self, image: &Image, x: f64, y: f64, width: f64, height: f64);

    /// Set text alignment relative to the anchor passed to [`Graphics::text`].
    fn text_align(&mut self, horizontal: HAlign, vertical: VAlign);

    /// Select a font by family name.
    fn text_font(&mut self, name: &str);

    /// Set the font size.
    fn text_size(&mut self, size: f64);

    /// Draw a string.
    fn text(&mut self, text: &str, x: f64, y: f64);

    /// Start accumulating vertices.
    fn begin_shape(&mut self, kind: ShapeKind);

    /// Add a vertex to the shape being built.
    fn vertex(&mut self, x: f64, y: f64);

    /// Finish the shape being built and draw it.
    fn end_shape(&mut self, mode: EndShape);
}
