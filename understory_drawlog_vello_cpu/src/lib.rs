// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_drawlog_vello_cpu --heading-base-level=0

//! Vello CPU surface for Understory Drawlog.
//!
//! This crate implements [`Surface`] on top of the sparse-strips
//! [`vello_cpu::RenderContext`], so that a recorded command sequence, or any
//! prefix of it, can be rasterized for a debugger's preview.
//!
//! Canvas features the renderer has no direct equivalent for are approximated:
//! - Clips are pushed as clip layers, so only [`RegionOp::Intersect`] can be
//!   rendered. Other ops are rejected with [`VelloCpuError::UnsupportedClipOp`].
//! - A restore drops every clip pushed since its save, whatever the save flags.
//! - Text and opaque data blobs are not drawn. Vertex meshes are filled with the
//!   paint's brush, ignoring per-vertex colors and texture coordinates.
//! - Clear paints the color over the canvas inside the current clip.
//! - Images with an edge longer than `u16::MAX` pixels are rejected with
//!   [`VelloCpuError::ImageTooLarge`].
//!
//! ```
//! use understory_drawlog::{Color, Paint, Rect, ReplayTarget, Surface, record};
//! use understory_drawlog_vello_cpu::VelloCpuSurface;
//! use vello_cpu::{Pixmap, RenderContext};
//!
//! let sequence = record(|r| {
//!     r.translate(2.0, 2.0)?;
//!     r.draw_rect(Rect::new(0.0, 0.0, 4.0, 4.0), &Paint::fill(Color::from_rgb8(255, 0, 0)))
//! })
//! .unwrap();
//!
//! let mut ctx = RenderContext::new(8, 8);
//! let mut surface = VelloCpuSurface::new(&mut ctx);
//! sequence.replay(ReplayTarget::All, &mut surface).unwrap();
//! surface.finish();
//!
//! let mut pixmap = Pixmap::new(8, 8);
//! surface.ctx.flush();
//! surface.ctx.render_to_pixmap(&mut pixmap);
//! ```

#![deny(unsafe_code)]
#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;

use kurbo::{Affine, BezPath, Cap, Ellipse, Join, PathEl, Point, Rect, RoundedRect, Shape};
use peniko::{BlendMode, Brush, Color, ImageData, ImageSampler};
use understory_drawlog::{
    IRect, ImageSnapshot, Paint, PaintStyle, PointMode, Region, RegionOp, SaveFlags, Surface, Text,
    Vertices, nine_patch,
};
use vello_cpu::kurbo::{
    Affine as CpuAffine, BezPath as CpuBezPath, Cap as CpuCap, Join as CpuJoin, Rect as CpuRect,
    Stroke as CpuStroke,
};
use vello_cpu::{Image as CpuImage, ImageSource, RenderContext};

const CURVE_TOLERANCE: f64 = 0.1;

/// Why the surface could not render a call.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum VelloCpuError {
    /// The clip op cannot be expressed as a clip layer.
    #[error("{} clips cannot be rendered", .op.name())]
    UnsupportedClipOp {
        /// The rejected op.
        op: RegionOp,
    },
    /// The call would leave a non-finite value in the current transform.
    #[error("the transform would become non-finite")]
    NonFiniteTransform,
    /// An image edge exceeds what the renderer can sample from.
    #[error("a {width}x{height} image is too large to render")]
    ImageTooLarge {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },
}

#[derive(Copy, Clone, Debug)]
struct Frame {
    flags: SaveFlags,
    transform: Affine,
    /// Number of `vello_cpu` layers pushed while this frame is innermost.
    layers: u32,
}

/// [`Surface`] that rasterizes into a `vello_cpu` render context.
pub struct VelloCpuSurface<'ctx> {
    /// Underlying Vello CPU render context to draw into.
    pub ctx: &'ctx mut RenderContext,
    transform: Affine,
    frames: Vec<Frame>,
    /// Layers pushed outside any save.
    root_layers: u32,
}

impl fmt::Debug for VelloCpuSurface<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VelloCpuSurface")
            .field("transform", &self.transform)
            .field("save_depth", &self.frames.len())
            .finish_non_exhaustive()
    }
}

impl<'ctx> VelloCpuSurface<'ctx> {
    /// Create a new surface that renders into the given CPU render context.
    pub fn new(ctx: &'ctx mut RenderContext) -> Self {
        ctx.set_transform(CpuAffine::IDENTITY);
        Self {
            ctx,
            transform: Affine::IDENTITY,
            frames: Vec::new(),
            root_layers: 0,
        }
    }

    /// Current transform.
    pub fn transform(&self) -> Affine {
        self.transform
    }

    /// Number of saves not yet restored.
    pub fn save_depth(&self) -> usize {
        self.frames.len()
    }

    /// Pop every layer still open and reset the transform.
    ///
    /// Call this before flushing the context, since a replayed prefix usually
    /// stops inside unrestored saves.
    pub fn finish(&mut self) {
        let open = self.root_layers + self.frames.iter().map(|f| f.layers).sum::<u32>();
        for _ in 0..open {
            self.ctx.pop_layer();
        }
        self.frames.clear();
        self.root_layers = 0;
        self.set_transform(Affine::IDENTITY);
    }

    fn affine_to_cpu(xf: Affine) -> CpuAffine {
        CpuAffine::new(xf.as_coeffs())
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
        self.ctx.set_transform(Self::affine_to_cpu(transform));
    }

    fn update_transform(&mut self, transform: Affine) -> Result<(), VelloCpuError> {
        if !transform.as_coeffs().iter().all(|c| c.is_finite()) {
            return Err(VelloCpuError::NonFiniteTransform);
        }
        self.set_transform(transform);
        Ok(())
    }

    fn open_layers(&mut self) -> &mut u32 {
        match self.frames.last_mut() {
            Some(frame) => &mut frame.layers,
            None => &mut self.root_layers,
        }
    }

    fn canvas(&self) -> CpuRect {
        CpuRect::new(
            0.0,
            0.0,
            f64::from(self.ctx.width()),
            f64::from(self.ctx.height()),
        )
    }

    fn push_clip(&mut self, path: &CpuBezPath, op: RegionOp) -> Result<(), VelloCpuError> {
        if op != RegionOp::Intersect {
            return Err(VelloCpuError::UnsupportedClipOp { op });
        }
        self.ctx.push_clip_layer(path);
        *self.open_layers() += 1;
        Ok(())
    }

    fn apply_brush(&mut self, brush: &Brush) -> Result<(), VelloCpuError> {
        match brush.clone() {
            Brush::Solid(color) => {
                self.ctx.set_paint(color);
            }
            Brush::Gradient(gradient) => {
                self.ctx.set_paint(gradient);
            }
            Brush::Image(image_brush) => {
                let image = CpuImage {
                    image: image_source(&image_brush.image)?,
                    sampler: image_brush.sampler,
                };
                self.ctx.set_paint(image);
            }
        }
        Ok(())
    }

    /// Push a blend layer when the draw needs one. Returns whether a layer was pushed.
    fn begin_blend(&mut self, blend: BlendMode, opacity: f32) -> bool {
        if blend == BlendMode::default() && opacity >= 1.0 {
            return false;
        }
        self.ctx.push_layer(None, Some(blend), Some(opacity), None, None);
        true
    }

    fn paint_path(
        &mut self,
        path: &CpuBezPath,
        paint: &Paint,
        style: PaintStyle,
    ) -> Result<(), VelloCpuError> {
        self.apply_brush(&paint.brush)?;
        self.ctx.set_stroke(stroke_to_cpu(&paint.stroke));
        let blended = self.begin_blend(paint.blend, 1.0);
        match style {
            PaintStyle::Fill => self.ctx.fill_path(path),
            PaintStyle::Stroke => self.ctx.stroke_path(path),
            PaintStyle::StrokeAndFill => {
                self.ctx.fill_path(path);
                self.ctx.stroke_path(path);
            }
        }
        if blended {
            self.ctx.pop_layer();
        }
        Ok(())
    }

    /// Fill the whole canvas in device space, inside the current clip.
    fn paint_canvas(&mut self, brush: &Brush, blend: BlendMode) -> Result<(), VelloCpuError> {
        let canvas = self.canvas();
        self.apply_brush(brush)?;
        self.ctx.set_transform(CpuAffine::IDENTITY);
        let blended = self.begin_blend(blend, 1.0);
        self.ctx.fill_rect(&canvas);
        if blended {
            self.ctx.pop_layer();
        }
        self.ctx.set_transform(Self::affine_to_cpu(self.transform));
        Ok(())
    }

    /// Draw `image` at its natural size under `local`, optionally clipped to `clip`
    /// in the current (non-image) transform.
    fn draw_image(
        &mut self,
        image: &ImageSnapshot,
        local: Affine,
        clip: Option<Rect>,
        paint: Option<&Paint>,
    ) -> Result<(), VelloCpuError> {
        let image_paint = CpuImage {
            image: image_source(&image.to_image_data())?,
            sampler: ImageSampler::default(),
        };
        let blend = paint.map_or_else(BlendMode::default, |p| p.blend);
        let opacity = paint.map_or(1.0, Paint::opacity);

        let blended = self.begin_blend(blend, opacity);
        if let Some(clip) = clip {
            self.ctx.push_clip_layer(&to_cpu_path(&clip));
        }
        self.ctx.set_transform(Self::affine_to_cpu(self.transform * local));
        self.ctx.set_paint(image_paint);
        let rect = CpuRect::new(
            0.0,
            0.0,
            f64::from(image.width()),
            f64::from(image.height()),
        );
        self.ctx.fill_rect(&rect);
        self.ctx.set_transform(Self::affine_to_cpu(self.transform));
        if clip.is_some() {
            self.ctx.pop_layer();
        }
        if blended {
            self.ctx.pop_layer();
        }
        Ok(())
    }
}

/// Pixel source for `data`, whose edges the renderer stores as `u16`.
fn image_source(data: &ImageData) -> Result<ImageSource, VelloCpuError> {
    if u16::try_from(data.width).is_err() || u16::try_from(data.height).is_err() {
        return Err(VelloCpuError::ImageTooLarge {
            width: data.width,
            height: data.height,
        });
    }
    Ok(ImageSource::from_peniko_image_data(data))
}

fn to_cpu_path(shape: &impl Shape) -> CpuBezPath {
    let mut out = CpuBezPath::new();
    for el in shape.path_elements(CURVE_TOLERANCE) {
        match el {
            PathEl::MoveTo(p) => out.move_to((p.x, p.y)),
            PathEl::LineTo(p) => out.line_to((p.x, p.y)),
            PathEl::QuadTo(p1, p) => out.quad_to((p1.x, p1.y), (p.x, p.y)),
            PathEl::CurveTo(p1, p2, p) => out.curve_to((p1.x, p1.y), (p2.x, p2.y), (p.x, p.y)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn stroke_to_cpu(style: &kurbo::Stroke) -> CpuStroke {
    let mut stroke = CpuStroke::new(style.width);
    stroke.miter_limit = style.miter_limit;
    stroke.join = match style.join {
        Join::Bevel => CpuJoin::Bevel,
        Join::Miter => CpuJoin::Miter,
        Join::Round => CpuJoin::Round,
    };
    stroke.start_cap = match style.start_cap {
        Cap::Butt => CpuCap::Butt,
        Cap::Round => CpuCap::Round,
        Cap::Square => CpuCap::Square,
    };
    stroke.end_cap = match style.end_cap {
        Cap::Butt => CpuCap::Butt,
        Cap::Round => CpuCap::Round,
        Cap::Square => CpuCap::Square,
    };
    stroke
}

/// Transform mapping `src` onto `dst`, or `None` when either is degenerate.
fn rect_to_rect(src: Rect, dst: Rect) -> Option<Affine> {
    if src.width().abs() < f64::EPSILON
        || src.height().abs() < f64::EPSILON
        || dst.width().abs() < f64::EPSILON
        || dst.height().abs() < f64::EPSILON
    {
        return None;
    }
    Some(
        Affine::translate((dst.x0, dst.y0))
            * Affine::scale_non_uniform(dst.width() / src.width(), dst.height() / src.height())
            * Affine::translate((-src.x0, -src.y0)),
    )
}

impl Surface for VelloCpuSurface<'_> {
    type Error = VelloCpuError;

    fn clear(&mut self, color: Color) -> Result<(), VelloCpuError> {
        self.paint_canvas(&Brush::Solid(color), BlendMode::default())
    }

    fn clip_path(
        &mut self,
        path: &BezPath,
        op: RegionOp,
        _anti_alias: bool,
    ) -> Result<(), VelloCpuError> {
        self.push_clip(&to_cpu_path(path), op)
    }

    fn clip_region(&mut self, region: &Region, op: RegionOp) -> Result<(), VelloCpuError> {
        let path = to_cpu_path(&region.to_path());
        self.ctx.set_transform(CpuAffine::IDENTITY);
        let result = self.push_clip(&path, op);
        self.ctx.set_transform(Self::affine_to_cpu(self.transform));
        result
    }

    fn clip_rect(
        &mut self,
        rect: Rect,
        op: RegionOp,
        _anti_alias: bool,
    ) -> Result<(), VelloCpuError> {
        self.push_clip(&to_cpu_path(&rect), op)
    }

    fn clip_rrect(
        &mut self,
        rrect: RoundedRect,
        op: RegionOp,
        _anti_alias: bool,
    ) -> Result<(), VelloCpuError> {
        self.push_clip(&to_cpu_path(&rrect), op)
    }

    fn concat(&mut self, transform: Affine) -> Result<(), VelloCpuError> {
        self.update_transform(self.transform * transform)
    }

    fn set_matrix(&mut self, transform: Affine) -> Result<(), VelloCpuError> {
        self.update_transform(transform)
    }

    fn translate(&mut self, dx: f64, dy: f64) -> Result<(), VelloCpuError> {
        self.update_transform(self.transform * Affine::translate((dx, dy)))
    }

    fn scale(&mut self, sx: f64, sy: f64) -> Result<(), VelloCpuError> {
        self.update_transform(self.transform * Affine::scale_non_uniform(sx, sy))
    }

    fn rotate(&mut self, degrees: f64) -> Result<(), VelloCpuError> {
        self.update_transform(self.transform * Affine::rotate(degrees.to_radians()))
    }

    fn skew(&mut self, sx: f64, sy: f64) -> Result<(), VelloCpuError> {
        self.update_transform(self.transform * Affine::skew(sx, sy))
    }

    fn save(&mut self, flags: SaveFlags) -> Result<(), VelloCpuError> {
        self.frames.push(Frame {
            flags,
            transform: self.transform,
            layers: 0,
        });
        Ok(())
    }

    fn save_layer(
        &mut self,
        bounds: Option<Rect>,
        paint: Option<&Paint>,
        flags: SaveFlags,
    ) -> Result<(), VelloCpuError> {
        self.save(flags)?;
        let clip = bounds.map(|b| to_cpu_path(&b));
        let blend = paint.map(|p| p.blend);
        let opacity = paint.map(Paint::opacity);
        self.ctx.push_layer(clip.as_ref(), blend, opacity, None, None);
        *self.open_layers() += 1;
        Ok(())
    }

    fn restore(&mut self) -> Result<(), VelloCpuError> {
        let Some(frame) = self.frames.pop() else {
            tracing::debug!("restore with nothing saved ignored");
            return Ok(());
        };
        for _ in 0..frame.layers {
            self.ctx.pop_layer();
        }
        if frame.flags.contains(SaveFlags::MATRIX) {
            self.set_transform(frame.transform);
        }
        Ok(())
    }

    fn draw_bitmap(
        &mut self,
        image: &ImageSnapshot,
        left: f64,
        top: f64,
        paint: Option<&Paint>,
    ) -> Result<(), VelloCpuError> {
        self.draw_image(image, Affine::translate((left, top)), None, paint)
    }

    fn draw_bitmap_matrix(
        &mut self,
        image: &ImageSnapshot,
        matrix: Affine,
        paint: Option<&Paint>,
    ) -> Result<(), VelloCpuError> {
        self.draw_image(image, matrix, None, paint)
    }

    fn draw_bitmap_nine(
        &mut self,
        image: &ImageSnapshot,
        center: IRect,
        dst: Rect,
        paint: Option<&Paint>,
    ) -> Result<(), VelloCpuError> {
        for cell in nine_patch(image.width(), image.height(), center, dst) {
            if let Some(local) = rect_to_rect(cell.src, cell.dst) {
                self.draw_image(image, local, Some(cell.dst), paint)?;
            }
        }
        Ok(())
    }

    fn draw_bitmap_rect(
        &mut self,
        image: &ImageSnapshot,
        src: Option<Rect>,
        dst: Rect,
        paint: Option<&Paint>,
    ) -> Result<(), VelloCpuError> {
        let src = src.unwrap_or_else(|| image.bounds().to_rect());
        if let Some(local) = rect_to_rect(src, dst) {
            self.draw_image(image, local, Some(dst), paint)?;
        }
        Ok(())
    }

    fn draw_sprite(
        &mut self,
        image: &ImageSnapshot,
        left: i32,
        top: i32,
        paint: Option<&Paint>,
    ) -> Result<(), VelloCpuError> {
        let saved = self.transform;
        self.transform = Affine::IDENTITY;
        let local = Affine::translate((f64::from(left), f64::from(top)));
        let drawn = self.draw_image(image, local, None, paint);
        self.set_transform(saved);
        drawn
    }

    fn draw_data(&mut self, data: &[u8]) -> Result<(), VelloCpuError> {
        tracing::debug!(len = data.len(), "data blob has no visual effect");
        Ok(())
    }

    fn draw_oval(&mut self, oval: Rect, paint: &Paint) -> Result<(), VelloCpuError> {
        self.paint_path(&to_cpu_path(&Ellipse::from_rect(oval)), paint, paint.style)
    }

    fn draw_paint(&mut self, paint: &Paint) -> Result<(), VelloCpuError> {
        self.paint_canvas(&paint.brush, paint.blend)
    }

    fn draw_path(&mut self, path: &BezPath, paint: &Paint) -> Result<(), VelloCpuError> {
        self.paint_path(&to_cpu_path(path), paint, paint.style)
    }

    fn draw_points(
        &mut self,
        mode: PointMode,
        points: &[Point],
        paint: &Paint,
    ) -> Result<(), VelloCpuError> {
        let mut path = BezPath::new();
        match mode {
            PointMode::Points => {
                let half = paint.stroke.width.max(1.0) / 2.0;
                for p in points {
                    let dot = Rect::new(p.x - half, p.y - half, p.x + half, p.y + half);
                    path.extend(dot.path_elements(CURVE_TOLERANCE));
                }
            }
            PointMode::Lines => {
                for pair in points.chunks_exact(2) {
                    path.move_to(pair[0]);
                    path.line_to(pair[1]);
                }
            }
            PointMode::Polygon => {
                if let Some((first, rest)) = points.split_first() {
                    path.move_to(*first);
                    for p in rest {
                        path.line_to(*p);
                    }
                }
            }
        }
        if path.elements().is_empty() {
            return Ok(());
        }
        let style = match mode {
            PointMode::Points => PaintStyle::Fill,
            PointMode::Lines | PointMode::Polygon => PaintStyle::Stroke,
        };
        self.paint_path(&to_cpu_path(&path), paint, style)
    }

    fn draw_pos_text(
        &mut self,
        text: &Text,
        _positions: &[Point],
        _paint: &Paint,
    ) -> Result<(), VelloCpuError> {
        tracing::debug!(glyphs = text.glyph_count(), "text is not rasterized");
        Ok(())
    }

    fn draw_pos_text_h(
        &mut self,
        text: &Text,
        _xpos: &[f64],
        _const_y: f64,
        _paint: &Paint,
    ) -> Result<(), VelloCpuError> {
        tracing::debug!(glyphs = text.glyph_count(), "text is not rasterized");
        Ok(())
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) -> Result<(), VelloCpuError> {
        self.paint_path(&to_cpu_path(&rect), paint, paint.style)
    }

    fn draw_rrect(&mut self, rrect: RoundedRect, paint: &Paint) -> Result<(), VelloCpuError> {
        self.paint_path(&to_cpu_path(&rrect), paint, paint.style)
    }

    fn draw_text(
        &mut self,
        text: &Text,
        _x: f64,
        _y: f64,
        _paint: &Paint,
    ) -> Result<(), VelloCpuError> {
        tracing::debug!(glyphs = text.glyph_count(), "text is not rasterized");
        Ok(())
    }

    fn draw_text_on_path(
        &mut self,
        text: &Text,
        _path: &BezPath,
        _matrix: Option<Affine>,
        _paint: &Paint,
    ) -> Result<(), VelloCpuError> {
        tracing::debug!(glyphs = text.glyph_count(), "text is not rasterized");
        Ok(())
    }

    fn draw_vertices(&mut self, vertices: &Vertices, paint: &Paint) -> Result<(), VelloCpuError> {
        if vertices.colors().is_some() || vertices.tex_coords().is_some() {
            tracing::debug!("vertex colors and texture coordinates are not rasterized");
        }
        let mut path = BezPath::new();
        for [a, b, c] in vertices.triangles() {
            path.move_to(a);
            path.line_to(b);
            path.line_to(c);
            path.close_path();
        }
        if path.elements().is_empty() {
            return Ok(());
        }
        self.paint_path(&to_cpu_path(&path), paint, PaintStyle::Fill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_to_rect_maps_corners() {
        let m = rect_to_rect(
            Rect::new(1.0, 1.0, 3.0, 3.0),
            Rect::new(10.0, 20.0, 14.0, 30.0),
        )
        .unwrap();
        assert_eq!(m * Point::new(1.0, 1.0), Point::new(10.0, 20.0));
        assert_eq!(m * Point::new(3.0, 3.0), Point::new(14.0, 30.0));
    }

    #[test]
    fn degenerate_rects_have_no_mapping() {
        let empty = Rect::new(2.0, 2.0, 2.0, 5.0);
        let dst = Rect::new(0.0, 0.0, 4.0, 4.0);
        assert_eq!(rect_to_rect(empty, dst), None);
        assert_eq!(rect_to_rect(dst, empty), None);
    }

    #[test]
    fn only_intersect_clips_are_rendered() {
        let mut ctx = RenderContext::new(16, 16);
        let mut surface = VelloCpuSurface::new(&mut ctx);
        let rect = Rect::new(0.0, 0.0, 8.0, 8.0);
        surface.clip_rect(rect, RegionOp::Intersect, false).unwrap();
        assert_eq!(
            surface.clip_rect(rect, RegionOp::Difference, false),
            Err(VelloCpuError::UnsupportedClipOp {
                op: RegionOp::Difference
            })
        );
        assert_eq!(surface.root_layers, 1);
        surface.finish();
        assert_eq!(surface.root_layers, 0);
    }

    #[test]
    fn restore_pops_layers_and_honours_matrix_flag() {
        let mut ctx = RenderContext::new(16, 16);
        let mut surface = VelloCpuSurface::new(&mut ctx);
        surface.save(SaveFlags::CLIP).unwrap();
        surface.translate(3.0, 4.0).unwrap();
        surface
            .clip_rect(Rect::new(0.0, 0.0, 4.0, 4.0), RegionOp::Intersect, true)
            .unwrap();
        assert_eq!(surface.frames[0].layers, 1);
        surface.restore().unwrap();
        assert_eq!(surface.save_depth(), 0);
        assert_eq!(surface.transform(), Affine::translate((3.0, 4.0)));

        surface.save(SaveFlags::MATRIX).unwrap();
        surface.scale(2.0, 2.0).unwrap();
        surface.restore().unwrap();
        assert_eq!(surface.transform(), Affine::translate((3.0, 4.0)));
    }

    #[test]
    fn non_finite_transforms_are_rejected() {
        let mut ctx = RenderContext::new(4, 4);
        let mut surface = VelloCpuSurface::new(&mut ctx);
        assert_eq!(
            surface.scale(f64::INFINITY, 1.0),
            Err(VelloCpuError::NonFiniteTransform)
        );
        assert_eq!(surface.transform(), Affine::IDENTITY);
    }
}
