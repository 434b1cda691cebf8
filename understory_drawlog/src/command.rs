// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The closed catalog of recorded drawing operations.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::{Affine, BezPath, Point, Rect, RoundedRect};
use peniko::Color;

use crate::descriptor::{self as fmt, Descriptor};
use crate::{
    CaptureConfig, CaptureError, IRect, ImageSnapshot, Paint, Picture, PointMode, Region,
    RegionOp, SaveFlags, Surface, Text, Vertices,
};

/// Fieldless tag naming each kind of [`DrawCommand`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs, reason = "variants mirror DrawCommand one to one")]
pub enum CommandKind {
    Clear,
    ClipPath,
    ClipRegion,
    ClipRect,
    ClipRRect,
    Concat,
    DrawBitmap,
    DrawBitmapMatrix,
    DrawBitmapNine,
    DrawBitmapRect,
    DrawData,
    DrawOval,
    DrawPaint,
    DrawPath,
    DrawPicture,
    DrawPoints,
    DrawPosText,
    DrawPosTextH,
    DrawRect,
    DrawRRect,
    DrawSprite,
    DrawText,
    DrawTextOnPath,
    DrawVertices,
    Restore,
    Rotate,
    Save,
    SaveLayer,
    Scale,
    SetMatrix,
    Skew,
    Translate,
    NoOp,
}

impl CommandKind {
    /// Every kind, in catalog order.
    pub const ALL: [Self; 33] = [
        Self::Clear,
        Self::ClipPath,
        Self::ClipRegion,
        Self::ClipRect,
        Self::ClipRRect,
        Self::Concat,
        Self::DrawBitmap,
        Self::DrawBitmapMatrix,
        Self::DrawBitmapNine,
        Self::DrawBitmapRect,
        Self::DrawData,
        Self::DrawOval,
        Self::DrawPaint,
        Self::DrawPath,
        Self::DrawPicture,
        Self::DrawPoints,
        Self::DrawPosText,
        Self::DrawPosTextH,
        Self::DrawRect,
        Self::DrawRRect,
        Self::DrawSprite,
        Self::DrawText,
        Self::DrawTextOnPath,
        Self::DrawVertices,
        Self::Restore,
        Self::Rotate,
        Self::Save,
        Self::SaveLayer,
        Self::Scale,
        Self::SetMatrix,
        Self::Skew,
        Self::Translate,
        Self::NoOp,
    ];

    /// Fixed display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::ClipPath => "Clip Path",
            Self::ClipRegion => "Clip Region",
            Self::ClipRect => "Clip Rect",
            Self::ClipRRect => "Clip RRect",
            Self::Concat => "Concat",
            Self::DrawBitmap => "Draw Bitmap",
            Self::DrawBitmapMatrix => "Draw Bitmap Matrix",
            Self::DrawBitmapNine => "Draw Bitmap Nine",
            Self::DrawBitmapRect => "Draw Bitmap Rect",
            Self::DrawData => "Draw Data",
            Self::DrawOval => "Draw Oval",
            Self::DrawPaint => "Draw Paint",
            Self::DrawPath => "Draw Path",
            Self::DrawPicture => "Draw Picture",
            Self::DrawPoints => "Draw Points",
            Self::DrawPosText => "Draw Pos Text",
            Self::DrawPosTextH => "Draw Pos Text H",
            Self::DrawRect => "Draw Rect",
            Self::DrawRRect => "Draw RRect",
            Self::DrawSprite => "Draw Sprite",
            Self::DrawText => "Draw Text",
            Self::DrawTextOnPath => "Draw Text On Path",
            Self::DrawVertices => "Draw Vertices",
            Self::Restore => "Restore",
            Self::Rotate => "Rotate",
            Self::Save => "Save",
            Self::SaveLayer => "Save Layer",
            Self::Scale => "Scale",
            Self::SetMatrix => "Set Matrix",
            Self::Skew => "Skew",
            Self::Translate => "Translate",
            Self::NoOp => "NoOp",
        }
    }
}

/// One recorded drawing operation and its owned arguments.
///
/// Buffers are owned slices sized to the captured argument; optional arguments
/// stay `Option` so an omitted argument replays as omitted.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs, reason = "fields mirror the Surface method arguments")]
pub enum DrawCommand {
    /// See [`Surface::clear`].
    Clear { color: Color },
    /// See [`Surface::clip_path`].
    ClipPath {
        path: BezPath,
        op: RegionOp,
        anti_alias: bool,
    },
    /// See [`Surface::clip_region`].
    ClipRegion { region: Region, op: RegionOp },
    /// See [`Surface::clip_rect`].
    ClipRect {
        rect: Rect,
        op: RegionOp,
        anti_alias: bool,
    },
    /// See [`Surface::clip_rrect`].
    ClipRRect {
        rrect: RoundedRect,
        op: RegionOp,
        anti_alias: bool,
    },
    /// See [`Surface::concat`].
    Concat(Affine),
    /// See [`Surface::draw_bitmap`].
    DrawBitmap {
        image: ImageSnapshot,
        left: f64,
        top: f64,
        paint: Option<Paint>,
    },
    /// See [`Surface::draw_bitmap_matrix`].
    DrawBitmapMatrix {
        image: ImageSnapshot,
        matrix: Affine,
        paint: Option<Paint>,
    },
    /// See [`Surface::draw_bitmap_nine`].
    DrawBitmapNine {
        image: ImageSnapshot,
        center: IRect,
        dst: Rect,
        paint: Option<Paint>,
    },
    /// See [`Surface::draw_bitmap_rect`].
    DrawBitmapRect {
        image: ImageSnapshot,
        src: Option<Rect>,
        dst: Rect,
        paint: Option<Paint>,
    },
    /// See [`Surface::draw_data`].
    DrawData(Box<[u8]>),
    /// See [`Surface::draw_oval`].
    DrawOval { oval: Rect, paint: Paint },
    /// See [`Surface::draw_paint`].
    DrawPaint(Paint),
    /// See [`Surface::draw_path`].
    DrawPath { path: BezPath, paint: Paint },
    /// See [`Surface::draw_picture`].
    DrawPicture(Picture),
    /// See [`Surface::draw_points`].
    DrawPoints {
        mode: PointMode,
        points: Box<[Point]>,
        paint: Paint,
    },
    /// See [`Surface::draw_pos_text`].
    DrawPosText {
        text: Text,
        positions: Box<[Point]>,
        paint: Paint,
    },
    /// See [`Surface::draw_pos_text_h`].
    DrawPosTextH {
        text: Text,
        xpos: Box<[f64]>,
        const_y: f64,
        paint: Paint,
    },
    /// See [`Surface::draw_rect`].
    DrawRect { rect: Rect, paint: Paint },
    /// See [`Surface::draw_rrect`].
    DrawRRect { rrect: RoundedRect, paint: Paint },
    /// See [`Surface::draw_sprite`].
    DrawSprite {
        image: ImageSnapshot,
        left: i32,
        top: i32,
        paint: Option<Paint>,
    },
    /// See [`Surface::draw_text`].
    DrawText {
        text: Text,
        x: f64,
        y: f64,
        paint: Paint,
    },
    /// See [`Surface::draw_text_on_path`].
    DrawTextOnPath {
        text: Text,
        path: BezPath,
        matrix: Option<Affine>,
        paint: Paint,
    },
    /// See [`Surface::draw_vertices`].
    DrawVertices { vertices: Vertices, paint: Paint },
    /// See [`Surface::restore`].
    Restore,
    /// See [`Surface::rotate`].
    Rotate { degrees: f64 },
    /// See [`Surface::save`].
    Save { flags: SaveFlags },
    /// See [`Surface::save_layer`].
    SaveLayer {
        bounds: Option<Rect>,
        paint: Option<Paint>,
        flags: SaveFlags,
    },
    /// See [`Surface::scale`].
    Scale { sx: f64, sy: f64 },
    /// See [`Surface::set_matrix`].
    SetMatrix(Affine),
    /// See [`Surface::skew`].
    Skew { sx: f64, sy: f64 },
    /// See [`Surface::translate`].
    Translate { dx: f64, dy: f64 },
    /// Does nothing when executed.
    NoOp,
}

impl DrawCommand {
    /// Tag of this command.
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Clear { .. } => CommandKind::Clear,
            Self::ClipPath { .. } => CommandKind::ClipPath,
            Self::ClipRegion { .. } => CommandKind::ClipRegion,
            Self::ClipRect { .. } => CommandKind::ClipRect,
            Self::ClipRRect { .. } => CommandKind::ClipRRect,
            Self::Concat(_) => CommandKind::Concat,
            Self::DrawBitmap { .. } => CommandKind::DrawBitmap,
            Self::DrawBitmapMatrix { .. } => CommandKind::DrawBitmapMatrix,
            Self::DrawBitmapNine { .. } => CommandKind::DrawBitmapNine,
            Self::DrawBitmapRect { .. } => CommandKind::DrawBitmapRect,
            Self::DrawData(_) => CommandKind::DrawData,
            Self::DrawOval { .. } => CommandKind::DrawOval,
            Self::DrawPaint(_) => CommandKind::DrawPaint,
            Self::DrawPath { .. } => CommandKind::DrawPath,
            Self::DrawPicture(_) => CommandKind::DrawPicture,
            Self::DrawPoints { .. } => CommandKind::DrawPoints,
            Self::DrawPosText { .. } => CommandKind::DrawPosText,
            Self::DrawPosTextH { .. } => CommandKind::DrawPosTextH,
            Self::DrawRect { .. } => CommandKind::DrawRect,
            Self::DrawRRect { .. } => CommandKind::DrawRRect,
            Self::DrawSprite { .. } => CommandKind::DrawSprite,
            Self::DrawText { .. } => CommandKind::DrawText,
            Self::DrawTextOnPath { .. } => CommandKind::DrawTextOnPath,
            Self::DrawVertices { .. } => CommandKind::DrawVertices,
            Self::Restore => CommandKind::Restore,
            Self::Rotate { .. } => CommandKind::Rotate,
            Self::Save { .. } => CommandKind::Save,
            Self::SaveLayer { .. } => CommandKind::SaveLayer,
            Self::Scale { .. } => CommandKind::Scale,
            Self::SetMatrix(_) => CommandKind::SetMatrix,
            Self::Skew { .. } => CommandKind::Skew,
            Self::Translate { .. } => CommandKind::Translate,
            Self::NoOp => CommandKind::NoOp,
        }
    }

    /// Contribution to the save/restore nesting depth.
    pub fn save_depth_delta(&self) -> i32 {
        match self {
            Self::Save { .. } | Self::SaveLayer { .. } => 1,
            Self::Restore => -1,
            _ => 0,
        }
    }

    /// Apply this command to `surface`.
    ///
    /// Surface errors are returned unchanged.
    pub fn execute<S: Surface + ?Sized>(&self, surface: &mut S) -> Result<(), S::Error> {
        match self {
            Self::Clear { color } => surface.clear(*color),
            Self::ClipPath {
                path,
                op,
                anti_alias,
            } => surface.clip_path(path, *op, *anti_alias),
            Self::ClipRegion { region, op } => surface.clip_region(region, *op),
            Self::ClipRect {
                rect,
                op,
                anti_alias,
            } => surface.clip_rect(*rect, *op, *anti_alias),
            Self::ClipRRect {
                rrect,
                op,
                anti_alias,
            } => surface.clip_rrect(*rrect, *op, *anti_alias),
            Self::Concat(m) => surface.concat(*m),
            Self::DrawBitmap {
                image,
                left,
                top,
                paint,
            } => surface.draw_bitmap(image, *left, *top, paint.as_ref()),
            Self::DrawBitmapMatrix {
                image,
                matrix,
                paint,
            } => surface.draw_bitmap_matrix(image, *matrix, paint.as_ref()),
            Self::DrawBitmapNine {
                image,
                center,
                dst,
                paint,
            } => surface.draw_bitmap_nine(image, *center, *dst, paint.as_ref()),
            Self::DrawBitmapRect {
                image,
                src,
                dst,
                paint,
            } => surface.draw_bitmap_rect(image, *src, *dst, paint.as_ref()),
            Self::DrawData(data) => surface.draw_data(data),
            Self::DrawOval { oval, paint } => surface.draw_oval(*oval, paint),
            Self::DrawPaint(paint) => surface.draw_paint(paint),
            Self::DrawPath { path, paint } => surface.draw_path(path, paint),
            Self::DrawPicture(picture) => surface.draw_picture(picture),
            Self::DrawPoints {
                mode,
                points,
                paint,
            } => surface.draw_points(*mode, points, paint),
            Self::DrawPosText {
                text,
                positions,
                paint,
            } => surface.draw_pos_text(text, positions, paint),
            Self::DrawPosTextH {
                text,
                xpos,
                const_y,
                paint,
            } => surface.draw_pos_text_h(text, xpos, *const_y, paint),
            Self::DrawRect { rect, paint } => surface.draw_rect(*rect, paint),
            Self::DrawRRect { rrect, paint } => surface.draw_rrect(*rrect, paint),
            Self::DrawSprite {
                image,
                left,
                top,
                paint,
            } => surface.draw_sprite(image, *left, *top, paint.as_ref()),
            Self::DrawText { text, x, y, paint } => surface.draw_text(text, *x, *y, paint),
            Self::DrawTextOnPath {
                text,
                path,
                matrix,
                paint,
            } => surface.draw_text_on_path(text, path, *matrix, paint),
            Self::DrawVertices { vertices, paint } => surface.draw_vertices(vertices, paint),
            Self::Restore => surface.restore(),
            Self::Rotate { degrees } => surface.rotate(*degrees),
            Self::Save { flags } => surface.save(*flags),
            Self::SaveLayer {
                bounds,
                paint,
                flags,
            } => surface.save_layer(*bounds, paint.as_ref(), *flags),
            Self::Scale { sx, sy } => surface.scale(*sx, *sy),
            Self::SetMatrix(m) => surface.set_matrix(*m),
            Self::Skew { sx, sy } => surface.skew(*sx, *sy),
            Self::Translate { dx, dy } => surface.translate(*dx, *dy),
            Self::NoOp => Ok(()),
        }
    }

    /// Format the arguments of this command for display.
    pub fn descriptors(&self) -> Vec<Descriptor> {
        let mut out = Vec::new();
        let paint = |out: &mut Vec<Descriptor>, p: &Paint| {
            out.push(Descriptor::new("Paint", fmt::paint(p)));
        };
        let opt_paint = |out: &mut Vec<Descriptor>, p: &Option<Paint>| {
            if let Some(p) = p {
                out.push(Descriptor::new("Paint", fmt::paint(p)));
            }
        };
        let clip = |out: &mut Vec<Descriptor>, op: RegionOp, aa: bool| {
            out.push(Descriptor::new("Op", fmt::region_op(op)));
            out.push(Descriptor::new("Anti-Aliasing", fmt::boolean(aa)));
        };
        match self {
            Self::Clear { color } => out.push(Descriptor::new("Color", fmt::color(*color))),
            Self::ClipPath {
                path,
                op,
                anti_alias,
            } => {
                out.push(Descriptor::new("Path", fmt::path(path)));
                clip(&mut out, *op, *anti_alias);
            }
            Self::ClipRegion { region, op } => {
                out.push(Descriptor::new("Region", fmt::region(region)));
                out.push(Descriptor::new("Op", fmt::region_op(*op)));
            }
            Self::ClipRect {
                rect,
                op,
                anti_alias,
            } => {
                out.push(Descriptor::new("Rect", fmt::rect(*rect)));
                clip(&mut out, *op, *anti_alias);
            }
            Self::ClipRRect {
                rrect,
                op,
                anti_alias,
            } => {
                out.push(Descriptor::new("RRect", fmt::rrect(*rrect)));
                clip(&mut out, *op, *anti_alias);
            }
            Self::Concat(m) | Self::SetMatrix(m) => {
                out.push(Descriptor::new("Matrix", fmt::matrix(*m)));
            }
            Self::DrawBitmap {
                image,
                left,
                top,
                paint,
            } => {
                out.push(Descriptor::new("Bitmap", fmt::image(image)));
                out.push(Descriptor::new("Left", fmt::scalar(*left)));
                out.push(Descriptor::new("Top", fmt::scalar(*top)));
                opt_paint(&mut out, paint);
            }
            Self::DrawBitmapMatrix {
                image,
                matrix,
                paint,
            } => {
                out.push(Descriptor::new("Bitmap", fmt::image(image)));
                out.push(Descriptor::new("Matrix", fmt::matrix(*matrix)));
                opt_paint(&mut out, paint);
            }
            Self::DrawBitmapNine {
                image,
                center,
                dst,
                paint,
            } => {
                out.push(Descriptor::new("Bitmap", fmt::image(image)));
                out.push(Descriptor::new("Center", fmt::irect(*center)));
                out.push(Descriptor::new("Dst", fmt::rect(*dst)));
                opt_paint(&mut out, paint);
            }
            Self::DrawBitmapRect {
                image,
                src,
                dst,
                paint,
            } => {
                out.push(Descriptor::new("Bitmap", fmt::image(image)));
                if let Some(src) = src {
                    out.push(Descriptor::new("Src", fmt::rect(*src)));
                }
                out.push(Descriptor::new("Dst", fmt::rect(*dst)));
                opt_paint(&mut out, paint);
            }
            Self::DrawData(data) => out.push(Descriptor::new("Data", fmt::data(data))),
            Self::DrawOval { oval, paint: p } => {
                out.push(Descriptor::new("Oval", fmt::rect(*oval)));
                paint(&mut out, p);
            }
            Self::DrawPaint(p) => paint(&mut out, p),
            Self::DrawPath { path, paint: p } => {
                out.push(Descriptor::new("Path", fmt::path(path)));
                paint(&mut out, p);
            }
            Self::DrawPicture(picture) => {
                out.push(Descriptor::new("Commands", fmt::count(picture.len())));
                out.push(Descriptor::new("Bounds", fmt::rect(picture.bounds())));
            }
            Self::DrawPoints {
                mode,
                points,
                paint: p,
            } => {
                out.push(Descriptor::new("Points", fmt::points(points)));
                out.push(Descriptor::new("Count", fmt::count(points.len())));
                out.push(Descriptor::new("Mode", fmt::point_mode(*mode)));
                paint(&mut out, p);
            }
            Self::DrawPosText {
                text,
                positions,
                paint: p,
            } => {
                out.push(Descriptor::new("Text", fmt::text(text)));
                out.push(Descriptor::new("Positions", fmt::points(positions)));
                paint(&mut out, p);
            }
            Self::DrawPosTextH {
                text,
                xpos,
                const_y,
                paint: p,
            } => {
                out.push(Descriptor::new("Text", fmt::text(text)));
                out.push(Descriptor::new("X Positions", fmt::scalars(xpos)));
                out.push(Descriptor::new("Const Y", fmt::scalar(*const_y)));
                paint(&mut out, p);
            }
            Self::DrawRect { rect, paint: p } => {
                out.push(Descriptor::new("Rect", fmt::rect(*rect)));
                paint(&mut out, p);
            }
            Self::DrawRRect { rrect, paint: p } => {
                out.push(Descriptor::new("RRect", fmt::rrect(*rrect)));
                paint(&mut out, p);
            }
            Self::DrawSprite {
                image,
                left,
                top,
                paint,
            } => {
                out.push(Descriptor::new("Bitmap", fmt::image(image)));
                out.push(Descriptor::new("Left", fmt::int(i64::from(*left))));
                out.push(Descriptor::new("Top", fmt::int(i64::from(*top))));
                opt_paint(&mut out, paint);
            }
            Self::DrawText {
                text,
                x,
                y,
                paint: p,
            } => {
                out.push(Descriptor::new("Text", fmt::text(text)));
                out.push(Descriptor::new("X", fmt::scalar(*x)));
                out.push(Descriptor::new("Y", fmt::scalar(*y)));
                paint(&mut out, p);
            }
            Self::DrawTextOnPath {
                text,
                path,
                matrix,
                paint: p,
            } => {
                out.push(Descriptor::new("Text", fmt::text(text)));
                out.push(Descriptor::new("Path", fmt::path(path)));
                if let Some(m) = matrix {
                    out.push(Descriptor::new("Matrix", fmt::matrix(*m)));
                }
                paint(&mut out, p);
            }
            Self::DrawVertices { vertices, paint: p } => {
                out.push(Descriptor::new("Mode", vertices.mode().name()));
                out.push(Descriptor::new(
                    "Vertex Count",
                    fmt::count(vertices.positions().len()),
                ));
                out.push(Descriptor::new(
                    "Texture Coordinates",
                    fmt::boolean(vertices.tex_coords().is_some()),
                ));
                out.push(Descriptor::new(
                    "Colors",
                    fmt::boolean(vertices.colors().is_some()),
                ));
                if let Some(indices) = vertices.indices() {
                    out.push(Descriptor::new("Index Count", fmt::count(indices.len())));
                }
                if let Some(blend) = vertices.blend() {
                    out.push(Descriptor::new("Blend", fmt::blend(blend)));
                }
                paint(&mut out, p);
            }
            Self::Restore | Self::NoOp => out.push(Descriptor::note("No Parameters")),
            Self::Rotate { degrees } => {
                out.push(Descriptor::new("Degrees", fmt::scalar(*degrees)));
            }
            Self::Save { flags } => out.push(Descriptor::new("Flags", fmt::save_flags(*flags))),
            Self::SaveLayer {
                bounds,
                paint,
                flags,
            } => {
                if let Some(bounds) = bounds {
                    out.push(Descriptor::new("Bounds", fmt::rect(*bounds)));
                }
                opt_paint(&mut out, paint);
                out.push(Descriptor::new("Flags", fmt::save_flags(*flags)));
            }
            Self::Scale { sx, sy } | Self::Skew { sx, sy } => {
                out.push(Descriptor::new("Sx", fmt::scalar(*sx)));
                out.push(Descriptor::new("Sy", fmt::scalar(*sy)));
            }
            Self::Translate { dx, dy } => {
                out.push(Descriptor::new("Dx", fmt::scalar(*dx)));
                out.push(Descriptor::new("Dy", fmt::scalar(*dy)));
            }
        }
        out
    }

    /// The image an image-bearing command draws, as it is drawn.
    ///
    /// For a bitmap-rect draw with a source rectangle this is the part of the
    /// image inside that rectangle. Other commands return `None`.
    pub fn image(&self) -> Option<ImageSnapshot> {
        match self {
            Self::DrawBitmap { image, .. }
            | Self::DrawBitmapMatrix { image, .. }
            | Self::DrawBitmapNine { image, .. }
            | Self::DrawSprite { image, .. }
            | Self::DrawBitmapRect {
                image, src: None, ..
            } => Some(image.clone()),
            Self::DrawBitmapRect {
                image,
                src: Some(src),
                ..
            } => Some(image.crop(IRect::round_out(*src))),
            _ => None,
        }
    }

    /// Check buffer-bearing payloads and trim them to the length they describe.
    ///
    /// Position arrays must hold at least one entry per glyph; extra entries
    /// are dropped.
    pub(crate) fn normalize(&mut self) -> Result<(), CaptureError> {
        match self {
            Self::DrawPosText {
                text, positions, ..
            } => trim_to_glyphs(text, positions),
            Self::DrawPosTextH { text, xpos, .. } => trim_to_glyphs(text, xpos),
            _ => Ok(()),
        }
    }
}

fn trim_to_glyphs<T: Copy>(text: &Text, values: &mut Box<[T]>) -> Result<(), CaptureError> {
    let glyphs = text.glyph_count();
    if values.len() < glyphs {
        return Err(CaptureError::PositionCount {
            expected: glyphs,
            actual: values.len(),
        });
    }
    if values.len() > glyphs {
        *values = values[..glyphs].into();
    }
    Ok(())
}

/// A captured command as shown by a debugger: the operation, its descriptors,
/// an optional preview image and a visibility flag.
///
/// Everything but the visibility flag is fixed at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Command {
    op: DrawCommand,
    descriptors: Box<[Descriptor]>,
    preview: Option<ImageSnapshot>,
    visible: bool,
}

impl Command {
    /// Capture `op` with the default [`CaptureConfig`].
    pub fn new(op: DrawCommand) -> Result<Self, CaptureError> {
        Self::with_config(op, &CaptureConfig::default())
    }

    /// Capture `op`, building its descriptors and preview once.
    pub fn with_config(mut op: DrawCommand, config: &CaptureConfig) -> Result<Self, CaptureError> {
        op.normalize()?;
        let descriptors = op.descriptors().into_boxed_slice();
        let preview = if config.previews {
            op.image().map(|image| image.fit_within(config.preview_edge))
        } else {
            None
        };
        Ok(Self {
            op,
            descriptors,
            preview,
            visible: true,
        })
    }

    /// The recorded operation.
    #[inline]
    pub fn op(&self) -> &DrawCommand {
        &self.op
    }

    /// Take the recorded operation, dropping descriptors and preview.
    pub fn into_op(self) -> DrawCommand {
        self.op
    }

    /// Tag of the recorded operation.
    #[inline]
    pub fn kind(&self) -> CommandKind {
        self.op.kind()
    }

    /// Display name of the recorded operation.
    #[inline]
    pub fn kind_name(&self) -> &'static str {
        self.kind().name()
    }

    /// Descriptors built at capture time.
    #[inline]
    pub fn describe(&self) -> &[Descriptor] {
        &self.descriptors
    }

    /// The image this command draws, if it draws one.
    ///
    /// Returns the capture-time preview when one was built, otherwise a
    /// full-size snapshot taken from the operation.
    pub fn embedded_image(&self) -> Option<Cow<'_, ImageSnapshot>> {
        match &self.preview {
            Some(preview) => Some(Cow::Borrowed(preview)),
            None => self.op.image().map(Cow::Owned),
        }
    }

    /// Contribution to the save/restore nesting depth.
    #[inline]
    pub fn save_depth_delta(&self) -> i32 {
        self.op.save_depth_delta()
    }

    /// Whether replay executes this command.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Include or exclude this command from replay.
    #[inline]
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Apply the recorded operation to `surface`, regardless of visibility.
    pub fn execute<S: Surface + ?Sized>(&self, surface: &mut S) -> Result<(), S::Error> {
        self.op.execute(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TextEncoding, VertexMode};
    use alloc::string::ToString;
    use alloc::vec;

    fn values(command: &Command) -> Vec<alloc::string::String> {
        command.describe().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn names_are_unique() {
        for (i, a) in CommandKind::ALL.iter().enumerate() {
            for b in &CommandKind::ALL[i + 1..] {
                assert_ne!(a.name(), b.name());
            }
        }
    }

    #[test]
    fn depth_deltas() {
        assert_eq!(
            DrawCommand::Save {
                flags: SaveFlags::MATRIX_CLIP
            }
            .save_depth_delta(),
            1
        );
        assert_eq!(
            DrawCommand::SaveLayer {
                bounds: None,
                paint: None,
                flags: SaveFlags::all()
            }
            .save_depth_delta(),
            1
        );
        assert_eq!(DrawCommand::Restore.save_depth_delta(), -1);
        assert_eq!(DrawCommand::Rotate { degrees: 90.0 }.save_depth_delta(), 0);
    }

    #[test]
    fn argument_less_commands_say_so() {
        let restore = Command::new(DrawCommand::Restore).unwrap();
        assert_eq!(values(&restore), ["No Parameters"]);
        assert_eq!(restore.kind_name(), "Restore");
    }

    #[test]
    fn optional_arguments_only_described_when_present() {
        let layer = Command::new(DrawCommand::SaveLayer {
            bounds: None,
            paint: None,
            flags: SaveFlags::MATRIX_CLIP,
        })
        .unwrap();
        assert_eq!(values(&layer), ["Flags: Matrix | Clip"]);

        let layer = Command::new(DrawCommand::SaveLayer {
            bounds: Some(Rect::new(0.0, 0.0, 0.0, 0.0)),
            paint: None,
            flags: SaveFlags::MATRIX_CLIP,
        })
        .unwrap();
        assert_eq!(
            values(&layer),
            ["Bounds: L: 0, T: 0, R: 0, B: 0", "Flags: Matrix | Clip"]
        );
    }

    #[test]
    fn describes_transform_arguments() {
        let t = Command::new(DrawCommand::Translate { dx: 10.0, dy: 2.5 }).unwrap();
        assert_eq!(values(&t), ["Dx: 10", "Dy: 2.5"]);
        let r = Command::new(DrawCommand::Rotate { degrees: 45.0 }).unwrap();
        assert_eq!(values(&r), ["Degrees: 45"]);
    }

    #[test]
    fn tiny_offsets_are_not_rounded_away() {
        let t = Command::new(DrawCommand::Translate {
            dx: 0.00001,
            dy: -0.00004,
        })
        .unwrap();
        assert_eq!(values(&t), ["Dx: 0.00001", "Dy: -0.00004"]);
    }

    #[test]
    fn empty_points_are_legal() {
        let command = Command::new(DrawCommand::DrawPoints {
            mode: PointMode::Points,
            points: Box::new([]),
            paint: Paint::default(),
        })
        .unwrap();
        let d = command.describe();
        assert_eq!(d[0].value(), "(none)");
        assert_eq!(d[1].to_string(), "Count: 0");
        assert_eq!(d[2].to_string(), "Mode: Points");
    }

    #[test]
    fn pos_text_keeps_one_position_per_glyph() {
        let text = Text::new(b"ab", TextEncoding::Utf8).unwrap();
        let command = Command::new(DrawCommand::DrawPosText {
            text: text.clone(),
            positions: vec![
                Point::new(0.0, 0.0),
                Point::new(5.0, 0.0),
                Point::new(9.0, 9.0),
            ]
            .into(),
            paint: Paint::default(),
        })
        .unwrap();
        let DrawCommand::DrawPosText { positions, .. } = command.op() else {
            panic!("wrong variant");
        };
        assert_eq!(positions.len(), 2);

        let err = Command::new(DrawCommand::DrawPosTextH {
            text,
            xpos: Box::new([1.0]),
            const_y: 0.0,
            paint: Paint::default(),
        })
        .unwrap_err();
        assert_eq!(
            err,
            CaptureError::PositionCount {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn image_commands_carry_previews() {
        let image = ImageSnapshot::solid(512, 128, [255, 0, 0, 255]).unwrap();
        let command = Command::new(DrawCommand::DrawBitmap {
            image: image.clone(),
            left: 0.0,
            top: 0.0,
            paint: None,
        })
        .unwrap();
        let preview = command.embedded_image().unwrap();
        assert_eq!((preview.width(), preview.height()), (256, 64));
        assert_eq!(values(&command).len(), 3);

        let cropped = Command::new(DrawCommand::DrawBitmapRect {
            image: image.clone(),
            src: Some(Rect::new(0.5, 0.0, 10.0, 10.0)),
            dst: Rect::new(0.0, 0.0, 20.0, 20.0),
            paint: None,
        })
        .unwrap();
        let preview = cropped.embedded_image().unwrap();
        assert_eq!((preview.width(), preview.height()), (10, 10));

        let full = Command::with_config(
            DrawCommand::DrawSprite {
                image,
                left: 1,
                top: 2,
                paint: None,
            },
            &CaptureConfig::without_previews(),
        )
        .unwrap();
        let snapshot = full.embedded_image().unwrap();
        assert!(matches!(snapshot, Cow::Owned(_)));
        assert_eq!((snapshot.width(), snapshot.height()), (512, 128));

        let rect = Command::new(DrawCommand::DrawRect {
            rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            paint: Paint::default(),
        })
        .unwrap();
        assert!(rect.embedded_image().is_none());
    }

    #[test]
    fn vertices_and_picture_descriptors() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
        ];
        let mesh = Vertices::new(VertexMode::Triangles, &pts, Some(&pts), None, Some(&[0, 1, 2]))
            .unwrap();
        let command = Command::new(DrawCommand::DrawVertices {
            vertices: mesh,
            paint: Paint::default(),
        })
        .unwrap();
        assert_eq!(
            values(&command)[..5],
            [
                "Mode: Triangles",
                "Vertex Count: 3",
                "Texture Coordinates: True",
                "Colors: False",
                "Index Count: 3"
            ]
        );

        let picture = Picture::new(
            Rect::new(0.0, 0.0, 10.0, 10.0),
            vec![DrawCommand::NoOp, DrawCommand::Restore],
        )
        .unwrap();
        let command = Command::new(DrawCommand::DrawPicture(picture)).unwrap();
        assert_eq!(
            values(&command),
            ["Commands: 2", "Bounds: L: 0, T: 0, R: 10, B: 10"]
        );
        assert_eq!(command.save_depth_delta(), 0);
    }

    #[test]
    fn visibility_does_not_touch_descriptors() {
        let mut command = Command::new(DrawCommand::Scale { sx: 2.0, sy: 3.0 }).unwrap();
        let before = command.describe().to_vec();
        command.set_visible(false);
        assert!(!command.is_visible());
        assert_eq!(command.describe(), &before[..]);
    }
}
