// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capturing drawing calls as they are made.

use kurbo::{Affine, BezPath, Point, Rect, RoundedRect};
use peniko::Color;

use crate::{
    CaptureConfig, CaptureError, CommandSequence, DrawCommand, IRect, ImageSnapshot, Paint,
    Picture, PointMode, Region, RegionOp, SaveFlags, Surface, Text, Vertices,
};

/// A [`Surface`] that draws nothing and instead appends one command per call.
///
/// Every borrowed argument is copied before the call returns, so callers may
/// reuse or drop their buffers immediately.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    sequence: CommandSequence,
}

impl Recorder {
    /// A recorder with the default [`CaptureConfig`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder that captures with `config`.
    pub fn with_config(config: CaptureConfig) -> Self {
        Self {
            sequence: CommandSequence::with_config(config),
        }
    }

    /// Commands captured so far.
    #[inline]
    pub fn sequence(&self) -> &CommandSequence {
        &self.sequence
    }

    /// Finish recording.
    pub fn into_sequence(self) -> CommandSequence {
        self.sequence
    }

    fn append(&mut self, op: DrawCommand) -> Result<(), CaptureError> {
        self.sequence.append(op).map(|_| ())
    }
}

/// Record the calls `f` makes into a new sequence.
///
/// ```
/// use understory_drawlog::{Paint, Rect, SaveFlags, Surface, record};
///
/// let sequence = record(|r| {
///     r.save(SaveFlags::MATRIX_CLIP)?;
///     r.translate(10.0, 10.0)?;
///     r.draw_rect(Rect::new(0.0, 0.0, 5.0, 5.0), &Paint::default())?;
///     r.restore()
/// })
/// .unwrap();
/// assert_eq!(sequence.len(), 4);
/// assert!(sequence.recorded_depth().is_balanced());
/// ```
pub fn record(
    f: impl FnOnce(&mut Recorder) -> Result<(), CaptureError>,
) -> Result<CommandSequence, CaptureError> {
    let mut recorder = Recorder::new();
    f(&mut recorder)?;
    Ok(recorder.into_sequence())
}

impl Surface for Recorder {
    type Error = CaptureError;

    fn clear(&mut self, color: Color) -> Result<(), CaptureError> {
        self.append(DrawCommand::Clear { color })
    }

    fn clip_path(
        &mut self,
        path: &BezPath,
        op: RegionOp,
        anti_alias: bool,
    ) -> Result<(), CaptureError> {
        self.append(DrawCommand::ClipPath {
            path: path.clone(),
            op,
            anti_alias,
        })
    }

    fn clip_region(&mut self, region: &Region, op: RegionOp) -> Result<(), CaptureError> {
        self.append(DrawCommand::ClipRegion {
            region: region.clone(),
            op,
        })
    }

    fn clip_rect(
        &mut self,
        rect: Rect,
        op: RegionOp,
        anti_alias: bool,
    ) -> Result<(), CaptureError> {
        self.append(DrawCommand::ClipRect {
            rect,
            op,
            anti_alias,
        })
    }

    fn clip_rrect(
        &mut self,
        rrect: RoundedRect,
        op: RegionOp,
        anti_alias: bool,
    ) -> Result<(), CaptureError> {
        self.append(DrawCommand::ClipRRect {
            rrect,
            op,
            anti_alias,
        })
    }

    fn concat(&mut self, transform: Affine) -> Result<(), CaptureError> {
        self.append(DrawCommand::Concat(transform))
    }

    fn set_matrix(&mut self, transform: Affine) -> Result<(), CaptureError> {
        self.append(DrawCommand::SetMatrix(transform))
    }

    fn translate(&mut self, dx: f64, dy: f64) -> Result<(), CaptureError> {
        self.append(DrawCommand::Translate { dx, dy })
    }

    fn scale(&mut self, sx: f64, sy: f64) -> Result<(), CaptureError> {
        self.append(DrawCommand::Scale { sx, sy })
    }

    fn rotate(&mut self, degrees: f64) -> Result<(), CaptureError> {
        self.append(DrawCommand::Rotate { degrees })
    }

    fn skew(&mut self, sx: f64, sy: f64) -> Result<(), CaptureError> {
        self.append(DrawCommand::Skew { sx, sy })
    }

    fn save(&mut self, flags: SaveFlags) -> Result<(), CaptureError> {
        self.append(DrawCommand::Save { flags })
    }

    fn save_layer(
        &mut self,
        bounds: Option<Rect>,
        paint: Option<&Paint>,
        flags: SaveFlags,
    ) -> Result<(), CaptureError> {
        self.append(DrawCommand::SaveLayer {
            bounds,
            paint: paint.cloned(),
            flags,
        })
    }

    fn restore(&mut self) -> Result<(), CaptureError> {
        self.append(DrawCommand::Restore)
    }

    fn draw_bitmap(
        &mut self,
        image: &ImageSnapshot,
        left: f64,
        top: f64,
        paint: Option<&Paint>,
    ) -> Result<(), CaptureError> {
        self.append(DrawCommand::DrawBitmap {
            image: image.clone(),
            left,
            top,
            paint: paint.cloned(),
        })
    }

    fn draw_bitmap_matrix(
        &mut self,
        image: &ImageSnapshot,
        matrix: Affine,
        paint: Option<&Paint>,
    ) -> Result<(), CaptureError> {
        self.append(DrawCommand::DrawBitmapMatrix {
            image: image.clone(),
            matrix,
            paint: paint.cloned(),
        })
    }

    fn draw_bitmap_nine(
        &mut self,
        image: &ImageSnapshot,
        center: IRect,
        dst: Rect,
        paint: Option<&Paint>,
    ) -> Result<(), CaptureError> {
        self.append(DrawCommand::DrawBitmapNine {
            image: image.clone(),
            center,
            dst,
            paint: paint.cloned(),
        })
    }

    fn draw_bitmap_rect(
        &mut self,
        image: &ImageSnapshot,
        src: Option<Rect>,
        dst: Rect,
        paint: Option<&Paint>,
    ) -> Result<(), CaptureError> {
        self.append(DrawCommand::DrawBitmapRect {
            image: image.clone(),
            src,
            dst,
            paint: paint.cloned(),
        })
    }

    fn draw_sprite(
        &mut self,
        image: &ImageSnapshot,
        left: i32,
        top: i32,
        paint: Option<&Paint>,
    ) -> Result<(), CaptureError> {
        self.append(DrawCommand::DrawSprite {
            image: image.clone(),
            left,
            top,
            paint: paint.cloned(),
        })
    }

    fn draw_data(&mut self, data: &[u8]) -> Result<(), CaptureError> {
        self.append(DrawCommand::DrawData(data.into()))
    }

    fn draw_oval(&mut self, oval: Rect, paint: &Paint) -> Result<(), CaptureError> {
        self.append(DrawCommand::DrawOval {
            oval,
            paint: paint.clone(),
        })
    }

    fn draw_paint(&mut self, paint: &Paint) -> Result<(), CaptureError> {
        self.append(DrawCommand::DrawPaint(paint.clone()))
    }

    fn draw_path(&mut self, path: &BezPath, paint: &Paint) -> Result<(), CaptureError> {
        self.append(DrawCommand::DrawPath {
            path: path.clone(),
            paint: paint.clone(),
        })
    }

    fn draw_picture(&mut self, picture: &Picture) -> Result<(), CaptureError> {
        self.append(DrawCommand::DrawPicture(picture.clone()))
    }

    fn draw_points(
        &mut self,
        mode: PointMode,
        points: &[Point],
        paint: &Paint,
    ) -> Result<(), CaptureError> {
        self.append(DrawCommand::DrawPoints {
            mode,
            points: points.into(),
            paint: paint.clone(),
        })
    }

    fn draw_pos_text(
        &mut self,
        text: &Text,
        positions: &[Point],
        paint: &Paint,
    ) -> Result<(), CaptureError> {
        let glyphs = text.glyph_count();
        self.append(DrawCommand::DrawPosText {
            text: text.clone(),
            positions: positions.get(..glyphs).unwrap_or(positions).into(),
            paint: paint.clone(),
        })
    }

    fn draw_pos_text_h(
        &mut self,
        text: &Text,
        xpos: &[f64],
        const_y: f64,
        paint: &Paint,
    ) -> Result<(), CaptureError> {
        let glyphs = text.glyph_count();
        self.append(DrawCommand::DrawPosTextH {
            text: text.clone(),
            xpos: xpos.get(..glyphs).unwrap_or(xpos).into(),
            const_y,
            paint: paint.clone(),
        })
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) -> Result<(), CaptureError> {
        self.append(DrawCommand::DrawRect {
            rect,
            paint: paint.clone(),
        })
    }

    fn draw_rrect(&mut self, rrect: RoundedRect, paint: &Paint) -> Result<(), CaptureError> {
        self.append(DrawCommand::DrawRRect {
            rrect,
            paint: paint.clone(),
        })
    }

    fn draw_text(
        &mut self,
        text: &Text,
        x: f64,
        y: f64,
        paint: &Paint,
    ) -> Result<(), CaptureError> {
        self.append(DrawCommand::DrawText {
            text: text.clone(),
            x,
            y,
            paint: paint.clone(),
        })
    }

    fn draw_text_on_path(
        &mut self,
        text: &Text,
        path: &BezPath,
        matrix: Option<Affine>,
        paint: &Paint,
    ) -> Result<(), CaptureError> {
        self.append(DrawCommand::DrawTextOnPath {
            text: text.clone(),
            path: path.clone(),
            matrix,
            paint: paint.clone(),
        })
    }

    fn draw_vertices(&mut self, vertices: &Vertices, paint: &Paint) -> Result<(), CaptureError> {
        self.append(DrawCommand::DrawVertices {
            vertices: vertices.clone(),
            paint: paint.clone(),
        })
    }
}
