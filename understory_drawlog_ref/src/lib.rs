// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_drawlog_ref --heading-base-level=0

//! Understory Drawlog Reference Surface.
//!
//! This crate provides [`RefSurface`], a small stateful implementation of
//! [`Surface`] for **state tracing**: it applies every call to a model of the
//! canvas state (transform, save stack, clip stack) and logs an [`Event`] with
//! a snapshot of that state.
//!
//! It is not a renderer:
//! - It does **not** rasterize to pixels.
//! - It is meant for tests and for debuggers that want to show the canvas state
//!   at a given step of a replay.
//!
//! ```
//! use understory_drawlog::{Paint, Rect, ReplayTarget, SaveFlags, Surface, record};
//! use understory_drawlog_ref::{Event, RefSurface};
//!
//! let sequence = record(|r| {
//!     r.save(SaveFlags::MATRIX_CLIP)?;
//!     r.translate(10.0, 10.0)?;
//!     r.draw_rect(Rect::new(0.0, 0.0, 5.0, 5.0), &Paint::default())?;
//!     r.restore()
//! })
//! .unwrap();
//!
//! let mut surface = RefSurface::new();
//! sequence.replay(ReplayTarget::All, &mut surface).unwrap();
//! let Event::Draw { state, .. } = &surface.events()[2] else { unreachable!() };
//! assert_eq!(
//!     state.device_bounds(Rect::new(0.0, 0.0, 5.0, 5.0)),
//!     Rect::new(10.0, 10.0, 15.0, 15.0)
//! );
//! ```

#![no_std]

extern crate alloc;

use alloc::vec::Vec;

use understory_drawlog::kurbo::Shape;
use understory_drawlog::{
    Affine, BezPath, Color, CommandKind, DrawCommand, IRect, ImageSnapshot, Paint, Picture,
    Point, PointMode, Rect, Region, RegionOp, RoundedRect, SaveFlags, Surface, Text, Vertices,
};

/// Why the reference surface rejected a call.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RefError {
    /// The call would leave a non-finite value in the current transform.
    #[error("{} would make the transform non-finite", .kind.name())]
    NonFiniteTransform {
        /// Kind of the rejected call.
        kind: CommandKind,
    },
    /// A restore was issued with nothing saved, on a strict surface.
    #[error("restore without a matching save")]
    UnbalancedRestore,
}

/// Shape used by a clip call.
#[derive(Clone, Debug, PartialEq)]
pub enum ClipShape {
    /// Rectangle in local coordinates.
    Rect(Rect),
    /// Rounded rectangle in local coordinates.
    RRect(RoundedRect),
    /// Path in local coordinates.
    Path(BezPath),
    /// Region in device coordinates.
    Region(Region),
}

impl ClipShape {
    fn local_bounds(&self) -> Rect {
        match self {
            Self::Rect(r) => *r,
            Self::RRect(r) => r.rect(),
            Self::Path(p) => p.bounding_box(),
            Self::Region(r) => r.bounds().to_rect(),
        }
    }
}

/// One entry of the clip stack.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipEntry {
    /// Clip shape.
    pub shape: ClipShape,
    /// How the shape combines with the clip so far.
    pub op: RegionOp,
    /// Whether edges were requested anti-aliased.
    pub anti_alias: bool,
    /// Transform in effect when the clip was applied.
    pub transform: Affine,
}

impl ClipEntry {
    /// Device-space bounding box of the clip shape.
    pub fn device_bounds(&self) -> Rect {
        match &self.shape {
            ClipShape::Region(r) => r.bounds().to_rect(),
            shape => self.transform.transform_rect_bbox(shape.local_bounds()),
        }
    }
}

/// Snapshot of the canvas state inside the surface.
#[derive(Clone, Debug, PartialEq)]
pub struct StateSnapshot {
    /// Current transform.
    pub transform: Affine,
    /// Number of saves (including layers) not yet restored.
    pub save_depth: u32,
    /// Number of open layers.
    pub layer_depth: u32,
    /// Clip calls in effect, oldest first.
    pub clips: Vec<ClipEntry>,
}

impl Default for StateSnapshot {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            save_depth: 0,
            layer_depth: 0,
            clips: Vec::new(),
        }
    }
}

impl StateSnapshot {
    /// Device-space bounding box of a local rectangle under the current transform.
    pub fn device_bounds(&self, rect: Rect) -> Rect {
        self.transform.transform_rect_bbox(rect)
    }

    /// Conservative device-space bounds of the clip, or `None` when unbounded.
    ///
    /// Combining ops other than intersect and replace can only grow the
    /// bounds (or, for difference, leave them unchanged).
    pub fn clip_bounds(&self) -> Option<Rect> {
        let mut bounds: Option<Rect> = None;
        for clip in &self.clips {
            let shape = clip.device_bounds();
            bounds = match clip.op {
                RegionOp::Intersect => Some(bounds.map_or(shape, |b| b.intersect(shape))),
                RegionOp::Replace => Some(shape),
                RegionOp::Difference => bounds,
                RegionOp::Union | RegionOp::Xor | RegionOp::ReverseDifference => {
                    bounds.map(|b| b.union(shape))
                }
            };
        }
        bounds
    }
}

/// Event logged by the reference surface.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A state-changing call and the resulting state.
    State {
        /// Call that was applied.
        op: DrawCommand,
        /// Snapshot after applying it.
        state: StateSnapshot,
    },
    /// A drawing call and the state it drew with.
    Draw {
        /// Call that was applied.
        op: DrawCommand,
        /// Snapshot at the time of drawing.
        state: StateSnapshot,
    },
}

impl Event {
    /// The call this event logs.
    pub fn op(&self) -> &DrawCommand {
        match self {
            Self::State { op, .. } | Self::Draw { op, .. } => op,
        }
    }

    /// The state snapshot logged with the call.
    pub fn state(&self) -> &StateSnapshot {
        match self {
            Self::State { state, .. } | Self::Draw { state, .. } => state,
        }
    }
}

#[derive(Clone, Debug)]
struct Frame {
    flags: SaveFlags,
    layer: bool,
    transform: Affine,
    clip_len: usize,
}

/// Simple reference implementation of [`Surface`].
///
/// This surface:
/// - Tracks the transform, save stack and clip stack,
/// - Restores only the parts of the state selected by each save's flags,
/// - Rejects calls that would make the transform non-finite,
/// - Logs an [`Event`] for every accepted call.
#[derive(Default, Debug)]
pub struct RefSurface {
    events: Vec<Event>,
    state: StateSnapshot,
    frames: Vec<Frame>,
    strict: bool,
}

impl RefSurface {
    /// A surface that ignores a restore with nothing saved, like a canvas does.
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface that rejects a restore with nothing saved.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    /// Returns a slice of logged events.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Current state.
    pub fn state(&self) -> &StateSnapshot {
        &self.state
    }

    /// Clears logged events but keeps the current state.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    fn apply(&mut self, op: DrawCommand) -> Result<(), RefError> {
        let kind = op.kind();
        let state_change = match &op {
            DrawCommand::Concat(m) => {
                self.set_transform(kind, self.state.transform * *m)?;
                true
            }
            DrawCommand::SetMatrix(m) => {
                self.set_transform(kind, *m)?;
                true
            }
            DrawCommand::Translate { dx, dy } => {
                let m = self.state.transform * Affine::translate((*dx, *dy));
                self.set_transform(kind, m)?;
                true
            }
            DrawCommand::Scale { sx, sy } => {
                let m = self.state.transform * Affine::scale_non_uniform(*sx, *sy);
                self.set_transform(kind, m)?;
                true
            }
            DrawCommand::Rotate { degrees } => {
                let m = self.state.transform * Affine::rotate(degrees.to_radians());
                self.set_transform(kind, m)?;
                true
            }
            DrawCommand::Skew { sx, sy } => {
                let m = self.state.transform * Affine::skew(*sx, *sy);
                self.set_transform(kind, m)?;
                true
            }
            DrawCommand::Save { flags } => {
                self.push_frame(*flags, false);
                true
            }
            DrawCommand::SaveLayer { flags, .. } => {
                self.push_frame(*flags, true);
                true
            }
            DrawCommand::Restore => {
                self.pop_frame()?;
                true
            }
            DrawCommand::ClipPath {
                path,
                op,
                anti_alias,
            } => {
                self.push_clip(ClipShape::Path(path.clone()), *op, *anti_alias);
                true
            }
            DrawCommand::ClipRect {
                rect,
                op,
                anti_alias,
            } => {
                self.push_clip(ClipShape::Rect(*rect), *op, *anti_alias);
                true
            }
            DrawCommand::ClipRRect {
                rrect,
                op,
                anti_alias,
            } => {
                self.push_clip(ClipShape::RRect(*rrect), *op, *anti_alias);
                true
            }
            DrawCommand::ClipRegion { region, op } => {
                self.push_clip(ClipShape::Region(region.clone()), *op, false);
                true
            }
            _ => false,
        };
        let state = self.state.clone();
        self.events.push(if state_change {
            Event::State { op, state }
        } else {
            Event::Draw { op, state }
        });
        Ok(())
    }

    fn set_transform(&mut self, kind: CommandKind, transform: Affine) -> Result<(), RefError> {
        if !transform.as_coeffs().iter().all(|c| c.is_finite()) {
            return Err(RefError::NonFiniteTransform { kind });
        }
        self.state.transform = transform;
        Ok(())
    }

    fn push_frame(&mut self, flags: SaveFlags, layer: bool) {
        self.frames.push(Frame {
            flags,
            layer,
            transform: self.state.transform,
            clip_len: self.state.clips.len(),
        });
        self.state.save_depth += 1;
        if layer {
            self.state.layer_depth += 1;
        }
    }

    fn pop_frame(&mut self) -> Result<(), RefError> {
        let Some(frame) = self.frames.pop() else {
            if self.strict {
                return Err(RefError::UnbalancedRestore);
            }
            tracing::debug!("restore with nothing saved ignored");
            return Ok(());
        };
        if frame.flags.contains(SaveFlags::MATRIX) {
            self.state.transform = frame.transform;
        }
        if frame.flags.contains(SaveFlags::CLIP) {
            self.state.clips.truncate(frame.clip_len);
        }
        self.state.save_depth -= 1;
        if frame.layer {
            self.state.layer_depth -= 1;
        }
        Ok(())
    }

    fn push_clip(&mut self, shape: ClipShape, op: RegionOp, anti_alias: bool) {
        self.state.clips.push(ClipEntry {
            shape,
            op,
            anti_alias,
            transform: self.state.transform,
        });
    }
}

impl Surface for RefSurface {
    type Error = RefError;

    fn clear(&mut self, color: Color) -> Result<(), RefError> {
        self.apply(DrawCommand::Clear { color })
    }

    fn clip_path(
        &mut self,
        path: &BezPath,
        op: RegionOp,
        anti_alias: bool,
    ) -> Result<(), RefError> {
        self.apply(DrawCommand::ClipPath {
            path: path.clone(),
            op,
            anti_alias,
        })
    }

    fn clip_region(&mut self, region: &Region, op: RegionOp) -> Result<(), RefError> {
        self.apply(DrawCommand::ClipRegion {
            region: region.clone(),
            op,
        })
    }

    fn clip_rect(&mut self, rect: Rect, op: RegionOp, anti_alias: bool) -> Result<(), RefError> {
        self.apply(DrawCommand::ClipRect {
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
    ) -> Result<(), RefError> {
        self.apply(DrawCommand::ClipRRect {
            rrect,
            op,
            anti_alias,
        })
    }

    fn concat(&mut self, transform: Affine) -> Result<(), RefError> {
        self.apply(DrawCommand::Concat(transform))
    }

    fn set_matrix(&mut self, transform: Affine) -> Result<(), RefError> {
        self.apply(DrawCommand::SetMatrix(transform))
    }

    fn translate(&mut self, dx: f64, dy: f64) -> Result<(), RefError> {
        self.apply(DrawCommand::Translate { dx, dy })
    }

    fn scale(&mut self, sx: f64, sy: f64) -> Result<(), RefError> {
        self.apply(DrawCommand::Scale { sx, sy })
    }

    fn rotate(&mut self, degrees: f64) -> Result<(), RefError> {
        self.apply(DrawCommand::Rotate { degrees })
    }

    fn skew(&mut self, sx: f64, sy: f64) -> Result<(), RefError> {
        self.apply(DrawCommand::Skew { sx, sy })
    }

    fn save(&mut self, flags: SaveFlags) -> Result<(), RefError> {
        self.apply(DrawCommand::Save { flags })
    }

    fn save_layer(
        &mut self,
        bounds: Option<Rect>,
        paint: Option<&Paint>,
        flags: SaveFlags,
    ) -> Result<(), RefError> {
        self.apply(DrawCommand::SaveLayer {
            bounds,
            paint: paint.cloned(),
            flags,
        })
    }

    fn restore(&mut self) -> Result<(), RefError> {
        self.apply(DrawCommand::Restore)
    }

    fn draw_bitmap(
        &mut self,
        image: &ImageSnapshot,
        left: f64,
        top: f64,
        paint: Option<&Paint>,
    ) -> Result<(), RefError> {
        self.apply(DrawCommand::DrawBitmap {
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
    ) -> Result<(), RefError> {
        self.apply(DrawCommand::DrawBitmapMatrix {
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
    ) -> Result<(), RefError> {
        self.apply(DrawCommand::DrawBitmapNine {
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
    ) -> Result<(), RefError> {
        self.apply(DrawCommand::DrawBitmapRect {
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
    ) -> Result<(), RefError> {
        self.apply(DrawCommand::DrawSprite {
            image: image.clone(),
            left,
            top,
            paint: paint.cloned(),
        })
    }

    fn draw_data(&mut self, data: &[u8]) -> Result<(), RefError> {
        self.apply(DrawCommand::DrawData(data.into()))
    }

    fn draw_oval(&mut self, oval: Rect, paint: &Paint) -> Result<(), RefError> {
        self.apply(DrawCommand::DrawOval {
            oval,
            paint: paint.clone(),
        })
    }

    fn draw_paint(&mut self, paint: &Paint) -> Result<(), RefError> {
        self.apply(DrawCommand::DrawPaint(paint.clone()))
    }

    fn draw_path(&mut self, path: &BezPath, paint: &Paint) -> Result<(), RefError> {
        self.apply(DrawCommand::DrawPath {
            path: path.clone(),
            paint: paint.clone(),
        })
    }

    fn draw_picture(&mut self, picture: &Picture) -> Result<(), RefError> {
        self.apply(DrawCommand::DrawPicture(picture.clone()))?;
        self.save(SaveFlags::MATRIX_CLIP)?;
        picture.playback(self)?;
        self.restore()
    }

    fn draw_points(
        &mut self,
        mode: PointMode,
        points: &[Point],
        paint: &Paint,
    ) -> Result<(), RefError> {
        self.apply(DrawCommand::DrawPoints {
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
    ) -> Result<(), RefError> {
        self.apply(DrawCommand::DrawPosText {
            text: text.clone(),
            positions: positions.into(),
            paint: paint.clone(),
        })
    }

    fn draw_pos_text_h(
        &mut self,
        text: &Text,
        xpos: &[f64],
        const_y: f64,
        paint: &Paint,
    ) -> Result<(), RefError> {
        self.apply(DrawCommand::DrawPosTextH {
            text: text.clone(),
            xpos: xpos.into(),
            const_y,
            paint: paint.clone(),
        })
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) -> Result<(), RefError> {
        self.apply(DrawCommand::DrawRect {
            rect,
            paint: paint.clone(),
        })
    }

    fn draw_rrect(&mut self, rrect: RoundedRect, paint: &Paint) -> Result<(), RefError> {
        self.apply(DrawCommand::DrawRRect {
            rrect,
            paint: paint.clone(),
        })
    }

    fn draw_text(&mut self, text: &Text, x: f64, y: f64, paint: &Paint) -> Result<(), RefError> {
        self.apply(DrawCommand::DrawText {
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
    ) -> Result<(), RefError> {
        self.apply(DrawCommand::DrawTextOnPath {
            text: text.clone(),
            path: path.clone(),
            matrix,
            paint: paint.clone(),
        })
    }

    fn draw_vertices(&mut self, vertices: &Vertices, paint: &Paint) -> Result<(), RefError> {
        self.apply(DrawCommand::DrawVertices {
            vertices: vertices.clone(),
            paint: paint.clone(),
        })
    }
}
