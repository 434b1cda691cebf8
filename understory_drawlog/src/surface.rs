// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawing surface commands are replayed onto.

use kurbo::{Affine, BezPath, Point, Rect, RoundedRect};
use peniko::Color;

use crate::{
    IRect, ImageSnapshot, Paint, Picture, PointMode, Region, RegionOp, SaveFlags, Text, Vertices,
};

/// A 2D drawing target.
///
/// There is one method per command kind. Buffers are borrowed for the duration
/// of the call only; implementations that keep them must copy. Optional
/// arguments are passed as `Option` so an omitted argument is never confused
/// with a zero or identity value.
///
/// Every method reports failure through the surface's own [`Surface::Error`].
/// Callers that replay commands propagate it unchanged.
pub trait Surface {
    /// Error reported when the surface rejects an operation.
    type Error;

    /// Fill the whole surface, ignoring the clip, with `color`.
    fn clear(&mut self, color: Color) -> Result<(), Self::Error>;

    /// Combine the clip with a path.
    fn clip_path(
        &mut self,
        path: &BezPath,
        op: RegionOp,
        anti_alias: bool,
    ) -> Result<(), Self::Error>;

    /// Combine the clip with a device-space region.
    fn clip_region(&mut self, region: &Region, op: RegionOp) -> Result<(), Self::Error>;

    /// Combine the clip with a rectangle.
    fn clip_rect(&mut self, rect: Rect, op: RegionOp, anti_alias: bool)
    -> Result<(), Self::Error>;

    /// Combine the clip with a rounded rectangle.
    fn clip_rrect(
        &mut self,
        rrect: RoundedRect,
        op: RegionOp,
        anti_alias: bool,
    ) -> Result<(), Self::Error>;

    /// Pre-multiply the current transform by `transform`.
    fn concat(&mut self, transform: Affine) -> Result<(), Self::Error>;

    /// Replace the current transform.
    fn set_matrix(&mut self, transform: Affine) -> Result<(), Self::Error>;

    /// Translate the current transform.
    fn translate(&mut self, dx: f64, dy: f64) -> Result<(), Self::Error>;

    /// Scale the current transform.
    fn scale(&mut self, sx: f64, sy: f64) -> Result<(), Self::Error>;

    /// Rotate the current transform by `degrees`, clockwise in y-down space.
    fn rotate(&mut self, degrees: f64) -> Result<(), Self::Error>;

    /// Skew the current transform.
    fn skew(&mut self, sx: f64, sy: f64) -> Result<(), Self::Error>;

    /// Push the state selected by `flags`.
    fn save(&mut self, flags: SaveFlags) -> Result<(), Self::Error>;

    /// Push the state and start an offscreen layer.
    ///
    /// The layer is composited with `paint` (if any) on the matching restore.
    fn save_layer(
        &mut self,
        bounds: Option<Rect>,
        paint: Option<&Paint>,
        flags: SaveFlags,
    ) -> Result<(), Self::Error>;

    /// Pop the most recent save or save-layer.
    fn restore(&mut self) -> Result<(), Self::Error>;

    /// Draw an image with its top-left corner at `(left, top)`.
    fn draw_bitmap(
        &mut self,
        image: &ImageSnapshot,
        left: f64,
        top: f64,
        paint: Option<&Paint>,
    ) -> Result<(), Self::Error>;

    /// Draw an image through an extra transform.
    fn draw_bitmap_matrix(
        &mut self,
        image: &ImageSnapshot,
        matrix: Affine,
        paint: Option<&Paint>,
    ) -> Result<(), Self::Error>;

    /// Draw an image as a nine-patch stretched to `dst`.
    ///
    /// See [`nine_patch`](crate::nine_patch) for the cell layout.
    fn draw_bitmap_nine(
        &mut self,
        image: &ImageSnapshot,
        center: IRect,
        dst: Rect,
        paint: Option<&Paint>,
    ) -> Result<(), Self::Error>;

    /// Draw the `src` part of an image (the whole image if `None`) into `dst`.
    fn draw_bitmap_rect(
        &mut self,
        image: &ImageSnapshot,
        src: Option<Rect>,
        dst: Rect,
        paint: Option<&Paint>,
    ) -> Result<(), Self::Error>;

    /// Draw an image at integer device coordinates, ignoring the transform.
    fn draw_sprite(
        &mut self,
        image: &ImageSnapshot,
        left: i32,
        top: i32,
        paint: Option<&Paint>,
    ) -> Result<(), Self::Error>;

    /// Hand an opaque annotation blob to the surface.
    fn draw_data(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Draw the ellipse inscribed in `oval`.
    fn draw_oval(&mut self, oval: Rect, paint: &Paint) -> Result<(), Self::Error>;

    /// Shade the whole clip with `paint`.
    fn draw_paint(&mut self, paint: &Paint) -> Result<(), Self::Error>;

    /// Draw a path.
    fn draw_path(&mut self, path: &BezPath, paint: &Paint) -> Result<(), Self::Error>;

    /// Draw a nested picture.
    ///
    /// The default saves, plays the picture's commands and restores.
    fn draw_picture(&mut self, picture: &Picture) -> Result<(), Self::Error> {
        self.save(SaveFlags::MATRIX_CLIP)?;
        picture.playback(self)?;
        self.restore()
    }

    /// Draw points, line segments or a polyline depending on `mode`.
    fn draw_points(
        &mut self,
        mode: PointMode,
        points: &[Point],
        paint: &Paint,
    ) -> Result<(), Self::Error>;

    /// Draw text with one position per glyph.
    fn draw_pos_text(
        &mut self,
        text: &Text,
        positions: &[Point],
        paint: &Paint,
    ) -> Result<(), Self::Error>;

    /// Draw text with one x position per glyph on a shared baseline.
    fn draw_pos_text_h(
        &mut self,
        text: &Text,
        xpos: &[f64],
        const_y: f64,
        paint: &Paint,
    ) -> Result<(), Self::Error>;

    /// Draw a rectangle.
    fn draw_rect(&mut self, rect: Rect, paint: &Paint) -> Result<(), Self::Error>;

    /// Draw a rounded rectangle.
    fn draw_rrect(&mut self, rrect: RoundedRect, paint: &Paint) -> Result<(), Self::Error>;

    /// Draw text starting at `(x, y)`.
    fn draw_text(&mut self, text: &Text, x: f64, y: f64, paint: &Paint)
    -> Result<(), Self::Error>;

    /// Draw text along a path, optionally through an extra transform.
    fn draw_text_on_path(
        &mut self,
        text: &Text,
        path: &BezPath,
        matrix: Option<Affine>,
        paint: &Paint,
    ) -> Result<(), Self::Error>;

    /// Draw a triangle mesh.
    fn draw_vertices(&mut self, vertices: &Vertices, paint: &Paint) -> Result<(), Self::Error>;
}
