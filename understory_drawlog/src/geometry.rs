// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry value types used by recorded commands.
//!
//! Floating-point geometry is expressed with [`kurbo`] types; this module adds the
//! integer and set-valued shapes a canvas API also accepts (integer rectangles,
//! regions) together with the small enums that qualify clip and point draws.

use alloc::vec::Vec;

use kurbo::{BezPath, Rect};

/// An axis-aligned rectangle with integer edges.
///
/// Used for nine-patch centers, sprite placement and region components.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IRect {
    /// Left edge (inclusive).
    pub left: i32,
    /// Top edge (inclusive).
    pub top: i32,
    /// Right edge (exclusive).
    pub right: i32,
    /// Bottom edge (exclusive).
    pub bottom: i32,
}

impl IRect {
    /// Create a rectangle from its edges.
    #[inline]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rectangle from an origin and a size.
    ///
    /// Edges past the `i32` range are clamped to it.
    #[inline]
    pub const fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x.saturating_add(width), y.saturating_add(height))
    }

    /// Width of the rectangle; negative for inverted rectangles.
    #[inline]
    pub const fn width(self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    /// Height of the rectangle; negative for inverted rectangles.
    #[inline]
    pub const fn height(self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// Intersection of two rectangles; empty rectangles collapse to zero size.
    pub fn intersect(self, other: Self) -> Self {
        let out = Self::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        );
        if out.is_empty() {
            Self::new(out.left, out.top, out.left, out.top)
        } else {
            out
        }
    }

    /// Smallest rectangle containing both inputs. Empty inputs are ignored.
    pub fn union(self, other: Self) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        Self::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Smallest integer rectangle that contains `rect`.
    ///
    /// Coordinates outside the `i32` range saturate.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "float-to-int `as` casts saturate, which is the intended clamping"
    )]
    pub fn round_out(rect: Rect) -> Self {
        let r = rect.abs().expand();
        Self::new(r.x0 as i32, r.y0 as i32, r.x1 as i32, r.y1 as i32)
    }

    /// Convert to a floating-point rectangle.
    #[inline]
    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.left),
            f64::from(self.top),
            f64::from(self.right),
            f64::from(self.bottom),
        )
    }
}

/// A set of pixels described as the union of integer rectangles.
///
/// Empty component rectangles are dropped on construction, so an empty region
/// always has no components.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Region {
    rects: Vec<IRect>,
}

impl Region {
    /// Create an empty region.
    #[inline]
    pub const fn new() -> Self {
        Self { rects: Vec::new() }
    }

    /// Create a region covering a single rectangle.
    pub fn from_rect(rect: IRect) -> Self {
        Self::from_rects([rect])
    }

    /// Create a region covering the union of the given rectangles.
    pub fn from_rects(rects: impl IntoIterator<Item = IRect>) -> Self {
        Self {
            rects: rects.into_iter().filter(|r| !r.is_empty()).collect(),
        }
    }

    /// Component rectangles in insertion order.
    #[inline]
    pub fn rects(&self) -> &[IRect] {
        &self.rects
    }

    /// Returns `true` if the region covers no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Bounding rectangle of every component; zero-sized at the origin when empty.
    pub fn bounds(&self) -> IRect {
        self.rects
            .iter()
            .fold(IRect::default(), |acc, rect| acc.union(*rect))
    }

    /// Path covering the region when filled with the non-zero rule.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for rect in &self.rects {
            let r = rect.to_rect();
            path.move_to((r.x0, r.y0));
            path.line_to((r.x1, r.y0));
            path.line_to((r.x1, r.y1));
            path.line_to((r.x0, r.y1));
            path.close_path();
        }
        path
    }
}

/// How a new clip shape combines with the current clip.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum RegionOp {
    /// Subtract the shape from the current clip.
    Difference,
    /// Keep only the overlap of the shape and the current clip.
    #[default]
    Intersect,
    /// Add the shape to the current clip.
    Union,
    /// Keep pixels in exactly one of the shape and the current clip.
    Xor,
    /// Subtract the current clip from the shape.
    ReverseDifference,
    /// Replace the current clip with the shape.
    Replace,
}

impl RegionOp {
    /// Display name of the operation.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Difference => "Difference",
            Self::Intersect => "Intersect",
            Self::Union => "Union",
            Self::Xor => "XOR",
            Self::ReverseDifference => "Reverse Difference",
            Self::Replace => "Replace",
        }
    }
}

/// How a point list is interpreted by a points draw.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointMode {
    /// Each point is drawn on its own.
    Points,
    /// Consecutive pairs of points are drawn as separate line segments.
    Lines,
    /// The points are joined into one open polyline.
    Polygon,
}

impl PointMode {
    /// Display name of the mode.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Points => "Points",
            Self::Lines => "Lines",
            Self::Polygon => "Polygon",
        }
    }
}

bitflags::bitflags! {
    /// State preserved by a save or save-layer call.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct SaveFlags: u8 {
        /// Restore the transform on the matching restore.
        const MATRIX = 1 << 0;
        /// Restore the clip on the matching restore.
        const CLIP = 1 << 1;
        /// The layer needs an alpha channel.
        const HAS_ALPHA_LAYER = 1 << 2;
        /// The layer needs full color precision.
        const FULL_COLOR_LAYER = 1 << 3;
        /// Clip the layer to its bounds.
        const CLIP_TO_LAYER = 1 << 4;
        /// Transform and clip.
        const MATRIX_CLIP = Self::MATRIX.bits() | Self::CLIP.bits();
        /// Everything a layer save preserves by default.
        const ARGB_CLIP_LAYER = Self::MATRIX_CLIP.bits()
            | Self::HAS_ALPHA_LAYER.bits()
            | Self::FULL_COLOR_LAYER.bits()
            | Self::CLIP_TO_LAYER.bits();
    }
}

impl Default for SaveFlags {
    fn default() -> Self {
        Self::MATRIX_CLIP
    }
}

/// Source and destination rectangles of one cell of a nine-patch draw.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NinePatchCell {
    /// Source rectangle in image pixel coordinates.
    pub src: Rect,
    /// Destination rectangle in local coordinates.
    pub dst: Rect,
}

/// Split a nine-patch draw into its nine cells, row-major from the top left.
///
/// `center` is clamped to the image bounds. The four corners keep their source
/// size unless `dst` is too small to hold them, in which case they shrink
/// proportionally and the stretchable middle row/column collapses. Cells with an
/// empty source or destination are omitted.
pub fn nine_patch(
    image_width: u32,
    image_height: u32,
    center: IRect,
    dst: Rect,
) -> Vec<NinePatchCell> {
    let w = f64::from(image_width);
    let h = f64::from(image_height);
    let c = center.intersect(IRect::new(
        0,
        0,
        i32::try_from(image_width).unwrap_or(i32::MAX),
        i32::try_from(image_height).unwrap_or(i32::MAX),
    ));
    let src_x = [0.0, f64::from(c.left), f64::from(c.right), w];
    let src_y = [0.0, f64::from(c.top), f64::from(c.bottom), h];
    let dst_x = split_axis(dst.x0, dst.x1, src_x);
    let dst_y = split_axis(dst.y0, dst.y1, src_y);

    let mut cells = Vec::with_capacity(9);
    for row in 0..3 {
        for col in 0..3 {
            let src = Rect::new(src_x[col], src_y[row], src_x[col + 1], src_y[row + 1]);
            let dst = Rect::new(dst_x[col], dst_y[row], dst_x[col + 1], dst_y[row + 1]);
            if src.width() > 0.0 && src.height() > 0.0 && dst.width() > 0.0 && dst.height() > 0.0
            {
                cells.push(NinePatchCell { src, dst });
            }
        }
    }
    cells
}

fn split_axis(start: f64, end: f64, src: [f64; 4]) -> [f64; 4] {
    let leading = src[1] - src[0];
    let trailing = src[3] - src[2];
    let available = (end - start).max(0.0);
    let fixed = leading + trailing;
    if fixed > available && fixed > 0.0 {
        let scale = available / fixed;
        let split = start + leading * scale;
        [start, split, split, end]
    } else {
        [start, start + leading, end - trailing, end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn irect_intersect_and_union() {
        let a = IRect::new(0, 0, 10, 10);
        let b = IRect::new(5, 5, 20, 20);
        assert_eq!(a.intersect(b), IRect::new(5, 5, 10, 10));
        assert_eq!(a.union(b), IRect::new(0, 0, 20, 20));
        assert!(a.intersect(IRect::new(30, 30, 40, 40)).is_empty());
        assert_eq!(IRect::default().union(b), b);
    }

    #[test]
    fn extreme_rects_clamp_instead_of_overflowing() {
        let r = IRect::from_xywh(i32::MAX - 1, i32::MIN, 10, -10);
        assert_eq!(r, IRect::new(i32::MAX - 1, i32::MIN, i32::MAX, i32::MIN));
        assert_eq!(r.width(), 1);
        assert_eq!(IRect::new(i32::MIN, 0, i32::MAX, 1).width(), i32::MAX);
    }

    #[test]
    fn round_out_covers_fractional_rect() {
        let r = IRect::round_out(Rect::new(0.5, 1.2, 3.1, 4.0));
        assert_eq!(r, IRect::new(0, 1, 4, 4));
    }

    #[test]
    fn region_drops_empty_components() {
        let region = Region::from_rects([
            IRect::new(0, 0, 4, 4),
            IRect::new(3, 3, 3, 9),
            IRect::new(10, 0, 12, 2),
        ]);
        assert_eq!(region.rects().len(), 2);
        assert_eq!(region.bounds(), IRect::new(0, 0, 12, 4));
        assert!(Region::new().is_empty());
        assert_eq!(Region::new().bounds(), IRect::default());
    }

    #[test]
    fn nine_patch_keeps_corners_at_source_size() {
        let center = IRect::new(10, 10, 20, 20);
        let cells = nine_patch(30, 30, center, Rect::new(0.0, 0.0, 100.0, 50.0));
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0].dst, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(cells[4].src, Rect::new(10.0, 10.0, 20.0, 20.0));
        assert_eq!(cells[4].dst, Rect::new(10.0, 10.0, 90.0, 40.0));
        assert_eq!(cells[8].dst, Rect::new(90.0, 40.0, 100.0, 50.0));
    }

    #[test]
    fn nine_patch_shrinks_corners_when_destination_is_small() {
        let center = IRect::new(10, 10, 20, 20);
        let cells = nine_patch(30, 30, center, Rect::new(0.0, 0.0, 10.0, 10.0));
        // Middle row and column collapse, leaving the four corners.
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0].dst, Rect::new(0.0, 0.0, 5.0, 5.0));
        assert_eq!(cells[3].dst, Rect::new(5.0, 5.0, 10.0, 10.0));
    }
}
