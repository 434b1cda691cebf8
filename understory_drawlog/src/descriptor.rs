// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable parameter descriptors.
//!
//! A [`Descriptor`] pairs a label with a formatted value. The free functions in
//! this module are the formatters: each turns one kind of value into a display
//! string and holds no state, so they can be used directly by tools that want
//! to format values outside of a command.

use alloc::format;
use alloc::string::{String, ToString};
use core::fmt::{self, Write as _};

use kurbo::{Affine, BezPath, PathEl, Point, Rect, RoundedRect};
use peniko::{BlendMode, Brush, Color};

use crate::{
    IRect, ImageSnapshot, Paint, Picture, PointMode, Region, RegionOp, SaveFlags, Text, Vertices,
};

/// One labelled, preformatted parameter of a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Descriptor {
    label: Option<&'static str>,
    value: String,
}

impl Descriptor {
    /// A labelled value.
    pub fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label: Some(label),
            value: value.into(),
        }
    }

    /// A free-standing note with no label.
    pub fn note(value: impl Into<String>) -> Self {
        Self {
            label: None,
            value: value.into(),
        }
    }

    /// Label, or `None` for notes.
    #[inline]
    pub fn label(&self) -> Option<&'static str> {
        self.label
    }

    /// Formatted value.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label {
            Some(label) => write!(f, "{label}: {}", self.value),
            None => f.write_str(&self.value),
        }
    }
}

/// Format a scalar exactly, with no trailing zeros (`10`, `0.5`, `0.00001`).
pub fn scalar(v: f64) -> String {
    if v == 0.0 {
        return "0".into();
    }
    format!("{v}")
}

/// Format an integer.
pub fn int(v: i64) -> String {
    v.to_string()
}

/// Format an element count.
pub fn count(n: usize) -> String {
    n.to_string()
}

/// Format a flag as `True` or `False`.
pub fn boolean(v: bool) -> String {
    if v { "True" } else { "False" }.into()
}

/// Format a point as `(x, y)`.
pub fn point(p: Point) -> String {
    format!("({}, {})", scalar(p.x), scalar(p.y))
}

/// Format a point list, comma separated. An empty list formats as `(none)`.
pub fn points(pts: &[Point]) -> String {
    if pts.is_empty() {
        return "(none)".into();
    }
    join(pts.iter().map(|&p| point(p)))
}

/// Format a list of scalars, comma separated.
pub fn scalars(values: &[f64]) -> String {
    if values.is_empty() {
        return "(none)".into();
    }
    join(values.iter().map(|&v| scalar(v)))
}

/// Format an affine transform as its 3x3 matrix, row by row.
pub fn matrix(m: Affine) -> String {
    let [a, b, c, d, e, f] = m.as_coeffs();
    format!(
        "[{} {} {}; {} {} {}; 0 0 1]",
        scalar(a),
        scalar(c),
        scalar(e),
        scalar(b),
        scalar(d),
        scalar(f)
    )
}

/// Format a rectangle by its edges.
pub fn rect(r: Rect) -> String {
    format!(
        "L: {}, T: {}, R: {}, B: {}",
        scalar(r.x0),
        scalar(r.y0),
        scalar(r.x1),
        scalar(r.y1)
    )
}

/// Format an integer rectangle by its edges.
pub fn irect(r: IRect) -> String {
    format!("L: {}, T: {}, R: {}, B: {}", r.left, r.top, r.right, r.bottom)
}

/// Format a rounded rectangle as its rectangle plus corner radii.
pub fn rrect(r: RoundedRect) -> String {
    let radii = r.radii();
    let corners = [
        radii.top_left,
        radii.top_right,
        radii.bottom_right,
        radii.bottom_left,
    ];
    let mut out = rect(r.rect());
    out.push_str(", Radii: ");
    if corners.iter().all(|&c| c == corners[0]) {
        out.push_str(&scalar(corners[0]));
    } else {
        out.push_str(&join(corners.iter().map(|&c| scalar(c))));
    }
    out
}

/// Format a region as its bounds and rectangle count.
pub fn region(r: &Region) -> String {
    if r.is_empty() {
        return "(empty)".into();
    }
    let count = r.rects().len();
    format!(
        "{}, {count} rect{}",
        irect(r.bounds()),
        if count == 1 { "" } else { "s" }
    )
}

/// Format a clip combine mode.
pub fn region_op(op: RegionOp) -> String {
    op.name().into()
}

/// Format a point-drawing mode.
pub fn point_mode(mode: PointMode) -> String {
    mode.name().into()
}

/// Format save flags as a `|`-separated list of names.
pub fn save_flags(flags: SaveFlags) -> String {
    if flags.is_empty() {
        return "None".into();
    }
    let names = [
        (SaveFlags::MATRIX, "Matrix"),
        (SaveFlags::CLIP, "Clip"),
        (SaveFlags::HAS_ALPHA_LAYER, "Has Alpha Layer"),
        (SaveFlags::FULL_COLOR_LAYER, "Full Color Layer"),
        (SaveFlags::CLIP_TO_LAYER, "Clip To Layer"),
    ];
    let mut out = String::new();
    for (flag, name) in names {
        if flags.contains(flag) {
            if !out.is_empty() {
                out.push_str(" | ");
            }
            out.push_str(name);
        }
    }
    out
}

/// Format a path as SVG-style path data.
pub fn path(p: &BezPath) -> String {
    if p.elements().is_empty() {
        return "(empty)".into();
    }
    let mut out = String::new();
    for el in p.elements() {
        if !out.is_empty() {
            out.push(' ');
        }
        match *el {
            PathEl::MoveTo(a) => {
                let _ = write!(out, "M{} {}", scalar(a.x), scalar(a.y));
            }
            PathEl::LineTo(a) => {
                let _ = write!(out, "L{} {}", scalar(a.x), scalar(a.y));
            }
            PathEl::QuadTo(a, b) => {
                let _ = write!(
                    out,
                    "Q{} {} {} {}",
                    scalar(a.x),
                    scalar(a.y),
                    scalar(b.x),
                    scalar(b.y)
                );
            }
            PathEl::CurveTo(a, b, c) => {
                let _ = write!(
                    out,
                    "C{} {} {} {} {} {}",
                    scalar(a.x),
                    scalar(a.y),
                    scalar(b.x),
                    scalar(b.y),
                    scalar(c.x),
                    scalar(c.y)
                );
            }
            PathEl::ClosePath => out.push('Z'),
        }
    }
    out
}

/// Format a color as `#rrggbbaa`.
pub fn color(c: Color) -> String {
    let rgba = c.to_rgba8();
    format!("#{:02x}{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b, rgba.a)
}

/// Format a blend mode as `mix/compose`.
pub fn blend(mode: BlendMode) -> String {
    format!("{:?}/{:?}", mode.mix, mode.compose)
}

/// Format the parts of a paint that affect how a draw looks.
pub fn paint(p: &Paint) -> String {
    let brush = match &p.brush {
        Brush::Solid(c) => color(*c),
        Brush::Gradient(_) => "Gradient".into(),
        Brush::Image(image) => format!("Image {}x{}", image.image.width, image.image.height),
    };
    let mut out = format!("{}, {brush}", p.style.name());
    if p.style.strokes() {
        let _ = write!(out, ", Width: {}", scalar(p.stroke.width));
    }
    let _ = write!(
        out,
        ", AA: {}, Blend: {}",
        boolean(p.anti_alias),
        blend(p.blend)
    );
    out
}

/// Format text as its encoding plus a display-safe preview.
pub fn text(t: &Text) -> String {
    format!("{}: \"{}\"", t.encoding().name(), t.preview())
}

/// Summarize an image by size and pixel layout.
pub fn image(img: &ImageSnapshot) -> String {
    format!(
        "{}x{} {:?} {:?}",
        img.width(),
        img.height(),
        img.format(),
        img.alpha_type()
    )
}

/// Note the presence and length of an opaque blob.
///
/// The contents are never interpreted.
pub fn data(bytes: &[u8]) -> String {
    format!("{} bytes", bytes.len())
}

/// Summarize a nested picture by command count and cull bounds.
pub fn picture(p: &Picture) -> String {
    format!("{} commands, {}", p.len(), rect(p.bounds()))
}

/// Summarize a mesh in one line.
pub fn vertices(v: &Vertices) -> String {
    format!("{}, {} vertices", v.mode().name(), v.positions().len())
}

fn join(parts: impl Iterator<Item = String>) -> String {
    let mut out = String::new();
    for part in parts {
        if !out.is_empty() {
            out.push_str(", ");
        }
        out.push_str(&part);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TextEncoding;

    #[test]
    fn scalars_drop_trailing_zeros() {
        assert_eq!(scalar(10.0), "10");
        assert_eq!(scalar(0.5), "0.5");
        assert_eq!(scalar(-1.25), "-1.25");
        assert_eq!(scalar(-0.0), "0");
        assert_eq!(scalar(1.0 / 3.0), "0.3333333333333333");
        assert_eq!(scalar(1e-5), "0.00001");
        assert_eq!(scalar(-0.00004), "-0.00004");
        assert_eq!(scalars(&[1.0, 2.5]), "1, 2.5");
    }

    #[test]
    fn matrix_is_row_major() {
        let m = Affine::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(matrix(m), "[1 3 5; 2 4 6; 0 0 1]");
        assert_eq!(
            matrix(Affine::translate((10.0, 10.0))),
            "[1 0 10; 0 1 10; 0 0 1]"
        );
    }

    #[test]
    fn rects_and_regions() {
        assert_eq!(
            rect(Rect::new(0.0, 0.0, 5.0, 5.0)),
            "L: 0, T: 0, R: 5, B: 5"
        );
        assert_eq!(
            rrect(RoundedRect::new(0.0, 0.0, 4.0, 4.0, 1.0)),
            "L: 0, T: 0, R: 4, B: 4, Radii: 1"
        );
        let region = Region::from_rects([IRect::new(0, 0, 2, 2), IRect::new(4, 4, 6, 6)]);
        assert_eq!(super::region(&region), "L: 0, T: 0, R: 6, B: 6, 2 rects");
        assert_eq!(super::region(&Region::new()), "(empty)");
    }

    #[test]
    fn points_and_flags() {
        assert_eq!(points(&[]), "(none)");
        assert_eq!(
            points(&[Point::new(1.0, 2.0), Point::new(3.5, 4.0)]),
            "(1, 2), (3.5, 4)"
        );
        assert_eq!(save_flags(SaveFlags::MATRIX_CLIP), "Matrix | Clip");
        assert_eq!(save_flags(SaveFlags::empty()), "None");
    }

    #[test]
    fn path_data() {
        let mut p = BezPath::new();
        p.move_to((0.0, 0.0));
        p.line_to((5.0, 0.0));
        p.quad_to((5.0, 5.0), (0.0, 5.0));
        p.close_path();
        assert_eq!(path(&p), "M0 0 L5 0 Q5 5 0 5 Z");
        assert_eq!(path(&BezPath::new()), "(empty)");
    }

    #[test]
    fn paints_and_colors() {
        assert_eq!(color(Color::from_rgba8(255, 0, 0, 255)), "#ff0000ff");
        let p = Paint::stroke(Color::from_rgba8(0, 0, 255, 128), 2.0).with_anti_alias(true);
        assert_eq!(
            paint(&p),
            "Stroke, #0000ff80, Width: 2, AA: True, Blend: Normal/SrcOver"
        );
    }

    #[test]
    fn text_shows_encoding() {
        let t = Text::new(b"hi\t", TextEncoding::Utf8).unwrap();
        assert_eq!(text(&t), "UTF-8: \"hi\\t\"");
        assert_eq!(data(&[1, 2, 3]), "3 bytes");
    }

    #[test]
    fn descriptor_display() {
        assert_eq!(Descriptor::new("Rotate", "45").to_string(), "Rotate: 45");
        assert_eq!(
            Descriptor::note("No Parameters").to_string(),
            "No Parameters"
        );
    }
}
