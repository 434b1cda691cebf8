// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint parameters carried by draw commands.

use kurbo::Stroke;
use peniko::{BlendMode, Brush, Color};

/// Whether a shape is filled, stroked or both.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PaintStyle {
    /// Fill the interior.
    #[default]
    Fill,
    /// Stroke the outline using [`Paint::stroke`].
    Stroke,
    /// Fill the interior, then stroke the outline.
    StrokeAndFill,
}

impl PaintStyle {
    /// Display name of the style.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fill => "Fill",
            Self::Stroke => "Stroke",
            Self::StrokeAndFill => "Stroke And Fill",
        }
    }

    /// Returns `true` if shapes drawn with this style have their interior filled.
    #[inline]
    pub const fn fills(self) -> bool {
        matches!(self, Self::Fill | Self::StrokeAndFill)
    }

    /// Returns `true` if shapes drawn with this style have their outline stroked.
    #[inline]
    pub const fn strokes(self) -> bool {
        matches!(self, Self::Stroke | Self::StrokeAndFill)
    }
}

/// Everything that controls how a draw is shaded.
///
/// A paint is a plain value: commands hold their own copy, so later edits to
/// the caller's paint never reach a recorded command.
#[derive(Clone, Debug, PartialEq)]
pub struct Paint {
    /// Brush used for shading (solid color, gradient or image).
    pub brush: Brush,
    /// Fill/stroke selection.
    pub style: PaintStyle,
    /// Stroke parameters used when [`PaintStyle::strokes`] is true.
    pub stroke: Stroke,
    /// Whether edges are anti-aliased.
    pub anti_alias: bool,
    /// Blend mode used to composite the draw.
    pub blend: BlendMode,
    /// Text size in local units.
    pub text_size: f64,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            brush: Brush::Solid(Color::BLACK),
            style: PaintStyle::Fill,
            stroke: Stroke::default(),
            anti_alias: false,
            blend: BlendMode::default(),
            text_size: 12.0,
        }
    }
}

impl Paint {
    /// A fill paint with a solid color.
    pub fn fill(color: Color) -> Self {
        Self {
            brush: Brush::Solid(color),
            ..Self::default()
        }
    }

    /// A stroke paint with a solid color and stroke width.
    pub fn stroke(color: Color, width: f64) -> Self {
        Self {
            brush: Brush::Solid(color),
            style: PaintStyle::Stroke,
            stroke: Stroke::new(width),
            ..Self::default()
        }
    }

    /// Set the anti-alias flag.
    #[must_use]
    pub fn with_anti_alias(mut self, anti_alias: bool) -> Self {
        self.anti_alias = anti_alias;
        self
    }

    /// Set the blend mode.
    #[must_use]
    pub fn with_blend(mut self, blend: impl Into<BlendMode>) -> Self {
        self.blend = blend.into();
        self
    }

    /// Set the text size.
    #[must_use]
    pub fn with_text_size(mut self, size: f64) -> Self {
        self.text_size = size;
        self
    }

    /// Alpha of a solid brush, or `1.0` for other brushes.
    pub fn opacity(&self) -> f32 {
        match &self.brush {
            Brush::Solid(color) => color.components[3],
            _ => 1.0,
        }
    }
}
