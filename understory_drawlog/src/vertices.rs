// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Triangle mesh payloads.

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::Point;
use peniko::{BlendMode, Color};

use crate::CaptureError;

/// How a vertex list is assembled into triangles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VertexMode {
    /// Every three vertices form a triangle.
    Triangles,
    /// Every vertex after the second forms a triangle with the two before it.
    TriangleStrip,
    /// Every vertex after the second forms a triangle with the previous vertex and the first.
    TriangleFan,
}

impl VertexMode {
    /// Display name of the mode.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Triangles => "Triangles",
            Self::TriangleStrip => "Triangle Strip",
            Self::TriangleFan => "Triangle Fan",
        }
    }
}

/// An owned triangle mesh with optional per-vertex attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct Vertices {
    mode: VertexMode,
    positions: Box<[Point]>,
    tex_coords: Option<Box<[Point]>>,
    colors: Option<Box<[Color]>>,
    indices: Option<Box<[u16]>>,
    blend: Option<BlendMode>,
}

impl Vertices {
    /// Copy a mesh description.
    ///
    /// Texture coordinates and colors, when present, must have one entry per
    /// position; indices must refer to existing positions.
    pub fn new(
        mode: VertexMode,
        positions: &[Point],
        tex_coords: Option<&[Point]>,
        colors: Option<&[Color]>,
        indices: Option<&[u16]>,
    ) -> Result<Self, CaptureError> {
        let vertex_count = positions.len();
        check_attribute("texture coordinates", vertex_count, tex_coords)?;
        check_attribute("colors", vertex_count, colors)?;
        if let Some(&index) = indices
            .unwrap_or_default()
            .iter()
            .find(|&&i| usize::from(i) >= vertex_count)
        {
            return Err(CaptureError::VertexIndex {
                index,
                vertex_count,
            });
        }
        Ok(Self {
            mode,
            positions: positions.into(),
            tex_coords: tex_coords.map(Into::into),
            colors: colors.map(Into::into),
            indices: indices.map(Into::into),
            blend: None,
        })
    }

    /// Set the blend mode used to combine vertex colors with the paint.
    #[must_use]
    pub fn with_blend(mut self, blend: impl Into<BlendMode>) -> Self {
        self.blend = Some(blend.into());
        self
    }

    /// Assembly mode.
    #[inline]
    pub fn mode(&self) -> VertexMode {
        self.mode
    }

    /// Vertex positions.
    #[inline]
    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    /// Texture coordinates, one per vertex, if supplied.
    #[inline]
    pub fn tex_coords(&self) -> Option<&[Point]> {
        self.tex_coords.as_deref()
    }

    /// Vertex colors, one per vertex, if supplied.
    #[inline]
    pub fn colors(&self) -> Option<&[Color]> {
        self.colors.as_deref()
    }

    /// Index list, if supplied.
    #[inline]
    pub fn indices(&self) -> Option<&[u16]> {
        self.indices.as_deref()
    }

    /// Blend mode for vertex colors, if supplied.
    #[inline]
    pub fn blend(&self) -> Option<BlendMode> {
        self.blend
    }

    /// The triangles this mesh describes, after applying indices and mode.
    pub fn triangles(&self) -> Vec<[Point; 3]> {
        let order: Vec<Point> = match &self.indices {
            Some(indices) => indices
                .iter()
                .map(|&i| self.positions[usize::from(i)])
                .collect(),
            None => self.positions.to_vec(),
        };
        match self.mode {
            VertexMode::Triangles => order
                .chunks_exact(3)
                .map(|t| [t[0], t[1], t[2]])
                .collect(),
            VertexMode::TriangleStrip => order.windows(3).map(|t| [t[0], t[1], t[2]]).collect(),
            VertexMode::TriangleFan => match order.split_first() {
                Some((&first, rest)) => rest.windows(2).map(|t| [first, t[0], t[1]]).collect(),
                None => Vec::new(),
            },
        }
    }
}

fn check_attribute<T>(
    attribute: &'static str,
    expected: usize,
    values: Option<&[T]>,
) -> Result<(), CaptureError> {
    match values {
        Some(values) if values.len() != expected => Err(CaptureError::AttributeCount {
            attribute,
            expected,
            actual: values.len(),
        }),
        _ => Ok(()),
    }
}
