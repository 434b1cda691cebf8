// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::TextEncoding;

/// Why a drawing call could not be captured as a command.
///
/// Capture is atomic: when construction fails, nothing is appended to the
/// sequence being recorded.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    /// Text byte length is not a whole number of code units.
    #[error("{len} bytes is not a whole number of {} code units", .encoding.name())]
    TextLength {
        /// Encoding the text was declared with.
        encoding: TextEncoding,
        /// Byte length supplied.
        len: usize,
    },
    /// Fewer positions were supplied than the text has glyphs.
    #[error("text has {expected} glyphs but only {actual} positions were supplied")]
    PositionCount {
        /// Number of glyphs in the text.
        expected: usize,
        /// Number of positions supplied.
        actual: usize,
    },
    /// Pixel buffer length does not match the image dimensions.
    #[error("a {width}x{height} image needs {expected} bytes of pixels, got {actual}")]
    PixelBuffer {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
        /// Required byte length.
        expected: usize,
        /// Supplied byte length.
        actual: usize,
    },
    /// Image dimensions overflow the address space.
    #[error("a {width}x{height} image is too large to capture")]
    ImageTooLarge {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },
    /// A per-vertex attribute array does not have one entry per vertex.
    #[error("{attribute} has {actual} entries for {expected} vertices")]
    AttributeCount {
        /// Name of the attribute array.
        attribute: &'static str,
        /// Number of vertices.
        expected: usize,
        /// Number of entries supplied.
        actual: usize,
    },
    /// A vertex index refers past the end of the vertex array.
    #[error("vertex index {index} is out of range for {vertex_count} vertices")]
    VertexIndex {
        /// Offending index.
        index: u16,
        /// Number of vertices.
        vertex_count: usize,
    },
}
