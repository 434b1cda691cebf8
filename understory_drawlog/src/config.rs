// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Default longest edge of a preview image, in pixels.
pub const DEFAULT_PREVIEW_EDGE: u32 = 256;

/// Settings applied when commands are captured.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Whether image-bearing commands keep a scaled preview image.
    ///
    /// Without one, [`Command::embedded_image`](crate::Command::embedded_image)
    /// snapshots the full image on each call.
    pub previews: bool,
    /// Longest edge of a preview image. Larger images are scaled down to fit.
    pub preview_edge: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            previews: true,
            preview_edge: DEFAULT_PREVIEW_EDGE,
        }
    }
}

impl CaptureConfig {
    /// Configuration that builds no scaled preview images.
    pub fn without_previews() -> Self {
        Self {
            previews: false,
            ..Self::default()
        }
    }

    /// Set the longest preview edge.
    #[must_use]
    pub fn with_preview_edge(mut self, edge: u32) -> Self {
        self.preview_edge = edge;
        self
    }
}
