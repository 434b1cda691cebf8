// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Drawlog: a replayable, inspectable log of 2D drawing commands.
//!
//! This crate captures the calls made against a canvas-style drawing surface as
//! owned, immutable commands, and lets debugging tools step through them:
//! replay any prefix onto a surface, hide individual commands, and show each
//! command's arguments in human-readable form.
//!
//! # Core concepts
//!
//! - **Surface**: [`Surface`] is the drawing target, with one method per kind
//!   of operation (clip, transform, save/restore, draw primitives). Concrete
//!   surfaces live in sibling crates; [`Recorder`] is the capturing one.
//! - **Commands**: [`DrawCommand`] is the closed catalog of operations, each
//!   owning a deep copy of its arguments. [`Command`] wraps one with its
//!   [`Descriptor`]s, a preview image for image draws, and a visibility flag.
//! - **Sequences**: [`CommandSequence`] keeps commands in recording order and
//!   replays a prefix of them through a [`Replayer`].
//! - **Nesting**: [`DepthTracker`] follows the save/restore balance across a
//!   pass. Imbalance is reported in a [`DepthReport`], never raised as an
//!   error, since partial and in-progress recordings are normal.
//!
//! # Example
//!
//! ```
//! use understory_drawlog::{Paint, Rect, ReplayTarget, SaveFlags, Surface, record};
//!
//! let mut sequence = record(|r| {
//!     r.save(SaveFlags::MATRIX_CLIP)?;
//!     r.translate(10.0, 10.0)?;
//!     r.draw_rect(Rect::new(0.0, 0.0, 5.0, 5.0), &Paint::default())?;
//!     r.restore()
//! })
//! .unwrap();
//!
//! let rect = sequence.get(2).unwrap();
//! assert_eq!(rect.kind_name(), "Draw Rect");
//! assert_eq!(rect.describe()[0].to_string(), "Rect: L: 0, T: 0, R: 5, B: 5");
//!
//! // Replay into another recorder, hiding the translate.
//! sequence.set_visible(1, false);
//! let mut copy = understory_drawlog::Recorder::new();
//! let outcome = sequence.replay(ReplayTarget::All, &mut copy).unwrap();
//! assert!(outcome.depth.is_balanced());
//! assert_eq!((outcome.executed, outcome.skipped), (3, 1));
//! ```
//!
//! # Features
//!
//! - `std` (enabled by default): use the standard library in `kurbo` and
//!   `peniko`.
//! - `libm`: use `libm` for floating point in `no_std` builds.

#![no_std]

extern crate alloc;

mod command;
mod config;
mod depth;
pub mod descriptor;
mod error;
mod geometry;
mod image;
mod paint;
mod picture;
mod recorder;
mod replay;
mod sequence;
mod surface;
mod text;
mod vertices;

pub use command::{Command, CommandKind, DrawCommand};
pub use config::{CaptureConfig, DEFAULT_PREVIEW_EDGE};
pub use depth::{DepthReport, DepthTracker};
pub use descriptor::Descriptor;
pub use error::CaptureError;
pub use geometry::{IRect, NinePatchCell, PointMode, Region, RegionOp, SaveFlags, nine_patch};
pub use image::ImageSnapshot;
pub use paint::{Paint, PaintStyle};
pub use picture::Picture;
pub use recorder::{Recorder, record};
pub use replay::{ReplayOutcome, ReplayState, ReplayTarget, Replayer};
pub use sequence::CommandSequence;
pub use surface::Surface;
pub use text::{Text, TextEncoding, count_text};
pub use vertices::{VertexMode, Vertices};

pub use kurbo;
pub use peniko;

pub use kurbo::{Affine, BezPath, Point, Rect, RoundedRect, Stroke};
pub use peniko::{BlendMode, Brush, Color, ImageAlphaType, ImageFormat};
