// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nested recorded programs.

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::Rect;

use crate::{CaptureConfig, CaptureError, DrawCommand, Recorder, Surface};

/// An owned recording that can itself be drawn as a single command.
///
/// Pictures hold bare [`DrawCommand`]s: they have no visibility flags or
/// descriptors of their own and always play back in full.
#[derive(Clone, Debug, PartialEq)]
pub struct Picture {
    bounds: Rect,
    commands: Box<[DrawCommand]>,
}

impl Picture {
    /// Wrap already captured commands.
    ///
    /// Each command goes through the same checks as [`Command::new`](crate::Command::new).
    pub fn new(bounds: Rect, mut commands: Vec<DrawCommand>) -> Result<Self, CaptureError> {
        for command in &mut commands {
            command.normalize()?;
        }
        Ok(Self {
            bounds,
            commands: commands.into_boxed_slice(),
        })
    }

    /// Capture a picture by drawing into a fresh [`Recorder`].
    ///
    /// Previews are not built for the nested commands.
    pub fn record(
        bounds: Rect,
        f: impl FnOnce(&mut Recorder) -> Result<(), CaptureError>,
    ) -> Result<Self, CaptureError> {
        let mut recorder = Recorder::with_config(CaptureConfig::without_previews());
        f(&mut recorder)?;
        let commands: Vec<DrawCommand> = recorder
            .into_sequence()
            .into_commands()
            .map(|command| command.into_op())
            .collect();
        Self::new(bounds, commands)
    }

    /// Cull bounds supplied at capture time.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Nested commands in playback order.
    #[inline]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of nested commands.
    #[inline]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if the picture draws nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Execute every nested command against `surface`.
    ///
    /// Playback never disturbs the caller's save stack: a restore with no
    /// matching save inside the picture is skipped, and saves the picture
    /// leaves open are restored before returning.
    pub fn playback<S: Surface + ?Sized>(&self, surface: &mut S) -> Result<(), S::Error> {
        let mut depth = 0_u32;
        for command in &self.commands {
            let delta = command.save_depth_delta();
            if delta < 0 && depth == 0 {
                tracing::debug!("unmatched restore inside picture skipped");
                continue;
            }
            command.execute(surface)?;
            depth = depth.saturating_add_signed(delta);
        }
        for _ in 0..depth {
            surface.restore()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CommandKind, SaveFlags};
    use alloc::vec;

    fn kinds(recorder: Recorder) -> Vec<CommandKind> {
        recorder.into_sequence().iter().map(|c| c.kind()).collect()
    }

    #[test]
    fn unmatched_restore_is_skipped() {
        let picture = Picture::new(
            Rect::new(0.0, 0.0, 5.0, 5.0),
            vec![
                DrawCommand::Restore,
                DrawCommand::Translate { dx: 1.0, dy: 1.0 },
            ],
        )
        .unwrap();
        let mut recorder = Recorder::new();
        picture.playback(&mut recorder).unwrap();
        assert_eq!(kinds(recorder), [CommandKind::Translate]);
    }

    #[test]
    fn open_saves_are_closed() {
        let picture = Picture::new(
            Rect::new(0.0, 0.0, 5.0, 5.0),
            vec![
                DrawCommand::Save {
                    flags: SaveFlags::MATRIX_CLIP,
                },
                DrawCommand::Save {
                    flags: SaveFlags::MATRIX,
                },
                DrawCommand::Restore,
                DrawCommand::Restore,
                DrawCommand::Save {
                    flags: SaveFlags::CLIP,
                },
            ],
        )
        .unwrap();
        let mut recorder = Recorder::new();
        picture.playback(&mut recorder).unwrap();
        assert_eq!(
            kinds(recorder),
            [
                CommandKind::Save,
                CommandKind::Save,
                CommandKind::Restore,
                CommandKind::Restore,
                CommandKind::Save,
                CommandKind::Restore,
            ]
        );
    }
}
