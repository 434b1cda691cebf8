// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The ordered container of captured commands.

use alloc::vec::Vec;
use core::slice;

use crate::{
    CaptureConfig, CaptureError, Command, DepthReport, DepthTracker, DrawCommand, ReplayOutcome,
    ReplayTarget, Replayer, Surface,
};

/// Commands in recording order.
///
/// Order is replay order and is never changed. Only a command's visibility can
/// be edited after it has been appended.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandSequence {
    commands: Vec<Command>,
    config: CaptureConfig,
}

impl CommandSequence {
    /// An empty sequence using the default [`CaptureConfig`].
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty sequence that captures with `config`.
    pub fn with_config(config: CaptureConfig) -> Self {
        Self {
            commands: Vec::new(),
            config,
        }
    }

    /// Capture settings used by [`CommandSequence::append`].
    #[inline]
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Capture `op` and append it, returning its index.
    ///
    /// On error the sequence is left unchanged.
    pub fn append(&mut self, op: DrawCommand) -> Result<usize, CaptureError> {
        let command = Command::with_config(op, &self.config).inspect_err(|err| {
            tracing::debug!(%err, "capture failed");
        })?;
        Ok(self.push(command))
    }

    /// Append an already captured command, returning its index.
    pub fn push(&mut self, command: Command) -> usize {
        let index = self.commands.len();
        tracing::debug!(index, kind = command.kind_name(), "append");
        self.commands.push(command);
        index
    }

    /// Command at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Command> {
        self.commands.get(index)
    }

    /// Number of commands.
    #[inline]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands in order.
    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, Command> {
        self.commands.iter()
    }

    /// Commands as a slice.
    #[inline]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Consume the sequence, yielding its commands in order.
    pub fn into_commands(self) -> impl Iterator<Item = Command> {
        self.commands.into_iter()
    }

    /// Show or hide the command at `index` during replay.
    ///
    /// Returns the previous visibility, or `None` if `index` is out of range.
    pub fn set_visible(&mut self, index: usize, visible: bool) -> Option<bool> {
        let command = self.commands.get_mut(index)?;
        let previous = command.is_visible();
        command.set_visible(visible);
        Some(previous)
    }

    /// Start a step-wise replay pass.
    pub fn replayer(&self, target: ReplayTarget) -> Replayer<'_> {
        Replayer::new(&self.commands, target)
    }

    /// Replay the commands covered by `target` onto `surface`.
    ///
    /// Nesting imbalance is reported in the outcome; a surface error stops the
    /// pass and is returned unchanged.
    pub fn replay<S: Surface + ?Sized>(
        &self,
        target: ReplayTarget,
        surface: &mut S,
    ) -> Result<ReplayOutcome, S::Error> {
        self.replayer(target).run(surface)
    }

    /// Nesting balance of the whole recording, ignoring visibility.
    ///
    /// A positive depth means the recording session has not restored all of
    /// its saves yet.
    pub fn recorded_depth(&self) -> DepthReport {
        let mut tracker = DepthTracker::new();
        for (index, command) in self.commands.iter().enumerate() {
            tracker.apply(index, command.save_depth_delta());
        }
        tracker.report()
    }

    /// Discard every command.
    pub fn clear(&mut self) {
        tracing::debug!(discarded = self.commands.len(), "clear");
        self.commands.clear();
    }
}

impl<'a> IntoIterator for &'a CommandSequence {
    type Item = &'a Command;
    type IntoIter = slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Paint, Text, TextEncoding};
    use alloc::boxed::Box;

    #[test]
    fn append_returns_indices() {
        let mut seq = CommandSequence::new();
        assert_eq!(seq.append(DrawCommand::NoOp), Ok(0));
        assert_eq!(seq.append(DrawCommand::Restore), Ok(1));
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.get(1).map(Command::kind_name), Some("Restore"));
        assert!(seq.get(2).is_none());
    }

    #[test]
    fn failed_append_leaves_sequence_unchanged() {
        let mut seq = CommandSequence::new();
        seq.append(DrawCommand::NoOp).unwrap();
        let err = seq.append(DrawCommand::DrawPosTextH {
            text: Text::new(b"abc", TextEncoding::Utf8).unwrap(),
            xpos: Box::new([0.0]),
            const_y: 0.0,
            paint: Paint::default(),
        });
        assert!(err.is_err());
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn set_visible_reports_previous_value() {
        let mut seq = CommandSequence::new();
        seq.append(DrawCommand::NoOp).unwrap();
        assert_eq!(seq.set_visible(0, false), Some(true));
        assert_eq!(seq.set_visible(0, false), Some(false));
        assert_eq!(seq.set_visible(5, true), None);
    }

    #[test]
    fn recorded_depth_ignores_visibility() {
        let mut seq = CommandSequence::new();
        seq.append(DrawCommand::Save {
            flags: crate::SaveFlags::MATRIX_CLIP,
        })
        .unwrap();
        seq.append(DrawCommand::Save {
            flags: crate::SaveFlags::MATRIX_CLIP,
        })
        .unwrap();
        seq.append(DrawCommand::Restore).unwrap();
        seq.set_visible(0, false);
        let report = seq.recorded_depth();
        assert_eq!(report.depth, 1);
        assert!(report.is_unbalanced());
    }

    #[test]
    fn clear_empties() {
        let mut seq = CommandSequence::new();
        seq.append(DrawCommand::NoOp).unwrap();
        seq.clear();
        assert!(seq.is_empty());
        assert_eq!(seq.append(DrawCommand::NoOp), Ok(0));
    }
}
