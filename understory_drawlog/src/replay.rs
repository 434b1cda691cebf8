// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Replaying a prefix of a command sequence onto a surface.

use crate::{Command, DepthReport, DepthTracker, Surface};

/// Which commands a replay pass covers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ReplayTarget {
    /// Every command.
    #[default]
    All,
    /// Commands `0..=index`. An index past the end covers every command.
    Through(usize),
}

impl ReplayTarget {
    /// Exclusive end index of the pass over `len` commands.
    pub fn end(self, len: usize) -> usize {
        match self {
            Self::All => len,
            Self::Through(index) => index.saturating_add(1).min(len),
        }
    }
}

/// Progress of a [`Replayer`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReplayState {
    /// No command has been looked at yet.
    NotStarted,
    /// Some commands have been processed and some remain.
    Replaying,
    /// The pass is over, either at the target or after a surface error.
    Done,
}

/// Result of a replay pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplayOutcome {
    /// Nesting balance over the executed commands.
    pub depth: DepthReport,
    /// Number of visible commands executed.
    pub executed: usize,
    /// Number of hidden commands passed over.
    pub skipped: usize,
}

/// A single top-to-bottom pass over a command prefix.
///
/// Hidden commands are not executed and do not count toward the nesting
/// depth. The pass can be driven one command at a time with
/// [`Replayer::step`] and abandoned at any point; it never executes a command
/// twice.
#[derive(Clone, Debug)]
pub struct Replayer<'a> {
    commands: &'a [Command],
    end: usize,
    next: usize,
    state: ReplayState,
    tracker: DepthTracker,
    executed: usize,
    skipped: usize,
}

impl<'a> Replayer<'a> {
    /// Prepare a pass over `commands` up to `target`.
    pub fn new(commands: &'a [Command], target: ReplayTarget) -> Self {
        Self {
            commands,
            end: target.end(commands.len()),
            next: 0,
            state: ReplayState::NotStarted,
            tracker: DepthTracker::new(),
            executed: 0,
            skipped: 0,
        }
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> ReplayState {
        self.state
    }

    /// Index of the next command the pass will look at.
    #[inline]
    pub fn position(&self) -> usize {
        self.next
    }

    /// Outcome so far.
    pub fn outcome(&self) -> ReplayOutcome {
        ReplayOutcome {
            depth: self.tracker.report(),
            executed: self.executed,
            skipped: self.skipped,
        }
    }

    /// Process the next command.
    ///
    /// Returns the index of the command processed (executed or skipped), or
    /// `None` once the pass is done. A surface error ends the pass and is
    /// returned unchanged.
    pub fn step<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> Result<Option<usize>, S::Error> {
        match self.state {
            ReplayState::Done => return Ok(None),
            ReplayState::NotStarted => {
                tracing::debug!(end = self.end, "replay started");
                self.state = ReplayState::Replaying;
            }
            ReplayState::Replaying => {}
        }
        if self.next >= self.end {
            self.finish();
            return Ok(None);
        }

        let index = self.next;
        let commands = self.commands;
        let command = &commands[index];
        self.next += 1;
        if command.is_visible() {
            tracing::trace!(index, kind = command.kind_name(), "execute");
            if let Err(err) = command.execute(surface) {
                tracing::debug!(index, kind = command.kind_name(), "surface rejected command");
                self.state = ReplayState::Done;
                return Err(err);
            }
            self.executed += 1;
            let delta = command.save_depth_delta();
            self.tracker.apply(index, delta);
            if delta < 0 && self.tracker.first_underflow() == Some(index) {
                tracing::warn!(index, "restore without a matching save");
            }
        } else {
            tracing::trace!(index, kind = command.kind_name(), "skip hidden");
            self.skipped += 1;
        }

        if self.next >= self.end {
            self.finish();
        }
        Ok(Some(index))
    }

    /// Process every remaining command.
    pub fn run<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> Result<ReplayOutcome, S::Error> {
        while self.step(surface)?.is_some() {}
        Ok(self.outcome())
    }

    fn finish(&mut self) {
        if self.state == ReplayState::Done {
            return;
        }
        self.state = ReplayState::Done;
        let report = self.tracker.report();
        tracing::debug!(
            executed = self.executed,
            skipped = self.skipped,
            depth = report.depth,
            "replay finished"
        );
        if report.is_unbalanced() {
            tracing::warn!(
                depth = report.depth,
                "replay ended with unbalanced save/restore"
            );
        }
    }
}
