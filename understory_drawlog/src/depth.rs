// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Save/restore nesting balance.

/// Running save/restore nesting count over a pass.
///
/// Imbalance is a value, not an error: a restore without a matching save is
/// remembered and the count keeps going.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DepthTracker {
    depth: i32,
    first_underflow: Option<usize>,
}

impl DepthTracker {
    /// A tracker at depth zero.
    pub const fn new() -> Self {
        Self {
            depth: 0,
            first_underflow: None,
        }
    }

    /// Add the delta of the command at `index`.
    pub fn apply(&mut self, index: usize, delta: i32) {
        self.depth += delta;
        if self.depth < 0 && self.first_underflow.is_none() {
            self.first_underflow = Some(index);
        }
    }

    /// Current nesting depth.
    #[inline]
    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Index of the first command that took the depth below zero.
    #[inline]
    pub fn first_underflow(&self) -> Option<usize> {
        self.first_underflow
    }

    /// Summary of the pass so far.
    pub fn report(&self) -> DepthReport {
        DepthReport {
            depth: self.depth,
            first_underflow: self.first_underflow,
        }
    }
}

/// Final nesting state of a pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DepthReport {
    /// Depth after the last applied command. Positive means unterminated saves.
    pub depth: i32,
    /// Index of the first restore that had no matching save.
    pub first_underflow: Option<usize>,
}

impl DepthReport {
    /// Returns `true` if the depth ended at zero and never went negative.
    #[inline]
    pub fn is_balanced(&self) -> bool {
        self.depth == 0 && self.first_underflow.is_none()
    }

    /// Returns `true` if the nesting is not balanced.
    #[inline]
    pub fn is_unbalanced(&self) -> bool {
        !self.is_balanced()
    }
}
