//! Child operations: sub-task reporters that advance a parent reporter.
//!
//! A child has its own `0..=maximum` range (default `0..=100`). Every
//! determinate progress write on the child moves the parent to
//! `parent_start + delta`, where `parent_start` is the parent's progress when
//! the child was created and `delta` is either the child's progress itself
//! (unscaled) or the child's completion fraction mapped onto a fixed `range`
//! of parent units (scaled).
//!
//! ```
//! use progression_core::prelude::*;
//!
//! let mut parent = MemoryReporter::with_progress(400, Some(150)).unwrap();
//! let mut child = parent.scaled_child_operation(200).unwrap();
//! child.set_maximum(300).unwrap();
//! child.set_progress(Some(150)).unwrap();
//! drop(child);
//! assert_eq!(parent.progress(), Some(250));
//! ```

use std::fmt;

use crate::error::ProgressError;
use crate::memory::DEFAULT_MAXIMUM;
use crate::reporter::{check_progress, ProgressReporter};
use crate::scaled::scale;

/// Reports the progress of a sub-task into a borrowed parent reporter.
///
/// The parent is borrowed mutably for the child's whole lifetime, so the
/// child can never outlive it and nothing else writes to the parent while
/// the child is active.
pub struct ChildReporter<'a, P: ?Sized> {
    parent: &'a mut P,
    range: Option<u64>,
    parent_start: u64,
    maximum: u64,
    progress: Option<u64>,
    allow_cancellation: bool,
}

impl<'a, P: ProgressReporter + ?Sized> ChildReporter<'a, P> {
    /// Creates a child whose units are added 1:1 to the parent's progress.
    ///
    /// The parent's maximum is expected to be the sum of its children's
    /// maxima; this is not checked.
    pub fn unscaled(parent: &'a mut P) -> Result<Self, ProgressError> {
        Self::anchor(parent, None)
    }

    /// Creates a child that covers `range` units of the parent's progress.
    pub fn scaled(parent: &'a mut P, range: u64) -> Result<Self, ProgressError> {
        Self::anchor(parent, Some(range))
    }

    fn anchor(parent: &'a mut P, range: Option<u64>) -> Result<Self, ProgressError> {
        let Some(parent_start) = parent.progress() else {
            return Err(ProgressError::InvalidState(
                "child operations cannot be started on an indeterminate progress reporter"
                    .to_string(),
            ));
        };
        if range == Some(0) {
            return Err(ProgressError::not_positive("range"));
        }
        tracing::debug!(parent_start, ?range, "Starting child operation");
        Ok(Self {
            parent,
            range,
            parent_start,
            maximum: DEFAULT_MAXIMUM,
            progress: Some(0),
            allow_cancellation: false,
        })
    }

    /// The parent's progress when this child was created.
    pub fn parent_start(&self) -> u64 {
        self.parent_start
    }

    /// The parent units allotted to this child, or `None` when unscaled.
    pub fn range(&self) -> Option<u64> {
        self.range
    }

    pub fn parent(&self) -> &P {
        self.parent
    }

    fn parent_progress(&self, progress: u64, maximum: u64) -> u64 {
        let delta = match self.range {
            None => progress,
            Some(range) => scale(progress, maximum, range),
        };
        self.parent_start.saturating_add(delta)
    }
}

impl<P: ProgressReporter + ?Sized> ProgressReporter for ChildReporter<'_, P> {
    fn caption(&self) -> Option<&str> {
        self.parent.caption()
    }

    fn set_caption(&mut self, caption: Option<&str>) {
        self.parent.set_caption(caption);
    }

    fn maximum(&self) -> u64 {
        self.maximum
    }

    /// Sets the child's maximum and resets its progress to 0, which moves
    /// the parent back to [`parent_start`](ChildReporter::parent_start).
    /// A zero maximum is rejected.
    fn set_maximum(&mut self, maximum: u64) -> Result<(), ProgressError> {
        self.validate_maximum(maximum)?;
        self.parent.set_progress(Some(self.parent_start))?;
        self.maximum = maximum;
        self.progress = Some(0);
        Ok(())
    }

    fn progress(&self) -> Option<u64> {
        self.progress
    }

    /// An indeterminate child leaves the parent where it is.
    fn set_progress(&mut self, progress: Option<u64>) -> Result<(), ProgressError> {
        check_progress(progress, self.maximum)?;
        if let Some(value) = progress {
            let target = self.parent_progress(value, self.maximum);
            self.parent.set_progress(Some(target))?;
        }
        self.progress = progress;
        Ok(())
    }

    fn validate_maximum(&self, maximum: u64) -> Result<(), ProgressError> {
        if maximum == 0 {
            return Err(ProgressError::not_positive("maximum"));
        }
        self.parent.validate_progress(Some(self.parent_start))
    }

    fn validate_progress(&self, progress: Option<u64>) -> Result<(), ProgressError> {
        check_progress(progress, self.maximum)?;
        match progress {
            Some(value) => self
                .parent
                .validate_progress(Some(self.parent_progress(value, self.maximum))),
            None => Ok(()),
        }
    }

    fn allow_cancellation(&self) -> bool {
        self.allow_cancellation && self.parent.allow_cancellation()
    }

    /// Only toggles the child's own flag; the parent's session is untouched.
    fn set_allow_cancellation(&mut self, allow: bool) {
        self.allow_cancellation = allow;
    }

    fn was_canceled(&self) -> bool {
        self.allow_cancellation() && self.parent.was_canceled()
    }
}

impl<P: ?Sized> fmt::Debug for ChildReporter<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildReporter")
            .field("parent", &"<reporter>")
            .field("range", &self.range)
            .field("parent_start", &self.parent_start)
            .field("maximum", &self.maximum)
            .field("progress", &self.progress)
            .field("allow_cancellation", &self.allow_cancellation)
            .finish()
    }
}
