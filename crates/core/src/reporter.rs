//! The progress contract shared by every reporter.
//!
//! A long-running operation takes a `&mut dyn ProgressReporter` (or a generic
//! `R: ProgressReporter`) and writes its caption, maximum and progress without
//! knowing what, if anything, displays them. Callers that need no display pass
//! [`NullReporter`](crate::null::NullReporter).

use crate::child::ChildReporter;
use crate::error::ProgressError;

/// Displays the progress of an operation.
pub trait ProgressReporter {
    /// Text describing the current operation.
    fn caption(&self) -> Option<&str>;

    fn set_caption(&mut self, caption: Option<&str>);

    /// The progress value at which the operation is complete.
    fn maximum(&self) -> u64;

    /// Sets the maximum. If the current progress exceeds the new maximum it
    /// is pulled down to it.
    fn set_maximum(&mut self, maximum: u64) -> Result<(), ProgressError>;

    /// Current progress in `0..=maximum`, or `None` while indeterminate.
    fn progress(&self) -> Option<u64>;

    /// Sets the progress. Fails with [`ProgressError::OutOfRange`] when the
    /// value exceeds [`maximum`](Self::maximum); `None` switches to an
    /// indeterminate display.
    fn set_progress(&mut self, progress: Option<u64>) -> Result<(), ProgressError>;

    /// Whether cancellation is currently solicited. Reporters without an
    /// input source always return `false`.
    fn allow_cancellation(&self) -> bool;

    /// Starts or ends a cancellable session. Either direction clears a
    /// previously latched cancellation.
    fn set_allow_cancellation(&mut self, allow: bool);

    /// Whether cancellation was requested during the current session.
    fn was_canceled(&self) -> bool;

    /// Fails exactly when [`set_maximum`](Self::set_maximum) would, without
    /// writing anything. Composite reporters use it to validate every member
    /// before touching any of them.
    fn validate_maximum(&self, _maximum: u64) -> Result<(), ProgressError> {
        Ok(())
    }

    /// Fails exactly when [`set_progress`](Self::set_progress) would, without
    /// writing anything.
    fn validate_progress(&self, progress: Option<u64>) -> Result<(), ProgressError> {
        check_progress(progress, self.maximum())
    }

    fn is_indeterminate(&self) -> bool {
        self.progress().is_none()
    }

    /// Advances a determinate progress by one unit.
    fn step(&mut self) -> Result<(), ProgressError> {
        match self.progress() {
            Some(current) => self.set_progress(Some(current.saturating_add(1))),
            None => Err(ProgressError::InvalidState(
                "cannot step an indeterminate progress".to_string(),
            )),
        }
    }

    /// Starts a child operation whose progress units are added 1:1 to this
    /// reporter's progress.
    fn child_operation(&mut self) -> Result<ChildReporter<'_, Self>, ProgressError>
    where
        Self: Sized,
    {
        ChildReporter::unscaled(self)
    }

    /// Starts a child operation whose `0..=maximum` range is mapped onto
    /// `range` units of this reporter's progress.
    fn scaled_child_operation(
        &mut self,
        range: u64,
    ) -> Result<ChildReporter<'_, Self>, ProgressError>
    where
        Self: Sized,
    {
        ChildReporter::scaled(self, range)
    }
}

impl<R: ProgressReporter + ?Sized> ProgressReporter for &mut R {
    fn caption(&self) -> Option<&str> {
        (**self).caption()
    }

    fn set_caption(&mut self, caption: Option<&str>) {
        (**self).set_caption(caption);
    }

    fn maximum(&self) -> u64 {
        (**self).maximum()
    }

    fn set_maximum(&mut self, maximum: u64) -> Result<(), ProgressError> {
        (**self).set_maximum(maximum)
    }

    fn progress(&self) -> Option<u64> {
        (**self).progress()
    }

    fn set_progress(&mut self, progress: Option<u64>) -> Result<(), ProgressError> {
        (**self).set_progress(progress)
    }

    fn validate_maximum(&self, maximum: u64) -> Result<(), ProgressError> {
        (**self).validate_maximum(maximum)
    }

    fn validate_progress(&self, progress: Option<u64>) -> Result<(), ProgressError> {
        (**self).validate_progress(progress)
    }

    fn allow_cancellation(&self) -> bool {
        (**self).allow_cancellation()
    }

    fn set_allow_cancellation(&mut self, allow: bool) {
        (**self).set_allow_cancellation(allow);
    }

    fn was_canceled(&self) -> bool {
        (**self).was_canceled()
    }
}

impl<R: ProgressReporter + ?Sized> ProgressReporter for Box<R> {
    fn caption(&self) -> Option<&str> {
        (**self).caption()
    }

    fn set_caption(&mut self, caption: Option<&str>) {
        (**self).set_caption(caption);
    }

    fn maximum(&self) -> u64 {
        (**self).maximum()
    }

    fn set_maximum(&mut self, maximum: u64) -> Result<(), ProgressError> {
        (**self).set_maximum(maximum)
    }

    fn progress(&self) -> Option<u64> {
        (**self).progress()
    }

    fn set_progress(&mut self, progress: Option<u64>) -> Result<(), ProgressError> {
        (**self).set_progress(progress)
    }

    fn validate_maximum(&self, maximum: u64) -> Result<(), ProgressError> {
        (**self).validate_maximum(maximum)
    }

    fn validate_progress(&self, progress: Option<u64>) -> Result<(), ProgressError> {
        (**self).validate_progress(progress)
    }

    fn allow_cancellation(&self) -> bool {
        (**self).allow_cancellation()
    }

    fn set_allow_cancellation(&mut self, allow: bool) {
        (**self).set_allow_cancellation(allow);
    }

    fn was_canceled(&self) -> bool {
        (**self).was_canceled()
    }
}

/// Checks a progress write against a maximum.
pub(crate) fn check_progress(progress: Option<u64>, maximum: u64) -> Result<(), ProgressError> {
    match progress {
        Some(value) if value > maximum => Err(ProgressError::progress_above_maximum(value, maximum)),
        _ => Ok(()),
    }
}
