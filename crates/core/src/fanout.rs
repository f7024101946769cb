//! Fan-out: one reporter that drives several display surfaces.

use std::fmt;

use crate::error::ProgressError;
use crate::reporter::ProgressReporter;

/// Forwards every write to a fixed, ordered set of reporters.
///
/// Reads come from the first reporter, except cancellation: the fan-out
/// allows cancellation if any member does and is canceled if any member is.
/// Writes are all-or-nothing: a value any member would reject reaches no
/// member.
pub struct FanOutReporter<'a> {
    reporters: Vec<Box<dyn ProgressReporter + 'a>>,
}

impl<'a> FanOutReporter<'a> {
    /// Fails with [`ProgressError::InvalidArgument`] when `reporters` is empty.
    pub fn new(reporters: Vec<Box<dyn ProgressReporter + 'a>>) -> Result<Self, ProgressError> {
        if reporters.is_empty() {
            return Err(ProgressError::InvalidArgument(
                "a fan-out reporter requires at least one reporter".to_string(),
            ));
        }
        tracing::debug!(count = reporters.len(), "Building fan-out reporter");
        Ok(Self { reporters })
    }

    pub fn reporters(&self) -> &[Box<dyn ProgressReporter + 'a>] {
        &self.reporters
    }

    pub fn into_reporters(self) -> Vec<Box<dyn ProgressReporter + 'a>> {
        self.reporters
    }

    fn first(&self) -> &dyn ProgressReporter {
        // Non-empty by construction.
        &*self.reporters[0]
    }
}

impl ProgressReporter for FanOutReporter<'_> {
    fn caption(&self) -> Option<&str> {
        self.first().caption()
    }

    fn set_caption(&mut self, caption: Option<&str>) {
        for reporter in &mut self.reporters {
            reporter.set_caption(caption);
        }
    }

    fn maximum(&self) -> u64 {
        self.first().maximum()
    }

    /// Every member validates the value before any member is written, so a
    /// maximum one member rejects reaches none of them.
    fn set_maximum(&mut self, maximum: u64) -> Result<(), ProgressError> {
        self.validate_maximum(maximum)?;
        for reporter in &mut self.reporters {
            reporter.set_maximum(maximum)?;
        }
        Ok(())
    }

    fn progress(&self) -> Option<u64> {
        self.first().progress()
    }

    /// Checked against each member's own maximum before anything is
    /// written. A member that accepts any value (such as
    /// [`NullReporter`](crate::null::NullReporter)) never vetoes the write.
    fn set_progress(&mut self, progress: Option<u64>) -> Result<(), ProgressError> {
        self.validate_progress(progress)?;
        for reporter in &mut self.reporters {
            reporter.set_progress(progress)?;
        }
        Ok(())
    }

    fn validate_maximum(&self, maximum: u64) -> Result<(), ProgressError> {
        self.reporters
            .iter()
            .try_for_each(|r| r.validate_maximum(maximum))
    }

    fn validate_progress(&self, progress: Option<u64>) -> Result<(), ProgressError> {
        self.reporters
            .iter()
            .try_for_each(|r| r.validate_progress(progress))
    }

    fn allow_cancellation(&self) -> bool {
        self.reporters.iter().any(|r| r.allow_cancellation())
    }

    fn set_allow_cancellation(&mut self, allow: bool) {
        for reporter in &mut self.reporters {
            reporter.set_allow_cancellation(allow);
        }
    }

    fn was_canceled(&self) -> bool {
        self.reporters.iter().any(|r| r.was_canceled())
    }
}

impl fmt::Debug for FanOutReporter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FanOutReporter")
            .field("reporters", &self.reporters.len())
            .finish()
    }
}
