//! Reports progress milestones through `tracing`.

use crate::error::ProgressError;
use crate::reporter::ProgressReporter;
use crate::scaled::{scale, Redraw, ScaledProgress, ScaledValue};

pub const DEFAULT_STEPS: u64 = 10;

#[derive(Debug)]
struct LogTarget {
    steps: u64,
    caption: Option<String>,
}

impl Redraw for LogTarget {
    fn scaled_max(&self) -> u64 {
        self.steps
    }

    fn redraw(&mut self, _old: ScaledValue, new: ScaledValue) {
        let caption = self.caption.as_deref().unwrap_or("Progress");
        match new {
            ScaledValue::Determinate(step) => {
                let percent = scale(step, self.steps, 100);
                tracing::info!("{}: {}%", caption, percent);
            }
            ScaledValue::Indeterminate => tracing::info!("{}: in progress", caption),
        }
    }
}

/// Logs one line per `1/steps` of progress and one per caption change.
///
/// Has no input source, so cancellation is never allowed.
#[derive(Debug)]
pub struct LogReporter {
    scaled: ScaledProgress<LogTarget>,
}

impl LogReporter {
    /// Fails when `steps` is 0.
    pub fn new(steps: u64) -> Result<Self, ProgressError> {
        if steps == 0 {
            return Err(ProgressError::not_positive("steps"));
        }
        Ok(Self {
            scaled: ScaledProgress::new(LogTarget {
                steps,
                caption: None,
            }),
        })
    }

    pub fn steps(&self) -> u64 {
        self.scaled.target().steps
    }

    /// The milestone most recently logged.
    pub fn current_step(&self) -> ScaledValue {
        self.scaled.scaled_value()
    }
}

impl Default for LogReporter {
    fn default() -> Self {
        Self {
            scaled: ScaledProgress::new(LogTarget {
                steps: DEFAULT_STEPS,
                caption: None,
            }),
        }
    }
}

impl ProgressReporter for LogReporter {
    fn caption(&self) -> Option<&str> {
        self.scaled.target().caption.as_deref()
    }

    fn set_caption(&mut self, caption: Option<&str>) {
        let target = self.scaled.target_mut();
        if target.caption.as_deref() == caption {
            return;
        }
        target.caption = caption.map(str::to_string);
        if let Some(text) = caption {
            tracing::info!("{}", text);
        }
    }

    fn maximum(&self) -> u64 {
        self.scaled.maximum()
    }

    fn set_maximum(&mut self, maximum: u64) -> Result<(), ProgressError> {
        self.scaled.set_maximum(maximum)
    }

    fn progress(&self) -> Option<u64> {
        self.scaled.progress()
    }

    fn set_progress(&mut self, progress: Option<u64>) -> Result<(), ProgressError> {
        self.scaled.set_progress(progress)
    }

    fn allow_cancellation(&self) -> bool {
        false
    }

    fn set_allow_cancellation(&mut self, _allow: bool) {}

    fn was_canceled(&self) -> bool {
        false
    }
}
