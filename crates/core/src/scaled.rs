//! Shared scaling logic for display adapters.
//!
//! A display has a fixed native resolution (character cells, widget ticks,
//! percent). [`ScaledProgress`] owns the `(maximum, progress)` pair of a
//! reporter, maps it onto `0..=scaled_max` and calls the display's
//! [`Redraw::redraw`] primitive only when the scaled value actually changes.

use crate::error::ProgressError;
use crate::memory::DEFAULT_MAXIMUM;
use crate::reporter::check_progress;

/// A progress value mapped onto a display's native range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaledValue {
    /// No known completion fraction; displays show a marquee or spinner.
    Indeterminate,
    Determinate(u64),
}

impl ScaledValue {
    pub fn as_determinate(self) -> Option<u64> {
        match self {
            Self::Determinate(value) => Some(value),
            Self::Indeterminate => None,
        }
    }
}

/// The drawing primitive a display adapter implements.
pub trait Redraw {
    /// The display's native resolution.
    fn scaled_max(&self) -> u64;

    /// Transitions the display from `old` to `new`. Called only when the two
    /// differ. Implementations should redraw just the changed region where
    /// they can.
    fn redraw(&mut self, old: ScaledValue, new: ScaledValue);
}

/// Maps `value / maximum` onto `0..=target`, rounding half up.
///
/// A zero `maximum` maps to 0. `value` is expected to be at most `maximum`.
pub fn scale(value: u64, maximum: u64, target: u64) -> u64 {
    if maximum == 0 {
        return 0;
    }
    let numerator = u128::from(value) * u128::from(target);
    let denominator = u128::from(maximum);
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    let rounded = if remainder * 2 >= denominator { quotient + 1 } else { quotient };
    rounded as u64
}

/// The `(maximum, progress)` state of a display adapter plus its redraw target.
#[derive(Debug)]
pub struct ScaledProgress<T> {
    maximum: u64,
    progress: Option<u64>,
    scaled: ScaledValue,
    target: T,
}

impl<T: Redraw> ScaledProgress<T> {
    /// Starts at maximum 100, progress 0, without drawing.
    pub fn new(target: T) -> Self {
        Self {
            maximum: DEFAULT_MAXIMUM,
            progress: Some(0),
            scaled: ScaledValue::Determinate(0),
            target,
        }
    }

    pub fn maximum(&self) -> u64 {
        self.maximum
    }

    pub fn progress(&self) -> Option<u64> {
        self.progress
    }

    pub fn scaled_value(&self) -> ScaledValue {
        self.scaled
    }

    /// Sets the maximum, pulling progress down to it if needed. `0` is
    /// allowed and renders as an empty bar.
    pub fn set_maximum(&mut self, maximum: u64) -> Result<(), ProgressError> {
        self.maximum = maximum;
        self.progress = self.progress.map(|p| p.min(maximum));
        self.update();
        Ok(())
    }

    pub fn set_progress(&mut self, progress: Option<u64>) -> Result<(), ProgressError> {
        check_progress(progress, self.maximum)?;
        self.progress = progress;
        self.update();
        Ok(())
    }

    /// Recomputes the scaled value, e.g. after the target's resolution changed.
    pub fn refresh(&mut self) {
        self.update();
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn into_target(self) -> T {
        self.target
    }

    fn update(&mut self) {
        let new = match self.progress {
            None => ScaledValue::Indeterminate,
            Some(progress) => {
                ScaledValue::Determinate(scale(progress, self.maximum, self.target.scaled_max()))
            }
        };
        if new == self.scaled {
            return;
        }
        let old = std::mem::replace(&mut self.scaled, new);
        tracing::trace!(?old, ?new, "Redrawing scaled progress");
        self.target.redraw(old, new);
    }
}
