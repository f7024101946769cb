//! Terminal progress bar.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::cancel::CancelSignal;
use crate::error::ProgressError;
use crate::reporter::ProgressReporter;
use crate::scaled::{Redraw, ScaledProgress, ScaledValue};

pub const DEFAULT_WIDTH: u64 = 40;

const EMPTY_CAPTION: &str = "Please wait";
const MARQUEE_BLOCK: usize = 3;
const TICK_INTERVAL_MS: u64 = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleOptions {
    /// Bar width in character cells; this is the scaled maximum.
    pub width: u64,
    pub show_caption: bool,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            show_caption: true,
        }
    }
}

#[derive(Debug)]
struct ConsoleBar {
    bar: ProgressBar,
    width: u64,
}

impl ConsoleBar {
    fn bar_style(&self) -> ProgressStyle {
        ProgressStyle::with_template(&format!("[{{bar:{}}}] {{msg}}", self.width))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("██_")
    }

    fn marquee_style(&self) -> ProgressStyle {
        let frames = marquee_frames(cell_count(self.width));
        let frames: Vec<&str> = frames.iter().map(String::as_str).collect();
        ProgressStyle::with_template("[{spinner}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&frames)
    }
}

impl Redraw for ConsoleBar {
    fn scaled_max(&self) -> u64 {
        self.width
    }

    fn redraw(&mut self, old: ScaledValue, new: ScaledValue) {
        match new {
            ScaledValue::Indeterminate => {
                self.bar.set_style(self.marquee_style());
                self.bar.enable_steady_tick(Duration::from_millis(TICK_INTERVAL_MS));
            }
            ScaledValue::Determinate(cells) => {
                if old == ScaledValue::Indeterminate {
                    self.bar.disable_steady_tick();
                    self.bar.set_style(self.bar_style());
                }
                self.bar.set_position(cells);
            }
        }
    }
}

/// Terminal cells for a bar `width`, saturating where `usize` is narrower.
fn cell_count(width: u64) -> usize {
    usize::try_from(width).unwrap_or(usize::MAX)
}

/// Frames of a block bouncing across the bar, plus the final blank frame
/// indicatif shows once the bar finishes.
fn marquee_frames(width: usize) -> Vec<String> {
    let block = MARQUEE_BLOCK.min(width.max(1));
    let travel = width.saturating_sub(block);
    let frame = |offset: usize| {
        let mut s = "_".repeat(offset);
        s.push_str(&"▒".repeat(block));
        s.push_str(&"_".repeat(travel - offset));
        s
    };
    let mut frames: Vec<String> = (0..=travel).map(frame).collect();
    frames.extend((1..travel).rev().map(frame));
    frames.push("_".repeat(width));
    frames
}

/// Fits a caption into `width` cells.
fn trim_caption(caption: Option<&str>, width: usize) -> String {
    let text = match caption.map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => EMPTY_CAPTION,
    };
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut trimmed: String = text.chars().take(width.saturating_sub(1)).collect();
    trimmed.push('…');
    trimmed
}

/// Draws progress as a bar on the terminal.
///
/// Writes go through [`ScaledProgress`], so the bar is only touched when the
/// number of filled cells changes. An indeterminate progress shows a
/// bouncing marquee. Cancellation is requested by whatever input source the
/// host wires to [`cancel_handle`](Self::cancel_handle).
#[derive(Debug)]
pub struct ConsoleReporter {
    scaled: ScaledProgress<ConsoleBar>,
    caption: Option<String>,
    show_caption: bool,
    cancel: CancelSignal,
}

impl ConsoleReporter {
    /// Draws on stderr, refreshing at most 15 times per second. Nothing is
    /// drawn when stderr is not a terminal.
    pub fn new(options: &ConsoleOptions) -> Result<Self, ProgressError> {
        Self::with_draw_target(options, ProgressDrawTarget::stderr_with_hz(15))
    }

    /// Keeps all state without drawing anything.
    pub fn hidden(options: &ConsoleOptions) -> Result<Self, ProgressError> {
        Self::with_draw_target(options, ProgressDrawTarget::hidden())
    }

    pub fn with_draw_target(
        options: &ConsoleOptions,
        target: ProgressDrawTarget,
    ) -> Result<Self, ProgressError> {
        if options.width == 0 {
            return Err(ProgressError::not_positive("width"));
        }
        let bar = ProgressBar::with_draw_target(Some(options.width), target);
        let console = ConsoleBar {
            bar,
            width: options.width,
        };
        console.bar.set_style(console.bar_style());
        let reporter = Self {
            scaled: ScaledProgress::new(console),
            caption: None,
            show_caption: options.show_caption,
            cancel: CancelSignal::new(),
        };
        reporter.draw_caption();
        Ok(reporter)
    }

    pub fn width(&self) -> u64 {
        self.scaled.target().width
    }

    /// Whether the bar is actually drawn.
    pub fn is_visible(&self) -> bool {
        !self.scaled.target().bar.is_hidden()
    }

    pub fn cancel_handle(&self) -> CancelSignal {
        self.cancel.clone()
    }

    /// Removes the bar from the terminal.
    pub fn finish(&self) {
        self.scaled.target().bar.finish_and_clear();
    }

    fn draw_caption(&self) {
        if !self.show_caption {
            return;
        }
        let text = trim_caption(self.caption.as_deref(), cell_count(self.width()));
        self.scaled.target().bar.set_message(text);
    }
}

impl ProgressReporter for ConsoleReporter {
    fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    fn set_caption(&mut self, caption: Option<&str>) {
        self.caption = caption.map(str::to_string);
        self.draw_caption();
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
        self.cancel.is_allowed()
    }

    fn set_allow_cancellation(&mut self, allow: bool) {
        self.cancel.set_allowed(allow);
    }

    fn was_canceled(&self) -> bool {
        self.cancel.is_canceled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hidden(width: u64) -> ConsoleReporter {
        ConsoleReporter::hidden(&ConsoleOptions {
            width,
            show_caption: true,
        })
        .unwrap()
    }

    #[test]
    fn test_zero_width_rejected() {
        let options = ConsoleOptions {
            width: 0,
            show_caption: false,
        };
        assert!(matches!(
            ConsoleReporter::hidden(&options),
            Err(ProgressError::OutOfRange { what: "width", .. })
        ));
    }

    #[test]
    fn test_bar_position_tracks_scaled_value() {
        let mut r = hidden(20);
        r.set_maximum(200).unwrap();
        r.set_progress(Some(50)).unwrap();
        assert_eq!(r.scaled.target().bar.position(), 5);
        assert_eq!(r.scaled.target().bar.length(), Some(20));
        assert!(!r.is_visible());
    }

    #[test]
    fn test_marquee_round_trip() {
        let mut r = hidden(10);
        r.set_progress(Some(30)).unwrap();
        r.set_progress(None).unwrap();
        assert_eq!(r.scaled.scaled_value(), ScaledValue::Indeterminate);
        r.set_progress(Some(100)).unwrap();
        assert_eq!(r.scaled.target().bar.position(), 10);
        r.finish();
    }

    #[test]
    fn test_caption_is_kept_verbatim() {
        let mut r = hidden(10);
        r.set_caption(Some("  a very long caption indeed  "));
        assert_eq!(r.caption(), Some("  a very long caption indeed  "));
    }

    #[test]
    fn test_trim_caption() {
        assert_eq!(trim_caption(None, 20), "Please wait");
        assert_eq!(trim_caption(Some("   "), 20), "Please wait");
        assert_eq!(trim_caption(Some("  Copying "), 20), "Copying");
        assert_eq!(trim_caption(Some("Reticulating splines"), 10), "Reticulat…");
    }

    #[test]
    fn test_cell_count_saturates() {
        assert_eq!(cell_count(0), 0);
        assert_eq!(cell_count(80), 80);
        let wide = cell_count(u64::MAX);
        assert!(wide as u128 >= u128::from(u32::MAX));
        assert_eq!(trim_caption(Some("Copying"), wide), "Copying");
    }

    #[test]
    fn test_marquee_frames_have_bar_width() {
        let frames = marquee_frames(6);
        assert!(frames.iter().all(|f| f.chars().count() == 6));
        assert_eq!(frames.first().map(String::as_str), Some("▒▒▒___"));
        assert_eq!(frames.last().map(String::as_str), Some("______"));
        assert_eq!(frames.len(), 4 + 2 + 1);
    }

    #[test]
    fn test_marquee_frames_narrow_bar() {
        let frames = marquee_frames(2);
        assert!(frames.iter().all(|f| f.chars().count() == 2));
    }

    #[test]
    fn test_cancel_through_handle() {
        let mut r = hidden(10);
        let handle = r.cancel_handle();
        assert!(handle.cancel().is_err());
        r.set_allow_cancellation(true);
        handle.cancel().unwrap();
        assert!(r.was_canceled());
    }
}
