//! Reports progress to another task over a channel.
//!
//! The operation side holds a [`ChannelReporter`]; the side that owns the
//! real display (a UI task, a server connection) holds the paired
//! [`ProgressReceiver`], drains [`ProgressUpdate`]s in the order they were
//! written, and requests cancellation through it.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::cancel::CancelSignal;
use crate::error::ProgressError;
use crate::reporter::ProgressReporter;
use crate::scaled::{Redraw, ScaledProgress, ScaledValue};

/// Percent resolution.
pub const CHANNEL_SCALED_MAX: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressUpdate {
    Caption(Option<String>),
    /// Progress in percent, or indeterminate.
    Progress(ScaledValue),
}

#[derive(Debug)]
struct ChannelTarget {
    tx: UnboundedSender<ProgressUpdate>,
}

impl ChannelTarget {
    fn send(&self, update: ProgressUpdate) {
        if self.tx.send(update).is_err() {
            tracing::trace!("Progress receiver dropped; discarding update");
        }
    }
}

impl Redraw for ChannelTarget {
    fn scaled_max(&self) -> u64 {
        CHANNEL_SCALED_MAX
    }

    fn redraw(&mut self, _old: ScaledValue, new: ScaledValue) {
        self.send(ProgressUpdate::Progress(new));
    }
}

/// The operation side of a progress channel.
#[derive(Debug)]
pub struct ChannelReporter {
    scaled: ScaledProgress<ChannelTarget>,
    caption: Option<String>,
    cancel: CancelSignal,
}

/// The display side of a progress channel.
#[derive(Debug)]
pub struct ProgressReceiver {
    rx: UnboundedReceiver<ProgressUpdate>,
    cancel: CancelSignal,
}

/// Creates a connected reporter/receiver pair.
pub fn channel() -> (ChannelReporter, ProgressReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let cancel = CancelSignal::new();
    let reporter = ChannelReporter {
        scaled: ScaledProgress::new(ChannelTarget { tx }),
        caption: None,
        cancel: cancel.clone(),
    };
    (reporter, ProgressReceiver { rx, cancel })
}

impl ChannelReporter {
    /// Whether the receiving side still exists.
    pub fn is_connected(&self) -> bool {
        !self.scaled.target().tx.is_closed()
    }
}

impl ProgressReporter for ChannelReporter {
    fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    fn set_caption(&mut self, caption: Option<&str>) {
        self.caption = caption.map(str::to_string);
        self.scaled
            .target()
            .send(ProgressUpdate::Caption(self.caption.clone()));
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

impl ProgressReceiver {
    /// Waits for the next update. Returns `None` once the reporter is dropped
    /// and every update has been received.
    pub async fn recv(&mut self) -> Option<ProgressUpdate> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<ProgressUpdate> {
        self.rx.try_recv().ok()
    }

    /// Blocking variant for receivers running outside an async runtime.
    pub fn blocking_recv(&mut self) -> Option<ProgressUpdate> {
        self.rx.blocking_recv()
    }

    /// Whether the operation currently accepts cancellation.
    pub fn can_cancel(&self) -> bool {
        self.cancel.is_allowed()
    }

    pub fn cancel(&self) -> Result<(), ProgressError> {
        self.cancel.cancel()
    }

    pub fn cancel_handle(&self) -> CancelSignal {
        self.cancel.clone()
    }
}
