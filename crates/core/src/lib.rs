//! Composable progress reporting.
//!
//! Long-running operations write to a [`ProgressReporter`](reporter::ProgressReporter).
//! Reporters compose: a [`ChildReporter`](child::ChildReporter) maps a nested
//! operation onto part of its parent, a [`FanOutReporter`](fanout::FanOutReporter)
//! mirrors one operation onto several displays, and
//! [`ScaledProgress`](scaled::ScaledProgress) lets a display redraw only when
//! its own resolution changes.

pub mod cancel;
pub mod child;
pub mod config;
pub mod display;
pub mod error;
pub mod fanout;
pub mod memory;
pub mod null;
pub mod operations;
pub mod reporter;
pub mod scaled;

pub mod prelude {
    pub use crate::cancel::CancelSignal;
    pub use crate::child::ChildReporter;
    pub use crate::display::{
        ChannelReporter, ConsoleOptions, ConsoleReporter, LogReporter, ProgressReceiver,
        ProgressUpdate,
    };
    pub use crate::error::*;
    pub use crate::fanout::FanOutReporter;
    pub use crate::memory::MemoryReporter;
    pub use crate::null::NullReporter;
    pub use crate::operations::{Digest, OperationOptions, Outcome};
    pub use crate::reporter::ProgressReporter;
    pub use crate::scaled::{Redraw, ScaledProgress, ScaledValue};
}
