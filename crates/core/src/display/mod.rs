//! Display adapters built on [`ScaledProgress`](crate::scaled::ScaledProgress).

pub mod channel;
pub mod console;
pub mod log;

pub use channel::{channel, ChannelReporter, ProgressReceiver, ProgressUpdate};
pub use console::{ConsoleOptions, ConsoleReporter};
pub use log::LogReporter;
