//! Progress sessions
//!
//! A session collects tasks and their log lines into one continuously
//! updated terminal frame. Command logic talks to it through a [`Handler`];
//! in interactive mode a dedicated render loop thread owns all session state
//! and the handler only sends it messages.

pub mod handler;
pub mod message;
pub(crate) mod model;
pub(crate) mod render_loop;
pub(crate) mod spinner;

pub use handler::{Handler, InteractiveHandler, NonInteractiveHandler};
pub use message::{LogEntry, LogLevel, Task, TaskStatus};
