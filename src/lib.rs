/// Argument parsing and the demonstration `init` command.
pub mod cli;

/// Console configuration loading.
pub mod config;

/// Defaults, glyphs and messages shared across the crate.
pub mod constants;

/// Defines custom error types.
pub mod error;

/// Path helpers used by the file picker and validators.
pub mod ext;

/// Progress sessions, their render loop and the handler façade.
pub mod session;

/// Stream context: interactivity detection and the entry point for sessions
/// and widgets.
pub mod stream;

/// Terminal styles.
pub mod style;

/// Flag-or-prompt value resolution.
pub mod switch;

/// Raw mode, terminal events and frame drawing.
pub mod terminal;

/// Input validators.
pub mod validation;

/// Interactive input widgets.
pub mod widget;

pub use error::{Error, FieldError, Result};
pub use session::{Handler, TaskStatus};
pub use stream::StreamContext;
pub use switch::{InputSourceSwitch, Scalar, Sequence, Zeroable};
pub use widget::InputPrompt;
