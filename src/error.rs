use std::sync::Arc;
use thiserror::Error;

use crate::constants::exit_codes;

/// Structured, field-level validation failure.
///
/// When an [`crate::switch::InputSourceSwitch`] rewraps an error with its own
/// message, the `message` of a `FieldError` is preferred over the full
/// rendering of the error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", render_field(.field, .message))]
pub struct FieldError {
    pub field: Option<String>,
    pub message: String,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { field: None, message: message.into() }
    }

    pub fn for_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: Some(field.into()), message: message.into() }
    }
}

fn render_field(field: &Option<String>, message: &str) -> String {
    match field {
        Some(field) => format!("{field}: {message}"),
        None => message.to_string(),
    }
}

#[derive(Error, Debug, Clone)]
pub enum Error {
    /// The user cancelled input (Ctrl+C, or Esc outside of filtering).
    #[error("input was interrupted")]
    Interrupted,

    /// No default was supplied and the streams are not interactive.
    #[error("value is not set")]
    NotSet,

    #[error(transparent)]
    Validation(#[from] FieldError),

    /// A failure rewrapped with a caller supplied message.
    #[error("{message}: {}", reason(.source))]
    Context { message: String, source: Box<Error> },

    #[error("IO error: {0}.")]
    Io(Arc<std::io::Error>),

    #[error("Failed to load configuration: {0}.")]
    Config(String),

    /// An input model came back from the render loop with a different type.
    #[error("Unexpected input model returned, expected {0}.")]
    UnexpectedModel(&'static str),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(Arc::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// The text used after the colon of a [`Error::Context`].
fn reason(err: &Error) -> String {
    match err {
        Error::Validation(field) => field.message.clone(),
        other => other.to_string(),
    }
}

impl Error {
    /// Shorthand for an unstructured validation failure.
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::Validation(FieldError::new(message))
    }

    pub fn with_context(self, message: impl Into<String>) -> Self {
        Error::Context { message: message.into(), source: Box::new(self) }
    }

    /// Innermost error, looking through any context wrapping.
    pub fn root(&self) -> &Error {
        match self {
            Error::Context { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self.root(), Error::Interrupted)
    }

    pub fn is_not_set(&self) -> bool {
        matches!(self.root(), Error::NotSet)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.root(), Error::Validation(_))
    }

    /// Process exit code an outer CLI layer should use for this error.
    pub fn exit_code(&self) -> i32 {
        match self.root() {
            Error::Interrupted => exit_codes::INTERRUPTED,
            Error::NotSet => exit_codes::NOT_SET,
            _ => exit_codes::FAILURE,
        }
    }
}

/// Convenience type alias for Results with userio's Error as the error type.
///
/// # Type Parameters
/// * `T` - The type of the success value
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The Error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with the code matching the
/// error kind: interruption and missing values are distinguishable from other
/// failures.
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(err.exit_code());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_prefers_field_message() {
        let err = Error::Validation(FieldError::for_field("name", "must not be empty"))
            .with_context("invalid name");
        assert_eq!(err.to_string(), "invalid name: must not be empty");
    }

    #[test]
    fn context_falls_back_to_error_text() {
        let err = Error::NotSet.with_context("tenant");
        assert_eq!(err.to_string(), "tenant: value is not set");
        assert!(err.is_not_set());
        assert!(!err.is_interrupted());
    }

    #[test]
    fn exit_codes_follow_error_kind() {
        assert_eq!(Error::Interrupted.exit_code(), exit_codes::INTERRUPTED);
        assert_eq!(Error::NotSet.with_context("x").exit_code(), exit_codes::NOT_SET);
        assert_eq!(Error::invalid("bad").exit_code(), exit_codes::FAILURE);
    }

    #[test]
    fn field_error_display_includes_field() {
        assert_eq!(FieldError::for_field("path", "missing").to_string(), "path: missing");
        assert_eq!(FieldError::new("missing").to_string(), "missing");
    }
}
