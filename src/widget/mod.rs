//! Interactive input widgets
//!
//! Each widget is a small state machine over key events. The public widget
//! types (`TextInput`, `SingleSelect`, `MultiSelect`, `FilePicker`,
//! `Confirmation`) are configuration values; `get_input` builds the private
//! model, runs it through the stream context and maps the finished model to a
//! typed result.
//!
//! Models run in one of two modes, chosen by [`StreamContext::execute`]:
//! - standalone: an ad-hoc render loop owns the terminal for the duration of
//!   the prompt
//! - hosted: the model is injected into the active session's render loop

use std::any::Any;
use std::sync::Arc;

use crossterm::event::KeyEvent;

use crate::error::{Error, Result};
use crate::stream::StreamContext;
use crate::style::Styles;

pub mod confirmation;
pub mod file_picker;
pub mod list;
pub mod multi_select;
pub mod single_select;
pub mod text_field;
pub mod text_input;

pub use confirmation::Confirmation;
pub use file_picker::FilePicker;
pub use list::ListItem;
pub use multi_select::MultiSelect;
pub use single_select::SingleSelect;
pub use text_input::TextInput;

/// Validates a raw value and maps it to the typed result.
pub type ValidateAndMap<V, T> = Arc<dyn Fn(V) -> Result<T> + Send + Sync>;

/// Accepts any raw value unchanged.
pub(crate) fn identity<V: 'static>() -> ValidateAndMap<V, V> {
    Arc::new(|value: V| -> Result<V> { Ok(value) })
}

/// Whether a model keeps the terminal after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Complete,
}

/// A widget's internal model as driven by a render loop.
pub trait InputModel: Send + 'static {
    /// Called with the terminal size on injection and on every resize.
    fn resize(&mut self, _width: u16, _height: u16) {}

    fn handle_key(&mut self, key: KeyEvent) -> Flow;

    fn view(&self, styles: &Styles) -> String;

    /// Final record of the accepted value, echoed into the transcript once the
    /// model completes. `None` when nothing was accepted.
    fn transcript(&self) -> Option<String>;

    /// Ends the model as cancelled without a key press (the session is
    /// shutting down underneath it).
    fn interrupt(&mut self);

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

/// Anything that can solicit a value of type `V` from the user.
pub trait InputPrompt<V> {
    fn get_input(&self, ctx: &StreamContext) -> Result<V>;
}

/// Recovers the concrete model type after a render loop hands it back.
pub(crate) fn downcast<M: InputModel>(model: Box<dyn InputModel>) -> Result<M> {
    model
        .into_any()
        .downcast::<M>()
        .map(|model| *model)
        .map_err(|_| Error::UnexpectedModel(std::any::type_name::<M>()))
}

/// Outcome bookkeeping shared by all models.
#[derive(Debug)]
pub(crate) struct Outcome<V> {
    pub value: Option<V>,
    pub err: Option<Error>,
    pub quitting: bool,
}

impl<V> Default for Outcome<V> {
    fn default() -> Self {
        Self { value: None, err: None, quitting: false }
    }
}

impl<V> Outcome<V> {
    pub fn accept(&mut self, value: V) -> Flow {
        self.value = Some(value);
        self.err = None;
        self.quitting = true;
        Flow::Complete
    }

    pub fn interrupt(&mut self) -> Flow {
        self.value = None;
        self.err = Some(Error::Interrupted);
        self.quitting = true;
        Flow::Complete
    }

    pub fn is_accepted(&self) -> bool {
        self.quitting && self.err.is_none() && self.value.is_some()
    }

    pub fn into_result(self) -> Result<V> {
        if let Some(err) = self.err {
            return Err(err);
        }
        self.value.ok_or(Error::Interrupted)
    }
}

/// Renders the inline error line shown under a widget.
pub(crate) fn error_line(styles: &Styles, err: &Option<Error>) -> String {
    match err {
        Some(err) => styles.paint(&styles.err, &format!("Error: {err}")),
        None => String::new(),
    }
}

/// Two-line echo of an accepted prompt.
pub(crate) fn echo(prompt: &str, value: &str) -> String {
    format!("{prompt}\n> {value}")
}
