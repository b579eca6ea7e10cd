//! Flag-or-prompt value resolution.
//!
//! An [`InputSourceSwitch`] takes its value from a default (usually a
//! command line flag) when one was given, and otherwise asks the user
//! through an interactive widget. Either way the raw value goes through the
//! same validate-and-map function, and the outcome is resolved once.

use std::cell::OnceCell;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::stream::StreamContext;
use crate::widget::{InputPrompt, ValidateAndMap};

/// A default value together with the knowledge of whether it was given.
pub trait Zeroable<V> {
    fn value(&self) -> V;

    /// True when no value was supplied.
    fn is_zero(&self) -> bool;
}

/// Scalar default: not supplied when equal to `V::default()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scalar<V>(pub V);

impl<V: Clone + Default + PartialEq> Zeroable<V> for Scalar<V> {
    fn value(&self) -> V {
        self.0.clone()
    }

    fn is_zero(&self) -> bool {
        self.0 == V::default()
    }
}

/// Sequence default: not supplied when empty.
///
/// A sequence holding only empty strings is still supplied and goes through
/// validation like any other value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence<T>(pub Vec<T>);

impl<T: Clone> Zeroable<Vec<T>> for Sequence<T> {
    fn value(&self) -> Vec<T> {
        self.0.clone()
    }

    fn is_zero(&self) -> bool {
        self.0.is_empty()
    }
}

type PromptFn<V> = Box<dyn Fn(&StreamContext) -> Result<V>>;

pub struct InputSourceSwitch<V, T> {
    default: Box<dyn Zeroable<V>>,
    prompt: Option<PromptFn<V>>,
    validate_and_map: ValidateAndMap<V, T>,
    err_message: Option<String>,
    resolved: OnceCell<Result<T>>,
}

impl<V: 'static, T: Clone> InputSourceSwitch<V, T> {
    pub fn new<Z, F>(default: Z, validate_and_map: F) -> Self
    where
        Z: Zeroable<V> + 'static,
        F: Fn(V) -> Result<T> + Send + Sync + 'static,
    {
        Self::with_validator(default, Arc::new(validate_and_map))
    }

    /// Same as [`InputSourceSwitch::new`], for an already shared validator.
    pub fn with_validator<Z>(default: Z, validate_and_map: ValidateAndMap<V, T>) -> Self
    where
        Z: Zeroable<V> + 'static,
    {
        Self {
            default: Box::new(default),
            prompt: None,
            validate_and_map,
            err_message: None,
            resolved: OnceCell::new(),
        }
    }

    /// Builds the widget asked when no default was given.
    pub fn with_prompt<P, F>(mut self, build: F) -> Self
    where
        P: InputPrompt<V>,
        F: Fn() -> Result<P> + 'static,
    {
        self.prompt = Some(Box::new(move |ctx: &StreamContext| build()?.get_input(ctx)));
        self
    }

    /// Prefix for every failure, rendered as `"<message>: <reason>"`.
    pub fn with_err_message(mut self, message: impl Into<String>) -> Self {
        self.err_message = Some(message.into());
        self
    }

    /// Resolves the value, prompting at most once.
    ///
    /// A supplied default always wins over the prompt, even when it fails
    /// validation. Without a default, a non-interactive context fails with
    /// [`Error::NotSet`]. Once resolved, the same outcome is returned on
    /// every call. A prompt that fails (for instance because the user
    /// interrupted it) leaves the switch unresolved.
    pub fn get_value(&self, ctx: &StreamContext) -> Result<T> {
        if let Some(outcome) = self.settle(ctx) {
            return outcome;
        }
        let Some(prompt) = &self.prompt else {
            log::debug!("No default and no prompt configured, value is not set");
            return self.resolve_with(Err(Error::NotSet));
        };
        let input = prompt(ctx)?;
        self.resolve_with((self.validate_and_map)(input))
    }

    /// Fails fast without rendering anything.
    ///
    /// Reports the outcome of the default when one was given, and
    /// [`Error::NotSet`] on a non-interactive context. Otherwise the value
    /// still has to be asked for and this succeeds.
    pub fn validate(&self, ctx: &StreamContext) -> Result<()> {
        match self.settle(ctx) {
            Some(outcome) => outcome.map(|_| ()),
            None => Ok(()),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    fn settle(&self, ctx: &StreamContext) -> Option<Result<T>> {
        if let Some(outcome) = self.resolved.get() {
            return Some(outcome.clone());
        }
        if !self.default.is_zero() {
            log::trace!("Resolving value from the supplied default");
            return Some(self.resolve_with((self.validate_and_map)(self.default.value())));
        }
        if !ctx.is_interactive() {
            return Some(self.resolve_with(Err(Error::NotSet)));
        }
        None
    }

    fn resolve_with(&self, outcome: Result<T>) -> Result<T> {
        let outcome = outcome.map_err(|err| self.wrap(err));
        self.resolved.get_or_init(|| outcome).clone()
    }

    fn wrap(&self, err: Error) -> Error {
        match &self.err_message {
            Some(message) if !err.is_interrupted() => err.with_context(message),
            _ => err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConsoleConfig;
    use crate::error::FieldError;
    use crate::terminal::TerminalEvent;
    use crate::validation::required;
    use crate::widget::TextInput;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn non_interactive() -> StreamContext {
        StreamContext::non_interactive(std::io::sink(), ConsoleConfig::default())
    }

    fn scripted(keys: &[KeyCode]) -> StreamContext {
        let (tx, rx) = crossbeam_channel::unbounded();
        for code in keys {
            tx.send(TerminalEvent::Key(KeyEvent::new(*code, KeyModifiers::NONE))).unwrap();
        }
        StreamContext::scripted(rx, std::io::sink(), (80, 24), ConsoleConfig::default())
    }

    fn counting_required(
        calls: Arc<AtomicUsize>,
    ) -> impl Fn(String) -> Result<String> + Send + Sync + 'static {
        move |text| {
            calls.fetch_add(1, Ordering::SeqCst);
            required(text)
        }
    }

    #[test]
    fn test_default_wins_and_is_memoized() {
        let calls = Arc::new(AtomicUsize::new(0));
        let switch = InputSourceSwitch::new(
            Scalar("svc".to_string()),
            counting_required(calls.clone()),
        );
        let ctx = non_interactive();

        assert_eq!(switch.get_value(&ctx).unwrap(), "svc");
        assert_eq!(switch.get_value(&ctx).unwrap(), "svc");
        assert!(switch.validate(&ctx).is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalid_default_is_not_overridden_by_prompt() {
        let switch = InputSourceSwitch::new(Scalar("   ".to_string()), required)
            .with_prompt(|| Ok(TextInput::new("Name")));
        // whitespace is not the zero value, so it is validated instead of asked
        let err = switch.get_value(&scripted(&[KeyCode::Char('x'), KeyCode::Enter])).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_not_set_when_non_interactive() {
        let switch = InputSourceSwitch::new(Scalar(String::new()), required)
            .with_prompt(|| -> Result<TextInput> { panic!("prompt must not be built") });
        let ctx = non_interactive();

        assert!(switch.validate(&ctx).unwrap_err().is_not_set());
        assert!(switch.get_value(&ctx).unwrap_err().is_not_set());
        assert!(switch.is_resolved());
    }

    #[test]
    fn test_err_message_prefers_field_message() {
        let switch = InputSourceSwitch::new(Scalar("bad".to_string()), |_: String| -> Result<String> {
            Err(FieldError::for_field("name", "must be lowercase").into())
        })
        .with_err_message("invalid tenant name");

        let err = switch.get_value(&non_interactive()).unwrap_err();
        assert_eq!(err.to_string(), "invalid tenant name: must be lowercase");
        assert!(err.is_validation());
    }

    #[test]
    fn test_not_set_is_rewrapped() {
        let switch =
            InputSourceSwitch::new(Scalar(String::new()), required).with_err_message("name");
        let err = switch.get_value(&non_interactive()).unwrap_err();
        assert_eq!(err.to_string(), "name: value is not set");
        assert!(err.is_not_set());
    }

    #[test]
    fn test_sequence_of_blank_strings_is_supplied() {
        assert!(Sequence::<String>(vec![]).is_zero());
        assert!(!Sequence(vec![String::new()]).is_zero());

        let switch = InputSourceSwitch::new(Sequence(vec![" ".to_string()]), |items: Vec<String>| {
            if items.iter().all(|item| item.trim().is_empty()) {
                return Err(Error::invalid("empty input"));
            }
            Ok(items)
        });
        assert!(switch.get_value(&non_interactive()).unwrap_err().is_validation());
    }

    #[test]
    fn test_validate_does_not_prompt_when_interactive() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = built.clone();
        let switch = InputSourceSwitch::new(Scalar(String::new()), required).with_prompt(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(TextInput::new("Name"))
        });

        assert!(switch.validate(&scripted(&[])).is_ok());
        assert!(!switch.is_resolved());
        assert_eq!(built.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_prompts_when_interactive() {
        let switch = InputSourceSwitch::new(Scalar(String::new()), required)
            .with_prompt(|| Ok(TextInput::new("Name")));
        let ctx = scripted(&[
            KeyCode::Char('s'),
            KeyCode::Char('v'),
            KeyCode::Char('c'),
            KeyCode::Enter,
        ]);

        assert_eq!(switch.get_value(&ctx).unwrap(), "svc");
        assert_eq!(switch.get_value(&ctx).unwrap(), "svc");
    }

    #[test]
    fn test_interrupted_prompt_is_not_rewrapped() {
        let switch = InputSourceSwitch::new(Scalar(String::new()), required)
            .with_prompt(|| Ok(TextInput::new("Name")))
            .with_err_message("name");
        let err = switch.get_value(&scripted(&[KeyCode::Esc])).unwrap_err();
        assert!(matches!(err, Error::Interrupted));
        assert!(!switch.is_resolved());
    }
}
