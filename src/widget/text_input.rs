use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};

use crate::error::Result;
use crate::stream::StreamContext;
use crate::style::Styles;
use crate::terminal::is_interrupt;
use crate::widget::text_field::TextField;
use crate::widget::{
    downcast, echo, error_line, identity, Flow, InputModel, InputPrompt, Outcome, ValidateAndMap,
};

/// Free text prompt whose value is validated and mapped on Enter.
pub struct TextInput<T = String> {
    pub prompt: String,
    pub placeholder: String,
    pub initial_value: String,
    pub validate_and_map: ValidateAndMap<String, T>,
}

impl TextInput<String> {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            placeholder: String::new(),
            initial_value: String::new(),
            validate_and_map: identity(),
        }
    }
}

impl<T> TextInput<T> {
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_initial_value(mut self, value: impl Into<String>) -> Self {
        self.initial_value = value.into();
        self
    }

    pub fn with_validate_and_map<U, F>(self, f: F) -> TextInput<U>
    where
        F: Fn(String) -> Result<U> + Send + Sync + 'static,
    {
        TextInput {
            prompt: self.prompt,
            placeholder: self.placeholder,
            initial_value: self.initial_value,
            validate_and_map: Arc::new(f),
        }
    }
}

impl<T: Send + 'static> TextInput<T> {
    pub(crate) fn model(&self) -> TextInputModel<T> {
        let mut field = TextField::new().with_placeholder(&self.placeholder);
        field.set_value(&self.initial_value);
        TextInputModel {
            prompt: self.prompt.clone(),
            field,
            validate_and_map: self.validate_and_map.clone(),
            outcome: Outcome::default(),
            accepted_text: String::new(),
        }
    }
}

impl<T: Send + 'static> InputPrompt<T> for TextInput<T> {
    fn get_input(&self, ctx: &StreamContext) -> Result<T> {
        let model = ctx.execute(Box::new(self.model()))?;
        downcast::<TextInputModel<T>>(model)?.into_result()
    }
}

pub(crate) struct TextInputModel<T> {
    prompt: String,
    field: TextField,
    validate_and_map: ValidateAndMap<String, T>,
    outcome: Outcome<T>,
    accepted_text: String,
}

impl<T> TextInputModel<T> {
    pub fn into_result(self) -> Result<T> {
        self.outcome.into_result()
    }
}

impl<T: Send + 'static> InputModel for TextInputModel<T> {
    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if is_interrupt(&key) || key.code == KeyCode::Esc {
            return self.outcome.interrupt();
        }
        if key.code == KeyCode::Enter {
            let raw = self.field.value();
            return match (self.validate_and_map)(raw.clone()) {
                Ok(value) => {
                    self.accepted_text = raw;
                    self.outcome.accept(value)
                }
                Err(err) => {
                    log::debug!("Rejected input '{raw}': {err}");
                    self.outcome.err = Some(err);
                    Flow::Continue
                }
            };
        }
        if self.field.handle_key(key) {
            self.outcome.err = None;
        }
        Flow::Continue
    }

    fn view(&self, styles: &Styles) -> String {
        if self.outcome.quitting {
            return String::new();
        }
        let mut lines = vec![styles.paint(&styles.title, &self.prompt), self.field.view(styles)];
        let err = error_line(styles, &self.outcome.err);
        if !err.is_empty() {
            lines.push(err);
        }
        lines.join("\n")
    }

    fn transcript(&self) -> Option<String> {
        self.outcome.is_accepted().then(|| echo(&self.prompt, &self.accepted_text))
    }

    fn interrupt(&mut self) {
        self.outcome.interrupt();
    }

    fn into_any(self: Box<Self>) -> Box<dyn std::any::Any + Send> {
        self
    }
}
