use crossterm::event::{KeyCode, KeyEvent};

use crate::error::Result;
use crate::stream::StreamContext;
use crate::style::Styles;
use crate::terminal::is_interrupt;
use crate::widget::{downcast, Flow, InputModel, InputPrompt, Outcome};

/// Yes/no question answered with a single key.
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub question: String,
    pub default: bool,
}

impl Confirmation {
    pub fn new(question: impl Into<String>, default: bool) -> Self {
        Self { question: question.into(), default }
    }

    pub(crate) fn model(&self) -> ConfirmationModel {
        ConfirmationModel {
            question: self.question.clone(),
            default: self.default,
            outcome: Outcome::default(),
        }
    }
}

impl InputPrompt<bool> for Confirmation {
    fn get_input(&self, ctx: &StreamContext) -> Result<bool> {
        let model = ctx.execute(Box::new(self.model()))?;
        downcast::<ConfirmationModel>(model)?.outcome.into_result()
    }
}

pub(crate) struct ConfirmationModel {
    question: String,
    default: bool,
    outcome: Outcome<bool>,
}

impl InputModel for ConfirmationModel {
    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if is_interrupt(&key) {
            return self.outcome.interrupt();
        }
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => self.outcome.accept(true),
            KeyCode::Char('n') | KeyCode::Char('N') => self.outcome.accept(false),
            KeyCode::Enter => self.outcome.accept(self.default),
            KeyCode::Esc => self.outcome.interrupt(),
            _ => Flow::Continue,
        }
    }

    fn view(&self, styles: &Styles) -> String {
        if self.outcome.quitting {
            return String::new();
        }
        let hint = if self.default { "(Y/n)" } else { "(y/N)" };
        format!(
            "{} {}",
            styles.paint(&styles.title, &self.question),
            styles.paint(&styles.help, hint)
        )
    }

    fn transcript(&self) -> Option<String> {
        if !self.outcome.is_accepted() {
            return None;
        }
        let answer = if self.outcome.value? { "yes" } else { "no" };
        Some(format!("{} -> {answer}", self.question))
    }

    fn interrupt(&mut self) {
        self.outcome.interrupt();
    }

    fn into_any(self: Box<Self>) -> Box<dyn std::any::Any + Send> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn keys_answer_the_question() {
        let cases = [
            (KeyCode::Char('y'), false, true),
            (KeyCode::Char('N'), true, false),
            (KeyCode::Enter, true, true),
            (KeyCode::Enter, false, false),
        ];
        for (code, default, expected) in cases {
            let mut model = Confirmation::new("Continue?", default).model();
            assert_eq!(model.handle_key(key(code)), Flow::Complete);
            assert_eq!(model.outcome.into_result().unwrap(), expected);
        }
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut model = Confirmation::new("Continue?", true).model();
        assert_eq!(model.handle_key(key(KeyCode::Char('x'))), Flow::Continue);
        assert_eq!(model.view(&Styles::plain()), "Continue? (Y/n)");
    }

    #[test]
    fn echo_records_answer() {
        let mut model = Confirmation::new("Quit?", false).model();
        model.handle_key(key(KeyCode::Char('y')));
        assert_eq!(model.transcript().as_deref(), Some("Quit? -> yes"));
    }

    #[test]
    fn escape_interrupts() {
        let mut model = Confirmation::new("Quit?", false).model();
        model.handle_key(key(KeyCode::Esc));
        assert!(model.transcript().is_none());
        assert!(model.outcome.into_result().unwrap_err().is_interrupted());
    }
}
