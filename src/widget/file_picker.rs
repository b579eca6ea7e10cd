use std::path::PathBuf;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};

use crate::error::Result;
use crate::ext::{expand_path, generate_suggestions};
use crate::stream::StreamContext;
use crate::style::Styles;
use crate::terminal::is_interrupt;
use crate::widget::text_field::TextField;
use crate::widget::{
    downcast, echo, error_line, identity, Flow, InputModel, InputPrompt, Outcome, ValidateAndMap,
};

const INITIAL_VALUE: &str = "./";
const HELP: &str = "tab complete • ↑/↓ cycle suggestions • enter submit • esc quit";

/// Path prompt with directory completion.
///
/// The typed value is expanded on every keystroke; validation sees the
/// expanded path, never the raw text.
pub struct FilePicker<T = String> {
    pub prompt: String,
    pub working_dir: PathBuf,
    pub initial_value: String,
    pub validate_and_map: ValidateAndMap<String, T>,
}

impl FilePicker<String> {
    pub fn new(prompt: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            prompt: prompt.into(),
            working_dir: working_dir.into(),
            initial_value: INITIAL_VALUE.to_string(),
            validate_and_map: identity(),
        }
    }
}

impl<T: Send + 'static> FilePicker<T> {
    pub fn with_initial_value(mut self, value: impl Into<String>) -> Self {
        self.initial_value = value.into();
        self
    }

    pub fn with_validate_and_map<U, F>(self, f: F) -> FilePicker<U>
    where
        F: Fn(String) -> Result<U> + Send + Sync + 'static,
    {
        FilePicker {
            prompt: self.prompt,
            working_dir: self.working_dir,
            initial_value: self.initial_value,
            validate_and_map: Arc::new(f),
        }
    }

    pub(crate) fn model(&self, home: Option<PathBuf>) -> FilePickerModel<T> {
        let mut model = FilePickerModel {
            prompt: self.prompt.clone(),
            working_dir: self.working_dir.clone(),
            home,
            field: TextField::new(),
            expanded: String::new(),
            validate_and_map: self.validate_and_map.clone(),
            outcome: Outcome::default(),
        };
        model.field.set_value(&self.initial_value);
        model.refresh();
        model
    }
}

impl<T: Send + 'static> InputPrompt<T> for FilePicker<T> {
    fn get_input(&self, ctx: &StreamContext) -> Result<T> {
        let model = ctx.execute(Box::new(self.model(dirs::home_dir())))?;
        downcast::<FilePickerModel<T>>(model)?.outcome.into_result()
    }
}

pub(crate) struct FilePickerModel<T> {
    prompt: String,
    working_dir: PathBuf,
    home: Option<PathBuf>,
    field: TextField,
    expanded: String,
    validate_and_map: ValidateAndMap<String, T>,
    outcome: Outcome<T>,
}

impl<T> FilePickerModel<T> {
    fn refresh(&mut self) {
        let value = self.field.value();
        self.expanded = expand_path(&self.working_dir, &value, self.home.as_deref());
        self.field.set_suggestions(generate_suggestions(&value, &self.expanded));
    }
}

impl<T: Send + 'static> InputModel for FilePickerModel<T> {
    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if is_interrupt(&key) || key.code == KeyCode::Esc {
            return self.outcome.interrupt();
        }
        if key.code == KeyCode::Enter {
            return match (self.validate_and_map)(self.expanded.clone()) {
                Ok(value) => self.outcome.accept(value),
                Err(err) => {
                    log::debug!("Rejected path '{}': {err}", self.expanded);
                    self.outcome.err = Some(err);
                    Flow::Continue
                }
            };
        }
        if self.field.handle_key(key) {
            self.outcome.err = None;
            self.refresh();
        }
        Flow::Continue
    }

    fn view(&self, styles: &Styles) -> String {
        if self.outcome.quitting {
            return String::new();
        }
        let mut lines = vec![
            styles.paint(&styles.title, &self.prompt),
            self.field.view(styles),
            styles.paint(&styles.help, &format!("→ {}", self.expanded)),
        ];
        let err = error_line(styles, &self.outcome.err);
        if !err.is_empty() {
            lines.push(err);
        }
        lines.push(styles.paint(&styles.help, HELP));
        lines.join("\n")
    }

    fn transcript(&self) -> Option<String> {
        self.outcome.is_accepted().then(|| echo(&self.prompt, &self.expanded))
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
    use crate::error::Error;
    use crossterm::event::KeyModifiers;
    use std::fs;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text<M: InputModel>(model: &mut M, text: &str) {
        for c in text.chars() {
            model.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn starts_in_working_dir_with_suggestions() {
        let work = tempfile::tempdir().unwrap();
        fs::create_dir(work.path().join("charts")).unwrap();
        let model = FilePicker::new("Directory", work.path()).model(None);
        assert_eq!(model.expanded, format!("{}/", work.path().display()));
        assert_eq!(model.field.matched_suggestions(), vec!["./charts/"]);
    }

    #[test]
    fn tab_completes_and_expansion_follows() {
        let work = tempfile::tempdir().unwrap();
        fs::create_dir(work.path().join("charts")).unwrap();
        let mut model = FilePicker::new("Directory", work.path()).model(None);
        type_text(&mut model, "ch");
        model.handle_key(key(KeyCode::Tab));
        assert_eq!(model.field.value(), "./charts/");
        assert_eq!(model.expanded, format!("{}/charts/", work.path().display()));
    }

    #[test]
    fn enter_validates_expanded_path() {
        let home = tempfile::tempdir().unwrap();
        let picker = FilePicker::new("Directory", "/")
            .with_initial_value("")
            .with_validate_and_map(|path: String| Ok(PathBuf::from(path)));
        let mut model = picker.model(Some(home.path().to_path_buf()));
        type_text(&mut model, "~/proj");
        assert_eq!(model.handle_key(key(KeyCode::Enter)), Flow::Complete);
        let expected = format!("{}/proj", home.path().display());
        assert_eq!(model.transcript(), Some(format!("Directory\n> {expected}")));
        assert_eq!(model.outcome.into_result().unwrap(), PathBuf::from(expected));
    }

    #[test]
    fn validation_error_keeps_picker_open() {
        let work = tempfile::tempdir().unwrap();
        let picker = FilePicker::new("File", work.path()).with_validate_and_map(|path: String| {
            if path.ends_with('/') {
                Err(Error::invalid("directory is not expected"))
            } else {
                Ok(path)
            }
        });
        let mut model = picker.model(None);
        assert_eq!(model.handle_key(key(KeyCode::Enter)), Flow::Continue);
        assert!(model.view(&Styles::plain()).contains("Error: directory is not expected"));

        type_text(&mut model, "x");
        assert!(!model.view(&Styles::plain()).contains("Error"));
    }

    #[test]
    fn interrupt_is_not_a_validation_error() {
        let work = tempfile::tempdir().unwrap();
        let mut model = FilePicker::new("File", work.path()).model(None);
        type_text(&mut model, "partial");
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        model.handle_key(ctrl_c);
        assert!(matches!(model.outcome.into_result(), Err(Error::Interrupted)));
    }
}
