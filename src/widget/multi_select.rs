use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};

use crate::constants::{glyphs, validation};
use crate::error::Result;
use crate::stream::StreamContext;
use crate::style::Styles;
use crate::widget::list::{FilterList, ListAction, ListItem};
use crate::widget::{
    downcast, echo, error_line, identity, Flow, InputModel, InputPrompt, Outcome, ValidateAndMap,
};

const HELP: &str = "↑/↓ navigate • space toggle • / filter • enter submit • esc quit";

/// Picks any number of values out of a filterable list.
///
/// The selection is validated on every toggle so a rule like "at least one"
/// is reported before the user tries to submit.
pub struct MultiSelect<T = Vec<String>> {
    pub prompt: String,
    pub items: Vec<String>,
    pub validate_and_map: ValidateAndMap<Vec<String>, T>,
}

impl MultiSelect<Vec<String>> {
    pub fn new(prompt: impl Into<String>, items: Vec<String>) -> Self {
        Self { prompt: prompt.into(), items, validate_and_map: identity() }
    }
}

impl<T: Send + 'static> MultiSelect<T> {
    pub fn with_validate_and_map<U, F>(self, f: F) -> MultiSelect<U>
    where
        F: Fn(Vec<String>) -> Result<U> + Send + Sync + 'static,
    {
        MultiSelect { prompt: self.prompt, items: self.items, validate_and_map: Arc::new(f) }
    }

    pub(crate) fn model(&self, page_size: usize) -> MultiSelectModel<T> {
        let items = self.items.iter().cloned().map(ListItem::Plain).collect();
        MultiSelectModel {
            prompt: self.prompt.clone(),
            list: FilterList::new(items, page_size),
            checked: vec![false; self.items.len()],
            validate_and_map: self.validate_and_map.clone(),
            outcome: Outcome::default(),
        }
    }
}

impl<T: Send + 'static> InputPrompt<T> for MultiSelect<T> {
    fn get_input(&self, ctx: &StreamContext) -> Result<T> {
        let model = ctx.execute(Box::new(self.model(ctx.config().list_page_size)))?;
        downcast::<MultiSelectModel<T>>(model)?.outcome.into_result()
    }
}

pub(crate) struct MultiSelectModel<T> {
    prompt: String,
    list: FilterList,
    checked: Vec<bool>,
    validate_and_map: ValidateAndMap<Vec<String>, T>,
    outcome: Outcome<T>,
}

impl<T> MultiSelectModel<T> {
    /// Checked values in item order.
    fn selection(&self) -> Vec<String> {
        self.list
            .items()
            .iter()
            .zip(&self.checked)
            .filter(|(_, &checked)| checked)
            .map(|(item, _)| item.value().to_string())
            .collect()
    }

    fn toggle_highlighted(&mut self) {
        let Some(index) = self.list.highlighted() else {
            return;
        };
        self.checked[index] = !self.checked[index];
        let selection = self.selection();
        self.outcome.err = (self.validate_and_map)(selection).err();
    }

    fn submit(&mut self) -> Flow {
        match (self.validate_and_map)(self.selection()) {
            Ok(value) => self.outcome.accept(value),
            Err(err) => {
                log::debug!("Rejected selection: {err}");
                self.outcome.err = Some(err);
                Flow::Continue
            }
        }
    }
}

impl<T: Send + 'static> InputModel for MultiSelectModel<T> {
    fn resize(&mut self, _width: u16, height: u16) {
        self.list.resize(height);
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        match self.list.handle_key(key) {
            ListAction::Interrupt => self.outcome.interrupt(),
            ListAction::Submit => self.submit(),
            ListAction::Ignored(key) if key.code == KeyCode::Char(' ') => {
                self.toggle_highlighted();
                Flow::Continue
            }
            ListAction::Handled | ListAction::Ignored(_) => Flow::Continue,
        }
    }

    fn view(&self, styles: &Styles) -> String {
        if self.outcome.quitting {
            return String::new();
        }
        let items = self.list.items();
        let render = |_pos: usize, index: usize, highlighted: bool| {
            let mark = if self.checked[index] { glyphs::CHECKED } else { glyphs::UNCHECKED };
            let text = format!("{mark}{}", items[index].display_value());
            if highlighted {
                styles.paint(&styles.selected_item, &format!("> {text}"))
            } else {
                styles.paint(&styles.item, &format!("  {text}"))
            }
        };
        let mut lines = vec![styles.paint(&styles.title, &self.prompt)];
        lines.extend(self.list.view_lines(styles, HELP, &render));
        let err = error_line(styles, &self.outcome.err);
        if !err.is_empty() {
            lines.push(err);
        }
        lines.join("\n")
    }

    fn transcript(&self) -> Option<String> {
        if !self.outcome.is_accepted() {
            return None;
        }
        let selection = self.selection();
        let shown = if selection.is_empty() {
            validation::NOTHING_SELECTED.to_string()
        } else {
            selection.join(", ")
        };
        Some(echo(&self.prompt, &shown))
    }

    fn interrupt(&mut self) {
        self.outcome.interrupt();
    }

    fn into_any(self: Box<Self>) -> Box<dyn std::any::Any + Send> {
        self
    }
}
