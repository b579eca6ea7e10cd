use crossterm::event::KeyEvent;

use crate::error::{Error, Result};
use crate::stream::StreamContext;
use crate::style::Styles;
use crate::widget::list::{FilterList, ListAction, ListItem};
use crate::widget::{downcast, echo, Flow, InputModel, InputPrompt, Outcome};

const HELP: &str = "↑/↓ navigate • / filter • enter submit • esc quit";

/// Picks one value out of a filterable list.
#[derive(Debug, Clone, Default)]
pub struct SingleSelect {
    pub prompt: String,
    pub items: Vec<String>,
    /// Labels shown instead of `items`, index for index.
    pub displayed_items: Option<Vec<String>>,
    pub preselected: Option<String>,
}

impl SingleSelect {
    pub fn new(prompt: impl Into<String>, items: Vec<String>) -> Self {
        Self { prompt: prompt.into(), items, ..Default::default() }
    }

    pub fn with_displayed_items(mut self, labels: Vec<String>) -> Self {
        self.displayed_items = Some(labels);
        self
    }

    pub fn with_preselected(mut self, value: impl Into<String>) -> Self {
        self.preselected = Some(value.into());
        self
    }

    pub(crate) fn model(&self, page_size: usize) -> Result<SingleSelectModel> {
        let items = match &self.displayed_items {
            Some(labels) if labels.len() != self.items.len() => {
                return Err(Error::invalid(format!(
                    "{} labels given for {} items",
                    labels.len(),
                    self.items.len()
                )))
            }
            Some(labels) => self
                .items
                .iter()
                .zip(labels)
                .map(|(value, label)| ListItem::Labelled { value: value.clone(), label: label.clone() })
                .collect(),
            None => self.items.iter().cloned().map(ListItem::Plain).collect(),
        };
        let mut list = FilterList::new(items, page_size);
        if let Some(preselected) = &self.preselected {
            list.highlight_value(preselected);
        }
        Ok(SingleSelectModel { prompt: self.prompt.clone(), list, outcome: Outcome::default() })
    }
}

impl InputPrompt<String> for SingleSelect {
    fn get_input(&self, ctx: &StreamContext) -> Result<String> {
        let model = self.model(ctx.config().list_page_size)?;
        let model = ctx.execute(Box::new(model))?;
        downcast::<SingleSelectModel>(model)?.outcome.into_result()
    }
}

pub(crate) struct SingleSelectModel {
    prompt: String,
    list: FilterList,
    outcome: Outcome<String>,
}

impl InputModel for SingleSelectModel {
    fn resize(&mut self, _width: u16, height: u16) {
        self.list.resize(height);
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        match self.list.handle_key(key) {
            ListAction::Interrupt => self.outcome.interrupt(),
            ListAction::Submit => match self.list.highlighted() {
                Some(index) => {
                    let value = self.list.items()[index].value().to_string();
                    self.outcome.accept(value)
                }
                None => Flow::Continue,
            },
            ListAction::Handled | ListAction::Ignored(_) => Flow::Continue,
        }
    }

    fn view(&self, styles: &Styles) -> String {
        if self.outcome.quitting {
            return String::new();
        }
        let items = self.list.items();
        let render = |pos: usize, index: usize, highlighted: bool| {
            let text = format!("{}. {}", pos + 1, items[index].display_value());
            if highlighted {
                styles.paint(&styles.selected_item, &format!("> {text}"))
            } else {
                styles.paint(&styles.item, &format!("  {text}"))
            }
        };
        let mut lines = vec![styles.paint(&styles.title, &self.prompt)];
        lines.extend(self.list.view_lines(styles, HELP, &render));
        lines.join("\n")
    }

    fn transcript(&self) -> Option<String> {
        if !self.outcome.is_accepted() {
            return None;
        }
        let value = self.outcome.value.as_deref()?;
        let shown = self
            .list
            .items()
            .iter()
            .find(|item| item.value() == value)
            .map_or(value, ListItem::display_value);
        Some(echo(&self.prompt, shown))
    }

    fn interrupt(&mut self) {
        self.outcome.interrupt();
    }

    fn into_any(self: Box<Self>) -> Box<dyn std::any::Any + Send> {
        self
    }
}

#[cfg(test)]
impl SingleSelectModel {
    fn is_filtering(&self) -> bool {
        self.list.state() == crate::widget::list::FilterState::Filtering
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn select(items: &[&str]) -> SingleSelect {
        SingleSelect::new("Environment", items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn enter_while_filtering_narrows_without_submitting() {
        let mut model = select(&["dev", "prod", "predev"]).model(10).unwrap();
        model.handle_key(key(KeyCode::Char('/')));
        for c in "pred".chars() {
            model.handle_key(key(KeyCode::Char(c)));
        }
        assert!(model.is_filtering());
        assert_eq!(model.handle_key(key(KeyCode::Enter)), Flow::Continue);
        assert!(!model.is_filtering());
        assert_eq!(model.handle_key(key(KeyCode::Enter)), Flow::Complete);
        assert_eq!(model.outcome.into_result().unwrap(), "predev");
    }

    #[test]
    fn preselected_item_is_highlighted() {
        let mut model = select(&["dev", "prod"]).with_preselected("prod").model(10).unwrap();
        let styles = Styles::plain();
        assert!(model.view(&styles).contains("> 2. prod"));
        model.handle_key(key(KeyCode::Enter));
        assert_eq!(model.transcript().as_deref(), Some("Environment\n> prod"));
    }

    #[test]
    fn labels_are_displayed_but_values_submitted() {
        let select = select(&["t1", "t2"])
            .with_displayed_items(vec!["Small".into(), "Large".into()]);
        let mut model = select.model(10).unwrap();
        let styles = Styles::plain();
        let view = model.view(&styles);
        assert!(view.contains("1. Small"));
        assert!(!view.contains("t1"));

        model.handle_key(key(KeyCode::Down));
        model.handle_key(key(KeyCode::Enter));
        assert_eq!(model.transcript().as_deref(), Some("Environment\n> Large"));
        assert_eq!(model.outcome.into_result().unwrap(), "t2");
    }

    #[test]
    fn mismatched_labels_are_rejected() {
        let select = select(&["t1", "t2"]).with_displayed_items(vec!["Small".into()]);
        assert!(select.model(10).is_err());
    }

    #[test]
    fn escape_interrupts() {
        let mut model = select(&["dev"]).model(10).unwrap();
        assert_eq!(model.handle_key(key(KeyCode::Esc)), Flow::Complete);
        assert!(model.outcome.into_result().unwrap_err().is_interrupted());
    }

    #[test]
    fn enter_on_empty_list_does_nothing() {
        let mut model = select(&[]).model(10).unwrap();
        assert_eq!(model.handle_key(key(KeyCode::Enter)), Flow::Continue);
        assert!(model.view(&Styles::plain()).contains("No items."));
    }
}
