//! Single line editor shared by the text based widgets.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::constants::glyphs;
use crate::style::Styles;

#[derive(Debug, Clone, Default)]
pub(crate) struct TextField {
    chars: Vec<char>,
    cursor: usize,
    placeholder: String,
    suggestions: Vec<String>,
    matched: Vec<usize>,
    selected: usize,
}

impl TextField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    pub fn value(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn set_value(&mut self, value: &str) {
        self.chars = value.chars().collect();
        self.cursor = self.chars.len();
        self.update_matches();
    }

    pub fn set_suggestions(&mut self, suggestions: Vec<String>) {
        self.suggestions = suggestions;
        self.update_matches();
    }

    pub fn matched_suggestions(&self) -> Vec<&str> {
        self.matched.iter().map(|&i| self.suggestions[i].as_str()).collect()
    }

    pub fn current_suggestion(&self) -> Option<&str> {
        self.matched.get(self.selected).map(|&i| self.suggestions[i].as_str())
    }

    /// Applies an editing key. Returns true when the value changed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let before = self.chars.clone();
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::Char('e') if ctrl => self.cursor = self.chars.len(),
            KeyCode::Char('u') if ctrl => {
                self.chars.drain(..self.cursor);
                self.cursor = 0;
            }
            KeyCode::Char('k') if ctrl => self.chars.truncate(self.cursor),
            KeyCode::Char('w') if ctrl => self.delete_word_backward(),
            KeyCode::Char('n') if ctrl => self.next_suggestion(),
            KeyCode::Char('p') if ctrl => self.previous_suggestion(),
            KeyCode::Char(c) if !ctrl => {
                self.chars.insert(self.cursor, c);
                self.cursor += 1;
            }
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.chars.remove(self.cursor);
            }
            KeyCode::Delete if self.cursor < self.chars.len() => {
                self.chars.remove(self.cursor);
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.chars.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.chars.len(),
            KeyCode::Tab => {
                if let Some(suggestion) = self.current_suggestion().map(str::to_string) {
                    self.set_value(&suggestion);
                }
            }
            KeyCode::Down => self.next_suggestion(),
            KeyCode::Up => self.previous_suggestion(),
            _ => {}
        }
        let changed = before != self.chars;
        if changed {
            self.update_matches();
        }
        changed
    }

    pub fn view(&self, styles: &Styles) -> String {
        let mut out = String::from(glyphs::POINTER);
        if self.chars.is_empty() && !self.placeholder.is_empty() {
            let mut placeholder = self.placeholder.chars();
            let first = placeholder.next().map(String::from).unwrap_or_default();
            out.push_str(&styles.paint(&styles.cursor, &first));
            out.push_str(&styles.paint(&styles.suggestion, placeholder.as_str()));
            return out;
        }

        let before: String = self.chars[..self.cursor].iter().collect();
        out.push_str(&before);
        let completion = self.completion();
        match self.chars.get(self.cursor) {
            Some(c) => {
                out.push_str(&styles.paint(&styles.cursor, &c.to_string()));
                let after: String = self.chars[self.cursor + 1..].iter().collect();
                out.push_str(&after);
                out.push_str(&styles.paint(&styles.suggestion, &completion));
            }
            None => {
                let mut rest = completion.chars();
                let under_cursor = rest.next().map(String::from).unwrap_or_else(|| " ".into());
                out.push_str(&styles.paint(&styles.cursor, &under_cursor));
                out.push_str(&styles.paint(&styles.suggestion, rest.as_str()));
            }
        }
        out
    }

    /// Remainder of the highlighted suggestion past the typed value.
    fn completion(&self) -> String {
        match self.current_suggestion() {
            Some(suggestion) => suggestion.chars().skip(self.chars.len()).collect(),
            None => String::new(),
        }
    }

    fn update_matches(&mut self) {
        let value = self.value().to_lowercase();
        self.selected = 0;
        if value.is_empty() {
            self.matched.clear();
            return;
        }
        self.matched = self
            .suggestions
            .iter()
            .enumerate()
            .filter(|(_, suggestion)| suggestion.to_lowercase().starts_with(&value))
            .map(|(i, _)| i)
            .collect();
    }

    fn next_suggestion(&mut self) {
        if !self.matched.is_empty() {
            self.selected = (self.selected + 1) % self.matched.len();
        }
    }

    fn previous_suggestion(&mut self) {
        if !self.matched.is_empty() {
            self.selected = (self.selected + self.matched.len() - 1) % self.matched.len();
        }
    }

    fn delete_word_backward(&mut self) {
        let mut start = self.cursor;
        while start > 0 && self.chars[start - 1].is_whitespace() {
            start -= 1;
        }
        while start > 0 && !self.chars[start - 1].is_whitespace() {
            start -= 1;
        }
        self.chars.drain(start..self.cursor);
        self.cursor = start;
    }
}
