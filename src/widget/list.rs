//! Filterable list shared by [`super::SingleSelect`] and [`super::MultiSelect`].

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::style::Styles;
use crate::terminal::is_interrupt;

/// An entry of a selectable list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListItem {
    /// Shown and filtered by its value.
    Plain(String),
    /// Shown and filtered by a label distinct from the submitted value.
    Labelled { value: String, label: String },
}

impl ListItem {
    /// Text matched against the filter.
    pub fn filter_value(&self) -> &str {
        self.display_value()
    }

    /// Text rendered in the list.
    pub fn display_value(&self) -> &str {
        match self {
            ListItem::Plain(value) => value,
            ListItem::Labelled { label, .. } => label,
        }
    }

    /// Value handed back to the caller on submit.
    pub fn value(&self) -> &str {
        match self {
            ListItem::Plain(value) => value,
            ListItem::Labelled { value, .. } => value,
        }
    }
}

impl From<&str> for ListItem {
    fn from(value: &str) -> Self {
        ListItem::Plain(value.to_string())
    }
}

impl From<String> for ListItem {
    fn from(value: String) -> Self {
        ListItem::Plain(value)
    }
}

/// Computes a fuzzy match score for `pattern` against `text`, case-insensitive.
///
/// Returns `None` when `pattern` is not a subsequence of `text`. Exact matches
/// rank above prefix matches, which rank above substring matches, which rank
/// above scattered subsequences.
pub fn fuzzy_score(pattern: &str, text: &str) -> Option<i32> {
    let pattern = pattern.to_lowercase();
    let text = text.to_lowercase();
    if pattern.is_empty() {
        return Some(0);
    }
    if text == pattern {
        return Some(1000);
    }
    if text.starts_with(&pattern) {
        return Some(500 + (100 - text.chars().count().min(100) as i32));
    }
    if let Some(pos) = text.find(&pattern) {
        return Some(200 - pos.min(100) as i32);
    }

    let chars: Vec<char> = text.chars().collect();
    let mut pattern_chars = pattern.chars().peekable();
    let mut score = 0;
    let mut consecutive = 0;
    let mut last_match: Option<usize> = None;
    for (i, c) in chars.iter().enumerate() {
        if pattern_chars.peek() != Some(c) {
            continue;
        }
        pattern_chars.next();
        match last_match {
            Some(last) if last + 1 == i => {
                consecutive += 1;
                score += 10 + consecutive * 5;
            }
            _ => {
                consecutive = 0;
                score += 10;
            }
        }
        if i == 0 || matches!(chars[i - 1], '_' | '-' | ' ' | '/' | '.') {
            score += 20;
        }
        last_match = Some(i);
    }

    pattern_chars.peek().is_none().then_some(score)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FilterState {
    Unfiltered,
    /// The filter text is being edited.
    Filtering,
    /// A filter narrows the list but keys navigate again.
    Applied,
}

/// What the list made of a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListAction {
    Handled,
    Submit,
    Interrupt,
    /// Not a list key; the owning widget may use it.
    Ignored(KeyEvent),
}

#[derive(Debug, Clone)]
pub(crate) struct FilterList {
    items: Vec<ListItem>,
    visible: Vec<usize>,
    cursor: usize,
    filter: String,
    state: FilterState,
    configured_page_size: usize,
    page_size: usize,
}

impl FilterList {
    pub fn new(items: Vec<ListItem>, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let visible = (0..items.len()).collect();
        Self {
            items,
            visible,
            cursor: 0,
            filter: String::new(),
            state: FilterState::Unfiltered,
            configured_page_size: page_size,
            page_size,
        }
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    /// Indices into [`Self::items`] in display order.
    #[cfg(test)]
    pub fn visible(&self) -> &[usize] {
        &self.visible
    }

    /// Index into [`Self::items`] of the highlighted entry.
    pub fn highlighted(&self) -> Option<usize> {
        self.visible.get(self.cursor).copied()
    }

    pub fn highlight_value(&mut self, value: &str) {
        if let Some(pos) = self.visible.iter().position(|&i| self.items[i].value() == value) {
            self.cursor = pos;
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> FilterState {
        self.state
    }

    #[cfg(test)]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Shrinks the page to what fits under the prompt, header and footer.
    pub fn resize(&mut self, height: u16) {
        let available = (height as usize).saturating_sub(5).max(1);
        self.page_size = self.configured_page_size.min(available);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ListAction {
        if is_interrupt(&key) {
            return ListAction::Interrupt;
        }
        if self.state == FilterState::Filtering {
            return self.handle_filter_key(key);
        }
        match key.code {
            KeyCode::Char('/') => {
                self.state = FilterState::Filtering;
                self.filter.clear();
                self.refilter();
            }
            KeyCode::Esc => return ListAction::Interrupt,
            KeyCode::Enter => return ListAction::Submit,
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Left | KeyCode::PageUp | KeyCode::Char('h') => self.previous_page(),
            KeyCode::Right | KeyCode::PageDown | KeyCode::Char('l') => self.next_page(),
            KeyCode::Home | KeyCode::Char('g') => self.cursor = 0,
            KeyCode::End | KeyCode::Char('G') => {
                self.cursor = self.visible.len().saturating_sub(1)
            }
            _ => return ListAction::Ignored(key),
        }
        ListAction::Handled
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> ListAction {
        match key.code {
            KeyCode::Esc => {
                self.filter.clear();
                self.state = FilterState::Unfiltered;
                self.refilter();
            }
            KeyCode::Enter => {
                self.state = if self.filter.is_empty() {
                    FilterState::Unfiltered
                } else {
                    FilterState::Applied
                };
            }
            KeyCode::Backspace => {
                self.filter.pop();
                self.refilter();
            }
            KeyCode::Up => self.previous(),
            KeyCode::Down => self.next(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.filter.push(c);
                self.refilter();
            }
            _ => {}
        }
        ListAction::Handled
    }

    fn refilter(&mut self) {
        self.cursor = 0;
        if self.filter.is_empty() {
            self.visible = (0..self.items.len()).collect();
            return;
        }
        let mut ranked: Vec<(i32, usize)> = self
            .items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| fuzzy_score(&self.filter, item.filter_value()).map(|s| (s, i)))
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        self.visible = ranked.into_iter().map(|(_, i)| i).collect();
        log::trace!("Filter '{}' matched {} items", self.filter, self.visible.len());
    }

    fn previous(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        self.cursor = if self.cursor == 0 { self.visible.len() - 1 } else { self.cursor - 1 };
    }

    fn next(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        self.cursor = (self.cursor + 1) % self.visible.len();
    }

    fn previous_page(&mut self) {
        self.cursor = self.cursor.saturating_sub(self.page_size);
    }

    fn next_page(&mut self) {
        let last = self.visible.len().saturating_sub(1);
        self.cursor = (self.cursor + self.page_size).min(last);
    }

    fn page_count(&self) -> usize {
        self.visible.len().div_ceil(self.page_size).max(1)
    }

    /// Renders the filter line, the current page and the footer.
    ///
    /// `render_item` receives the position within the visible list, the item
    /// index and whether the entry is highlighted.
    pub fn view_lines(
        &self,
        styles: &Styles,
        help: &str,
        render_item: &dyn Fn(usize, usize, bool) -> String,
    ) -> Vec<String> {
        let mut lines = Vec::new();
        match self.state {
            FilterState::Unfiltered => {}
            FilterState::Filtering => lines.push(format!(
                "Filter: {}{}",
                self.filter,
                styles.paint(&styles.cursor, " ")
            )),
            FilterState::Applied => {
                lines.push(styles.paint(&styles.help, &format!("Filter: {}", self.filter)))
            }
        }

        if self.visible.is_empty() {
            lines.push(styles.paint(&styles.help, "No items."));
        } else {
            let start = (self.cursor / self.page_size) * self.page_size;
            let end = (start + self.page_size).min(self.visible.len());
            for pos in start..end {
                lines.push(render_item(pos, self.visible[pos], pos == self.cursor));
            }
        }

        let pages = self.page_count();
        if pages > 1 {
            let page = self.cursor / self.page_size + 1;
            lines.push(styles.paint(&styles.help, &format!("page {page}/{pages}")));
        }
        lines.push(styles.paint(&styles.help, help));
        lines
    }
}
