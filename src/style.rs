//! Render styling carried by a [`crate::stream::StreamContext`].
//!
//! Styles are plain values threaded through every view; a disabled set renders
//! text untouched so captured output stays readable in tests and pipes.

use crossterm::style::{Color, ContentStyle, Stylize};

use crate::constants::glyphs;
use crate::session::TaskStatus;

const BLUE: Color = Color::AnsiValue(51);
const RED: Color = Color::AnsiValue(124);
const SPINNER_BLUE: Color = Color::Rgb { r: 0x04, g: 0x04, b: 0xff };

#[derive(Debug, Clone)]
pub struct Styles {
    enabled: bool,
    pub bold: ContentStyle,
    pub spinner: ContentStyle,
    pub info_heading: ContentStyle,
    pub info_body: ContentStyle,
    pub warn_heading: ContentStyle,
    pub warn_body: ContentStyle,
    pub error_heading: ContentStyle,
    pub error_body: ContentStyle,
    pub title: ContentStyle,
    pub item: ContentStyle,
    pub selected_item: ContentStyle,
    pub help: ContentStyle,
    pub suggestion: ContentStyle,
    pub cursor: ContentStyle,
    pub err: ContentStyle,
    pub marks: TaskStatusStyle,
}

#[derive(Debug, Clone)]
pub struct TaskStatusStyle {
    pub success: ContentStyle,
    pub error: ContentStyle,
    pub skipped: ContentStyle,
}

impl Styles {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            bold: ContentStyle::new().bold(),
            spinner: ContentStyle::new().with(SPINNER_BLUE),
            info_heading: ContentStyle::new().with(Color::AnsiValue(51)),
            info_body: ContentStyle::new().with(Color::AnsiValue(159)),
            warn_heading: ContentStyle::new().with(Color::AnsiValue(227)),
            warn_body: ContentStyle::new().with(Color::AnsiValue(228)),
            error_heading: ContentStyle::new().with(Color::AnsiValue(203)),
            error_body: ContentStyle::new().with(Color::AnsiValue(210)),
            title: ContentStyle::new().bold(),
            item: ContentStyle::new(),
            selected_item: ContentStyle::new().with(BLUE),
            help: ContentStyle::new().dim(),
            suggestion: ContentStyle::new().dim(),
            cursor: ContentStyle::new().reverse(),
            err: ContentStyle::new().with(RED),
            marks: TaskStatusStyle {
                success: ContentStyle::new().with(Color::AnsiValue(42)),
                error: ContentStyle::new().with(Color::AnsiValue(9)),
                skipped: ContentStyle::new().with(Color::AnsiValue(228)),
            },
        }
    }

    /// Styles that never emit escape sequences.
    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn paint(&self, style: &ContentStyle, text: &str) -> String {
        if self.enabled && !text.is_empty() {
            style.apply(text).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn mark(&self, status: TaskStatus) -> String {
        match status {
            TaskStatus::Unknown | TaskStatus::Success => {
                self.paint(&self.marks.success, glyphs::SUCCESS)
            }
            TaskStatus::Error => self.paint(&self.marks.error, glyphs::ERROR),
            TaskStatus::Skipped => self.paint(&self.marks.skipped, glyphs::SKIPPED),
        }
    }

    pub fn info_log(&self, message: &str) -> String {
        format!(
            "{} {}",
            self.paint(&self.info_heading, "INFO:"),
            self.paint(&self.info_body, message)
        )
    }

    pub fn warn_log(&self, message: &str) -> String {
        format!(
            "{} {}",
            self.paint(&self.warn_heading, "WARN:"),
            self.paint(&self.warn_body, message)
        )
    }

    pub fn error_log(&self, message: &str) -> String {
        format!(
            "{} {}",
            self.paint(&self.error_heading, "ERROR:"),
            self.paint(&self.error_body, message)
        )
    }
}

impl Default for Styles {
    fn default() -> Self {
        Self::new(true)
    }
}
