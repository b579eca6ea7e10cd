//! Session data and the messages the render loop consumes.

use crossterm::event::KeyEvent;

use crate::widget::InputModel;

/// Final state of a task, rendered as its completion mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    /// Not set explicitly; rendered like success once completed.
    #[default]
    Unknown,
    Success,
    Error,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Unstyled transcript line, also used for widget echoes.
    Print,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub message: String,
    pub level: LogLevel,
}

/// A named progress unit with its log lines.
///
/// Tasks with neither a title nor a completed title are anonymous: they only
/// carry log lines emitted outside of any titled task.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Task {
    pub title: String,
    pub completed_title: String,
    pub status: TaskStatus,
    pub completed: bool,
    pub logs: Vec<LogEntry>,
}

impl Task {
    pub fn new(title: impl Into<String>, completed_title: impl Into<String>) -> Self {
        Self { title: title.into(), completed_title: completed_title.into(), ..Default::default() }
    }

    pub fn is_anonymous(&self) -> bool {
        self.title.is_empty() && self.completed_title.is_empty()
    }

    /// Title shown once the task is completed.
    pub fn final_title(&self) -> &str {
        if self.completed_title.is_empty() {
            &self.title
        } else {
            &self.completed_title
        }
    }

    pub(crate) fn complete(&mut self) {
        if !self.completed {
            self.completed = true;
            if self.status == TaskStatus::Unknown {
                self.status = TaskStatus::Success;
            }
        }
    }
}

/// Everything the render loop reacts to, in arrival order.
pub enum Message {
    TaskStarted { title: String, completed_title: String },
    LogAppended(LogEntry),
    /// Completes the current task; `None` fields keep the current values.
    TitleUpdated { completed_title: Option<String>, status: Option<TaskStatus> },
    WidgetHosted(Box<dyn InputModel>),
    WidgetCompleted,
    Resized(u16, u16),
    KeyPressed(KeyEvent),
    Tick,
    Abort(String),
    Done,
}

impl Message {
    /// Short name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::TaskStarted { .. } => "task-started",
            Message::LogAppended(_) => "log-appended",
            Message::TitleUpdated { .. } => "title-updated",
            Message::WidgetHosted(_) => "widget-hosted",
            Message::WidgetCompleted => "widget-completed",
            Message::Resized(..) => "resized",
            Message::KeyPressed(_) => "key-pressed",
            Message::Tick => "tick",
            Message::Abort(_) => "abort",
            Message::Done => "done",
        }
    }
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Message::TaskStarted { title, .. } => write!(f, "TaskStarted({title:?})"),
            Message::LogAppended(entry) => write!(f, "LogAppended({entry:?})"),
            Message::KeyPressed(key) => write!(f, "KeyPressed({key:?})"),
            Message::Abort(message) => write!(f, "Abort({message:?})"),
            other => f.write_str(other.kind()),
        }
    }
}
