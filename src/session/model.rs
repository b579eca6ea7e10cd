//! Session state machine.
//!
//! [`SessionModel`] owns every task, log line and the hosted widget. It is
//! only ever touched by the thread running the render loop, one message at a
//! time, which is what keeps the transcript in emission order.
//!
//! Rendering is split in two. Log lines and completed tasks never change once
//! emitted, so [`SessionModel::take_committed`] hands them out exactly once to
//! be printed above the live area. [`SessionModel::view`] renders what is
//! still moving (the running task and the hosted widget) and never grows
//! taller than the terminal.

use crate::style::Styles;
use crate::terminal::{count_rows, is_interrupt};
use crate::widget::{Flow, InputModel};

use super::message::{LogEntry, LogLevel, Message, Task, TaskStatus};
use super::spinner::Spinner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopState {
    Running,
    AwaitingInput,
    Quitting,
}

pub(crate) struct SessionModel {
    tasks: Vec<Task>,
    input: Option<Box<dyn InputModel>>,
    width: u16,
    height: u16,
    state: LoopState,
    cancelled: bool,
    spinner: Spinner,
    /// Tasks whose lines have all been committed.
    committed_tasks: usize,
    /// Log lines of the first uncommitted task already committed.
    committed_logs: usize,
}

impl SessionModel {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            tasks: Vec::new(),
            input: None,
            width,
            height,
            state: LoopState::Running,
            cancelled: false,
            spinner: Spinner::default(),
            committed_tasks: 0,
            committed_logs: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_quitting(&self) -> bool {
        self.state == LoopState::Quitting
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    /// Applies one message.
    ///
    /// Returns the hosted widget once it is finished with, so the caller can
    /// hand it back to whoever injected it.
    pub fn update(&mut self, msg: Message) -> Option<Box<dyn InputModel>> {
        log::trace!("Session: received {msg:?}");
        match msg {
            Message::TaskStarted { title, completed_title } => {
                self.complete_latest();
                log::debug!("Session: new task '{title}'");
                self.tasks.push(Task::new(title, completed_title));
                None
            }
            Message::LogAppended(entry) => {
                self.append_log(entry);
                None
            }
            Message::TitleUpdated { completed_title, status } => {
                match self.tasks.last_mut() {
                    Some(task) if !task.is_anonymous() => {
                        if let Some(title) = completed_title {
                            task.completed_title = title;
                        }
                        if let Some(status) = status {
                            task.status = status;
                        }
                        task.complete();
                    }
                    _ => log::warn!("Session: no titled task to complete, ignoring title update"),
                }
                None
            }
            Message::WidgetHosted(mut widget) => {
                if self.input.is_some() || self.is_quitting() {
                    log::warn!("Session: cannot host a widget now, interrupting it");
                    widget.interrupt();
                    return Some(widget);
                }
                log::debug!("Session: widget injected");
                widget.resize(self.width, self.height);
                self.input = Some(widget);
                self.state = LoopState::AwaitingInput;
                None
            }
            Message::WidgetCompleted => self.complete_widget(),
            Message::Resized(width, height) => {
                self.width = width;
                self.height = height;
                if let Some(widget) = self.input.as_mut() {
                    widget.resize(width, height);
                }
                None
            }
            Message::KeyPressed(key) if is_interrupt(&key) => {
                log::debug!("Session: interrupted");
                self.cancelled = true;
                self.fail_latest();
                let widget = self.input.take().map(|mut widget| {
                    widget.handle_key(key);
                    widget
                });
                self.state = LoopState::Quitting;
                widget
            }
            Message::KeyPressed(key) => {
                let flow = self.input.as_mut().map(|widget| widget.handle_key(key));
                match flow {
                    Some(Flow::Complete) => self.complete_widget(),
                    _ => None,
                }
            }
            Message::Tick => {
                self.spinner.tick();
                None
            }
            Message::Abort(message) => {
                log::debug!("Session: aborting with '{message}'");
                match self.tasks.last_mut() {
                    Some(task) if !task.is_anonymous() && !task.completed => {
                        task.completed_title = message;
                        task.status = TaskStatus::Error;
                        task.completed = true;
                    }
                    _ => {
                        self.complete_latest();
                        let mut task = Task::new(message.clone(), message);
                        task.status = TaskStatus::Error;
                        task.completed = true;
                        self.tasks.push(task);
                    }
                }
                self.quit()
            }
            Message::Done => {
                self.complete_latest();
                self.quit()
            }
        }
    }

    fn quit(&mut self) -> Option<Box<dyn InputModel>> {
        self.state = LoopState::Quitting;
        self.input.take().map(|mut widget| {
            log::warn!("Session: shutting down with a widget still hosted");
            widget.interrupt();
            widget
        })
    }

    fn complete_widget(&mut self) -> Option<Box<dyn InputModel>> {
        let widget = self.input.take()?;
        log::debug!("Session: widget completed");
        if let Some(transcript) = widget.transcript() {
            self.append_log(LogEntry { message: transcript, level: LogLevel::Print });
        }
        if !self.is_quitting() {
            self.state = LoopState::Running;
        }
        Some(widget)
    }

    fn append_log(&mut self, entry: LogEntry) {
        match self.tasks.last_mut() {
            Some(task) if !task.completed => task.logs.push(entry),
            _ => self.tasks.push(Task { logs: vec![entry], ..Default::default() }),
        }
    }

    fn complete_latest(&mut self) {
        if let Some(task) = self.tasks.last_mut() {
            task.complete();
        }
    }

    fn fail_latest(&mut self) {
        if let Some(task) = self.tasks.last_mut() {
            if !task.completed && !task.is_anonymous() {
                if !task.title.is_empty() {
                    task.completed_title = task.title.clone();
                }
                task.status = TaskStatus::Error;
                task.complete();
            }
        }
    }

    /// Lines that became final since the last call: log lines as they
    /// arrive, and the mark line of each task once it completes.
    pub fn take_committed(&mut self, styles: &Styles) -> Vec<String> {
        let width = self.width.max(1) as usize;
        let mut lines = Vec::new();
        while let Some(task) = self.tasks.get(self.committed_tasks) {
            for entry in &task.logs[self.committed_logs..] {
                let text = match entry.level {
                    LogLevel::Print => entry.message.clone(),
                    LogLevel::Info => styles.info_log(&entry.message),
                    LogLevel::Warn => styles.warn_log(&entry.message),
                    LogLevel::Error => styles.error_log(&entry.message),
                };
                lines.extend(textwrap::wrap(&text, width).into_iter().map(|line| line.into_owned()));
            }
            self.committed_logs = task.logs.len();
            if !task.completed {
                break;
            }
            if !task.is_anonymous() {
                let title = textwrap::fill(task.final_title(), width);
                lines.push(format!(
                    "{} {}",
                    styles.mark(task.status),
                    styles.paint(&styles.bold, &title)
                ));
            }
            self.committed_tasks += 1;
            self.committed_logs = 0;
        }
        lines
    }

    /// The live area: the running task and the hosted widget, cut to the
    /// last rows that fit on screen.
    pub fn view(&self, styles: &Styles) -> String {
        let width = self.width.max(1) as usize;
        let mut lines: Vec<String> = Vec::new();
        if let Some(task) = self.tasks.last().filter(|task| !task.completed && !task.is_anonymous()) {
            let glyph = if self.input.is_some() {
                crate::constants::glyphs::EDITING.to_string()
            } else {
                self.spinner.view(styles)
            };
            let title = textwrap::fill(&task.title, width);
            lines.push(format!("{glyph}{}", styles.paint(&styles.bold, &title)));
        }
        if let Some(widget) = &self.input {
            lines.push(widget.view(styles));
        }
        fit_height(&lines.join("\n"), self.width, self.height)
    }
}

/// Keeps the trailing lines of `frame` that fit in `height` rows.
fn fit_height(frame: &str, width: u16, height: u16) -> String {
    let height = height.max(1) as usize;
    let lines: Vec<&str> = frame.split('\n').collect();
    let mut rows = 0;
    let mut start = lines.len();
    while start > 0 {
        let needed = count_rows(lines[start - 1], width);
        if rows + needed > height {
            break;
        }
        rows += needed;
        start -= 1;
    }
    lines[start..].join("\n")
}
