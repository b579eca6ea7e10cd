use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};

use crate::error::{Error, Result};
use crate::stream::StreamContext;
use crate::style::Styles;
use crate::terminal::SharedWriter;
use crate::widget::InputModel;

use super::message::{LogEntry, LogLevel, Message, TaskStatus};

/// Synchronous progress and input API used by command logic.
///
/// Obtained from [`StreamContext::start_session`]. The interactive
/// implementation forwards every call to the session's render loop; the
/// non-interactive one writes plain lines straight away.
pub trait Handler: Send {
    /// Unstyled transcript line.
    fn print(&self, message: &str);

    fn info(&self, message: &str);

    fn warn(&self, message: &str);

    fn error(&self, message: &str);

    /// Starts a new task, completing the current one.
    fn set_task(&self, title: &str, completed_title: &str);

    /// Completes the current task with its existing completed title.
    fn set_current_task_completed(&self);

    fn set_current_task_completed_title(&self, title: &str) {
        self.set_current_task_completed_title_with_status(title, TaskStatus::Success);
    }

    fn set_current_task_completed_title_with_status(&self, title: &str, status: TaskStatus);

    /// Hosts `model` in the session frame and blocks until it completes.
    ///
    /// # Panics
    /// On a non-interactive handler, and when another widget is already
    /// hosted by this session.
    fn set_input_model(&self, model: Box<dyn InputModel>) -> Result<Box<dyn InputModel>>;

    /// Fails the current task with `message` and ends the session.
    fn abort(&mut self, message: &str) -> Result<()>;

    /// Completes the last task and blocks until the final frame is drawn.
    ///
    /// Calling it again is a no-op. Returns [`Error::Interrupted`] when the
    /// user cancelled the session.
    fn done(&mut self) -> Result<()>;

    fn is_cancelled(&self) -> bool;
}

/// Caller side of a running session, shared with the stream context so that
/// widgets started while the session is active get hosted by it.
pub(crate) struct SessionLink {
    updates: Sender<Message>,
    completed: Receiver<Box<dyn InputModel>>,
    hosting: AtomicBool,
    cancelled: Arc<AtomicBool>,
}

impl SessionLink {
    pub fn new(
        updates: Sender<Message>,
        completed: Receiver<Box<dyn InputModel>>,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        Self { updates, completed, hosting: AtomicBool::new(false), cancelled }
    }

    /// Sends one update. Returns false once the loop has stopped.
    fn send(&self, msg: Message) -> bool {
        match self.updates.send(msg) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("Session already stopped, dropping {:?}", err.into_inner());
                false
            }
        }
    }

    pub fn host(&self, model: Box<dyn InputModel>) -> Result<Box<dyn InputModel>> {
        if self.hosting.swap(true, Ordering::SeqCst) {
            panic!("a widget is already hosted by this session");
        }
        let result = if self.send(Message::WidgetHosted(model)) {
            self.completed.recv().map_err(|_| Error::Interrupted)
        } else {
            Err(Error::Interrupted)
        };
        self.hosting.store(false, Ordering::SeqCst);
        result
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Handler backed by a render loop thread.
pub struct InteractiveHandler {
    link: Arc<SessionLink>,
    done: Receiver<()>,
    thread: Option<JoinHandle<()>>,
    ctx: StreamContext,
}

impl InteractiveHandler {
    pub(crate) fn new(
        link: Arc<SessionLink>,
        done: Receiver<()>,
        thread: JoinHandle<()>,
        ctx: StreamContext,
    ) -> Self {
        Self { link, done, thread: Some(thread), ctx }
    }

    fn log(&self, message: &str, level: LogLevel) {
        self.link.send(Message::LogAppended(LogEntry { message: message.to_string(), level }));
    }

    /// Sends the final message and waits for the loop to acknowledge and exit.
    fn finish(&mut self, last: Message) -> Result<()> {
        if let Some(thread) = self.thread.take() {
            self.link.send(last);
            if self.done.recv().is_err() {
                log::debug!("Render loop exited without acknowledging");
            }
            if thread.join().is_err() {
                log::warn!("Render loop thread panicked");
            }
            self.ctx.release(&self.link);
        }
        if self.link.is_cancelled() {
            Err(Error::Interrupted)
        } else {
            Ok(())
        }
    }
}

impl Handler for InteractiveHandler {
    fn print(&self, message: &str) {
        self.log(message, LogLevel::Print);
    }

    fn info(&self, message: &str) {
        self.log(message, LogLevel::Info);
    }

    fn warn(&self, message: &str) {
        self.log(message, LogLevel::Warn);
    }

    fn error(&self, message: &str) {
        self.log(message, LogLevel::Error);
    }

    fn set_task(&self, title: &str, completed_title: &str) {
        self.link.send(Message::TaskStarted {
            title: title.to_string(),
            completed_title: completed_title.to_string(),
        });
    }

    fn set_current_task_completed(&self) {
        self.link.send(Message::TitleUpdated { completed_title: None, status: None });
    }

    fn set_current_task_completed_title_with_status(&self, title: &str, status: TaskStatus) {
        self.link.send(Message::TitleUpdated {
            completed_title: Some(title.to_string()),
            status: Some(status),
        });
    }

    fn set_input_model(&self, model: Box<dyn InputModel>) -> Result<Box<dyn InputModel>> {
        self.link.host(model)
    }

    fn abort(&mut self, message: &str) -> Result<()> {
        self.finish(Message::Abort(message.to_string()))
    }

    fn done(&mut self) -> Result<()> {
        self.finish(Message::Done)
    }

    fn is_cancelled(&self) -> bool {
        self.link.is_cancelled()
    }
}

impl Drop for InteractiveHandler {
    fn drop(&mut self) {
        if self.thread.is_some() {
            log::debug!("Session handler dropped without done, finishing it");
            let _ = self.done();
        }
    }
}

/// Handler for streams without a terminal: every call is one plain line.
pub struct NonInteractiveHandler {
    out: SharedWriter,
    styles: Styles,
}

impl NonInteractiveHandler {
    pub fn new(out: SharedWriter, styles: Styles) -> Self {
        Self { out, styles }
    }

    fn write_line(&self, line: &str) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        if let Err(err) = writeln!(out, "{line}").and_then(|_| out.flush()) {
            log::debug!("Cannot write to output: {err}");
        }
    }

    fn bracketed(&self, status: TaskStatus, title: &str) {
        let line = format!(
            "[{} {}]",
            self.styles.mark(status),
            self.styles.paint(&self.styles.bold, title)
        );
        self.info(&line);
    }
}

impl Handler for NonInteractiveHandler {
    fn print(&self, message: &str) {
        self.write_line(message);
    }

    fn info(&self, message: &str) {
        self.write_line(&self.styles.info_log(message));
    }

    fn warn(&self, message: &str) {
        self.write_line(&self.styles.warn_log(message));
    }

    fn error(&self, message: &str) {
        self.write_line(&self.styles.error_log(message));
    }

    fn set_task(&self, title: &str, _completed_title: &str) {
        self.info(&format!("[{}]", self.styles.paint(&self.styles.bold, title)));
    }

    fn set_current_task_completed(&self) {}

    fn set_current_task_completed_title_with_status(&self, title: &str, status: TaskStatus) {
        self.bracketed(status, title);
    }

    fn set_input_model(&self, _model: Box<dyn InputModel>) -> Result<Box<dyn InputModel>> {
        panic!("cannot take input in non-interactive mode");
    }

    fn abort(&mut self, message: &str) -> Result<()> {
        self.bracketed(TaskStatus::Error, message);
        Ok(())
    }

    fn done(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_cancelled(&self) -> bool {
        false
    }
}
