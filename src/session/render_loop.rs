//! The render loop: the single consumer that owns a terminal frame.
//!
//! A loop waits on the next of {update message, terminal event, spinner
//! tick}, applies it to the [`SessionModel`], prints whatever became final
//! and redraws the live frame.
//! One loop serves a whole session; a standalone widget gets a short-lived
//! loop of its own.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{never, select, tick, Receiver, Sender, TryRecvError};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::ConsoleConfig;
use crate::error::{Error, Result};
use crate::style::Styles;
use crate::terminal::{self, EventReader, FrameWriter, RawModeGuard, SharedWriter, TerminalEvent};
use crate::widget::InputModel;

use super::message::Message;
use super::model::{LoopState, SessionModel};

/// Where a loop reads terminal events from.
#[derive(Clone)]
pub(crate) enum EventSource {
    /// The real terminal, in raw mode while the loop runs.
    Terminal,
    /// Pre-recorded or test driven events with a fixed terminal size.
    Scripted { events: Receiver<TerminalEvent>, size: (u16, u16) },
}

/// Channels a session loop answers on.
pub(crate) struct SessionReplies {
    pub completed: Sender<Box<dyn InputModel>>,
    pub done: Sender<()>,
    pub cancelled: Arc<AtomicBool>,
}

pub(crate) struct RenderLoop {
    model: SessionModel,
    source: EventSource,
    updates: Receiver<Message>,
    writer: SharedWriter,
    styles: Styles,
    spinner_interval: Duration,
    drain_grace: Duration,
    replies: Option<SessionReplies>,
    finished: Option<Box<dyn InputModel>>,
    input_closed: bool,
}

impl RenderLoop {
    pub fn new(
        source: EventSource,
        writer: SharedWriter,
        styles: Styles,
        config: &ConsoleConfig,
        updates: Receiver<Message>,
    ) -> Self {
        let (width, height) = match &source {
            EventSource::Terminal => terminal::size(),
            EventSource::Scripted { size, .. } => *size,
        };
        Self {
            model: SessionModel::new(width, height),
            source,
            updates,
            writer,
            styles,
            spinner_interval: config.spinner_interval(),
            drain_grace: config.drain_grace(),
            replies: None,
            finished: None,
            input_closed: false,
        }
    }

    pub fn with_replies(mut self, replies: SessionReplies) -> Self {
        self.replies = Some(replies);
        self
    }

    /// Runs until the session is done or interrupted, then acknowledges.
    pub fn run_session(mut self) {
        log::debug!("Render loop: session started");
        self.run();
        if let Some(replies) = &self.replies {
            let _ = replies.done.send(());
        }
        log::debug!("Render loop: session finished");
    }

    /// Runs a single widget until it completes and hands it back.
    pub fn run_standalone(mut self, widget: Box<dyn InputModel>) -> Result<Box<dyn InputModel>> {
        log::debug!("Render loop: standalone widget started");
        self.dispatch(Message::WidgetHosted(widget));
        self.run().ok_or(Error::Interrupted)
    }

    fn run(&mut self) -> Option<Box<dyn InputModel>> {
        let (reader, _raw_mode) = match &self.source {
            EventSource::Terminal => {
                let guard = match RawModeGuard::enable(self.writer.clone()) {
                    Ok(guard) => Some(guard),
                    Err(err) => {
                        log::warn!("Render loop: cannot enable raw mode: {err}");
                        None
                    }
                };
                (Some(EventReader::spawn()), guard)
            }
            EventSource::Scripted { .. } => (None, None),
        };
        let mut events = match (&self.source, &reader) {
            (EventSource::Scripted { events, .. }, _) => events.clone(),
            (EventSource::Terminal, Some(reader)) => reader.receiver(),
            (EventSource::Terminal, None) => never(),
        };
        let mut updates = self.updates.clone();
        let ticker = tick(self.spinner_interval);
        let mut frames = FrameWriter::new(self.writer.clone(), self.model.width());

        self.render(&mut frames);
        while !self.is_finished() {
            let wake = select! {
                recv(updates) -> msg => Wake::Update(msg.ok()),
                recv(events) -> event => Wake::Event(event.ok()),
                recv(ticker) -> _ => Wake::Tick,
            };
            match wake {
                Wake::Update(Some(Message::Done)) => {
                    self.drain();
                    self.dispatch(Message::Done);
                }
                Wake::Update(Some(msg)) => self.dispatch(msg),
                Wake::Update(None) => {
                    log::debug!("Render loop: update channel closed");
                    updates = never();
                    if self.replies.is_some() {
                        self.dispatch(Message::Done);
                    }
                }
                Wake::Event(Some(TerminalEvent::Key(key))) => {
                    self.dispatch(Message::KeyPressed(key))
                }
                Wake::Event(Some(TerminalEvent::Resize(width, height))) => {
                    frames.set_width(width);
                    self.dispatch(Message::Resized(width, height));
                }
                Wake::Event(None) => {
                    log::debug!("Render loop: terminal input closed");
                    events = never();
                    self.input_closed = true;
                }
                Wake::Tick => self.dispatch(Message::Tick),
            }
            if self.input_closed && self.model.state() == LoopState::AwaitingInput {
                log::debug!("Render loop: no more input, interrupting widget");
                self.dispatch(Message::KeyPressed(ctrl_c()));
            }
            self.render(&mut frames);
        }

        self.render(&mut frames);
        if let Err(err) = frames.finish() {
            log::warn!("Render loop: cannot finish frame: {err}");
        }
        drop(reader);
        self.finished.take()
    }

    fn is_finished(&self) -> bool {
        self.model.is_quitting() || (self.replies.is_none() && self.finished.is_some())
    }

    /// Applies messages already queued behind `done`, for at most the grace
    /// window.
    fn drain(&mut self) {
        let deadline = Instant::now() + self.drain_grace;
        loop {
            if Instant::now() >= deadline {
                log::debug!("Render loop: drain grace window elapsed");
                return;
            }
            match self.updates.try_recv() {
                Ok(Message::Done) => continue,
                Ok(msg) => {
                    log::trace!("Render loop: draining {msg:?}");
                    self.dispatch(msg);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return,
            }
        }
    }

    fn dispatch(&mut self, msg: Message) {
        let widget = self.model.update(msg);
        // published before the widget goes back, so the caller sees it on return
        if self.model.is_cancelled() {
            if let Some(replies) = &self.replies {
                replies.cancelled.store(true, Ordering::SeqCst);
            }
        }
        if let Some(widget) = widget {
            self.deliver(widget);
        }
    }

    fn deliver(&mut self, widget: Box<dyn InputModel>) {
        match &self.replies {
            Some(replies) => {
                if replies.completed.send(widget).is_err() {
                    log::warn!("Render loop: nobody is waiting for the completed widget");
                }
            }
            None => self.finished = Some(widget),
        }
    }

    fn render(&mut self, frames: &mut FrameWriter) {
        let committed = self.model.take_committed(&self.styles);
        if let Err(err) = frames.draw(&committed, &self.model.view(&self.styles)) {
            log::warn!("Render loop: cannot draw frame: {err}");
        }
    }
}

/// What woke the loop up.
enum Wake {
    Update(Option<Message>),
    Event(Option<TerminalEvent>),
    Tick,
}

fn ctrl_c() -> KeyEvent {
    KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::message::{LogEntry, LogLevel};
    use crate::terminal::shared_writer;
    use crossbeam_channel::{bounded, unbounded};
    use std::io::{self, Write};
    use std::sync::Mutex;
    use std::thread;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn info(message: &str) -> Message {
        Message::LogAppended(LogEntry { message: message.into(), level: LogLevel::Info })
    }

    /// Runs a session loop over `updates` and returns its output, and whether
    /// it acknowledged `done`.
    fn run_session(updates: Receiver<Message>, config: ConsoleConfig) -> (Capture, bool) {
        let capture = Capture::default();
        let (_events_tx, events) = unbounded();
        let (completed, _completed_rx) = bounded(1);
        let (done, done_rx) = bounded(1);
        let replies = SessionReplies { completed, done, cancelled: Arc::new(AtomicBool::new(false)) };
        RenderLoop::new(
            EventSource::Scripted { events, size: (80, 24) },
            shared_writer(capture.clone()),
            Styles::plain(),
            &config,
            updates,
        )
        .with_replies(replies)
        .run_session();
        (capture, done_rx.try_recv().is_ok())
    }

    #[test]
    fn messages_queued_behind_done_are_drained() {
        let (tx, updates) = unbounded();
        tx.send(Message::TaskStarted { title: "Deploy".into(), completed_title: "Deployed".into() })
            .unwrap();
        tx.send(info("from main")).unwrap();
        tx.send(Message::Done).unwrap();
        // a second producer that raced the first one's done
        let late = tx.clone();
        thread::spawn(move || {
            late.send(info("late one")).unwrap();
            late.send(Message::Done).unwrap();
            late.send(info("late two")).unwrap();
        })
        .join()
        .unwrap();

        let (capture, acknowledged) = run_session(updates, ConsoleConfig::default());
        assert!(acknowledged);
        let text = capture.text();
        assert_eq!(text.matches("Deployed").count(), 1);
        assert!(text.contains("INFO: from main\r\n"));
        assert!(text.ends_with("INFO: late one\r\nINFO: late two\r\n✓ Deployed\r\n"));
    }

    #[test]
    fn drain_stops_at_the_grace_window() {
        let (tx, updates) = unbounded();
        tx.send(Message::Done).unwrap();
        for _ in 0..200_000 {
            tx.send(Message::Tick).unwrap();
        }
        let config = ConsoleConfig { drain_grace_ms: 1, ..ConsoleConfig::default() };

        let started = Instant::now();
        let (_capture, acknowledged) = run_session(updates, config);
        assert!(acknowledged);
        assert!(started.elapsed() < Duration::from_secs(5));
        // the backlog outlived the window and was left behind
        assert!(!tx.is_empty());
    }
}
