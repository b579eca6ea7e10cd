//! Stream context: the entry point of the engine.
//!
//! A [`StreamContext`] decides once whether the streams it wraps are
//! interactive, carries the render styles and configuration, and starts
//! sessions and widgets. Cloning it is cheap; every clone shares the same
//! active session slot, which is how a widget finds the session that has to
//! host it.

use std::io::{IsTerminal, Write};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use crossbeam_channel::{bounded, never, Receiver};

use crate::config::ConsoleConfig;
use crate::error::Result;
use crate::session::handler::SessionLink;
use crate::session::render_loop::{EventSource, RenderLoop, SessionReplies};
use crate::session::{Handler, InteractiveHandler, NonInteractiveHandler};
use crate::style::Styles;
use crate::terminal::{shared_writer, SharedWriter, TerminalEvent};
use crate::widget::InputModel;

#[derive(Clone)]
pub struct StreamContext {
    inner: Arc<Inner>,
}

struct Inner {
    interactive: bool,
    source: EventSource,
    out: SharedWriter,
    err_out: SharedWriter,
    config: ConsoleConfig,
    styles: Styles,
    active: Mutex<Option<Arc<SessionLink>>>,
    /// Held by a standalone widget loop while it owns the terminal.
    terminal: Mutex<()>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl StreamContext {
    /// Wraps the given streams with the default configuration.
    ///
    /// The context is interactive only when `interactive` is requested and
    /// both `input` and `output` are terminals.
    pub fn new<I, O, E>(input: I, output: O, err_output: E, interactive: bool) -> Self
    where
        I: IsTerminal,
        O: Write + IsTerminal + Send + 'static,
        E: Write + Send + 'static,
    {
        Self::with_config(input, output, err_output, interactive, ConsoleConfig::default())
    }

    pub fn with_config<I, O, E>(
        input: I,
        output: O,
        err_output: E,
        interactive: bool,
        config: ConsoleConfig,
    ) -> Self
    where
        I: IsTerminal,
        O: Write + IsTerminal + Send + 'static,
        E: Write + Send + 'static,
    {
        let output_is_terminal = output.is_terminal();
        let interactive = interactive && input.is_terminal() && output_is_terminal;
        log::debug!("Stream context created, interactive: {interactive}");
        let styles = Styles::new(config.color_enabled(output_is_terminal));
        Self::build(
            interactive,
            EventSource::Terminal,
            shared_writer(output),
            shared_writer(err_output),
            config,
            styles,
        )
    }

    /// Context over the process's standard streams.
    pub fn stdio(interactive: bool, config: ConsoleConfig) -> Self {
        Self::with_config(std::io::stdin(), std::io::stdout(), std::io::stderr(), interactive, config)
    }

    /// Non-interactive context writing plain lines to `output`.
    pub fn non_interactive<W: Write + Send + 'static>(output: W, config: ConsoleConfig) -> Self {
        let styles = Styles::new(config.color_enabled(false));
        Self::build(
            false,
            EventSource::Terminal,
            shared_writer(output),
            shared_writer(std::io::sink()),
            config,
            styles,
        )
    }

    /// Interactive context fed by `events` instead of a terminal, drawing
    /// uncoloured frames into `output`.
    pub fn scripted<W: Write + Send + 'static>(
        events: Receiver<TerminalEvent>,
        output: W,
        size: (u16, u16),
        config: ConsoleConfig,
    ) -> Self {
        Self::build(
            true,
            EventSource::Scripted { events, size },
            shared_writer(output),
            shared_writer(std::io::sink()),
            config,
            Styles::plain(),
        )
    }

    fn build(
        interactive: bool,
        source: EventSource,
        out: SharedWriter,
        err_out: SharedWriter,
        config: ConsoleConfig,
        styles: Styles,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                interactive,
                source,
                out,
                err_out,
                config,
                styles,
                active: Mutex::new(None),
                terminal: Mutex::new(()),
            }),
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.inner.interactive
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.inner.config
    }

    pub fn styles(&self) -> &Styles {
        &self.inner.styles
    }

    /// Stream for diagnostics that must not go through the frame.
    pub fn err_output(&self) -> SharedWriter {
        Arc::clone(&self.inner.err_out)
    }

    /// Starts a session, with an initial task unless both titles are empty.
    ///
    /// # Panics
    /// When a session started from this context is still active.
    pub fn start_session(&self, title: &str, completed_title: &str) -> Box<dyn Handler> {
        let handler: Box<dyn Handler> = if self.is_interactive() {
            Box::new(self.spawn_session())
        } else {
            Box::new(NonInteractiveHandler::new(self.inner.out.clone(), self.inner.styles.clone()))
        };
        if !title.is_empty() || !completed_title.is_empty() {
            handler.set_task(title, completed_title);
        }
        handler
    }

    fn spawn_session(&self) -> InteractiveHandler {
        let mut active = lock(&self.inner.active);
        if active.is_some() {
            panic!("a session is already active on this stream context");
        }

        let config = &self.inner.config;
        let (updates_tx, updates_rx) = bounded(config.update_queue_capacity);
        let (completed_tx, completed_rx) = bounded(1);
        let (done_tx, done_rx) = bounded(1);
        let cancelled = Arc::new(AtomicBool::new(false));

        let render_loop = RenderLoop::new(
            self.inner.source.clone(),
            self.inner.out.clone(),
            self.inner.styles.clone(),
            config,
            updates_rx,
        )
        .with_replies(SessionReplies {
            completed: completed_tx,
            done: done_tx,
            cancelled: Arc::clone(&cancelled),
        });
        let thread = thread::spawn(move || render_loop.run_session());

        let link = Arc::new(SessionLink::new(updates_tx, completed_rx, cancelled));
        *active = Some(Arc::clone(&link));
        log::debug!("Session started");
        InteractiveHandler::new(link, done_rx, thread, self.clone())
    }

    /// Runs `model` to completion and returns it.
    ///
    /// Inside an active session the model is hosted by the session's loop;
    /// otherwise it gets a standalone loop on the calling thread.
    ///
    /// # Panics
    /// When the context is not interactive.
    pub fn execute(&self, model: Box<dyn InputModel>) -> Result<Box<dyn InputModel>> {
        let active = lock(&self.inner.active).clone();
        if let Some(link) = active {
            return link.host(model);
        }
        if !self.is_interactive() {
            panic!("cannot take input in non-interactive mode");
        }
        let _terminal = lock(&self.inner.terminal);
        RenderLoop::new(
            self.inner.source.clone(),
            self.inner.out.clone(),
            self.inner.styles.clone(),
            &self.inner.config,
            never(),
        )
        .run_standalone(model)
    }

    pub(crate) fn release(&self, link: &Arc<SessionLink>) {
        let mut active = lock(&self.inner.active);
        if active.as_ref().is_some_and(|current| Arc::ptr_eq(current, link)) {
            *active = None;
            log::debug!("Session released");
        }
    }
}
