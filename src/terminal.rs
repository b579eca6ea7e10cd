//! Terminal plumbing for the render loop: event sources, raw mode and frame
//! redraws.

use std::io::{self, Write};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver};
use crossterm::cursor::{Hide, MoveToColumn, MoveUp, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, disable_raw_mode, enable_raw_mode, Clear, ClearType};
use crossterm::{execute, queue};
use unicode_width::UnicodeWidthStr;

use crate::constants::defaults;

/// Output stream shared between a stream context and its render loops.
pub type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

pub fn shared_writer<W: Write + Send + 'static>(writer: W) -> SharedWriter {
    Arc::new(Mutex::new(Box::new(writer)))
}

/// Input consumed by a render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalEvent {
    Key(KeyEvent),
    Resize(u16, u16),
}

/// Ctrl+C, which always cancels whatever is running.
pub fn is_interrupt(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Current terminal size, or a conventional fallback when it can't be read.
pub fn size() -> (u16, u16) {
    match terminal::size() {
        Ok((width, height)) if width > 0 && height > 0 => (width, height),
        _ => (defaults::TERMINAL_WIDTH, defaults::TERMINAL_HEIGHT),
    }
}

/// Background thread forwarding crossterm events until dropped.
pub(crate) struct EventReader {
    receiver: Receiver<TerminalEvent>,
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl EventReader {
    pub fn spawn() -> Self {
        let (tx, receiver) = unbounded();
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            let timeout = Duration::from_millis(defaults::EVENT_POLL_MS);
            while !thread_stop.load(Ordering::SeqCst) {
                match event::poll(timeout) {
                    Ok(false) => continue,
                    Ok(true) => {}
                    Err(err) => {
                        log::debug!("Terminal poll failed: {err}");
                        break;
                    }
                }
                let forwarded = match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        TerminalEvent::Key(key)
                    }
                    Ok(Event::Resize(width, height)) => TerminalEvent::Resize(width, height),
                    Ok(_) => continue,
                    Err(err) => {
                        log::debug!("Terminal read failed: {err}");
                        break;
                    }
                };
                if tx.send(forwarded).is_err() {
                    break;
                }
            }
            log::trace!("Terminal event reader stopped");
        });
        Self { receiver, stop, handle: Some(handle) }
    }

    pub fn receiver(&self) -> Receiver<TerminalEvent> {
        self.receiver.clone()
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

static RAW_MODE_ENABLED: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

/// Keeps the terminal in raw mode with a hidden cursor until dropped, and on
/// panic.
pub(crate) struct RawModeGuard {
    writer: SharedWriter,
}

impl RawModeGuard {
    pub fn enable(writer: SharedWriter) -> io::Result<Self> {
        install_panic_hook();
        enable_raw_mode()?;
        RAW_MODE_ENABLED.store(true, Ordering::SeqCst);
        if let Ok(mut out) = writer.lock() {
            execute!(out, Hide)?;
        }
        Ok(Self { writer })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        restore_raw_mode();
        if let Ok(mut out) = self.writer.lock() {
            let _ = execute!(out, Show);
            let _ = out.flush();
        }
    }
}

fn restore_raw_mode() {
    if RAW_MODE_ENABLED.swap(false, Ordering::SeqCst) {
        let _ = disable_raw_mode();
    }
}

fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_raw_mode();
            let _ = execute!(io::stdout(), Show);
            previous(info);
        }));
    });
}

/// Redraws a multi-line frame in place, below lines printed once.
///
/// Each draw moves back over the rows of the previous frame and clears them,
/// prints any newly committed lines where the frame used to start, then the
/// new frame. Committed lines scroll away with the terminal and are never
/// touched again, so the cursor only ever moves up over the frame itself.
pub(crate) struct FrameWriter {
    writer: SharedWriter,
    width: u16,
    rows_above_cursor: usize,
    last_frame: Option<String>,
}

impl FrameWriter {
    pub fn new(writer: SharedWriter, width: u16) -> Self {
        Self { writer, width: width.max(1), rows_above_cursor: 0, last_frame: None }
    }

    pub fn set_width(&mut self, width: u16) {
        self.width = width.max(1);
        // row counts of the previous frame no longer hold
        self.last_frame = None;
    }

    pub fn draw(&mut self, committed: &[String], frame: &str) -> io::Result<()> {
        if committed.is_empty() && self.last_frame.as_deref() == Some(frame) {
            return Ok(());
        }
        let mut out = self
            .writer
            .lock()
            .map_err(|_| io::Error::other("output writer lock poisoned"))?;
        queue!(out, MoveToColumn(0))?;
        if self.rows_above_cursor > 0 {
            queue!(out, MoveUp(self.rows_above_cursor as u16))?;
        }
        queue!(out, Clear(ClearType::FromCursorDown))?;
        for line in committed {
            out.write_all(line.replace('\n', "\r\n").as_bytes())?;
            out.write_all(b"\r\n")?;
        }
        out.write_all(frame.replace('\n', "\r\n").as_bytes())?;
        out.flush()?;

        self.rows_above_cursor = count_rows(frame, self.width).saturating_sub(1);
        self.last_frame = Some(frame.to_string());
        Ok(())
    }

    /// Leaves the cursor on a fresh line below the final frame.
    pub fn finish(&mut self) -> io::Result<()> {
        let mut out = self
            .writer
            .lock()
            .map_err(|_| io::Error::other("output writer lock poisoned"))?;
        if self.last_frame.as_deref().is_some_and(|frame| !frame.is_empty()) {
            out.write_all(b"\r\n")?;
        }
        out.flush()?;
        self.rows_above_cursor = 0;
        self.last_frame = None;
        Ok(())
    }
}

/// Terminal rows taken by `frame` once wrapped at `width` columns.
pub(crate) fn count_rows(frame: &str, width: u16) -> usize {
    let width = width.max(1) as usize;
    frame
        .split('\n')
        .map(|line| {
            let visible = strip_ansi_escapes::strip_str(line);
            UnicodeWidthStr::width(visible.as_str()).div_ceil(width).max(1)
        })
        .sum()
}
