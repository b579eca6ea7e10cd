#![allow(dead_code)]

use crossbeam_channel::{unbounded, Sender};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use userio::config::ConsoleConfig;
use userio::terminal::TerminalEvent;
use userio::StreamContext;

/// In-memory output shared between the render loop and the test.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Capture {
    /// Everything written so far, as text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Everything ever written with escape sequences and carriage returns
    /// removed, including frames that were later redrawn.
    pub fn transcript(&self) -> String {
        strip_ansi_escapes::strip_str(self.text()).replace('\r', "")
    }

    /// What a terminal of `rows` x `cols` shows after replaying the output,
    /// one `\n`-terminated line per non-empty row.
    pub fn terminal_screen(&self, rows: u16, cols: u16) -> String {
        let mut parser = vt100::Parser::new(rows, cols, 0);
        parser.process(&self.0.lock().unwrap());
        let contents = parser.screen().contents();
        let mut lines: Vec<&str> = contents.lines().map(str::trim_end).collect();
        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }
        lines.iter().map(|line| format!("{line}\n")).collect()
    }

    /// The screen on a terminal tall enough to never scroll.
    pub fn screen(&self) -> String {
        self.terminal_screen(500, 80)
    }

    /// Polls until `text` shows up on screen or `timeout` elapses.
    pub fn wait_for(&self, text: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.screen().contains(text) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }
}

/// Interactive context driven by the returned sender, drawing into the
/// returned capture.
pub fn scripted_context() -> (Sender<TerminalEvent>, StreamContext, Capture) {
    let (tx, rx) = unbounded();
    let capture = Capture::default();
    let config = ConsoleConfig { spinner_interval_ms: 20, ..ConsoleConfig::default() };
    let ctx = StreamContext::scripted(rx, capture.clone(), (80, 24), config);
    (tx, ctx, capture)
}

pub fn non_interactive_context() -> (StreamContext, Capture) {
    let capture = Capture::default();
    let ctx = StreamContext::non_interactive(capture.clone(), ConsoleConfig::default());
    (ctx, capture)
}

pub fn press(tx: &Sender<TerminalEvent>, code: KeyCode) {
    tx.send(TerminalEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))).unwrap();
}

pub fn type_text(tx: &Sender<TerminalEvent>, text: &str) {
    for c in text.chars() {
        press(tx, KeyCode::Char(c));
    }
}

pub fn ctrl_c(tx: &Sender<TerminalEvent>) {
    tx.send(TerminalEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)))
        .unwrap();
}

pub const WAIT: Duration = Duration::from_secs(5);
