// UI layer: the interactive credential prompt used by `--login`.
// The terminal is switched to raw mode for the whole prompt and restored by
// `RawModeGuard` on every exit path, including panics.

use std::io::{self, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use crossterm::tty::IsTty;
use tracing::warn;

use crate::config::Config;
use crate::error::TerminalError;

/// Holds the terminal in raw mode until dropped.
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    pub fn acquire() -> Result<Self, TerminalError> {
        terminal::enable_raw_mode().map_err(TerminalError::RawMode)?;
        Ok(RawModeGuard { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("failed to restore terminal mode: {e}");
        }
    }
}

/// Whether typed characters are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo {
    Visible,
    Hidden,
}

/// What a key press did to the line being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Inserted(char),
    Erased,
    /// Ctrl-U wiped this many characters.
    Cleared(usize),
    Submit,
    Cancel,
    Ignored,
}

/// Minimal line editor fed with key events.
#[derive(Debug, Default)]
pub struct LineEditor {
    line: String,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.kind == KeyEventKind::Release {
            return KeyOutcome::Ignored;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => KeyOutcome::Submit,
            KeyCode::Char('c') if ctrl => KeyOutcome::Cancel,
            KeyCode::Char('d') if ctrl && self.line.is_empty() => KeyOutcome::Cancel,
            KeyCode::Char('u') if ctrl && !self.line.is_empty() => {
                let count = self.line.chars().count();
                self.line.clear();
                KeyOutcome::Cleared(count)
            }
            KeyCode::Char(_) if ctrl => KeyOutcome::Ignored,
            KeyCode::Char(c) => {
                self.line.push(c);
                KeyOutcome::Inserted(c)
            }
            KeyCode::Backspace => match self.line.pop() {
                Some(_) => KeyOutcome::Erased,
                None => KeyOutcome::Ignored,
            },
            _ => KeyOutcome::Ignored,
        }
    }

    pub fn into_line(self) -> String {
        self.line
    }
}

/// Ask for server URL, username and password on the controlling terminal.
pub fn prompt_credentials() -> Result<Config, TerminalError> {
    if !io::stdin().is_tty() {
        return Err(TerminalError::NotATerminal);
    }
    let _raw = RawModeGuard::acquire()?;
    let mut out = io::stdout();

    let server_url = read_line(&mut out, "Server URL: ", Echo::Visible)?;
    let username = read_line(&mut out, "Username: ", Echo::Visible)?;
    let password = read_line(&mut out, "Password: ", Echo::Hidden)?;

    Ok(Config {
        server_url: server_url.trim().to_string(),
        username,
        password,
    })
}

fn read_line(out: &mut impl Write, prompt: &str, echo: Echo) -> Result<String, TerminalError> {
    write!(out, "{prompt}").map_err(TerminalError::Read)?;
    out.flush().map_err(TerminalError::Read)?;

    let mut editor = LineEditor::new();
    loop {
        let key = match event::read().map_err(TerminalError::Read)? {
            Event::Key(key) => key,
            _ => continue,
        };
        let outcome = editor.handle(key);
        let written = match (&outcome, echo) {
            (KeyOutcome::Inserted(c), Echo::Visible) => write!(out, "{c}"),
            (KeyOutcome::Erased, Echo::Visible) => write!(out, "\u{8} \u{8}"),
            (KeyOutcome::Cleared(count), Echo::Visible) => {
                write!(out, "{}", "\u{8} \u{8}".repeat(*count))
            }
            // Raw mode needs an explicit carriage return.
            (KeyOutcome::Submit | KeyOutcome::Cancel, _) => write!(out, "\r\n"),
            _ => Ok(()),
        };
        written
            .and_then(|_| out.flush())
            .map_err(TerminalError::Read)?;

        match outcome {
            KeyOutcome::Submit => return Ok(editor.into_line()),
            KeyOutcome::Cancel => return Err(TerminalError::Interrupted),
            _ => {}
        }
    }
}
