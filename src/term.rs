//! Terminal control: screen clearing, frame drawing, interrupt keys.

use std::io::{stdout, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType},
};
use log::warn;

use crate::Result;

/// Raw-mode terminal session for frame output.
///
/// `leave` runs on drop as well, so the terminal is restored on every exit
/// path, including errors and interrupts.
pub struct Terminal {
    stdout: Stdout,
    active: bool,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            stdout: stdout(),
            active: false,
        }
    }

    /// Enter raw mode, hide the cursor and clear the screen.
    pub fn enter(&mut self) -> Result<()> {
        enable_raw_mode()?;
        execute!(self.stdout, Hide, Clear(ClearType::All))?;
        self.active = true;
        Ok(())
    }

    /// Restore the cursor and leave raw mode. Idempotent.
    pub fn leave(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        execute!(self.stdout, Show, Clear(ClearType::All), MoveTo(0, 0))?;
        disable_raw_mode()?;
        self.active = false;
        Ok(())
    }

    /// Clear the screen and draw one text frame from the top-left corner.
    pub fn draw(&mut self, frame: &str) -> Result<()> {
        queue!(self.stdout, Clear(ClearType::All))?;
        for (row, line) in frame.lines().enumerate() {
            queue!(self.stdout, MoveTo(0, row as u16), Print(line))?;
        }
        self.stdout.flush()?;
        Ok(())
    }

    /// Poll pending key events without blocking.
    ///
    /// `q`, `Esc` and Ctrl+C all request an interrupt; anything else is
    /// discarded.
    pub fn interrupt_requested(&self) -> Result<bool> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(true)
                    }
                    _ => {}
                }
            }
        }
        Ok(false)
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if let Err(e) = self.leave() {
            warn!("failed to restore terminal: {}", e);
        }
    }
}
