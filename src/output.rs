use std::io::Write;

use crate::themes::ColorMode;

/// Writes progress, warnings and errors to stderr.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    color: ColorMode,
}

impl Reporter {
    pub fn new(color: ColorMode) -> Self {
        // crossterm honours NO_COLOR on its own; FORCE_COLOR has to win.
        crossterm::style::force_color_output(color == ColorMode::Always);
        Self { color }
    }

    /// Start a progress line, finished by [`Reporter::done`] or [`Reporter::failed`].
    pub fn doing(&self, msg: &str) {
        write_stderr(&format!("{}...", msg));
    }

    pub fn done(&self) {
        write_stderr("done\n");
    }

    pub fn failed(&self) {
        write_stderr("failed\n");
    }

    pub fn log(&self, msg: &str) {
        write_stderr(&format!("{}\n", msg));
    }

    pub fn warn(&self, msg: &str) {
        self.log(&format!("{}{}", self.color.warn_tag(), msg));
    }

    pub fn err(&self, msg: &str) {
        self.log(&format!("{}{}", self.color.err_tag(), msg));
    }
}

fn write_stderr(text: &str) {
    let mut stderr = std::io::stderr().lock();
    // Nothing sensible to do when stderr itself is gone.
    let _ = stderr.write_all(text.as_bytes());
    let _ = stderr.flush();
}
