//! ANSI terminal implementations of the display collaborators.

use std::io::{self, Write};

use tracing::{info, warn};

use lmsh_core::display::{DisplaySurface, StatusSink};

/// Display surface backed by stdout.
///
/// The terminal runs in raw mode, so bare line feeds are expanded to
/// carriage return plus line feed before writing.
#[derive(Debug, Default)]
pub struct TermDisplay {
    _private: (),
}

impl TermDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    fn emit(&self, text: &str) {
        let normalized = text.replace("\r\n", "\n").replace('\n', "\r\n");
        let mut stdout = io::stdout().lock();
        if let Err(e) = stdout.write_all(normalized.as_bytes()).and_then(|_| stdout.flush()) {
            warn!(error = %e, "stdout write failed");
        }
    }
}

impl DisplaySurface for TermDisplay {
    fn write(&mut self, text: &str) {
        self.emit(text);
    }

    fn writeln(&mut self, text: &str) {
        self.emit(text);
        self.emit("\n");
    }

    fn clear(&mut self) {
        self.emit("\x1b[H\x1b[2J\x1b[3J");
    }
}

/// Status indicator that reports connection changes through the log.
#[derive(Debug, Default)]
pub struct StatusReporter {
    _private: (),
}

impl StatusReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusSink for StatusReporter {
    fn connection_changed(&mut self, connected: bool) {
        if connected {
            info!("status: connected");
        } else {
            info!("status: disconnected");
        }
    }
}
