//! Recording collaborators for display and status assertions.
//!
//! The transcript accumulates across `clear()` calls so tests can assert on
//! everything ever rendered; clears are counted separately.

use std::sync::{Arc, Mutex};

use lmsh_core::display::{DisplaySurface, StatusSink};

#[derive(Default)]
struct DisplayInner {
    transcript: String,
    clears: usize,
}

/// A display surface that records everything written to it.
#[derive(Clone, Default)]
pub struct RecordingDisplay {
    inner: Arc<Mutex<DisplayInner>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, clears excluded.
    pub fn transcript(&self) -> String {
        self.inner.lock().unwrap().transcript.clone()
    }

    /// Number of `clear()` calls seen.
    pub fn clears(&self) -> usize {
        self.inner.lock().unwrap().clears
    }

    /// Whether the transcript contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.transcript().contains(needle)
    }

    /// How many times `needle` appears in the transcript.
    pub fn count(&self, needle: &str) -> usize {
        self.transcript().matches(needle).count()
    }
}

impl DisplaySurface for RecordingDisplay {
    fn write(&mut self, text: &str) {
        self.inner.lock().unwrap().transcript.push_str(text);
    }

    fn writeln(&mut self, text: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.transcript.push_str(text);
        inner.transcript.push('\n');
    }

    fn clear(&mut self) {
        self.inner.lock().unwrap().clears += 1;
    }
}

/// A status sink that records every connection state change.
#[derive(Clone, Default)]
pub struct RecordingStatus {
    history: Arc<Mutex<Vec<bool>>>,
}

impl RecordingStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// All state changes in arrival order.
    pub fn history(&self) -> Vec<bool> {
        self.history.lock().unwrap().clone()
    }

    /// The most recent state, if any change was seen.
    pub fn last(&self) -> Option<bool> {
        self.history.lock().unwrap().last().copied()
    }
}

impl StatusSink for RecordingStatus {
    fn connection_changed(&mut self, connected: bool) {
        self.history.lock().unwrap().push(connected);
    }
}
