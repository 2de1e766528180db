//! Recording notification, redirect, and persisted-state sinks.

use fathom_core::remote::{Notifier, RedirectSink, StateStore};
use fathom_core::types::SearchState;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Warn,
    Error,
    Info,
}

/// One recorded user notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotifyLevel,
    pub message: String,
}

/// [`Notifier`] that mirrors messages to `tracing` and records them for
/// assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Rc<RefCell<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the recorded notifications.
    pub fn log(&self) -> Rc<RefCell<Vec<Notification>>> {
        Rc::clone(&self.notifications)
    }

    fn record(&self, level: NotifyLevel, msg: &str) {
        self.notifications
            .borrow_mut()
            .push(Notification { level, message: msg.to_string() });
    }
}

impl Notifier for RecordingNotifier {
    fn warn(&self, msg: &str) {
        tracing::warn!(msg, "user notification");
        self.record(NotifyLevel::Warn, msg);
    }

    fn error(&self, msg: &str) {
        tracing::error!(msg, "user notification");
        self.record(NotifyLevel::Error, msg);
    }

    fn info(&self, msg: &str) {
        tracing::info!(msg, "user notification");
        self.record(NotifyLevel::Info, msg);
    }
}

/// [`RedirectSink`] that records the last redirect target.
#[derive(Default)]
pub struct RecordingRedirect {
    target: Rc<RefCell<Option<String>>>,
}

impl RecordingRedirect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the recorded redirect target.
    pub fn target(&self) -> Rc<RefCell<Option<String>>> {
        Rc::clone(&self.target)
    }
}

impl RedirectSink for RecordingRedirect {
    fn redirect_to(&self, path: &str) {
        tracing::info!(path, "redirect");
        *self.target.borrow_mut() = Some(path.to_string());
    }
}

/// [`StateStore`] that keeps every committed snapshot in memory.
#[derive(Default)]
pub struct InMemoryStateStore {
    saved: Rc<RefCell<Vec<SearchState>>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the saved snapshots, newest last.
    pub fn snapshots(&self) -> Rc<RefCell<Vec<SearchState>>> {
        Rc::clone(&self.saved)
    }
}

impl StateStore for InMemoryStateStore {
    fn save(&mut self, state: &SearchState) {
        self.saved.borrow_mut().push(state.clone());
    }
}
