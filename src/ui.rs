//! Side effects the client asks its host to perform: moving between pages and
//! showing short notifications. Hosts supply their own implementations; the
//! ones here record navigation and write notifications to the log.

use std::fmt;
use std::sync::Mutex;

use tracing::{info, warn};

/// A navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Client-side route change. In-memory state is kept.
    Route(String),
    /// Full navigation to a location. The host must drop all in-memory state
    /// and start again from storage (see `AuthController::restore`).
    Location(String),
}

impl Navigation {
    pub fn target(&self) -> &str {
        match self {
            Navigation::Route(to) | Navigation::Location(to) => to,
        }
    }

    pub fn is_hard(&self) -> bool {
        matches!(self, Navigation::Location(_))
    }
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Navigation::Route(to) => write!(f, "route {}", to),
            Navigation::Location(to) => write!(f, "location {}", to),
        }
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, to: Navigation);
}

pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Keeps every navigation request in order.
#[derive(Default)]
pub struct History {
    entries: Mutex<Vec<Navigation>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Navigation> {
        self.lock().clone()
    }

    pub fn last(&self) -> Option<Navigation> {
        self.lock().last().cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Navigation>> {
        // A poisoned history is still a valid list of navigations.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Navigator for History {
    fn navigate(&self, to: Navigation) {
        info!("Navigating to {}", to);
        self.lock().push(to);
    }
}

/// Sends notifications to the log.
#[derive(Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        info!(event_name = "ui.notification", kind = "success", "{}", message);
    }

    fn error(&self, message: &str) {
        warn!(event_name = "ui.notification", kind = "error", "{}", message);
    }
}
