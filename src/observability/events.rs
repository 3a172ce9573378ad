//! Observable events
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events in sqld
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Startup begins
    BootStart,
    /// Configuration resolved from file and flags
    ConfigLoaded,
    /// Database handle opened
    DatabaseConnected,
    /// Startup failed (FATAL)
    BootFailed,
    /// Listener bound, ready for requests
    Serving,
    /// Shutdown initiated
    ShutdownStart,
    /// Shutdown complete
    ShutdownComplete,

    // Requests
    /// One HTTP request answered
    Request,
    /// One item of a batch create failed
    BatchItemFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "SQLD_STARTUP_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::DatabaseConnected => "DATABASE_CONNECTED",
            Event::BootFailed => "SQLD_STARTUP_FAILED",
            Event::Serving => "SQLD_SERVING",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",

            Event::Request => "REQUEST",
            Event::BatchItemFailed => "BATCH_ITEM_FAILED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::BootFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_boot_failure_is_fatal() {
        assert!(Event::BootFailed.is_fatal());
        assert!(!Event::Request.is_fatal());
        assert!(!Event::BatchItemFailed.is_fatal());
    }

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(Event::Serving.to_string(), "SQLD_SERVING");
    }
}
