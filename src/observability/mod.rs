//! Observability for sqld
//!
//! Structured JSON logging of lifecycle events and answered requests.
//!
//! # Usage
//!
//! ```ignore
//! use sqld::observability::{log_event_with_fields, Event, Logger};
//!
//! Logger::info("REQUEST", &[("status", "200")]);
//! log_event_with_fields(Event::Serving, &[("addr", "0.0.0.0:8080")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

fn severity_of(event: Event) -> Severity {
    if event.is_fatal() {
        Severity::Fatal
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    match severity_of(event) {
        Severity::Fatal => Logger::fatal(event.as_str(), fields),
        severity => Logger::log(severity, event.as_str(), fields),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_of_events() {
        assert_eq!(severity_of(Event::BootFailed), Severity::Fatal);
        assert_eq!(severity_of(Event::Serving), Severity::Info);
    }

    #[test]
    fn test_log_event() {
        // This just verifies no panic
        log_event(Event::BootStart);
        log_event_with_fields(Event::ConfigLoaded, &[("port", "8080")]);
    }
}
