//! Diagnostic log sink for component instances.
//!
//! Models write messages through the [`Logger`] owned by their instance.
//! Where messages end up is decided by the host: a [`LogSink`] is supplied
//! at instantiation, defaulting to [`TracingSink`].

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

/// Severity of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Pending,
    Discard,
    Warning,
    Error,
    Fatal,
}

impl Status {
    /// Whether this status is always delivered regardless of debug logging.
    pub fn is_problem(&self) -> bool {
        matches!(self, Self::Warning | Self::Error | Self::Fatal)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Pending => write!(f, "pending"),
            Self::Discard => write!(f, "discard"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

/// Destination for log messages emitted by a component instance.
pub trait LogSink {
    fn log(&self, instance_name: &str, status: Status, category: &str, message: &str);
}

/// Forwards log messages to `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, instance_name: &str, status: Status, category: &str, message: &str) {
        match status {
            Status::Ok => debug!(instance = instance_name, category, "{message}"),
            Status::Pending | Status::Discard | Status::Warning => {
                warn!(instance = instance_name, category, %status, "{message}")
            }
            Status::Error | Status::Fatal => {
                error!(instance = instance_name, category, %status, "{message}")
            }
        }
    }
}

/// Per-instance logger with a debug-logging switch.
///
/// Warnings and errors are always delivered. Other messages are delivered
/// only while debug logging is on and their category is enabled; an empty
/// category list enables every category.
pub struct Logger {
    instance_name: String,
    sink: Box<dyn LogSink>,
    debug_logging: bool,
    categories: Vec<String>,
}

impl Logger {
    pub fn new(instance_name: impl Into<String>, sink: Box<dyn LogSink>) -> Self {
        Self {
            instance_name: instance_name.into(),
            sink,
            debug_logging: false,
            categories: Vec::new(),
        }
    }

    /// Turn debug logging on or off for the given categories.
    pub fn set_debug_logging(&mut self, enabled: bool, categories: Vec<String>) {
        self.debug_logging = enabled;
        self.categories = categories;
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    /// Whether a message with this status and category would be delivered.
    pub fn enabled(&self, status: Status, category: &str) -> bool {
        if status.is_problem() {
            return true;
        }
        self.debug_logging
            && (self.categories.is_empty() || self.categories.iter().any(|c| c == category))
    }

    /// Log a message under the given category.
    pub fn log_category(&self, status: Status, category: &str, message: &str) {
        if self.enabled(status, category) {
            self.sink
                .log(&self.instance_name, status, category, message);
        }
    }

    /// Log a message under the category named after its status.
    pub fn log(&self, status: Status, message: &str) {
        let category = status.to_string();
        self.log_category(status, &category, message);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("instance_name", &self.instance_name)
            .field("debug_logging", &self.debug_logging)
            .field("categories", &self.categories)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tracing_test::traced_test;

    type Captured = Rc<RefCell<Vec<(Status, String, String)>>>;

    struct Capture(Captured);

    impl LogSink for Capture {
        fn log(&self, _instance: &str, status: Status, category: &str, message: &str) {
            self.0
                .borrow_mut()
                .push((status, category.to_string(), message.to_string()));
        }
    }

    fn capture_logger() -> (Logger, Captured) {
        let captured: Captured = Rc::default();
        let logger = Logger::new("probe", Box::new(Capture(captured.clone())));
        (logger, captured)
    }

    #[test]
    fn ok_messages_need_debug_logging() {
        let (mut logger, captured) = capture_logger();
        logger.log(Status::Ok, "quiet");
        assert!(captured.borrow().is_empty());

        logger.set_debug_logging(true, Vec::new());
        logger.log(Status::Ok, "loud");
        assert_eq!(captured.borrow().len(), 1);
        assert_eq!(captured.borrow()[0].2, "loud");
    }

    #[test]
    fn problems_always_delivered() {
        let (logger, captured) = capture_logger();
        logger.log(Status::Warning, "careful");
        logger.log(Status::Error, "broken");
        let got = captured.borrow();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].0, Status::Warning);
        assert_eq!(got[1].1, "error");
    }

    #[test]
    fn categories_filter_debug_messages() {
        let (mut logger, captured) = capture_logger();
        logger.set_debug_logging(true, vec!["step".to_string()]);
        logger.log_category(Status::Ok, "step", "kept");
        logger.log_category(Status::Ok, "init", "dropped");
        let got = captured.borrow();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].2, "kept");
    }

    #[traced_test]
    #[test]
    fn tracing_sink_emits_events() {
        TracingSink.log("probe", Status::Warning, "warning", "disk almost full");
        assert!(logs_contain("disk almost full"));
    }
}
