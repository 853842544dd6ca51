//! Classification of driver errors raised while running a script.

use crate::error::DriverError;

/// Message fragment MySQL reports for a statement with no SQL in it.
pub const QUERY_WAS_EMPTY: &str = "Query was empty";

/// Message fragment MySQL reports when creating an object that exists.
pub const ALREADY_EXISTS: &str = "already exists";

/// Outcome of classifying a driver error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The work was already done; skip the statement and carry on.
    Benign,
    /// Abort the script.
    Fatal,
}

/// Decides whether a failed statement aborts the script.
pub trait ErrorClassifier: Send + Sync {
    /// Classifies a driver error.
    fn classify(&self, err: &DriverError) -> ErrorClass;
}

/// Classifier keyed on substrings of the driver message.
#[derive(Debug, Clone)]
pub struct MessageClassifier {
    benign_patterns: Vec<String>,
}

impl Default for MessageClassifier {
    fn default() -> Self {
        Self {
            benign_patterns: vec![QUERY_WAS_EMPTY.into(), ALREADY_EXISTS.into()],
        }
    }
}

impl MessageClassifier {
    /// Creates a classifier that treats nothing as benign.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            benign_patterns: Vec::new(),
        }
    }

    /// Adds a message fragment that marks an error as benign.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.benign_patterns.push(pattern.into());
        self
    }
}

impl ErrorClassifier for MessageClassifier {
    fn classify(&self, err: &DriverError) -> ErrorClass {
        let message = err.message();
        if self
            .benign_patterns
            .iter()
            .any(|pattern| message.contains(pattern.as_str()))
        {
            ErrorClass::Benign
        } else {
            ErrorClass::Fatal
        }
    }
}
