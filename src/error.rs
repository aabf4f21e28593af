//! Error handling for patchbay
//!
//! Graph operations report [`GraphError`]; everything above the graph
//! (configuration, the evaluator thread, file handling in the runner) uses
//! the crate-level [`Error`] and [`Result`] alias defined here.

use crate::graph::GraphError;
use thiserror::Error;

/// Main error type for patchbay operations
#[derive(Error, Debug)]
pub enum Error {
    /// Errors raised by the element graph
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The evaluator thread panicked during a tick
    #[error("Evaluator thread panicked")]
    EvaluatorPanicked,

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for patchbay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, GraphError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::from(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| Error::from(e).with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Config("Invalid tick rate".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid tick rate");
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::EvaluatorPanicked;
        let with_ctx = err.with_context("Failed to stop engine");
        assert!(with_ctx.to_string().contains("Failed to stop engine"));
        assert!(with_ctx.to_string().contains("panicked"));
    }

    #[test]
    fn test_graph_result_context() {
        let result: std::result::Result<(), GraphError> =
            Err(GraphError::UnknownElementType("math/nope".to_string()));
        let err = result.context("Loading demo.json").unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("Loading demo.json: "));
        assert!(text.contains("math/nope"));
    }
}
