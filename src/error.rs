//! Error handling for the pipeline engine
//!
//! This module defines the engine's error type and a Result alias for use
//! throughout the crate.
//!
//! Structural rejections (a source plugin dropped at the wrong position) are
//! not errors: the container reports them as `Ok(false)`.

use thiserror::Error;

/// Main error type for pipeline engine operations
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The resolver produced no variant at all, not even the fallback
    #[error("No plugin variant for '{name}' at position {index}")]
    UnresolvedPlugin { index: usize, name: String },

    /// A position outside the current pipeline was addressed
    #[error("Index {index} out of range for pipeline of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A record that should hold a `plugins` list does not
    #[error("Not a pipeline: {0}")]
    NotAPipeline(String),

    /// An edit the plugin variant cannot apply
    #[error("{variant} cannot apply edit: {message}")]
    InvalidEdit {
        variant: &'static str,
        message: String,
    },

    /// A record that does not have the `{ type, name, ... }` shape
    #[error("Invalid plugin record: {0}")]
    InvalidRecord(String),

    /// Malformed or unreachable JSON pointer
    #[error("Invalid JSON pointer: {0}")]
    InvalidPointer(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse errors
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML write errors
    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PipelineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Strip any context wrappers and return the underlying error
    pub fn root(&self) -> &PipelineError {
        match self {
            PipelineError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias for pipeline engine operations
pub type Result<T> = std::result::Result<T, PipelineError>;

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::IndexOutOfRange { index: 4, len: 2 };
        assert_eq!(
            err.to_string(),
            "Index 4 out of range for pipeline of length 2"
        );
    }

    #[test]
    fn test_error_with_context() {
        let err = PipelineError::UnresolvedPlugin {
            index: 1,
            name: "analitico.plugin.Missing".to_string(),
        };
        let with_ctx = err.with_context("Failed to load recipe");
        assert!(with_ctx.to_string().contains("Failed to load recipe"));
        assert!(with_ctx.to_string().contains("analitico.plugin.Missing"));
    }

    #[test]
    fn test_root_unwraps_nested_context() {
        let err = PipelineError::NotAPipeline("x".into())
            .with_context("inner")
            .with_context("outer");
        assert!(matches!(err.root(), PipelineError::NotAPipeline(_)));
    }

    #[test]
    fn test_result_ext_lazy_context() {
        let res: Result<()> = Err(PipelineError::Config("bad".into()));
        let err = res.with_context(|| format!("loading {}", "engine.toml")).unwrap_err();
        assert!(err.to_string().starts_with("loading engine.toml"));
    }
}
