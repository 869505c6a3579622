//! Error types for wellcost-core
//!
//! Errors only exist at the file boundary. Once a catalog or estimate is in
//! memory, malformed values have already been coerced and recorded in a
//! [`LoadReport`] instead of failing the run.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for wellcost operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // IO Errors
    // ===================
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported file format for {path} (expected one of: {expected})")]
    UnsupportedFormat { path: PathBuf, expected: String },

    // ===================
    // Parse Errors
    // ===================
    #[error("Failed to parse JSON in {path}: {message}")]
    JsonParse {
        path: PathBuf,
        message: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse YAML in {path}: {message}")]
    YamlParse {
        path: PathBuf,
        message: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse TOML in {path}: {message}")]
    TomlParse {
        path: PathBuf,
        message: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Unexpected catalog layout in {path}: {message}")]
    CatalogShape { path: PathBuf, message: String },
}

impl CoreError {
    /// Map an IO error on `path` to `FileNotFound` or `FileRead`
    pub(crate) fn from_read(path: &std::path::Path, error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            CoreError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            CoreError::FileRead {
                path: path.to_path_buf(),
                source: error,
            }
        }
    }
}

/// Severity of a problem found during load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Value was coerced or skipped, loading went on
    Warning,
    /// Input was unusable and built-in defaults were used instead
    Error,
}

/// Individual entry in a load report
#[derive(Debug, Clone)]
pub struct LoadError {
    pub source: String,
    pub message: String,
    pub severity: ErrorSeverity,
    /// Actionable suggestion for user (optional)
    pub suggestion: Option<String>,
}

impl LoadError {
    pub fn warning(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            severity: ErrorSeverity::Warning,
            suggestion: None,
        }
    }

    /// Create user-friendly error from CoreError with context-aware suggestions
    pub fn from_core_error(source: impl Into<String>, error: &CoreError) -> Self {
        let source = source.into();
        let (message, suggestion) = match error {
            CoreError::FileNotFound { path } => (
                format!("File not found: {}", path.display()),
                Some(format!("Check if file exists: ls {}", path.display())),
            ),
            CoreError::FileRead { path, .. } => (
                format!("Cannot read file: {}", path.display()),
                Some(format!("Check permissions: chmod +r {}", path.display())),
            ),
            CoreError::UnsupportedFormat { path, expected } => (
                format!("Unsupported file: {}", path.display()),
                Some(format!("Convert the file to one of: {}", expected)),
            ),
            CoreError::JsonParse { path, message, .. } => (
                format!("Invalid JSON in {}: {}", path.display(), message),
                Some("Validate JSON syntax with: jq . <file>".to_string()),
            ),
            CoreError::TomlParse { path, message, .. } => (
                format!("Invalid TOML in {}: {}", path.display(), message),
                Some("Check quoting of keys that contain spaces or colons".to_string()),
            ),
            CoreError::CatalogShape { path, message } => (
                format!("Unexpected catalog layout in {}: {}", path.display(), message),
                Some("Export the \"Data\" sheet as an array of row objects".to_string()),
            ),
            _ => (error.to_string(), None),
        };

        Self {
            source,
            message,
            severity: ErrorSeverity::Error,
            suggestion,
        }
    }
}

/// Problems met while loading a catalog, pricing config or estimate file
///
/// Nothing recorded here stops an estimate: coerced cells and skipped rows
/// are listed so the user can see why a number came out the way it did.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub errors: Vec<LoadError>,
    pub rows_loaded: usize,
    pub rows_skipped: usize,
    pub values_coerced: usize,
}

impl LoadReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: LoadError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, source: impl Into<String>, message: impl Into<String>) {
        self.errors.push(LoadError::warning(source, message));
    }

    /// Record a value that was replaced, clamped or rounded
    pub fn add_coercion(&mut self, source: impl Into<String>, message: impl Into<String>) {
        self.values_coerced += 1;
        self.add_warning(source, message);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// (warnings, errors)
    pub fn error_count(&self) -> (usize, usize) {
        let warnings = self
            .errors
            .iter()
            .filter(|e| e.severity == ErrorSeverity::Warning)
            .count();
        (warnings, self.errors.len() - warnings)
    }
}
