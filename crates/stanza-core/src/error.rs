//! Error types for Stanza operations.
//!
//! Each error has:
//! - A unique error code (e.g., E0101) for easy reference and searching
//! - A clear error message explaining what went wrong
//! - Suggestions for how to fix the issue

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Error codes for Stanza errors.
///
/// These codes make it easy to search for solutions and reference specific errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Package errors (E01xx)
    /// Invalid package name format
    E0101,
    /// Invalid version string
    E0102,
    /// Invalid version constraint format
    E0103,
    /// Invalid environment marker
    E0104,

    // Manifest errors (E02xx)
    /// Invalid project manifest
    E0201,
    /// Missing required field
    E0202,
    /// Invalid JSON syntax
    E0203,

    // IO errors (E03xx)
    /// File not found
    E0301,
    /// Permission denied
    E0302,
    /// File already exists
    E0303,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::E0101 => "E0101",
            Self::E0102 => "E0102",
            Self::E0103 => "E0103",
            Self::E0104 => "E0104",
            Self::E0201 => "E0201",
            Self::E0202 => "E0202",
            Self::E0203 => "E0203",
            Self::E0301 => "E0301",
            Self::E0302 => "E0302",
            Self::E0303 => "E0303",
        }
    }

    /// Get a brief title for this error code.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::E0101 => "Invalid package name",
            Self::E0102 => "Invalid version",
            Self::E0103 => "Invalid constraint",
            Self::E0104 => "Invalid marker",
            Self::E0201 => "Invalid manifest",
            Self::E0202 => "Missing field",
            Self::E0203 => "Invalid JSON",
            Self::E0301 => "File not found",
            Self::E0302 => "Permission denied",
            Self::E0303 => "File already exists",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for Stanza operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Invalid package name.
    #[error("[E0101] invalid package name: {name}")]
    InvalidPackageName {
        /// The offending name.
        name: String,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },

    /// Invalid version string.
    #[error("[E0102] invalid version: {input}")]
    InvalidVersion {
        /// The offending input.
        input: String,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },

    /// Invalid version constraint.
    #[error("[E0103] invalid constraint: {input}")]
    InvalidConstraint {
        /// The offending input.
        input: String,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },

    /// Invalid environment marker.
    #[error("[E0104] invalid marker: {input}")]
    InvalidMarker {
        /// The offending input.
        input: String,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },

    /// Invalid manifest.
    #[error("[{code}] invalid manifest: {message}")]
    InvalidManifest {
        /// Error code.
        #[source]
        code: ErrorCodeSource,
        /// Error message.
        message: String,
        /// File path.
        path: Option<PathBuf>,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },

    /// JSON error.
    #[error("[E0203] json error: {0}")]
    Json(#[from] sonic_rs::Error),

    /// IO error.
    #[error("[{code}] io error at {path}: {message}")]
    Io {
        /// Error code.
        #[source]
        code: ErrorCodeSource,
        /// File path.
        path: PathBuf,
        /// Error message.
        message: String,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },
}

/// Wrapper to make `ErrorCode` usable as a source.
#[derive(Debug)]
pub struct ErrorCodeSource(pub ErrorCode);

impl fmt::Display for ErrorCodeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_str())
    }
}

impl std::error::Error for ErrorCodeSource {}

impl Error {
    /// Get the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidPackageName { .. } => ErrorCode::E0101,
            Self::InvalidVersion { .. } => ErrorCode::E0102,
            Self::InvalidConstraint { .. } => ErrorCode::E0103,
            Self::InvalidMarker { .. } => ErrorCode::E0104,
            Self::InvalidManifest { code, .. } => code.0,
            Self::Json(_) => ErrorCode::E0203,
            Self::Io { code, .. } => code.0,
        }
    }

    /// Get suggestions for fixing this error.
    #[must_use]
    pub fn suggestions(&self) -> &[String] {
        match self {
            Self::InvalidPackageName { suggestions, .. }
            | Self::InvalidVersion { suggestions, .. }
            | Self::InvalidConstraint { suggestions, .. }
            | Self::InvalidMarker { suggestions, .. }
            | Self::InvalidManifest { suggestions, .. }
            | Self::Io { suggestions, .. } => suggestions,
            Self::Json(_) => &[],
        }
    }

    /// Create an invalid package name error with suggestions.
    #[must_use]
    pub fn invalid_package_name(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::InvalidPackageName {
            suggestions: vec![
                "Package names may contain letters, digits, '.', '-' and '_'".to_string(),
                "Names must start and end with a letter or digit".to_string(),
            ],
            name,
        }
    }

    /// Create an invalid version error with suggestions.
    #[must_use]
    pub fn invalid_version(input: impl Into<String>) -> Self {
        let input = input.into();
        Self::InvalidVersion {
            suggestions: vec![
                "Versions follow PEP 440, e.g. '1.2.3', '2.0.0b1' or '3.10.0.dev2'".to_string(),
            ],
            input,
        }
    }

    /// Create an invalid constraint error with suggestions.
    #[must_use]
    pub fn invalid_constraint(input: impl Into<String>) -> Self {
        let input = input.into();
        Self::InvalidConstraint {
            suggestions: vec![
                "Constraints look like '>=3.8,<4.0', '^1.2', '~2.7' or '3.8.*'".to_string(),
                "Combine alternatives with '||', e.g. '~2.7 || >=3.4'".to_string(),
            ],
            input,
        }
    }

    /// Create an invalid marker error with suggestions.
    #[must_use]
    pub fn invalid_marker(input: impl Into<String>) -> Self {
        let input = input.into();
        Self::InvalidMarker {
            suggestions: vec![
                "Markers look like 'python_version >= \"3.8\"'".to_string(),
                "Combine expressions with 'and' / 'or' and parentheses".to_string(),
            ],
            input,
        }
    }

    /// Create an invalid manifest error.
    #[must_use]
    pub fn invalid_manifest(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::InvalidManifest {
            code: ErrorCodeSource(ErrorCode::E0201),
            message: message.into(),
            path,
            suggestions: vec!["Validate the manifest against the pyproject schema".to_string()],
        }
    }

    /// Create a missing field manifest error.
    #[must_use]
    pub fn missing_field(field: impl Into<String>, path: Option<PathBuf>) -> Self {
        let field = field.into();
        Self::InvalidManifest {
            code: ErrorCodeSource(ErrorCode::E0202),
            message: format!("missing required field '{field}'"),
            path,
            suggestions: vec![format!("Add the '{field}' field to the manifest")],
        }
    }

    /// Create an IO error with context.
    #[must_use]
    #[allow(clippy::needless_pass_by_value)]
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        let (code, suggestions) = match err.kind() {
            std::io::ErrorKind::NotFound => (
                ErrorCode::E0301,
                vec![
                    format!("Check if the path exists: {}", path.display()),
                    "Verify you're in the correct directory".to_string(),
                ],
            ),
            std::io::ErrorKind::PermissionDenied => (
                ErrorCode::E0302,
                vec![
                    format!("Check permissions on: {}", path.display()),
                    "Try running with appropriate permissions".to_string(),
                ],
            ),
            std::io::ErrorKind::AlreadyExists => (
                ErrorCode::E0303,
                vec![format!("File already exists: {}", path.display())],
            ),
            _ => (
                ErrorCode::E0301,
                vec![format!("Check the file: {}", path.display())],
            ),
        };
        Self::Io {
            code: ErrorCodeSource(code),
            path,
            message: err.to_string(),
            suggestions,
        }
    }
}
