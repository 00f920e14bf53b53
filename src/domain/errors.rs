//! Domain error types
//!
//! This module defines the error hierarchy for orderflow. Adapter errors are
//! wrapped in their own enums so that `reqwest` and `duckdb` types never leak
//! past the adapter layer.

use thiserror::Error;

/// Exit code for configuration errors
pub const EXIT_CONFIGURATION: i32 = 2;

/// Exit code for a remote store whose identity does not match
pub const EXIT_IDENTITY_MISMATCH: i32 = 3;

/// Exit code for connectivity errors (database file or API unreachable)
pub const EXIT_CONNECTIVITY: i32 = 4;

/// Exit code for any other fatal error
pub const EXIT_FATAL: i32 = 5;

/// Main orderflow error type
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Local database unreachable or its catalog is empty
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// The remote store answered with an unexpected identity
    #[error("Store identity mismatch: expected '{expected}', got '{actual}'")]
    IdentityMismatch { expected: String, actual: String },

    /// Shopify API errors
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// DuckDB errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// CSV export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl PipelineError {
    /// Process exit code associated with this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Configuration(_) | PipelineError::Validation(_) => EXIT_CONFIGURATION,
            PipelineError::IdentityMismatch { .. } => EXIT_IDENTITY_MISMATCH,
            PipelineError::Connectivity(_) => EXIT_CONNECTIVITY,
            PipelineError::Shopify(e) if e.is_connectivity() => EXIT_CONNECTIVITY,
            PipelineError::Database(DatabaseError::ConnectionFailed(_)) => EXIT_CONNECTIVITY,
            _ => EXIT_FATAL,
        }
    }
}

/// Shopify Admin API errors
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// Failed to reach the store
    #[error("Failed to connect to Shopify: {0}")]
    ConnectionFailed(String),

    /// Access token rejected (401/403)
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Request throttled (429)
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Request timed out
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Body was not the expected JSON shape
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

impl ShopifyError {
    /// Whether the error means the API could not be reached or authenticated
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            ShopifyError::ConnectionFailed(_)
                | ShopifyError::Timeout(_)
                | ShopifyError::AuthenticationFailed(_)
        )
    }
}

/// DuckDB store errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to open the database file
    #[error("Failed to open database: {0}")]
    ConnectionFailed(String),

    /// SQL statement failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Constraint could not be created or was violated
    #[error("Constraint error: {0}")]
    ConstraintFailed(String),

    /// Table or schema is missing
    #[error("Table not found: {0}")]
    TableNotFound(String),
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for PipelineError {
    fn from(err: toml::de::Error) -> Self {
        PipelineError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_display() {
        let err = PipelineError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_identity_mismatch_display() {
        let err = PipelineError::IdentityMismatch {
            expected: "No Name Business 123".to_string(),
            actual: "Other Store".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Store identity mismatch: expected 'No Name Business 123', got 'Other Store'"
        );
    }

    #[test]
    fn test_shopify_error_conversion() {
        let err: PipelineError = ShopifyError::Timeout("30s".to_string()).into();
        assert!(matches!(err, PipelineError::Shopify(_)));
    }

    #[test]
    fn test_database_error_conversion() {
        let err: PipelineError = DatabaseError::QueryFailed("syntax".to_string()).into();
        assert!(matches!(err, PipelineError::Database(_)));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            PipelineError::Configuration("x".into()).exit_code(),
            EXIT_CONFIGURATION
        );
        assert_eq!(
            PipelineError::Connectivity("x".into()).exit_code(),
            EXIT_CONNECTIVITY
        );
        assert_eq!(
            PipelineError::IdentityMismatch {
                expected: "a".into(),
                actual: "b".into()
            }
            .exit_code(),
            EXIT_IDENTITY_MISMATCH
        );
        assert_eq!(
            PipelineError::from(ShopifyError::AuthenticationFailed("401".into())).exit_code(),
            EXIT_CONNECTIVITY
        );
        assert_eq!(
            PipelineError::from(ShopifyError::InvalidResponse("bad".into())).exit_code(),
            EXIT_FATAL
        );
        assert_eq!(
            PipelineError::from(DatabaseError::ConnectionFailed("locked".into())).exit_code(),
            EXIT_CONNECTIVITY
        );
        assert_eq!(PipelineError::Export("disk".into()).exit_code(), EXIT_FATAL);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: PipelineError = io_err.into();
        assert!(matches!(err, PipelineError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{orders:").unwrap_err();
        let err: PipelineError = json_err.into();
        assert!(matches!(err, PipelineError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: PipelineError = toml_err.into();
        assert!(err.to_string().contains("TOML parse error"));
    }
}
