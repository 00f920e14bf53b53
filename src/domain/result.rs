//! Result type alias for orderflow

use super::errors::PipelineError;

/// Result type alias using [`PipelineError`]
///
/// # Examples
///
/// ```
/// use orderflow::domain::result::Result;
/// use orderflow::domain::errors::PipelineError;
///
/// fn failing_function() -> Result<()> {
///     Err(PipelineError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, PipelineError>;
