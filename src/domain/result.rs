//! Result type alias for bibtasks

use super::errors::BibTaskError;

/// Result type alias for bibtasks operations
///
/// # Examples
///
/// ```
/// use bibtasks::domain::result::Result;
/// use bibtasks::domain::errors::BibTaskError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(BibTaskError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, BibTaskError>;
