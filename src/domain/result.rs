//! Result type alias for Prontuario

use super::errors::ProntuarioError;

/// Result type alias for Prontuario operations
///
/// # Examples
///
/// ```
/// use prontuario::domain::result::Result;
/// use prontuario::domain::errors::ProntuarioError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(ProntuarioError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, ProntuarioError>;
