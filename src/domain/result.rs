//! Result type alias for CObs

use super::errors::CobsError;

/// Result type alias for CObs operations
///
/// # Examples
///
/// ```
/// use cobs::domain::result::Result;
/// use cobs::domain::errors::CobsError;
///
/// fn failing_function() -> Result<()> {
///     Err(CobsError::Contiguity)
/// }
/// ```
pub type Result<T> = std::result::Result<T, CobsError>;
