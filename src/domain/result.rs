//! Result type alias for Meridian
//!
//! Fallible operations throughout the crate return this alias so that the
//! error side is always [`MeridianError`].

use super::errors::MeridianError;

/// Result type alias for Meridian operations
///
/// # Examples
///
/// ```
/// use meridian::domain::result::Result;
/// use meridian::domain::errors::MeridianError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(MeridianError::Validation("Invalid report".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, MeridianError>;
