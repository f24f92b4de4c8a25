//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::state::session::OptionLetter;

/// Validates that a value names one of the four answer options.
///
/// # Examples
///
/// ```ignore
/// validate_option_letter("B")   // Ok
/// validate_option_letter(" c ") // Ok - trimmed and upper-cased
/// validate_option_letter("E")   // Err
/// ```
pub fn validate_option_letter(value: &str) -> Result<(), ValidationError> {
    if value.parse::<OptionLetter>().is_ok() {
        return Ok(());
    }

    let mut err = ValidationError::new("option_letter");
    err.message = Some(format!("Option must be one of A, B, C or D (got `{value}`)").into());
    Err(err)
}
