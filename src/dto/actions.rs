//! Request bodies accepted by the session action routes.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::validation::validate_option_letter;

/// Request to change a team's score; the configured step is used when `delta` is omitted.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct ScoreAdjustmentRequest {
    #[serde(default)]
    #[validate(range(min = -100, max = 100))]
    pub delta: Option<i32>,
}

/// Request to open a category by name.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PickCategoryRequest {
    #[validate(length(min = 1, max = 200))]
    pub theme: String,
}

/// Request recording a click on an answer button.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SelectOptionRequest {
    /// Option letter; surrounding whitespace and case are ignored.
    #[validate(custom(function = "validate_option_letter"))]
    pub option: String,
}
