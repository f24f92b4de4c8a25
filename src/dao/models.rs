use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, serde_as};

/// Row of the `players` table.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerEntity {
    /// Primary key of the player row.
    pub id: i64,
    /// Display name of the player.
    pub player: String,
    /// Team the player belongs to; `null` in the store decodes to an empty string.
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub team_name: String,
}

/// Projection of `questions_dd` used to list distinct themes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThemeEntity {
    /// Theme of the question, may be missing in hand-edited rows.
    #[serde(default)]
    pub theme: Option<String>,
}

/// Projection of `questions_dd` used by the numbers grid.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionSummaryEntity {
    /// Primary key of the question row.
    pub id: i64,
    /// Number displayed on the grid (1–30 by convention).
    pub question_number: i32,
    /// Whether the question has already been played.
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub used: bool,
}

/// Full row of the `questions_dd` table.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionEntity {
    /// Primary key of the question row.
    pub id: i64,
    /// Category the question belongs to.
    pub theme: String,
    /// Number displayed on the grid.
    pub question_number: i32,
    /// Question text.
    pub question: String,
    /// Text of option A.
    pub option_a: String,
    /// Text of option B.
    pub option_b: String,
    /// Text of option C.
    pub option_c: String,
    /// Text of option D.
    pub option_d: String,
    /// Letter of the correct option as stored (not normalised).
    pub correct_option: String,
    /// Whether the question has already been played.
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub used: bool,
}

impl From<&QuestionEntity> for QuestionSummaryEntity {
    fn from(value: &QuestionEntity) -> Self {
        Self {
            id: value.id,
            question_number: value.question_number,
            used: value.used,
        }
    }
}
