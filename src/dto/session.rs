use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::phase::VisiblePhase,
    state::{
        Snapshot,
        roster::Team,
        session::{OptionLetter, OptionStatus, QuestionDetail, QuestionSummary, Session},
    },
};

/// Everything a renderer needs to draw the current screen.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct SessionView {
    pub phase: VisiblePhase,
    /// True while a store call is in flight.
    pub loading: bool,
    /// True when the backend has no store connection.
    pub degraded: bool,
    pub round: u8,
    pub max_round: u8,
    pub lightning: bool,
    /// False until teams have been drawn once.
    pub teams_loaded: bool,
    pub teams: Vec<TeamView>,
    /// Categories in display order, pinned theme last.
    pub categories: Vec<String>,
    pub pinned_category: String,
    /// Whether the random draw has anything to pick from.
    pub can_draw_category: bool,
    pub current_category: Option<String>,
    pub questions: Vec<QuestionSummaryView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionView>,
}

impl SessionView {
    /// Project the session and phase machine into a view.
    pub fn build(session: &Session, snapshot: &Snapshot, degraded: bool, max_round: u8) -> Self {
        Self {
            phase: snapshot.phase.into(),
            loading: snapshot.pending.is_some(),
            degraded,
            round: session.round,
            max_round,
            lightning: session.lightning,
            teams_loaded: session.teams_loaded,
            teams: session.teams.iter().map(TeamView::from).collect(),
            categories: session.categories.categories().to_vec(),
            pinned_category: session.categories.pinned().to_string(),
            can_draw_category: !session.categories.raffle_pool().is_empty(),
            current_category: session.current_category.clone(),
            questions: session
                .questions
                .iter()
                .map(QuestionSummaryView::from)
                .collect(),
            question: session
                .current_question
                .as_ref()
                .map(|detail| QuestionView::build(session, detail)),
        }
    }
}

/// Team card on the scoreboard.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct TeamView {
    pub id: u32,
    pub name: String,
    pub members: Vec<String>,
    pub score: i32,
}

impl From<&Team> for TeamView {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id,
            name: team.name.clone(),
            members: team.members.clone(),
            score: team.score,
        }
    }
}

/// Cell of the numbers grid.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct QuestionSummaryView {
    pub id: i64,
    pub number: i32,
    pub used: bool,
}

impl From<&QuestionSummary> for QuestionSummaryView {
    fn from(summary: &QuestionSummary) -> Self {
        Self {
            id: summary.id,
            number: summary.number,
            used: summary.used,
        }
    }
}

/// Rendering hint for an answer button.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OptionStatusView {
    Correct,
    Wrong,
    Disabled,
    Default,
}

impl From<OptionStatus> for OptionStatusView {
    fn from(value: OptionStatus) -> Self {
        match value {
            OptionStatus::Correct => OptionStatusView::Correct,
            OptionStatus::Wrong => OptionStatusView::Wrong,
            OptionStatus::Disabled => OptionStatusView::Disabled,
            OptionStatus::Default => OptionStatusView::Default,
        }
    }
}

/// One answer button.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct OptionView {
    pub letter: String,
    pub text: String,
    pub status: OptionStatusView,
}

/// Question on screen together with its answer progress.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct QuestionView {
    pub id: i64,
    pub number: i32,
    pub theme: String,
    pub text: String,
    pub options: Vec<OptionView>,
    /// Letters clicked so far, in click order.
    pub selected: Vec<String>,
    pub correct_answered: bool,
    pub revealed: bool,
    pub can_reveal: bool,
    pub can_mark_used: bool,
}

impl QuestionView {
    fn build(session: &Session, detail: &QuestionDetail) -> Self {
        Self {
            id: detail.id,
            number: detail.number,
            theme: detail.theme.clone(),
            text: detail.text.clone(),
            options: OptionLetter::ALL
                .into_iter()
                .map(|letter| OptionView {
                    letter: letter.to_string(),
                    text: detail.option_text(letter).to_string(),
                    status: session.option_status(letter).into(),
                })
                .collect(),
            selected: session
                .answer
                .selected
                .iter()
                .map(ToString::to_string)
                .collect(),
            correct_answered: session.answer.correct_answered,
            revealed: session.answer.revealed,
            can_reveal: session.can_reveal(),
            can_mark_used: session.can_mark_used(),
        }
    }
}
