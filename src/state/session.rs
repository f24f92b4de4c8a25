//! In-memory session data owned by the controller: teams, rounds, categories and the
//! question currently on screen.

use std::{fmt, str::FromStr};

use indexmap::IndexSet;
use thiserror::Error;

use crate::{
    dao::models::{QuestionEntity, QuestionSummaryEntity},
    state::{
        categories::CategoryBoard,
        roster::{Team, TeamId},
    },
};

/// Identifier of a question row.
pub type QuestionId = i64;

/// One of the four answer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    /// All letters in display order.
    pub const ALL: [OptionLetter; 4] = [Self::A, Self::B, Self::C, Self::D];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }

    /// Compare against a stored correct option, ignoring case and surrounding whitespace.
    ///
    /// The stored value is not required to be one of A–D; anything else simply never matches.
    pub fn matches(self, stored: &str) -> bool {
        stored.trim().to_uppercase() == self.as_str()
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name one of the four options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{0}` is not one of A, B, C or D")]
pub struct InvalidOptionLetter(pub String);

impl FromStr for OptionLetter {
    type Err = InvalidOptionLetter;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            _ => Err(InvalidOptionLetter(value.to_string())),
        }
    }
}

/// How an answer button should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionStatus {
    /// The correct option, shown once guessed or revealed.
    Correct,
    /// A selected option that is not the correct one.
    Wrong,
    /// A selected option not yet flagged either way.
    Disabled,
    /// Not selected.
    Default,
}

/// Entry of the numbers grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSummary {
    pub id: QuestionId,
    pub number: i32,
    pub used: bool,
}

impl From<QuestionSummaryEntity> for QuestionSummary {
    fn from(value: QuestionSummaryEntity) -> Self {
        Self {
            id: value.id,
            number: value.question_number,
            used: value.used,
        }
    }
}

/// Question opened from the numbers grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDetail {
    pub id: QuestionId,
    pub number: i32,
    pub theme: String,
    pub text: String,
    /// Option texts in A–D order.
    pub options: [String; 4],
    /// Correct option exactly as stored.
    pub correct_option: String,
}

impl QuestionDetail {
    /// Text of the given option.
    pub fn option_text(&self, letter: OptionLetter) -> &str {
        &self.options[letter as usize]
    }

    /// Whether `letter` is the correct option.
    pub fn is_correct(&self, letter: OptionLetter) -> bool {
        letter.matches(&self.correct_option)
    }
}

impl From<QuestionEntity> for QuestionDetail {
    fn from(value: QuestionEntity) -> Self {
        Self {
            id: value.id,
            number: value.question_number,
            theme: value.theme,
            text: value.question,
            options: [value.option_a, value.option_b, value.option_c, value.option_d],
            correct_option: value.correct_option,
        }
    }
}

/// Answer progress for the question on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerState {
    /// Options clicked so far, in click order.
    pub selected: IndexSet<OptionLetter>,
    /// The correct option has been clicked.
    pub correct_answered: bool,
    /// The host asked to show the correct option.
    pub revealed: bool,
}

/// Everything the controller knows about the running game night.
#[derive(Debug, Clone)]
pub struct Session {
    /// Current round, starting at 1.
    pub round: u8,
    /// Whether the tie-breaker round is on.
    pub lightning: bool,
    /// Teams from the last draw.
    pub teams: Vec<Team>,
    /// Whether teams have been drawn at least once.
    pub teams_loaded: bool,
    pub categories: CategoryBoard,
    pub current_category: Option<String>,
    /// Numbers grid of the current category.
    pub questions: Vec<QuestionSummary>,
    pub current_question: Option<QuestionDetail>,
    pub answer: AnswerState,
}

impl Session {
    /// Fresh session at round 1 with no data loaded.
    pub fn new(pinned_category: impl Into<String>) -> Self {
        Self {
            round: 1,
            lightning: false,
            teams: Vec::new(),
            teams_loaded: false,
            categories: CategoryBoard::new(pinned_category),
            current_category: None,
            questions: Vec::new(),
            current_question: None,
            answer: AnswerState::default(),
        }
    }

    /// Replace the teams with a fresh draw; previous scores are discarded.
    pub fn replace_teams(&mut self, teams: Vec<Team>) {
        self.teams = teams;
        self.teams_loaded = true;
    }

    /// Add `delta` to a team's score, returning the new score if the team exists.
    pub fn adjust_score(&mut self, team_id: TeamId, delta: i32) -> Option<i32> {
        self.teams
            .iter_mut()
            .find(|team| team.id == team_id)
            .map(|team| team.add_points(delta))
    }

    /// Advance to the next round (capped at `max_round`) and leave the lightning round.
    pub fn start_next_round(&mut self, max_round: u8) {
        self.round = self.round.saturating_add(1).min(max_round);
        self.lightning = false;
    }

    pub fn set_lightning(&mut self, enabled: bool) {
        self.lightning = enabled;
    }

    pub fn set_categories(&mut self, board: CategoryBoard) {
        self.categories = board;
    }

    /// Switch to a category, dropping any question left over from the previous one.
    pub fn enter_category(&mut self, theme: String, questions: Vec<QuestionSummary>) {
        self.current_category = Some(theme);
        self.questions = questions;
        self.current_question = None;
        self.answer = AnswerState::default();
    }

    /// Replace the numbers grid of the current category.
    pub fn refresh_questions(&mut self, questions: Vec<QuestionSummary>) {
        self.questions = questions;
    }

    pub fn summary(&self, id: QuestionId) -> Option<&QuestionSummary> {
        self.questions.iter().find(|summary| summary.id == id)
    }

    /// Flag a question as used in the local grid without refetching.
    pub fn flag_used(&mut self, id: QuestionId) {
        if let Some(summary) = self.questions.iter_mut().find(|summary| summary.id == id) {
            summary.used = true;
        }
    }

    /// Show a question with a clean answer state.
    pub fn open_question(&mut self, detail: QuestionDetail) {
        self.current_question = Some(detail);
        self.answer = AnswerState::default();
    }

    /// Drop the question on screen and its answer progress.
    pub fn close_question(&mut self) {
        self.current_question = None;
        self.answer = AnswerState::default();
    }

    /// Record a click on an option. Returns whether the selection changed.
    ///
    /// Clicks are ignored once the correct option was found, when the option was already
    /// clicked, or when no question is open.
    pub fn select_option(&mut self, letter: OptionLetter) -> bool {
        let Some(question) = &self.current_question else {
            return false;
        };
        if self.answer.correct_answered || self.answer.selected.contains(&letter) {
            return false;
        }

        self.answer.selected.insert(letter);
        if question.is_correct(letter) {
            self.answer.correct_answered = true;
        }
        true
    }

    /// Revealing is offered after a wrong guess, before the answer is known.
    pub fn can_reveal(&self) -> bool {
        self.current_question.is_some()
            && !self.answer.selected.is_empty()
            && !self.answer.correct_answered
            && !self.answer.revealed
    }

    /// Reveal the correct option. Returns whether the reveal was allowed.
    pub fn reveal_answer(&mut self) -> bool {
        if !self.can_reveal() {
            return false;
        }
        self.answer.revealed = true;
        true
    }

    /// Marking as used is offered once the answer is known.
    pub fn can_mark_used(&self) -> bool {
        self.current_question.is_some() && (self.answer.correct_answered || self.answer.revealed)
    }

    /// Button state for one option of the open question.
    pub fn option_status(&self, letter: OptionLetter) -> OptionStatus {
        let Some(question) = &self.current_question else {
            return OptionStatus::Default;
        };
        let correct = question.is_correct(letter);
        let selected = self.answer.selected.contains(&letter);

        if (self.answer.correct_answered || self.answer.revealed) && correct {
            OptionStatus::Correct
        } else if selected && !correct {
            OptionStatus::Wrong
        } else if selected {
            OptionStatus::Disabled
        } else {
            OptionStatus::Default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(correct: &str) -> QuestionDetail {
        QuestionDetail {
            id: 1,
            number: 1,
            theme: "Science".into(),
            text: "What is H2O?".into(),
            options: [
                "Water".into(),
                "Salt".into(),
                "Sugar".into(),
                "Iron".into(),
            ],
            correct_option: correct.into(),
        }
    }

    fn session_with(correct: &str) -> Session {
        let mut session = Session::new("Kids e Disney");
        session.open_question(detail(correct));
        session
    }

    #[test]
    fn option_letters_parse_loosely() {
        assert_eq!(" a ".parse::<OptionLetter>(), Ok(OptionLetter::A));
        assert_eq!("d".parse::<OptionLetter>(), Ok(OptionLetter::D));
        assert!("E".parse::<OptionLetter>().is_err());
        assert!("".parse::<OptionLetter>().is_err());
    }

    #[test]
    fn matching_ignores_case_and_whitespace_in_stored_value() {
        let mut session = session_with(" a\n");
        assert!(session.select_option(" a ".parse().unwrap()));
        assert!(session.answer.correct_answered);
    }

    #[test]
    fn unexpected_stored_value_never_matches() {
        let mut session = session_with("Water");
        for letter in OptionLetter::ALL {
            session.select_option(letter);
        }
        assert!(!session.answer.correct_answered);
        assert!(session.can_reveal());
    }

    #[test]
    fn wrong_then_correct_selection_keeps_click_order() {
        let mut session = session_with("C");
        assert!(session.select_option(OptionLetter::B));
        assert!(!session.answer.correct_answered);
        assert!(session.select_option(OptionLetter::C));
        assert!(session.answer.correct_answered);

        let order = session.answer.selected.iter().copied().collect::<Vec<_>>();
        assert_eq!(order, vec![OptionLetter::B, OptionLetter::C]);
    }

    #[test]
    fn repeated_selection_is_ignored() {
        let mut session = session_with("C");
        assert!(session.select_option(OptionLetter::A));
        assert!(!session.select_option(OptionLetter::A));
        assert_eq!(session.answer.selected.len(), 1);
    }

    #[test]
    fn selection_freezes_after_correct_answer() {
        let mut session = session_with("A");
        session.select_option(OptionLetter::A);
        let before = session.answer.clone();

        assert!(!session.select_option(OptionLetter::B));
        assert_eq!(session.answer, before);
    }

    #[test]
    fn selection_without_question_is_ignored() {
        let mut session = Session::new("Kids e Disney");
        assert!(!session.select_option(OptionLetter::A));
        assert!(session.answer.selected.is_empty());
    }

    #[test]
    fn reveal_requires_a_wrong_guess() {
        let mut session = session_with("C");
        assert!(!session.reveal_answer());

        session.select_option(OptionLetter::A);
        assert!(session.reveal_answer());
        assert!(session.answer.revealed);
        assert!(!session.can_reveal());
        assert!(session.can_mark_used());
    }

    #[test]
    fn reveal_is_refused_after_correct_answer() {
        let mut session = session_with("C");
        session.select_option(OptionLetter::C);
        assert!(!session.reveal_answer());
        assert!(session.can_mark_used());
    }

    #[test]
    fn button_policy_before_and_after_reveal() {
        let mut session = session_with("C");
        session.select_option(OptionLetter::A);

        assert_eq!(session.option_status(OptionLetter::A), OptionStatus::Wrong);
        assert_eq!(session.option_status(OptionLetter::C), OptionStatus::Default);
        assert_eq!(session.option_status(OptionLetter::B), OptionStatus::Default);

        session.reveal_answer();
        assert_eq!(session.option_status(OptionLetter::C), OptionStatus::Correct);
        assert_eq!(session.option_status(OptionLetter::A), OptionStatus::Wrong);
    }

    #[test]
    fn button_policy_after_correct_answer() {
        let mut session = session_with("b");
        session.select_option(OptionLetter::D);
        session.select_option(OptionLetter::B);

        assert_eq!(session.option_status(OptionLetter::B), OptionStatus::Correct);
        assert_eq!(session.option_status(OptionLetter::D), OptionStatus::Wrong);
        assert_eq!(session.option_status(OptionLetter::A), OptionStatus::Default);
    }

    #[test]
    fn rounds_are_capped_and_clear_lightning() {
        let mut session = Session::new("Kids e Disney");
        session.set_lightning(true);
        for _ in 0..6 {
            session.start_next_round(4);
        }
        assert_eq!(session.round, 4);
        assert!(!session.lightning);
    }

    #[test]
    fn entering_a_category_drops_stale_question() {
        let mut session = session_with("A");
        session.select_option(OptionLetter::A);

        session.enter_category(
            "History".into(),
            vec![QuestionSummary {
                id: 5,
                number: 1,
                used: false,
            }],
        );

        assert!(session.current_question.is_none());
        assert_eq!(session.answer, AnswerState::default());
        assert_eq!(session.current_category.as_deref(), Some("History"));
    }

    #[test]
    fn closing_a_question_resets_answer_progress() {
        let mut session = session_with("A");
        session.select_option(OptionLetter::B);
        session.close_question();

        assert!(session.current_question.is_none());
        assert!(!session.can_reveal());
        assert_eq!(session.option_status(OptionLetter::B), OptionStatus::Default);
    }

    #[test]
    fn option_text_follows_letter() {
        let question = detail("A");
        assert_eq!(question.option_text(OptionLetter::C), "Sugar");
    }
}
