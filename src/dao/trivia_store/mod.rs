pub mod memory;
#[cfg(feature = "postgrest-store")]
pub mod postgrest;

use crate::dao::models::{PlayerEntity, QuestionEntity, QuestionSummaryEntity, ThemeEntity};
use crate::dao::storage::{StorageError, StorageResult};
use futures::future::BoxFuture;

/// Table holding the roster.
pub const PLAYERS_TABLE: &str = "players";
/// Table holding the questions and their used flags.
pub const QUESTIONS_TABLE: &str = "questions_dd";

/// Abstraction over the remote store holding players and questions.
///
/// Orderings are part of the contract: players by team name ascending (missing names last),
/// themes ascending, question summaries by number ascending.
pub trait TriviaStore: Send + Sync {
    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;
    fn list_themes(&self) -> BoxFuture<'static, StorageResult<Vec<ThemeEntity>>>;
    fn list_questions(
        &self,
        theme: String,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionSummaryEntity>>>;
    fn find_question(&self, id: i64) -> BoxFuture<'static, StorageResult<QuestionEntity>>;
    fn mark_used(&self, id: i64) -> BoxFuture<'static, StorageResult<()>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Reduce the rows matching a key lookup to the single expected row.
pub(crate) fn expect_single<T>(
    table: &'static str,
    id: i64,
    mut rows: Vec<T>,
) -> StorageResult<T> {
    match rows.len() {
        0 => Err(StorageError::NotFound { table, id }),
        1 => Ok(rows.remove(0)),
        count => Err(StorageError::Conflict { table, id, count }),
    }
}
