//! In-process store used for offline rehearsals and tests.

use std::{fs, io, path::Path, sync::Arc};

use futures::future::BoxFuture;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::dao::{
    models::{PlayerEntity, QuestionEntity, QuestionSummaryEntity, ThemeEntity},
    storage::{StorageError, StorageResult},
    trivia_store::{QUESTIONS_TABLE, TriviaStore, expect_single},
};

/// Failures raised while loading a seed fixture.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file `{path}`")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse seed file `{path}`")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<SeedError> for StorageError {
    fn from(err: SeedError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}

/// JSON layout of a seed fixture.
#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub players: Vec<PlayerEntity>,
    #[serde(default)]
    pub questions: Vec<QuestionEntity>,
}

#[derive(Debug, Default)]
struct Tables {
    players: Vec<PlayerEntity>,
    questions: Vec<QuestionEntity>,
}

/// Store keeping both tables in memory, honouring the same ordering contract as the remote one.
#[derive(Clone, Default)]
pub struct InMemoryTriviaStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryTriviaStore {
    /// Build a store from explicit rows.
    pub fn new(players: Vec<PlayerEntity>, questions: Vec<QuestionEntity>) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables { players, questions })),
        }
    }

    /// Build a store from a JSON seed file.
    pub fn from_seed_file(path: &Path) -> Result<Self, SeedError> {
        let display = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|source| SeedError::Read {
            path: display.clone(),
            source,
        })?;
        let seed: Seed = serde_json::from_str(&contents).map_err(|source| SeedError::Parse {
            path: display,
            source,
        })?;
        Ok(Self::new(seed.players, seed.questions))
    }
}

impl TriviaStore for InMemoryTriviaStore {
    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut players = tables.read().await.players.clone();
            // Missing team names sort last, like NULLs in an ascending order clause.
            players.sort_by(|a, b| {
                (a.team_name.is_empty(), &a.team_name).cmp(&(b.team_name.is_empty(), &b.team_name))
            });
            Ok(players)
        })
    }

    fn list_themes(&self) -> BoxFuture<'static, StorageResult<Vec<ThemeEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut themes = tables
                .read()
                .await
                .questions
                .iter()
                .map(|question| ThemeEntity {
                    theme: Some(question.theme.clone()),
                })
                .collect::<Vec<_>>();
            themes.sort_by(|a, b| a.theme.cmp(&b.theme));
            Ok(themes)
        })
    }

    fn list_questions(
        &self,
        theme: String,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionSummaryEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut summaries = tables
                .read()
                .await
                .questions
                .iter()
                .filter(|question| question.theme == theme)
                .map(QuestionSummaryEntity::from)
                .collect::<Vec<_>>();
            summaries.sort_by_key(|summary| summary.question_number);
            Ok(summaries)
        })
    }

    fn find_question(&self, id: i64) -> BoxFuture<'static, StorageResult<QuestionEntity>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let rows = tables
                .read()
                .await
                .questions
                .iter()
                .filter(|question| question.id == id)
                .cloned()
                .collect::<Vec<_>>();
            expect_single(QUESTIONS_TABLE, id, rows)
        })
    }

    fn mark_used(&self, id: i64) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            let matches = guard
                .questions
                .iter_mut()
                .filter(|question| question.id == id)
                .collect::<Vec<_>>();
            // Nothing is written unless the key is unique.
            let row = expect_single(QUESTIONS_TABLE, id, matches)?;
            row.used = true;
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: i64, name: &str, team: &str) -> PlayerEntity {
        PlayerEntity {
            id,
            player: name.into(),
            team_name: team.into(),
        }
    }

    fn question(id: i64, theme: &str, number: i32) -> QuestionEntity {
        QuestionEntity {
            id,
            theme: theme.into(),
            question_number: number,
            question: format!("question {id}"),
            option_a: "a".into(),
            option_b: "b".into(),
            option_c: "c".into(),
            option_d: "d".into(),
            correct_option: "A".into(),
            used: false,
        }
    }

    #[tokio::test]
    async fn players_are_ordered_by_team_with_missing_names_last() {
        let store = InMemoryTriviaStore::new(
            vec![
                player(1, "Zé", ""),
                player(2, "Ana", "Red"),
                player(3, "Bia", "Blue"),
                player(4, "Caio", "Red"),
            ],
            vec![],
        );

        let names = store
            .list_players()
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.player)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Bia", "Ana", "Caio", "Zé"]);
    }

    #[tokio::test]
    async fn questions_are_filtered_by_theme_and_sorted_by_number() {
        let store = InMemoryTriviaStore::new(
            vec![],
            vec![
                question(1, "Science", 2),
                question(2, "History", 1),
                question(3, "Science", 1),
            ],
        );

        let ids = store
            .list_questions("Science".into())
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![3, 1]);
    }

    #[tokio::test]
    async fn mark_used_is_idempotent_and_visible_in_summaries() {
        let store = InMemoryTriviaStore::new(vec![], vec![question(7, "Science", 1)]);

        store.mark_used(7).await.unwrap();
        store.mark_used(7).await.unwrap();

        let summaries = store.list_questions("Science".into()).await.unwrap();
        assert!(summaries[0].used);
    }

    #[tokio::test]
    async fn detail_lookup_rejects_missing_and_duplicate_rows() {
        let store = InMemoryTriviaStore::new(
            vec![],
            vec![question(1, "Science", 1), question(1, "History", 1)],
        );

        assert!(matches!(
            store.find_question(42).await,
            Err(StorageError::NotFound { id: 42, .. })
        ));
        assert!(matches!(
            store.find_question(1).await,
            Err(StorageError::Conflict { count: 2, .. })
        ));
        assert!(matches!(
            store.mark_used(42).await,
            Err(StorageError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn mark_used_on_duplicate_id_writes_nothing() {
        let store = InMemoryTriviaStore::new(
            vec![],
            vec![question(1, "Science", 1), question(1, "History", 1)],
        );

        assert!(matches!(
            store.mark_used(1).await,
            Err(StorageError::Conflict { count: 2, .. })
        ));
        for theme in ["Science", "History"] {
            let summaries = store.list_questions(theme.into()).await.unwrap();
            assert!(!summaries[0].used, "{theme} row was flipped");
        }
    }
}
