use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, header::HeaderValue};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;

use crate::dao::{
    models::{PlayerEntity, QuestionEntity, QuestionSummaryEntity, ThemeEntity},
    storage::StorageResult,
    trivia_store::{PLAYERS_TABLE, QUESTIONS_TABLE, TriviaStore, expect_single},
};

use super::{
    config::PostgrestConfig,
    error::{PostgrestDaoError, PostgrestResult},
};

const SUMMARY_COLUMNS: &str = "id,question_number,used";

/// Store backed by the REST facade of the hosted relational database.
#[derive(Clone)]
pub struct PostgrestTriviaStore {
    client: Client,
    base_url: Arc<str>,
    api_key: Arc<str>,
}

impl PostgrestTriviaStore {
    /// Build the HTTP client and check that the `players` table answers.
    pub async fn connect(config: PostgrestConfig) -> PostgrestResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| PostgrestDaoError::ClientBuilder { source })?;

        let base_url = Arc::<str>::from(format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            config.schema_path.trim_matches('/')
        ));

        let store = Self {
            client,
            base_url,
            api_key: Arc::<str>::from(config.api_key),
        };

        store.ping().await?;
        Ok(store)
    }

    fn request(&self, method: Method, table: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, table);
        self.client
            .request(method, url)
            .header("apikey", self.api_key.as_ref())
            .bearer_auth(self.api_key.as_ref())
    }

    async fn select<T>(&self, table: &str, query: &[(&str, String)]) -> PostgrestResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, table)
            .query(query)
            .send()
            .await
            .map_err(|source| PostgrestDaoError::RequestSend {
                path: table.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(PostgrestDaoError::RequestStatus {
                path: table.to_string(),
                status: response.status(),
            });
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|source| PostgrestDaoError::DecodeResponse {
                path: table.to_string(),
                source,
            })
    }

    async fn update<B, T>(
        &self,
        table: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> PostgrestResult<Vec<T>>
    where
        B: ?Sized + Serialize,
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::PATCH, table)
            .header("Prefer", HeaderValue::from_static("return=representation"))
            .query(query)
            .json(body)
            .send()
            .await
            .map_err(|source| PostgrestDaoError::RequestSend {
                path: table.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(PostgrestDaoError::RequestStatus {
                path: table.to_string(),
                status: response.status(),
            });
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|source| PostgrestDaoError::DecodeResponse {
                path: table.to_string(),
                source,
            })
    }

    async fn ping(&self) -> PostgrestResult<()> {
        self.select::<serde_json::Value>(
            PLAYERS_TABLE,
            &[("select", "id".to_string()), ("limit", "1".to_string())],
        )
        .await
        .map(|_| ())
    }
}

impl TriviaStore for PostgrestTriviaStore {
    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let query = [
                ("select", "id,player,team_name".to_string()),
                ("order", "team_name.asc".to_string()),
            ];
            store
                .select(PLAYERS_TABLE, &query)
                .await
                .map_err(Into::into)
        })
    }

    fn list_themes(&self) -> BoxFuture<'static, StorageResult<Vec<ThemeEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let query = [
                ("select", "theme".to_string()),
                ("order", "theme.asc".to_string()),
            ];
            store
                .select(QUESTIONS_TABLE, &query)
                .await
                .map_err(Into::into)
        })
    }

    fn list_questions(
        &self,
        theme: String,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionSummaryEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let query = [
                ("select", SUMMARY_COLUMNS.to_string()),
                ("theme", format!("eq.{theme}")),
                ("order", "question_number.asc".to_string()),
            ];
            store
                .select(QUESTIONS_TABLE, &query)
                .await
                .map_err(Into::into)
        })
    }

    fn find_question(&self, id: i64) -> BoxFuture<'static, StorageResult<QuestionEntity>> {
        let store = self.clone();
        Box::pin(async move {
            let query = [("select", "*".to_string()), ("id", format!("eq.{id}"))];
            let rows = store.select::<QuestionEntity>(QUESTIONS_TABLE, &query).await?;
            expect_single(QUESTIONS_TABLE, id, rows)
        })
    }

    fn mark_used(&self, id: i64) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let query = [
                ("id", format!("eq.{id}")),
                ("select", SUMMARY_COLUMNS.to_string()),
            ];
            let rows = store
                .update::<_, QuestionSummaryEntity>(QUESTIONS_TABLE, &query, &json!({ "used": true }))
                .await?;
            expect_single(QUESTIONS_TABLE, id, rows).map(|_| ())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}
