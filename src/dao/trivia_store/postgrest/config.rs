use super::error::{PostgrestDaoError, PostgrestResult};

/// Runtime configuration describing how to reach the hosted REST facade of the store.
#[derive(Debug, Clone)]
pub struct PostgrestConfig {
    pub base_url: String,
    pub api_key: String,
    pub schema_path: String,
}

impl PostgrestConfig {
    /// Construct a configuration from an explicit project URL and API key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            schema_path: "rest/v1".to_string(),
        }
    }

    /// Override the path prefix under which tables are exposed.
    pub fn with_schema_path(mut self, schema_path: impl Into<String>) -> Self {
        self.schema_path = schema_path.into();
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> PostgrestResult<Self> {
        let base_url = std::env::var("TRIVIA_STORE_URL").map_err(|_| {
            PostgrestDaoError::MissingEnvVar {
                var: "TRIVIA_STORE_URL",
            }
        })?;
        let api_key = std::env::var("TRIVIA_STORE_KEY").map_err(|_| {
            PostgrestDaoError::MissingEnvVar {
                var: "TRIVIA_STORE_KEY",
            }
        })?;

        let mut config = Self::new(base_url, api_key);
        if let Some(path) = std::env::var("TRIVIA_STORE_SCHEMA_PATH")
            .ok()
            .filter(|path| !path.trim().is_empty())
        {
            config = config.with_schema_path(path);
        }

        Ok(config)
    }
}
