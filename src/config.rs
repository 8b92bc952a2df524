use std::env;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),
}

/// Connection settings for the hosted data store.
///
/// There is deliberately no global client: callers build a config (usually
/// via [`StoreConfig::from_env`]), construct one gateway from it, and inject
/// that gateway into each service.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Project base URL, e.g. `https://xyzcompany.supabase.co`.
    pub url: String,
    /// The anon/service API key sent as both `apikey` and bearer token.
    pub api_key: String,
    /// Optional non-default database schema.
    pub schema: Option<String>,
}

impl StoreConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            schema: None,
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Read `SUPABASE_URL` / `SUPABASE_ANON_KEY` (and optionally
    /// `SUPABASE_SCHEMA`), honouring a `.env` file when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let url = env::var("SUPABASE_URL").map_err(|_| ConfigError::MissingVar("SUPABASE_URL"))?;
        let api_key = env::var("SUPABASE_ANON_KEY")
            .map_err(|_| ConfigError::MissingVar("SUPABASE_ANON_KEY"))?;
        Ok(Self {
            url,
            api_key,
            schema: env::var("SUPABASE_SCHEMA").ok(),
        })
    }
}
