//! Application configuration loaded from environment variables.
//!
//! Credentials for the graph store and the model endpoint are read once at
//! startup; a missing one is fatal.

use std::env;
use std::time::Duration;

/// What to do with generated exercises that are not in the candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanPolicy {
    /// Drop offending exercises and keep the rest of the plan.
    Filter,
    /// Reject the whole plan.
    Strict,
}

impl std::str::FromStr for PlanPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "filter" => Ok(PlanPolicy::Filter),
            "strict" => Ok(PlanPolicy::Strict),
            _ => Err(ConfigError::Invalid("PLAN_POLICY", s.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Graph store ---
    /// Neo4j HTTP endpoint (e.g. http://localhost:7474)
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub neo4j_database: String,
    /// Data-set version marker exercises must carry
    pub graph_tag: String,

    // --- Language model ---
    pub llm_api_key: String,
    /// OpenAI-compatible base URL
    pub llm_base_url: String,
    pub llm_model: String,

    // --- Pipeline ---
    pub plan_policy: PlanPolicy,
    /// Deadline the host imposes on each pipeline call
    pub pipeline_timeout: Duration,
    /// Sessions untouched for this long are dropped
    pub session_idle: Duration,

    // --- Server ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    pub port: u16,
}

impl Config {
    /// Offline config for tests.
    pub fn test_default() -> Self {
        Self {
            neo4j_uri: "http://localhost:7474".to_string(),
            neo4j_user: "neo4j".to_string(),
            neo4j_password: "test_password".to_string(),
            neo4j_database: "neo4j".to_string(),
            graph_tag: "kg-label-v1".to_string(),
            llm_api_key: "test_key".to_string(),
            llm_base_url: "http://localhost:9999/v1".to_string(),
            llm_model: "openai/gpt-4o-mini".to_string(),
            plan_policy: PlanPolicy::Filter,
            pipeline_timeout: Duration::from_secs(5),
            session_idle: Duration::from_secs(3600),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            neo4j_uri: required("NEO4J_URI")?.trim_end_matches('/').to_string(),
            neo4j_user: required("NEO4J_USER")?,
            neo4j_password: required("NEO4J_PASSWORD")?,
            neo4j_database: env::var("NEO4J_DATABASE").unwrap_or_else(|_| "neo4j".to_string()),
            graph_tag: env::var("GRAPH_TAG").unwrap_or_else(|_| "kg-label-v1".to_string()),

            llm_api_key: required("OPENAI_API_KEY")?,
            llm_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string())
                .trim_end_matches('/')
                .to_string(),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| "openai/gpt-4o-mini".to_string()),

            plan_policy: env::var("PLAN_POLICY")
                .map(|v| v.parse())
                .unwrap_or(Ok(PlanPolicy::Filter))?,
            pipeline_timeout: Duration::from_secs(
                env::var("PIPELINE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60),
            ),
            session_idle: Duration::from_secs(
                env::var("SESSION_IDLE_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(3600),
            ),

            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }
}

/// Read a required variable, trimming stray whitespace from secrets.
fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
