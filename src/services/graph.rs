// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise graph client.
//!
//! The graph holds `Exercise` nodes (equipment tag, optional secondary
//! equipment tags, data-set version tag, name, video) linked by `TARGETS`
//! to `BodyPart` nodes. [`Neo4jClient`] runs the safety query through the
//! Neo4j HTTP transactional endpoint.

use crate::error::AppError;
use crate::models::CandidateExercise;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Maximum number of exercises a safety query may return.
pub const MAX_CANDIDATES: usize = 40;

/// Exercises that fit the equipment and avoid every banned body part.
pub const SAFE_EXERCISES_QUERY: &str = "\
MATCH (e:Exercise)
WHERE e.graph_tag = $graph_tag
  AND toLower(e.equipment) IN $equipment
  AND ALL(sec IN coalesce(e.equipment_secondary, ['none'])
          WHERE toLower(sec) IN $equipment OR toLower(sec) = 'none')
  AND NOT EXISTS {
      MATCH (e)-[:TARGETS]->(b:BodyPart)
      WHERE any(term IN $banned_terms WHERE toLower(b.name) CONTAINS term)
  }
RETURN DISTINCT e.name AS name, e.video AS video
LIMIT 40";

/// Parameters of the safety query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafetyQuery {
    /// Lowercased equipment the user can use, fallbacks included
    pub equipment: Vec<String>,
    /// Lowercased anatomical substrings to avoid
    pub banned_terms: Vec<String>,
    pub graph_tag: String,
}

/// Read access to the exercise graph.
#[async_trait]
pub trait ExerciseStore: Send + Sync {
    async fn safe_exercises(&self, query: &SafetyQuery)
        -> Result<Vec<CandidateExercise>, AppError>;
}

/// Neo4j client over the HTTP transactional API.
#[derive(Clone)]
pub struct Neo4jClient {
    http: reqwest::Client,
    commit_url: String,
    user: String,
    password: String,
}

impl Neo4jClient {
    pub fn new(uri: &str, database: &str, user: String, password: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            commit_url: format!("{}/db/{}/tx/commit", uri.trim_end_matches('/'), database),
            user,
            password,
        }
    }

    /// Run a single read statement and return its rows.
    async fn run(
        &self,
        statement: &str,
        parameters: serde_json::Value,
    ) -> Result<Vec<Vec<serde_json::Value>>, AppError> {
        let body = serde_json::json!({
            "statements": [{ "statement": statement, "parameters": parameters }]
        });

        let response = self
            .http
            .post(&self.commit_url)
            .basic_auth(&self.user, Some(&self.password))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::GraphStore(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::GraphStore(format!("HTTP {}: {}", status, body)));
        }

        let tx: TxResponse = response
            .json()
            .await
            .map_err(|e| AppError::GraphStore(format!("JSON parse error: {}", e)))?;

        tx.into_rows()
    }

    /// Cheap connectivity check used at startup.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.run("RETURN 1", serde_json::json!({})).await.map(|_| ())
    }
}

#[async_trait]
impl ExerciseStore for Neo4jClient {
    async fn safe_exercises(
        &self,
        query: &SafetyQuery,
    ) -> Result<Vec<CandidateExercise>, AppError> {
        let parameters = serde_json::to_value(query)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Query parameters: {}", e)))?;
        let rows = self.run(SAFE_EXERCISES_QUERY, parameters).await?;
        Ok(rows_to_candidates(rows))
    }
}

/// Turn `[name, video]` rows into candidates, skipping rows without a name.
fn rows_to_candidates(rows: Vec<Vec<serde_json::Value>>) -> Vec<CandidateExercise> {
    rows.into_iter()
        .filter_map(|row| {
            let mut cells = row.into_iter();
            let name = cells.next()?.as_str()?.trim().to_string();
            if name.is_empty() {
                return None;
            }
            let video = cells
                .next()
                .and_then(|v| v.as_str().map(str::to_string))
                .filter(|v| !v.is_empty());
            Some(CandidateExercise { name, video })
        })
        .collect()
}

/// Transactional endpoint response.
#[derive(Debug, Deserialize)]
struct TxResponse {
    #[serde(default)]
    results: Vec<TxResult>,
    #[serde(default)]
    errors: Vec<TxError>,
}

impl TxResponse {
    fn into_rows(self) -> Result<Vec<Vec<serde_json::Value>>, AppError> {
        if let Some(err) = self.errors.first() {
            return Err(AppError::GraphStore(format!("{}: {}", err.code, err.message)));
        }
        Ok(self
            .results
            .into_iter()
            .next()
            .map(|r| r.data.into_iter().map(|d| d.row).collect())
            .unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
struct TxResult {
    #[serde(default)]
    data: Vec<TxRow>,
}

#[derive(Debug, Deserialize)]
struct TxRow {
    row: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TxError {
    code: String,
    message: String,
}
