// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Language-model client.
//!
//! The pipeline treats the model as a black box that turns a prompt into a
//! JSON object. [`OpenAiClient`] talks to any OpenAI-compatible chat
//! completions endpoint (OpenRouter by default) with JSON output forced.

use crate::error::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model to use instead of the client's configured one
    pub model: Option<String>,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    /// Ask the endpoint to return a JSON object only
    pub json_mode: bool,
}

/// Anything that can complete a prompt into a JSON object.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<serde_json::Value, AppError>;
}

/// OpenAI-compatible chat completions client.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_body(&self, request: &CompletionRequest) -> ChatRequest {
        ChatRequest {
            model: request.model.clone().unwrap_or_else(|| self.model.clone()),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.system.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.user.clone(),
                },
            ],
            temperature: request.temperature,
            response_format: request.json_mode.then(|| ResponseFormat {
                kind: "json_object".to_string(),
            }),
        }
    }

    /// Check response status and parse the chat completion body.
    async fn check_response_json(
        &self,
        response: reqwest::Response,
    ) -> Result<ChatResponse, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Model endpoint rate limit hit (429)");
                return Err(AppError::LanguageModel(AppError::LLM_RATE_LIMIT.to_string()));
            }

            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(AppError::LanguageModel(AppError::LLM_AUTH_ERROR.to_string()));
            }

            return Err(AppError::LanguageModel(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::LanguageModel(format!("Malformed completion response: {}", e)))
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<serde_json::Value, AppError> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.build_body(request))
            .send()
            .await
            .map_err(|e| AppError::LanguageModel(e.to_string()))?;

        let chat = self.check_response_json(response).await?;
        tracing::debug!(
            model = request.model.as_deref().unwrap_or(&self.model),
            prompt_tokens = chat.usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens = chat.usage.as_ref().map(|u| u.completion_tokens),
            "Completion received"
        );

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AppError::LanguageModel("Empty completion".to_string()))?;

        parse_json_object(&content)
    }
}

/// Parse completion text as a JSON object.
///
/// Some endpoints wrap JSON in a Markdown code fence even in JSON mode; the
/// fence is stripped before parsing.
pub fn parse_json_object(content: &str) -> Result<serde_json::Value, AppError> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    let value: serde_json::Value = serde_json::from_str(unfenced)
        .map_err(|e| AppError::LanguageModel(format!("Completion is not valid JSON: {}", e)))?;

    if !value.is_object() {
        return Err(AppError::LanguageModel(
            "Completion is not a JSON object".to_string(),
        ));
    }
    Ok(value)
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
