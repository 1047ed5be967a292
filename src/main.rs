// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hybrid Coach API Server
//!
//! Builds personalized strength sessions from a user's profile and daily
//! check-in, using only exercises the exercise graph marks as safe.

use hybrid_coach::{
    config::Config,
    services::{CoachPipeline, Neo4jClient, OpenAiClient, SessionStore},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Hybrid Coach API");

    // Exercise graph
    let graph = Neo4jClient::new(
        &config.neo4j_uri,
        &config.neo4j_database,
        config.neo4j_user.clone(),
        config.neo4j_password.clone(),
    );
    match graph.ping().await {
        Ok(()) => tracing::info!(
            uri = %config.neo4j_uri,
            database = %config.neo4j_database,
            "Exercise graph reachable"
        ),
        // Selection degrades per request, so an unreachable graph is not fatal
        Err(e) => tracing::warn!(error = %e, "Exercise graph not reachable at startup"),
    }

    // Language model
    let model = OpenAiClient::new(
        config.llm_base_url.clone(),
        config.llm_api_key.clone(),
        config.llm_model.clone(),
    );
    tracing::info!(model = model.model(), base_url = %config.llm_base_url, "Language model configured");

    let pipeline = CoachPipeline::from_config(&config, Arc::new(model), Arc::new(graph));
    tracing::info!(
        graph_tag = %config.graph_tag,
        plan_policy = ?config.plan_policy,
        timeout_secs = config.pipeline_timeout.as_secs(),
        "Coaching pipeline ready"
    );

    // Build shared state
    let sessions = SessionStore::new();
    sessions.spawn_sweeper(config.session_idle);
    tracing::info!(idle_secs = config.session_idle.as_secs(), "Session sweeper started");

    let state = Arc::new(AppState {
        config: config.clone(),
        pipeline,
        sessions,
    });

    // Build router
    let app = hybrid_coach::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hybrid_coach=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
