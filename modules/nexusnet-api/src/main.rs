use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use nexusnet_common::Config;
use nexusnet_graph::GraphClient;
use nexusnet_intake::SurveyIntake;

mod rest;

pub struct AppState {
    pub intake: SurveyIntake,
    pub client: GraphClient,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("nexusnet=info".parse()?))
        .init();

    let config = Config::from_env();

    let client = GraphClient::connect(
        &config.neo4j_uri,
        &config.neo4j_user,
        &config.neo4j_password,
        Duration::from_secs(config.store_timeout_secs),
    )
    .await?;

    nexusnet_graph::migrate::migrate(&client).await?;

    let state = Arc::new(AppState {
        intake: SurveyIntake::new(client.clone()),
        client,
    });

    let app = Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        // Survey intake
        .route(
            "/api/projects",
            get(rest::api_list_projects).post(rest::api_submit_project),
        )
        .route("/api/case-studies", post(rest::api_submit_case_study))
        // Admin
        .route("/api/admin/reset", post(rest::api_admin_reset))
        .with_state(state)
        // CORS
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Survey responses are never cacheable
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!(%addr, "Survey intake API listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
