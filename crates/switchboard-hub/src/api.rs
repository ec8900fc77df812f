//! HTTP command surface - expose the registry to the panel.
//!
//! Endpoints:
//! - GET    /v1/health
//! - GET    /v1/integrations/bots - list bot channels
//! - POST   /v1/integrations/bots - create a bot channel
//! - PATCH  /v1/integrations/bots/{id} - partial update
//! - DELETE /v1/integrations/bots/{id}
//! - GET    /v1/integrations/mcp - list MCP clients
//! - POST   /v1/integrations/mcp - create an MCP client
//! - POST   /v1/integrations/mcp/{name}/toggle - flip enabled
//! - DELETE /v1/integrations/mcp/{name}

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, patch, post},
};
use serde::Serialize;
use tracing::info;

use switchboard_core::error::RegistryError;
use switchboard_core::registry::Registry;

use crate::wire::{
    BotChannelDraftWire, BotChannelPatchWire, BotChannelWire, McpClientDraftWire, McpClientWire,
};

type SharedState = Arc<Registry>;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Offending field for validation failures, so the form can mark
    /// the input inline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn into_api_error(e: RegistryError) -> ApiError {
    let status = match &e {
        RegistryError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        RegistryError::NotFound { .. } => StatusCode::NOT_FOUND,
        RegistryError::DuplicateKey { .. } => StatusCode::CONFLICT,
        // The in-memory change applied; only durability is uncertain.
        RegistryError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let field = match &e {
        RegistryError::Validation { field, .. } => Some(field.clone()),
        _ => None,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
            field,
        }),
    )
}

// ─── Handlers ──────────────────────────────────────────────

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn list_bots(State(registry): State<SharedState>) -> Json<Vec<BotChannelWire>> {
    let records = registry.list_bot_channels().await;
    Json(records.into_iter().map(BotChannelWire::from).collect())
}

async fn create_bot(
    State(registry): State<SharedState>,
    Json(draft): Json<BotChannelDraftWire>,
) -> Result<(StatusCode, Json<BotChannelWire>), ApiError> {
    let record = registry
        .create_bot_channel(draft.into())
        .await
        .map_err(into_api_error)?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

async fn update_bot(
    State(registry): State<SharedState>,
    Path(id): Path<String>,
    Json(patch): Json<BotChannelPatchWire>,
) -> Result<Json<BotChannelWire>, ApiError> {
    let record = registry
        .update_bot_channel(&id, patch.into())
        .await
        .map_err(into_api_error)?;
    Ok(Json(record.into()))
}

async fn delete_bot(
    State(registry): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    registry
        .delete_bot_channel(&id)
        .await
        .map_err(into_api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_mcp(State(registry): State<SharedState>) -> Json<Vec<McpClientWire>> {
    let records = registry.list_mcp_clients().await;
    Json(records.into_iter().map(McpClientWire::from).collect())
}

async fn create_mcp(
    State(registry): State<SharedState>,
    Json(draft): Json<McpClientDraftWire>,
) -> Result<(StatusCode, Json<McpClientWire>), ApiError> {
    let record = registry
        .create_mcp_client(draft.into())
        .await
        .map_err(into_api_error)?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

async fn toggle_mcp(
    State(registry): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<McpClientWire>, ApiError> {
    let record = registry
        .toggle_mcp_client(&name)
        .await
        .map_err(into_api_error)?;
    Ok(Json(record.into()))
}

async fn delete_mcp(
    State(registry): State<SharedState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    registry
        .delete_mcp_client(&name)
        .await
        .map_err(into_api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Server builder ────────────────────────────────────────

/// Build the command router.
pub fn build_router(registry: SharedState) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/integrations/bots", get(list_bots).post(create_bot))
        .route(
            "/v1/integrations/bots/{id}",
            patch(update_bot).delete(delete_bot),
        )
        .route("/v1/integrations/mcp", get(list_mcp).post(create_mcp))
        .route("/v1/integrations/mcp/{name}/toggle", post(toggle_mcp))
        .route("/v1/integrations/mcp/{name}", delete(delete_mcp))
        .with_state(registry)
}

/// Start the command server.
pub async fn start_server(registry: SharedState, host: &str, port: u16) -> anyhow::Result<()> {
    let app = build_router(registry);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("command server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
