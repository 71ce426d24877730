use axum::{
    body::Bytes,
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::aggregator;
use crate::clash::ClashClient;
use crate::config::Config;
use crate::error::ApiError;
use crate::models::ClanRequest;

/// Shared, read-only per-process state handed to every request
pub struct AppState {
    pub clash: ClashClient,
    pub api_key: Option<String>,
}

impl AppState {
    pub fn from_config(cfg: &Config) -> eyre::Result<Self> {
        Ok(Self {
            clash: ClashClient::new(cfg.api_base_url.clone(), cfg.upstream_timeout)?,
            api_key: cfg.api_key.clone(),
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let clan_data = post(clan_data).fallback(method_not_allowed);

    Router::new()
        .route("/", get(|| async { "Clan summary API running" }))
        .route("/clan-data", clan_data.clone())
        .route("/.netlify/functions/clan-data", clan_data)
        .layer(cors)
        .layer(middleware::from_fn(reject_bare_options))
        .with_state(state)
}

/// `CorsLayer` answers every OPTIONS; only real preflights may reach it.
async fn reject_bare_options(req: Request, next: Next) -> Response {
    if req.method() == &Method::OPTIONS
        && !req.headers().contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
    {
        return ApiError::MethodNotAllowed.into_response();
    }

    next.run(req).await
}

pub async fn serve(cfg: Config) -> eyre::Result<()> {
    let state = Arc::new(AppState::from_config(&cfg)?);
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port).parse()?;
    info!("API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn clan_data(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Response, ApiError> {
    // Credential is checked before the body is even looked at.
    let api_key = state.api_key.as_deref().ok_or(ApiError::MissingApiKey)?;

    let req = ClanRequest::from_slice(&body).map_err(ApiError::internal)?;
    let tag = req
        .clan_tag
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::MissingClanTag)?;

    info!("Clan summary requested for {}", tag);

    // Sequential on purpose: no member call unless the clan call succeeded.
    let clan = state.clash.get_clan(api_key, &tag).await?;
    let roster = state.clash.get_clan_members(api_key, &tag).await?;

    let summary = aggregator::summarize(&clan, &roster.items, Utc::now());

    Ok((
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type")),
            (header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("POST, OPTIONS")),
        ],
        Json(summary),
    )
        .into_response())
}
