// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request as AxumRequest, State},
    http::{header::{AUTHORIZATION, HOST}, HeaderMap, StatusCode},
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::{delete, get},
    Json, Router,
};
use tower_http::trace::TraceLayer;

use tinta_kernel::config::DEFAULT_COLOR_IMPORT_LIMIT;
use tinta_kernel::types::Product;

use crate::api::*;
use crate::catalog::Catalog;
use crate::errors::NodeError;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub default_suggestions: usize,
}

async fn auth_guard(
    State(token): State<Arc<String>>,
    req: AxumRequest,
    next: Next,
) -> Result<Response, StatusCode> {
    let provided = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|val| val.to_str().ok())
        .and_then(|val| val.strip_prefix("Bearer "));

    match provided {
        Some(provided) if provided == token.as_str() => Ok(next.run(req).await),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

pub fn build_router(state: AppState, auth_token: Option<String>) -> Router {
    let api = Router::new()
        .route("/product/:id", get(product_detail))
        .route("/product/:id/suggest/color", get(suggest_default))
        .route("/product/:id/suggest/color/:limit", get(suggest_with_limit));

    let mut admin = Router::new()
        .route("/product/import/csv", get(import_csv))
        .route("/product/import/colors", get(import_colors))
        .route("/product/:id", delete(delete_product))
        .route("/store", get(store_status));

    if let Some(token) = auth_token {
        tracing::info!("Auth Enabled: Bearer token required on /admin");
        admin = admin.layer(from_fn_with_state(Arc::new(token), auth_guard));
    } else {
        tracing::warn!("Auth Disabled: No token configured");
    }

    Router::new()
        .route("/", get(index))
        .route("/metrics", get(metrics_handler))
        .nest("/api", api)
        .nest("/admin", admin)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `None` or blank means `default`. Anything that is not a positive integer
/// is rejected.
pub fn parse_limit(raw: Option<&str>, default: usize) -> Result<usize, NodeError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(s) => match s.parse::<i64>() {
            Ok(n) if n > 0 => Ok(n as usize),
            _ => Err(NodeError::InvalidInput(
                "argument \"limit\" must be a positive number".to_string(),
            )),
        },
    }
}

fn find_product(state: &AppState, id: &str) -> Result<Product, NodeError> {
    if id.trim().is_empty() {
        return Err(NodeError::InvalidInput("mandatory query argument named \"id\"".to_string()));
    }
    state
        .catalog
        .get_by_id(id)
        .ok_or_else(|| NodeError::UnknownProduct(id.to_string()))
}

async fn index(headers: HeaderMap) -> String {
    let host = headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    format!("Please refer to documentation at http://{}/doc", host)
}

async fn product_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DataEnvelope<Product>>, NodeError> {
    let product = find_product(&state, &id)?;
    Ok(Json(DataEnvelope::new(product)))
}

async fn suggest_default(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DataEnvelope<SuggestionResponse>>, NodeError> {
    suggest(&state, &id, state.default_suggestions)
}

async fn suggest_with_limit(
    State(state): State<AppState>,
    Path((id, limit)): Path<(String, String)>,
) -> Result<Json<DataEnvelope<SuggestionResponse>>, NodeError> {
    let limit = parse_limit(Some(&limit), state.default_suggestions)?;
    suggest(&state, &id, limit)
}

fn suggest(
    state: &AppState,
    id: &str,
    limit: usize,
) -> Result<Json<DataEnvelope<SuggestionResponse>>, NodeError> {
    let product = find_product(state, id)?;
    let suggestions = state.catalog.suggest_by_color(&product, limit).into_records();
    Ok(Json(DataEnvelope::new(SuggestionResponse { product, suggestions })))
}

async fn import_csv(
    State(state): State<AppState>,
    Query(params): Query<ImportCsvParams>,
) -> Result<Json<DataEnvelope<TotalResponse>>, NodeError> {
    let path = params
        .path
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| NodeError::InvalidInput("mandatory query argument named \"path\"".to_string()))?;

    // CSV parsing is blocking file I/O
    let catalog = state.catalog.clone();
    let total = tokio::task::spawn_blocking(move || catalog.import_csv(&path)).await??;
    Ok(Json(DataEnvelope::new(TotalResponse { total })))
}

async fn import_colors(
    State(state): State<AppState>,
    Query(params): Query<ImportColorsParams>,
) -> Result<Json<DataEnvelope<TotalResponse>>, NodeError> {
    let limit = parse_limit(params.limit.as_deref(), DEFAULT_COLOR_IMPORT_LIMIT)?;
    let total = state.catalog.import_colors(limit).await?;
    Ok(Json(DataEnvelope::new(TotalResponse { total })))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<DataEnvelope<TotalResponse>> {
    state.catalog.remove(&id);
    Json(DataEnvelope::new(TotalResponse { total: state.catalog.count() }))
}

async fn store_status(State(state): State<AppState>) -> Json<DataEnvelope<StoreStatusResponse>> {
    let store = state.catalog.store();
    Json(DataEnvelope::new(StoreStatusResponse {
        name: store.name().to_string(),
        total: store.count(),
        persistent: store.is_persistent(),
        phase: store.phase(),
        dirty: store.is_dirty(),
        reload: store.reload_outcome().clone(),
    }))
}

async fn metrics_handler() -> String {
    crate::telemetry::get_metrics()
}
