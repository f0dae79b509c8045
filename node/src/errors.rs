// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::api::ErrorResponse;
use crate::catalog::CatalogError;

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("unknown product {0}")]
    UnknownProduct(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for NodeError {
    fn into_response(self) -> Response {
        let status = match &self {
            NodeError::InvalidInput(_) | NodeError::UnknownProduct(_) => StatusCode::BAD_REQUEST,
            NodeError::Catalog(CatalogError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            NodeError::Catalog(_) => StatusCode::BAD_REQUEST,
            NodeError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse {
            reason: self.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<tokio::task::JoinError> for NodeError {
    fn from(e: tokio::task::JoinError) -> Self {
        tracing::error!(error = %e, "Background task failed");
        NodeError::Internal
    }
}
