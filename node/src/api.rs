// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use serde::{Deserialize, Serialize};
use tinta_kernel::types::Product;

use crate::store::phase::FlushPhase;
use crate::store::ReloadOutcome;

/// Every successful response is wrapped as `{"data": ...}`.
#[derive(Serialize, Deserialize, Debug)]
pub struct DataEnvelope<T> {
    pub data: T,
}

impl<T> DataEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub reason: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct TotalResponse {
    pub total: usize,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SuggestionResponse {
    pub product: Product,
    pub suggestions: Vec<Product>,
}

#[derive(Deserialize, Debug)]
pub struct ImportCsvParams {
    pub path: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ImportColorsParams {
    // Kept as text so a bad value gets our own 400 instead of axum's
    pub limit: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct StoreStatusResponse {
    pub name: String,
    pub total: usize,
    pub persistent: bool,
    pub phase: FlushPhase,
    pub dirty: bool,
    pub reload: ReloadOutcome,
}
