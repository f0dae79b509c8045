// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod config;
pub mod errors;
pub mod api;
pub mod catalog;
pub mod csv_import;
pub mod network;
pub mod persistence;
pub mod server;
pub mod store;
pub mod telemetry;
