// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

//! tinta-kernel: catalog records, color math and bounded top-K selection.
//!
//! Nothing in this crate performs I/O. The node crate owns persistence and
//! hands `list()` snapshots of its store to [`index::brute_force::select_top_k`].

pub mod config;
pub mod error;
pub mod types;
pub mod dist;
pub mod index;

#[cfg(test)]
pub mod tests;
