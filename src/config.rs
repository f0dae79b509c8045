// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Configuration constants.

/// Number of suggestions returned when the caller does not pass a limit.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

/// Number of products colored per import call when no limit is given.
pub const DEFAULT_COLOR_IMPORT_LIMIT: usize = 1;

/// Debounce window between a mutation and the flush it triggers, in milliseconds.
pub const DEFAULT_FLUSH_DELAY_MS: u64 = 250;
