// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod vision;

pub use vision::{ColorExtractor, ExtractError, VisionExtractor};
