// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    /// A color string that is not `#RGB` or `#RRGGBB` hex.
    #[error("invalid color {0:?}")]
    InvalidColor(String),
    /// A distance that is NaN or infinite.
    #[error("distance is not a finite number")]
    NonFiniteDistance,
    /// Unknown color metric name.
    #[error("unknown color metric {0:?}")]
    UnknownMetric(String),
}

pub type KernelResult<T> = core::result::Result<T, KernelError>;
pub type Result<T> = KernelResult<T>;
