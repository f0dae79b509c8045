// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Color distance functions.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{KernelError, Result};
use crate::types::color::Rgb;
use crate::types::product::Product;

/// How two colors are compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMetric {
    /// Euclidean distance over the raw 8-bit channels.
    Rgb,
    /// CIE76 delta E: Euclidean distance in L*a*b*.
    #[default]
    Cie76,
}

impl ColorMetric {
    pub fn distance(&self, a: Rgb, b: Rgb) -> f64 {
        match self {
            ColorMetric::Rgb => rgb_distance(a, b),
            ColorMetric::Cie76 => cie76_distance(a, b),
        }
    }
}

impl FromStr for ColorMetric {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rgb" => Ok(ColorMetric::Rgb),
            "cie76" | "lab" => Ok(ColorMetric::Cie76),
            other => Err(KernelError::UnknownMetric(other.to_string())),
        }
    }
}

impl fmt::Display for ColorMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorMetric::Rgb => f.write_str("rgb"),
            ColorMetric::Cie76 => f.write_str("cie76"),
        }
    }
}

pub fn rgb_distance(a: Rgb, b: Rgb) -> f64 {
    let dr = f64::from(a.r) - f64::from(b.r);
    let dg = f64::from(a.g) - f64::from(b.g);
    let db = f64::from(a.b) - f64::from(b.b);
    (dr * dr + dg * dg + db * db).sqrt()
}

pub fn cie76_distance(a: Rgb, b: Rgb) -> f64 {
    let la = a.to_lab();
    let lb = b.to_lab();
    let dl = la.l - lb.l;
    let da = la.a - lb.a;
    let db = la.b - lb.b;
    (dl * dl + da * da + db * db).sqrt()
}

/// Rejects NaN and infinite distances.
pub fn ensure_finite(d: f64) -> Result<f64> {
    if d.is_finite() {
        Ok(d)
    } else {
        Err(KernelError::NonFiniteDistance)
    }
}

/// Distance between two encoded colors. Fails if either does not parse.
pub fn color_distance(metric: ColorMetric, a: &str, b: &str) -> Result<f64> {
    let a = Rgb::parse_hex(a)?;
    let b = Rgb::parse_hex(b)?;
    ensure_finite(metric.distance(a, b))
}

/// Distance between the colors of two products.
///
/// Products without a color are filtered out by the selector before this is
/// called; reaching here without one is reported as an invalid color.
pub fn product_distance(metric: ColorMetric, a: &Product, b: &Product) -> Result<f64> {
    match (a.color.as_deref(), b.color.as_deref()) {
        (Some(ca), Some(cb)) => color_distance(metric, ca, cb),
        _ => Err(KernelError::InvalidColor(String::new())),
    }
}
