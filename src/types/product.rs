// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Catalog product.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::Candidate;
use crate::types::color::Rgb;

/// A catalog entry keyed by `id`.
///
/// `color` holds the dominant color of the product photo as `#RRGGBB`. It is
/// kept as the raw string so a document written by an older importer (or by
/// hand) still loads even when the value does not parse.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub gender: String,
    pub composition: String,
    pub sleeve: String,
    pub photo: String,
    pub url: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl Product {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            gender: String::new(),
            composition: String::new(),
            sleeve: String::new(),
            photo: String::new(),
            url: String::new(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = Some(color.to_hex());
    }

    /// Parsed color, `None` when unset. A present but malformed value is an error.
    pub fn rgb(&self) -> Result<Option<Rgb>> {
        self.color.as_deref().map(Rgb::parse_hex).transpose()
    }
}

impl Candidate for Product {
    fn key(&self) -> &str {
        &self.id
    }

    fn has_feature(&self) -> bool {
        self.color.as_deref().is_some_and(|c| !c.trim().is_empty())
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.id)
    }
}
