// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Product CSV reader.
//!
//! Expected layout: `;`-delimited, one header row with at least `id`. The
//! other recognised columns are `title`, `gender_id` (or `gender`),
//! `composition`, `sleeve`, `photo`, `url` and an optional `color`. Blank
//! lines are ignored.

use std::io::Read;

use serde::Deserialize;
use tinta_kernel::types::{Product, Rgb};

use crate::catalog::CatalogError;

#[derive(Debug, Deserialize)]
struct ProductRow {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default, alias = "gender")]
    gender_id: String,
    #[serde(default)]
    composition: String,
    #[serde(default)]
    sleeve: String,
    #[serde(default)]
    photo: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    color: Option<String>,
}

impl ProductRow {
    fn into_product(self, line: u64) -> Result<Product, CatalogError> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(CatalogError::InvalidRow { line, reason: "empty id".to_string() });
        }

        let color = match self.color.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            Some(raw) => Some(
                Rgb::parse_hex(raw)
                    .map_err(|e| CatalogError::InvalidRow { line, reason: e.to_string() })?
                    .to_hex(),
            ),
            None => None,
        };

        Ok(Product {
            id: id.to_string(),
            title: self.title,
            gender: self.gender_id,
            composition: self.composition,
            sleeve: self.sleeve,
            photo: self.photo,
            url: self.url,
            color,
        })
    }
}

/// Streams products out of a CSV source, one row at a time.
pub struct ProductReader<R> {
    reader: csv::Reader<R>,
    headers: csv::StringRecord,
    record: csv::StringRecord,
}

impl<R: Read> ProductReader<R> {
    pub fn new(input: R) -> Result<Self, CatalogError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(input);

        let headers = reader
            .headers()
            .map_err(|e| CatalogError::Csv { line: 1, source: e })?
            .clone();

        Ok(Self {
            reader,
            headers,
            record: csv::StringRecord::new(),
        })
    }
}

impl<R: Read> Iterator for ProductReader<R> {
    type Item = Result<Product, CatalogError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record(&mut self.record) {
            Ok(false) => None,
            Ok(true) => {
                let line = self.record.position().map(|p| p.line()).unwrap_or(0);
                let product = self
                    .record
                    .deserialize::<ProductRow>(Some(&self.headers))
                    .map_err(|e| CatalogError::Csv { line, source: e })
                    .and_then(|row| row.into_product(line));
                Some(product)
            }
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                Some(Err(CatalogError::Csv { line, source: e }))
            }
        }
    }
}
