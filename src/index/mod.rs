// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod brute_force;

use core::cmp::Ordering;

use serde::Serialize;

/// A record the selector can rank.
pub trait Candidate {
    /// Identity used to exclude the query from its own pool and to break ties.
    fn key(&self) -> &str;
    /// Whether the record carries a value the distance function can compare.
    fn has_feature(&self) -> bool;
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Scored<R> {
    pub record: R,
    pub distance: f64,
}

impl<R: Candidate> Scored<R> {
    /// Sort order: distance ascending, then key ascending.
    pub fn rank(&self, other: &Self) -> Ordering {
        match self.distance.total_cmp(&other.distance) {
            Ordering::Equal => self.record.key().cmp(other.record.key()),
            other_ord => other_ord,
        }
    }
}

/// Outcome of one top-K scan.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionResult<R> {
    /// At most `limit` hits, best first.
    pub hits: Vec<Scored<R>>,
    /// Candidates dropped because their distance could not be computed.
    pub skipped: usize,
}

impl<R> SelectionResult<R> {
    pub fn empty() -> Self {
        Self { hits: Vec::new(), skipped: 0 }
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn into_records(self) -> Vec<R> {
        self.hits.into_iter().map(|h| h.record).collect()
    }
}
