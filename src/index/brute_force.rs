// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Brute-force top-K selection.

use core::cmp::Ordering;
use core::fmt::Display;

use crate::dist::ensure_finite;
use crate::index::{Candidate, Scored, SelectionResult};

/// Scans `pool` and keeps the `limit` candidates closest to `query`.
///
/// The working buffer never holds more than `limit` entries and stays sorted
/// after every insertion, so the pool itself is never sorted. A candidate
/// replaces the current worst entry only if it ranks strictly before it.
///
/// Skipped without calling `distance`:
/// - the query itself (same key),
/// - candidates without a feature value.
///
/// A distance that errors or is not finite drops that candidate only.
pub fn select_top_k<R, I, F, E>(
    query: &R,
    pool: I,
    limit: usize,
    mut distance: F,
) -> SelectionResult<R>
where
    R: Candidate,
    I: IntoIterator<Item = R>,
    F: FnMut(&R, &R) -> Result<f64, E>,
    E: Display,
{
    if limit == 0 || !query.has_feature() {
        return SelectionResult::empty();
    }

    let mut hits: Vec<Scored<R>> = Vec::with_capacity(limit.min(64));
    let mut skipped = 0;

    for candidate in pool {
        if candidate.key() == query.key() || !candidate.has_feature() {
            continue;
        }

        let d = match distance(query, &candidate) {
            Ok(d) => match ensure_finite(d) {
                Ok(d) => d,
                Err(e) => {
                    tracing::warn!(candidate = candidate.key(), distance = d, error = %e, "Skipping candidate, distance failed");
                    skipped += 1;
                    continue;
                }
            },
            Err(e) => {
                tracing::warn!(candidate = candidate.key(), error = %e, "Skipping candidate, distance failed");
                skipped += 1;
                continue;
            }
        };

        let scored = Scored { record: candidate, distance: d };

        if hits.len() < limit {
            insert_sorted(&mut hits, scored);
        } else if hits
            .last()
            .is_some_and(|worst| scored.rank(worst) == Ordering::Less)
        {
            hits.pop();
            insert_sorted(&mut hits, scored);
        }
    }

    tracing::debug!(query = query.key(), hits = hits.len(), skipped, "Top-K scan complete");
    SelectionResult { hits, skipped }
}

fn insert_sorted<R: Candidate>(hits: &mut Vec<Scored<R>>, scored: Scored<R>) {
    let pos = hits.partition_point(|h| h.rank(&scored) == Ordering::Less);
    hits.insert(pos, scored);
}
