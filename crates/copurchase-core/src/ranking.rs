//! Per-item rankings derived from a [`SimilarityTable`].
//!
//! Rankings never contain the reference item. Equal scores are ordered by
//! item name ascending so output is identical across runs.

use std::cmp::Ordering;

use crate::similarity::SimilarityTable;
use crate::types::{ItemName, ScoredItem};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub item: ItemName,
    pub entries: Vec<ScoredItem>,
}

impl Ranking {
    /// The first `n` entries; `n` past the end just returns everything.
    pub fn top(&self, n: usize) -> &[ScoredItem] { &self.entries[..n.min(self.entries.len())] }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

/// Full ranking of every other item in the table.
pub fn rank(table: &SimilarityTable, item: &str) -> Result<Ranking> {
    rank_filtered(table, item, |_| true)
}

/// Ranking restricted to `candidates`. Candidates missing from the table are
/// ignored; the reference item itself is always excluded.
pub fn rank_among(table: &SimilarityTable, item: &str, candidates: &[ItemName]) -> Result<Ranking> {
    rank_filtered(table, item, |other| candidates.iter().any(|c| c == other))
}

fn rank_filtered<F>(table: &SimilarityTable, item: &str, keep: F) -> Result<Ranking>
where
    F: Fn(&str) -> bool,
{
    let row = table.row(item).map_err(|_| Error::NotFound(format!("item '{}' is not in the similarity table", item)))?;
    let mut entries: Vec<ScoredItem> = table
        .items()
        .iter()
        .zip(row.iter())
        .filter(|(other, _)| other.as_str() != item && keep(other.as_str()))
        .map(|(other, &score)| ScoredItem { item: other.clone(), score })
        .collect();
    entries.sort_by(by_score_then_name);
    Ok(Ranking { item: item.to_string(), entries })
}

/// Descending score, then ascending name.
pub fn by_score_then_name(a: &ScoredItem, b: &ScoredItem) -> Ordering {
    b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal).then_with(|| a.item.cmp(&b.item))
}
