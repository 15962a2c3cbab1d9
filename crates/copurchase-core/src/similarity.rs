//! Item × item cosine similarity over binary purchase columns.
//!
//! For binary columns the dot product is the number of users who bought both
//! items and the norm is the square root of the item's buyer count, so
//! `sim(i, j) = co(i, j) / sqrt(n_i * n_j)`. Co-occurrence counts are
//! accumulated from user baskets, then mirrored to keep the table exactly
//! symmetric.

use std::collections::HashMap;

use tracing::info;

use crate::matrix::InteractionMatrix;
use crate::types::ItemName;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityTable {
    items: Vec<ItemName>,
    index: HashMap<ItemName, usize>,
    /// Row-major `items.len() × items.len()` scores in `[0, 1]`.
    scores: Vec<f64>,
}

impl SimilarityTable {
    /// Fails with `EmptyResult` when the matrix has no rows or columns.
    pub fn compute(matrix: &InteractionMatrix) -> Result<Self> {
        if matrix.is_empty() {
            return Err(Error::EmptyResult("interaction matrix is empty, similarity cannot be computed".to_string()));
        }
        let n = matrix.n_items();

        // baskets are sorted, so only the upper triangle (i <= j) is filled
        let mut co = vec![0usize; n * n];
        for row in 0..matrix.n_users() {
            let basket = matrix.basket(row);
            for (a, &i) in basket.iter().enumerate() {
                for &j in &basket[a..] {
                    co[i * n + j] += 1;
                }
            }
        }

        let mut scores = vec![0.0; n * n];
        for i in 0..n {
            for j in i..n {
                let score = cosine_from_counts(co[i * n + j], matrix.item_popularity(i), matrix.item_popularity(j));
                scores[i * n + j] = score;
                scores[j * n + i] = score;
            }
        }

        let items = matrix.items().to_vec();
        let index = items.iter().enumerate().map(|(i, name)| (name.clone(), i)).collect();
        info!(items = n, users = matrix.n_users(), "computed item similarity");
        Ok(Self { items, index, scores })
    }

    pub fn len(&self) -> usize { self.items.len() }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn items(&self) -> &[ItemName] { &self.items }

    pub fn contains(&self, item: &str) -> bool { self.index.contains_key(item) }

    pub fn position(&self, item: &str) -> Option<usize> { self.index.get(item).copied() }

    /// Score by positions; panics on out-of-range positions like slice indexing.
    pub fn at(&self, i: usize, j: usize) -> f64 { self.scores[i * self.len() + j] }

    pub fn score(&self, a: &str, b: &str) -> Result<f64> {
        let i = self.position(a).ok_or_else(|| Error::NotFound(a.to_string()))?;
        let j = self.position(b).ok_or_else(|| Error::NotFound(b.to_string()))?;
        Ok(self.at(i, j))
    }

    /// All scores of `item` against every item, in table order (self included).
    pub fn row(&self, item: &str) -> Result<&[f64]> {
        let i = self.position(item).ok_or_else(|| Error::NotFound(item.to_string()))?;
        let n = self.len();
        Ok(&self.scores[i * n..(i + 1) * n])
    }
}

/// Cosine of two binary vectors given their overlap and their set sizes.
/// A zero-norm vector has similarity 0 with everything, itself included.
pub fn cosine_from_counts(overlap: usize, count_a: usize, count_b: usize) -> f64 {
    if count_a == 0 || count_b == 0 { return 0.0; }
    let denom = ((count_a as f64) * (count_b as f64)).sqrt();
    (overlap as f64 / denom).clamp(0.0, 1.0)
}
