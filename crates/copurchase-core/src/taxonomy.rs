//! Display-only partition of item names into drinks and food.
//!
//! Nothing in ingestion, the interaction matrix or the similarity engine reads
//! the taxonomy; renderers receive it explicitly to scope their views.

use std::collections::HashSet;

use crate::similarity::SimilarityTable;
use crate::types::ItemName;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    drinks: Vec<ItemName>,
    food: Vec<ItemName>,
}

impl Taxonomy {
    /// Fails with `InvalidConfig` when a name is listed both as a drink and as food.
    pub fn new(drinks: Vec<ItemName>, food: Vec<ItemName>) -> Result<Self> {
        let drink_set: HashSet<&str> = drinks.iter().map(String::as_str).collect();
        let overlap: Vec<&str> = food.iter().map(String::as_str).filter(|f| drink_set.contains(f)).collect();
        if !overlap.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "taxonomy drinks and food must be disjoint, both contain: {}",
                overlap.join(", ")
            )));
        }
        Ok(Self { drinks, food })
    }

    pub fn drinks(&self) -> &[ItemName] { &self.drinks }

    pub fn food(&self) -> &[ItemName] { &self.food }

    pub fn is_drink(&self, item: &str) -> bool { self.drinks.iter().any(|d| d == item) }

    /// Drinks that appear in the table, in taxonomy order.
    pub fn drinks_in(&self, table: &SimilarityTable) -> Vec<ItemName> {
        self.drinks.iter().filter(|d| table.contains(d)).cloned().collect()
    }

    /// Food items that appear in the table, in taxonomy order.
    pub fn food_in(&self, table: &SimilarityTable) -> Vec<ItemName> {
        self.food.iter().filter(|f| table.contains(f)).cloned().collect()
    }
}
