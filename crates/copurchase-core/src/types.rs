//! Domain types shared by ingestion, the interaction matrix and the report layer.

use serde::{Deserialize, Serialize};

pub type UserId = String;
pub type ItemName = String;

/// A single (user, item) purchase extracted from one order line item.
///
/// Events only live between ingestion and matrix construction; repeated
/// purchases of the same item by the same user produce repeated events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PurchaseEvent {
    pub user_id: UserId,
    pub item_name: ItemName,
}

impl PurchaseEvent {
    pub fn new(user_id: impl Into<UserId>, item_name: impl Into<ItemName>) -> Self {
        Self { user_id: user_id.into(), item_name: item_name.into() }
    }
}

/// An item paired with its similarity score to some reference item.
///
/// `score` is in `[0, 1]`; renderers scale it to a percentage for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub item: ItemName,
    pub score: f64,
}

impl ScoredItem {
    pub fn percent(&self) -> f64 { self.score * 100.0 }
}
