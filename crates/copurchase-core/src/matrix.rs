//! Binary user × item interaction matrix.
//!
//! Rows are users and columns are items, both sorted by their identifier so a
//! given dataset always produces the same axes. Only purchased cells are
//! stored; every other `(user, item)` pair reads as 0.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::types::{ItemName, PurchaseEvent, UserId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionMatrix {
    users: Vec<UserId>,
    items: Vec<ItemName>,
    user_index: HashMap<UserId, usize>,
    item_index: HashMap<ItemName, usize>,
    /// Per user, the sorted item columns they purchased.
    baskets: Vec<Vec<usize>>,
    /// Per item, the sorted user rows that purchased it.
    buyers: Vec<Vec<usize>>,
}

impl InteractionMatrix {
    /// Collapses events into 0/1 cells. Repeat purchases of the same item by
    /// the same user set the cell once.
    pub fn from_events<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a PurchaseEvent>,
    {
        let mut pairs: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        let mut item_names: BTreeSet<&str> = BTreeSet::new();
        for event in events {
            pairs.entry(event.user_id.as_str()).or_default().insert(event.item_name.as_str());
            item_names.insert(event.item_name.as_str());
        }

        let users: Vec<UserId> = pairs.keys().map(|u| u.to_string()).collect();
        let items: Vec<ItemName> = item_names.iter().map(|i| i.to_string()).collect();
        let user_index: HashMap<UserId, usize> = users.iter().enumerate().map(|(i, u)| (u.clone(), i)).collect();
        let item_index: HashMap<ItemName, usize> = items.iter().enumerate().map(|(i, n)| (n.clone(), i)).collect();

        let mut baskets = vec![Vec::new(); users.len()];
        let mut buyers = vec![Vec::new(); items.len()];
        for (row, basket_items) in pairs.values().enumerate() {
            for item in basket_items {
                if let Some(&col) = item_index.get(*item) {
                    baskets[row].push(col);
                    buyers[col].push(row);
                }
            }
        }

        Self { users, items, user_index, item_index, baskets, buyers }
    }

    /// An empty matrix has no rows and no columns at all, as opposed to a
    /// matrix whose cells happen to be 0.
    pub fn is_empty(&self) -> bool { self.users.is_empty() || self.items.is_empty() }

    pub fn n_users(&self) -> usize { self.users.len() }

    pub fn n_items(&self) -> usize { self.items.len() }

    pub fn users(&self) -> &[UserId] { &self.users }

    pub fn items(&self) -> &[ItemName] { &self.items }

    pub fn user_position(&self, user: &str) -> Option<usize> { self.user_index.get(user).copied() }

    pub fn item_position(&self, item: &str) -> Option<usize> { self.item_index.get(item).copied() }

    /// Cell value by row/column position; out-of-range positions read as 0.
    pub fn cell(&self, row: usize, col: usize) -> u8 {
        self.baskets.get(row).map_or(0, |basket| u8::from(basket.binary_search(&col).is_ok()))
    }

    /// Cell value by identifiers; unknown users or items read as 0.
    pub fn get(&self, user: &str, item: &str) -> u8 {
        match (self.user_position(user), self.item_position(item)) {
            (Some(row), Some(col)) => self.cell(row, col),
            _ => 0,
        }
    }

    /// Users (row positions) who purchased the item at column `col`.
    pub fn buyers(&self, col: usize) -> &[usize] { self.buyers.get(col).map(Vec::as_slice).unwrap_or(&[]) }

    /// Items (column positions) purchased by the user at row `row`.
    pub fn basket(&self, row: usize) -> &[usize] { self.baskets.get(row).map(Vec::as_slice).unwrap_or(&[]) }

    /// Number of distinct users who bought the item, i.e. its column sum.
    pub fn item_popularity(&self, col: usize) -> usize { self.buyers(col).len() }

    /// Number of distinct items the user bought, i.e. their row sum.
    pub fn user_engagement(&self, row: usize) -> usize { self.basket(row).len() }

    /// Dense rows of 0/1 cells, one per user in row order.
    pub fn to_dense(&self) -> Vec<Vec<u8>> {
        (0..self.n_users()).map(|row| (0..self.n_items()).map(|col| self.cell(row, col)).collect()).collect()
    }
}
