//! Batch stock-level upserts.
//!
//! Entries for distinct items run concurrently. Entries that repeat an item
//! run one after another in request order, so the last entry for an item is
//! always the value left in storage.

use std::collections::HashMap;

use futures::future::try_join_all;
use log::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{StockLevelUpdate, StockLevelView};
use crate::store::InventoryStore;

/// Groups request positions by item, preserving request order inside each group.
fn group_by_item(updates: &[StockLevelUpdate]) -> Vec<Vec<(usize, StockLevelUpdate)>> {
    let mut slots: HashMap<Uuid, usize> = HashMap::new();
    let mut groups: Vec<Vec<(usize, StockLevelUpdate)>> = Vec::new();
    for (position, update) in updates.iter().enumerate() {
        let slot = *slots.entry(update.item_id).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push((position, *update));
    }
    groups
}

/// Applies every update and returns the resulting records in request order.
/// The first failure fails the whole batch.
pub async fn apply_stock_updates(
    store: &dyn InventoryStore,
    updates: &[StockLevelUpdate],
) -> Result<Vec<StockLevelView>, ApiError> {
    let groups = group_by_item(updates);
    info!(
        "Applying {} stock level updates across {} items",
        updates.len(),
        groups.len()
    );

    let runs = groups.into_iter().map(|group| async move {
        let mut applied = Vec::with_capacity(group.len());
        for (position, update) in group {
            applied.push((position, store.upsert_stock_level(update).await?));
        }
        Ok::<_, ApiError>(applied)
    });

    let mut results: Vec<Option<StockLevelView>> = (0..updates.len()).map(|_| None).collect();
    for (position, view) in try_join_all(runs).await?.into_iter().flatten() {
        results[position] = Some(view);
    }
    Ok(results.into_iter().flatten().collect())
}
