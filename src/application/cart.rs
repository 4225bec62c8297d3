use crate::domain::cart::{CartItem, CartSnapshot};
use crate::domain::ports::CartRepositoryBox;
use crate::error::Result;
use tokio::sync::watch;

/// Single source of truth for what the shopper intends to buy.
///
/// Every mutation recomputes the derived totals, persists the item list via
/// the repository before returning, and publishes the fresh snapshot to
/// subscribers. Totals are never stored; they are pure functions of the
/// item list.
pub struct CartStore {
    items: Vec<CartItem>,
    repository: CartRepositoryBox,
    changes: watch::Sender<CartSnapshot>,
}

impl CartStore {
    /// Opens the store, rehydrating the item list from the repository.
    ///
    /// Absent or corrupt persisted data yields an empty cart; opening never
    /// fails.
    pub async fn open(repository: CartRepositoryBox) -> Self {
        let items = repository.load().await;
        let (changes, _) = watch::channel(CartSnapshot::of(&items));
        Self {
            items,
            repository,
            changes,
        }
    }

    /// Adds `item.quantity` units of the product (zero is treated as one).
    ///
    /// An item already present merges by id: quantity accumulates and the
    /// display attributes refresh to the newly supplied values. The quantity
    /// is clamped at the item's stock limit; a clamp to zero drops the line.
    pub async fn add(&mut self, item: CartItem) -> Result<()> {
        let increment = item.quantity.max(1);
        match self.items.iter().position(|line| line.id == item.id) {
            Some(index) => {
                let line = &mut self.items[index];
                line.quantity = line
                    .quantity
                    .saturating_add(increment)
                    .min(item.stock_limit);
                line.name = item.name;
                line.unit_price = item.unit_price;
                line.stock_limit = item.stock_limit;
            }
            None => {
                let quantity = increment.min(item.stock_limit);
                self.items.push(CartItem { quantity, ..item });
            }
        }
        self.items.retain(|line| line.quantity >= 1);
        tracing::debug!(item_count = self.items.len(), "cart add");
        self.commit().await
    }

    /// Removes the line for `item_id`; no-op if absent.
    pub async fn remove(&mut self, item_id: u64) -> Result<()> {
        self.items.retain(|line| line.id != item_id);
        self.commit().await
    }

    /// Replaces the quantity for `item_id`, clamped at the stock limit.
    /// A quantity of zero or less removes the line. No-op if absent.
    pub async fn set_quantity(&mut self, item_id: u64, quantity: i64) -> Result<()> {
        if quantity <= 0 {
            return self.remove(item_id).await;
        }
        if let Some(line) = self.items.iter_mut().find(|line| line.id == item_id) {
            let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
            line.quantity = quantity.min(line.stock_limit);
        }
        self.items.retain(|line| line.quantity >= 1);
        self.commit().await
    }

    /// Empties the cart. Invoked by the orchestrator after a completed
    /// checkout, and available to the shopper directly.
    pub async fn clear(&mut self) -> Result<()> {
        self.items.clear();
        tracing::debug!("cart cleared");
        self.commit().await
    }

    /// Quantity currently in the cart for `item_id`; zero if absent.
    pub fn quantity_of(&self, item_id: u64) -> u32 {
        self.items
            .iter()
            .find(|line| line.id == item_id)
            .map_or(0, |line| line.quantity)
    }

    /// An immutable read of the current cart state.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::of(&self.items)
    }

    /// Change notifications carrying the snapshot after each mutation.
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.changes.subscribe()
    }

    async fn commit(&mut self) -> Result<()> {
        self.repository.save(&self.items).await?;
        self.changes.send_replace(self.snapshot());
        Ok(())
    }
}
