use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::item::{CatalogItem, ItemKind};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog item not found: {0}")]
    NotFound(Uuid),
}

/// A cart line resolved against the catalog: the reference plus its
/// current price and title, ready to be frozen onto an order.
#[derive(Debug, Clone)]
pub struct PricedLine {
    pub kind: ItemKind,
    pub reference_id: Uuid,
    pub title: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
}

impl PricedLine {
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * i64::from(self.quantity)
    }
}

/// Read-only price resolution for cart references.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    async fn get_price(
        &self,
        kind: ItemKind,
        reference_id: Uuid,
    ) -> Result<CatalogItem, CatalogError>;
}

/// In-memory catalog backing the lookup trait.
pub struct InMemoryCatalog {
    items: RwLock<HashMap<Uuid, CatalogItem>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }

    pub async fn insert(&self, item: CatalogItem) {
        self.items.write().await.insert(item.id, item);
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogLookup for InMemoryCatalog {
    async fn get_price(
        &self,
        kind: ItemKind,
        reference_id: Uuid,
    ) -> Result<CatalogItem, CatalogError> {
        let items = self.items.read().await;
        items
            .get(&reference_id)
            .filter(|item| item.kind == kind && item.is_published)
            .cloned()
            .ok_or(CatalogError::NotFound(reference_id))
    }
}
