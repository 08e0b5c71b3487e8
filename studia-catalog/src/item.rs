use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of purchasable reference a cart line may point at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemKind {
    Course,
    Ebook,
    DemoClass,
}

/// A sellable catalog entry. The catalog is read-only from the perspective
/// of the order subsystem; prices are snapshotted at order creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: Uuid,
    pub kind: ItemKind,
    pub title: String,
    pub price_cents: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl CatalogItem {
    pub fn new(kind: ItemKind, title: impl Into<String>, price_cents: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: title.into(),
            price_cents,
            is_published: true,
            created_at: Utc::now(),
        }
    }
}
