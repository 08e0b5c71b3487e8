pub mod item;
pub mod lookup;

pub use item::{CatalogItem, ItemKind};
pub use lookup::{CatalogError, CatalogLookup, InMemoryCatalog, PricedLine};
