// src/catalog/mod.rs
pub mod roblox;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;
pub use types::{Creator, CreatorType, ItemDetail, ItemId};

/// Remote catalog the pipeline reads from. One request per call, no caching
/// and no retry; a failed id is simply retried on the next cycle.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Identifiers currently listed, in the order the listing returned them.
    async fn fetch_candidate_ids(&self) -> Result<Vec<ItemId>>;

    async fn fetch_detail(&self, id: &ItemId) -> Result<ItemDetail>;

    /// First thumbnail URL for the item; `Ok("")` when the API lists none.
    async fn fetch_thumbnail_url(&self, id: &ItemId) -> Result<String>;

    fn name(&self) -> &'static str;
}
