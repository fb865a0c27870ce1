// src/catalog/roblox.rs
//
// HTTP implementation of `CatalogSource` against the public catalog and
// thumbnails APIs.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::types::{ItemDetail, ItemId};
use super::CatalogSource;
use crate::config::{AnnouncerConfig, SearchQuery};
use crate::error::{AnnouncerError, Result};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: Vec<SearchEntry>,
}

#[derive(Debug, Deserialize)]
struct SearchEntry {
    id: ItemId,
}

#[derive(Debug, Deserialize)]
struct ThumbnailResponse {
    #[serde(default)]
    data: Vec<ThumbnailEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThumbnailEntry {
    #[serde(default)]
    image_url: Option<String>,
}

#[derive(Clone)]
pub struct RobloxCatalog {
    client: Client,
    catalog_base: String,
    thumbnails_base: String,
    query: SearchQuery,
}

impl RobloxCatalog {
    pub fn from_config(cfg: &AnnouncerConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&cfg.user_agent)
            .timeout(cfg.request_timeout())
            .build()?;
        Ok(Self::with_client(
            client,
            &cfg.catalog_base_url,
            &cfg.thumbnails_base_url,
            cfg.search.clone(),
        ))
    }

    pub fn with_client(
        client: Client,
        catalog_base: &str,
        thumbnails_base: &str,
        query: SearchQuery,
    ) -> Self {
        Self {
            client,
            catalog_base: catalog_base.trim_end_matches('/').to_string(),
            thumbnails_base: thumbnails_base.trim_end_matches('/').to_string(),
            query,
        }
    }

    pub fn search_url(&self) -> String {
        let q = &self.query;
        format!(
            "{}/v1/search/items?category={}&includeNotForSale={}&limit={}&salesTypeFilter={}&sortType={}",
            self.catalog_base,
            q.category,
            q.include_not_for_sale,
            q.limit,
            q.sales_type_filter,
            q.sort_type
        )
    }

    pub fn detail_url(&self, id: &ItemId) -> String {
        format!(
            "{}/v1/catalog/items/{}/details?itemType=Asset",
            self.catalog_base, id
        )
    }

    pub fn thumbnail_url(&self, id: &ItemId) -> String {
        format!(
            "{}/v1/assets?assetIds={}&returnPolicy=PlaceHolder&size=150x150&format=Png&isCircular=false",
            self.thumbnails_base, id
        )
    }

    /// GET `url`, returning the body of a 2xx response.
    async fn get_text(&self, url: &str) -> Result<String> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AnnouncerError::HttpStatus {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }
        Ok(resp.text().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body).map_err(|e| AnnouncerError::parse(what, e))
    }
}

fn parse_search_body(body: &str) -> Result<Vec<ItemId>> {
    let resp: SearchResponse =
        serde_json::from_str(body).map_err(|e| AnnouncerError::parse("search response", e))?;
    Ok(resp.data.into_iter().map(|e| e.id).collect())
}

fn first_image_url(resp: ThumbnailResponse) -> String {
    resp.data
        .into_iter()
        .next()
        .and_then(|e| e.image_url)
        .unwrap_or_default()
}

// Error bodies can be whole HTML pages; keep logs readable.
fn truncate_body(body: &str) -> String {
    const MAX: usize = 300;
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX {
        trimmed.to_string()
    } else {
        let mut s: String = trimmed.chars().take(MAX).collect();
        s.push_str("...");
        s
    }
}

#[async_trait]
impl CatalogSource for RobloxCatalog {
    async fn fetch_candidate_ids(&self) -> Result<Vec<ItemId>> {
        let body = self.get_text(&self.search_url()).await?;
        let ids = parse_search_body(&body)?;
        tracing::debug!(count = ids.len(), "catalog listing fetched");
        Ok(ids)
    }

    async fn fetch_detail(&self, id: &ItemId) -> Result<ItemDetail> {
        self.get_json(&self.detail_url(id), "item details").await
    }

    async fn fetch_thumbnail_url(&self, id: &ItemId) -> Result<String> {
        let resp: ThumbnailResponse = self
            .get_json(&self.thumbnail_url(id), "thumbnail response")
            .await?;
        Ok(first_image_url(resp))
    }

    fn name(&self) -> &'static str {
        "roblox-catalog"
    }
}
