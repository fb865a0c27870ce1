// tests/common/mod.rs
// In-memory stand-ins for the catalog API and the webhook sink.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use catalog_announcer::catalog::{Creator, CreatorType, ItemDetail, ItemId};
use catalog_announcer::error::{AnnouncerError, Result};
use catalog_announcer::{AnnouncerConfig, CatalogSource, Notifier};
use parking_lot::Mutex;

pub fn id(n: u64) -> ItemId {
    ItemId::from(n)
}

pub fn ids(v: &[u64]) -> Vec<ItemId> {
    v.iter().copied().map(ItemId::from).collect()
}

pub fn detail(n: u64) -> ItemDetail {
    ItemDetail {
        id: id(n),
        name: format!("Item {n}"),
        description: String::new(),
        is_purchasable: true,
        price: Some(10),
        creator: Creator {
            kind: CreatorType::User,
            target_id: 1,
            name: "Maker".into(),
        },
    }
}

/// Config pointing at a temp data dir, with no delays.
pub fn test_config(dir: &std::path::Path) -> AnnouncerConfig {
    AnnouncerConfig {
        webhook_url: "http://127.0.0.1:9/hook".into(),
        data_dir: dir.to_path_buf(),
        message_delay_secs: 0,
        cooldown_secs: 0,
        ..AnnouncerConfig::default()
    }
}

#[derive(Default)]
struct CatalogState {
    listing: Option<Vec<ItemId>>,
    broken_details: HashSet<ItemId>,
    broken_thumbnails: bool,
    listing_calls: usize,
    detail_calls: Vec<ItemId>,
}

/// Listing is `None` until set, which makes `fetch_candidate_ids` fail.
#[derive(Clone, Default)]
pub struct FakeCatalog {
    state: Arc<Mutex<CatalogState>>,
}

impl FakeCatalog {
    pub fn listing(ids: Vec<ItemId>) -> Self {
        let c = Self::default();
        c.set_listing(Some(ids));
        c
    }

    pub fn set_listing(&self, ids: Option<Vec<ItemId>>) {
        self.state.lock().listing = ids;
    }

    pub fn break_detail(&self, id: ItemId) {
        self.state.lock().broken_details.insert(id);
    }

    pub fn fix_detail(&self, id: &ItemId) {
        self.state.lock().broken_details.remove(id);
    }

    pub fn break_thumbnails(&self) {
        self.state.lock().broken_thumbnails = true;
    }

    pub fn listing_calls(&self) -> usize {
        self.state.lock().listing_calls
    }

    pub fn detail_calls(&self) -> Vec<ItemId> {
        self.state.lock().detail_calls.clone()
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn fetch_candidate_ids(&self) -> Result<Vec<ItemId>> {
        let mut st = self.state.lock();
        st.listing_calls += 1;
        st.listing
            .clone()
            .ok_or_else(|| AnnouncerError::Transport("connection refused".into()))
    }

    async fn fetch_detail(&self, id: &ItemId) -> Result<ItemDetail> {
        let mut st = self.state.lock();
        st.detail_calls.push(id.clone());
        if st.broken_details.contains(id) {
            return Err(AnnouncerError::HttpStatus {
                status: 404,
                body: "not found".into(),
            });
        }
        let mut d = detail(0);
        d.id = id.clone();
        d.name = format!("Item {id}");
        Ok(d)
    }

    async fn fetch_thumbnail_url(&self, id: &ItemId) -> Result<String> {
        if self.state.lock().broken_thumbnails {
            return Err(AnnouncerError::Parse("bad thumbnail json".into()));
        }
        Ok(format!("https://img.test/{id}.png"))
    }

    fn name(&self) -> &'static str {
        "fake-catalog"
    }
}

#[derive(Default)]
struct SinkState {
    failing: HashSet<ItemId>,
    attempts: Vec<ItemId>,
    delivered: Vec<(ItemId, String)>,
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    state: Arc<Mutex<SinkState>>,
}

impl RecordingNotifier {
    pub fn fail_for(&self, id: ItemId) {
        self.state.lock().failing.insert(id);
    }

    pub fn recover(&self, id: &ItemId) {
        self.state.lock().failing.remove(id);
    }

    pub fn attempts(&self) -> Vec<ItemId> {
        self.state.lock().attempts.clone()
    }

    pub fn delivered(&self) -> Vec<ItemId> {
        self.state.lock().delivered.iter().map(|(i, _)| i.clone()).collect()
    }

    pub fn thumbnails(&self) -> Vec<String> {
        self.state.lock().delivered.iter().map(|(_, t)| t.clone()).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, detail: &ItemDetail, thumbnail_url: &str) -> Result<()> {
        let mut st = self.state.lock();
        st.attempts.push(detail.id.clone());
        if st.failing.contains(&detail.id) {
            return Err(AnnouncerError::HttpStatus {
                status: 429,
                body: "You are being rate limited.".into(),
            });
        }
        st.delivered
            .push((detail.id.clone(), thumbnail_url.to_string()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Serve `app` on an ephemeral local port; returns its base URL.
pub async fn spawn_server(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
