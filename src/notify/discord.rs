use super::{Announcement, Notifier, SiteLinks};
use crate::catalog::ItemDetail;
use crate::config::AnnouncerConfig;
use crate::error::{AnnouncerError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

// Discord rejects embeds above these lengths.
const MAX_TITLE_CHARS: usize = 256;
const MAX_DESCRIPTION_CHARS: usize = 4096;

#[derive(Clone)]
pub struct DiscordNotifier {
    webhook: String,
    client: Client,
    timeout: Duration,
    links: SiteLinks,
    price_prefix: String,
}

impl DiscordNotifier {
    pub fn new(webhook: String, links: SiteLinks) -> Self {
        Self {
            webhook,
            client: Client::new(),
            timeout: Duration::from_secs(10),
            links,
            price_prefix: String::new(),
        }
    }

    pub fn from_config(cfg: &AnnouncerConfig) -> Self {
        Self::new(cfg.webhook_url.clone(), SiteLinks::new(&cfg.site_base_url))
            .with_timeout(cfg.request_timeout_secs)
            .with_price_prefix(&cfg.price_prefix)
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_price_prefix(mut self, prefix: &str) -> Self {
        self.price_prefix = prefix.to_string();
        self
    }

    pub async fn send_announcement(&self, ann: &Announcement) -> Result<()> {
        let payload = DiscordWebhookPayload::from_announcement(ann);

        let rsp = self
            .client
            .post(&self.webhook)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AnnouncerError::Transport(format!("Discord webhook request failed: {e}")))?;

        let status = rsp.status();
        if !status.is_success() {
            let body = rsp.text().await.unwrap_or_default();
            return Err(AnnouncerError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn deliver(&self, detail: &ItemDetail, thumbnail_url: &str) -> Result<()> {
        let ann = Announcement::build(detail, thumbnail_url, &self.links, &self.price_prefix);
        tracing::debug!(item_id = %detail.id, "sending webhook");
        self.send_announcement(&ann).await?;
        tracing::info!(item_id = %detail.id, name = %detail.name, "announced to Discord");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "discord"
    }
}

#[derive(Serialize)]
struct DiscordThumbnail {
    url: String,
}

#[derive(Serialize)]
struct DiscordField {
    name: &'static str,
    value: String,
    inline: bool,
}

#[derive(Serialize)]
struct DiscordEmbed {
    title: String,
    url: String,
    description: String,
    /// Left out entirely when there is no image; Discord rejects an empty url.
    #[serde(skip_serializing_if = "Option::is_none")]
    thumbnail: Option<DiscordThumbnail>,
    fields: Vec<DiscordField>,
}

#[derive(Serialize)]
struct DiscordWebhookPayload {
    embeds: Vec<DiscordEmbed>,
}

impl DiscordWebhookPayload {
    fn from_announcement(ann: &Announcement) -> Self {
        let thumbnail = (!ann.thumbnail_url.is_empty()).then(|| DiscordThumbnail {
            url: ann.thumbnail_url.clone(),
        });
        Self {
            embeds: vec![DiscordEmbed {
                title: clip(&ann.title, MAX_TITLE_CHARS),
                url: ann.url.clone(),
                description: clip(&ann.description, MAX_DESCRIPTION_CHARS),
                thumbnail,
                fields: vec![
                    DiscordField {
                        name: "Price",
                        value: ann.price_label.clone(),
                        inline: true,
                    },
                    DiscordField {
                        name: "Creator",
                        value: ann.creator_link(),
                        inline: true,
                    },
                ],
            }],
        }
    }
}

fn clip(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}
