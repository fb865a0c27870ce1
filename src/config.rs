// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_CONFIG_PATH: &str = "ANNOUNCER_CONFIG_PATH";
pub const ENV_WEBHOOK_URL: &str = "DISCORD_WEBHOOK_URL";
pub const ENV_DATA_DIR: &str = "ANNOUNCER_DATA_DIR";

pub const CANDIDATES_FILE: &str = "items.txt";
pub const LEDGER_FILE: &str = "sent_items.txt";

/// Query shape of the catalog-listing call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    pub category: u32,
    pub include_not_for_sale: bool,
    pub limit: u32,
    pub sales_type_filter: u32,
    pub sort_type: u32,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            category: 11,
            include_not_for_sale: true,
            limit: 120,
            sales_type_filter: 1,
            sort_type: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnouncerConfig {
    /// Discord webhook receiving the announcements. `DISCORD_WEBHOOK_URL` wins over the file.
    pub webhook_url: String,
    pub catalog_base_url: String,
    pub thumbnails_base_url: String,
    /// Public site used for item and creator links inside the embed.
    pub site_base_url: String,
    pub search: SearchQuery,
    /// Wait after every successful announcement.
    pub message_delay_secs: u64,
    /// Wait between the end of one cycle and the start of the next.
    pub cooldown_secs: u64,
    pub ledger_cap: usize,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Prepended to the price (or "Offsale") in the embed.
    pub price_prefix: String,
    /// Directory holding `items.txt` and `sent_items.txt`.
    pub data_dir: PathBuf,
    /// e.g. "127.0.0.1:9100"; serves /health and /metrics when set.
    pub metrics_addr: Option<String>,
}

impl Default for AnnouncerConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            catalog_base_url: "https://catalog.roblox.com".into(),
            thumbnails_base_url: "https://thumbnails.roblox.com".into(),
            site_base_url: "https://www.roblox.com".into(),
            search: SearchQuery::default(),
            message_delay_secs: 15,
            cooldown_secs: 600,
            ledger_cap: 150,
            request_timeout_secs: 10,
            user_agent: concat!("catalog-announcer/", env!("CARGO_PKG_VERSION")).into(),
            price_prefix: "<:robux:1270902229552992286>".into(),
            data_dir: PathBuf::from("."),
            metrics_addr: None,
        }
    }
}

impl AnnouncerConfig {
    pub fn message_delay(&self) -> Duration {
        Duration::from_secs(self.message_delay_secs)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn candidates_path(&self) -> PathBuf {
        self.data_dir.join(CANDIDATES_FILE)
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join(LEDGER_FILE)
    }

    /// Load from an explicit path. TOML or JSON, picked by extension.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading announcer config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        parse_config(&content, ext.as_str())
            .with_context(|| format!("parsing announcer config {}", path.display()))
    }

    /// Load using env var + fallbacks, then apply env overrides:
    /// 1) $ANNOUNCER_CONFIG_PATH
    /// 2) config/announcer.toml
    /// 3) config/announcer.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let toml_p = PathBuf::from("config/announcer.toml");
            let json_p = PathBuf::from("config/announcer.json");
            if toml_p.exists() {
                Self::load_from(&toml_p)?
            } else if json_p.exists() {
                Self::load_from(&json_p)?
            } else {
                Self::default()
            }
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(ENV_WEBHOOK_URL) {
            if !url.trim().is_empty() {
                self.webhook_url = url.trim().to_string();
            }
        }
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            if !dir.trim().is_empty() {
                self.data_dir = PathBuf::from(dir.trim());
            }
        }
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::AnnouncerError;

        if self.webhook_url.trim().is_empty() {
            return Err(AnnouncerError::config(format!(
                "webhook_url is empty (set it in the config file or via {ENV_WEBHOOK_URL})"
            )));
        }
        if self.ledger_cap == 0 {
            return Err(AnnouncerError::config("ledger_cap must be at least 1"));
        }
        if self.search.limit == 0 {
            return Err(AnnouncerError::config("search.limit must be at least 1"));
        }
        Ok(())
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<AnnouncerConfig> {
    match hint_ext {
        "json" => Ok(serde_json::from_str(s)?),
        "toml" => Ok(toml::from_str(s)?),
        // Unknown extension: JSON first, then TOML.
        _ => serde_json::from_str(s)
            .or_else(|_| toml::from_str(s))
            .map_err(|e| anyhow!("unsupported config format: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_fixed_limits() {
        let cfg = AnnouncerConfig::default();
        assert_eq!(cfg.ledger_cap, 150);
        assert_eq!(cfg.search.limit, 120);
        assert_eq!(cfg.message_delay(), Duration::from_secs(15));
        assert_eq!(cfg.cooldown(), Duration::from_secs(600));
        assert!(cfg.ledger_path().ends_with("sent_items.txt"));
        assert!(cfg.candidates_path().ends_with("items.txt"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let toml = r#"
webhook_url = "https://discord.test/api/webhooks/1/abc"
cooldown_secs = 60

[search]
limit = 30
"#;
        let cfg = parse_config(toml, "toml").unwrap();
        assert_eq!(cfg.cooldown_secs, 60);
        assert_eq!(cfg.search.limit, 30);
        assert_eq!(cfg.search.category, 11);
        assert_eq!(cfg.ledger_cap, 150);
    }

    #[test]
    fn validate_rejects_missing_webhook_and_zero_cap() {
        let mut cfg = AnnouncerConfig::default();
        assert!(cfg.validate().is_err());

        cfg.webhook_url = "https://discord.test/hook".into();
        assert!(cfg.validate().is_ok());

        cfg.ledger_cap = 0;
        assert!(cfg.validate().is_err());
    }
}
