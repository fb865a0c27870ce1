pub mod announcement;
pub mod discord;

use async_trait::async_trait;

use crate::catalog::ItemDetail;
use crate::error::Result;

pub use announcement::{Announcement, SiteLinks};
pub use discord::DiscordNotifier;

/// Outbound sink for one announcement. Exactly one delivery attempt per
/// call; `Ok` only when the sink acknowledged with a success status.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, detail: &ItemDetail, thumbnail_url: &str) -> Result<()>;

    fn name(&self) -> &'static str;
}
