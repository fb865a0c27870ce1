// src/lib.rs
// Library surface shared by the binary and the integration tests.

pub mod catalog;
pub mod config;
pub mod error;
pub mod metrics;
pub mod notify;
pub mod pipeline;
pub mod store;

pub use crate::catalog::{CatalogSource, ItemDetail, ItemId};
pub use crate::config::AnnouncerConfig;
pub use crate::error::{AnnouncerError, ErrorKind};
pub use crate::notify::{DiscordNotifier, Notifier};
pub use crate::pipeline::{CycleReport, Pipeline, Scheduler};
