//! Flat, newline-delimited id files in the data directory.
//!
//! ```text
//! {data_dir}/
//! ├── items.txt        # candidate storage, rewritten every cycle, empty between cycles
//! └── sent_items.txt   # ledger of announced ids, append-only + trim
//! ```

pub mod candidates;
pub mod ledger;

use std::io;
use std::path::Path;

use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::catalog::ItemId;
use crate::error::{AnnouncerError, Result};

pub use candidates::CandidateStore;
pub use ledger::{IdLedger, LedgerLoad, LedgerOrigin};

/// Parse a newline-delimited id list, skipping blank lines.
pub(crate) fn parse_ids(content: &str) -> Vec<ItemId> {
    content.lines().filter_map(ItemId::parse).collect()
}

/// Read an id file. `Ok(None)` when it does not exist.
pub(crate) async fn read_ids(path: &Path) -> Result<Option<Vec<ItemId>>> {
    match fs::read_to_string(path).await {
        Ok(s) => Ok(Some(parse_ids(&s))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AnnouncerError::storage(path, e)),
    }
}

/// Replace the file contents (write to temp, then rename).
pub(crate) async fn write_ids_atomic(path: &Path, ids: &[ItemId]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AnnouncerError::storage(parent, e))?;
        }
    }

    let mut bytes = String::with_capacity(ids.len() * 12);
    for id in ids {
        bytes.push_str(id.as_str());
        bytes.push('\n');
    }

    write_via_temp(path, bytes.as_bytes())
        .await
        .map_err(|e| AnnouncerError::storage(path, e))
}

async fn write_via_temp(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    let mut file = fs::File::create(&tmp).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(&tmp, path).await
}
