// src/store/ledger.rs
//
// Ledger of announced ids (`sent_items.txt`). Append on every successful
// announcement, trimmed from the front to a fixed cap.

use std::collections::HashSet;
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

use super::{read_ids, write_ids_atomic};
use crate::catalog::ItemId;
use crate::error::{AnnouncerError, Result};

/// Whether the ledger already existed or was created by this load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOrigin {
    Existing,
    /// File was missing and has been created empty ("no history yet").
    Initialized,
}

#[derive(Debug, Clone)]
pub struct LedgerLoad {
    pub ids: HashSet<ItemId>,
    pub origin: LedgerOrigin,
}

#[derive(Debug, Clone)]
pub struct IdLedger {
    path: PathBuf,
    cap: usize,
}

impl IdLedger {
    pub fn new(path: impl Into<PathBuf>, cap: usize) -> Self {
        Self {
            path: path.into(),
            cap,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Announced ids as a set. A missing file is created empty and reported
    /// as `Initialized`; an unreadable one is an error, never an empty set.
    pub async fn load(&self) -> Result<LedgerLoad> {
        match read_ids(&self.path).await? {
            Some(entries) => Ok(LedgerLoad {
                ids: entries.into_iter().collect(),
                origin: LedgerOrigin::Existing,
            }),
            None => {
                write_ids_atomic(&self.path, &[]).await?;
                tracing::info!(path = %self.path.display(), "ledger created");
                Ok(LedgerLoad {
                    ids: HashSet::new(),
                    origin: LedgerOrigin::Initialized,
                })
            }
        }
    }

    /// Stored sequence, oldest first. Missing file reads as empty.
    pub async fn entries(&self) -> Result<Vec<ItemId>> {
        Ok(read_ids(&self.path).await?.unwrap_or_default())
    }

    /// Append one id and flush it to disk before returning.
    /// No dedup: committing the same id twice stores it twice.
    pub async fn commit(&self, id: &ItemId) -> Result<()> {
        self.append_line(id)
            .await
            .map_err(|e| AnnouncerError::storage(&self.path, e))
    }

    async fn append_line(&self, id: &ItemId) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .await?;

        // A hand-edited or torn file may lack the trailing newline.
        let mut line = String::with_capacity(id.as_str().len() + 2);
        let len = file.metadata().await?.len();
        if len > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::Start(len - 1)).await?;
            file.read_exact(&mut last).await?;
            if last[0] != b'\n' {
                line.push('\n');
            }
        }
        line.push_str(id.as_str());
        line.push('\n');

        file.write_all(line.as_bytes()).await?;
        file.sync_data().await
    }

    /// Keep only the most recent `cap` entries. Returns how many were dropped.
    pub async fn trim_to_cap(&self, cap: usize) -> Result<usize> {
        let entries = self.entries().await?;
        if entries.len() <= cap {
            return Ok(0);
        }
        let excess = entries.len() - cap;
        write_ids_atomic(&self.path, &entries[excess..]).await?;
        tracing::info!(kept = cap, dropped = excess, "ledger trimmed");
        Ok(excess)
    }

    /// `commit` followed by `trim_to_cap` with the configured cap.
    pub async fn commit_and_trim(&self, id: &ItemId) -> Result<()> {
        self.commit(id).await?;
        self.trim_to_cap(self.cap).await?;
        Ok(())
    }
}
