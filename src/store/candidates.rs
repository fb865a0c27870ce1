// src/store/candidates.rs
use std::path::{Path, PathBuf};

use super::{read_ids, write_ids_atomic};
use crate::catalog::ItemId;
use crate::error::Result;

/// Candidate storage (`items.txt`): the ids a cycle is working through.
/// Emptied at the end of every cycle, so leftovers mean the previous cycle
/// was interrupted.
#[derive(Debug, Clone)]
pub struct CandidateStore {
    path: PathBuf,
}

impl CandidateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Vec<ItemId>> {
        Ok(read_ids(&self.path).await?.unwrap_or_default())
    }

    pub async fn replace(&self, ids: &[ItemId]) -> Result<()> {
        write_ids_atomic(&self.path, ids).await
    }

    pub async fn clear(&self) -> Result<()> {
        write_ids_atomic(&self.path, &[]).await
    }
}
