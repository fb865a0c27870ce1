// src/catalog/types.rs
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AnnouncerError;

/// Opaque catalog item identifier. The API hands out integers; we keep the
/// decimal text so the files stay plain and comparisons are by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let t = raw.trim();
        if t.is_empty() {
            None
        } else {
            Some(Self(t.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for ItemId {
    fn from(v: u64) -> Self {
        Self(v.to_string())
    }
}

impl FromStr for ItemId {
    type Err = AnnouncerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| AnnouncerError::parse("item id", "blank"))
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(u64),
            Str(String),
        }
        match Raw::deserialize(d)? {
            Raw::Num(n) => Ok(Self::from(n)),
            Raw::Str(s) => {
                Self::parse(&s).ok_or_else(|| serde::de::Error::custom("empty item id"))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreatorType {
    User,
    Group,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Creator {
    pub kind: CreatorType,
    pub target_id: u64,
    pub name: String,
}

/// Enriched record for one pending item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "DetailWire")]
pub struct ItemDetail {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub is_purchasable: bool,
    pub price: Option<i64>,
    pub creator: Creator,
}

// Shape of the details endpoint body; nullable fields default.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailWire {
    id: ItemId,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    is_purchasable: bool,
    #[serde(default)]
    price: Option<i64>,
    creator_type: CreatorType,
    creator_target_id: u64,
    #[serde(default)]
    creator_name: String,
}

impl From<DetailWire> for ItemDetail {
    fn from(w: DetailWire) -> Self {
        Self {
            id: w.id,
            name: w.name,
            description: w.description.unwrap_or_default(),
            is_purchasable: w.is_purchasable,
            price: w.price,
            creator: Creator {
                kind: w.creator_type,
                target_id: w.creator_target_id,
                name: w.creator_name,
            },
        }
    }
}
