use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::timestamp::Timestamp;

/// Database name identifying one wiki (e.g. `enwiki`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WikiId(pub String);

impl WikiId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WikiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The user's single crosswiki identity, fetched once per evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalAccount {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub registered: Option<Timestamp>,
    #[serde(default)]
    pub home_wiki: Option<WikiId>,
    /// Crosswiki group memberships (e.g. `global-rollbacker`).
    #[serde(default)]
    pub groups: BTreeSet<String>,
}

/// Active block on one wiki.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockState {
    /// `None` means the block never expires.
    #[serde(default)]
    pub expiry: Option<Timestamp>,
    /// Restricted to some pages or namespaces rather than sitewide.
    #[serde(default)]
    pub partial: bool,
    #[serde(default)]
    pub reason: String,
}

impl BlockState {
    pub fn is_indefinite(&self) -> bool {
        self.expiry.is_none()
    }
}

/// The user's account on one wiki, fetched on each source visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalAccount {
    pub id: u64,
    pub name: String,
    pub actor_id: u64,
    /// Wikis did not record registration before late 2005, so this may be absent.
    #[serde(default)]
    pub registered: Option<Timestamp>,
    #[serde(default)]
    pub edit_count: u64,
    #[serde(default)]
    pub block: Option<BlockState>,
}

/// One attached local account as listed by the crosswiki directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub wiki: WikiId,
    pub edit_count: u64,
}
