//! Boundary between the engine and the wiki replica databases.
//!
//! The engine never builds SQL itself. Every value handed to a `WikiDatabase` method is
//! user-controlled and implementations must pass it to their store as a bound parameter.

use serde::{Deserialize, Serialize};

use super::account::{GlobalAccount, LocalAccount, SourceSummary, WikiId};
use super::timestamp::Timestamp;

/// Failures while talking to the account directory or a wiki database.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    #[error("no wiki database is connected")]
    NotConnected,
    #[error("unknown wiki '{0}'")]
    UnknownWiki(String),
    #[error("database unavailable: {0}")]
    Unavailable(String),
}

/// Edit count lookup against the connected wiki.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditCountQuery<'a> {
    pub actor_id: u64,
    pub namespace: Option<i32>,
    /// Inclusive lower bound on the edit timestamp.
    pub since: Option<&'a Timestamp>,
    /// Inclusive upper bound on the edit timestamp.
    pub until: Option<&'a Timestamp>,
    /// Count soft-deleted edits instead of live ones.
    pub deleted: bool,
}

/// Which rights log entries to fetch from the connected wiki.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    /// Entries about the local user page `User:<name>`.
    User(&'a str),
    /// Entries recorded on the central wiki about `<name>@<wiki>` for any wiki.
    Interwiki(&'a str),
}

/// Raw user-rights log row. `params` is decoded by the group duration rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RightsLogRecord {
    /// Log title, `Name` locally or `Name@wiki` on the central wiki.
    pub target: String,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub params: String,
}

/// Account directory and query executor with a single active connection.
///
/// `connect` replaces the current connection context; it is not reentrant, so callers
/// that visit a second wiki must reconnect to the original one afterwards.
pub trait WikiDatabase {
    fn current_wiki(&self) -> Option<&WikiId>;

    fn connect(&mut self, wiki: &WikiId) -> Result<(), DataError>;

    fn global_account(&mut self, name: &str) -> Result<Option<GlobalAccount>, DataError>;

    /// Local accounts attached to the global account, in directory order.
    fn attached_sources(
        &mut self,
        account: &GlobalAccount,
    ) -> Result<Vec<SourceSummary>, DataError>;

    fn local_account(&mut self, name: &str) -> Result<Option<LocalAccount>, DataError>;

    fn count_edits(&mut self, query: &EditCountQuery<'_>) -> Result<u64, DataError>;

    fn user_groups(&mut self, account: &LocalAccount) -> Result<Vec<String>, DataError>;

    fn rights_log(&mut self, target: LogTarget<'_>) -> Result<Vec<RightsLogRecord>, DataError>;
}
