use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::account::{GlobalAccount, LocalAccount, SourceSummary, WikiId};
use super::database::{DataError, EditCountQuery, LogTarget, RightsLogRecord, WikiDatabase};
use super::timestamp::Timestamp;

/// Errors raised while loading a snapshot file.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Frozen copy of the directory and per-wiki data for a set of users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub global_accounts: Vec<GlobalAccount>,
    /// Wikis in directory order.
    #[serde(default)]
    pub wikis: Vec<WikiSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiSnapshot {
    pub id: WikiId,
    #[serde(default)]
    pub accounts: Vec<LocalAccountSnapshot>,
    #[serde(default)]
    pub rights_log: Vec<RightsLogRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalAccountSnapshot {
    pub account: LocalAccount,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub edits: Vec<EditRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRecord {
    pub timestamp: Timestamp,
    #[serde(default)]
    pub namespace: i32,
    #[serde(default)]
    pub deleted: bool,
}

/// In-memory `WikiDatabase` serving a `Snapshot`.
#[derive(Debug, Clone, Default)]
pub struct SnapshotDatabase {
    snapshot: Snapshot,
    current: Option<WikiId>,
    unavailable: BTreeSet<WikiId>,
    connections: Vec<WikiId>,
}

impl SnapshotDatabase {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            ..Self::default()
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_reader(reader)?;
        Ok(Self::new(snapshot))
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Make every later `connect` to `wiki` fail as if the replica were down.
    pub fn mark_unavailable(&mut self, wiki: WikiId) {
        self.unavailable.insert(wiki);
    }

    /// Every wiki connected to so far, in order.
    pub fn connections(&self) -> &[WikiId] {
        &self.connections
    }

    fn connected(&self) -> Result<&WikiSnapshot, DataError> {
        let current = self.current.as_ref().ok_or(DataError::NotConnected)?;
        self.snapshot
            .wikis
            .iter()
            .find(|wiki| &wiki.id == current)
            .ok_or_else(|| DataError::UnknownWiki(current.to_string()))
    }
}

impl WikiDatabase for SnapshotDatabase {
    fn current_wiki(&self) -> Option<&WikiId> {
        self.current.as_ref()
    }

    fn connect(&mut self, wiki: &WikiId) -> Result<(), DataError> {
        if self.unavailable.contains(wiki) {
            return Err(DataError::Unavailable(format!("{wiki} replica is offline")));
        }
        if !self.snapshot.wikis.iter().any(|known| &known.id == wiki) {
            return Err(DataError::UnknownWiki(wiki.to_string()));
        }

        self.current = Some(wiki.clone());
        self.connections.push(wiki.clone());
        Ok(())
    }

    fn global_account(&mut self, name: &str) -> Result<Option<GlobalAccount>, DataError> {
        Ok(self
            .snapshot
            .global_accounts
            .iter()
            .find(|account| account.name == name)
            .cloned())
    }

    fn attached_sources(
        &mut self,
        account: &GlobalAccount,
    ) -> Result<Vec<SourceSummary>, DataError> {
        let sources = self
            .snapshot
            .wikis
            .iter()
            .filter_map(|wiki| {
                wiki.accounts
                    .iter()
                    .find(|local| local.account.name == account.name)
                    .map(|local| SourceSummary {
                        wiki: wiki.id.clone(),
                        edit_count: local.account.edit_count,
                    })
            })
            .collect();
        Ok(sources)
    }

    fn local_account(&mut self, name: &str) -> Result<Option<LocalAccount>, DataError> {
        Ok(self
            .connected()?
            .accounts
            .iter()
            .find(|local| local.account.name == name)
            .map(|local| local.account.clone()))
    }

    fn count_edits(&mut self, query: &EditCountQuery<'_>) -> Result<u64, DataError> {
        let wiki = self.connected()?;
        let Some(local) = wiki
            .accounts
            .iter()
            .find(|local| local.account.actor_id == query.actor_id)
        else {
            return Ok(0);
        };

        let count = local
            .edits
            .iter()
            .filter(|edit| edit.deleted == query.deleted)
            .filter(|edit| query.namespace.map_or(true, |ns| edit.namespace == ns))
            .filter(|edit| query.since.map_or(true, |since| &edit.timestamp >= since))
            .filter(|edit| query.until.map_or(true, |until| &edit.timestamp <= until))
            .count();
        Ok(count as u64)
    }

    fn user_groups(&mut self, account: &LocalAccount) -> Result<Vec<String>, DataError> {
        Ok(self
            .connected()?
            .accounts
            .iter()
            .find(|local| local.account.id == account.id)
            .map(|local| local.groups.clone())
            .unwrap_or_default())
    }

    fn rights_log(&mut self, target: LogTarget<'_>) -> Result<Vec<RightsLogRecord>, DataError> {
        let wiki = self.connected()?;
        let records = wiki
            .rights_log
            .iter()
            .filter(|record| match target {
                LogTarget::User(name) => record.target == name,
                LogTarget::Interwiki(name) => record
                    .target
                    .split_once('@')
                    .map_or(false, |(user, _)| user == name),
            })
            .cloned()
            .collect();
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SNAPSHOT: &str = r#"{
        "global_accounts": [{ "id": 1, "name": "Example", "registered": "2008" }],
        "wikis": [
            {
                "id": "enwiki",
                "accounts": [{
                    "account": { "id": 10, "name": "Example", "actor_id": 100, "edit_count": 3 },
                    "groups": ["sysop"],
                    "edits": [
                        { "timestamp": "20090101" },
                        { "timestamp": "20100101", "namespace": 4 },
                        { "timestamp": "20110101", "deleted": true }
                    ]
                }],
                "rights_log": [
                    { "target": "Example", "timestamp": "20090101", "params": "\nsysop" }
                ]
            },
            {
                "id": "metawiki",
                "rights_log": [
                    { "target": "Example@enwiki", "timestamp": "20120101", "params": "sysop\n" },
                    { "target": "Other@enwiki", "timestamp": "20120101", "params": "\nsysop" }
                ]
            }
        ]
    }"#;

    fn database() -> SnapshotDatabase {
        SnapshotDatabase::from_reader(Cursor::new(SNAPSHOT)).expect("snapshot parses")
    }

    #[test]
    fn queries_require_a_connection() {
        let mut db = database();
        assert_eq!(db.local_account("Example"), Err(DataError::NotConnected));
    }

    #[test]
    fn connect_rejects_unknown_and_unavailable_wikis() {
        let mut db = database();
        assert_eq!(
            db.connect(&WikiId::new("dewiki")),
            Err(DataError::UnknownWiki("dewiki".to_string()))
        );

        db.mark_unavailable(WikiId::new("enwiki"));
        assert!(matches!(
            db.connect(&WikiId::new("enwiki")),
            Err(DataError::Unavailable(_))
        ));
        assert!(db.connections().is_empty());
    }

    #[test]
    fn attached_sources_follow_directory_order() {
        let mut db = database();
        let global = db
            .global_account("Example")
            .expect("lookup")
            .expect("account exists");
        let sources = db.attached_sources(&global).expect("sources");
        assert_eq!(
            sources,
            vec![SourceSummary {
                wiki: WikiId::new("enwiki"),
                edit_count: 3,
            }]
        );
    }

    #[test]
    fn count_edits_applies_filters() {
        let mut db = database();
        db.connect(&WikiId::new("enwiki")).expect("connect");
        let since = Timestamp::parse("2010").expect("since");

        let mut query = EditCountQuery {
            actor_id: 100,
            namespace: None,
            since: None,
            until: None,
            deleted: false,
        };
        assert_eq!(db.count_edits(&query), Ok(2));

        query.namespace = Some(4);
        assert_eq!(db.count_edits(&query), Ok(1));

        query.namespace = None;
        query.since = Some(&since);
        assert_eq!(db.count_edits(&query), Ok(1));

        query.deleted = true;
        assert_eq!(db.count_edits(&query), Ok(1));
    }

    #[test]
    fn rights_log_matches_local_and_interwiki_targets() {
        let mut db = database();
        db.connect(&WikiId::new("enwiki")).expect("connect");
        assert_eq!(db.rights_log(LogTarget::User("Example")).expect("log").len(), 1);

        db.connect(&WikiId::new("metawiki")).expect("connect");
        let central = db.rights_log(LogTarget::Interwiki("Example")).expect("log");
        assert_eq!(central.len(), 1);
        assert_eq!(central[0].target, "Example@enwiki");
    }
}
