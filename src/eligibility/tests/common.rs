use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::eligibility::account::{BlockState, GlobalAccount, LocalAccount, WikiId};
use crate::eligibility::database::{RightsLogRecord, WikiDatabase};
use crate::eligibility::outcome::ResultInfo;
use crate::eligibility::rules::{FnRule, Rule, RuleError, SourceContext};
use crate::eligibility::snapshot::{
    EditRecord, LocalAccountSnapshot, Snapshot, SnapshotDatabase, WikiSnapshot,
};
use crate::eligibility::timestamp::Timestamp;

pub(super) const USER: &str = "Example";

pub(super) fn ts(token: &str) -> Timestamp {
    Timestamp::parse(token).expect("valid timestamp")
}

pub(super) fn global_account() -> GlobalAccount {
    GlobalAccount {
        id: 1,
        name: USER.to_string(),
        locked: false,
        hidden: false,
        registered: Some(ts("2008")),
        home_wiki: Some(WikiId::new("enwiki")),
        groups: Default::default(),
    }
}

pub(super) fn local_account(id: u64, edit_count: u64) -> LocalAccount {
    LocalAccount {
        id,
        name: USER.to_string(),
        actor_id: id * 10,
        registered: Some(ts("2008")),
        edit_count,
        block: None,
    }
}

pub(super) fn indefinite_block() -> BlockState {
    BlockState {
        expiry: None,
        partial: false,
        reason: "vandalism".to_string(),
    }
}

pub(super) fn account_snapshot(account: LocalAccount) -> LocalAccountSnapshot {
    LocalAccountSnapshot {
        account,
        groups: Vec::new(),
        edits: Vec::new(),
    }
}

pub(super) fn edit(token: &str, namespace: i32, deleted: bool) -> EditRecord {
    EditRecord {
        timestamp: ts(token),
        namespace,
        deleted,
    }
}

pub(super) fn log_entry(target: &str, token: &str, params: &str) -> RightsLogRecord {
    RightsLogRecord {
        target: target.to_string(),
        timestamp: ts(token),
        params: params.to_string(),
    }
}

pub(super) fn wiki(id: &str, accounts: Vec<LocalAccountSnapshot>) -> WikiSnapshot {
    WikiSnapshot {
        id: WikiId::new(id),
        accounts,
        rights_log: Vec::new(),
    }
}

/// A user with an account on each wiki, holding the given edit counts.
pub(super) fn wikis_with_edits(counts: &[(&str, u64)]) -> Vec<WikiSnapshot> {
    counts
        .iter()
        .enumerate()
        .map(|(index, (id, edits))| {
            wiki(id, vec![account_snapshot(local_account(index as u64 + 1, *edits))])
        })
        .collect()
}

pub(super) fn database(wikis: Vec<WikiSnapshot>) -> SnapshotDatabase {
    SnapshotDatabase::new(Snapshot {
        global_accounts: vec![global_account()],
        wikis,
    })
}

fn on_wiki<T>(
    db: &mut SnapshotDatabase,
    wiki: &str,
    f: impl FnOnce(&mut SnapshotDatabase, &SourceContext<'_>) -> Result<T, RuleError>,
) -> Result<T, RuleError> {
    let wiki = WikiId::new(wiki);
    db.connect(&wiki)?;
    let global = global_account();
    let local = db.local_account(USER)?.expect("local account in fixture");
    let context = SourceContext {
        wiki: &wiki,
        global: &global,
        local: &local,
    };
    f(db, &context)
}

/// Connect to `wiki` and run one `accumulate` call for the test user.
pub(super) fn visit(
    rule: &mut dyn Rule,
    db: &mut SnapshotDatabase,
    wiki: &str,
) -> Result<Option<ResultInfo>, RuleError> {
    on_wiki(db, wiki, |db, context| rule.accumulate(db, context))
}

/// Connect to `wiki` and ask whether the rule fails there, recording nothing.
pub(super) fn screen(
    rule: &dyn Rule,
    db: &mut SnapshotDatabase,
    wiki: &str,
) -> Result<bool, RuleError> {
    on_wiki(db, wiki, |db, context| rule.fails_source(db, context))
}

/// Rule replaying a fixed script of outcomes and counting how often it ran.
pub(super) fn scripted_rule(script: Vec<Option<ResultInfo>>) -> (FnRule, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let mut script = VecDeque::from(script);
    let rule = FnRule::new("scripted", move |_, _| {
        counter.set(counter.get() + 1);
        Ok(script.pop_front().flatten())
    });
    (rule, calls)
}

/// Fixed source context for rules that ignore the database.
pub(super) fn with_context<T>(f: impl FnOnce(&mut SnapshotDatabase, &SourceContext<'_>) -> T) -> T {
    let mut db = database(wikis_with_edits(&[("enwiki", 10)]));
    let wiki = WikiId::new("enwiki");
    let global = global_account();
    let local = local_account(1, 10);
    let context = SourceContext {
        wiki: &wiki,
        global: &global,
        local: &local,
    };
    f(&mut db, &context)
}
