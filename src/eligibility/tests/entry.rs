use std::cell::Cell;
use std::rc::Rc;

use super::common::*;
use crate::eligibility::database::WikiDatabase;
use crate::eligibility::entry::{RuleEntry, RuleEntryId};
use crate::eligibility::outcome::ResultInfo;
use crate::eligibility::rules::{Rule, RuleError, SourceContext};
use crate::eligibility::status::{RuleStatus, Workflow};

fn entry_for(
    script: Vec<Option<ResultInfo>>,
    workflow: Workflow,
) -> (RuleEntry, Rc<Cell<usize>>) {
    let (rule, calls) = scripted_rule(script);
    (RuleEntry::new(RuleEntryId(0), Box::new(rule), workflow), calls)
}

fn run(entry: &mut RuleEntry) -> Option<ResultInfo> {
    with_context(|db, context| entry.accumulate(db, context).expect("scripted rule succeeds"))
}

#[test]
fn finality_is_sticky() {
    let (mut entry, calls) = entry_for(
        vec![
            Some(ResultInfo::pass("enough edits").finalized()),
            Some(ResultInfo::fail("would flip the verdict")),
        ],
        Workflow::new(),
    );

    let first = run(&mut entry).expect("first source produces a result");
    assert_eq!(first.status(), RuleStatus::Pass);
    assert!(entry.is_final());
    assert_eq!(entry.result(), RuleStatus::Pass);

    assert_eq!(run(&mut entry), None);
    assert_eq!(run(&mut entry), None);
    assert_eq!(calls.get(), 1, "final entries never call the rule again");
    assert_eq!(entry.result(), RuleStatus::Pass);
}

#[test]
fn hard_fail_freezes_the_first_failure() {
    let (mut entry, _) = entry_for(
        vec![
            Some(ResultInfo::pass("ok on enwiki")),
            Some(ResultInfo::fail("blocked on dewiki")),
            Some(ResultInfo::pass("ok on frwiki")),
        ],
        Workflow::new().hard_fail(),
    );

    run(&mut entry);
    assert!(!entry.is_final());
    assert_eq!(entry.result(), RuleStatus::Accumulating);

    run(&mut entry);
    assert!(entry.is_final());
    assert_eq!(entry.result(), RuleStatus::Fail);

    assert_eq!(run(&mut entry), None);
    assert_eq!(entry.result(), RuleStatus::Fail);
    assert_eq!(
        entry.last_result().map(ResultInfo::message),
        Some("blocked on dewiki")
    );
}

#[test]
fn on_any_wiki_freezes_the_first_pass() {
    let (mut entry, _) = entry_for(
        vec![
            Some(ResultInfo::fail("too few edits on enwiki")),
            Some(ResultInfo::pass("enough edits on dewiki")),
            Some(ResultInfo::fail("too few edits on frwiki")),
        ],
        Workflow::new().on_any_wiki(),
    );

    run(&mut entry);
    assert!(!entry.is_final());

    run(&mut entry);
    assert!(entry.is_final());
    assert_eq!(entry.result(), RuleStatus::Pass);

    assert_eq!(run(&mut entry), None);
    assert_eq!(entry.result(), RuleStatus::Pass);
}

#[test]
fn inapplicable_sources_leave_the_entry_untouched() {
    let (mut entry, calls) = entry_for(
        vec![None, Some(ResultInfo::fail("too few edits"))],
        Workflow::new().hard_fail(),
    );

    assert_eq!(run(&mut entry), None);
    assert_eq!(calls.get(), 1);
    assert!(entry.last_result().is_none());
    assert!(!entry.is_final());
    assert_eq!(entry.result(), RuleStatus::Accumulating);

    run(&mut entry);
    assert_eq!(entry.result(), RuleStatus::Fail);
}

#[test]
fn results_without_finality_keep_the_entry_accumulating() {
    let (mut entry, _) = entry_for(
        vec![
            Some(ResultInfo::fail("too few edits")),
            Some(ResultInfo::pass("enough edits")),
        ],
        Workflow::new().skip_on_fail(),
    );

    run(&mut entry);
    run(&mut entry);

    assert!(!entry.is_final(), "skip_on_fail never finalizes an entry");
    assert_eq!(entry.result(), RuleStatus::Accumulating);
    assert_eq!(
        entry.last_result().map(ResultInfo::status),
        Some(RuleStatus::Pass)
    );
}

struct SettlesOnConclusion;

impl Rule for SettlesOnConclusion {
    fn describe(&self) -> String {
        "settles on conclusion".to_string()
    }

    fn accumulate(
        &mut self,
        _db: &mut dyn WikiDatabase,
        _source: &SourceContext<'_>,
    ) -> Result<Option<ResultInfo>, RuleError> {
        Ok(Some(ResultInfo::soft_pass("nothing against it yet")))
    }

    fn conclude(&mut self) -> Option<ResultInfo> {
        Some(ResultInfo::pass("nothing against it anywhere"))
    }
}

#[test]
fn conclude_settles_open_entries_once() {
    let mut entry =
        RuleEntry::new(RuleEntryId(3), Box::new(SettlesOnConclusion), Workflow::new());

    run(&mut entry);
    assert_eq!(entry.result(), RuleStatus::Accumulating);

    let conclusion = entry.conclude().expect("open entry concludes");
    assert_eq!(conclusion.status(), RuleStatus::Pass);
    assert!(entry.is_final());
    assert_eq!(entry.result(), RuleStatus::Pass);

    assert_eq!(entry.conclude(), None);
    assert_eq!(run(&mut entry), None);
}

#[test]
fn conclude_is_a_no_op_for_final_entries_and_rules_without_conclusions() {
    let (mut settled, _) = entry_for(
        vec![Some(ResultInfo::fail("blocked").finalized())],
        Workflow::new(),
    );
    run(&mut settled);
    assert_eq!(settled.conclude(), None);
    assert_eq!(settled.result(), RuleStatus::Fail);

    let (mut open, _) = entry_for(
        vec![Some(ResultInfo::accumulating("10 edits so far"))],
        Workflow::new(),
    );
    run(&mut open);
    assert_eq!(open.conclude(), None);
    assert!(!open.is_final());
    assert_eq!(open.result(), RuleStatus::Accumulating);
}

/// Passes wherever it is accumulated but fails every wiki it is asked to screen.
struct FailsOnScreening;

impl Rule for FailsOnScreening {
    fn describe(&self) -> String {
        "fails on screening".to_string()
    }

    fn accumulate(
        &mut self,
        _db: &mut dyn WikiDatabase,
        _source: &SourceContext<'_>,
    ) -> Result<Option<ResultInfo>, RuleError> {
        Ok(Some(ResultInfo::pass("not a bot on enwiki")))
    }

    fn fails_source(
        &self,
        _db: &mut dyn WikiDatabase,
        _source: &SourceContext<'_>,
    ) -> Result<bool, RuleError> {
        Ok(true)
    }
}

fn screens_out(entry: &RuleEntry) -> bool {
    with_context(|db, context| entry.screens_out(db, context).expect("screening succeeds"))
}

#[test]
fn settled_skip_on_fail_entries_keep_screening_without_changing_state() {
    let mut entry = RuleEntry::new(
        RuleEntryId(1),
        Box::new(FailsOnScreening),
        Workflow::new().skip_on_fail().on_any_wiki(),
    );
    assert!(!screens_out(&entry), "open entries screen through accumulate");

    run(&mut entry);
    assert!(entry.is_final());
    assert!(screens_out(&entry));
    assert!(screens_out(&entry));
    assert_eq!(entry.result(), RuleStatus::Pass);
    assert_eq!(
        entry.last_result().map(ResultInfo::message),
        Some("not a bot on enwiki")
    );

    let mut plain = RuleEntry::new(
        RuleEntryId(2),
        Box::new(FailsOnScreening),
        Workflow::new().on_any_wiki(),
    );
    run(&mut plain);
    assert!(plain.is_final());
    assert!(!screens_out(&plain), "only skip_on_fail entries screen");
}
