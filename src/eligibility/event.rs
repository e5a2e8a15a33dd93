use std::cmp::Reverse;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::account::{SourceSummary, WikiId};
use super::entry::{RuleEntry, RuleEntryId};
use super::rules::{GlobalRule, Rule};
use super::status::Workflow;

/// Descriptive data about an eligibility program, carried into reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    pub id: String,
    pub year: i32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub action: String,
    pub min_edits_for_autoselect: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_requirements: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<String>,
}

/// The rules defining one eligibility program (an election, a vote, a candidacy).
///
/// Rule entries accumulate state, so a fresh `Event` is built for every evaluation.
pub struct Event {
    metadata: EventMetadata,
    only_wikis: Option<Vec<WikiId>>,
    global_rules: Vec<Box<dyn GlobalRule>>,
    rules: Vec<RuleEntry>,
}

impl Event {
    pub fn new(id: impl Into<String>, year: i32, name: impl Into<String>) -> Self {
        Self {
            metadata: EventMetadata {
                id: id.into(),
                year,
                name: name.into(),
                url: None,
                action: "be eligible".to_string(),
                min_edits_for_autoselect: 1,
                extra_requirements: Vec::new(),
                exceptions: Vec::new(),
            },
            only_wikis: None,
            global_rules: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.metadata.url = Some(url.into());
        self
    }

    /// What the user becomes eligible to do, e.g. "vote".
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.metadata.action = action.into();
        self
    }

    /// Minimum local edits for a wiki to be suggested as the user's home wiki.
    pub fn with_min_edits_for_autoselect(mut self, min_edits: u64) -> Self {
        self.metadata.min_edits_for_autoselect = min_edits;
        self
    }

    /// Requirement the engine cannot check, shown alongside the verdict.
    pub fn with_extra_requirement(mut self, requirement: impl Into<String>) -> Self {
        self.metadata.extra_requirements.push(requirement.into());
        self
    }

    /// Circumstance under which an ineligible user may still qualify.
    pub fn with_exception(mut self, exception: impl Into<String>) -> Self {
        self.metadata.exceptions.push(exception.into());
        self
    }

    /// Visit only these wikis, in this order.
    pub fn only_wikis<I>(mut self, wikis: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.only_wikis = Some(wikis.into_iter().map(|wiki| WikiId(wiki.into())).collect());
        self
    }

    pub fn with_global_rule(mut self, rule: impl GlobalRule + 'static) -> Self {
        self.global_rules.push(Box::new(rule));
        self
    }

    pub fn with_rule(mut self, rule: impl Rule + 'static, workflow: Workflow) -> Self {
        let id = RuleEntryId(self.rules.len());
        self.rules.push(RuleEntry::new(id, Box::new(rule), workflow));
        self
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    pub fn global_rules(&self) -> &[Box<dyn GlobalRule>] {
        &self.global_rules
    }

    pub fn rules(&self) -> &[RuleEntry] {
        &self.rules
    }

    pub(crate) fn rules_mut(&mut self) -> &mut [RuleEntry] {
        &mut self.rules
    }

    /// Order the attached sources for a run.
    ///
    /// An explicit wiki list wins (wikis without an attached account are dropped);
    /// otherwise the busiest wikis come first and ties keep directory order.
    pub fn source_order(&self, sources: &[SourceSummary]) -> Vec<SourceSummary> {
        match &self.only_wikis {
            Some(wikis) => wikis
                .iter()
                .filter_map(|wiki| sources.iter().find(|source| &source.wiki == wiki))
                .cloned()
                .collect(),
            None => {
                let mut ordered = sources.to_vec();
                ordered.sort_by_key(|source| Reverse(source.edit_count));
                ordered
            }
        }
    }

    /// The wiki with the most edits, if it meets the auto-select threshold.
    pub fn auto_select(&self, sources: &[SourceSummary]) -> Option<WikiId> {
        sources
            .iter()
            .filter(|source| source.edit_count >= self.metadata.min_edits_for_autoselect)
            .min_by_key(|source| Reverse(source.edit_count))
            .map(|source| source.wiki.clone())
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("metadata", &self.metadata)
            .field("only_wikis", &self.only_wikis)
            .field("global_rules", &self.global_rules.len())
            .field("rules", &self.rules)
            .finish()
    }
}
