use serde::Serialize;

use super::account::WikiId;
use super::entry::RuleEntryId;
use super::event::EventMetadata;
use super::outcome::ResultInfo;
use super::status::{RuleStatus, Workflow};

/// Verdict of one global rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalRuleResult {
    pub rule: String,
    pub info: ResultInfo,
}

/// One entry of the per-source result stream, in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceResult {
    pub wiki: WikiId,
    pub entry: RuleEntryId,
    pub rule: String,
    pub info: ResultInfo,
}

/// Verdict a rule reached after every source had been visited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conclusion {
    pub entry: RuleEntryId,
    pub rule: String,
    pub info: ResultInfo,
}

/// Terminal state of a rule entry at the end of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSummary {
    pub entry: RuleEntryId,
    pub rule: String,
    pub workflow: Workflow,
    pub result: RuleStatus,
    pub is_final: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
}

/// Everything a renderer needs to explain one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationReport {
    pub event: EventMetadata,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_wiki: Option<WikiId>,
    pub visited_wikis: Vec<WikiId>,
    /// Wikis listed by the directory that had no local account when visited.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_accounts: Vec<WikiId>,
    pub global_results: Vec<GlobalRuleResult>,
    pub results: Vec<SourceResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conclusions: Vec<Conclusion>,
    pub rules: Vec<RuleSummary>,
    pub eligible: bool,
}

impl EvaluationReport {
    pub fn results_for(&self, entry: RuleEntryId) -> impl Iterator<Item = &SourceResult> + '_ {
        self.results
            .iter()
            .filter(move |result| result.entry == entry)
    }

    pub fn rule(&self, entry: RuleEntryId) -> Option<&RuleSummary> {
        self.rules.iter().find(|summary| summary.entry == entry)
    }

    /// Every warning attached to any result, global rules first.
    pub fn warnings(&self) -> Vec<&str> {
        let global = self.global_results.iter().map(|result| &result.info);
        let local = self.results.iter().map(|result| &result.info);
        let concluded = self.conclusions.iter().map(|result| &result.info);

        global
            .chain(local)
            .chain(concluded)
            .flat_map(|info| info.warnings().iter().map(String::as_str))
            .collect()
    }

    pub fn summary(&self) -> String {
        if self.eligible {
            format!(
                "{} is eligible to {} in {}",
                self.user, self.event.action, self.event.name
            )
        } else {
            format!(
                "{} is not eligible to {} in {}",
                self.user, self.event.action, self.event.name
            )
        }
    }
}
