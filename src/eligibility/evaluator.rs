use tracing::{debug, info, warn};

use super::account::WikiId;
use super::database::{DataError, WikiDatabase};
use super::entry::RuleEntry;
use super::event::Event;
use super::report::{Conclusion, EvaluationReport, GlobalRuleResult, RuleSummary, SourceResult};
use super::rules::{RuleError, SourceContext};
use super::status::RuleStatus;

/// Errors that abort an evaluation. Missing data is never reported as ineligibility.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("no global account named '{0}'")]
    UnknownUser(String),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("global rule '{rule}' could not be evaluated: {source}")]
    GlobalRule {
        rule: String,
        #[source]
        source: RuleError,
    },
    #[error("rule '{rule}' could not be evaluated on {wiki}: {source}")]
    Rule {
        rule: String,
        wiki: WikiId,
        #[source]
        source: RuleError,
    },
}

/// Runs events against a wiki database, one source at a time.
pub struct Evaluator<'a, D> {
    db: &'a mut D,
}

impl<'a, D: WikiDatabase> Evaluator<'a, D> {
    pub fn new(db: &'a mut D) -> Self {
        Self { db }
    }

    /// Evaluate `event` for `user`. The event is consumed because its rules carry the
    /// state of this run.
    pub fn run(
        &mut self,
        mut event: Event,
        user: &str,
    ) -> Result<EvaluationReport, EvaluationError> {
        let metadata = event.metadata().clone();
        info!(event = %metadata.id, user, "evaluating eligibility");

        let global = self
            .db
            .global_account(user)?
            .ok_or_else(|| EvaluationError::UnknownUser(user.to_string()))?;

        let mut global_results = Vec::with_capacity(event.global_rules().len());
        for rule in event.global_rules() {
            let info = rule
                .evaluate(&global)
                .map_err(|source| EvaluationError::GlobalRule {
                    rule: rule.describe(),
                    source,
                })?;
            debug!(
                rule = %rule.describe(),
                status = info.status().label(),
                "global rule evaluated"
            );
            global_results.push(GlobalRuleResult {
                rule: rule.describe(),
                info,
            });
        }

        let attached = self.db.attached_sources(&global)?;
        let ordered = event.source_order(&attached);
        let suggested_wiki = event.auto_select(&ordered);

        let mut visited_wikis = Vec::new();
        let mut missing_accounts = Vec::new();
        let mut results = Vec::new();

        for source in &ordered {
            if event.rules().iter().all(RuleEntry::is_final) {
                debug!("every rule is final; remaining wikis skipped");
                break;
            }

            self.db.connect(&source.wiki)?;
            let Some(local) = self.db.local_account(&global.name)? else {
                warn!(wiki = %source.wiki, user, "attached wiki has no local account");
                missing_accounts.push(source.wiki.clone());
                continue;
            };
            visited_wikis.push(source.wiki.clone());

            let context = SourceContext {
                wiki: &source.wiki,
                global: &global,
                local: &local,
            };

            for entry in event.rules_mut() {
                let screened = entry
                    .screens_out(&mut *self.db, &context)
                    .map_err(rule_error(entry, &source.wiki))?;
                if screened {
                    debug!(
                        wiki = %source.wiki,
                        entry = %entry.id(),
                        "settled rule fails this wiki; remaining rules skipped"
                    );
                    break;
                }

                let outcome = entry
                    .accumulate(&mut *self.db, &context)
                    .map_err(rule_error(entry, &source.wiki))?;
                let Some(info) = outcome else {
                    continue;
                };

                debug!(
                    wiki = %source.wiki,
                    entry = %entry.id(),
                    status = info.status().label(),
                    is_final = entry.is_final(),
                    "{}",
                    info.message()
                );
                for warning in info.warnings() {
                    warn!(wiki = %source.wiki, entry = %entry.id(), "{warning}");
                }

                let skip_rest = entry.workflow().skip_on_fail && info.status() == RuleStatus::Fail;
                results.push(SourceResult {
                    wiki: source.wiki.clone(),
                    entry: entry.id(),
                    rule: entry.describe(),
                    info,
                });

                if skip_rest {
                    debug!(
                        wiki = %source.wiki,
                        entry = %entry.id(),
                        "remaining rules skipped for this wiki"
                    );
                    break;
                }
            }
        }

        let mut conclusions = Vec::new();
        for entry in event.rules_mut() {
            if let Some(info) = entry.conclude() {
                conclusions.push(Conclusion {
                    entry: entry.id(),
                    rule: entry.describe(),
                    info,
                });
            }
        }

        let rules: Vec<RuleSummary> = event
            .rules()
            .iter()
            .map(|entry| RuleSummary {
                entry: entry.id(),
                rule: entry.describe(),
                workflow: entry.workflow(),
                result: entry.result(),
                is_final: entry.is_final(),
                last_message: entry.last_result().map(|info| info.message().to_string()),
            })
            .collect();

        let eligible = global_results
            .iter()
            .all(|result| result.info.status().is_pass())
            && rules.iter().all(|summary| summary.result.is_pass());

        info!(event = %metadata.id, user, eligible, "eligibility evaluated");

        Ok(EvaluationReport {
            event: metadata,
            user: global.name.clone(),
            suggested_wiki,
            visited_wikis,
            missing_accounts,
            global_results,
            results,
            conclusions,
            rules,
            eligible,
        })
    }
}

fn rule_error(entry: &RuleEntry, wiki: &WikiId) -> impl FnOnce(RuleError) -> EvaluationError {
    let rule = entry.describe();
    let wiki = wiki.clone();
    move |source| EvaluationError::Rule { rule, wiki, source }
}
