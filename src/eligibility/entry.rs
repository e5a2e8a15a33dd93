use std::fmt;

use serde::{Deserialize, Serialize};

use super::database::WikiDatabase;
use super::outcome::ResultInfo;
use super::rules::{Rule, RuleError, SourceContext};
use super::status::{RuleStatus, Workflow};

/// Position of a rule entry within its event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleEntryId(pub usize);

impl fmt::Display for RuleEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule #{}", self.0 + 1)
    }
}

/// A rule plus its workflow flags and the state accumulated over one run.
pub struct RuleEntry {
    id: RuleEntryId,
    rule: Box<dyn Rule>,
    workflow: Workflow,
    last_result: Option<ResultInfo>,
    result: RuleStatus,
    is_final: bool,
}

impl RuleEntry {
    pub fn new(id: RuleEntryId, rule: Box<dyn Rule>, workflow: Workflow) -> Self {
        Self {
            id,
            rule,
            workflow,
            last_result: None,
            result: RuleStatus::Accumulating,
            is_final: false,
        }
    }

    pub fn id(&self) -> RuleEntryId {
        self.id
    }

    pub fn describe(&self) -> String {
        self.rule.describe()
    }

    pub fn workflow(&self) -> Workflow {
        self.workflow
    }

    pub fn last_result(&self) -> Option<&ResultInfo> {
        self.last_result.as_ref()
    }

    /// Terminal status; stays `Accumulating` until the entry becomes final.
    pub fn result(&self) -> RuleStatus {
        self.result
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Evaluate the rule against one source.
    ///
    /// Returns `Ok(None)` without touching the rule once the entry is final, and leaves
    /// the entry unchanged when the rule does not apply to the source.
    pub fn accumulate(
        &mut self,
        db: &mut dyn WikiDatabase,
        source: &SourceContext<'_>,
    ) -> Result<Option<ResultInfo>, RuleError> {
        if self.is_final {
            return Ok(None);
        }

        let Some(info) = self.rule.accumulate(db, source)? else {
            return Ok(None);
        };

        let status = info.status();
        self.is_final = info.is_final()
            || (self.workflow.hard_fail && status == RuleStatus::Fail)
            || (self.workflow.on_any_wiki && status == RuleStatus::Pass);
        if self.is_final {
            self.result = status;
        }
        self.last_result = Some(info.clone());

        Ok(Some(info))
    }

    /// Whether this entry keeps the rules after it off `source`.
    ///
    /// Only a final `skip_on_fail` entry is asked, since an open one screens the source
    /// through `accumulate`. The entry's recorded state is left untouched.
    pub fn screens_out(
        &self,
        db: &mut dyn WikiDatabase,
        source: &SourceContext<'_>,
    ) -> Result<bool, RuleError> {
        if !(self.is_final && self.workflow.skip_on_fail) {
            return Ok(false);
        }
        self.rule.fails_source(db, source)
    }

    /// Settle a still-open entry after the last source; the conclusion is always final.
    pub fn conclude(&mut self) -> Option<ResultInfo> {
        if self.is_final {
            return None;
        }

        let info = self.rule.conclude()?;
        self.is_final = true;
        self.result = info.status();
        self.last_result = Some(info.clone());
        Some(info)
    }
}

impl fmt::Debug for RuleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleEntry")
            .field("id", &self.id)
            .field("rule", &self.rule.describe())
            .field("workflow", &self.workflow)
            .field("result", &self.result)
            .field("is_final", &self.is_final)
            .finish()
    }
}
