//! Rule capabilities and the concrete eligibility rules.

mod blocks;
mod edit_count;
mod global_account;
mod group_duration;
mod groups;
mod registration;

pub use blocks::NotBlockedRule;
pub use edit_count::EditCountRule;
pub use global_account::{GlobalAccountAgeRule, NotLockedRule};
pub use group_duration::{
    GroupChange, GroupDurationRule, HeldRange, LogParamsError, RIGHTS_LOG_EPOCH,
};
pub use groups::{GlobalGroupsRule, GroupMembershipRule, GroupName, MembershipMode};
pub use registration::DateRegisteredRule;

use std::collections::BTreeSet;

use super::account::{GlobalAccount, LocalAccount, WikiId};
use super::database::{DataError, WikiDatabase};
use super::outcome::ResultInfo;
use super::timestamp::TimestampError;

/// Construction-time errors in a rule or event definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error("unknown user group '{0}'")]
    UnknownGroup(String),
    #[error(transparent)]
    InvalidTimestamp(#[from] TimestampError),
    #[error("invalid threshold: {0}")]
    InvalidThreshold(String),
    #[error("unknown event '{0}'")]
    UnknownEvent(String),
}

/// Failure while a rule evaluates one source.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    LogParams(#[from] LogParamsError),
}

/// Everything a rule may read about the source being visited.
#[derive(Debug, Clone, Copy)]
pub struct SourceContext<'a> {
    pub wiki: &'a WikiId,
    pub global: &'a GlobalAccount,
    pub local: &'a LocalAccount,
}

/// A rule evaluated against each source in turn.
///
/// Implementations may keep running state across sources; a rule instance belongs to a
/// single evaluation run.
pub trait Rule {
    /// Short human-readable statement of the requirement.
    fn describe(&self) -> String;

    /// Judge the connected source. `Ok(None)` means the rule does not apply here.
    fn accumulate(
        &mut self,
        db: &mut dyn WikiDatabase,
        source: &SourceContext<'_>,
    ) -> Result<Option<ResultInfo>, RuleError>;

    /// Offered once every source has been visited without the rule reaching finality.
    fn conclude(&mut self) -> Option<ResultInfo> {
        None
    }

    /// Whether the connected source fails this rule, judged without recording anything.
    ///
    /// A settled `skip_on_fail` entry still uses this to screen each wiki for the entries
    /// after it. Rules whose judgement depends on earlier sources keep the default.
    fn fails_source(
        &self,
        _db: &mut dyn WikiDatabase,
        _source: &SourceContext<'_>,
    ) -> Result<bool, RuleError> {
        Ok(false)
    }
}

/// A rule evaluated exactly once against the global account.
pub trait GlobalRule {
    fn describe(&self) -> String;

    fn evaluate(&self, account: &GlobalAccount) -> Result<ResultInfo, RuleError>;
}

type RuleFn =
    dyn FnMut(&mut dyn WikiDatabase, &SourceContext<'_>) -> Result<Option<ResultInfo>, RuleError>;

/// Rule backed by a closure, for one-off requirements that need no dedicated type.
pub struct FnRule {
    description: String,
    check: Box<RuleFn>,
}

impl FnRule {
    pub fn new<F>(description: impl Into<String>, check: F) -> Self
    where
        F: FnMut(&mut dyn WikiDatabase, &SourceContext<'_>) -> Result<Option<ResultInfo>, RuleError>
            + 'static,
    {
        Self {
            description: description.into(),
            check: Box::new(check),
        }
    }
}

impl Rule for FnRule {
    fn describe(&self) -> String {
        self.description.clone()
    }

    fn accumulate(
        &mut self,
        db: &mut dyn WikiDatabase,
        source: &SourceContext<'_>,
    ) -> Result<Option<ResultInfo>, RuleError> {
        (self.check)(db, source)
    }
}

/// Restricts a rule to a fixed set of wikis; elsewhere it does not apply.
pub struct ForWikis<R> {
    wikis: BTreeSet<WikiId>,
    inner: R,
}

impl<R: Rule> ForWikis<R> {
    pub fn new<I>(wikis: I, inner: R) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            wikis: wikis.into_iter().map(|wiki| WikiId(wiki.into())).collect(),
            inner,
        }
    }
}

impl<R: Rule> Rule for ForWikis<R> {
    fn describe(&self) -> String {
        let wikis = self
            .wikis
            .iter()
            .map(WikiId::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} (on {wikis})", self.inner.describe())
    }

    fn accumulate(
        &mut self,
        db: &mut dyn WikiDatabase,
        source: &SourceContext<'_>,
    ) -> Result<Option<ResultInfo>, RuleError> {
        if !self.wikis.contains(source.wiki) {
            return Ok(None);
        }
        self.inner.accumulate(db, source)
    }

    fn conclude(&mut self) -> Option<ResultInfo> {
        self.inner.conclude()
    }

    fn fails_source(
        &self,
        db: &mut dyn WikiDatabase,
        source: &SourceContext<'_>,
    ) -> Result<bool, RuleError> {
        if !self.wikis.contains(source.wiki) {
            return Ok(false);
        }
        self.inner.fails_source(db, source)
    }
}
