//! Crosswiki eligibility engine.
//!
//! An [`Event`] bundles global rules, checked once against the user's global account,
//! and rule entries, which accumulate evidence while the [`Evaluator`] visits each of
//! the user's wikis in order. Each entry's workflow decides when it stops looking.

pub mod account;
pub mod catalog;
pub mod database;
pub mod entry;
pub mod evaluator;
pub mod event;
pub mod outcome;
pub mod report;
pub mod rules;
pub mod snapshot;
pub mod status;
pub mod timestamp;

#[cfg(test)]
mod tests;

pub use account::{BlockState, GlobalAccount, LocalAccount, SourceSummary, WikiId};
pub use catalog::{EventRegistry, StandardCatalog};
pub use database::{DataError, EditCountQuery, LogTarget, RightsLogRecord, WikiDatabase};
pub use entry::{RuleEntry, RuleEntryId};
pub use evaluator::{EvaluationError, Evaluator};
pub use event::{Event, EventMetadata};
pub use outcome::ResultInfo;
pub use report::{Conclusion, EvaluationReport, GlobalRuleResult, RuleSummary, SourceResult};
pub use rules::{DefinitionError, GlobalRule, Rule, RuleError, SourceContext};
pub use snapshot::{Snapshot, SnapshotDatabase, SnapshotError};
pub use status::{RuleStatus, Workflow};
pub use timestamp::{Timestamp, TimestampError};
