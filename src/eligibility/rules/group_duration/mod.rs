mod params;
mod ranges;

pub use params::{GroupChange, LogParamsError};
pub use ranges::HeldRange;

use std::collections::HashMap;

use tracing::debug;

use super::{DefinitionError, GroupName, Rule, RuleError, SourceContext};
use crate::eligibility::account::WikiId;
use crate::eligibility::database::{DataError, LogTarget, RightsLogRecord, WikiDatabase};
use crate::eligibility::outcome::ResultInfo;
use crate::eligibility::timestamp::Timestamp;
use ranges::{held_ranges, LogEvent};

/// First day of the user rights log; earlier group changes were never recorded.
pub const RIGHTS_LOG_EPOCH: &str = "20041223";

/// Requires a group to have been held continuously for `min_days` before a deadline.
///
/// Reads the wiki's own rights log plus the central wiki's log of changes made to
/// `Name@wiki`. The central log is fetched once per group and cached for the run.
#[derive(Debug, Clone)]
pub struct GroupDurationRule {
    group: GroupName,
    min_days: i64,
    deadline: Timestamp,
    central_wiki: WikiId,
    rights_log_epoch: Timestamp,
    central_log: HashMap<GroupName, Vec<RightsLogRecord>>,
}

impl GroupDurationRule {
    pub fn new(
        group: &str,
        min_days: i64,
        deadline: Timestamp,
        central_wiki: WikiId,
    ) -> Result<Self, DefinitionError> {
        if min_days <= 0 {
            return Err(DefinitionError::InvalidThreshold(format!(
                "group duration must be at least one day (got {min_days})"
            )));
        }

        Ok(Self {
            group: GroupName::local(group)?,
            min_days,
            deadline,
            central_wiki,
            rights_log_epoch: Timestamp::parse(RIGHTS_LOG_EPOCH)?,
            central_log: HashMap::new(),
        })
    }

    /// The central wiki's log of interwiki changes to the user, read without caching.
    fn fetch_central(
        &self,
        db: &mut dyn WikiDatabase,
        source: &SourceContext<'_>,
    ) -> Result<Vec<RightsLogRecord>, RuleError> {
        if source.wiki == &self.central_wiki {
            return Ok(db.rights_log(LogTarget::Interwiki(&source.local.name))?);
        }
        let home = db.current_wiki().cloned().ok_or(DataError::NotConnected)?;
        db.connect(&self.central_wiki)?;
        let fetched = db.rights_log(LogTarget::Interwiki(&source.local.name));
        db.connect(&home)?;
        Ok(fetched?)
    }

    /// Central log entries about the user on the source wiki.
    fn central_records(
        &mut self,
        db: &mut dyn WikiDatabase,
        source: &SourceContext<'_>,
    ) -> Result<Vec<RightsLogRecord>, RuleError> {
        if !self.central_log.contains_key(&self.group) {
            let fetched = self.fetch_central(db, source)?;
            debug!(
                group = %self.group,
                central = %self.central_wiki,
                entries = fetched.len(),
                "cached central rights log"
            );
            self.central_log.insert(self.group.clone(), fetched);
        }

        Ok(self
            .central_log
            .get(&self.group)
            .map(|records| about_source(records, source))
            .unwrap_or_default())
    }

    fn longest_range(
        &self,
        records: Vec<RightsLogRecord>,
    ) -> Result<Option<HeldRange>, RuleError> {
        let mut events = Vec::with_capacity(records.len());
        for record in records {
            let change = GroupChange::decode(&record.params)?;
            if change.mentions(self.group.as_str()) {
                events.push(LogEvent {
                    transition: change.transition(self.group.as_str()),
                    timestamp: record.timestamp,
                });
            }
        }

        Ok(held_ranges(events, &self.deadline)
            .into_iter()
            .max_by_key(HeldRange::days))
    }

    fn predates_rights_log(&self, source: &SourceContext<'_>) -> bool {
        source
            .local
            .registered
            .as_ref()
            .map_or(true, |registered| registered < &self.rights_log_epoch)
    }
}

impl Rule for GroupDurationRule {
    fn describe(&self) -> String {
        format!(
            "{} for at least {} continuous days before {}",
            self.group, self.min_days, self.deadline
        )
    }

    fn accumulate(
        &mut self,
        db: &mut dyn WikiDatabase,
        source: &SourceContext<'_>,
    ) -> Result<Option<ResultInfo>, RuleError> {
        let mut records = db.rights_log(LogTarget::User(&source.local.name))?;
        records.extend(self.central_records(db, source)?);

        let longest = self.longest_range(records)?;
        let days = longest.as_ref().map_or(0, HeldRange::days);

        if let Some(range) = longest.filter(|_| days >= self.min_days) {
            return Ok(Some(ResultInfo::pass(format!(
                "{} for {days} continuous days from {} to {} (needs {} before {})",
                self.group, range.start, range.end, self.min_days, self.deadline
            ))));
        }

        let info = ResultInfo::fail(format!(
            "longest continuous {} membership on {} was {days} days (needs {} before {})",
            self.group, source.wiki, self.min_days, self.deadline
        ));

        Ok(Some(if self.predates_rights_log(source) {
            info.with_warning(format!(
                "the account on {} may predate the rights log ({}); earlier {} membership \
                 is not visible, so this result may be inaccurate",
                source.wiki, self.rights_log_epoch, self.group
            ))
        } else {
            info
        }))
    }

    fn fails_source(
        &self,
        db: &mut dyn WikiDatabase,
        source: &SourceContext<'_>,
    ) -> Result<bool, RuleError> {
        let mut records = db.rights_log(LogTarget::User(&source.local.name))?;
        match self.central_log.get(&self.group) {
            Some(cached) => records.extend(about_source(cached, source)),
            None => records.extend(about_source(&self.fetch_central(db, source)?, source)),
        }

        let days = self.longest_range(records)?.map_or(0, |range| range.days());
        Ok(days < self.min_days)
    }
}

fn about_source(records: &[RightsLogRecord], source: &SourceContext<'_>) -> Vec<RightsLogRecord> {
    let target = format!("{}@{}", source.local.name, source.wiki);
    records
        .iter()
        .filter(|record| record.target == target)
        .cloned()
        .collect()
}
