use super::{Rule, RuleError, SourceContext};
use crate::eligibility::database::WikiDatabase;
use crate::eligibility::outcome::ResultInfo;
use crate::eligibility::timestamp::Timestamp;

/// Requires the local account to be registered on or before a date.
#[derive(Debug, Clone)]
pub struct DateRegisteredRule {
    max_date: Timestamp,
}

impl DateRegisteredRule {
    pub fn new(max_date: Timestamp) -> Self {
        Self { max_date }
    }

    fn too_late(&self, source: &SourceContext<'_>) -> bool {
        source
            .local
            .registered
            .as_ref()
            .map_or(false, |registered| *registered > self.max_date)
    }
}

impl Rule for DateRegisteredRule {
    fn describe(&self) -> String {
        format!("registered on or before {}", self.max_date)
    }

    fn accumulate(
        &mut self,
        _db: &mut dyn WikiDatabase,
        source: &SourceContext<'_>,
    ) -> Result<Option<ResultInfo>, RuleError> {
        let info = match &source.local.registered {
            Some(registered) if *registered <= self.max_date => ResultInfo::pass(format!(
                "registered {registered} (must be on or before {})",
                self.max_date
            )),
            Some(registered) => ResultInfo::fail(format!(
                "registered {registered} (must be on or before {})",
                self.max_date
            )),
            // Wikis only began recording registration dates in late 2005.
            None => ResultInfo::pass("registered before registration dates were recorded")
                .with_warning(format!(
                    "no registration date on {}; assumed to be before December 2005",
                    source.wiki
                )),
        };

        Ok(Some(info))
    }

    fn fails_source(
        &self,
        _db: &mut dyn WikiDatabase,
        source: &SourceContext<'_>,
    ) -> Result<bool, RuleError> {
        Ok(self.too_late(source))
    }
}
