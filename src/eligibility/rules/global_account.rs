use super::{DefinitionError, GlobalRule, RuleError};
use crate::eligibility::account::GlobalAccount;
use crate::eligibility::outcome::ResultInfo;
use crate::eligibility::timestamp::Timestamp;

/// Requires the global account to exist at least `min_days` before a reference date.
#[derive(Debug, Clone)]
pub struct GlobalAccountAgeRule {
    min_days: i64,
    as_of: Timestamp,
}

impl GlobalAccountAgeRule {
    pub fn new(min_days: i64, as_of: Timestamp) -> Result<Self, DefinitionError> {
        if min_days < 0 {
            return Err(DefinitionError::InvalidThreshold(format!(
                "account age must be non-negative (got {min_days} days)"
            )));
        }
        Ok(Self { min_days, as_of })
    }
}

impl GlobalRule for GlobalAccountAgeRule {
    fn describe(&self) -> String {
        format!(
            "global account at least {} days old on {}",
            self.min_days, self.as_of
        )
    }

    fn evaluate(&self, account: &GlobalAccount) -> Result<ResultInfo, RuleError> {
        let Some(registered) = &account.registered else {
            return Ok(ResultInfo::fail("global account has no registration date"));
        };

        let age = registered.days_until(&self.as_of);
        let message = format!(
            "global account registered {registered}, {age} days before {} (needs {})",
            self.as_of, self.min_days
        );

        Ok(if age >= self.min_days {
            ResultInfo::pass(message)
        } else {
            ResultInfo::fail(message)
        })
    }
}

/// Fails for globally locked accounts.
#[derive(Debug, Clone, Default)]
pub struct NotLockedRule;

impl GlobalRule for NotLockedRule {
    fn describe(&self) -> String {
        "global account not locked".to_string()
    }

    fn evaluate(&self, account: &GlobalAccount) -> Result<ResultInfo, RuleError> {
        if account.locked {
            return Ok(ResultInfo::fail("global account is locked"));
        }

        let info = ResultInfo::pass("global account is not locked");
        Ok(if account.hidden {
            info.with_warning("global account is hidden")
        } else {
            info
        })
    }
}
