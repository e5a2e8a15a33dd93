use super::{DefinitionError, Rule, RuleError, SourceContext};
use crate::eligibility::account::LocalAccount;
use crate::eligibility::database::{EditCountQuery, WikiDatabase};
use crate::eligibility::outcome::ResultInfo;
use crate::eligibility::timestamp::Timestamp;

/// Requires a minimum number of edits, per wiki or summed across wikis.
#[derive(Debug, Clone)]
pub struct EditCountRule {
    min_count: u64,
    since: Option<Timestamp>,
    until: Option<Timestamp>,
    namespace: Option<i32>,
    crosswiki: bool,
    include_deleted: bool,
    total: u64,
}

impl EditCountRule {
    pub fn new(min_count: u64) -> Self {
        Self {
            min_count,
            since: None,
            until: None,
            namespace: None,
            crosswiki: false,
            include_deleted: false,
            total: 0,
        }
    }

    /// Only count edits made within the inclusive range.
    pub fn between(
        mut self,
        since: Option<Timestamp>,
        until: Option<Timestamp>,
    ) -> Result<Self, DefinitionError> {
        if let (Some(since), Some(until)) = (&since, &until) {
            if since > until {
                return Err(DefinitionError::InvalidThreshold(format!(
                    "edit range starts ({since}) after it ends ({until})"
                )));
            }
        }
        self.since = since;
        self.until = until;
        Ok(self)
    }

    pub fn in_namespace(mut self, namespace: i32) -> Self {
        self.namespace = Some(namespace);
        self
    }

    /// Sum edits over every visited wiki instead of judging each wiki alone.
    pub fn crosswiki(mut self) -> Self {
        self.crosswiki = true;
        self
    }

    /// Also count soft-deleted edits (an extra query per wiki).
    pub fn including_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    /// Running total over the wikis visited so far.
    pub fn total(&self) -> u64 {
        self.total
    }

    fn is_filtered(&self) -> bool {
        self.namespace.is_some() || self.since.is_some() || self.until.is_some()
    }

    fn count_local(
        &self,
        db: &mut dyn WikiDatabase,
        local: &LocalAccount,
    ) -> Result<u64, RuleError> {
        let mut query = EditCountQuery {
            actor_id: local.actor_id,
            namespace: self.namespace,
            since: self.since.as_ref(),
            until: self.until.as_ref(),
            deleted: false,
        };

        let mut count = if self.is_filtered() {
            db.count_edits(&query)?
        } else {
            local.edit_count
        };

        if self.include_deleted {
            query.deleted = true;
            count += db.count_edits(&query)?;
        }

        Ok(count)
    }

    fn scope(&self) -> String {
        let mut scope = String::new();
        if let Some(namespace) = self.namespace {
            scope.push_str(&format!(" in namespace {namespace}"));
        }
        match (&self.since, &self.until) {
            (Some(since), Some(until)) => scope.push_str(&format!(" between {since} and {until}")),
            (Some(since), None) => scope.push_str(&format!(" since {since}")),
            (None, Some(until)) => scope.push_str(&format!(" as of {until}")),
            (None, None) => {}
        }
        scope
    }
}

impl Rule for EditCountRule {
    fn describe(&self) -> String {
        let reach = if self.crosswiki {
            " combined across all wikis"
        } else {
            ""
        };
        format!("at least {} edits{}{reach}", self.min_count, self.scope())
    }

    fn accumulate(
        &mut self,
        db: &mut dyn WikiDatabase,
        source: &SourceContext<'_>,
    ) -> Result<Option<ResultInfo>, RuleError> {
        let local = self.count_local(db, source.local)?;
        self.total += local;
        let scope = self.scope();

        let info = if self.crosswiki {
            if self.total >= self.min_count {
                ResultInfo::pass(format!(
                    "has {} edits{scope} across wikis (needs {})",
                    self.total, self.min_count
                ))
                .finalized()
            } else {
                ResultInfo::accumulating(format!(
                    "has {} edits{scope} across wikis so far (needs {})",
                    self.total, self.min_count
                ))
            }
        } else if local >= self.min_count {
            ResultInfo::pass(format!(
                "has {local} edits{scope} (needs {})",
                self.min_count
            ))
        } else {
            ResultInfo::fail(format!(
                "has {local} edits{scope} (needs {})",
                self.min_count
            ))
        };

        Ok(Some(info))
    }

    /// Crosswiki counts never fail a single wiki.
    fn fails_source(
        &self,
        db: &mut dyn WikiDatabase,
        source: &SourceContext<'_>,
    ) -> Result<bool, RuleError> {
        if self.crosswiki {
            return Ok(false);
        }
        Ok(self.count_local(db, source.local)? < self.min_count)
    }
}
