use super::{Rule, RuleError, SourceContext};
use crate::eligibility::account::{BlockState, WikiId};
use crate::eligibility::database::WikiDatabase;
use crate::eligibility::outcome::ResultInfo;

/// Fails once the user is blocked on more than `max_blocks` wikis.
///
/// Passing can only be confirmed after every wiki has been visited, so each clean
/// source yields `SoftPass` and the pass is settled in `conclude`. Partial blocks
/// never count.
#[derive(Debug, Clone)]
pub struct NotBlockedRule {
    max_blocks: usize,
    indefinite_only: bool,
    blocked_on: Vec<WikiId>,
}

impl NotBlockedRule {
    pub fn new(max_blocks: usize) -> Self {
        Self {
            max_blocks,
            indefinite_only: false,
            blocked_on: Vec::new(),
        }
    }

    /// Ignore blocks that have an expiry.
    pub fn indefinite_only(mut self) -> Self {
        self.indefinite_only = true;
        self
    }

    fn counts(&self, block: &BlockState) -> bool {
        !block.partial && (!self.indefinite_only || block.is_indefinite())
    }

    fn blocked_list(&self) -> String {
        self.blocked_on
            .iter()
            .map(WikiId::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Rule for NotBlockedRule {
    fn describe(&self) -> String {
        let kind = if self.indefinite_only {
            "indefinitely blocked"
        } else {
            "blocked"
        };
        match self.max_blocks {
            0 => format!("not {kind} on any wiki"),
            1 => format!("not {kind} on more than one wiki"),
            max => format!("not {kind} on more than {max} wikis"),
        }
    }

    fn accumulate(
        &mut self,
        _db: &mut dyn WikiDatabase,
        source: &SourceContext<'_>,
    ) -> Result<Option<ResultInfo>, RuleError> {
        let blocked_here = source
            .local
            .block
            .as_ref()
            .map_or(false, |block| self.counts(block));

        if blocked_here {
            self.blocked_on.push(source.wiki.clone());
        }

        let info = if self.blocked_on.len() > self.max_blocks {
            ResultInfo::fail(format!(
                "blocked on {} wikis ({}), more than the {} allowed",
                self.blocked_on.len(),
                self.blocked_list(),
                self.max_blocks
            ))
            .finalized()
        } else if blocked_here {
            ResultInfo::soft_pass(format!(
                "blocked on {} ({} of {} allowed so far)",
                source.wiki,
                self.blocked_on.len(),
                self.max_blocks
            ))
        } else {
            ResultInfo::soft_pass(format!("not blocked on {}", source.wiki))
        };

        Ok(Some(info))
    }

    fn conclude(&mut self) -> Option<ResultInfo> {
        let info = if self.blocked_on.is_empty() {
            ResultInfo::pass("not blocked on any wiki")
        } else {
            ResultInfo::pass(format!(
                "blocked on {} wikis ({}), within the {} allowed",
                self.blocked_on.len(),
                self.blocked_list(),
                self.max_blocks
            ))
        };
        Some(info.finalized())
    }
}
