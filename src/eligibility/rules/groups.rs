use std::fmt;

use serde::Serialize;

use super::{DefinitionError, GlobalRule, Rule, RuleError, SourceContext};
use crate::eligibility::account::GlobalAccount;
use crate::eligibility::database::WikiDatabase;
use crate::eligibility::outcome::ResultInfo;
use crate::eligibility::status::RuleStatus;

const LOCAL_GROUPS: &[&str] = &[
    "abusefilter",
    "accountcreator",
    "autopatrolled",
    "bot",
    "bureaucrat",
    "checkuser",
    "eventcoordinator",
    "extendedconfirmed",
    "import",
    "interface-admin",
    "ipblock-exempt",
    "oversight",
    "patroller",
    "reviewer",
    "rollbacker",
    "steward",
    "suppress",
    "sysop",
    "templateeditor",
    "transwiki",
];

const GLOBAL_GROUPS: &[&str] = &[
    "abusefilter-helper",
    "founder",
    "global-bot",
    "global-deleter",
    "global-interface-editor",
    "global-ipblock-exempt",
    "global-renamer",
    "global-rollbacker",
    "global-sysop",
    "ombuds",
    "staff",
    "sysadmin",
    "vrt-permissions",
];

/// A user group name checked against the groups the wikis define.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct GroupName(String);

impl GroupName {
    /// A group granted on individual wikis.
    pub fn local(name: &str) -> Result<Self, DefinitionError> {
        Self::known_in(name, LOCAL_GROUPS)
    }

    /// A crosswiki group held by the global account.
    pub fn global(name: &str) -> Result<Self, DefinitionError> {
        Self::known_in(name, GLOBAL_GROUPS)
    }

    fn known_in(name: &str, known: &[&str]) -> Result<Self, DefinitionError> {
        let normalized = name.trim().to_ascii_lowercase();
        if known.contains(&normalized.as_str()) {
            Ok(Self(normalized))
        } else {
            Err(DefinitionError::UnknownGroup(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipMode {
    /// Member of at least one listed group.
    AnyOf,
    /// Member of none of the listed groups.
    NoneOf,
}

fn parse_groups(
    names: &[&str],
    parse: fn(&str) -> Result<GroupName, DefinitionError>,
) -> Result<Vec<GroupName>, DefinitionError> {
    if names.is_empty() {
        return Err(DefinitionError::InvalidThreshold(
            "group membership rule needs at least one group".to_string(),
        ));
    }
    names.iter().map(|name| parse(name)).collect()
}

fn join(groups: &[GroupName]) -> String {
    groups
        .iter()
        .map(GroupName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn judge(groups: &[GroupName], mode: MembershipMode, held: &[&str], place: &str) -> ResultInfo {
    let matched: Vec<GroupName> = groups
        .iter()
        .filter(|group| held.contains(&group.as_str()))
        .cloned()
        .collect();

    match (mode, matched.is_empty()) {
        (MembershipMode::AnyOf, false) => {
            ResultInfo::pass(format!("member of {} {place}", join(&matched)))
        }
        (MembershipMode::AnyOf, true) => {
            ResultInfo::fail(format!("not a member of {} {place}", join(groups)))
        }
        (MembershipMode::NoneOf, true) => {
            ResultInfo::pass(format!("not a member of {} {place}", join(groups)))
        }
        (MembershipMode::NoneOf, false) => {
            ResultInfo::fail(format!("member of {} {place}", join(&matched)))
        }
    }
}

/// Local group membership requirement on each wiki.
#[derive(Debug, Clone)]
pub struct GroupMembershipRule {
    groups: Vec<GroupName>,
    mode: MembershipMode,
}

impl GroupMembershipRule {
    pub fn any_of(names: &[&str]) -> Result<Self, DefinitionError> {
        Ok(Self {
            groups: parse_groups(names, GroupName::local)?,
            mode: MembershipMode::AnyOf,
        })
    }

    pub fn none_of(names: &[&str]) -> Result<Self, DefinitionError> {
        Ok(Self {
            groups: parse_groups(names, GroupName::local)?,
            mode: MembershipMode::NoneOf,
        })
    }

    fn judge_source(
        &self,
        db: &mut dyn WikiDatabase,
        source: &SourceContext<'_>,
    ) -> Result<ResultInfo, RuleError> {
        let held = db.user_groups(source.local)?;
        let held: Vec<&str> = held.iter().map(String::as_str).collect();
        let place = format!("on {}", source.wiki);
        Ok(judge(&self.groups, self.mode, &held, &place))
    }
}

impl Rule for GroupMembershipRule {
    fn describe(&self) -> String {
        match self.mode {
            MembershipMode::AnyOf => format!("member of {}", join(&self.groups)),
            MembershipMode::NoneOf => format!("not a member of {}", join(&self.groups)),
        }
    }

    fn accumulate(
        &mut self,
        db: &mut dyn WikiDatabase,
        source: &SourceContext<'_>,
    ) -> Result<Option<ResultInfo>, RuleError> {
        self.judge_source(db, source).map(Some)
    }

    fn fails_source(
        &self,
        db: &mut dyn WikiDatabase,
        source: &SourceContext<'_>,
    ) -> Result<bool, RuleError> {
        Ok(self.judge_source(db, source)?.status() == RuleStatus::Fail)
    }
}

/// Crosswiki group membership requirement on the global account.
#[derive(Debug, Clone)]
pub struct GlobalGroupsRule {
    groups: Vec<GroupName>,
    mode: MembershipMode,
}

impl GlobalGroupsRule {
    pub fn any_of(names: &[&str]) -> Result<Self, DefinitionError> {
        Ok(Self {
            groups: parse_groups(names, GroupName::global)?,
            mode: MembershipMode::AnyOf,
        })
    }

    pub fn none_of(names: &[&str]) -> Result<Self, DefinitionError> {
        Ok(Self {
            groups: parse_groups(names, GroupName::global)?,
            mode: MembershipMode::NoneOf,
        })
    }
}

impl GlobalRule for GlobalGroupsRule {
    fn describe(&self) -> String {
        match self.mode {
            MembershipMode::AnyOf => format!("global member of {}", join(&self.groups)),
            MembershipMode::NoneOf => format!("not a global member of {}", join(&self.groups)),
        }
    }

    fn evaluate(&self, account: &GlobalAccount) -> Result<ResultInfo, RuleError> {
        let held: Vec<&str> = account.groups.iter().map(String::as_str).collect();
        Ok(judge(&self.groups, self.mode, &held, "globally"))
    }
}
