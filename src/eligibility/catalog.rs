use super::account::WikiId;
use super::event::Event;
use super::rules::{
    DateRegisteredRule, DefinitionError, EditCountRule, GlobalAccountAgeRule, GlobalGroupsRule,
    GroupDurationRule, GroupMembershipRule, NotBlockedRule, NotLockedRule,
};
use super::status::Workflow;
use super::timestamp::Timestamp;

/// Source of event definitions. Every `build` returns a fresh event.
pub trait EventRegistry {
    /// Known event ids, newest first.
    fn event_ids(&self) -> Vec<&'static str>;

    fn build(&self, id: &str) -> Result<Event, DefinitionError>;
}

const STEWARD_2017_VOTER: &str = "steward-2017-voter";
const STEWARD_2017_CANDIDATE: &str = "steward-2017-candidate";
const BOARD_2021_VOTER: &str = "board-2021-voter";

/// Built-in elections.
#[derive(Debug, Clone)]
pub struct StandardCatalog {
    central_wiki: WikiId,
}

impl StandardCatalog {
    pub fn new(central_wiki: WikiId) -> Self {
        Self { central_wiki }
    }

    fn board_2021_voter(&self) -> Result<Event, DefinitionError> {
        Ok(
            Event::new(BOARD_2021_VOTER, 2021, "Board of Trustees elections 2021")
                .with_url("https://meta.wikimedia.org/wiki/Wikimedia_Foundation_elections/2021")
                .with_action("vote")
                .with_min_edits_for_autoselect(300)
                .with_global_rule(NotLockedRule)
                .with_global_rule(GlobalGroupsRule::none_of(&["global-bot"])?)
                .with_rule(NotBlockedRule::new(1), Workflow::new().hard_fail())
                .with_rule(
                    GroupMembershipRule::none_of(&["bot"])?,
                    Workflow::new().skip_on_fail().on_any_wiki(),
                )
                .with_rule(
                    EditCountRule::new(300)
                        .between(None, Some(Timestamp::parse("<20210705")?))?
                        .crosswiki(),
                    Workflow::new(),
                )
                .with_rule(
                    EditCountRule::new(20)
                        .between(
                            Some(Timestamp::parse("20210105")?),
                            Some(Timestamp::parse("<20210705")?),
                        )?
                        .crosswiki(),
                    Workflow::new(),
                )
                .with_exception(
                    "Wikimedia server administrators, staff and contractors may vote \
                     regardless of edits",
                ),
        )
    }

    fn steward_2017_voter(&self) -> Result<Event, DefinitionError> {
        Ok(Event::new(STEWARD_2017_VOTER, 2017, "Steward elections 2017")
            .with_url("https://meta.wikimedia.org/wiki/Stewards/Elections_2017")
            .with_action("vote")
            .with_min_edits_for_autoselect(600)
            .with_global_rule(NotLockedRule)
            .with_rule(NotBlockedRule::new(1), Workflow::new().hard_fail())
            .with_rule(
                GroupMembershipRule::none_of(&["bot"])?,
                Workflow::new().skip_on_fail().on_any_wiki(),
            )
            .with_rule(
                EditCountRule::new(600).between(None, Some(Timestamp::parse("<20161101")?))?,
                Workflow::new().skip_on_fail().on_any_wiki(),
            )
            .with_rule(
                EditCountRule::new(50).between(
                    Some(Timestamp::parse("20160801")?),
                    Some(Timestamp::parse("<20170201")?),
                )?,
                Workflow::new().on_any_wiki(),
            ))
    }

    fn steward_2017_candidate(&self) -> Result<Event, DefinitionError> {
        Ok(
            Event::new(STEWARD_2017_CANDIDATE, 2017, "Steward elections 2017")
                .with_url("https://meta.wikimedia.org/wiki/Stewards/Elections_2017")
                .with_action("be a candidate")
                .with_min_edits_for_autoselect(600)
                .with_global_rule(NotLockedRule)
                .with_global_rule(GlobalAccountAgeRule::new(
                    183,
                    Timestamp::parse("20170108")?,
                )?)
                .with_rule(NotBlockedRule::new(0), Workflow::new().hard_fail())
                .with_rule(
                    DateRegisteredRule::new(Timestamp::parse("<20161108")?),
                    Workflow::new().on_any_wiki(),
                )
                .with_rule(
                    GroupDurationRule::new(
                        "sysop",
                        183,
                        Timestamp::parse("20170108")?,
                        self.central_wiki.clone(),
                    )?,
                    Workflow::new().on_any_wiki(),
                )
                .with_extra_requirement("be at least 18 years old and of legal age")
                .with_extra_requirement(
                    "sign the confidentiality agreement for nonpublic information",
                ),
        )
    }
}

impl EventRegistry for StandardCatalog {
    fn event_ids(&self) -> Vec<&'static str> {
        vec![BOARD_2021_VOTER, STEWARD_2017_VOTER, STEWARD_2017_CANDIDATE]
    }

    fn build(&self, id: &str) -> Result<Event, DefinitionError> {
        match id {
            BOARD_2021_VOTER => self.board_2021_voter(),
            STEWARD_2017_VOTER => self.steward_2017_voter(),
            STEWARD_2017_CANDIDATE => self.steward_2017_candidate(),
            other => Err(DefinitionError::UnknownEvent(other.to_string())),
        }
    }
}
