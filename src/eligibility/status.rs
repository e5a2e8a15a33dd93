use serde::{Deserialize, Serialize};

/// Verdict reported by a rule for one source (or for the global account).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStatus {
    /// Disqualifying.
    Fail,
    /// Provisional; more sources are needed before a verdict exists.
    Accumulating,
    /// Satisfied so far, but a later source may still flip it to `Fail`.
    SoftPass,
    /// Qualifying.
    Pass,
}

impl RuleStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RuleStatus::Fail => "fail",
            RuleStatus::Accumulating => "accumulating",
            RuleStatus::SoftPass => "soft pass",
            RuleStatus::Pass => "pass",
        }
    }

    pub const fn is_pass(self) -> bool {
        matches!(self, RuleStatus::Pass)
    }
}

/// Controls how a rule entry's per-source results are combined.
///
/// Only `RuleEntry` and the evaluator read these toggles; rules never see them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    /// Stop evaluating the remaining rules for the current source when this one fails.
    pub skip_on_fail: bool,
    /// Once this rule fails on any source, its verdict is final.
    pub hard_fail: bool,
    /// Once this rule passes on any source, its verdict is final.
    pub on_any_wiki: bool,
}

impl Workflow {
    pub const SKIP_ON_FAIL_BIT: u8 = 1;
    pub const HARD_FAIL_BIT: u8 = 2;
    pub const ON_ANY_WIKI_BIT: u8 = 4;

    pub const fn new() -> Self {
        Self {
            skip_on_fail: false,
            hard_fail: false,
            on_any_wiki: false,
        }
    }

    /// Decode the legacy integer flag set. Unknown bits are ignored.
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            skip_on_fail: bits & Self::SKIP_ON_FAIL_BIT != 0,
            hard_fail: bits & Self::HARD_FAIL_BIT != 0,
            on_any_wiki: bits & Self::ON_ANY_WIKI_BIT != 0,
        }
    }

    pub const fn skip_on_fail(mut self) -> Self {
        self.skip_on_fail = true;
        self
    }

    pub const fn hard_fail(mut self) -> Self {
        self.hard_fail = true;
        self
    }

    pub const fn on_any_wiki(mut self) -> Self {
        self.on_any_wiki = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bits_decodes_each_flag() {
        assert_eq!(Workflow::from_bits(0), Workflow::new());
        assert_eq!(Workflow::from_bits(1), Workflow::new().skip_on_fail());
        assert_eq!(Workflow::from_bits(2), Workflow::new().hard_fail());
        assert_eq!(Workflow::from_bits(4), Workflow::new().on_any_wiki());

        let all = Workflow::from_bits(7);
        assert!(all.skip_on_fail && all.hard_fail && all.on_any_wiki);
    }

    #[test]
    fn from_bits_ignores_unknown_bits() {
        assert_eq!(Workflow::from_bits(0b1000_0010), Workflow::new().hard_fail());
    }
}
