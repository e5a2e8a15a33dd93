use serde::{Deserialize, Serialize};

use super::status::RuleStatus;

/// Outcome of one rule evaluation.
///
/// Built once by the rule; warnings may only be appended while it is being built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultInfo {
    status: RuleStatus,
    message: String,
    is_final: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

impl ResultInfo {
    pub fn new(status: RuleStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            is_final: false,
            warnings: Vec::new(),
        }
    }

    pub fn pass(message: impl Into<String>) -> Self {
        Self::new(RuleStatus::Pass, message)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(RuleStatus::Fail, message)
    }

    pub fn accumulating(message: impl Into<String>) -> Self {
        Self::new(RuleStatus::Accumulating, message)
    }

    pub fn soft_pass(message: impl Into<String>) -> Self {
        Self::new(RuleStatus::SoftPass, message)
    }

    /// Mark that no further sources need to be visited for this rule.
    pub fn finalized(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn status(&self) -> RuleStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}
