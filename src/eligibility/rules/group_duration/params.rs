use serde::{Deserialize, Deserializer};

use crate::eligibility::timestamp::Timestamp;

/// Errors raised while decoding a rights log parameter blob.
#[derive(Debug, thiserror::Error)]
pub enum LogParamsError {
    #[error("rights log entry has no parameters")]
    Empty,
    #[error("legacy rights log parameters need an old-groups line and a new-groups line")]
    MissingNewline,
    #[error("structured rights log parameters are invalid: {0}")]
    InvalidStructure(#[from] serde_json::Error),
}

/// Group lists before and after one rights change, with expiries for the new groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupChange {
    pub old_groups: Vec<String>,
    pub new_groups: Vec<String>,
    /// Parallel to `new_groups`; `None` means no expiry.
    pub new_expiries: Vec<Option<Timestamp>>,
}

/// What one rights change means for a single group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Transition {
    pub had_before: bool,
    pub has_after: bool,
    pub expiry: Option<Timestamp>,
}

impl GroupChange {
    /// Decode either parameter encoding.
    ///
    /// Older entries store two lines of comma-separated groups (old, then new). Newer
    /// entries store a keyed map with `4::oldgroups`, `5::newgroups` and `newmetadata`.
    pub fn decode(params: &str) -> Result<Self, LogParamsError> {
        if params.trim().is_empty() && !params.contains('\n') {
            return Err(LogParamsError::Empty);
        }

        if params.trim_start().starts_with('{') {
            let structured: StructuredParams = serde_json::from_str(params)?;
            return Ok(structured.into());
        }

        let (old, new) = params
            .split_once('\n')
            .ok_or(LogParamsError::MissingNewline)?;
        let new_groups = split_groups(new);
        let new_expiries = vec![None; new_groups.len()];

        Ok(Self {
            old_groups: split_groups(old),
            new_groups,
            new_expiries,
        })
    }

    pub fn mentions(&self, group: &str) -> bool {
        self.old_groups.iter().any(|name| name == group)
            || self.new_groups.iter().any(|name| name == group)
    }

    pub(crate) fn transition(&self, group: &str) -> Transition {
        let position = self.new_groups.iter().position(|name| name == group);
        Transition {
            had_before: self.old_groups.iter().any(|name| name == group),
            has_after: position.is_some(),
            expiry: position
                .and_then(|index| self.new_expiries.get(index).cloned())
                .flatten(),
        }
    }
}

fn split_groups(line: &str) -> Vec<String> {
    line.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Deserialize)]
struct StructuredParams {
    #[serde(rename = "4::oldgroups", default)]
    old_groups: Vec<String>,
    #[serde(rename = "5::newgroups")]
    new_groups: Vec<String>,
    #[serde(rename = "newmetadata", default)]
    new_metadata: Vec<GroupMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct GroupMetadata {
    #[serde(default, deserialize_with = "deserialize_expiry")]
    expiry: Option<Timestamp>,
}

impl From<StructuredParams> for GroupChange {
    fn from(params: StructuredParams) -> Self {
        let mut metadata = params.new_metadata.into_iter();
        let new_expiries = params
            .new_groups
            .iter()
            .map(|_| metadata.next().and_then(|meta| meta.expiry))
            .collect();

        Self {
            old_groups: params.old_groups,
            new_groups: params.new_groups,
            new_expiries,
        }
    }
}

fn deserialize_expiry<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") | Some("infinity") => Ok(None),
        Some(value) => Timestamp::parse(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
