use serde::{Deserialize, Serialize};

/// Result of recording a visit to a website.
///
/// Visit tracking never fails loudly; every failure is reported through this
/// value with `success == false` and a readable `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitOutcome {
    pub success: bool,
    pub new_visit_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VisitOutcome {
    pub fn recorded(new_visit_count: u64) -> Self {
        Self {
            success: true,
            new_visit_count,
            error: None,
        }
    }

    pub fn failed(visit_count: u64, error: impl Into<String>) -> Self {
        Self {
            success: false,
            new_visit_count: visit_count,
            error: Some(error.into()),
        }
    }
}
