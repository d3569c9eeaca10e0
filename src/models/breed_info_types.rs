use serde::Serialize;
use std::collections::BTreeMap;

/// Fields extracted from one breed page.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct SourceContent {
    /// Label/value pairs from the page's stat box, in page order.
    pub general_info: Vec<(String, String)>,
    pub temperament: String,
    pub health: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub care: Option<String>,
}

impl SourceContent {
    pub fn is_empty(&self) -> bool {
        self.general_info.is_empty()
            && self.temperament.is_empty()
            && self.health.is_empty()
            && self.history.as_deref().map_or(true, str::is_empty)
            && self.care.as_deref().map_or(true, str::is_empty)
    }
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct BreedInfo {
    pub breed: String,
    /// Keyed by source name (`akc`, `dogtime`).
    pub content: BTreeMap<String, SourceContent>,
    pub success: bool,
    pub error: Option<String>,
}
