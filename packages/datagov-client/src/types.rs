use serde::Deserialize;

/// One page of a paginated resource query.
///
/// Records are kept as raw JSON values; validation of individual records is
/// the consumer's concern, and one malformed record must not poison a page.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordPage {
    /// Server-reported total matching records across all pages.
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub records: Vec<serde_json::Value>,
}

impl RecordPage {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
