//! Pure data.gov.in REST API client.
//!
//! A minimal client for the data.gov.in resource API. Supports filtered,
//! paginated queries against a single resource dataset.
//!
//! # Example
//!
//! ```rust,ignore
//! use datagov_client::DataGovClient;
//!
//! let client = DataGovClient::new("your-api-key".into(), RESOURCE_ID.into())?;
//!
//! let page = client
//!     .fetch_page(&[("filters[state_name]", "UTTAR PRADESH")], 0, 1000)
//!     .await?;
//! println!("{} of {} records", page.len(), page.total);
//! ```

pub mod error;
pub mod types;

pub use error::{ClientError, Result};
pub use types::RecordPage;

use std::time::Duration;

const BASE_URL: &str = "https://api.data.gov.in";

/// Per-request timeout. Bounds each page fetch so a stalled upstream
/// connection surfaces as a retryable error instead of hanging the task.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct DataGovClient {
    client: reqwest::Client,
    api_key: String,
    resource_id: String,
}

impl DataGovClient {
    pub fn new(api_key: String, resource_id: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_key,
            resource_id,
        })
    }

    /// Fetch one page of the resource, filtered by the given
    /// `filters[...]` query parameters.
    pub async fn fetch_page(
        &self,
        filters: &[(&str, &str)],
        offset: u64,
        limit: u64,
    ) -> Result<RecordPage> {
        let url = format!("{}/resource/{}", BASE_URL, self.resource_id);

        let offset_s = offset.to_string();
        let limit_s = limit.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("api-key", self.api_key.as_str()),
            ("format", "json"),
            ("offset", offset_s.as_str()),
            ("limit", limit_s.as_str()),
        ];
        params.extend_from_slice(filters);

        let resp = self.client.get(&url).query(&params).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        let page: RecordPage = serde_json::from_str(&body)?;
        tracing::debug!(
            offset,
            limit,
            total = page.total,
            records = page.len(),
            "Fetched resource page"
        );
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_page_decodes_envelope() {
        let body = r#"{"total": 2500, "records": [{"district_name": "AGRA"}, {"district_name": "MATHURA"}]}"#;
        let page: RecordPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.total, 2500);
        assert_eq!(page.len(), 2);
    }

    #[test]
    fn record_page_tolerates_missing_fields() {
        let page: RecordPage = serde_json::from_str("{}").unwrap();
        assert_eq!(page.total, 0);
        assert!(page.is_empty());
    }

    #[test]
    fn retryability_classification() {
        let err = ClientError::Api {
            status: 503,
            message: "unavailable".into(),
        };
        assert!(err.is_retryable());

        let err = ClientError::Api {
            status: 403,
            message: "bad key".into(),
        };
        assert!(!err.is_retryable());
    }
}
