//! Paginated retrieval from the upstream resource API.

use async_trait::async_trait;
use datagov_client::{ClientError, DataGovClient, RecordPage};

use crate::types::Partition;

/// Upstream page size. One page is the unit of validation and persistence.
pub const PAGE_SIZE: u64 = 1000;

/// Source of raw record pages for one partition (trait to allow mocking).
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_page(
        &self,
        key: &Partition,
        offset: u64,
        limit: u64,
    ) -> Result<RecordPage, ClientError>;
}

/// Production source backed by the data.gov.in client, filtering
/// server-side by the partition key.
pub struct DataGovSource {
    client: DataGovClient,
}

impl DataGovSource {
    pub fn new(client: DataGovClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecordSource for DataGovSource {
    async fn fetch_page(
        &self,
        key: &Partition,
        offset: u64,
        limit: u64,
    ) -> Result<RecordPage, ClientError> {
        self.client
            .fetch_page(
                &[
                    ("filters[state_name]", key.state_name.as_str()),
                    ("filters[fin_year]", key.fin_year.as_str()),
                    ("filters[month]", key.month.as_str()),
                ],
                offset,
                limit,
            )
            .await
    }
}
