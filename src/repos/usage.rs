//! Usage history.

use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::client::{ApiClient, ClientError};
use crate::model::{Usage, UsageType};

const PREFIX: &str = "/usage";

#[derive(Serialize)]
struct RecordUsage<'a, D> {
    query: &'a str,
    result: &'a str,
    usage_type: UsageType,
    usage_data: &'a D,
}

/// Client for `/usage/*`.
#[derive(Debug, Clone)]
pub struct UsageRepo {
    client: ApiClient,
}

impl UsageRepo {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Record one use of the API.
    #[instrument(skip(self, result, usage_data))]
    pub async fn record<D: Serialize + Sync>(
        &self,
        query: &str,
        result: &str,
        usage_type: UsageType,
        usage_data: &D,
    ) -> Result<Value, ClientError> {
        let body = RecordUsage {
            query,
            result,
            usage_type,
            usage_data,
        };
        self.client
            .post_json(&format!("{PREFIX}/record"), &body)
            .await
    }

    /// Page through usages, newest first.
    #[instrument(skip(self))]
    pub async fn list_by_timestamp(&self, skip: u32, limit: u32) -> Result<Vec<Usage>, ClientError> {
        self.client
            .get_json(&format!(
                "{PREFIX}/list_by_timestamp/?skip={skip}&limit={limit}"
            ))
            .await
    }

    /// The ten most recent usages.
    #[instrument(skip(self))]
    pub async fn list_last(&self) -> Result<Vec<Usage>, ClientError> {
        self.client.get_json(&format!("{PREFIX}/last_10")).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, usage_id: &str) -> Result<Value, ClientError> {
        self.client
            .delete(&format!("{PREFIX}/delete/{usage_id}"))
            .await
    }
}
