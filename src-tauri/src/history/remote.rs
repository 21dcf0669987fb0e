use std::future::Future;

use serde_json::{json, Value};
use tracing::debug;

use super::types::{HistoryId, HistoryRecord, NewHistoryRecord};
use crate::api::{ApiClient, StatusResponse};
use crate::error::CodeliaError;

/// Durable, server-side history store.
pub trait RemoteHistoryStore: Send + Sync {
    /// All records, newest first.
    fn list(&self) -> impl Future<Output = Result<Vec<HistoryRecord>, CodeliaError>> + Send;

    /// Persist one record. The store assigns `id`, `req_id` and `created_at`.
    fn create(
        &self,
        record: &NewHistoryRecord,
    ) -> impl Future<Output = Result<(), CodeliaError>> + Send;

    fn delete(&self, id: &HistoryId) -> impl Future<Output = Result<(), CodeliaError>> + Send;
}

/// `RemoteHistoryStore` backed by the scoring backend's `/history` routes.
#[derive(Debug, Clone)]
pub struct HttpHistoryStore {
    api: ApiClient,
}

impl HttpHistoryStore {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl RemoteHistoryStore for HttpHistoryStore {
    async fn list(&self) -> Result<Vec<HistoryRecord>, CodeliaError> {
        self.api.get_json("history").await
    }

    async fn create(&self, record: &NewHistoryRecord) -> Result<(), CodeliaError> {
        // Either the created record or a status object; only logged.
        let reply: Value = self.api.post_json("history", record).await?;
        debug!("History create reply: {}", reply);
        Ok(())
    }

    async fn delete(&self, id: &HistoryId) -> Result<(), CodeliaError> {
        let reply: StatusResponse = self
            .api
            .post_json("history/delete", &json!({ "id": id }))
            .await?;
        debug!("History delete reply: {:?}", reply.status);
        Ok(())
    }
}
