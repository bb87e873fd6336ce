use async_trait::async_trait;
use palm_core::{InsightContent, InsightRequest};

use crate::error::ProviderError;

/// External narrative generator. One attempt per call; callers own fallback.
#[async_trait]
pub trait InsightProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn produce_insight(
        &self,
        request: &InsightRequest,
    ) -> Result<InsightContent, ProviderError>;
}
