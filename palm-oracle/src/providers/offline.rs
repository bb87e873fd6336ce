use palm_core::{InsightContent, InsightRequest};

use crate::error::ProviderError;
use crate::traits::InsightProvider;

/// Stand-in when no credential is configured. Always unavailable.
#[derive(Debug, Clone)]
pub struct OfflineInsightProvider {
    reason: String,
}

impl OfflineInsightProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait::async_trait]
impl InsightProvider for OfflineInsightProvider {
    fn name(&self) -> &'static str {
        "offline"
    }

    async fn produce_insight(
        &self,
        _request: &InsightRequest,
    ) -> Result<InsightContent, ProviderError> {
        Err(ProviderError::Unavailable(self.reason.clone()))
    }
}
