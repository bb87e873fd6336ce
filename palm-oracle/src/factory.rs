use std::sync::Arc;

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::providers::{
    GeminiInsightProvider, OfflineInsightProvider, OpenAiCompatibleInsightProvider,
};
use crate::traits::InsightProvider;

pub fn build_insight_provider(
    cfg: ProviderConfig,
) -> Result<Arc<dyn InsightProvider>, ProviderError> {
    match cfg {
        ProviderConfig::Gemini(c) => Ok(Arc::new(GeminiInsightProvider::new(c)?)),
        ProviderConfig::OpenAiCompatible(c) => {
            Ok(Arc::new(OpenAiCompatibleInsightProvider::new(c)?))
        }
        ProviderConfig::Offline { reason } => Ok(Arc::new(OfflineInsightProvider::new(reason))),
    }
}
