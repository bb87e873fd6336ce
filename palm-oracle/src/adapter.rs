//! Turns one insight request into a complete result, whatever the provider does.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use chrono_tz::Tz;
use palm_core::{InsightContent, InsightRequest, InsightResult, InsightSource};

use crate::error::ProviderError;
use crate::traits::InsightProvider;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Kolkata;
const DATE_FORMAT: &str = "%-d/%-m/%Y";

#[derive(Debug, Clone, PartialEq)]
pub enum InsightOutcome {
    Generated(InsightContent),
    Unavailable { reason: String },
}

#[derive(Clone)]
pub struct InsightAdapter {
    provider: Arc<dyn InsightProvider>,
    timeout: Duration,
    timezone: Tz,
}

impl InsightAdapter {
    pub fn new(provider: Arc<dyn InsightProvider>) -> Self {
        Self {
            provider,
            timeout: DEFAULT_TIMEOUT,
            timezone: DEFAULT_TIMEZONE,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Today's date in the configured timezone, as shown on the result card.
    pub fn today(&self) -> String {
        Utc::now()
            .with_timezone(&self.timezone)
            .format(DATE_FORMAT)
            .to_string()
    }

    /// One provider attempt, bounded by the timeout. Never an error.
    pub async fn produce(&self, request: &InsightRequest) -> InsightOutcome {
        let attempt =
            tokio::time::timeout(self.timeout, self.provider.produce_insight(request)).await;
        let reply = match attempt {
            Ok(reply) => reply,
            Err(_) => Err(ProviderError::Timeout(self.timeout)),
        };

        match reply.and_then(|c| {
            c.validate().map_err(ProviderError::InvalidResponse)?;
            Ok(c)
        }) {
            Ok(content) => InsightOutcome::Generated(content),
            Err(err) => InsightOutcome::Unavailable {
                reason: err.to_string(),
            },
        }
    }

    /// Full result for the request: generated content when possible, fallback otherwise.
    pub async fn generate(&self, request: &InsightRequest) -> InsightResult {
        let date = self.today();
        match self.produce(request).await {
            InsightOutcome::Generated(content) => {
                tracing::info!(
                    provider = self.provider.name(),
                    generation = request.generation,
                    top = %request.top,
                    "insight generated"
                );
                InsightResult::compose(request, content, InsightSource::Generated, date)
            }
            InsightOutcome::Unavailable { reason } => {
                tracing::warn!(
                    provider = self.provider.name(),
                    generation = request.generation,
                    %reason,
                    "insight generation failed; using fallback"
                );
                InsightResult::fallback(request, date)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use palm_core::{BranchCode, QuestionBank, ResponseSet, ScoringPolicy, evaluate};

    /// Replies with the content, or a 503 when there is none.
    struct Canned(Option<InsightContent>);

    #[async_trait]
    impl InsightProvider for Canned {
        fn name(&self) -> &'static str {
            "canned"
        }

        async fn produce_insight(
            &self,
            _request: &InsightRequest,
        ) -> Result<InsightContent, ProviderError> {
            self.0.clone().ok_or_else(|| ProviderError::Api {
                status: 503,
                body: "overloaded".to_string(),
            })
        }
    }

    struct Stalled;

    #[async_trait]
    impl InsightProvider for Stalled {
        fn name(&self) -> &'static str {
            "stalled"
        }

        async fn produce_insight(
            &self,
            _request: &InsightRequest,
        ) -> Result<InsightContent, ProviderError> {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Err(ProviderError::Unavailable("never".to_string()))
        }
    }

    fn request() -> InsightRequest {
        let bank = QuestionBank::builtin();
        let responses = ResponseSet::new()
            .with_name("Asha Kumar")
            .with_answer("p2_1", "Building and testing hardware");
        let ranked = evaluate(&bank, &responses, &ScoringPolicy::default());
        InsightRequest {
            generation: 0,
            name: "Asha Kumar".to_string(),
            top: ranked.top().code,
            ranked,
            responses,
            institution: "MIT Muzaffarpur".to_string(),
        }
    }

    fn generated() -> InsightContent {
        let mut c = InsightContent::fallback("x", "y");
        c.personality_summary = "Circuit Whisperer".to_string();
        c
    }

    #[tokio::test]
    async fn test_success_is_marked_generated() {
        let adapter = InsightAdapter::new(Arc::new(Canned(Some(generated()))));
        let result = adapter.generate(&request()).await;

        assert_eq!(result.source, InsightSource::Generated);
        assert_eq!(result.content.personality_summary, "Circuit Whisperer");
        assert_eq!(result.top, BranchCode::Ece);
        assert_eq!(result.user_name, "Asha Kumar");
    }

    #[tokio::test]
    async fn test_provider_error_maps_to_fallback() {
        let adapter = InsightAdapter::new(Arc::new(Canned(None)));
        let req = request();

        match adapter.produce(&req).await {
            InsightOutcome::Unavailable { reason } => assert!(reason.contains("503")),
            other => panic!("expected unavailable, got {other:?}"),
        }

        let result = adapter.generate(&req).await;
        assert_eq!(result.source, InsightSource::Fallback);
        assert_eq!(
            result.content,
            InsightContent::fallback(BranchCode::Ece.label(), "MIT Muzaffarpur")
        );
    }

    #[tokio::test]
    async fn test_blank_content_is_rejected() {
        let mut blank = generated();
        blank.academic_explanation = String::new();
        let adapter = InsightAdapter::new(Arc::new(Canned(Some(blank))));

        let result = adapter.generate(&request()).await;
        assert_eq!(result.source, InsightSource::Fallback);
        assert_eq!(result.content.personality_summary, "Strategic Engineering Mind");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_bounds_the_call() {
        let adapter = InsightAdapter::new(Arc::new(Stalled)).with_timeout(Duration::from_secs(20));
        let started = tokio::time::Instant::now();

        let outcome = adapter.produce(&request()).await;
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(20) && elapsed < Duration::from_millis(20_005));
        match outcome {
            InsightOutcome::Unavailable { reason } => assert!(reason.contains("timed out")),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn test_today_uses_day_month_year() {
        let adapter = InsightAdapter::new(Arc::new(Canned(Some(generated()))));
        let today = adapter.today();
        let parts: Vec<&str> = today.split('/').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].len(), 4);
    }
}
