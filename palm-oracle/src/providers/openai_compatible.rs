use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};

use palm_core::{InsightContent, InsightRequest};

use crate::config::OpenAiCompatibleConfig;
use crate::error::ProviderError;
use crate::prompt::{build_prompt, parse_content};
use crate::traits::InsightProvider;

const SYSTEM: &str = "You are a career guidance analyst for engineering admissions. Reply with a single JSON object and nothing else.";

#[derive(Clone)]
pub struct OpenAiCompatibleInsightProvider {
    config: OpenAiCompatibleConfig,
    client: Client,
}

impl OpenAiCompatibleInsightProvider {
    pub fn new(config: OpenAiCompatibleConfig) -> Result<Self, ProviderError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::Config("openai api key is empty".to_string()));
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait::async_trait]
impl InsightProvider for OpenAiCompatibleInsightProvider {
    fn name(&self) -> &'static str {
        "openai-compatible"
    }

    async fn produce_insight(
        &self,
        request: &InsightRequest,
    ) -> Result<InsightContent, ProviderError> {
        let payload = ChatRequest {
            model: &self.config.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: SYSTEM.to_string(),
                },
                Msg {
                    role: "user",
                    content: build_prompt(request),
                },
            ],
            temperature: self.config.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let res = self
            .client
            .post(self.completions_url())
            .header(AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status, body });
        }

        let parsed: ChatResponse = res.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::InvalidResponse("no choices in completion".to_string()))?;

        parse_content(&text)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Msg>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct Msg {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MsgOut,
}

#[derive(Debug, Deserialize)]
struct MsgOut {
    content: Option<String>,
}
