use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            temperature: 0.7,
            timeout: Duration::from_secs(20),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl OpenAiCompatibleConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.openai.com".to_string(),
            model: model.into(),
            temperature: 0.4,
            timeout: Duration::from_secs(20),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ProviderConfig {
    Gemini(GeminiConfig),
    OpenAiCompatible(OpenAiCompatibleConfig),
    /// No credential: every request goes straight to the fallback.
    Offline { reason: String },
}

impl ProviderConfig {
    pub fn offline(reason: impl Into<String>) -> Self {
        ProviderConfig::Offline {
            reason: reason.into(),
        }
    }
}
