//! Picks the insight provider from config and credentials.

use anyhow::{Result, bail};
use std::time::Duration;

use palm_oracle::{
    GeminiConfig, InsightAdapter, OpenAiCompatibleConfig, ProviderConfig, build_insight_provider,
};

use crate::auth::AuthState;
use crate::config::Config;

pub fn provider_config(cfg: &Config, auth: &AuthState) -> Result<ProviderConfig> {
    let section = &cfg.insight;
    let timeout = Duration::from_secs(section.timeout_secs);

    let provider = match section.provider.as_str() {
        "gemini" => match &auth.gemini_api_key {
            Some(key) => {
                let mut c = GeminiConfig::new(key.clone(), section.model.clone());
                if !section.base_url.is_empty() {
                    c.base_url = section.base_url.clone();
                }
                c.temperature = section.temperature;
                c.timeout = timeout;
                ProviderConfig::Gemini(c)
            }
            None => ProviderConfig::offline(
                "no Gemini key; run `palm auth paste-gemini-key` or set GEMINI_API_KEY",
            ),
        },
        "openai" => match &auth.openai_api_key {
            Some(key) => {
                let mut c = OpenAiCompatibleConfig::new(key.clone(), section.model.clone());
                if !section.base_url.is_empty() {
                    c.base_url = section.base_url.clone();
                }
                c.temperature = section.temperature;
                c.timeout = timeout;
                ProviderConfig::OpenAiCompatible(c)
            }
            None => ProviderConfig::offline(
                "no OpenAI key; run `palm auth paste-openai-key` or set OPENAI_API_KEY",
            ),
        },
        "offline" => ProviderConfig::offline("insight.provider = \"offline\""),
        other => bail!("unknown insight.provider {other:?} (expected gemini, openai or offline)"),
    };
    Ok(provider)
}

pub fn build_adapter(cfg: &Config, auth: &AuthState) -> Result<InsightAdapter> {
    let provider_cfg = provider_config(cfg, auth)?;
    if let ProviderConfig::Offline { reason } = &provider_cfg {
        tracing::info!(%reason, "insight provider offline; fallback content will be used");
    }
    let provider = build_insight_provider(provider_cfg)?;
    Ok(InsightAdapter::new(provider)
        .with_timeout(Duration::from_secs(cfg.insight.timeout_secs))
        .with_timezone(cfg.timezone()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_selects_offline() {
        let cfg = Config::default();
        let pc = provider_config(&cfg, &AuthState::default()).unwrap();
        assert!(matches!(pc, ProviderConfig::Offline { .. }));
        assert_eq!(build_adapter(&cfg, &AuthState::default()).unwrap().provider_name(), "offline");
    }

    #[test]
    fn test_gemini_key_and_overrides_flow_through() {
        let mut cfg = Config::default();
        cfg.insight.base_url = "http://127.0.0.1:9".to_string();
        cfg.insight.timeout_secs = 5;
        let auth = AuthState {
            gemini_api_key: Some("AIza-test".to_string()),
            openai_api_key: None,
        };

        match provider_config(&cfg, &auth).unwrap() {
            ProviderConfig::Gemini(c) => {
                assert_eq!(c.api_key, "AIza-test");
                assert_eq!(c.model, "gemini-3-flash-preview");
                assert_eq!(c.base_url, "http://127.0.0.1:9");
                assert_eq!(c.timeout, Duration::from_secs(5));
            }
            other => panic!("expected gemini, got {other:?}"),
        }
        let adapter = build_adapter(&cfg, &auth).unwrap();
        assert_eq!(adapter.provider_name(), "gemini");
        assert_eq!(adapter.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_openai_selection_keeps_default_endpoint() {
        let mut cfg = Config::default();
        cfg.insight.provider = "openai".to_string();
        cfg.insight.model = "gpt-4o-mini".to_string();
        let auth = AuthState {
            gemini_api_key: None,
            openai_api_key: Some("sk-test".to_string()),
        };
        match provider_config(&cfg, &auth).unwrap() {
            ProviderConfig::OpenAiCompatible(c) => assert_eq!(c.base_url, "https://api.openai.com"),
            other => panic!("expected openai, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let mut cfg = Config::default();
        cfg.insight.provider = "palmistry-api".to_string();
        assert!(provider_config(&cfg, &AuthState::default()).is_err());
    }
}
