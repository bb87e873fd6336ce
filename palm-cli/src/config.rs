use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use palm_core::{
    BranchCode, DEFAULT_INSTITUTION, FlowContext, FlowTimings, QuestionBank, ScoringPolicy,
};

use crate::state::ensure_palm_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub insight: InsightSection,
    pub flow: FlowSection,
    pub scoring: ScoringSection,
    pub display: DisplaySection,
    pub share: ShareSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightSection {
    /// `gemini`, `openai` or `offline`.
    pub provider: String,
    pub model: String,
    /// Empty means the provider's public endpoint.
    pub base_url: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for InsightSection {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            base_url: String::new(),
            temperature: 0.7,
            timeout_secs: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowSection {
    pub begin_settle_ms: u64,
    pub name_settle_ms: u64,
    pub question_settle_ms: u64,
    pub final_question_settle_ms: u64,
    pub status_interval_ms: u64,
    pub min_interpreting_dwell_ms: u64,
}

impl Default for FlowSection {
    fn default() -> Self {
        let t = FlowTimings::default();
        let ms = |d: Duration| d.as_millis() as u64;
        Self {
            begin_settle_ms: ms(t.begin_settle),
            name_settle_ms: ms(t.name_settle),
            question_settle_ms: ms(t.question_settle),
            final_question_settle_ms: ms(t.final_question_settle),
            status_interval_ms: ms(t.status_interval),
            min_interpreting_dwell_ms: ms(t.min_interpreting_dwell),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSection {
    pub confidence_bonus: f64,
    pub bonus_codes: Vec<String>,
}

impl Default for ScoringSection {
    fn default() -> Self {
        let p = ScoringPolicy::default();
        Self {
            confidence_bonus: p.confidence_bonus,
            bonus_codes: p.bonus_codes.iter().map(|c| c.as_str().to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    pub institution: String,
    /// IANA name, used for the date on the result card.
    pub timezone: String,
    /// Appended to shared text when non-empty.
    pub share_url: String,
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            institution: DEFAULT_INSTITUTION.to_string(),
            timezone: "Asia/Kolkata".to_string(),
            share_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareSection {
    /// Program (and args) that receives the share text on stdin.
    pub command: Option<Vec<String>>,
}

impl Config {
    pub fn flow_timings(&self) -> FlowTimings {
        let f = &self.flow;
        FlowTimings {
            begin_settle: Duration::from_millis(f.begin_settle_ms),
            name_settle: Duration::from_millis(f.name_settle_ms),
            question_settle: Duration::from_millis(f.question_settle_ms),
            final_question_settle: Duration::from_millis(f.final_question_settle_ms),
            status_interval: Duration::from_millis(f.status_interval_ms),
            min_interpreting_dwell: Duration::from_millis(f.min_interpreting_dwell_ms),
        }
    }

    pub fn scoring_policy(&self) -> Result<ScoringPolicy> {
        let bonus = self.scoring.confidence_bonus;
        if !bonus.is_finite() || bonus < 0.0 {
            bail!("scoring.confidence_bonus must be a non-negative number, got {bonus}");
        }
        let codes = self
            .scoring
            .bonus_codes
            .iter()
            .map(|s| s.parse::<BranchCode>())
            .collect::<Result<Vec<_>, _>>()
            .context("scoring.bonus_codes")?;
        Ok(ScoringPolicy {
            confidence_bonus: bonus,
            bonus_codes: codes,
            ..ScoringPolicy::default()
        })
    }

    pub fn timezone(&self) -> Result<chrono_tz::Tz> {
        self.display
            .timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|e| anyhow::anyhow!("display.timezone {:?}: {e}", self.display.timezone))
    }

    /// Everything the flow controller needs, with the bank from `bank_file` or the built-in one.
    pub fn flow_context(&self, bank_file: Option<&Path>) -> Result<FlowContext> {
        let bank = load_bank(bank_file)?;
        let ctx = FlowContext::new(bank)
            .context("question bank")?
            .with_policy(self.scoring_policy()?)
            .with_timings(self.flow_timings())
            .with_institution(self.display.institution.clone());
        Ok(ctx)
    }
}

pub fn load_bank(path: Option<&Path>) -> Result<QuestionBank> {
    let Some(p) = path else {
        return Ok(QuestionBank::builtin());
    };
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    QuestionBank::from_toml_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_palm_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let p = config_path()?;
    let cfg = load_config()?;
    if p.exists() {
        println!("# {}", p.display());
    } else {
        println!("# {} (not present; defaults shown)", p.display());
    }
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [insight]
            provider = "openai"
            model = "gpt-4o-mini"

            [flow]
            min_interpreting_dwell_ms = 1000
            "#,
        )
        .unwrap();

        assert_eq!(cfg.insight.provider, "openai");
        assert_eq!(cfg.insight.timeout_secs, 20);
        assert_eq!(cfg.flow.question_settle_ms, 350);
        assert_eq!(cfg.flow_timings().min_interpreting_dwell, Duration::from_millis(1000));
        assert_eq!(cfg.display.institution, "MIT Muzaffarpur");
    }

    #[test]
    fn test_defaults_match_reference_values() {
        let cfg = Config::default();
        assert_eq!(cfg.flow_timings(), FlowTimings::default());
        assert_eq!(cfg.scoring_policy().unwrap(), ScoringPolicy::default());
        assert_eq!(cfg.timezone().unwrap(), chrono_tz::Asia::Kolkata);
    }

    #[test]
    fn test_scoring_overrides_and_rejects_unknown_codes() {
        let mut cfg = Config::default();
        cfg.scoring.confidence_bonus = 2.0;
        cfg.scoring.bonus_codes = vec!["eee".to_string()];
        let policy = cfg.scoring_policy().unwrap();
        assert_eq!(policy.confidence_bonus, 2.0);
        assert_eq!(policy.bonus_codes, vec![BranchCode::Eee]);

        cfg.scoring.bonus_codes = vec!["AERO".to_string()];
        assert!(cfg.scoring_policy().is_err());

        cfg.scoring.bonus_codes = vec![];
        cfg.scoring.confidence_bonus = f64::NAN;
        assert!(cfg.scoring_policy().is_err());
    }

    #[test]
    fn test_bad_timezone_is_an_error() {
        let mut cfg = Config::default();
        cfg.display.timezone = "Mars/Olympus".to_string();
        assert!(cfg.timezone().is_err());
    }

    #[test]
    fn test_flow_context_carries_institution() {
        let mut cfg = Config::default();
        cfg.display.institution = "NIT Patna".to_string();
        let ctx = cfg.flow_context(None).unwrap();
        assert_eq!(ctx.institution, "NIT Patna");
        assert_eq!(ctx.bank.len(), 14);
        assert!(ctx.status_messages[3].contains("NIT Patna"));
    }
}
