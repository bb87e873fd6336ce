//! Insight result: the narrative plus structured output shown on the result card.
//!
//! The narrative part ([`InsightContent`]) comes from the external generator or
//! from the pre-authored fallback; both have the same shape, so renderers never
//! special-case failure.

use serde::{Deserialize, Serialize};

use crate::branch::{BranchCode, MatchLevel};
use crate::responses::ResponseSet;
use crate::scoring::RankedResult;

pub const DEFAULT_INSTITUTION: &str = "MIT Muzaffarpur";

/// Shown under the academic explanation in the faculty view.
pub const ACADEMIC_FRAMEWORK: &str =
    "Weighted qualitative vector mapping via structured self-reflection scenarios.";

/// Three symbolic descriptors of the decision-making profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PalmInsights {
    pub head_line: String,
    pub life_line: String,
    pub palm_shape: String,
}

/// Generated (or fallback) narrative fields. Every field is required on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightContent {
    pub reasoning: String,
    pub reasoning_bullets: Vec<String>,
    pub personality_summary: String,
    pub palm_insights: PalmInsights,
    pub academic_explanation: String,
}

impl InsightContent {
    /// Pre-authored content used whenever generation is unavailable.
    pub fn fallback(branch_label: &str, institution: &str) -> Self {
        Self {
            reasoning: format!(
                "Your patterns of thinking and learning align exceptionally well with {branch_label} at {institution}."
            ),
            reasoning_bullets: vec![
                "Strong inclination toward logical problem solving".to_string(),
                "Preference for abstract systems design".to_string(),
                "Focus on optimized execution".to_string(),
            ],
            personality_summary: "Strategic Engineering Mind".to_string(),
            palm_insights: PalmInsights {
                head_line: "Structured and focused cognitive pathway.".to_string(),
                life_line: "Stable and consistent problem-solving endurance.".to_string(),
                palm_shape: "Analytical profile with balanced practical depth.".to_string(),
            },
            academic_explanation: "This prototype demonstrates the use of structured questioning and weighted heuristic mapping to provide data-driven branch recommendations for educational exploration.".to_string(),
        }
    }

    /// A parsed reply is only usable when nothing is blank.
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("reasoning", &self.reasoning),
            ("personalitySummary", &self.personality_summary),
            ("palmInsights.headLine", &self.palm_insights.head_line),
            ("palmInsights.lifeLine", &self.palm_insights.life_line),
            ("palmInsights.palmShape", &self.palm_insights.palm_shape),
            ("academicExplanation", &self.academic_explanation),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(format!("{field} must be non-empty"));
        }
        if !self.reasoning_bullets.iter().any(|b| !b.trim().is_empty()) {
            return Err("reasoningBullets must contain at least one entry".to_string());
        }
        Ok(())
    }
}

/// Everything the generator needs, tagged with the session generation that asked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRequest {
    pub generation: u64,
    pub name: String,
    pub top: BranchCode,
    pub ranked: RankedResult,
    pub responses: ResponseSet,
    pub institution: String,
}

impl InsightRequest {
    pub fn top_label(&self) -> &'static str {
        self.top.label()
    }

    pub fn secondary_labels(&self) -> Vec<String> {
        self.ranked
            .secondaries()
            .iter()
            .map(|s| s.code.label().to_string())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightSource {
    Generated,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchMatch {
    pub code: BranchCode,
    pub label: String,
    pub level: MatchLevel,
}

/// Tier every ranked branch: High, Medium, Medium, Low...
pub fn comparisons(ranked: &RankedResult) -> Vec<BranchMatch> {
    ranked
        .iter()
        .enumerate()
        .map(|(idx, s)| BranchMatch {
            code: s.code,
            label: s.code.label().to_string(),
            level: MatchLevel::for_rank(idx),
        })
        .collect()
}

/// Final, immutable result for one completed quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightResult {
    pub user_name: String,
    pub top: BranchCode,
    pub suggested_branch: String,
    pub secondary_branches: Vec<String>,
    pub content: InsightContent,
    pub comparisons: Vec<BranchMatch>,
    pub date: String,
    pub source: InsightSource,
}

impl InsightResult {
    pub fn compose(
        request: &InsightRequest,
        content: InsightContent,
        source: InsightSource,
        date: impl Into<String>,
    ) -> Self {
        Self {
            user_name: request.name.clone(),
            top: request.top,
            suggested_branch: request.top_label().to_string(),
            secondary_branches: request.secondary_labels(),
            content,
            comparisons: comparisons(&request.ranked),
            date: date.into(),
            source,
        }
    }

    /// Convenience for callers that already know generation failed.
    pub fn fallback(request: &InsightRequest, date: impl Into<String>) -> Self {
        let content = InsightContent::fallback(request.top_label(), &request.institution);
        Self::compose(request, content, InsightSource::Fallback, date)
    }

    /// Palette key for renderers.
    pub fn color_theme(&self) -> BranchCode {
        self.top
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::QuestionBank;
    use crate::responses::Confidence;
    use crate::scoring::{ScoringPolicy, evaluate};

    fn request() -> InsightRequest {
        let bank = QuestionBank::builtin();
        let mut responses = ResponseSet::new().with_name("Asha Kumar");
        for q in bank.iter() {
            responses.record(q.id.clone(), q.options[0].label.clone());
        }
        responses.set_confidence(Confidence::Yes);
        let ranked = evaluate(&bank, &responses, &ScoringPolicy::default());
        InsightRequest {
            generation: 1,
            name: "Asha Kumar".to_string(),
            top: ranked.top().code,
            ranked,
            responses,
            institution: DEFAULT_INSTITUTION.to_string(),
        }
    }

    #[test]
    fn test_fallback_is_complete() {
        let content = InsightContent::fallback(BranchCode::It.label(), DEFAULT_INSTITUTION);
        content.validate().unwrap();
        assert_eq!(content.personality_summary, "Strategic Engineering Mind");
        assert_eq!(content.reasoning_bullets.len(), 3);
        assert!(content.reasoning.contains("Information Technology (IT) at MIT Muzaffarpur"));
    }

    #[test]
    fn test_validate_flags_blank_fields() {
        let mut content = InsightContent::fallback("X", "Y");
        content.palm_insights.life_line = "  ".to_string();
        let err = content.validate().unwrap_err();
        assert!(err.contains("lifeLine"));

        let mut content = InsightContent::fallback("X", "Y");
        content.reasoning_bullets = vec![String::new()];
        assert!(content.validate().is_err());
    }

    #[test]
    fn test_content_wire_shape_is_camel_case() {
        let content: InsightContent = serde_json::from_str(
            r#"{
                "reasoning": "r",
                "reasoningBullets": ["a", "b", "c"],
                "personalitySummary": "Analytical Visionary",
                "palmInsights": {"headLine": "h", "lifeLine": "l", "palmShape": "p"},
                "academicExplanation": "e"
            }"#,
        )
        .unwrap();
        assert_eq!(content.palm_insights.palm_shape, "p");

        let missing = serde_json::from_str::<InsightContent>(r#"{"reasoning": "r"}"#);
        assert!(missing.is_err());
    }

    #[test]
    fn test_compose_tiers_every_branch() {
        let req = request();
        let result = InsightResult::fallback(&req, "16/10/2026");

        assert_eq!(result.user_name, "Asha Kumar");
        assert_eq!(result.suggested_branch, req.top.label());
        assert_eq!(result.secondary_branches.len(), 2);
        assert_eq!(result.comparisons.len(), BranchCode::COUNT);
        assert_eq!(result.comparisons[0].level, MatchLevel::High);
        assert_eq!(result.comparisons[1].level, MatchLevel::Medium);
        assert_eq!(result.comparisons[2].level, MatchLevel::Medium);
        assert!(result.comparisons[3..].iter().all(|m| m.level == MatchLevel::Low));
        assert_eq!(result.source, InsightSource::Fallback);
        assert_eq!(result.color_theme(), req.top);
    }
}
