//! Request text, declared response shape, and reply parsing.

use std::sync::LazyLock;

use palm_core::{InsightContent, InsightRequest};
use regex::Regex;
use serde_json::{Value, json};

use crate::error::ProviderError;

static FENCED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z]*\s*(.*?)\s*```\s*$").expect("fence pattern is valid")
});

/// Instruction sent to the generator for one completed quiz.
pub fn build_prompt(request: &InsightRequest) -> String {
    let branch = request.top_label();
    let traits = request.responses.trait_labels().join(", ");
    let confidence = request
        .responses
        .confidence()
        .map(|c| c.as_str())
        .unwrap_or("unspecified");
    let ranking = request
        .ranked
        .iter()
        .map(|s| format!("{} {:.1}", s.code, s.score))
        .collect::<Vec<_>>()
        .join(", ");
    let institution = &request.institution;
    let name = &request.name;

    format!(
        "Perform a professional \"Engineering Branch Insight\" analysis for a student named {name}.\n\
Based on our weighted algorithm, their best fit is {branch} at {institution}.\n\
Weighted ranking: {ranking}.\n\
\n\
Traits summary from symbolic questioning: {traits}\n\
The user's self-reflection confidence level: {confidence}.\n\
\n\
Task:\n\
1. reasoning: a professional summary (2-3 sentences) linking their traits specifically to {branch}.\n\
2. reasoningBullets: exactly 3 short bullet points for \"Why This Branch Fits You\" (e.g. \"Strong preference for logical problem solving\").\n\
3. personalitySummary: a two-to-three word personality label (e.g. \"Analytical Visionary\" or \"Structural Architect\").\n\
4. palmInsights: three symbolic insights (headLine, lifeLine, palmShape) that reflect their decision-making profile.\n\
5. academicExplanation: a short explanation for professors describing how this app demonstrates structured logic and weighted decision support in a UX context.\n\
\n\
Return only a JSON object with the fields reasoning, reasoningBullets, personalitySummary, palmInsights and academicExplanation. All fields are required."
    )
}

/// Declared reply shape, in the schema dialect of the generateContent API.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "reasoning": { "type": "STRING" },
            "reasoningBullets": { "type": "ARRAY", "items": { "type": "STRING" } },
            "personalitySummary": { "type": "STRING" },
            "palmInsights": {
                "type": "OBJECT",
                "properties": {
                    "headLine": { "type": "STRING" },
                    "lifeLine": { "type": "STRING" },
                    "palmShape": { "type": "STRING" }
                },
                "required": ["headLine", "lifeLine", "palmShape"]
            },
            "academicExplanation": { "type": "STRING" }
        },
        "required": [
            "reasoning",
            "reasoningBullets",
            "personalitySummary",
            "palmInsights",
            "academicExplanation"
        ]
    })
}

fn unfence(text: &str) -> &str {
    match FENCED.captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => text.trim(),
    }
}

/// Parse a generator reply into validated content.
///
/// Accepts bare JSON or JSON wrapped in a Markdown code fence. Anything else,
/// including blank required fields, is an `InvalidResponse`.
pub fn parse_content(text: &str) -> Result<InsightContent, ProviderError> {
    let body = unfence(text);
    if body.is_empty() {
        return Err(ProviderError::InvalidResponse("empty reply".to_string()));
    }

    let content: InsightContent = match serde_json::from_str(body) {
        Ok(c) => c,
        Err(first) => {
            // Some models add a sentence around the object.
            let (Some(start), Some(end)) = (body.find('{'), body.rfind('}')) else {
                return Err(first.into());
            };
            if end <= start {
                return Err(first.into());
            }
            serde_json::from_str(&body[start..=end])?
        }
    };

    content.validate().map_err(ProviderError::InvalidResponse)?;
    Ok(content)
}
