//! Share text for a finished result.

use crate::insight::InsightResult;

pub const SHARE_TITLE: &str = "Palm Insight Summary";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareMessage {
    pub title: String,
    pub text: String,
    pub url: String,
}

impl ShareMessage {
    pub fn for_result(result: &InsightResult, institution: &str, url: impl Into<String>) -> Self {
        Self {
            title: SHARE_TITLE.to_string(),
            text: format!(
                "My cognitive analysis suggests I'm a perfect fit for {} at {}!",
                result.suggested_branch, institution
            ),
            url: url.into(),
        }
    }

    /// Payload handed to a native share target.
    pub fn share_text(&self) -> String {
        if self.url.is_empty() {
            self.text.clone()
        } else {
            format!("{}\n{}", self.text, self.url)
        }
    }

    /// Payload copied when only a clipboard is available.
    pub fn clipboard_text(&self) -> String {
        format!("{}\nGenerated via Palm Insight.", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::QuestionBank;
    use crate::insight::{DEFAULT_INSTITUTION, InsightRequest};
    use crate::responses::ResponseSet;
    use crate::scoring::{ScoringPolicy, evaluate};

    #[test]
    fn test_share_texts() {
        let bank = QuestionBank::builtin();
        let responses = ResponseSet::new().with_answer("p2_1", "Coding and debugging software");
        let ranked = evaluate(&bank, &responses, &ScoringPolicy::default());
        let request = InsightRequest {
            generation: 0,
            name: "Asha".to_string(),
            top: ranked.top().code,
            ranked,
            responses,
            institution: DEFAULT_INSTITUTION.to_string(),
        };
        let result = InsightResult::fallback(&request, "today");

        let msg = ShareMessage::for_result(&result, DEFAULT_INSTITUTION, "https://palm.example/");
        assert_eq!(
            msg.text,
            "My cognitive analysis suggests I'm a perfect fit for Computer Science Engineering (CSE) at MIT Muzaffarpur!"
        );
        assert!(msg.share_text().ends_with("\nhttps://palm.example/"));
        assert!(msg.clipboard_text().ends_with("\nGenerated via Palm Insight."));
    }
}
