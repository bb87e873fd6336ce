//! Response set: what the user picked, built up one answer at a time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Self-reflection answer collected after the last question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    #[serde(rename = "yes")]
    Yes,
    #[serde(rename = "partially")]
    Partially,
    #[serde(rename = "not-really")]
    NotReally,
}

impl Confidence {
    pub const ALL: [Confidence; 3] = [
        Confidence::Yes,
        Confidence::Partially,
        Confidence::NotReally,
    ];

    /// Wire spelling, also used in prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Yes => "yes",
            Confidence::Partially => "partially",
            Confidence::NotReally => "not-really",
        }
    }

    /// Button text.
    pub fn prompt_label(&self) -> &'static str {
        match self {
            Confidence::Yes => "Yes, it aligns",
            Confidence::Partially => "Partially",
            Confidence::NotReally => "Not really",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub label: String,
}

/// Answers keyed by question id (in the order they were given), the optional
/// confidence signal and the display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSet {
    name: String,
    answers: Vec<Answer>,
    confidence: Option<Confidence>,
}

impl ResponseSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_answer(mut self, question_id: impl Into<String>, label: impl Into<String>) -> Self {
        self.record(question_id, label);
        self
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Record (or overwrite) the answer for a question.
    pub fn record(&mut self, question_id: impl Into<String>, label: impl Into<String>) {
        let question_id = question_id.into();
        let label = label.into();
        match self.answers.iter_mut().find(|a| a.question_id == question_id) {
            Some(existing) => existing.label = label,
            None => self.answers.push(Answer { question_id, label }),
        }
    }

    pub fn answer_for(&self, question_id: &str) -> Option<&str> {
        self.answers
            .iter()
            .find(|a| a.question_id == question_id)
            .map(|a| a.label.as_str())
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn confidence(&self) -> Option<Confidence> {
        self.confidence
    }

    pub fn set_confidence(&mut self, confidence: Confidence) {
        self.confidence = Some(confidence);
    }

    /// Chosen labels in answer order.
    pub fn trait_labels(&self) -> Vec<&str> {
        self.answers.iter().map(|a| a.label.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_overwrites_in_place() {
        let mut r = ResponseSet::new()
            .with_answer("q1", "A")
            .with_answer("q2", "B");
        r.record("q1", "C");

        assert_eq!(r.len(), 2);
        assert_eq!(r.answer_for("q1"), Some("C"));
        assert_eq!(r.trait_labels(), vec!["C", "B"]);
    }

    #[test]
    fn test_confidence_wire_spelling() {
        let s = serde_json::to_string(&Confidence::NotReally).unwrap();
        assert_eq!(s, "\"not-really\"");
        assert_eq!(Confidence::Partially.to_string(), "partially");
    }

    #[test]
    fn test_missing_answer_is_none() {
        let r = ResponseSet::new().with_name("Asha");
        assert_eq!(r.answer_for("p1_1"), None);
        assert_eq!(r.confidence(), None);
        assert_eq!(r.name(), "Asha");
    }
}
