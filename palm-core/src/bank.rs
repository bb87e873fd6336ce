//! Question bank: the ordered, immutable set of questions the quiz walks through.
//!
//! The built-in bank is the reference quiz. Alternate banks can be loaded from
//! TOML; branch codes deserialize into [`BranchCode`], so a bank can never
//! reference an unknown category.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::branch::BranchCode;

/// Quiz section a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    #[serde(alias = "P1")]
    CognitivePatterns,
    #[serde(alias = "P2")]
    LearningAndWork,
    #[serde(alias = "P3")]
    EngineeringScenarios,
}

impl Phase {
    pub fn title(&self) -> &'static str {
        match self {
            Phase::CognitivePatterns => "Cognitive Patterns",
            Phase::LearningAndWork => "Learning & Work",
            Phase::EngineeringScenarios => "Engineering Scenarios",
        }
    }
}

/// One selectable answer. Codes absent from `weights` contribute 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub label: String,
    #[serde(default)]
    pub weights: BTreeMap<BranchCode, f64>,
}

impl QuestionOption {
    pub fn new(label: impl Into<String>, weights: &[(BranchCode, f64)]) -> Self {
        Self {
            label: label.into(),
            weights: weights.iter().copied().collect(),
        }
    }

    pub fn weight(&self, code: BranchCode) -> f64 {
        self.weights.get(&code).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub phase: Phase,
    pub prompt: String,
    #[serde(rename = "option")]
    pub options: Vec<QuestionOption>,
}

impl Question {
    pub fn new(
        id: impl Into<String>,
        phase: Phase,
        prompt: impl Into<String>,
        options: Vec<QuestionOption>,
    ) -> Self {
        Self {
            id: id.into(),
            phase,
            prompt: prompt.into(),
            options,
        }
    }

    /// Exact label match; answers are recorded by label, not index.
    pub fn option_by_label(&self, label: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.label == label)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BankError {
    #[error("parse question bank: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("question bank is empty")]
    Empty,

    #[error("duplicate question id: {0}")]
    DuplicateId(String),

    #[error("question {id} needs at least two options (has {count})")]
    TooFewOptions { id: String, count: usize },

    #[error("question {id} repeats option label {label:?}")]
    DuplicateOption { id: String, label: String },

    #[error("question {id}, option {label:?}: weight for {code} must be finite and non-negative")]
    InvalidWeight {
        id: String,
        label: String,
        code: BranchCode,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionBank {
    #[serde(rename = "question", default)]
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Build a bank from questions, enforcing the bank invariants.
    pub fn new(questions: Vec<Question>) -> Result<Self, BankError> {
        let bank = Self { questions };
        bank.validate()?;
        Ok(bank)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, BankError> {
        let bank: QuestionBank = toml::from_str(s)?;
        bank.validate()?;
        Ok(bank)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), BankError> {
        if self.questions.is_empty() {
            return Err(BankError::Empty);
        }

        let mut ids = HashSet::new();
        for q in &self.questions {
            if !ids.insert(q.id.as_str()) {
                return Err(BankError::DuplicateId(q.id.clone()));
            }
            if q.options.len() < 2 {
                return Err(BankError::TooFewOptions {
                    id: q.id.clone(),
                    count: q.options.len(),
                });
            }

            let mut labels = HashSet::new();
            for o in &q.options {
                if !labels.insert(o.label.as_str()) {
                    return Err(BankError::DuplicateOption {
                        id: q.id.clone(),
                        label: o.label.clone(),
                    });
                }
                let invalid = o.weights.iter().find(|(_, w)| !w.is_finite() || **w < 0.0);
                if let Some((code, _)) = invalid {
                    return Err(BankError::InvalidWeight {
                        id: q.id.clone(),
                        label: o.label.clone(),
                        code: *code,
                    });
                }
            }
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// The reference quiz: 14 two-option questions across three phases.
    pub fn builtin() -> Self {
        use BranchCode::{Ce, Cse, Ece, Eee, It, Me};
        use Phase::{CognitivePatterns as P1, EngineeringScenarios as P3, LearningAndWork as P2};

        let q = Question::new;
        let o = QuestionOption::new;

        Self {
            questions: vec![
                q("p1_1", P1, "When facing uncertainty, you rely more on:", vec![
                    o("Logical step-by-step reasoning", &[(Cse, 2.0), (It, 2.0), (Ce, 1.0)]),
                    o("Intuitive experience and observation", &[(Me, 2.0), (Ece, 2.0), (Eee, 1.0)]),
                ]),
                q(
                    "p1_2",
                    P1,
                    "Do you enjoy optimizing existing systems or executing defined tasks?",
                    vec![
                        o("Optimizing and refining", &[(Cse, 2.0), (Eee, 2.0), (It, 1.0)]),
                        o("Executing and delivering", &[(Me, 1.0), (Ce, 2.0), (Ece, 1.0)]),
                    ],
                ),
                q(
                    "p1_3",
                    P1,
                    "When stuck, do you think better alone or using external tools?",
                    vec![
                        o("Deep solitary reflection", &[(Cse, 2.0), (It, 1.0), (Ce, 1.0)]),
                        o("Hands-on tool interaction", &[(Me, 2.0), (Eee, 1.0), (Ece, 2.0)]),
                    ],
                ),
                q("p1_4", P1, "Do you prefer detailed blueprints or abstract concepts?", vec![
                    o("Blueprints and structures", &[(Ce, 3.0), (Me, 2.0), (Eee, 1.0)]),
                    o("Abstract logic and data", &[(Cse, 3.0), (It, 2.0), (Ece, 1.0)]),
                ]),
                q("p1_5", P1, "Your approach to a new device is:", vec![
                    o("Reading the documentation first", &[(Ce, 1.0), (Eee, 2.0), (Cse, 1.0)]),
                    o("Diving in and testing features", &[(Me, 2.0), (Ece, 2.0), (It, 1.0)]),
                ]),
                q("p1_6", P1, "Which sounds more like you?", vec![
                    o("The Architect (Structure & Plan)", &[(Ce, 2.0), (Cse, 1.0), (Eee, 1.0)]),
                    o("The Explorer (Discovery & Trial)", &[(Me, 1.0), (Ece, 2.0), (It, 2.0)]),
                ]),
                q("p2_1", P2, "Which college activity excites you more?", vec![
                    o("Coding and debugging software", &[(Cse, 3.0), (It, 2.0)]),
                    o("Building and testing hardware", &[(Me, 2.0), (Ece, 2.0), (Eee, 2.0)]),
                ]),
                q("p2_2", P2, "You prefer results that are:", vec![
                    o("Digital, precise, and virtual", &[(Cse, 2.0), (It, 2.0), (Ece, 1.0)]),
                    o("Physical, visible, and tangible", &[(Me, 3.0), (Ce, 3.0), (Eee, 1.0)]),
                ]),
                q("p2_3", P2, "In a group project, you naturally choose:", vec![
                    o("Managing the data and logic", &[(Cse, 2.0), (It, 2.0), (Eee, 1.0)]),
                    o("Designing the physical prototype", &[(Me, 2.0), (Ce, 1.0), (Ece, 2.0)]),
                ]),
                q("p2_4", P2, "When learning something new, you need:", vec![
                    o("To understand the underlying theory", &[(Cse, 2.0), (Ce, 2.0), (Eee, 2.0)]),
                    o("To see a practical application", &[(Me, 2.0), (It, 1.0), (Ece, 2.0)]),
                ]),
                q("p2_5", P2, "Your ideal workspace contains:", vec![
                    o("Multiple screens and high-speed data", &[(Cse, 2.0), (It, 2.0), (Ece, 1.0)]),
                    o(
                        "Tools, instruments, and physical parts",
                        &[(Me, 2.0), (Ce, 1.0), (Eee, 2.0)],
                    ),
                ]),
                q(
                    "p3_1",
                    P3,
                    "Scenario: A project deadline is tomorrow. What do you do first?",
                    vec![
                        o("Plan the logic and structure", &[(Cse, 2.0), (It, 2.0), (Ce, 2.0)]),
                        o("Start building immediately", &[(Me, 2.0), (Ece, 2.0), (Eee, 2.0)]),
                    ],
                ),
                q("p3_2", P3, "Scenario: Your system fails unexpectedly. You prefer to:", vec![
                    o("Debug step by step via logs", &[(Cse, 3.0), (It, 3.0), (Ece, 1.0)]),
                    o("Replace and rebuild components", &[(Me, 3.0), (Eee, 2.0), (Ce, 1.0)]),
                ]),
                q(
                    "p3_3",
                    P3,
                    "Scenario: You are designing a bridge sensor network. You focus on:",
                    vec![
                        o("The material load-bearing capacity", &[(Ce, 3.0), (Me, 1.0)]),
                        o("The data transmission and logic", &[(Ece, 2.0), (It, 2.0), (Cse, 1.0)]),
                    ],
                ),
            ],
        }
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_bank_is_valid() {
        let bank = QuestionBank::builtin();
        bank.validate().unwrap();
        assert_eq!(bank.len(), 14);

        let phases: Vec<Phase> = bank.iter().map(|q| q.phase).collect();
        assert_eq!(phases.iter().filter(|p| **p == Phase::CognitivePatterns).count(), 6);
        assert_eq!(phases.iter().filter(|p| **p == Phase::LearningAndWork).count(), 5);
        assert_eq!(phases.iter().filter(|p| **p == Phase::EngineeringScenarios).count(), 3);
    }

    #[test]
    fn test_missing_weight_is_zero() {
        let bank = QuestionBank::builtin();
        let q = bank.get(6).unwrap();
        let coding = q.option_by_label("Coding and debugging software").unwrap();
        assert_eq!(coding.weight(BranchCode::Cse), 3.0);
        assert_eq!(coding.weight(BranchCode::Me), 0.0);
    }

    #[test]
    fn test_from_toml_parses_weights_and_phase_aliases() {
        let bank = QuestionBank::from_toml_str(
            r#"
[[question]]
id = "q1"
phase = "P2"
prompt = "Pick one"

[[question.option]]
label = "Code"
weights = { CSE = 2, IT = 1.5 }

[[question.option]]
label = "Weld"
weights = { ME = 3 }
"#,
        )
        .unwrap();

        let q = bank.get(0).unwrap();
        assert_eq!(q.phase, Phase::LearningAndWork);
        assert_eq!(q.options[0].weight(BranchCode::It), 1.5);
        assert_eq!(q.options[1].weight(BranchCode::Me), 3.0);
    }

    #[test]
    fn test_from_toml_rejects_unknown_code() {
        let err = QuestionBank::from_toml_str(
            r#"
[[question]]
id = "q1"
phase = "cognitive-patterns"
prompt = "Pick one"

[[question.option]]
label = "A"
weights = { CHEM = 1 }

[[question.option]]
label = "B"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, BankError::Parse(_)));
    }

    #[test]
    fn test_validate_rejects_structural_problems() {
        let two = || {
            vec![
                QuestionOption::new("a", &[]),
                QuestionOption::new("b", &[]),
            ]
        };

        assert!(matches!(QuestionBank::new(vec![]), Err(BankError::Empty)));

        let dup = QuestionBank::new(vec![
            Question::new("x", Phase::CognitivePatterns, "?", two()),
            Question::new("x", Phase::CognitivePatterns, "?", two()),
        ]);
        assert!(matches!(dup, Err(BankError::DuplicateId(id)) if id == "x"));

        let single = QuestionBank::new(vec![Question::new(
            "x",
            Phase::CognitivePatterns,
            "?",
            vec![QuestionOption::new("a", &[])],
        )]);
        assert!(matches!(single, Err(BankError::TooFewOptions { count: 1, .. })));

        let negative = QuestionBank::new(vec![Question::new(
            "x",
            Phase::CognitivePatterns,
            "?",
            vec![
                QuestionOption::new("a", &[(BranchCode::Me, -1.0)]),
                QuestionOption::new("b", &[]),
            ],
        )]);
        assert!(matches!(
            negative,
            Err(BankError::InvalidWeight { code: BranchCode::Me, .. })
        ));
    }
}
