use palm_core::{
    BranchCode, Confidence, QuestionBank, ResponseSet, ScoringPolicy, evaluate, score_responses,
};

fn responses_from(picks: &[(&str, &str)], confidence: Option<Confidence>) -> ResponseSet {
    let mut r = ResponseSet::new().with_name("Asha Kumar");
    for (id, label) in picks {
        r.record(*id, *label);
    }
    if let Some(c) = confidence {
        r.set_confidence(c);
    }
    r
}

const LOGICAL_PICKS: [(&str, &str); 14] = [
    ("p1_1", "Logical step-by-step reasoning"),
    ("p1_2", "Optimizing and refining"),
    ("p1_3", "Deep solitary reflection"),
    ("p1_4", "Abstract logic and data"),
    ("p1_5", "Reading the documentation first"),
    ("p1_6", "The Architect (Structure & Plan)"),
    ("p2_1", "Coding and debugging software"),
    ("p2_2", "Digital, precise, and virtual"),
    ("p2_3", "Managing the data and logic"),
    ("p2_4", "To understand the underlying theory"),
    ("p2_5", "Multiple screens and high-speed data"),
    ("p3_1", "Plan the logic and structure"),
    ("p3_2", "Debug step by step via logs"),
    ("p3_3", "The data transmission and logic"),
];

/// Regression: a consistently logical/digital profile ranks CSE and IT above the physical branches.
#[test]
fn test_logical_profile_prefers_cse_and_it() {
    let bank = QuestionBank::builtin();
    let ranked = evaluate(
        &bank,
        &responses_from(&LOGICAL_PICKS, Some(Confidence::Yes)),
        &ScoringPolicy::default(),
    );

    assert_eq!(ranked.top().code, BranchCode::Cse);
    assert_eq!(ranked.score_of(BranchCode::Cse), 28.0);
    assert_eq!(ranked.score_of(BranchCode::It), 21.0);
    for physical in [BranchCode::Me, BranchCode::Ce, BranchCode::Eee] {
        assert!(ranked.score_of(BranchCode::Cse) > ranked.score_of(physical));
        assert!(ranked.score_of(BranchCode::It) > ranked.score_of(physical));
    }
    assert_eq!(ranked.score_of(BranchCode::Me), 0.0);
}

/// Regression: the hands-on profile lands on Mechanical.
#[test]
fn test_hands_on_profile_prefers_me() {
    let bank = QuestionBank::builtin();
    let mut r = ResponseSet::new().with_name("Ravi");
    for q in bank.iter() {
        r.record(q.id.clone(), q.options[1].label.clone());
    }
    // p3_3 is the one question where the physical answer comes first.
    r.record("p3_3", "The material load-bearing capacity");

    let ranked = evaluate(&bank, &r, &ScoringPolicy::default());
    assert_eq!(ranked.top().code, BranchCode::Me);
    assert_eq!(ranked.score_of(BranchCode::Me), 25.0);
    assert_eq!(ranked.entries().last().map(|e| e.code), Some(BranchCode::Cse));
}

/// Exhaustive over every answer combination of the built-in bank.
#[test]
fn test_ranking_invariants_hold_for_every_answer_combination() {
    let bank = QuestionBank::builtin();
    let policy = ScoringPolicy::default();
    let n = bank.len();
    let confidences = [
        None,
        Some(Confidence::Yes),
        Some(Confidence::Partially),
        Some(Confidence::NotReally),
    ];

    for mask in 0u32..(1 << n) {
        let mut base = ResponseSet::new();
        for (i, q) in bank.iter().enumerate() {
            let pick = ((mask >> i) & 1) as usize;
            base.record(q.id.clone(), q.options[pick].label.clone());
        }

        for confidence in confidences {
            let mut r = base.clone();
            if let Some(c) = confidence {
                r.set_confidence(c);
            }

            let table = score_responses(&bank, &r, &policy);
            let ranked = evaluate(&bank, &r, &policy);

            // Per-branch sum equals the chosen weights plus the bonus.
            for code in BranchCode::ALL {
                let mut expected: f64 = bank
                    .iter()
                    .map(|q| {
                        let label = r.answer_for(&q.id).unwrap_or_default();
                        q.option_by_label(label).map(|o| o.weight(code)).unwrap_or(0.0)
                    })
                    .sum();
                if confidence == Some(Confidence::NotReally)
                    && (code == BranchCode::It || code == BranchCode::Ece)
                {
                    expected += 1.5;
                }
                assert_eq!(table.get(code), expected);
            }

            // Every code exactly once.
            let mut seen: Vec<BranchCode> = ranked.iter().map(|e| e.code).collect();
            seen.sort();
            assert_eq!(seen, BranchCode::ALL.to_vec());

            // Descending, ties in declaration order.
            for pair in ranked.entries().windows(2) {
                assert!(pair[0].score >= pair[1].score);
                if pair[0].score == pair[1].score {
                    assert!(pair[0].code.index() < pair[1].code.index());
                }
            }

            // Deterministic.
            assert_eq!(evaluate(&bank, &r, &policy), ranked);
        }
    }
}

#[test]
fn test_missing_answers_degrade_to_zero_contribution() {
    let bank = QuestionBank::builtin();
    let partial = responses_from(&LOGICAL_PICKS[..2], None);
    let ranked = evaluate(&bank, &partial, &ScoringPolicy::default());

    assert_eq!(ranked.score_of(BranchCode::Cse), 4.0);
    assert_eq!(ranked.score_of(BranchCode::It), 3.0);
    assert_eq!(ranked.entries().len(), BranchCode::COUNT);
}
