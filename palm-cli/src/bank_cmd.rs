use anyhow::{Context, Result};
use clap::Subcommand;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use palm_core::{BranchCode, QuestionBank};

use crate::config::load_bank;

#[derive(Subcommand, Debug)]
pub enum BankCommand {
    /// Print the question bank (built-in unless --bank is given)
    Show {
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Print as a TOML document that `--bank` accepts
        #[arg(long, default_value_t = false)]
        toml: bool,
    },

    /// Validate a TOML question bank
    Check { file: PathBuf },
}

pub fn run(command: BankCommand) -> Result<()> {
    match command {
        BankCommand::Show { bank, toml } => {
            let b = load_bank(bank.as_deref())?;
            if toml {
                print!("{}", b.to_toml_string().context("serialize bank")?);
            } else {
                print!("{}", render(&b));
            }
        }
        BankCommand::Check { file } => {
            let b = check(&file)?;
            println!("{}: ok", file.display());
            println!("{}", summary(&b));
        }
    }
    Ok(())
}

fn check(path: &Path) -> Result<QuestionBank> {
    let bank = load_bank(Some(path))?;
    tracing::info!(path = %path.display(), questions = bank.len(), "bank validated");
    Ok(bank)
}

/// Question count per phase, in first-seen order.
pub fn summary(bank: &QuestionBank) -> String {
    let mut phases: Vec<(&'static str, usize)> = Vec::new();
    for q in bank.iter() {
        match phases.iter_mut().find(|(t, _)| *t == q.phase.title()) {
            Some((_, n)) => *n += 1,
            None => phases.push((q.phase.title(), 1)),
        }
    }
    let parts: Vec<String> = phases.iter().map(|(t, n)| format!("{t}: {n}")).collect();
    format!("{} questions ({})", bank.len(), parts.join(", "))
}

pub fn render(bank: &QuestionBank) -> String {
    let mut out = String::new();
    let mut phase = None;
    for (i, q) in bank.iter().enumerate() {
        if phase != Some(q.phase) {
            phase = Some(q.phase);
            let _ = writeln!(out, "\n## {}\n", q.phase.title());
        }
        let _ = writeln!(out, "{}. [{}] {}", i + 1, q.id, q.prompt);
        for o in &q.options {
            let weights: Vec<String> = BranchCode::ALL
                .iter()
                .filter(|c| o.weight(**c) != 0.0)
                .map(|c| format!("{c} {}", o.weight(*c)))
                .collect();
            let _ = writeln!(out, "   - {}  ({})", o.label, weights.join(", "));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_summary() {
        assert_eq!(
            summary(&QuestionBank::builtin()),
            "14 questions (Cognitive Patterns: 6, Learning & Work: 5, Engineering Scenarios: 3)"
        );
    }

    #[test]
    fn test_render_lists_weights() {
        let text = render(&QuestionBank::builtin());
        assert!(text.contains("## Learning & Work"));
        assert!(text.contains("1. [p1_1] When facing uncertainty, you rely more on:"));
        assert!(text.contains("   - Coding and debugging software  (CSE 3, IT 2)"));
    }

    #[test]
    fn test_check_reports_missing_file() {
        let err = check(Path::new("/nonexistent/palm-bank.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("palm-bank.toml"));
    }
}
