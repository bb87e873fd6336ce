//! Line-mode quiz: the same flow controller and driver, on plain stdin/stdout.

use anyhow::Result;
use std::io::{BufRead, Write};

use palm_core::{Action, Confidence, FlowContext, FlowController, FlowError, ShareMessage, Stage};
use palm_oracle::{InsightAdapter, drive};

use crate::share::Sharer;

pub struct PlainOptions {
    pub sharer: Sharer,
    pub share_url: String,
}

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> Result<Option<String>> {
    write!(out, "{label}")?;
    out.flush().ok();
    let mut s = String::new();
    if input.read_line(&mut s)? == 0 {
        return Ok(None);
    }
    Ok(Some(s.trim().to_string()))
}

fn print_result<W: Write>(out: &mut W, c: &FlowController) -> Result<()> {
    let Some(r) = c.session().result() else {
        return Ok(());
    };
    writeln!(out)?;
    writeln!(out, "== Analysis results ==")?;
    writeln!(out, "{}, you are a {}", r.user_name, r.content.personality_summary)?;
    writeln!(out, "Best fit: {} at {}", r.suggested_branch, c.context().institution)?;
    writeln!(out)?;
    writeln!(out, "Why this branch fits you:")?;
    for b in r.content.reasoning_bullets.iter().filter(|b| !b.trim().is_empty()) {
        writeln!(out, "  - {b}")?;
    }
    writeln!(out)?;
    writeln!(out, "\"{}\"", r.content.reasoning)?;
    writeln!(out)?;
    writeln!(out, "Palm insights:")?;
    writeln!(out, "  Head line:  {}", r.content.palm_insights.head_line)?;
    writeln!(out, "  Life line:  {}", r.content.palm_insights.life_line)?;
    writeln!(out, "  Palm shape: {}", r.content.palm_insights.palm_shape)?;
    writeln!(out)?;
    writeln!(out, "Branch match:")?;
    for m in &r.comparisons {
        writeln!(out, "  {:<5}{:<8}{}", m.code.as_str(), m.level.as_str(), m.label)?;
    }
    if !r.secondary_branches.is_empty() {
        writeln!(out, "Also consider: {}", r.secondary_branches.join(", "))?;
    }
    writeln!(out, "Generated {}", r.date)?;
    Ok(())
}

/// Run quizzes until the user quits or input ends.
pub async fn run_plain<R: BufRead, W: Write>(
    ctx: FlowContext,
    adapter: &InsightAdapter,
    opts: &PlainOptions,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    let mut c = FlowController::new(ctx);
    writeln!(out, "Palm Insight: engineering branch discovery for {}", c.context().institution)?;
    writeln!(out, "Type `restart` at any prompt to start over, `quit` to leave.")?;

    loop {
        let stage = c.session().stage();
        let label = match stage {
            Stage::Welcome => "\nPress Enter to begin: ".to_string(),
            Stage::NameInput => "Your name: ".to_string(),
            Stage::Questioning { .. } => {
                let Some((index, total, q)) = c.session().current_question(c.context()) else {
                    break;
                };
                writeln!(out, "\n[{}] {} / {}", q.phase.title(), index + 1, total)?;
                writeln!(out, "{}", q.prompt)?;
                for (i, o) in q.options.iter().enumerate() {
                    writeln!(out, "  {}. {}", i + 1, o.label)?;
                }
                "> ".to_string()
            }
            Stage::ConfidenceCheck => {
                writeln!(
                    out,
                    "\n{}, does the data captured so far reflect your true problem-solving nature?",
                    c.session().first_name()
                )?;
                for (i, conf) in Confidence::ALL.iter().enumerate() {
                    writeln!(out, "  {}. {}", i + 1, conf.prompt_label())?;
                }
                "> ".to_string()
            }
            Stage::Result => "\n[s]hare, [r]estart or [q]uit: ".to_string(),
            // Interpreting is driven to completion below and never prompts.
            Stage::Interpreting => break,
        };

        let Some(line) = prompt(input, out, &label)? else {
            break;
        };

        let action = match (stage, line.as_str()) {
            (_, "quit") | (Stage::Result, "q") => break,
            (_, "restart") | (Stage::Result, "r") => Action::Restart,
            (Stage::Result, "s") => {
                if let Some(r) = c.session().result() {
                    let institution = &c.context().institution;
                    let message = ShareMessage::for_result(r, institution, opts.share_url.as_str());
                    writeln!(out, "{}", opts.sharer.share(&message).notice())?;
                }
                continue;
            }
            (Stage::Welcome, _) => Action::Begin,
            (Stage::NameInput, name) => Action::SubmitName(name.to_string()),
            (Stage::Questioning { .. }, choice) | (Stage::ConfidenceCheck, choice) => {
                match choice.parse::<usize>() {
                    Ok(n) if n >= 1 => match stage {
                        Stage::ConfidenceCheck => match Confidence::ALL.get(n - 1) {
                            Some(conf) => Action::Confirm(*conf),
                            None => {
                                writeln!(out, "Choose 1 to {}.", Confidence::ALL.len())?;
                                continue;
                            }
                        },
                        _ => Action::Answer(n - 1),
                    },
                    _ => {
                        writeln!(out, "Enter the number of your choice.")?;
                        continue;
                    }
                }
            }
            _ => continue,
        };

        let commands = match c.dispatch(action) {
            Ok(commands) => commands,
            Err(FlowError::EmptyName) => {
                writeln!(out, "Please enter your name to continue.")?;
                continue;
            }
            Err(FlowError::NoSuchOption { count, .. }) => {
                writeln!(out, "Choose 1 to {count}.")?;
                continue;
            }
            Err(e) => {
                writeln!(out, "{e}")?;
                continue;
            }
        };

        let mut last_status = c.session().status_message(c.context()).map(str::to_string);
        if let Some(s) = &last_status {
            writeln!(out, "  {s}")?;
            out.flush().ok();
        }
        drive(&mut c, commands, adapter, |c| {
            if let Some(s) = c.session().status_message(c.context()) {
                if last_status.as_deref() != Some(s) {
                    last_status = Some(s.to_string());
                    let _ = writeln!(out, "  {s}");
                    out.flush().ok();
                }
            }
        })
        .await?;

        if c.session().stage() == Stage::Result {
            print_result(out, &c)?;
        }
    }

    writeln!(out, "Goodbye.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;

    use palm_core::QuestionBank;
    use palm_oracle::providers::OfflineInsightProvider;

    fn run(script: &str) -> String {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .start_paused(true)
            .build()
            .unwrap();
        let adapter = InsightAdapter::new(Arc::new(OfflineInsightProvider::new("test")));
        let opts = PlainOptions {
            sharer: Sharer::new(None).with_clipboard_tools(vec![]),
            share_url: String::new(),
        };
        let ctx = FlowContext::new(QuestionBank::builtin()).unwrap();
        let mut input = Cursor::new(script.to_string());
        let mut out = Vec::new();
        rt.block_on(run_plain(ctx, &adapter, &opts, &mut input, &mut out)).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn full_script(extra: &str) -> String {
        let mut s = String::from("\nAsha Kumar\n");
        for _ in 0..14 {
            s.push_str("1\n");
        }
        s.push_str("3\n");
        s.push_str(extra);
        s
    }

    #[test]
    fn test_full_quiz_reaches_fallback_result() {
        let out = run(&full_script("q\n"));
        assert!(out.contains("[Cognitive Patterns] 1 / 14"));
        assert!(out.contains("[Engineering Scenarios] 14 / 14"));
        assert!(out.contains("Asha, does the data captured so far"));
        assert!(out.contains("Reading cognitive patterns..."));
        assert!(out.contains("Aligning insights with MIT Muzaffarpur branches..."));
        assert!(out.contains("Asha Kumar, you are a Strategic Engineering Mind"));
        assert!(out.contains("Best fit: Computer Science Engineering (CSE) at MIT Muzaffarpur"));
        assert!(out.trim_end().ends_with("Goodbye."));
    }

    #[test]
    fn test_bad_input_reprompts() {
        let out = run("\n   \nAsha\nseven\n9\nquit\n");
        assert!(out.contains("Please enter your name to continue."));
        assert!(out.contains("Enter the number of your choice."));
        assert!(out.contains("Choose 1 to 2."));
        assert!(!out.contains("2 / 14"));
    }

    #[test]
    fn test_share_then_restart() {
        let out = run(&full_script("s\nr\n\nquit\n"));
        assert!(out.contains("Copy this to share:"));
        assert!(out.contains("perfect fit for Computer Science Engineering (CSE) at MIT Muzaffarpur!"));
        // Welcome prompt shown twice: once at start, once after restart.
        assert_eq!(out.matches("Press Enter to begin").count(), 2);
    }

    #[test]
    fn test_end_of_input_exits_cleanly() {
        let out = run("\nAsha\n");
        assert!(out.trim_end().ends_with("Goodbye."));
    }
}
