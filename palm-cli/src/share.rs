//! Hands a finished result to the outside world: a configured share command,
//! then a clipboard tool, then the screen.

use anyhow::{Context, Result, bail};
use std::io::Write;
use std::process::{Command, Stdio};

use palm_core::ShareMessage;

/// Clipboard programs tried in order, with the args they need to read stdin.
const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("clip.exe", &[]),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared { via: String },
    Copied { via: String },
    /// Nothing worked; the caller shows this text.
    Shown(String),
}

impl ShareOutcome {
    pub fn notice(&self) -> String {
        match self {
            ShareOutcome::Shared { via } => format!("Shared via {via}."),
            ShareOutcome::Copied { via } => format!("Result copied to clipboard ({via})."),
            ShareOutcome::Shown(text) => format!("Copy this to share:\n{text}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sharer {
    command: Option<Vec<String>>,
    clipboard_tools: Vec<(String, Vec<String>)>,
}

impl Sharer {
    pub fn new(command: Option<Vec<String>>) -> Self {
        Self {
            command: command.filter(|argv| !argv.is_empty()),
            clipboard_tools: CLIPBOARD_TOOLS
                .iter()
                .map(|(bin, args)| (bin.to_string(), args.iter().map(|a| a.to_string()).collect()))
                .collect(),
        }
    }

    pub fn with_clipboard_tools(mut self, tools: Vec<(String, Vec<String>)>) -> Self {
        self.clipboard_tools = tools;
        self
    }

    /// Never fails: every problem is logged and the next strategy is tried.
    pub fn share(&self, message: &ShareMessage) -> ShareOutcome {
        if let Some(argv) = &self.command {
            match pipe_to(argv, &message.share_text()) {
                Ok(()) => {
                    tracing::info!(command = %argv[0], "result shared");
                    return ShareOutcome::Shared { via: argv[0].clone() };
                }
                Err(e) => tracing::warn!(command = %argv[0], error = %e, "share command failed"),
            }
        }

        let text = message.clipboard_text();
        for (bin, args) in &self.clipboard_tools {
            if which::which(bin).is_err() {
                continue;
            }
            let mut argv = vec![bin.clone()];
            argv.extend(args.iter().cloned());
            match pipe_to(&argv, &text) {
                Ok(()) => {
                    tracing::info!(tool = %bin, "result copied to clipboard");
                    return ShareOutcome::Copied { via: bin.clone() };
                }
                Err(e) => tracing::warn!(tool = %bin, error = %e, "clipboard tool failed"),
            }
        }

        tracing::info!("no share target available; showing text");
        ShareOutcome::Shown(text)
    }
}

fn pipe_to(argv: &[String], text: &str) -> Result<()> {
    let (bin, args) = argv.split_first().context("empty share command")?;
    let mut child = Command::new(bin)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("spawn {bin}"))?;

    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(text.as_bytes()) {
            drop(stdin);
            let _ = child.kill();
            let _ = child.wait();
            return Err(e).with_context(|| format!("write to {bin}"));
        }
    }
    let status = child.wait().with_context(|| format!("wait for {bin}"))?;
    if !status.success() {
        bail!("{bin} exited with {status}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    fn message() -> ShareMessage {
        ShareMessage {
            title: "Palm Insight Summary".to_string(),
            text: "My cognitive analysis suggests I'm a perfect fit for Civil Engineering (CE) at MIT Muzaffarpur!".to_string(),
            url: String::new(),
        }
    }

    #[test]
    fn test_configured_command_receives_text() {
        let sharer = Sharer::new(Some(sh("cat > /dev/null"))).with_clipboard_tools(vec![]);
        assert_eq!(
            sharer.share(&message()),
            ShareOutcome::Shared { via: "sh".to_string() }
        );
    }

    #[test]
    fn test_failing_command_falls_through_to_text() {
        let sharer = Sharer::new(Some(sh("exit 3"))).with_clipboard_tools(vec![]);
        match sharer.share(&message()) {
            ShareOutcome::Shown(text) => {
                assert!(text.contains("Civil Engineering (CE)"));
                assert!(text.ends_with("Generated via Palm Insight."));
            }
            other => panic!("expected text fallback, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_tools_are_skipped() {
        let sharer = Sharer::new(None).with_clipboard_tools(vec![(
            "palm-no-such-clipboard".to_string(),
            vec![],
        )]);
        assert!(matches!(sharer.share(&message()), ShareOutcome::Shown(_)));
    }

    #[test]
    fn test_reader_that_exits_early_is_reported() {
        let text = "x".repeat(4 * 1024 * 1024);
        let err = pipe_to(&sh("exit 0"), &text).unwrap_err();
        assert!(format!("{err:#}").contains("write to sh"));
    }

    #[test]
    fn test_empty_command_is_ignored() {
        let sharer = Sharer::new(Some(vec![])).with_clipboard_tools(vec![]);
        assert!(matches!(sharer.share(&message()), ShareOutcome::Shown(_)));
    }
}
