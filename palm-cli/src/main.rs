use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

mod app;
mod auth;
mod bank_cmd;
mod config;
mod insight;
mod logging;
mod plain;
mod share;
mod state;
mod worker;

use bank_cmd::BankCommand;
use share::Sharer;

#[derive(Parser, Debug)]
#[command(
    name = "palm",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("PALM_BUILD_SHA"), ")"),
    about = "Palm Insight: find the engineering branch that fits how you think"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Full-screen quiz (default)
    Run {
        /// TOML question bank to use instead of the built-in one
        #[arg(long)]
        bank: Option<PathBuf>,
    },

    /// Line-mode quiz on stdin/stdout
    Plain {
        #[arg(long)]
        bank: Option<PathBuf>,
    },

    /// Inspect or validate question banks
    Bank {
        #[command(subcommand)]
        command: BankCommand,
    },

    /// Manage ~/.palm-insight/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Store API keys for insight generation
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Paste a Gemini API key into ~/.palm-insight/auth.json
    PasteGeminiKey,
    /// Paste an OpenAI API key into ~/.palm-insight/auth.json
    PasteOpenaiKey,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging() {
        eprintln!("warning: logging disabled: {e:#}");
    }
    tracing::debug!(build = env!("PALM_BUILD_SHA"), "palm starting");

    match cli.command.unwrap_or(Command::Run { bank: None }) {
        Command::Run { bank } => run_quiz(bank.as_deref(), false).await?,
        Command::Plain { bank } => run_quiz(bank.as_deref(), true).await?,
        Command::Bank { command } => bank_cmd::run(command)?,
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },
        Command::Auth { command } => match command {
            AuthCommand::PasteGeminiKey => auth::paste_gemini_key()?,
            AuthCommand::PasteOpenaiKey => auth::paste_openai_key()?,
        },
    }

    Ok(())
}

async fn run_quiz(bank: Option<&Path>, line_mode: bool) -> Result<()> {
    let cfg = config::load_config()?;
    let creds = auth::load_auth()?.with_env_overrides();
    let ctx = cfg.flow_context(bank)?;
    let adapter = insight::build_adapter(&cfg, &creds)?;
    let sharer = Sharer::new(cfg.share.command.clone());
    tracing::info!(
        provider = adapter.provider_name(),
        questions = ctx.bank.len(),
        line_mode,
        "quiz starting"
    );

    if line_mode {
        let opts = plain::PlainOptions {
            sharer,
            share_url: cfg.display.share_url.clone(),
        };
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut out = std::io::stdout();
        plain::run_plain(ctx, &adapter, &opts, &mut input, &mut out).await
    } else {
        app::run_app(ctx, adapter, sharer, cfg.display.share_url.clone())
    }
}
