//! docchat – entry point.
//!
//! Startup order:
//! 1. Parse configuration from environment variables.
//! 2. Initialise structured tracing.
//! 3. Dispatch the chosen subcommand.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "docchat", version, about = "Chat with documents and export replies to Office files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive chat session
    Chat {
        /// Key the session on a document id instead of the stored anonymous id
        #[arg(long)]
        document: Option<String>,
        /// Attach a file to the first message
        #[arg(long)]
        attach: Option<PathBuf>,
    },
    /// Fetch and render the current session's messages
    History {
        #[arg(long)]
        document: Option<String>,
    },
    /// Decode a saved reply and write the selected artifacts
    Export {
        /// File holding the raw reply text
        input: PathBuf,
        /// Write the slide deck here (.pptx)
        #[arg(long)]
        slides: Option<PathBuf>,
        /// Write the spreadsheet here (.xlsx)
        #[arg(long)]
        sheet: Option<PathBuf>,
        /// Write the prose as a printable HTML page here
        #[arg(long)]
        html: Option<PathBuf>,
        /// Print the spreadsheet as a terminal grid instead of writing a file
        #[arg(long)]
        preview: bool,
    },
    /// Mint a fresh anonymous session id
    NewSession,
    /// Delete the current session's messages
    Clear {
        #[arg(long)]
        document: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    let cfg = Config::from_env();

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    // Build the log-level filter, warning loudly if the configured value is
    // not a valid tracing filter expression.
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.log_level.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: DOCCHAT_LOG='{}' is not a valid tracing filter ({}); \
                     falling back to 'info'",
                    cfg.log_level, e
                );
                tracing_subscriber::EnvFilter::new("info")
            }
        },
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // ── 3. Dispatch ────────────────────────────────────────────────────────────
    let cli = Cli::parse();
    match cli.command {
        Command::Chat { document, attach } => commands::chat(&cfg, document, attach).await,
        Command::History { document } => commands::history(&cfg, document).await,
        Command::Export {
            input,
            slides,
            sheet,
            html,
            preview,
        } => commands::export(&input, slides, sheet, html, preview),
        Command::NewSession => commands::new_session(&cfg),
        Command::Clear { document } => commands::clear(&cfg, document).await,
    }
}
