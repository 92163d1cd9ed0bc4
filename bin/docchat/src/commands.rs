//! Subcommand implementations.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use docchat_client::api::ChatBackend;
use docchat_client::{ApiClient, Attachment, ChatSession, SessionIdStore};
use docchat_reply::export::{pptx, xlsx};
use docchat_reply::render::{render_ansi, render_grid, render_html};
use docchat_reply::{decode, decode_message, ChatMessage, ContentType, Role};
use tracing::warn;

use crate::config::Config;

/// Interactive chat loop.  `/retry` resubmits a failed send, `/quit` exits.
pub async fn chat(cfg: &Config, document: Option<String>, attach: Option<PathBuf>) -> Result<()> {
    let (backend, session_id) = connect(cfg, document.as_deref())?;
    let mut session = ChatSession::new(backend, session_id);

    if let Err(e) = session.load().await {
        warn!(error = %e, "could not load history; starting empty");
    }
    for message in session.messages() {
        print_message(message);
    }

    // The --attach file rides along with the first message sent.
    let mut attach = attach;
    let stdin = std::io::stdin();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line {
            "/quit" | "/exit" => break,
            "/retry" => match session.retry().await {
                Ok(Some(reply)) => print_reply(&reply),
                Ok(None) => println!("nothing to retry"),
                Err(e) => println!("{}; type /retry to try again", send_failure(&e)),
            },
            text => {
                let attachment = match attach.take() {
                    Some(path) => Some(
                        Attachment::read(&path)
                            .with_context(|| format!("reading {}", path.display()))?,
                    ),
                    None => None,
                };
                match session.send(text, attachment).await {
                    Ok(reply) => print_reply(&reply),
                    Err(e) => println!("{}; type /retry to resend", send_failure(&e)),
                }
            }
        }
    }
    Ok(())
}

/// Fetch and render the session history.
pub async fn history(cfg: &Config, document: Option<String>) -> Result<()> {
    let (backend, session_id) = connect(cfg, document.as_deref())?;
    let messages = backend.history(&session_id).await?;
    if messages.is_empty() {
        println!("(no messages yet)");
    }
    for message in &messages {
        print_message(message);
    }
    Ok(())
}

/// Decode a raw reply from a file and write the selected artifacts.
pub fn export(
    input: &Path,
    slides: Option<PathBuf>,
    sheet: Option<PathBuf>,
    html: Option<PathBuf>,
    preview: bool,
) -> Result<()> {
    if slides.is_none() && sheet.is_none() && html.is_none() && !preview {
        bail!("nothing to export: pass at least one of --slides, --sheet, --html, --preview");
    }

    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let decoded = decode(&raw).context("reply could not be decoded")?;

    if let Some(path) = slides {
        if !decoded.has_slides() {
            bail!("reply carries no slide deck");
        }
        pptx::save_deck(&decoded.slides, &path)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("wrote {}", path.display());
    }
    if let Some(path) = sheet {
        let spec = decoded
            .spreadsheet
            .as_ref()
            .context("reply carries no spreadsheet")?;
        xlsx::save_workbook(spec, &path)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("wrote {}", path.display());
    }
    if preview {
        let spec = decoded
            .spreadsheet
            .as_ref()
            .context("reply carries no spreadsheet")?;
        print!("{}", render_grid(spec));
    }
    if let Some(path) = html {
        std::fs::write(&path, render_html(&decoded.prose))
            .with_context(|| format!("writing {}", path.display()))?;
        println!("wrote {}", path.display());
    }
    Ok(())
}

/// Mint a fresh anonymous session id.
pub fn new_session(cfg: &Config) -> Result<()> {
    let id = session_store(cfg).reset()?;
    println!("new session: {id}");
    Ok(())
}

/// Delete the session's messages server-side.
pub async fn clear(cfg: &Config, document: Option<String>) -> Result<()> {
    let (backend, session_id) = connect(cfg, document.as_deref())?;
    backend.clear(&session_id).await?;
    println!("session {session_id} cleared");
    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn connect(cfg: &Config, document: Option<&str>) -> Result<(ApiClient, String)> {
    let timeout = Duration::from_secs(cfg.timeout_secs);
    match document {
        Some(id) => Ok((ApiClient::for_documents(&cfg.api_base, timeout), id.to_owned())),
        None => {
            let id = session_store(cfg).load_or_create()?;
            Ok((ApiClient::new(&cfg.api_base, timeout), id))
        }
    }
}

fn session_store(cfg: &Config) -> SessionIdStore {
    let dir = cfg
        .data_dir
        .clone()
        .or_else(SessionIdStore::default_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    SessionIdStore::new(dir)
}

/// One-line failure report; timeouts get called out since waiting longer
/// (DOCCHAT_TIMEOUT_SECS) is a different remedy than retrying.
fn send_failure(error: &docchat_client::ClientError) -> String {
    if error.is_timeout() {
        "request timed out".to_owned()
    } else {
        format!("send failed ({error})")
    }
}

fn print_message(message: &ChatMessage) {
    match message.role {
        Role::User => {
            if message.content_type == ContentType::File {
                println!("you> [file] {}", message.content);
            } else {
                println!("you> {}", message.content);
            }
        }
        Role::Assistant => print_reply(message),
    }
}

fn print_reply(message: &ChatMessage) {
    match decode_message(message) {
        Ok(decoded) => {
            println!("{}", render_ansi(&decoded.prose));
            if let Some(sheet) = &decoded.spreadsheet {
                print!("{}", render_grid(sheet));
            }
            if decoded.has_slides() || decoded.spreadsheet.is_some() {
                println!(
                    "(this reply carries artifacts; save its raw text and run \
                     `docchat export` to write them)"
                );
            }
        }
        Err(e) => {
            warn!(error = %e, "reply payload could not be decoded");
            println!("(a reply arrived but its payload was malformed and was not shown)");
        }
    }
}
