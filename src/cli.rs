use std::io::Read;

use anyhow::{bail, Context, Result};

use crate::config;
use crate::model::bug::PendingBug;
use crate::providers;
use crate::providers::Backend;

/// Handle `bugsync fetch <project-url>`: print the full remote buglist as JSON.
pub async fn handle_fetch(args: &[String]) -> Result<()> {
    let Some(raw_url) = args.first() else {
        bail!("Usage: bugsync fetch <project-url>");
    };

    let backend = single_backend()?;
    let url = backend.base_url(raw_url);
    let buglist = backend
        .fetch_buglist(&url, None)
        .await
        .with_context(|| format!("Failed to fetch issues from {url}"))?;

    println!("{}", serde_json::to_string_pretty(&buglist)?);
    Ok(())
}

/// Handle `bugsync send <project-url> [batch.json]`: replay a batch of pending
/// changes read from the file argument (or stdin) and print the resulting
/// records.
pub async fn handle_send(args: &[String]) -> Result<()> {
    let Some(raw_url) = args.first() else {
        bail!("Usage: bugsync send <project-url> [batch.json]");
    };
    let batch = read_batch(args.get(1).map(String::as_str))?;

    let backend = single_backend()?;
    let url = backend.base_url(raw_url);
    let bugs = backend
        .send_buglist(&url, &batch)
        .await
        .with_context(|| format!("Failed to push changes to {url}"))?;

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({ "bugs": bugs }))?
    );
    Ok(())
}

fn single_backend() -> Result<Box<dyn Backend>> {
    let config = config::load_config()?;
    let mut backends = providers::create_backends(&config);
    if backends.is_empty() {
        bail!("No backends configured. Add a [backlog] section to ~/.bugsync/config.toml");
    }
    let backend = backends.remove(0);
    tracing::debug!(backend = backend.name(), "selected backend");
    Ok(backend)
}

fn read_batch(path: Option<&str>) -> Result<Vec<PendingBug>> {
    let contents = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read batch from {path}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read batch from stdin")?;
            buf
        }
    };
    parse_batch(&contents)
}

/// Parse a batch of pending bugs from a JSON array.
pub fn parse_batch(contents: &str) -> Result<Vec<PendingBug>> {
    serde_json::from_str(contents).context("Failed to parse batch JSON")
}

pub fn print_help() {
    println!("bugsync — sync a local bug list with a remote issue tracker\n");
    println!("USAGE:");
    println!("  bugsync fetch <project-url>           Fetch all remote issues as JSON");
    println!("  bugsync send <project-url> [file]     Replay a batch of pending changes");
    println!("                                        (reads JSON from file or stdin)");
    println!();
    println!("A batch is a JSON array of bug records. A record without an id is");
    println!("created remotely; one with an id is updated, or deleted when it");
    println!("carries \"delete\": true.");
    println!();
    println!("EXAMPLES:");
    println!("  bugsync fetch demo.backlog.jp/projects/DEMO");
    println!("  bugsync send demo.backlog.jp/projects/DEMO changes.json");
}
