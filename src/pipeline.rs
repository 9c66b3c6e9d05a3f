use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use indicatif::ProgressBar;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::fetch::{fetch_document, FetchError};
use crate::output;
use crate::settings::Settings;
use crate::sitemap::{self, SitemapEntry};

/// Result of processing one matching entry.
#[derive(Debug)]
pub enum EntryOutcome {
    Saved { path: PathBuf, bytes: usize },
    /// 2xx with an empty body; nothing is written.
    Empty,
    Failed { url: String, error: FetchError },
}

/// Counts for the completion line.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub total: usize,
    pub matched: usize,
    pub saved: Vec<PathBuf>,
    pub empty: usize,
    /// Fetch URLs that failed, in document order.
    pub failed: Vec<String>,
}

impl RunSummary {
    pub fn print(&self) {
        println!("{}", self.completion_line());
    }

    pub fn completion_line(&self) -> String {
        format!(
            "Documentation URLs processed: {} saved, {} empty, {} failed ({} of {} entries matched).",
            self.saved.len(),
            self.empty,
            self.failed.len(),
            self.matched,
            self.total,
        )
    }
}

/// Console line for a fetch that did not produce a document.
pub fn failure_line(url: &str, error: &FetchError) -> String {
    format!("Failed to fetch {}: {}", url, error)
}

/// Fetch and save every sitemap entry matching the host filter, one at a time.
///
/// Only a bad sitemap or a filesystem error ends the run early; fetch failures
/// are reported on `console` and skipped.
pub async fn run(
    settings: &Settings,
    client: &Client,
    pb: &ProgressBar,
    console: &mut impl Write,
) -> Result<RunSummary> {
    output::ensure_dir(&settings.output_dir).await?;
    let entries = sitemap::load_entries(&settings.sitemap)?;

    let matching: Vec<&SitemapEntry> = entries
        .iter()
        .filter(|e| e.matches_host(&settings.host))
        .collect();
    info!("Entries matching {}: {}", settings.host, matching.len());

    let mut summary = RunSummary {
        total: entries.len(),
        matched: matching.len(),
        ..Default::default()
    };

    pb.set_length(matching.len() as u64);
    for entry in matching {
        match process_entry(settings, client, entry).await? {
            EntryOutcome::Saved { path, bytes } => {
                debug!(path = %path.display(), bytes, "saved");
                summary.saved.push(path);
            }
            EntryOutcome::Empty => {
                warn!("Empty body for {}, nothing written", entry.loc);
                summary.empty += 1;
            }
            EntryOutcome::Failed { url, error } => {
                pb.suspend(|| writeln!(console, "{}", failure_line(&url, &error)))?;
                summary.failed.push(url);
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(summary)
}

/// Fetch one entry and write it. `Err` only for write failures.
pub async fn process_entry(
    settings: &Settings,
    client: &Client,
    entry: &SitemapEntry,
) -> Result<EntryOutcome> {
    let url = entry.fetch_url(&settings.url_suffix);
    debug!("Fetching {}", url);

    let body = match fetch_document(client, &url).await {
        Ok(body) => body,
        Err(error) => return Ok(EntryOutcome::Failed { url, error }),
    };
    if body.is_empty() {
        return Ok(EntryOutcome::Empty);
    }

    let file_name = entry.file_name(&settings.file_suffix);
    let path = output::write_document(&settings.output_dir, &file_name, &body).await?;
    Ok(EntryOutcome::Saved { path, bytes: body.len() })
}

// ── Tests ──
