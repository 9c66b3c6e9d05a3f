use std::path::Path;

use anyhow::{bail, Context, Result};
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use tracing::info;

const SITEMAP_NS: &[u8] = b"http://www.sitemaps.org/schemas/sitemap/0.9";

/// One `<url><loc>` entry of a sitemap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub loc: String,
}

impl SitemapEntry {
    pub fn new(loc: impl Into<String>) -> Self {
        Self { loc: loc.into() }
    }

    /// Plain substring match, no URL parsing.
    pub fn matches_host(&self, host: &str) -> bool {
        self.loc.contains(host)
    }

    /// `loc` with `suffix` appended verbatim.
    pub fn fetch_url(&self, suffix: &str) -> String {
        format!("{}{}", self.loc, suffix)
    }

    /// Text after the final `/` of `loc`, plus `suffix`.
    ///
    /// A trailing slash yields an empty segment and a query string stays in
    /// the name; both are kept as-is.
    pub fn file_name(&self, suffix: &str) -> String {
        let last = self.loc.rsplit('/').next().unwrap_or_default();
        format!("{}{}", last, suffix)
    }
}

/// Read and parse a sitemap file from disk.
pub fn load_entries(path: &Path) -> Result<Vec<SitemapEntry>> {
    let xml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read sitemap {}", path.display()))?;
    let entries = parse_urlset(&xml)
        .with_context(|| format!("Malformed sitemap {}", path.display()))?;
    info!("Total URLs in sitemap: {}", entries.len());
    Ok(entries)
}

/// Parse a urlset document and return its entries in document order.
///
/// Only `<url>` children of the root and the first `<loc>` of each `<url>` are
/// read, and both must live in the sitemap namespace.
pub fn parse_urlset(xml: &str) -> Result<Vec<SitemapEntry>> {
    let mut reader = NsReader::from_str(xml);
    let mut entries = Vec::new();
    let mut buf = Vec::new();

    let mut depth = 0usize;
    let mut seen_root = false;
    let mut in_url = false;
    let mut url_loc: Option<String> = None;
    let mut collecting: Option<String> = None;

    loop {
        match reader.read_resolved_event_into(&mut buf)? {
            (ns, Event::Start(e)) => {
                depth += 1;
                seen_root = true;
                let local = e.local_name();
                if depth == 2 && is_sitemap(&ns, local.as_ref(), b"url") {
                    in_url = true;
                    url_loc = None;
                } else if depth == 3
                    && in_url
                    && url_loc.is_none()
                    && is_sitemap(&ns, local.as_ref(), b"loc")
                {
                    collecting = Some(String::new());
                }
            }
            (ns, Event::Empty(e)) => {
                seen_root = true;
                // <loc/> inside a url is an empty location; <url/> has none at all.
                if depth + 1 == 3
                    && in_url
                    && url_loc.is_none()
                    && is_sitemap(&ns, e.local_name().as_ref(), b"loc")
                {
                    bail!("empty <loc> element");
                }
            }
            (_, Event::Text(e)) if depth == 3 => {
                if let Some(text) = collecting.as_mut() {
                    text.push_str(&e.unescape()?);
                }
            }
            (_, Event::CData(e)) if depth == 3 => {
                if let Some(text) = collecting.as_mut() {
                    text.push_str(std::str::from_utf8(&e)?);
                }
            }
            (_, Event::End(_)) => {
                if depth == 3 {
                    if let Some(text) = collecting.take() {
                        if text.is_empty() {
                            bail!("empty <loc> element");
                        }
                        // Whitespace-only text stays as-is; no host filter matches it.
                        let trimmed = text.trim();
                        url_loc = Some(if trimmed.is_empty() {
                            text
                        } else {
                            trimmed.to_string()
                        });
                    }
                } else if depth == 2 && in_url {
                    if let Some(loc) = url_loc.take() {
                        entries.push(SitemapEntry::new(loc));
                    }
                    in_url = false;
                }
                depth = depth.saturating_sub(1);
            }
            (_, Event::Eof) => {
                if !seen_root {
                    bail!("no root element found");
                }
                if depth != 0 {
                    bail!("unexpected end of document: {} element(s) left open", depth);
                }
                break;
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(entries)
}

fn is_sitemap(ns: &ResolveResult, local: &[u8], name: &[u8]) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == SITEMAP_NS) && local == name
}

// ── Tests ──
