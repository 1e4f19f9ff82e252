use crate::config::MissingLink;
use crate::rss_utils::text;
use crate::types::{FeedRecord, Result};
use crate::xml::XmlNode;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// Timestamp fields in order of preference.
const DATE_FIELDS: [&str; 4] = ["pubDate", "published", "dc:date", "updated"];

/// Summary fields in order of preference.
const SUMMARY_FIELDS: [&str; 3] = ["description", "summary", "content"];

const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Rss,
    Atom,
}

impl FeedKind {
    /// Recognize the document shape from its root element.
    pub fn detect(root: &XmlNode) -> Option<Self> {
        match root.local_name() {
            "rss" if root.child("channel").is_some() => Some(FeedKind::Rss),
            "feed" => Some(FeedKind::Atom),
            _ => None,
        }
    }

    /// Child lookup for an item. Atom documents may bind their namespace
    /// to a prefix, so Atom matches on the local name; RSS matches the
    /// qualified name so an embedded `atom:link` is never taken for `link`.
    fn field<'a>(self, item: &'a XmlNode, name: &str) -> Option<&'a XmlNode> {
        match self {
            FeedKind::Rss => item.child(name),
            FeedKind::Atom => item.child_local(name),
        }
    }

    fn field_text(self, item: &XmlNode, name: &str) -> Option<String> {
        match self {
            FeedKind::Rss => item.child_text(name),
            FeedKind::Atom => item.child_local_text(name),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub missing_link: MissingLink,
    pub max_items: Option<usize>,
    pub summary_chars: usize,
    pub source_url: Option<String>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            missing_link: MissingLink::Drop,
            max_items: None,
            summary_chars: 200,
            source_url: None,
        }
    }
}

/// Turns RSS 2.0 and Atom documents into [`FeedRecord`]s.
pub struct FeedParser {
    options: NormalizeOptions,
    run_time: DateTime<Utc>,
}

impl FeedParser {
    pub fn new(options: NormalizeOptions) -> Self {
        Self {
            options,
            run_time: Utc::now(),
        }
    }

    /// Timestamp given to items that carry no date.
    pub fn with_run_time(mut self, run_time: DateTime<Utc>) -> Self {
        self.run_time = run_time;
        self
    }

    /// Parse raw XML and normalize it. Fails only when the bytes are not
    /// well-formed XML.
    pub fn parse_feed(&self, content: &[u8], source: &str) -> Result<Vec<FeedRecord>> {
        debug!("Parsing feed content for {} ({} bytes)", source, content.len());
        let root = XmlNode::parse(content)?;
        Ok(self.normalize(&root, source))
    }

    /// Normalize a parsed document. Unknown shapes yield no records.
    pub fn normalize(&self, root: &XmlNode, source: &str) -> Vec<FeedRecord> {
        let (kind, items): (FeedKind, Vec<&XmlNode>) = match FeedKind::detect(root) {
            Some(FeedKind::Rss) => {
                let channel = root.child("channel");
                let items = channel
                    .map(|c| c.children_named("item").collect())
                    .unwrap_or_default();
                (FeedKind::Rss, items)
            }
            Some(FeedKind::Atom) => (FeedKind::Atom, root.children_local("entry").collect()),
            None => {
                warn!("[{}] Unrecognized feed format <{}>", source, root.name);
                return Vec::new();
            }
        };

        let limit = self.options.max_items.unwrap_or(usize::MAX);
        let mut records = Vec::new();

        for item in items.into_iter().take(limit) {
            match self.normalize_item(kind, item, source) {
                Some(record) => records.push(record),
                None => debug!("[{}] Dropping item without a link", source),
            }
        }

        info!("[{}] Normalized {} records", source, records.len());
        records
    }

    fn normalize_item(&self, kind: FeedKind, item: &XmlNode, source: &str) -> Option<FeedRecord> {
        let link = match kind {
            FeedKind::Rss => resolve_rss_link(item),
            FeedKind::Atom => resolve_atom_link(item),
        };

        let link = match (link, self.options.missing_link) {
            (Some(link), _) => link,
            (None, MissingLink::Empty) => String::new(),
            (None, MissingLink::Drop) => return None,
        };

        let summary = SUMMARY_FIELDS
            .iter()
            .find_map(|field| kind.field_text(item, field))
            .map(|raw| text::strip_html(&raw).trim().to_string())
            .map(|clean| text::truncate_chars(&clean, self.options.summary_chars))
            .unwrap_or_default();

        let published = DATE_FIELDS
            .iter()
            .find_map(|field| kind.field_text(item, field))
            .unwrap_or_else(|| self.run_time.to_rfc3339());

        let mut record = FeedRecord::new(resolve_title(kind, item), link, published, summary, source);
        if let Some(ref url) = self.options.source_url {
            record = record.with_source_url(url.clone());
        }
        Some(record)
    }
}

/// Plain text of the item title, flattening typed (Atom) titles.
fn resolve_title(kind: FeedKind, item: &XmlNode) -> String {
    let Some(title) = kind.field(item, "title") else {
        return UNTITLED.to_string();
    };

    let content = title.text_content();
    let content = match title.attr("type") {
        Some("html") | Some("xhtml") => text::strip_html(&content),
        _ => content,
    };
    let content = text::collapse_whitespace(&content);

    if content.is_empty() {
        UNTITLED.to_string()
    } else {
        content
    }
}

/// RSS `link` is usually text but some feeds put it in an `href` attribute.
fn resolve_rss_link(item: &XmlNode) -> Option<String> {
    let link = item.child("link")?;
    let text = link.text_content().trim().to_string();
    if !text.is_empty() {
        return Some(text);
    }
    link.attr("href")
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
}

/// Atom link: the alternate link (a link without `rel` is alternate), else
/// the first link, else the entry id.
fn resolve_atom_link(entry: &XmlNode) -> Option<String> {
    let links: Vec<&XmlNode> = entry.children_local("link").collect();

    let chosen = links
        .iter()
        .find(|l| l.attr("rel").unwrap_or("alternate") == "alternate")
        .or_else(|| links.first());

    chosen
        .and_then(|l| {
            l.attr("href")
                .map(|h| h.trim().to_string())
                .or_else(|| Some(l.text_content().trim().to_string()))
        })
        .filter(|href| !href.is_empty())
        .or_else(|| entry.child_local_text("id"))
}
