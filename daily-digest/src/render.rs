//! HTML, Markdown and chat-card rendering of a [`Digest`].
//!
//! Everything here is a pure function of its inputs.

use crate::rss_utils::text::{
    escape_html, escape_markdown_label, escape_markdown_url, smart_truncate, truncate_with_ellipsis,
};
use crate::rss_utils::time::{format_iso_date, format_long_date};
use crate::types::{Digest, FeedRecord, HistoryEntry, Section};
use serde_json::{json, Value};
use std::fmt::Write;

pub const SITE_TITLE: &str = "AI Daily";

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub site_url: String,
    pub short_summary_chars: usize,
    /// History days listed in the page sidebar.
    pub sidebar_days: usize,
    /// Items listed per section in the chat card.
    pub card_items: usize,
    pub card_title_chars: usize,
    /// Items listed per section in the short chat message.
    pub message_items: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            site_url: crate::config::DEFAULT_SITE_URL.to_string(),
            short_summary_chars: 200,
            sidebar_days: 10,
            card_items: 5,
            card_title_chars: 40,
            message_items: 3,
        }
    }
}

const STYLE: &str = r#"
    * { margin: 0; padding: 0; box-sizing: border-box; }
    body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'PingFang SC', sans-serif; line-height: 1.8; color: #333; background: linear-gradient(135deg, #f5f7fa 0%, #c3cfe2 100%); min-height: 100vh; }
    .container { max-width: 800px; margin: 0 auto; padding: 20px; }
    header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 50px 30px; text-align: center; border-radius: 20px; margin-bottom: 30px; }
    nav, section { background: white; border-radius: 16px; padding: 25px 30px; margin-bottom: 25px; box-shadow: 0 4px 20px rgba(0,0,0,0.08); }
    nav { text-align: center; }
    nav a { color: #667eea; text-decoration: none; margin: 0 15px; }
    h2 { font-size: 1.4em; margin-bottom: 20px; border-bottom: 3px solid #667eea; display: inline-block; }
    .count { color: #888; font-size: 0.8em; }
    .item { padding: 18px 0; border-bottom: 1px solid #eee; }
    .item:last-child { border-bottom: none; }
    .item h3 a { color: #333; text-decoration: none; }
    .meta { font-size: 0.85em; color: #888; }
    .summary { color: #555; background: #f8f9fa; padding: 12px 15px; border-radius: 8px; margin-top: 10px; }
    .tag { background: #667eea; color: white; padding: 3px 10px; border-radius: 20px; font-size: 0.75em; margin-right: 8px; }
    .pdf-link { color: #667eea; font-size: 0.85em; }
    .empty { color: #888; text-align: center; padding: 20px; }
    .sidebar { position: fixed; right: 20px; top: 100px; background: white; border-radius: 12px; padding: 15px; }
    .sidebar a { display: block; color: #667eea; text-decoration: none; }
    .sidebar a.active { font-weight: bold; }
    .day-item { padding: 18px; border-bottom: 1px solid #f0f0f0; display: flex; justify-content: space-between; }
    .stats span { margin-left: 10px; color: #888; }
    footer { text-align: center; color: #888; padding: 20px; }
"#;

/// Summary shown for a record: its translation if any, else a
/// sentence-aware short version.
fn summary_for(record: &FeedRecord, options: &RenderOptions) -> String {
    match record.translated_summary {
        Some(ref translated) => translated.clone(),
        None => smart_truncate(&record.summary, options.short_summary_chars),
    }
}

fn page_head(title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"UTF-8\">\n  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n  <title>{}</title>\n  <style>{}</style>\n</head>\n",
        escape_html(title),
        STYLE
    )
}

fn render_html_item(out: &mut String, section: Section, record: &FeedRecord, options: &RenderOptions) {
    let title = match section {
        Section::News => record.display_title(),
        _ => record.title.as_str(),
    };

    let _ = writeln!(out, "      <div class=\"item\">");
    let _ = writeln!(
        out,
        "        <h3><a href=\"{}\" target=\"_blank\">{}</a></h3>",
        escape_html(&record.link),
        escape_html(title)
    );

    let meta = match section {
        Section::News => format!("📌 {}", escape_html(&record.source)),
        Section::Papers => format!(
            "<span class=\"tag\">{}</span> 👤 {}",
            escape_html(record.category.as_deref().unwrap_or(&record.source)),
            escape_html(&record.authors.join(", "))
        ),
        Section::Blogs => {
            let date = record
                .published_at()
                .map(|d| format_iso_date(d.date_naive()))
                .unwrap_or_else(|| record.published.clone());
            format!("✍️ {} · 📅 {}", escape_html(&record.source), escape_html(&date))
        }
    };
    let _ = writeln!(out, "        <div class=\"meta\">{}</div>", meta);

    let summary = summary_for(record, options);
    if !summary.is_empty() {
        let _ = writeln!(out, "        <div class=\"summary\">{}</div>", escape_html(&summary));
    }

    if let Some(ref pdf) = record.pdf {
        let _ = writeln!(
            out,
            "        <a href=\"{}\" target=\"_blank\" class=\"pdf-link\">📄 PDF</a>",
            escape_html(pdf)
        );
    }

    let _ = writeln!(out, "      </div>");
}

/// Daily page with every section and a history sidebar.
pub fn render_html(digest: &Digest, history: &[HistoryEntry], options: &RenderOptions) -> String {
    let date_long = format_long_date(digest.date);
    let mut out = page_head(&format!("{} - {}", SITE_TITLE, date_long));

    out.push_str("<body>\n  <div class=\"container\">\n");
    let _ = writeln!(
        out,
        "    <header>\n      <h1>🎤 {}</h1>\n      <p class=\"subtitle\">{}</p>\n    </header>",
        SITE_TITLE,
        escape_html(&date_long)
    );

    out.push_str("    <nav>\n");
    for section in Section::ALL {
        let _ = writeln!(
            out,
            "      <a href=\"#{}\">{} {}</a>",
            section.key(),
            section.icon(),
            section.label()
        );
    }
    out.push_str("      <a href=\"index.html\">📅 Archive</a>\n    </nav>\n");

    for section in Section::ALL {
        let records = digest.section(section);
        let _ = writeln!(out, "    <section id=\"{}\">", section.key());
        let _ = writeln!(
            out,
            "      <h2>{} {} <span class=\"count\">{}</span></h2>",
            section.icon(),
            section.label(),
            records.len()
        );
        if records.is_empty() {
            let _ = writeln!(out, "      <p class=\"empty\">{}</p>", section.empty_placeholder());
        } else {
            for record in records {
                render_html_item(&mut out, section, record, options);
            }
        }
        out.push_str("    </section>\n");
    }

    out.push_str("    <footer>\n      <p>🤖 Generated automatically, for reference only</p>\n");
    if let Some(generated_at) = digest.generated_at {
        let _ = writeln!(
            out,
            "      <p>Updated: {}</p>",
            generated_at.format("%Y-%m-%d %H:%M UTC")
        );
    }
    out.push_str("    </footer>\n  </div>\n");

    if !history.is_empty() {
        let current = format!("{}.html", format_iso_date(digest.date));
        out.push_str("  <div class=\"sidebar\">\n    <h4>📅 History</h4>\n");
        for entry in history.iter().take(options.sidebar_days) {
            let page = entry.page_name();
            let class = if page == current { " class=\"active\"" } else { "" };
            let _ = writeln!(
                out,
                "    <a href=\"{}\"{}>{}</a>",
                page,
                class,
                format_iso_date(entry.date)
            );
        }
        out.push_str("  </div>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}

/// Daily page as Markdown.
pub fn render_markdown(digest: &Digest, options: &RenderOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {} - {}\n", SITE_TITLE, format_long_date(digest.date));

    for section in Section::ALL {
        let records = digest.section(section);
        let _ = writeln!(
            out,
            "## {} {} ({})\n",
            section.icon(),
            section.label(),
            records.len()
        );

        if records.is_empty() {
            let _ = writeln!(out, "_{}_\n", section.empty_placeholder());
            continue;
        }

        for (i, record) in records.iter().enumerate() {
            let title = match section {
                Section::News => record.display_title(),
                _ => record.title.as_str(),
            };
            let _ = writeln!(
                out,
                "{}. [{}]({}) · {}",
                i + 1,
                escape_markdown_label(title),
                escape_markdown_url(&record.link),
                record.source
            );
            if !record.authors.is_empty() {
                let _ = writeln!(out, "   - Authors: {}", record.authors.join(", "));
            }
            let summary = summary_for(record, options);
            if !summary.is_empty() {
                let _ = writeln!(out, "   > {}", summary);
            }
            if let Some(ref pdf) = record.pdf {
                let _ = writeln!(out, "   - [PDF]({})", escape_markdown_url(pdf));
            }
        }
        out.push('\n');
    }

    out
}

/// Archive index over every stored day, newest first.
pub fn render_index(history: &[HistoryEntry]) -> String {
    let mut out = page_head(&format!("{} - Archive", SITE_TITLE));
    out.push_str("<body>\n  <div class=\"container\">\n");
    let _ = writeln!(
        out,
        "    <header>\n      <h1>🎤 {}</h1>\n      <p>Archive</p>\n    </header>",
        SITE_TITLE
    );
    out.push_str("    <section>\n      <h2>📅 Past issues</h2>\n");

    if history.is_empty() {
        out.push_str("      <p class=\"empty\">No issues yet</p>\n");
    } else {
        for entry in history {
            let _ = writeln!(out, "      <div class=\"day-item\">");
            let _ = writeln!(
                out,
                "        <a href=\"{}\">{}</a>",
                entry.page_name(),
                escape_html(&format_long_date(entry.date))
            );
            out.push_str("        <div class=\"stats\">");
            for section in Section::ALL {
                let _ = write!(out, "<span>{} {}</span>", section.icon(), entry.count(section));
            }
            out.push_str("</div>\n      </div>\n");
        }
    }

    out.push_str("    </section>\n  </div>\n</body>\n</html>\n");
    out
}

fn card_text(content: String) -> Value {
    json!({ "tag": "div", "text": { "tag": "lark_md", "content": content } })
}

/// Interactive chat card: header, one block per section, link-out button.
pub fn build_card(digest: &Digest, options: &RenderOptions) -> Value {
    let mut elements = Vec::new();

    for section in Section::ALL {
        let records = digest.section(section);
        elements.push(card_text(format!(
            "**{} {}** ({} {})",
            section.icon(),
            section.label(),
            records.len(),
            section.unit()
        )));

        if records.is_empty() {
            elements.push(card_text(format!("_{}_", section.empty_placeholder())));
        } else {
            let mut list = records
                .iter()
                .take(options.card_items)
                .enumerate()
                .map(|(i, record)| {
                    let mut line = format!(
                        "{}. [{}]({})",
                        i + 1,
                        truncate_with_ellipsis(&record.title, options.card_title_chars),
                        escape_markdown_url(&record.link)
                    );
                    if section == Section::Blogs {
                        let _ = write!(line, " - {}", record.source);
                    }
                    line
                })
                .collect::<Vec<_>>()
                .join("\n");
            if records.len() > options.card_items {
                let _ = write!(
                    list,
                    "\n_...and {} more_",
                    records.len() - options.card_items
                );
            }
            elements.push(card_text(list));
        }

        elements.push(json!({ "tag": "hr" }));
    }

    elements.push(json!({
        "tag": "action",
        "actions": [{
            "tag": "button",
            "text": { "tag": "plain_text", "content": "📖 Read the full issue" },
            "type": "primary",
            "url": options.site_url,
        }]
    }));

    json!({
        "config": { "wide_screen_mode": true },
        "header": {
            "title": {
                "tag": "plain_text",
                "content": format!("🎤 {} - {}", SITE_TITLE, format_long_date(digest.date)),
            },
            "template": "blue",
        },
        "elements": elements,
    })
}

/// Plain Markdown message for chat targets without card support.
pub fn render_chat_message(digest: &Digest, options: &RenderOptions) -> String {
    let mut msg = format!(
        "🎤 **{}**\n📅 {}\n",
        SITE_TITLE,
        format_iso_date(digest.date)
    );

    for section in Section::ALL {
        let records = digest.section(section);
        let _ = write!(
            msg,
            "\n**{} {}** ({} {})\n",
            section.icon(),
            section.label(),
            records.len(),
            section.unit()
        );

        if records.is_empty() {
            let _ = writeln!(msg, "_{}_", section.empty_placeholder());
            continue;
        }

        for (i, record) in records.iter().take(options.message_items).enumerate() {
            let _ = writeln!(
                msg,
                "{}. {}",
                i + 1,
                truncate_with_ellipsis(&record.title, options.card_title_chars)
            );
        }
        if records.len() > options.message_items {
            let _ = writeln!(msg, "_...and {} more_", records.len() - options.message_items);
        }
    }

    msg
}
