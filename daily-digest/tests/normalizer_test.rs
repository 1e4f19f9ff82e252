use chrono::{TimeZone, Utc};
use daily_digest::parser::{FeedKind, NormalizeOptions};
use daily_digest::xml::XmlNode;
use daily_digest::{FeedParser, MissingLink, Result};
use std::sync::Once;
use tracing::info;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .try_init()
            .ok();
    });
}

const RSS_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Example News</title>
    <item>
      <title>First &amp; foremost</title>
      <link>https://example.com/first</link>
      <pubDate>Sat, 17 Oct 2026 08:30:00 GMT</pubDate>
      <description><![CDATA[<p>Some <b>bold</b> news.</p>]]></description>
    </item>
    <item>
      <title><![CDATA[Second story]]></title>
      <link>https://example.com/second</link>
      <dc:date>2026-10-16T10:00:00Z</dc:date>
      <description>Plain summary</description>
    </item>
    <item>
      <title>No link here</title>
      <description>Lost</description>
    </item>
  </channel>
</rss>"#;

const ATOM_FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Blog</title>
  <entry>
    <title type="text">Alternate wins</title>
    <link rel="self" href="https://blog.example/self/1"/>
    <link rel="alternate" href="https://blog.example/posts/1"/>
    <id>tag:blog.example,2026:1</id>
    <published>2026-10-17T09:00:00Z</published>
    <summary type="html">&lt;p&gt;Hello &lt;em&gt;Atom&lt;/em&gt;&lt;/p&gt;</summary>
  </entry>
  <entry>
    <title>First link fallback</title>
    <link rel="enclosure" href="https://blog.example/audio/2.mp3"/>
    <link rel="related" href="https://blog.example/related/2"/>
    <id>tag:blog.example,2026:2</id>
    <updated>2026-10-16T09:00:00Z</updated>
  </entry>
  <entry>
    <title>Id fallback</title>
    <id>https://blog.example/posts/3</id>
    <updated>2026-10-15T09:00:00Z</updated>
    <content type="html">&lt;div&gt;Body text&lt;/div&gt;</content>
  </entry>
</feed>"#;

fn parser(missing_link: MissingLink) -> FeedParser {
    let run_time = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
    FeedParser::new(NormalizeOptions {
        missing_link,
        ..Default::default()
    })
    .with_run_time(run_time)
}

#[test]
fn test_rss_items_become_plain_records() -> Result<()> {
    init_tracing();

    let records = parser(MissingLink::Drop).parse_feed(RSS_FEED.as_bytes(), "Example")?;
    info!("Normalized {} RSS records", records.len());

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].title, "First & foremost");
    assert_eq!(records[0].link, "https://example.com/first");
    assert_eq!(records[0].published, "Sat, 17 Oct 2026 08:30:00 GMT");
    assert_eq!(records[0].summary, "Some bold news.");
    assert_eq!(records[0].source, "Example");

    assert_eq!(records[1].title, "Second story");
    assert_eq!(records[1].published, "2026-10-16T10:00:00Z");

    for record in &records {
        assert!(!record.title.contains('<'));
        assert!(!record.link.is_empty());
    }
    Ok(())
}

#[test]
fn test_rss_missing_link_policies() -> Result<()> {
    init_tracing();

    let dropped = parser(MissingLink::Drop).parse_feed(RSS_FEED.as_bytes(), "Example")?;
    assert!(dropped.iter().all(|r| r.title != "No link here"));

    let kept = parser(MissingLink::Empty).parse_feed(RSS_FEED.as_bytes(), "Example")?;
    assert_eq!(kept.len(), 3);
    assert_eq!(kept[2].title, "No link here");
    assert_eq!(kept[2].link, "");
    Ok(())
}

#[test]
fn test_atom_link_resolution_order() -> Result<()> {
    init_tracing();

    let records = parser(MissingLink::Drop).parse_feed(ATOM_FEED.as_bytes(), "Blog")?;
    assert_eq!(records.len(), 3);

    // rel="alternate" beats an earlier rel="self"
    assert_eq!(records[0].link, "https://blog.example/posts/1");
    // no alternate: first link
    assert_eq!(records[1].link, "https://blog.example/audio/2.mp3");
    // no links at all: entry id
    assert_eq!(records[2].link, "https://blog.example/posts/3");
    Ok(())
}

#[test]
fn test_atom_fields() -> Result<()> {
    init_tracing();

    let records = parser(MissingLink::Drop).parse_feed(ATOM_FEED.as_bytes(), "Blog")?;

    assert_eq!(records[0].title, "Alternate wins");
    assert_eq!(records[0].summary, "Hello Atom");
    assert_eq!(records[0].published, "2026-10-17T09:00:00Z");
    // updated is used when published is absent
    assert_eq!(records[1].published, "2026-10-16T09:00:00Z");
    // content stands in for a missing summary
    assert_eq!(records[2].summary, "Body text");
    Ok(())
}

#[test]
fn test_undated_item_gets_run_time() -> Result<()> {
    let xml = r#"<rss><channel><item><title>T</title><link>https://x/a</link></item></channel></rss>"#;
    let records = parser(MissingLink::Drop).parse_feed(xml.as_bytes(), "X")?;

    let expected = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
    assert_eq!(records[0].published_at(), Some(expected));
    Ok(())
}

#[test]
fn test_summary_is_truncated_to_budget() -> Result<()> {
    let long = "word ".repeat(100);
    let xml = format!(
        "<rss><channel><item><title>T</title><link>https://x/a</link><description>{}</description></item></channel></rss>",
        long
    );
    let records = parser(MissingLink::Drop).parse_feed(xml.as_bytes(), "X")?;
    assert_eq!(records[0].summary.chars().count(), 200);
    Ok(())
}

#[test]
fn test_unknown_document_shape_yields_nothing() -> Result<()> {
    init_tracing();

    let xml = r#"<html><body><p>Not a feed</p></body></html>"#;
    let root = XmlNode::parse(xml.as_bytes())?;
    assert_eq!(FeedKind::detect(&root), None);

    let records = parser(MissingLink::Empty).normalize(&root, "Broken");
    assert!(records.is_empty());
    Ok(())
}

#[test]
fn test_malformed_xml_is_an_error() {
    let result = parser(MissingLink::Drop).parse_feed(b"<rss><channel><item>", "Broken");
    assert!(result.is_err());
}

#[test]
fn test_prefixed_atom_feed() -> Result<()> {
    init_tracing();

    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<atom:feed xmlns:atom="http://www.w3.org/2005/Atom">
  <atom:title>Prefixed</atom:title>
  <atom:entry>
    <atom:title>T</atom:title>
    <atom:link href="https://x/a"/>
    <atom:updated>2026-10-17T09:00:00Z</atom:updated>
    <atom:summary>Short note</atom:summary>
  </atom:entry>
  <atom:entry>
    <atom:title>Only an id</atom:title>
    <atom:id>https://x/b</atom:id>
  </atom:entry>
</atom:feed>"#;

    let records = parser(MissingLink::Drop).parse_feed(xml.as_bytes(), "Prefixed")?;
    info!("Prefixed Atom feed produced {} records", records.len());

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].title, "T");
    assert_eq!(records[0].link, "https://x/a");
    assert_eq!(records[0].published, "2026-10-17T09:00:00Z");
    assert_eq!(records[0].summary, "Short note");
    assert_eq!(records[1].link, "https://x/b");
    Ok(())
}

#[test]
fn test_rss_ignores_embedded_atom_link() -> Result<()> {
    let xml = r#"<rss xmlns:atom="http://www.w3.org/2005/Atom"><channel><item>
        <title>T</title>
        <atom:link href="https://x/self" rel="self"/>
        <link>https://x/item</link>
    </item></channel></rss>"#;
    let records = parser(MissingLink::Drop).parse_feed(xml.as_bytes(), "X")?;
    assert_eq!(records[0].link, "https://x/item");
    Ok(())
}

#[test]
fn test_rss_link_from_href_attribute() -> Result<()> {
    let xml = r#"<rss><channel><item><title>T</title><link href="https://x/h"/></item></channel></rss>"#;
    let records = parser(MissingLink::Drop).parse_feed(xml.as_bytes(), "X")?;
    assert_eq!(records[0].link, "https://x/h");
    Ok(())
}

#[test]
fn test_atom_typed_html_title_is_flattened() -> Result<()> {
    let xml = r#"<feed><entry><title type="html">&lt;b&gt;Bold&lt;/b&gt; move</title><id>urn:1</id></entry></feed>"#;
    let records = parser(MissingLink::Drop).parse_feed(xml.as_bytes(), "X")?;
    assert_eq!(records[0].title, "Bold move");
    assert_eq!(records[0].link, "urn:1");
    Ok(())
}

#[test]
fn test_missing_title_becomes_untitled() -> Result<()> {
    let xml = r#"<rss><channel><item><link>https://x/a</link></item></channel></rss>"#;
    let records = parser(MissingLink::Drop).parse_feed(xml.as_bytes(), "X")?;
    assert_eq!(records[0].title, "Untitled");
    Ok(())
}

#[test]
fn test_max_items_caps_each_feed() -> Result<()> {
    let items: String = (0..30)
        .map(|i| format!("<item><title>{i}</title><link>https://x/{i}</link></item>"))
        .collect();
    let xml = format!("<rss><channel>{items}</channel></rss>");
    let options = NormalizeOptions {
        max_items: Some(20),
        ..Default::default()
    };
    let records = FeedParser::new(options).parse_feed(xml.as_bytes(), "X")?;
    assert_eq!(records.len(), 20);
    assert_eq!(records[19].link, "https://x/19");
    Ok(())
}
