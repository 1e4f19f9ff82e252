use chrono::{DateTime, TimeZone, Utc};
use daily_digest::config::{
    FeedSectionConfig, FeedSource, PaperConfig, BLOG_SOURCES, NEWS_SOURCES,
};
use daily_digest::rss_utils::time;
use daily_digest::sources::Paper;
use daily_digest::{
    ArxivSource, FeedRecord, FetchConfig, Fetcher, MissingLink, Result, RssFeedSource, Section,
    SectionSource,
};
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

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 20, 0, 0).unwrap()
}

const NEWS_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Tech News</title>
    <item>
      <title>Model release</title>
      <link>https://news.example/model</link>
      <pubDate>Sun, 18 Oct 2026 18:00:00 +0000</pubDate>
      <description>A new model.</description>
    </item>
    <item>
      <title>Old story</title>
      <link>https://news.example/old</link>
      <pubDate>Thu, 15 Oct 2026 18:00:00 +0000</pubDate>
    </item>
    <item>
      <title>Odd date</title>
      <link>https://news.example/odd</link>
      <pubDate>sometime last week</pubDate>
    </item>
    <item>
      <title>Linkless</title>
      <pubDate>Sun, 18 Oct 2026 17:00:00 +0000</pubDate>
    </item>
  </channel>
</rss>"#;

const BLOG_ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Personal blog</title>
  <entry>
    <title>This week</title>
    <link href="https://blog.example/this-week"/>
    <updated>2026-10-14T08:00:00Z</updated>
    <summary>Notes from this week.</summary>
  </entry>
  <entry>
    <title>Last month</title>
    <link href="https://blog.example/last-month"/>
    <updated>2026-09-20T08:00:00Z</updated>
  </entry>
  <entry>
    <title>No address</title>
    <updated>2026-10-17T08:00:00Z</updated>
  </entry>
</feed>"#;

const ARXIV_ATOM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <id>http://arxiv.org/api/query</id>
  <title type="html">ArXiv Query: search_query=cat:eess.AS</title>
  <updated>2026-10-18T00:00:00-04:00</updated>
  <entry>
    <id>http://arxiv.org/abs/2610.01234v1</id>
    <updated>2026-10-18T09:00:00Z</updated>
    <published>2026-10-18T09:00:00Z</published>
    <title>Streaming   Speech
      Recognition at Scale</title>
    <summary>  We present a streaming
      recognizer.  </summary>
    <author><name>Ada One</name></author>
    <author><name>Bo Two</name></author>
    <author><name>Cy Three</name></author>
    <author><name>Di Four</name></author>
    <link href="http://arxiv.org/abs/2610.01234v1" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2610.01234v1" rel="related" type="application/pdf"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2610.00999v2</id>
    <updated>2026-10-16T12:00:00Z</updated>
    <published>2026-10-16T12:00:00Z</published>
    <title>Older Codec Paper</title>
    <summary>Neural audio codec.</summary>
    <author><name>Ed Five</name></author>
  </entry>
</feed>"#;

fn news_source() -> RssFeedSource {
    RssFeedSource::new(FeedSectionConfig::news(), 200)
}

fn blog_source() -> RssFeedSource {
    RssFeedSource::new(FeedSectionConfig::blogs(), 200)
}

#[test]
fn test_news_keeps_recent_and_undated_items() -> Result<()> {
    init_tracing();

    let source = news_source();
    let records = source.process_document(&NEWS_SOURCES[0], NEWS_RSS.as_bytes(), now())?;
    info!("News feed produced {} records", records.len());

    let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, ["Model release", "Odd date", "Linkless"]);

    assert_eq!(records[0].source, NEWS_SOURCES[0].name);
    assert_eq!(records[0].source_url, None);
    // news keeps link-less items with an empty link
    assert_eq!(records[2].link, "");
    Ok(())
}

#[test]
fn test_news_item_cap_per_feed() -> Result<()> {
    let mut config = FeedSectionConfig::news();
    config.max_items_per_feed = Some(1);
    let source = RssFeedSource::new(config, 200);

    let records = source.process_document(&NEWS_SOURCES[0], NEWS_RSS.as_bytes(), now())?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Model release");
    Ok(())
}

#[test]
fn test_blogs_use_week_window_and_drop_linkless() -> Result<()> {
    init_tracing();

    let source = blog_source();
    let blog = &BLOG_SOURCES[1];
    let records = source.process_document(blog, BLOG_ATOM.as_bytes(), now())?;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "This week");
    assert_eq!(records[0].link, "https://blog.example/this-week");
    assert_eq!(records[0].summary, "Notes from this week.");
    assert_eq!(records[0].source, blog.name);
    assert_eq!(records[0].source_url.as_deref(), Some(blog.homepage));
    Ok(())
}

#[test]
fn test_section_configs() {
    let news = news_source();
    assert_eq!(news.section(), Section::News);
    assert_eq!(news.sources().len(), NEWS_SOURCES.len());
    assert_eq!(news.source_name(), "news feeds");

    let blogs = blog_source();
    assert_eq!(blogs.section(), Section::Blogs);
    assert_eq!(FeedSectionConfig::blogs().missing_link, MissingLink::Drop);
}

#[test]
fn test_arxiv_query_url() -> Result<()> {
    let source = ArxivSource::new(PaperConfig::default());
    let query = source.query_url("eess.AS")?;

    assert_eq!(query.host_str(), Some("export.arxiv.org"));
    assert_eq!(query.path(), "/api/query");

    let pairs: Vec<(String, String)> = query
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert!(pairs.contains(&("search_query".to_string(), "cat:eess.AS".to_string())));
    assert!(pairs.contains(&("sortBy".to_string(), "submittedDate".to_string())));
    assert!(pairs.contains(&("sortOrder".to_string(), "descending".to_string())));
    assert!(pairs.contains(&("max_results".to_string(), "30".to_string())));
    Ok(())
}

#[test]
fn test_arxiv_entries_become_papers() -> Result<()> {
    init_tracing();

    let source = ArxivSource::new(PaperConfig::default());
    let papers = source.parse_papers(ARXIV_ATOM.as_bytes(), "eess.AS", now())?;
    assert_eq!(papers.len(), 2);

    let paper = &papers[0];
    assert_eq!(paper.title, "Streaming Speech Recognition at Scale");
    assert_eq!(paper.summary, "We present a streaming recognizer.");
    assert_eq!(paper.authors, ["Ada One", "Bo Two", "Cy Three"]);
    assert_eq!(paper.link, "http://arxiv.org/abs/2610.01234v1");
    assert_eq!(paper.pdf, "http://arxiv.org/pdf/2610.01234v1.pdf");
    assert_eq!(paper.category, "eess.AS");

    let record = FeedRecord::from(paper.clone());
    assert_eq!(record.source, "arXiv eess.AS");
    assert_eq!(record.category.as_deref(), Some("eess.AS"));
    assert_eq!(record.pdf.as_deref(), Some("http://arxiv.org/pdf/2610.01234v1.pdf"));
    assert_eq!(record.authors.len(), 3);
    assert_eq!(
        record.published_at(),
        Some(Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap())
    );
    Ok(())
}

#[test]
fn test_arxiv_day_window() -> Result<()> {
    let today_only = ArxivSource::new(PaperConfig::default());
    let papers = today_only.process_document(ARXIV_ATOM.as_bytes(), "cs.SD", now())?;
    assert_eq!(papers.len(), 1);
    assert_eq!(papers[0].id, "http://arxiv.org/abs/2610.01234v1");

    let three_days = ArxivSource::new(PaperConfig {
        window_days: 2,
        ..Default::default()
    });
    let papers = three_days.process_document(ARXIV_ATOM.as_bytes(), "cs.SD", now())?;
    assert_eq!(papers.len(), 2);
    Ok(())
}

#[test]
fn test_arxiv_rejects_non_feed_body() {
    let source = ArxivSource::new(PaperConfig::default());
    assert!(source.parse_papers(b"rate limited", "cs.SD", now()).is_err());
}

#[tokio::test]
async fn test_unreachable_sources_contribute_nothing() -> Result<()> {
    init_tracing();

    let fetcher = Fetcher::new(FetchConfig {
        timeout_seconds: 2,
        ..Default::default()
    })?;

    let mut config = FeedSectionConfig::news();
    config.sources = vec![FeedSource {
        name: "Offline",
        homepage: "http://127.0.0.1:9/",
        feed_url: "http://127.0.0.1:9/feed.xml",
    }];
    let feeds = RssFeedSource::new(config, 200);
    assert!(feeds.collect(&fetcher, now()).await.is_empty());

    let papers = ArxivSource::new(PaperConfig {
        api_url: "http://127.0.0.1:9/api/query".to_string(),
        ..Default::default()
    });
    assert!(papers.collect(&fetcher, now()).await.is_empty());
    Ok(())
}

#[test]
fn test_timestamp_helpers() {
    let date = time::parse_iso_date("2026-10-18").unwrap();
    assert_eq!(time::format_iso_date(date), "2026-10-18");
    assert_eq!(time::format_long_date(date), "Sunday, October 18, 2026");
    assert!(time::parse_iso_date("index").is_none());
    assert_eq!(
        time::parse_timestamp("2026-10-18 06:30:00"),
        Some(Utc.with_ymd_and_hms(2026, 10, 18, 6, 30, 0).unwrap())
    );
}

fn paper(id: &str, category: &str) -> Paper {
    Paper {
        id: format!("http://arxiv.org/abs/{}", id),
        title: format!("Paper {}", id),
        authors: vec!["Ada One".to_string()],
        summary: String::new(),
        published: "2026-10-18T09:00:00Z".to_string(),
        category: category.to_string(),
        link: format!("http://arxiv.org/abs/{}", id),
        pdf: format!("http://arxiv.org/pdf/{}.pdf", id),
    }
}

#[test]
fn test_cross_listed_paper_appears_once() {
    init_tracing();

    let audio = vec![paper("2610.00001v1", "eess.AS"), paper("2610.00002v1", "eess.AS")];
    let sound = vec![paper("2610.00002v1", "cs.SD"), paper("2610.00003v1", "cs.SD")];

    let records = ArxivSource::merge(vec![audio, sound]);
    let links: Vec<_> = records.iter().map(|r| r.link.as_str()).collect();
    assert_eq!(
        links,
        [
            "http://arxiv.org/abs/2610.00001v1",
            "http://arxiv.org/abs/2610.00002v1",
            "http://arxiv.org/abs/2610.00003v1",
        ]
    );

    // the copy from the first category is kept
    assert_eq!(records[1].category.as_deref(), Some("eess.AS"));
    assert_eq!(records[1].source, "arXiv eess.AS");
    assert_eq!(records[2].source, "arXiv cs.SD");
}

#[test]
fn test_merge_of_nothing_is_empty() {
    assert!(ArxivSource::merge(Vec::new()).is_empty());
    assert!(ArxivSource::merge(vec![Vec::new(), Vec::new()]).is_empty());
}

#[tokio::test]
async fn test_non_http_feed_urls_are_skipped() -> Result<()> {
    init_tracing();

    let fetcher = Fetcher::new(FetchConfig::default())?;
    let mut config = FeedSectionConfig::blogs();
    config.sources = vec![
        FeedSource {
            name: "Local file",
            homepage: "https://blog.example/",
            feed_url: "file:///etc/hostname",
        },
        FeedSource {
            name: "Relative",
            homepage: "https://blog.example/",
            feed_url: "/feed.xml",
        },
    ];

    let source = RssFeedSource::new(config, 200);
    assert!(source.collect(&fetcher, now()).await.is_empty());
    Ok(())
}
