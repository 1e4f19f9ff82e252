use crate::types::FeedRecord;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;
use tracing::{debug, info, warn};

/// `now` minus `days_back` whole days.
pub fn cutoff(now: DateTime<Utc>, days_back: i64) -> DateTime<Utc> {
    now - Duration::days(days_back)
}

/// Keep records published at or after `cutoff`.
///
/// A record whose timestamp cannot be parsed is kept: losing content on a
/// bad date is worse than showing a stale item.
pub fn filter_recent(records: Vec<FeedRecord>, cutoff: DateTime<Utc>) -> Vec<FeedRecord> {
    let before = records.len();
    let kept: Vec<FeedRecord> = records
        .into_iter()
        .filter(|record| match record.published_at() {
            Some(published) => published >= cutoff,
            None => {
                warn!(
                    "Keeping record with unparsable date {:?}: {}",
                    record.published, record.link
                );
                true
            }
        })
        .collect();

    debug!("Recency filter kept {}/{} records", kept.len(), before);
    kept
}

/// True when `published` falls on a UTC calendar day within `window_days`
/// before `today` (inclusive). A window of 0 means today only. Unknown
/// timestamps count as inside the window.
pub fn in_calendar_window(
    published: Option<DateTime<Utc>>,
    today: NaiveDate,
    window_days: i64,
) -> bool {
    let Some(published) = published else {
        return true;
    };
    let earliest = today - Duration::days(window_days);
    let day = published.date_naive();
    day >= earliest && day <= today
}

/// One item per distinct key, first occurrence wins, order preserved.
pub fn dedup_by<T, K, F>(items: Vec<T>, mut key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

/// Collapse records sharing a link. Empty links count as one key, so
/// several link-less records collapse into the first.
pub fn dedup_by_link(records: Vec<FeedRecord>) -> Vec<FeedRecord> {
    let before = records.len();
    let unique = dedup_by(records, |r| r.link.clone());

    let removed_count = before - unique.len();
    if removed_count > 0 {
        info!("Removed {} duplicate records", removed_count);
    }
    unique
}

/// Sort newest first. Records with unparsable dates go last; ties keep
/// arrival order.
pub fn sort_newest_first(records: &mut [FeedRecord]) {
    records.sort_by(|a, b| match (a.published_at(), b.published_at()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
