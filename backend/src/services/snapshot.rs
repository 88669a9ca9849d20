use crate::config::{self, COUNTRY_NAMES, DATA_DIR, SNAPSHOT_CACHE_TTL_SECS};
use crate::models::{SnapshotRow, TrendingVideo};
use crate::services::store;
use chrono::{DateTime, Local, NaiveDate, NaiveTime};
use log::{info, warn};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Ingestion for the current day is expected to have finished by this
/// local time; before it, the dashboard serves yesterday's complete
/// snapshot instead of a partial one.
const CUTOVER_HOUR: u32 = 6;
const CUTOVER_MINUTE: u32 = 10;

/// The calendar day whose partitions are the authoritative latest snapshot.
pub fn resolve_snapshot_date(now: DateTime<Local>) -> NaiveDate {
    let cutover = NaiveTime::from_hms_opt(CUTOVER_HOUR, CUTOVER_MINUTE, 0)
        .expect("cutover time-of-day must be valid");
    if now.time() > cutover {
        now.date_naive()
    } else {
        now.date_naive().pred_opt().unwrap_or_else(|| now.date_naive())
    }
}

/// (likes + comments) / views. Defined as 0.0 when the view counter is
/// zero or hidden, so the column stays sortable and never NaN or infinite.
pub fn engagement_score(views: u64, likes: u64, comments: u64) -> f64 {
    if views == 0 {
        return 0.0;
    }
    (likes as f64 + comments as f64) / views as f64
}

pub fn snapshot_row(video: TrendingVideo, country_names: &HashMap<String, String>) -> SnapshotRow {
    let country_name = config::lookup_country_name(country_names, &video.country);
    let engagement_score = engagement_score(video.views, video.likes, video.comments);
    SnapshotRow {
        video,
        country_name,
        engagement_score,
    }
}

/// Concatenate every region's partition for the given day. A missing tree
/// or unreadable partition degrades to fewer rows, never an error.
pub fn load_snapshot(
    data_dir: &Path,
    date: NaiveDate,
    country_names: &HashMap<String, String>,
) -> Vec<SnapshotRow> {
    let mut rows = Vec::new();
    for path in store::scan_video_partitions(data_dir, date) {
        match store::read_video_partition(&path) {
            Ok(videos) => rows.extend(
                videos
                    .into_iter()
                    .map(|video| snapshot_row(video, country_names)),
            ),
            Err(e) => warn!("Skipping unreadable partition {}: {e:?}", path.display()),
        }
    }
    rows
}

struct CachedSnapshot {
    date: NaiveDate,
    loaded_at: Instant,
    rows: Arc<Vec<SnapshotRow>>,
}

/// Snapshot loads re-scan the partition tree, so dashboard interactions
/// share one result for a bounded time.
pub struct SnapshotCache {
    inner: Mutex<Option<CachedSnapshot>>,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotCache {
    pub fn new() -> Self {
        SnapshotCache {
            inner: Mutex::new(None),
        }
    }

    /// The current snapshot and its resolved date, reloaded when the cache
    /// entry is older than the TTL or the resolved date has rolled over.
    pub async fn latest(&self) -> (NaiveDate, Arc<Vec<SnapshotRow>>) {
        let date = resolve_snapshot_date(Local::now());
        let ttl = Duration::from_secs(*SNAPSHOT_CACHE_TTL_SECS);

        let mut guard = self.inner.lock().await;
        if let Some(cached) = guard.as_ref() {
            if cached.date == date && cached.loaded_at.elapsed() < ttl {
                return (date, cached.rows.clone());
            }
        }

        let rows = Arc::new(load_snapshot(&DATA_DIR, date, &COUNTRY_NAMES));
        info!("Loaded snapshot for {date}: {} rows", rows.len());
        *guard = Some(CachedSnapshot {
            date,
            loaded_at: Instant::now(),
            rows: rows.clone(),
        });

        (date, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn names() -> HashMap<String, String> {
        [("IN", "India"), ("US", "United States")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn before_cutover_resolves_to_yesterday() {
        let now = Local.with_ymd_and_hms(2025, 8, 2, 6, 9, 0).unwrap();
        assert_eq!(
            resolve_snapshot_date(now),
            NaiveDate::from_ymd_opt(2025, 8, 1).unwrap()
        );
    }

    #[test]
    fn after_cutover_resolves_to_today() {
        let now = Local.with_ymd_and_hms(2025, 8, 2, 6, 11, 0).unwrap();
        assert_eq!(
            resolve_snapshot_date(now),
            NaiveDate::from_ymd_opt(2025, 8, 2).unwrap()
        );
    }

    #[test]
    fn cutover_crosses_month_boundary() {
        let now = Local.with_ymd_and_hms(2025, 8, 1, 0, 30, 0).unwrap();
        assert_eq!(
            resolve_snapshot_date(now),
            NaiveDate::from_ymd_opt(2025, 7, 31).unwrap()
        );
    }

    #[test]
    fn engagement_is_ratio_of_reactions_to_views() {
        assert_eq!(engagement_score(1000, 100, 20), 0.12);
    }

    #[test]
    fn engagement_with_zero_views_is_sentinel() {
        let score = engagement_score(0, 500, 100);
        assert_eq!(score, 0.0);
        assert!(score.is_finite());
    }

    #[test]
    fn snapshot_row_resolves_country_name() {
        let video = TrendingVideo {
            country: "IN".to_string(),
            views: 10,
            likes: 1,
            ..TrendingVideo::default()
        };
        let row = snapshot_row(video, &names());
        assert_eq!(row.country_name.as_deref(), Some("India"));
        assert_eq!(row.engagement_score, 0.1);
    }

    #[test]
    fn snapshot_row_unknown_region_has_no_name() {
        let video = TrendingVideo {
            country: "XX".to_string(),
            ..TrendingVideo::default()
        };
        let row = snapshot_row(video, &names());
        assert_eq!(row.country_name, None);
    }

    #[test]
    fn load_snapshot_concatenates_regions_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 8, 2).unwrap();

        let us = TrendingVideo {
            country: "US".to_string(),
            video_id: "us_vid".to_string(),
            ..TrendingVideo::default()
        };
        let india = TrendingVideo {
            country: "IN".to_string(),
            video_id: "in_vid".to_string(),
            ..TrendingVideo::default()
        };
        store::write_video_partition(dir.path(), "US", date, &[us]).unwrap();
        store::write_video_partition(dir.path(), "IN", date, &[india]).unwrap();

        let rows = load_snapshot(dir.path(), date, &names());
        let ids: Vec<&str> = rows.iter().map(|r| r.video.video_id.as_str()).collect();

        assert_eq!(ids, vec!["in_vid", "us_vid"]);
        assert_eq!(rows[0].country_name.as_deref(), Some("India"));
    }

    #[test]
    fn load_snapshot_with_no_partitions_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 8, 2).unwrap();
        assert!(load_snapshot(dir.path(), date, &names()).is_empty());
    }
}
