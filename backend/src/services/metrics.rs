use crate::models::{
    CategorySummary, CountrySummary, CreatorHighlight, DailyMetrics, SnapshotRow, TopVideo,
    VideoHighlight,
};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Numeric columns the dashboard ranks and summarizes by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Views,
    Likes,
    Comments,
    Engagement,
    Duration,
}

impl Metric {
    pub fn parse(name: &str) -> Option<Metric> {
        match name {
            "views" => Some(Metric::Views),
            "likes" => Some(Metric::Likes),
            "comments" => Some(Metric::Comments),
            "engagement" => Some(Metric::Engagement),
            "duration" => Some(Metric::Duration),
            _ => None,
        }
    }

    fn value(&self, row: &SnapshotRow) -> f64 {
        match self {
            Metric::Views => row.video.views as f64,
            Metric::Likes => row.video.likes as f64,
            Metric::Comments => row.video.comments as f64,
            Metric::Engagement => row.engagement_score,
            Metric::Duration => row.video.duration as f64,
        }
    }
}

/// Rows in descending metric order. The sort is stable, so equal values
/// keep snapshot scan order and the first-seen row wins ties.
fn rank_by_metric<'a>(rows: &'a [SnapshotRow], metric: Metric) -> Vec<&'a SnapshotRow> {
    let mut ranked: Vec<&SnapshotRow> = rows.iter().collect();
    ranked.sort_by(|a, b| {
        metric
            .value(b)
            .partial_cmp(&metric.value(a))
            .unwrap_or(Ordering::Equal)
    });
    ranked
}

fn top_one(rows: &[SnapshotRow], metric: Metric) -> Option<VideoHighlight> {
    rank_by_metric(rows, metric).first().map(|row| VideoHighlight {
        video_id: row.video.video_id.clone(),
        title: row.video.title.clone(),
        channel_title: row.video.channel_title.clone(),
        metric_value: metric.value(row),
    })
}

/// The channel with the most rows in the snapshot; ties go to the channel
/// seen first.
fn most_frequent_channel(rows: &[SnapshotRow]) -> Option<CreatorHighlight> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&SnapshotRow> = Vec::new();

    for row in rows {
        let count = counts.entry(row.video.channel_id.as_str()).or_insert(0);
        if *count == 0 {
            first_seen.push(row);
        }
        *count += 1;
    }

    let mut best: Option<(&SnapshotRow, usize)> = None;
    for row in first_seen {
        let count = counts[row.video.channel_id.as_str()];
        if best.map(|(_, best_count)| count > best_count).unwrap_or(true) {
            best = Some((row, count));
        }
    }

    best.map(|(row, count)| CreatorHighlight {
        channel_id: row.video.channel_id.clone(),
        channel_title: row.video.channel_title.clone(),
        video_count: count,
    })
}

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}

/// Summary statistics over a snapshot (or a filtered subset). An empty
/// input yields zero totals and no highlights.
pub fn daily_metrics(rows: &[SnapshotRow]) -> DailyMetrics {
    DailyMetrics {
        total_videos: rows.len(),
        total_views: rows.iter().map(|r| r.video.views).sum(),
        total_likes: rows.iter().map(|r| r.video.likes).sum(),
        total_comments: rows.iter().map(|r| r.video.comments).sum(),
        average_duration: mean(
            rows.iter().map(|r| r.video.duration as f64).sum(),
            rows.len(),
        ),
        average_engagement_score: mean(rows.iter().map(|r| r.engagement_score).sum(), rows.len()),
        most_viewed: top_one(rows, Metric::Views),
        most_liked: top_one(rows, Metric::Likes),
        most_commented: top_one(rows, Metric::Comments),
        most_engaged: top_one(rows, Metric::Engagement),
        longest: top_one(rows, Metric::Duration),
        top_creator: most_frequent_channel(rows),
    }
}

pub fn top_videos(rows: &[SnapshotRow], metric: Metric, count: usize) -> Vec<TopVideo> {
    rank_by_metric(rows, metric)
        .into_iter()
        .take(count)
        .map(|row| TopVideo {
            video_id: row.video.video_id.clone(),
            title: row.video.title.clone(),
            channel_title: row.video.channel_title.clone(),
            country_name: row.country_name.clone(),
            category_name: row.video.category_name.clone(),
            views: row.video.views,
            likes: row.video.likes,
            comments: row.video.comments,
            duration: row.video.duration,
            engagement_score: row.engagement_score,
        })
        .collect()
}

#[derive(Default)]
struct GroupAcc {
    count: usize,
    views: u64,
    likes: u64,
    comments: u64,
    duration: u64,
    engagement: f64,
}

impl GroupAcc {
    fn add(&mut self, row: &SnapshotRow) {
        self.count += 1;
        self.views += row.video.views;
        self.likes += row.video.likes;
        self.comments += row.video.comments;
        self.duration += row.video.duration;
        self.engagement += row.engagement_score;
    }
}

/// Group rows by a key, keeping first-seen group order.
fn group_by<'a, K: Fn(&'a SnapshotRow) -> &'a str>(
    rows: &'a [SnapshotRow],
    key: K,
) -> Vec<(&'a str, GroupAcc)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, GroupAcc)> = Vec::new();

    for row in rows {
        let k = key(row);
        let slot = *index.entry(k).or_insert_with(|| {
            groups.push((k, GroupAcc::default()));
            groups.len() - 1
        });
        groups[slot].1.add(row);
    }

    // Largest groups first; stable, so equal sizes keep first-seen order.
    groups.sort_by(|a, b| b.1.count.cmp(&a.1.count));
    groups
}

pub fn category_summaries(rows: &[SnapshotRow]) -> Vec<CategorySummary> {
    group_by(rows, |row| row.video.category_name.as_str())
        .into_iter()
        .map(|(category_name, acc)| CategorySummary {
            category_name: category_name.to_string(),
            video_count: acc.count,
            avg_views: mean(acc.views as f64, acc.count),
            avg_likes: mean(acc.likes as f64, acc.count),
            avg_comments: mean(acc.comments as f64, acc.count),
            avg_duration: mean(acc.duration as f64, acc.count),
            avg_engagement: mean(acc.engagement, acc.count),
        })
        .collect()
}

pub fn country_summaries(rows: &[SnapshotRow]) -> Vec<CountrySummary> {
    let mut names: HashMap<&str, Option<&str>> = HashMap::new();
    for row in rows {
        names
            .entry(row.video.country.as_str())
            .or_insert_with(|| row.country_name.as_deref());
    }

    group_by(rows, |row| row.video.country.as_str())
        .into_iter()
        .map(|(country, acc)| CountrySummary {
            country: country.to_string(),
            country_name: names
                .get(country)
                .and_then(|name| name.map(String::from)),
            video_count: acc.count,
            total_views: acc.views,
            total_likes: acc.likes,
            total_comments: acc.comments,
            avg_duration: mean(acc.duration as f64, acc.count),
            avg_engagement: mean(acc.engagement, acc.count),
        })
        .collect()
}

/// Subset of a snapshot matching the dashboard's country/category filters.
/// A country filter matches the region code or the display name.
pub fn filter_rows(
    rows: &[SnapshotRow],
    country: Option<&str>,
    category: Option<&str>,
) -> Vec<SnapshotRow> {
    rows.iter()
        .filter(|row| {
            country.is_none_or(|wanted| {
                row.video.country.eq_ignore_ascii_case(wanted)
                    || row
                        .country_name
                        .as_deref()
                        .is_some_and(|name| name.eq_ignore_ascii_case(wanted))
            })
        })
        .filter(|row| {
            category.is_none_or(|wanted| row.video.category_name.eq_ignore_ascii_case(wanted))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrendingVideo;
    use crate::services::snapshot::snapshot_row;
    use std::collections::HashMap;

    fn row(id: &str, country: &str, category: &str, channel: &str, views: u64) -> SnapshotRow {
        let names: HashMap<String, String> = [("IN", "India"), ("US", "United States")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        snapshot_row(
            TrendingVideo {
                country: country.to_string(),
                video_id: id.to_string(),
                title: format!("Video {id}"),
                channel_id: format!("UC_{channel}"),
                channel_title: channel.to_string(),
                category_name: category.to_string(),
                duration: 100,
                views,
                likes: views / 10,
                comments: views / 100,
                ..TrendingVideo::default()
            },
            &names,
        )
    }

    #[test]
    fn empty_snapshot_yields_zeroed_metrics() {
        let metrics = daily_metrics(&[]);

        assert_eq!(metrics.total_videos, 0);
        assert_eq!(metrics.total_views, 0);
        assert_eq!(metrics.average_duration, 0.0);
        assert_eq!(metrics.average_engagement_score, 0.0);
        assert!(metrics.most_viewed.is_none());
        assert!(metrics.top_creator.is_none());
        assert!(top_videos(&[], Metric::Views, 10).is_empty());
        assert!(category_summaries(&[]).is_empty());
        assert!(country_summaries(&[]).is_empty());
    }

    #[test]
    fn top_one_breaks_ties_by_first_seen() {
        let rows = vec![
            row("A", "IN", "Music", "ch1", 10),
            row("B", "IN", "Music", "ch2", 50),
            row("C", "IN", "Music", "ch3", 50),
        ];

        let best = top_one(&rows, Metric::Views).unwrap();
        assert_eq!(best.video_id, "B");
        assert_eq!(best.metric_value, 50.0);
    }

    #[test]
    fn top_videos_ranks_descending_and_truncates() {
        let rows = vec![
            row("A", "IN", "Music", "ch1", 10),
            row("B", "IN", "Music", "ch2", 50),
            row("C", "IN", "Music", "ch3", 50),
            row("D", "IN", "Music", "ch4", 70),
        ];

        let top = top_videos(&rows, Metric::Views, 3);
        let ids: Vec<&str> = top.iter().map(|v| v.video_id.as_str()).collect();

        assert_eq!(ids, vec!["D", "B", "C"]);
    }

    #[test]
    fn daily_metrics_totals_and_means() {
        let rows = vec![
            row("A", "IN", "Music", "ch1", 1000),
            row("B", "IN", "Comedy", "ch2", 3000),
        ];

        let metrics = daily_metrics(&rows);

        assert_eq!(metrics.total_videos, 2);
        assert_eq!(metrics.total_views, 4000);
        assert_eq!(metrics.total_likes, 400);
        assert_eq!(metrics.total_comments, 40);
        assert_eq!(metrics.average_duration, 100.0);
        // Both rows have likes = views/10 and comments = views/100.
        assert!((metrics.average_engagement_score - 0.11).abs() < 1e-9);
        assert_eq!(metrics.most_viewed.unwrap().video_id, "B");
    }

    #[test]
    fn zero_view_rows_stay_in_totals() {
        let rows = vec![
            row("A", "IN", "Music", "ch1", 0),
            row("B", "IN", "Music", "ch2", 100),
        ];

        let metrics = daily_metrics(&rows);

        assert_eq!(metrics.total_videos, 2);
        assert!(metrics.average_engagement_score.is_finite());
    }

    #[test]
    fn most_frequent_channel_counts_rows() {
        let rows = vec![
            row("A", "IN", "Music", "solo", 10),
            row("B", "IN", "Music", "busy", 20),
            row("C", "IN", "Music", "busy", 30),
            row("D", "IN", "Music", "other", 40),
        ];

        let creator = most_frequent_channel(&rows).unwrap();
        assert_eq!(creator.channel_title, "busy");
        assert_eq!(creator.channel_id, "UC_busy");
        assert_eq!(creator.video_count, 2);
    }

    #[test]
    fn most_frequent_channel_tie_goes_to_first_seen() {
        let rows = vec![
            row("A", "IN", "Music", "first", 10),
            row("B", "IN", "Music", "second", 20),
            row("C", "IN", "Music", "first", 30),
            row("D", "IN", "Music", "second", 40),
        ];

        let creator = most_frequent_channel(&rows).unwrap();
        assert_eq!(creator.channel_title, "first");
    }

    #[test]
    fn category_summaries_group_and_average() {
        let rows = vec![
            row("A", "IN", "Music", "ch1", 1000),
            row("B", "IN", "Music", "ch2", 3000),
            row("C", "IN", "Comedy", "ch3", 500),
        ];

        let summaries = category_summaries(&rows);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].category_name, "Music");
        assert_eq!(summaries[0].video_count, 2);
        assert_eq!(summaries[0].avg_views, 2000.0);
        assert_eq!(summaries[1].category_name, "Comedy");
        assert_eq!(summaries[1].video_count, 1);
    }

    #[test]
    fn country_summaries_total_and_name() {
        let rows = vec![
            row("A", "IN", "Music", "ch1", 1000),
            row("B", "IN", "Comedy", "ch2", 3000),
            row("C", "US", "Music", "ch3", 500),
        ];

        let summaries = country_summaries(&rows);

        assert_eq!(summaries[0].country, "IN");
        assert_eq!(summaries[0].country_name.as_deref(), Some("India"));
        assert_eq!(summaries[0].total_views, 4000);
        assert_eq!(summaries[1].country, "US");
        assert_eq!(summaries[1].video_count, 1);
    }

    #[test]
    fn filter_matches_code_or_display_name() {
        let rows = vec![
            row("A", "IN", "Music", "ch1", 10),
            row("B", "US", "Music", "ch2", 20),
        ];

        let by_code = filter_rows(&rows, Some("IN"), None);
        assert_eq!(by_code.len(), 1);
        assert_eq!(by_code[0].video.video_id, "A");

        let by_name = filter_rows(&rows, Some("united states"), None);
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].video.video_id, "B");

        let by_category = filter_rows(&rows, None, Some("music"));
        assert_eq!(by_category.len(), 2);
    }
}
