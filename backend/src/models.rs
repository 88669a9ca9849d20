use rocket::serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminToken(pub String);

/// One trending video as persisted in a daily country partition.
/// Field order is the CSV column order; writer and reader share it.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TrendingVideo {
    pub country: String,
    pub fetched_at: String, // RFC3339
    pub video_id: String,
    pub published_at: String, // RFC3339
    pub title: String,
    pub channel_id: String,
    pub channel_title: String,
    pub category_id: String,
    pub category_name: String,
    pub tags: String, // ", "-joined
    pub tag_count: u64,
    pub duration: u64, // seconds
    pub duration_raw: String,
    pub definition: String,
    pub caption_available: bool,
    pub licensed_content: bool,
    pub embeddable: bool,
    pub made_for_kids: bool,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
}

/// One channel row in the cumulative registry. channel_id is the unique key.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TrendingChannel {
    pub channel_id: String,
    pub title: String,
    pub description: String,
    pub published_at: String,
    pub thumbnail_url: String,
    pub custom_url: String,
    pub default_language: String,
    pub country: String,
    pub subscriber_count: u64,
    pub video_count: u64,
    pub view_count: u64,
    pub banner_url: String,
    pub keywords: String,
    pub topics: String, // taxonomy URLs cleaned to bare labels, ", "-joined
    pub made_for_kids: bool,
    pub privacy_status: String,
}

/// A video row of the resolved latest snapshot, enriched for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotRow {
    #[serde(flatten)]
    pub video: TrendingVideo,
    pub country_name: Option<String>,
    pub engagement_score: f64,
}

#[derive(Debug, Serialize)]
pub struct SnapshotInfo {
    pub date: String,
    pub video_count: usize,
    pub countries: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VideoHighlight {
    pub video_id: String,
    pub title: String,
    pub channel_title: String,
    pub metric_value: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreatorHighlight {
    pub channel_id: String,
    pub channel_title: String,
    pub video_count: usize,
}

#[derive(Debug, Serialize)]
pub struct DailyMetrics {
    pub total_videos: usize,
    pub total_views: u64,
    pub total_likes: u64,
    pub total_comments: u64,
    pub average_duration: f64,
    pub average_engagement_score: f64,
    pub most_viewed: Option<VideoHighlight>,
    pub most_liked: Option<VideoHighlight>,
    pub most_commented: Option<VideoHighlight>,
    pub most_engaged: Option<VideoHighlight>,
    pub longest: Option<VideoHighlight>,
    pub top_creator: Option<CreatorHighlight>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopVideo {
    pub video_id: String,
    pub title: String,
    pub channel_title: String,
    pub country_name: Option<String>,
    pub category_name: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub duration: u64,
    pub engagement_score: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategorySummary {
    pub category_name: String,
    pub video_count: usize,
    pub avg_views: f64,
    pub avg_likes: f64,
    pub avg_comments: f64,
    pub avg_duration: f64,
    pub avg_engagement: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CountrySummary {
    pub country: String,
    pub country_name: Option<String>,
    pub video_count: usize,
    pub total_views: u64,
    pub total_likes: u64,
    pub total_comments: u64,
    pub avg_duration: f64,
    pub avg_engagement: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub started_at: String,
    pub regions_ok: usize,
    pub regions_empty: usize,
    pub regions_failed: usize,
    pub videos_written: usize,
    pub channels_seen: usize,
    pub new_channels: usize,
    pub channel_chunks_failed: usize,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub success: bool,
    pub message: String,
    pub report: Option<IngestReport>,
}

#[derive(Debug, Serialize)]
pub struct AdminStats {
    pub registered_channels: usize,
    pub partition_files: usize,
    pub regions_configured: usize,
    pub data_dir: String,
}
