use crate::config::{self, YOUTUBE_API_KEY};
use crate::models::{TrendingChannel, TrendingVideo};
use crate::utils::parse_iso8601_duration_to_seconds;
use anyhow::{anyhow, Result};
use chrono::Utc;
use log::debug;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;

// Documentation: https://developers.google.com/youtube/v3/docs/videos
const VIDEOS_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/videos";
const CHANNELS_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/channels";

/// Platform per-call maximum; results past the first page are not fetched.
const MAX_RESULTS: usize = 50;

/// The channels endpoint rejects batches above this size. Callers chunk.
pub const CHANNEL_BATCH_LIMIT: usize = 50;

/// Fetch the "most popular" list for one region, flattened to one record
/// per video in platform rank order.
pub async fn fetch_trending_videos(
    client: &Client,
    region: &str,
    categories: &HashMap<String, String>,
) -> Result<Vec<TrendingVideo>> {
    let api_key = &*YOUTUBE_API_KEY;
    let url = format!(
        "{VIDEOS_ENDPOINT}?part=snippet,statistics,contentDetails,status&chart=mostPopular&regionCode={region}&maxResults={MAX_RESULTS}&key={api_key}"
    );

    let response = client.get(&url).send().await?;
    if !response.status().is_success() {
        return Err(anyhow!(
            "videos.list for {region} returned status {}",
            response.status()
        ));
    }

    let body = response.json::<Value>().await?;
    let fetched_at = Utc::now().to_rfc3339();
    let items = body["items"].as_array().cloned().unwrap_or_default();
    debug!("videos.list for {region}: {} items", items.len());

    Ok(items
        .iter()
        .map(|item| video_from_item(item, region, &fetched_at, categories))
        .collect())
}

/// Fetch channel details for up to [`CHANNEL_BATCH_LIMIT`] IDs in one call.
pub async fn fetch_channels(
    client: &Client,
    channel_ids: &[String],
) -> Result<Vec<TrendingChannel>> {
    let api_key = &*YOUTUBE_API_KEY;
    let ids = channel_ids.join(",");
    let url = format!(
        "{CHANNELS_ENDPOINT}?part=snippet,statistics,brandingSettings,status,topicDetails&id={ids}&key={api_key}"
    );

    let response = client.get(&url).send().await?;
    if !response.status().is_success() {
        return Err(anyhow!(
            "channels.list returned status {}",
            response.status()
        ));
    }

    let body = response.json::<Value>().await?;
    let items = body["items"].as_array().cloned().unwrap_or_default();
    debug!("channels.list: {} of {} items", items.len(), channel_ids.len());

    Ok(items.iter().map(channel_from_item).collect())
}

/// Flatten one videos.list item. Fields the platform omits (disabled
/// counters, no tags) default instead of failing the record.
fn video_from_item(
    item: &Value,
    region: &str,
    fetched_at: &str,
    categories: &HashMap<String, String>,
) -> TrendingVideo {
    let snippet = &item["snippet"];
    let stats = &item["statistics"];
    let content = &item["contentDetails"];
    let status = &item["status"];

    let tags: Vec<&str> = snippet["tags"]
        .as_array()
        .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();
    let category_id = snippet["categoryId"].as_str().unwrap_or("").to_string();
    let duration_raw = content["duration"].as_str().unwrap_or("").to_string();

    TrendingVideo {
        country: region.to_string(),
        fetched_at: fetched_at.to_string(),
        video_id: item["id"].as_str().unwrap_or("").to_string(),
        published_at: snippet["publishedAt"].as_str().unwrap_or("").to_string(),
        title: snippet["title"].as_str().unwrap_or("").to_string(),
        channel_id: snippet["channelId"].as_str().unwrap_or("").to_string(),
        channel_title: snippet["channelTitle"].as_str().unwrap_or("").to_string(),
        category_name: config::lookup_category_name(categories, &category_id),
        category_id,
        tag_count: tags.len() as u64,
        tags: tags.join(", "),
        duration: parse_iso8601_duration_to_seconds(&duration_raw),
        duration_raw,
        definition: content["definition"].as_str().unwrap_or("").to_string(),
        caption_available: content["caption"]
            .as_str()
            .map(|s| s == "true")
            .unwrap_or(false),
        licensed_content: content["licensedContent"].as_bool().unwrap_or(false),
        embeddable: status["embeddable"].as_bool().unwrap_or(false),
        made_for_kids: status["madeForKids"].as_bool().unwrap_or(false),
        views: count_field(stats, "viewCount"),
        likes: count_field(stats, "likeCount"),
        comments: count_field(stats, "commentCount"),
    }
}

/// Flatten one channels.list item. Topic categories arrive as Wikipedia
/// taxonomy URLs; only the trailing label is kept.
fn channel_from_item(item: &Value) -> TrendingChannel {
    let snippet = &item["snippet"];
    let stats = &item["statistics"];
    let branding = &item["brandingSettings"];
    let status = &item["status"];

    let topics: Vec<String> = item["topicDetails"]["topicCategories"]
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str())
                .map(|url| url.rsplit('/').next().unwrap_or(url).to_string())
                .collect()
        })
        .unwrap_or_default();

    TrendingChannel {
        channel_id: item["id"].as_str().unwrap_or("").to_string(),
        title: snippet["title"].as_str().unwrap_or("").to_string(),
        description: snippet["description"].as_str().unwrap_or("").to_string(),
        published_at: snippet["publishedAt"].as_str().unwrap_or("").to_string(),
        thumbnail_url: snippet["thumbnails"]["high"]["url"]
            .as_str()
            .unwrap_or("")
            .to_string(),
        custom_url: snippet["customUrl"].as_str().unwrap_or("").to_string(),
        default_language: snippet["defaultLanguage"].as_str().unwrap_or("").to_string(),
        country: snippet["country"].as_str().unwrap_or("").to_string(),
        subscriber_count: count_field(stats, "subscriberCount"),
        video_count: count_field(stats, "videoCount"),
        view_count: count_field(stats, "viewCount"),
        banner_url: branding["image"]["bannerExternalUrl"]
            .as_str()
            .unwrap_or("")
            .to_string(),
        keywords: branding["channel"]["keywords"]
            .as_str()
            .unwrap_or("")
            .to_string(),
        topics: topics.join(", "),
        made_for_kids: status["madeForKids"].as_bool().unwrap_or(false),
        privacy_status: status["privacyStatus"].as_str().unwrap_or("").to_string(),
    }
}

/// Statistics counters arrive as decimal strings; disabled counters are
/// simply absent and count as zero.
fn count_field(stats: &Value, key: &str) -> u64 {
    match &stats[key] {
        Value::String(s) => s.parse().unwrap_or(0),
        Value::Number(n) => n.as_u64().unwrap_or(0),
        _ => 0,
    }
}
