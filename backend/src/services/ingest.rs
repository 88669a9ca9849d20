use crate::config::{CATEGORY_NAMES, DATA_DIR, FETCH_DELAY_MS, REGIONS};
use crate::models::{IngestReport, TrendingChannel};
use crate::services::{store, youtube};
use crate::utils::chunk_ids;
use anyhow::{Context, Result};
use chrono::{Local, Utc};
use log::{error, info};
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;

/// One full ingest run: fetch and persist every region's trending list for
/// today, then register any channels not seen before. Idempotent per day:
/// re-running overwrites the same partitions and adds no duplicate channels.
///
/// A failing region or channel batch is logged and skipped; the next run
/// picks its channels up again through the registry diff.
pub async fn run_ingest(client: &Client) -> Result<IngestReport> {
    let today = Local::now().date_naive();
    let mut report = IngestReport {
        started_at: Utc::now().to_rfc3339(),
        regions_ok: 0,
        regions_empty: 0,
        regions_failed: 0,
        videos_written: 0,
        channels_seen: 0,
        new_channels: 0,
        channel_chunks_failed: 0,
    };

    info!("Starting ingest run for {today} ({} regions)", REGIONS.len());

    let mut seen_channels: HashSet<String> = HashSet::new();

    for region in REGIONS.iter() {
        match youtube::fetch_trending_videos(client, region, &CATEGORY_NAMES).await {
            Ok(videos) if videos.is_empty() => {
                info!("No trending data for {region}, skipping.");
                report.regions_empty += 1;
            }
            Ok(videos) => match store::write_video_partition(&DATA_DIR, region, today, &videos) {
                Ok(path) => {
                    info!("Saved {} videos -> {}", videos.len(), path.display());
                    seen_channels.extend(
                        videos
                            .iter()
                            .filter(|v| !v.channel_id.is_empty())
                            .map(|v| v.channel_id.clone()),
                    );
                    report.regions_ok += 1;
                    report.videos_written += videos.len();
                }
                Err(e) => {
                    error!("Failed to write partition for {region}: {e:?}");
                    report.regions_failed += 1;
                }
            },
            Err(e) => {
                error!("Error fetching {region}: {e:?}");
                report.regions_failed += 1;
            }
        }

        // Avoid API quota bursts
        tokio::time::sleep(Duration::from_millis(*FETCH_DELAY_MS)).await;
    }

    report.channels_seen = seen_channels.len();

    let registry =
        store::load_channel_registry(&DATA_DIR).context("Failed to load channel registry")?;
    let new_ids = diff_new_channels(&seen_channels, &registry);

    if new_ids.is_empty() {
        info!("No new channels to register.");
        return Ok(report);
    }

    info!(
        "Fetching {} new channels in batches of {}...",
        new_ids.len(),
        youtube::CHANNEL_BATCH_LIMIT
    );

    let mut new_channels: Vec<TrendingChannel> = Vec::new();
    for chunk in chunk_ids(&new_ids, youtube::CHANNEL_BATCH_LIMIT) {
        match youtube::fetch_channels(client, &chunk).await {
            Ok(channels) => new_channels.extend(channels),
            Err(e) => {
                error!("Error fetching channel batch of {}: {e:?}", chunk.len());
                report.channel_chunks_failed += 1;
            }
        }
        tokio::time::sleep(Duration::from_millis(*FETCH_DELAY_MS)).await;
    }

    report.new_channels = store::merge_channel_registry(&DATA_DIR, &new_channels)
        .context("Failed to update channel registry")?;

    info!(
        "Ingest run complete: {} regions ok, {} empty, {} failed, {} videos written, {} new channels",
        report.regions_ok,
        report.regions_empty,
        report.regions_failed,
        report.videos_written,
        report.new_channels
    );

    Ok(report)
}

/// Channel IDs seen this run that the registry does not know yet, in a
/// deterministic order for batching.
pub fn diff_new_channels(seen: &HashSet<String>, registry: &[TrendingChannel]) -> Vec<String> {
    let known: HashSet<&str> = registry
        .iter()
        .map(|channel| channel.channel_id.as_str())
        .collect();

    let mut new_ids: Vec<String> = seen
        .iter()
        .filter(|id| !known.contains(id.as_str()))
        .cloned()
        .collect();
    new_ids.sort();
    new_ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(id: &str) -> TrendingChannel {
        TrendingChannel {
            channel_id: id.to_string(),
            ..TrendingChannel::default()
        }
    }

    #[test]
    fn diff_excludes_registered_channels() {
        let seen: HashSet<String> = ["UC1", "UC2", "UC3"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let registry = vec![channel("UC2")];

        assert_eq!(diff_new_channels(&seen, &registry), vec!["UC1", "UC3"]);
    }

    #[test]
    fn diff_of_fully_registered_set_is_empty() {
        let seen: HashSet<String> = ["UC1", "UC2"].iter().map(|s| s.to_string()).collect();
        let registry = vec![channel("UC1"), channel("UC2"), channel("UC3")];

        assert!(diff_new_channels(&seen, &registry).is_empty());
    }

    #[test]
    fn diff_order_is_deterministic() {
        let seen: HashSet<String> = ["UCc", "UCa", "UCb"].iter().map(|s| s.to_string()).collect();

        assert_eq!(diff_new_channels(&seen, &[]), vec!["UCa", "UCb", "UCc"]);
    }
}
