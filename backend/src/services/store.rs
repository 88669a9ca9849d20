use crate::models::{TrendingChannel, TrendingVideo};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::warn;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Partition layout, shared by the ingest writer and the snapshot reader:
///   videos:   <data>/videos/country=<R>/year=<YYYY>/month=<MM>/trending_<R>_<YYYY-MM-DD>.csv
///   channels: <data>/channels/trending_channels.csv
pub fn video_partition_path(data_dir: &Path, region: &str, date: NaiveDate) -> PathBuf {
    data_dir
        .join("videos")
        .join(format!("country={region}"))
        .join(format!("year={}", date.format("%Y")))
        .join(format!("month={}", date.format("%m")))
        .join(format!("trending_{region}_{}.csv", date.format("%Y-%m-%d")))
}

pub fn channel_registry_path(data_dir: &Path) -> PathBuf {
    data_dir.join("channels").join("trending_channels.csv")
}

/// Write one region/day partition, overwriting any existing file for the
/// same key so re-runs stay idempotent.
pub fn write_video_partition(
    data_dir: &Path,
    region: &str,
    date: NaiveDate,
    videos: &[TrendingVideo],
) -> Result<PathBuf> {
    let path = video_partition_path(data_dir, region, date);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create partition directory {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to open partition {}", path.display()))?;
    for video in videos {
        writer.serialize(video)?;
    }
    writer.flush()?;

    Ok(path)
}

pub fn read_video_partition(path: &Path) -> Result<Vec<TrendingVideo>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open partition {}", path.display()))?;

    let mut videos = Vec::new();
    for result in reader.deserialize() {
        match result {
            Ok(video) => videos.push(video),
            Err(e) => warn!("Skipping malformed row in {}: {e}", path.display()),
        }
    }

    Ok(videos)
}

/// All partition files for one calendar day, across every region directory
/// present on disk. Regions are sorted so concatenation order is stable.
pub fn scan_video_partitions(data_dir: &Path, date: NaiveDate) -> Vec<PathBuf> {
    let videos_dir = data_dir.join("videos");
    let entries = match fs::read_dir(&videos_dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(), // nothing ingested yet
    };

    let mut regions: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter_map(|name| name.strip_prefix("country=").map(String::from))
        .collect();
    regions.sort();

    regions
        .into_iter()
        .map(|region| video_partition_path(data_dir, &region, date))
        .filter(|path| path.is_file())
        .collect()
}

/// Count of persisted video partition files, for operational stats.
pub fn count_partition_files(data_dir: &Path) -> usize {
    fn walk(dir: &Path, total: &mut usize) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_dir() {
                walk(&path, total);
            } else if path.extension().is_some_and(|ext| ext == "csv") {
                *total += 1;
            }
        }
    }

    let mut total = 0;
    walk(&data_dir.join("videos"), &mut total);
    total
}

/// Load the channel registry; a registry that does not exist yet reads as
/// empty (first-ever run).
pub fn load_channel_registry(data_dir: &Path) -> Result<Vec<TrendingChannel>> {
    let path = channel_registry_path(data_dir);
    if !path.is_file() {
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(&path)
        .with_context(|| format!("Failed to open channel registry {}", path.display()))?;

    let mut channels = Vec::new();
    for result in reader.deserialize() {
        match result {
            Ok(channel) => channels.push(channel),
            Err(e) => warn!("Skipping malformed registry row: {e}"),
        }
    }

    Ok(channels)
}

/// Append channels whose channel_id is not yet registered and rewrite the
/// registry file. Returns how many rows were added; merging the same batch
/// twice adds nothing the second time.
pub fn merge_channel_registry(data_dir: &Path, new_channels: &[TrendingChannel]) -> Result<usize> {
    let mut registry = load_channel_registry(data_dir)?;
    let mut known: HashSet<String> = registry
        .iter()
        .map(|channel| channel.channel_id.clone())
        .collect();

    let mut added = 0;
    for channel in new_channels {
        if channel.channel_id.is_empty() {
            continue;
        }
        if known.insert(channel.channel_id.clone()) {
            registry.push(channel.clone());
            added += 1;
        }
    }

    if added > 0 {
        write_channel_registry(data_dir, &registry)?;
    }

    Ok(added)
}

fn write_channel_registry(data_dir: &Path, registry: &[TrendingChannel]) -> Result<()> {
    let path = channel_registry_path(data_dir);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create registry directory {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to open channel registry {}", path.display()))?;
    for channel in registry {
        writer.serialize(channel)?;
    }
    writer.flush()?;

    Ok(())
}
