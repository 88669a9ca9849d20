/// Parse an ISO8601 duration token (PT1H2M3S) to total seconds.
/// Empty or unparseable tokens yield 0 so a single bad record never
/// aborts an ingest run.
pub fn parse_iso8601_duration_to_seconds(duration_str: &str) -> u64 {
    if duration_str.is_empty() {
        return 0;
    }

    // Simple parser for PT format (PT1H2M3S)
    if !duration_str.starts_with("PT") {
        return 0;
    }

    let duration_part = &duration_str[2..]; // Remove "PT"
    let mut total_seconds = 0;
    let mut current_number = String::new();

    for ch in duration_part.chars() {
        if ch.is_ascii_digit() {
            current_number.push(ch);
        } else {
            if let Ok(num) = current_number.parse::<u64>() {
                match ch {
                    'H' => total_seconds += num * 3600, // Hours
                    'M' => total_seconds += num * 60,   // Minutes
                    'S' => total_seconds += num,        // Seconds
                    _ => {}
                }
            }
            current_number.clear();
        }
    }

    total_seconds
}

/// Split a batch of channel IDs into chunks the channels endpoint accepts.
pub fn chunk_ids(ids: &[String], chunk_size: usize) -> Vec<Vec<String>> {
    ids.chunks(chunk_size)
        .map(|chunk| chunk.to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_zero() {
        assert_eq!(parse_iso8601_duration_to_seconds("PT0S"), 0);
    }

    #[test]
    fn duration_hours_only() {
        assert_eq!(parse_iso8601_duration_to_seconds("PT1H"), 3600);
    }

    #[test]
    fn duration_minutes_seconds() {
        assert_eq!(parse_iso8601_duration_to_seconds("PT4M13S"), 253);
    }

    #[test]
    fn duration_all_components() {
        assert_eq!(parse_iso8601_duration_to_seconds("PT1H2M3S"), 3723);
    }

    #[test]
    fn duration_empty_is_sentinel() {
        assert_eq!(parse_iso8601_duration_to_seconds(""), 0);
    }

    #[test]
    fn duration_garbage_is_sentinel() {
        assert_eq!(parse_iso8601_duration_to_seconds("3 minutes"), 0);
        // Live streams report a day-period token with no time part.
        assert_eq!(parse_iso8601_duration_to_seconds("P0D"), 0);
    }

    #[test]
    fn chunking_respects_batch_limit() {
        let ids: Vec<String> = (0..120).map(|i| format!("UC{i:03}")).collect();
        let chunks = chunk_ids(&ids, 50);
        let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![50, 50, 20]);
        let total: usize = sizes.iter().sum();
        assert_eq!(total, 120);
    }

    #[test]
    fn chunking_empty_input() {
        let chunks = chunk_ids(&[], 50);
        assert!(chunks.is_empty());
    }
}
