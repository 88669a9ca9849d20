use crate::models::{CategorySummary, CountrySummary, DailyMetrics, SnapshotInfo, TopVideo};
use crate::services::metrics::{self, Metric};
use crate::AppState;
use rocket::serde::json::Json;
use rocket::{get, State};

#[get("/")]
pub async fn snapshot_info(state: &State<AppState>) -> Json<SnapshotInfo> {
    let (date, rows) = state.snapshot_cache.latest().await;

    let mut countries: Vec<String> = rows
        .iter()
        .filter_map(|row| row.country_name.clone())
        .collect();
    countries.sort();
    countries.dedup();

    Json(SnapshotInfo {
        date: date.to_string(),
        video_count: rows.len(),
        countries,
    })
}

#[get("/metrics?<country>&<category>")]
pub async fn snapshot_metrics(
    state: &State<AppState>,
    country: Option<&str>,
    category: Option<&str>,
) -> Json<DailyMetrics> {
    let (_date, rows) = state.snapshot_cache.latest().await;
    let filtered = metrics::filter_rows(&rows, country, category);
    Json(metrics::daily_metrics(&filtered))
}

#[get("/top?<metric>&<count>&<country>&<category>")]
pub async fn snapshot_top(
    state: &State<AppState>,
    metric: Option<&str>,
    count: Option<usize>,
    country: Option<&str>,
    category: Option<&str>,
) -> Json<Vec<TopVideo>> {
    let ranking = metric.and_then(Metric::parse).unwrap_or(Metric::Views);
    let count = count.unwrap_or(10);

    let (_date, rows) = state.snapshot_cache.latest().await;
    let filtered = metrics::filter_rows(&rows, country, category);
    Json(metrics::top_videos(&filtered, ranking, count))
}

#[get("/categories?<country>")]
pub async fn snapshot_categories(
    state: &State<AppState>,
    country: Option<&str>,
) -> Json<Vec<CategorySummary>> {
    let (_date, rows) = state.snapshot_cache.latest().await;
    let filtered = metrics::filter_rows(&rows, country, None);
    Json(metrics::category_summaries(&filtered))
}

#[get("/countries")]
pub async fn snapshot_countries(state: &State<AppState>) -> Json<Vec<CountrySummary>> {
    let (_date, rows) = state.snapshot_cache.latest().await;
    Json(metrics::country_summaries(&rows))
}
