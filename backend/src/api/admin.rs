use log::info;
use rocket::serde::json::Json;
use rocket::{get, post, State};

use crate::config::{DATA_DIR, REGIONS};
use crate::models::{AdminStats, AdminToken, IngestResponse};
use crate::services::{ingest, store};
use crate::AppState;

#[post("/ingest")]
pub async fn trigger_ingest(_token: AdminToken, state: &State<AppState>) -> Json<IngestResponse> {
    info!("Manual ingest run triggered");
    match ingest::run_ingest(&state.http).await {
        Ok(report) => Json(IngestResponse {
            success: true,
            message: "Ingest run complete".to_string(),
            report: Some(report),
        }),
        Err(e) => {
            log::error!("Ingest run failed: {e:?}");
            Json(IngestResponse {
                success: false,
                message: format!("Ingest run failed: {e}"),
                report: None,
            })
        }
    }
}

#[get("/stats")]
pub async fn admin_stats(_token: AdminToken) -> Json<AdminStats> {
    let registered_channels = match store::load_channel_registry(&DATA_DIR) {
        Ok(registry) => registry.len(),
        Err(e) => {
            log::error!("Failed to load channel registry: {e:?}");
            0
        }
    };

    Json(AdminStats {
        registered_channels,
        partition_files: store::count_partition_files(&DATA_DIR),
        regions_configured: REGIONS.len(),
        data_dir: DATA_DIR.display().to_string(),
    })
}
