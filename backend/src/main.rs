#[macro_use]
extern crate rocket;

mod api;
mod config;
mod models;
mod services;
mod utils;

use crate::services::snapshot::SnapshotCache;
use tokio::sync::Mutex;
use tokio_cron_scheduler::JobScheduler;

pub struct AppState {
    pub http: reqwest::Client,
    pub scheduler: Mutex<JobScheduler>,
    pub snapshot_cache: SnapshotCache,
}

#[launch]
async fn rocket() -> _ {
    config::load_environment();
    config::init_logger();
    config::ensure_configuration();

    let state = config::create_app_state()
        .await
        .expect("Application state setup failed.");
    let cors = config::create_cors().expect("CORS setup failed.");

    rocket::build()
        .manage(state)
        .attach(cors)
        .mount(
            "/snapshot",
            routes![
                api::snapshot_info,
                api::snapshot_metrics,
                api::snapshot_top,
                api::snapshot_categories,
                api::snapshot_countries,
            ],
        )
        .mount("/channel", routes![api::get_channel])
        .mount("/admin", routes![api::trigger_ingest, api::admin_stats])
}
