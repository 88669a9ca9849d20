use crate::models::AdminToken;
use crate::services::ingest;
use crate::services::snapshot::SnapshotCache;
use crate::AppState;
use anyhow::Result;
use env_logger::Builder;
use lazy_static::lazy_static;
use log::{error, info, LevelFilter};
use rocket::http::{Method, Status};
use rocket::request::{FromRequest, Outcome};
use rocket::Request;
use rocket_cors::{AllowedHeaders, AllowedOrigins, CorsOptions};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

lazy_static! {
    pub static ref YOUTUBE_API_KEY: String =
        env::var("YOUTUBE_API_KEY").expect("YOUTUBE_API_KEY environment variable must be set");
    pub static ref ADMIN_TOKEN: String =
        env::var("ADMIN_TOKEN").expect("ADMIN_TOKEN environment variable must be set");
    pub static ref DATA_DIR: PathBuf =
        PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string()));
    pub static ref INGEST_SCHEDULE: String =
        env::var("INGEST_SCHEDULE").unwrap_or_else(|_| "0 0 5 * * *".to_string());
    pub static ref FETCH_DELAY_MS: u64 = env::var("FETCH_DELAY_MS")
        .unwrap_or_else(|_| "300".to_string())
        .parse::<u64>()
        .unwrap_or(300);
    pub static ref SNAPSHOT_CACHE_TTL_SECS: u64 = env::var("SNAPSHOT_CACHE_TTL_SECS")
        .unwrap_or_else(|_| "300".to_string())
        .parse::<u64>()
        .unwrap_or(300);
    pub static ref CORS_ALLOWED_ORIGIN: String =
        env::var("CORS_ALLOWED_ORIGIN").unwrap_or_else(|_| "http://localhost:8080".to_string());
    pub static ref CATEGORY_NAMES: HashMap<String, String> =
        load_lookup_table(&table_path("CATEGORY_FILE", "config/categories.json"));
    pub static ref COUNTRY_NAMES: HashMap<String, String> =
        load_lookup_table(&table_path("COUNTRY_NAME_FILE", "config/country_names.json"));
    pub static ref REGIONS: Vec<String> =
        load_region_list(&table_path("REGION_FILE", "config/countries.json"));
}

fn table_path(var: &str, default: &str) -> PathBuf {
    PathBuf::from(env::var(var).unwrap_or_else(|_| default.to_string()))
}

fn load_lookup_table(path: &PathBuf) -> HashMap<String, String> {
    let raw = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read lookup table {}: {e}", path.display()));
    serde_json::from_str(&raw)
        .unwrap_or_else(|e| panic!("Failed to parse lookup table {}: {e}", path.display()))
}

fn load_region_list(path: &PathBuf) -> Vec<String> {
    let raw = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read region list {}: {e}", path.display()));
    serde_json::from_str(&raw)
        .unwrap_or_else(|e| panic!("Failed to parse region list {}: {e}", path.display()))
}

/// Resolve a category code to its display label. Unknown codes map to
/// "Unknown" rather than an error.
pub fn lookup_category_name(table: &HashMap<String, String>, category_id: &str) -> String {
    table
        .get(category_id)
        .cloned()
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Resolve a two-letter region code to its display name, if known.
pub fn lookup_country_name(table: &HashMap<String, String>, region: &str) -> Option<String> {
    table.get(region).cloned()
}

pub fn init_logger() {
    Builder::new().filter_level(LevelFilter::Info).init();
    info!("Starting trending analytics backend...");
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

/// Force-load every required setting and lookup table so a misconfigured
/// process dies at startup, not on the first scheduled run.
pub fn ensure_configuration() {
    lazy_static::initialize(&YOUTUBE_API_KEY);
    lazy_static::initialize(&ADMIN_TOKEN);
    info!(
        "Configuration loaded: {} categories, {} country names, {} regions, data dir {}",
        CATEGORY_NAMES.len(),
        COUNTRY_NAMES.len(),
        REGIONS.len(),
        DATA_DIR.display()
    );
}

pub async fn setup_ingest_scheduler(http: reqwest::Client) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let ingest_job = Job::new_async(INGEST_SCHEDULE.as_str(), move |_uuid, _l| {
        let client = http.clone();
        Box::pin(async move {
            match ingest::run_ingest(&client).await {
                Ok(report) => info!(
                    "Scheduled ingest finished: {} regions ok, {} failed, {} videos, {} new channels",
                    report.regions_ok, report.regions_failed, report.videos_written, report.new_channels
                ),
                Err(e) => error!("Scheduled ingest failed: {e:?}"),
            }
        })
    })?;

    scheduler.add(ingest_job).await?;
    scheduler.start().await?;
    info!("Ingest scheduler started ({}).", &*INGEST_SCHEDULE);

    Ok(scheduler)
}

pub async fn create_app_state() -> Result<AppState> {
    let http = reqwest::Client::new();
    let scheduler = setup_ingest_scheduler(http.clone()).await?;

    Ok(AppState {
        http,
        scheduler: Mutex::new(scheduler),
        snapshot_cache: SnapshotCache::new(),
    })
}

pub fn create_cors() -> Result<rocket_cors::Cors> {
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::some_exact(&[CORS_ALLOWED_ORIGIN.as_str()]))
        .allowed_methods(
            vec![Method::Get, Method::Post, Method::Options]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .allowed_headers(AllowedHeaders::some(&[
            "Authorization",
            "Accept",
            "Content-Type",
        ]))
        .allow_credentials(true)
        .to_cors()
        .map_err(|e| anyhow::anyhow!("Failed to create CORS options: {}", e))?;

    Ok(cors)
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminToken {
    type Error = &'static str;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let token = request
            .headers()
            .get_one("Authorization")
            .and_then(|auth| auth.strip_prefix("Bearer "));

        match token {
            Some(t) => {
                if t == &*ADMIN_TOKEN {
                    Outcome::Success(AdminToken(t.to_string()))
                } else {
                    Outcome::Error((Status::Unauthorized, "Invalid token"))
                }
            }
            None => Outcome::Error((Status::Unauthorized, "Missing token")),
        }
    }
}
