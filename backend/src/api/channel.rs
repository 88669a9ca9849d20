use crate::config::DATA_DIR;
use crate::models::TrendingChannel;
use crate::services::store;
use log::error;
use rocket::get;
use rocket::serde::json::Json;

#[get("/<id>")]
pub async fn get_channel(id: &str) -> Json<Option<TrendingChannel>> {
    match store::load_channel_registry(&DATA_DIR) {
        Ok(registry) => Json(registry.into_iter().find(|c| c.channel_id == id)),
        Err(e) => {
            error!("Failed to load channel registry: {e:?}");
            Json(None)
        }
    }
}
