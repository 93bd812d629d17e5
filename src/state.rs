use crate::db::repository::Repository;
use crate::services::geocoder::Geocoder;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Repository>,
    pub geocoder: Arc<Geocoder>,
}
