use std::env;

use crate::services::geocoder::GeocodeConfig;

pub struct Config {
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub geocode: GeocodeConfig,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(5000);
        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| {
                // Dev-server defaults; set ALLOWED_ORIGINS in production.
                vec![
                    "http://localhost:5173".to_string(),
                    "http://localhost:3000".to_string(),
                    "http://127.0.0.1:5173".to_string(),
                ]
            });
        Self {
            port,
            allowed_origins,
            geocode: GeocodeConfig::from_env(),
        }
    }
}
