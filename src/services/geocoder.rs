use std::time::{Duration, Instant};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

const CONFIDENCE_THRESHOLD: f64 = 0.5;
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct GeocodeConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_key: Option<String>,
    pub oauth_token_url: String,
    pub atlas_base_url: String,
    pub fallback_base_url: String,
}

impl GeocodeConfig {
    pub fn from_env() -> Self {
        Self {
            client_id: std::env::var("MAPPLS_CLIENT_ID").ok(),
            client_secret: std::env::var("MAPPLS_CLIENT_SECRET").ok(),
            api_key: std::env::var("MAPPLS_API_KEY").ok(),
            oauth_token_url: std::env::var("MAPPLS_OAUTH_TOKEN_URL").unwrap_or_else(|_| {
                "https://outpost.mappls.com/api/security/oauth/token".to_string()
            }),
            atlas_base_url: std::env::var("MAPPLS_ATLAS_BASE_URL")
                .unwrap_or_else(|_| "https://atlas.mappls.com/api/places".to_string()),
            fallback_base_url: std::env::var("MAPPLS_FALLBACK_BASE_URL")
                .unwrap_or_else(|_| "https://apis.mappls.com/advancedmaps/v1".to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding credentials not configured")]
    NotConfigured,
    #[error("no address found")]
    NoResults,
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Provider { status: u16, body: String },
}

/// OAuth bearer token plus its deadline. Owned by the geocoder instance
/// rather than living in module state, so each deployment (and test)
/// scopes its own cache. A token is considered stale once it is within
/// the refresh margin of expiry.
#[derive(Default)]
pub struct TokenCache {
    slot: Mutex<Option<CachedToken>>,
}

#[derive(Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    async fn fresh(&self) -> Option<String> {
        let slot = self.slot.lock().await;
        slot.as_ref()
            .filter(|t| Instant::now() + TOKEN_REFRESH_MARGIN < t.expires_at)
            .map(|t| t.value.clone())
    }

    async fn store(&self, value: String, expires_in: Duration) {
        let mut slot = self.slot.lock().await;
        *slot = Some(CachedToken {
            value,
            expires_at: Instant::now() + expires_in,
        });
    }
}

/// Reverse-geocoding client. The provider is tried through an ordered
/// list of strategies, first-success-wins; intermediate failures are
/// logged and suppressed until the list is exhausted.
pub struct Geocoder {
    http: Client,
    cfg: GeocodeConfig,
    token: TokenCache,
}

#[derive(Clone, Copy, Debug)]
enum Strategy {
    OauthGeocode,
    OauthReverse,
    ApiKeyFallback,
}

const STRATEGIES: [Strategy; 3] = [
    Strategy::OauthGeocode,
    Strategy::OauthReverse,
    Strategy::ApiKeyFallback,
];

impl Geocoder {
    pub fn new(cfg: GeocodeConfig, token: TokenCache) -> Self {
        Self {
            http: Client::new(),
            cfg,
            token,
        }
    }

    pub async fn reverse_geocode(
        &self,
        lat: f64,
        lng: f64,
    ) -> Result<Vec<GeoAddress>, GeocodeError> {
        for strategy in STRATEGIES {
            let attempt = match strategy {
                Strategy::OauthGeocode => self.oauth_geocode(lat, lng).await,
                Strategy::OauthReverse => self.oauth_reverse(lat, lng).await,
                Strategy::ApiKeyFallback => self.api_key_fallback(lat, lng).await,
            };
            match attempt {
                Ok(results) if !results.is_empty() => return Ok(results),
                Ok(_) => info!("geocode strategy {strategy:?} returned no results"),
                Err(e) => warn!("geocode strategy {strategy:?} failed: {e}"),
            }
        }
        Err(GeocodeError::NoResults)
    }

    async fn bearer_token(&self) -> Result<String, GeocodeError> {
        if let Some(token) = self.token.fresh().await {
            return Ok(token);
        }
        let (client_id, client_secret) = match (&self.cfg.client_id, &self.cfg.client_secret) {
            (Some(id), Some(secret)) => (id, secret),
            _ => return Err(GeocodeError::NotConfigured),
        };
        let response = self
            .http
            .post(&self.cfg.oauth_token_url)
            .timeout(REQUEST_TIMEOUT)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }
        let grant: TokenGrant = response.json().await?;
        let expires_in = Duration::from_secs(grant.expires_in.unwrap_or(3600));
        self.token
            .store(grant.access_token.clone(), expires_in)
            .await;
        info!("geocoding OAuth token refreshed");
        Ok(grant.access_token)
    }

    async fn oauth_geocode(&self, lat: f64, lng: f64) -> Result<Vec<GeoAddress>, GeocodeError> {
        let token = self.bearer_token().await?;
        let url = format!("{}/geocode?address={lat},{lng}", self.cfg.atlas_base_url);
        let response = self
            .http
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .bearer_auth(&token)
            .header("Accept", "application/json")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }
        let body: CopResponse = response.json().await?;
        Ok(map_cop_results(body, lat, lng))
    }

    async fn oauth_reverse(&self, lat: f64, lng: f64) -> Result<Vec<GeoAddress>, GeocodeError> {
        let token = self.bearer_token().await?;
        let url = format!(
            "{}/reverse-geocode/json?lat={lat}&lng={lng}",
            self.cfg.atlas_base_url
        );
        let response = self
            .http
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .bearer_auth(&token)
            .header("Accept", "application/json")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }
        let body: CopResponse = response.json().await?;
        Ok(map_cop_results(body, lat, lng))
    }

    async fn api_key_fallback(&self, lat: f64, lng: f64) -> Result<Vec<GeoAddress>, GeocodeError> {
        let api_key = self.cfg.api_key.as_ref().ok_or(GeocodeError::NotConfigured)?;
        let url = format!(
            "{}/{api_key}/rev_geocode?lat={lat}&lng={lng}",
            self.cfg.fallback_base_url
        );
        let response = self.http.get(&url).timeout(REQUEST_TIMEOUT).send().await?;
        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }
        let body: FallbackResponse = response.json().await?;
        let mut results: Vec<GeoAddress> = body
            .results
            .into_iter()
            .map(|r| r.into_address(lat, lng))
            .collect();

        // The fallback provider often omits the stable place code; one
        // forward-geocode round-trip on its formatted address can recover it.
        if let Some(first) = results.first_mut() {
            if first.e_loc.is_empty() {
                let formatted = first.formatted_address.clone();
                match self.recover_e_loc(&formatted).await {
                    Ok(Some(e_loc)) => first.e_loc = e_loc,
                    Ok(None) => {}
                    Err(e) => warn!("eLoc recovery failed: {e}"),
                }
            }
        }
        Ok(results)
    }

    async fn recover_e_loc(&self, formatted_address: &str) -> Result<Option<String>, GeocodeError> {
        let token = self.bearer_token().await?;
        let url = format!(
            "{}/geocode?address={}",
            self.cfg.atlas_base_url,
            urlencoding::encode(formatted_address)
        );
        let response = self
            .http
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .bearer_auth(&token)
            .header("Accept", "application/json")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }
        let body: CopResponse = response.json().await?;
        let e_loc = match body.cop_results {
            Some(CopResults::One(result)) => result.e_loc,
            Some(CopResults::Many(results)) => {
                results.into_iter().next().and_then(|r| r.e_loc)
            }
            None => None,
        };
        Ok(e_loc.filter(|e| !e.is_empty()))
    }
}

async fn provider_error(response: reqwest::Response) -> GeocodeError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    GeocodeError::Provider { status, body }
}

fn map_cop_results(body: CopResponse, lat: f64, lng: f64) -> Vec<GeoAddress> {
    match body.cop_results {
        Some(CopResults::Many(results)) => results
            .into_iter()
            .map(|r| r.into_address(lat, lng))
            .collect(),
        Some(CopResults::One(result)) => {
            // Single-result responses carry a confidence score; low scores
            // are discarded so a later strategy can produce a better fix.
            let score = result.confidence_score.unwrap_or(0.0);
            if score > CONFIDENCE_THRESHOLD {
                vec![result.into_address(lat, lng)]
            } else {
                info!("discarding geocode result with confidence {score}");
                vec![]
            }
        }
        None => vec![],
    }
}

/// Resolved address in the wire shape clients already consume. The
/// `formatted_address` key stays snake_case; everything else is camelCase.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoAddress {
    pub house_number: String,
    pub house_name: String,
    pub poi: String,
    pub street: String,
    pub sub_sub_locality: String,
    pub sub_locality: String,
    pub locality: String,
    pub village: String,
    pub district: String,
    pub sub_district: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub e_loc: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "formatted_address")]
    pub formatted_address: String,
}

#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CopResponse {
    #[serde(default)]
    cop_results: Option<CopResults>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CopResults {
    Many(Vec<CopResult>),
    One(Box<CopResult>),
}

/// Superset of the fields both provider endpoints return; the fallback
/// endpoint uses snake_case keys for a few of them, hence the aliases.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CopResult {
    #[serde(default)]
    house_number: Option<String>,
    #[serde(default)]
    house_name: Option<String>,
    #[serde(default)]
    poi: Option<String>,
    #[serde(default)]
    street: Option<String>,
    #[serde(default)]
    sub_sub_locality: Option<String>,
    #[serde(default)]
    sub_locality: Option<String>,
    #[serde(default)]
    locality: Option<String>,
    #[serde(default)]
    village: Option<String>,
    #[serde(default)]
    district: Option<String>,
    #[serde(default)]
    sub_district: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    pincode: Option<String>,
    #[serde(default)]
    e_loc: Option<String>,
    #[serde(default, alias = "lat")]
    latitude: Option<f64>,
    #[serde(default, alias = "lng")]
    longitude: Option<f64>,
    #[serde(default, alias = "formatted_address")]
    formatted_address: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    confidence_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FallbackResponse {
    #[serde(default)]
    results: Vec<CopResult>,
}

impl CopResult {
    fn into_address(self, lat: f64, lng: f64) -> GeoAddress {
        let locality = self.locality.unwrap_or_default();
        let city = self.city.unwrap_or_default();
        let state = self.state.unwrap_or_default();
        let formatted_address = self
            .formatted_address
            .or(self.address)
            .unwrap_or_else(|| format!("{locality}, {city}, {state}").trim().to_string());
        GeoAddress {
            house_number: self.house_number.unwrap_or_default(),
            house_name: self.house_name.unwrap_or_default(),
            poi: self.poi.unwrap_or_default(),
            street: self.street.unwrap_or_default(),
            sub_sub_locality: self.sub_sub_locality.unwrap_or_default(),
            sub_locality: self.sub_locality.unwrap_or_default(),
            locality,
            village: self.village.unwrap_or_default(),
            district: self.district.unwrap_or_default(),
            sub_district: self.sub_district.unwrap_or_default(),
            city,
            state,
            pincode: self.pincode.unwrap_or_default(),
            e_loc: self.e_loc.unwrap_or_default(),
            lat: self.latitude.unwrap_or(lat),
            lng: self.longitude.unwrap_or(lng),
            formatted_address,
        }
    }
}
