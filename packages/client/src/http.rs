//! `reqwest` implementation of [`RealtyApi`].
//!
//! The client keeps a cookie store so the session cookie set by
//! `POST /login` is sent with every later request. Redirects are not
//! followed: the backend answers unauthenticated requests to protected
//! endpoints with a redirect to its login page, which is reported as
//! [`ClientError::Unauthorized`] instead of a confusing HTML parse error.

use async_trait::async_trait;
use realty_map_client_models::{
    ApiErrorBody, ApiEstimate, ApiFavorites, ApiLocationCoords, ApiLocations, ApiLoginRequest,
    ApiLoginResponse, ApiMessage, ApiNearbyParams, ApiNearbyPlaces, ApiPredictPriceRequest,
    ApiRegisterRequest, ApiSaveFavoriteRequest, ApiSessionStatus,
};
use realty_map_models::{
    AmenityPlace, Coordinates, Credentials, EstimateRequest, FavoriteProperty, NearbyQuery,
    NewFavorite, Registration, SessionStatus,
};
use serde::de::DeserializeOwned;

use crate::{ClientConfig, ClientError, RealtyApi};

/// Backend client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Builds a client for the backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the TLS backend cannot be
    /// initialized.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The backend origin requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl RealtyApi for HttpBackend {
    async fn locations(&self) -> Result<Vec<String>, ClientError> {
        let response = self.client.get(self.url("/get_locations")).send().await?;
        let body: ApiLocations = read_json(response).await?;
        log::debug!("get_locations returned {} names", body.locations.len());
        Ok(body.locations)
    }

    async fn location_coords(&self, name: &str) -> Result<Coordinates, ClientError> {
        let response = self
            .client
            .get(self.url("/get_location_coords"))
            .query(&[("location", name)])
            .send()
            .await?;
        let body: ApiLocationCoords = read_json(response).await?;
        body.into_coordinates()
            .map_err(|message| ClientError::NotFound { message })
    }

    async fn predict_price(&self, request: &EstimateRequest) -> Result<Option<f64>, ClientError> {
        let response = self
            .client
            .post(self.url("/predict_price"))
            .json(&ApiPredictPriceRequest::from(request))
            .send()
            .await?;

        // The backend reports model failures as `{ error }` with a 4xx/5xx
        // status; a body without a price is a result, not a transport error.
        let status = response.status().as_u16();
        let text = response.text().await?;
        let body: ApiEstimate = serde_json::from_str(&text)?;
        if body.estimated_price.is_none() {
            log::warn!(
                "predict_price returned no price (status {status}): {}",
                body.error.as_deref().unwrap_or("no error given")
            );
        }
        Ok(body.estimated_price)
    }

    async fn nearby_places(&self, query: &NearbyQuery) -> Result<Vec<AmenityPlace>, ClientError> {
        let response = self
            .client
            .get(self.url("/get_nearby_places"))
            .query(&ApiNearbyParams::from(query))
            .send()
            .await?;
        let body: ApiNearbyPlaces = read_json(response).await?;
        Ok(body.places.into_iter().map(AmenityPlace::from).collect())
    }

    async fn save_favorite(&self, favorite: &NewFavorite) -> Result<String, ClientError> {
        let response = self
            .client
            .post(self.url("/save_favorite"))
            .json(&ApiSaveFavoriteRequest::from(favorite))
            .send()
            .await?;
        let body: ApiMessage = read_json(response).await?;
        Ok(body.message)
    }

    async fn favorites(&self) -> Result<Vec<FavoriteProperty>, ClientError> {
        let response = self.client.get(self.url("/get_favorites")).send().await?;
        let body: ApiFavorites = read_json(response).await?;
        Ok(body
            .favorites
            .into_iter()
            .map(FavoriteProperty::from)
            .collect())
    }

    async fn delete_favorite(&self, id: i64) -> Result<String, ClientError> {
        let response = self
            .client
            .delete(self.url(&format!("/delete_favorite/{id}")))
            .send()
            .await?;
        let body: ApiMessage = read_json(response).await?;
        Ok(body.message)
    }

    async fn register(&self, registration: &Registration) -> Result<String, ClientError> {
        let response = self
            .client
            .post(self.url("/register"))
            .json(&ApiRegisterRequest::from(registration))
            .send()
            .await?;
        let body: ApiMessage = read_json(response).await?;
        Ok(body.message)
    }

    async fn login(&self, credentials: &Credentials) -> Result<String, ClientError> {
        let response = self
            .client
            .post(self.url("/login"))
            .json(&ApiLoginRequest::from(credentials))
            .send()
            .await?;
        let body: ApiLoginResponse = read_json(response).await?;
        Ok(body.user.unwrap_or_else(|| credentials.email.clone()))
    }

    async fn logout(&self) -> Result<String, ClientError> {
        let response = self.client.get(self.url("/logout")).send().await?;
        let body: ApiMessage = read_json(response).await?;
        Ok(body.message)
    }

    async fn check_session(&self) -> Result<SessionStatus, ClientError> {
        let response = self.client.get(self.url("/check_session")).send().await?;
        let body: ApiSessionStatus = read_json(response).await?;
        Ok(body.into())
    }
}

/// Reads the body, maps error statuses to [`ClientError`], and parses the
/// JSON payload.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status().as_u16();
    let redirect_target = response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let text = response.text().await?;

    check_status(status, redirect_target.as_deref(), &text)?;

    Ok(serde_json::from_str(&text)?)
}

/// Maps a response status (plus redirect target and body) to an error.
///
/// 2xx passes; 401/403 and redirects to a login page mean the session is
/// missing; 404 is "not found"; anything else carries the server's `error`
/// message when it sent one.
fn check_status(status: u16, redirect_target: Option<&str>, body: &str) -> Result<(), ClientError> {
    if (200..300).contains(&status) {
        return Ok(());
    }

    let message = error_message(body).unwrap_or_else(|| format!("HTTP {status}"));

    Err(match status {
        401 | 403 => ClientError::Unauthorized { status, message },
        300..=399 if redirect_target.is_some_and(|t| t.contains("login")) => {
            ClientError::Unauthorized {
                status,
                message: "login required".to_string(),
            }
        }
        404 => ClientError::NotFound { message },
        _ => ClientError::Status { status, message },
    })
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
}
