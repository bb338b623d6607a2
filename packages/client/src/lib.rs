#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Network client for the realty map backend.
//!
//! The [`RealtyApi`] trait is the seam between the application layer and
//! the backend: [`http::HttpBackend`] implements it over `reqwest`, and
//! tests implement it with scripted responses. Every method maps to exactly
//! one backend endpoint and performs exactly one round-trip; retrying is
//! the caller's decision (see [`retry`]).

pub mod config;
pub mod http;
pub mod retry;

use async_trait::async_trait;
use realty_map_models::{
    AmenityPlace, Coordinates, Credentials, EstimateRequest, FavoriteProperty, NearbyQuery,
    NewFavorite, Registration, SessionStatus,
};

pub use config::ClientConfig;
pub use http::HttpBackend;
pub use retry::{Backoff, RetryPolicy};

/// Errors returned by backend calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be sent or the response could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The server answered with a non-success status.
    #[error("server responded with {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server error message, or the status line.
        message: String,
    },

    /// The endpoint requires a logged-in session (HTTP 401/403, or a
    /// redirect to the login page).
    #[error("authentication required ({status}): {message}")]
    Unauthorized {
        /// HTTP status code.
        status: u16,
        /// Server error message.
        message: String,
    },

    /// The backend reported that the requested item does not exist.
    #[error("not found: {message}")]
    NotFound {
        /// Server error message.
        message: String,
    },

    /// Every attempt allowed by a [`RetryPolicy`] failed.
    #[error("{operation} failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Label of the retried operation.
        operation: String,
        /// Number of attempts made.
        attempts: u32,
        /// The error from the final attempt.
        #[source]
        last: Box<ClientError>,
    },
}

impl ClientError {
    /// Returns `true` if the failure is likely transient: connection
    /// failures, timeouts, HTTP 429, and HTTP 5xx.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request() || e.is_body(),
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Json(_)
            | Self::Unauthorized { .. }
            | Self::NotFound { .. }
            | Self::RetriesExhausted { .. } => false,
        }
    }

    /// Returns `true` if the backend asked for a logged-in session.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// The backend endpoints consumed by the client.
#[async_trait]
pub trait RealtyApi: Send + Sync {
    /// `GET /get_locations`: every location name the price model knows.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or a non-2xx response.
    async fn locations(&self) -> Result<Vec<String>, ClientError>;

    /// `GET /get_location_coords`: coordinates for a location name.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] if the backend has no match.
    async fn location_coords(&self, name: &str) -> Result<Coordinates, ClientError>;

    /// `POST /predict_price`: the model's estimate in lakh rupees, or `None`
    /// if the response carried no price.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or an unparseable body.
    async fn predict_price(&self, request: &EstimateRequest) -> Result<Option<f64>, ClientError>;

    /// `GET /get_nearby_places`: amenities around a coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or a non-2xx response.
    async fn nearby_places(&self, query: &NearbyQuery) -> Result<Vec<AmenityPlace>, ClientError>;

    /// `POST /save_favorite`: stores a favorite and returns the server's
    /// confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Unauthorized`] without a logged-in session.
    async fn save_favorite(&self, favorite: &NewFavorite) -> Result<String, ClientError>;

    /// `GET /get_favorites`: the logged-in user's favorites.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Unauthorized`] without a logged-in session.
    async fn favorites(&self) -> Result<Vec<FavoriteProperty>, ClientError>;

    /// `DELETE /delete_favorite/<id>`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Unauthorized`] if the favorite belongs to
    /// another user, [`ClientError::NotFound`] if it does not exist.
    async fn delete_favorite(&self, id: i64) -> Result<String, ClientError>;

    /// `POST /register`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Status`] if the email is already registered.
    async fn register(&self, registration: &Registration) -> Result<String, ClientError>;

    /// `POST /login`: returns the display name of the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Unauthorized`] for bad credentials.
    async fn login(&self, credentials: &Credentials) -> Result<String, ClientError>;

    /// `GET /logout`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure.
    async fn logout(&self) -> Result<String, ClientError>;

    /// `GET /check_session`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure.
    async fn check_session(&self) -> Result<SessionStatus, ClientError>;
}
