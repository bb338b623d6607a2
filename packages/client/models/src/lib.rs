#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! JSON request and response types for the realty map backend.
//!
//! Field names follow the backend exactly (a mix of `snake_case` and, for
//! the save body, `camelCase`). Conversions into the domain types in
//! `realty_map_models` live next to each type.

use realty_map_models::{
    AmenityPlace, Coordinates, Credentials, EstimateRequest, FavoriteProperty, NewFavorite,
    Registration, SessionStatus,
};
use serde::{Deserialize, Deserializer, Serialize};

/// `GET /get_locations` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiLocations {
    /// Location names in server order.
    #[serde(default)]
    pub locations: Vec<String>,
}

/// Any error body of the form `{ "error": "..." }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Server-provided error description.
    pub error: Option<String>,
}

/// `GET /get_location_coords` response: `{ lat, lon }` or `{ error }`.
///
/// The coordinates come back as numbers from the location table but have
/// been observed as strings when they originate from a geocoder, so both
/// are accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiLocationCoords {
    /// Latitude.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lat: Option<f64>,
    /// Longitude.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lon: Option<f64>,
    /// Present when the location could not be resolved.
    pub error: Option<String>,
}

impl ApiLocationCoords {
    /// Returns the coordinates, or the server's error message when the
    /// lookup failed or the pair is incomplete.
    ///
    /// # Errors
    ///
    /// Returns the error message if the body carries `error` or lacks
    /// either coordinate.
    pub fn into_coordinates(self) -> Result<Coordinates, String> {
        if let Some(error) = self.error {
            return Err(error);
        }
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err("Coordinates not found".to_string()),
        }
    }
}

/// `POST /predict_price` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiPredictPriceRequest {
    /// Location name.
    pub location: String,
    /// Total area in square feet.
    pub total_sqft: f64,
    /// Bedrooms.
    pub bhk: u32,
    /// Bathrooms.
    pub bath: u32,
    /// Property age in years.
    pub property_age: u32,
}

impl From<&EstimateRequest> for ApiPredictPriceRequest {
    fn from(request: &EstimateRequest) -> Self {
        Self {
            location: request.location.clone(),
            total_sqft: request.total_area,
            bhk: request.room_count,
            bath: request.bath_count,
            property_age: request.property_age,
        }
    }
}

/// `POST /predict_price` response. `estimated_price` is omitted on failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiEstimate {
    /// Model output in lakh rupees. May be negative.
    pub estimated_price: Option<f64>,
    /// Failure description.
    pub error: Option<String>,
}

/// `GET /get_nearby_places` query string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiNearbyParams {
    /// Center latitude.
    pub lat: f64,
    /// Center longitude.
    pub lon: f64,
    /// Category keyword.
    #[serde(rename = "type")]
    pub place_type: String,
    /// Search radius in metres.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<u32>,
    /// `distance` or `name`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl From<&realty_map_models::NearbyQuery> for ApiNearbyParams {
    fn from(query: &realty_map_models::NearbyQuery) -> Self {
        Self {
            lat: query.center.lat,
            lon: query.center.lon,
            place_type: query.kind.keyword().to_string(),
            radius: query.radius_m,
            sort: query.sort.map(|s| s.to_string()),
        }
    }
}

/// `GET /get_nearby_places` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiNearbyPlaces {
    /// Matching places, already deduplicated and sorted by the server.
    #[serde(default)]
    pub places: Vec<ApiPlace>,
}

/// A single place in a nearby-search response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiPlace {
    /// Display name.
    pub name: String,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
    /// Category keyword.
    #[serde(rename = "type", default)]
    pub place_type: String,
    /// Distance from the search center in metres.
    #[serde(default)]
    pub distance_m: Option<f64>,
}

impl From<ApiPlace> for AmenityPlace {
    fn from(place: ApiPlace) -> Self {
        Self {
            name: place.name,
            coordinates: Coordinates::new(place.lat, place.lon),
            kind: place.place_type,
            distance_m: place.distance_m,
        }
    }
}

/// `POST /save_favorite` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSaveFavoriteRequest {
    /// Location name.
    pub location: String,
    /// Area in square feet.
    pub sqft: f64,
    /// Bedrooms.
    pub bhk: u32,
    /// Bathrooms.
    pub bath: u32,
    /// Property age in years.
    #[serde(rename = "propertyAge")]
    pub property_age: u32,
    /// Price in lakh rupees.
    pub price: f64,
}

impl From<&NewFavorite> for ApiSaveFavoriteRequest {
    fn from(favorite: &NewFavorite) -> Self {
        Self {
            location: favorite.location.clone(),
            sqft: favorite.area,
            bhk: favorite.room_count,
            bath: favorite.bath_count,
            property_age: favorite.property_age,
            price: favorite.price,
        }
    }
}

/// `{ "message": "..." }` confirmation body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Human-readable confirmation.
    #[serde(default)]
    pub message: String,
}

/// `GET /get_favorites` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiFavorites {
    /// The user's favorites in server order.
    #[serde(default)]
    pub favorites: Vec<ApiFavorite>,
}

/// A stored favorite as returned by `GET /get_favorites`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiFavorite {
    /// Server-assigned ID.
    pub id: i64,
    /// Location name.
    pub location: String,
    /// Area in square feet.
    pub sqft: f64,
    /// Bedrooms.
    pub bhk: u32,
    /// Bathrooms.
    pub bath: u32,
    /// Property age in years.
    pub property_age: u32,
    /// Price in lakh rupees.
    pub price: f64,
}

impl From<ApiFavorite> for FavoriteProperty {
    fn from(fav: ApiFavorite) -> Self {
        Self {
            id: fav.id,
            location: fav.location,
            area: fav.sqft,
            room_count: fav.bhk,
            bath_count: fav.bath,
            property_age: fav.property_age,
            price: fav.price,
        }
    }
}

/// `POST /register` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiRegisterRequest {
    /// Display name.
    pub name: String,
    /// Account email.
    pub email: String,
    /// Password.
    pub password: String,
}

impl From<&Registration> for ApiRegisterRequest {
    fn from(registration: &Registration) -> Self {
        Self {
            name: registration.name.clone(),
            email: registration.email.clone(),
            password: registration.password.clone(),
        }
    }
}

/// `POST /login` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiLoginRequest {
    /// Account email.
    pub email: String,
    /// Password.
    pub password: String,
}

impl From<&Credentials> for ApiLoginRequest {
    fn from(credentials: &Credentials) -> Self {
        Self {
            email: credentials.email.clone(),
            password: credentials.password.clone(),
        }
    }
}

/// `POST /login` success body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiLoginResponse {
    /// Confirmation message.
    #[serde(default)]
    pub message: String,
    /// Display name of the user that logged in.
    pub user: Option<String>,
}

/// `GET /check_session` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiSessionStatus {
    /// Whether the session belongs to a logged-in user.
    #[serde(default)]
    pub logged_in: bool,
    /// Display name, when logged in.
    pub user: Option<String>,
}

impl From<ApiSessionStatus> for SessionStatus {
    fn from(status: ApiSessionStatus) -> Self {
        Self {
            logged_in: status.logged_in,
            user: status.user,
        }
    }
}

/// Accepts a JSON number, a numeric string, or `null`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
