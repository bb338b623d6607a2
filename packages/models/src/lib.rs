#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Property, location, and amenity types for the realty map client.
//!
//! These are the client-side domain types shared by the network client and
//! the application layer. They are separate from the JSON wire types in
//! `realty_map_client_models` so the backend contract can change without
//! rippling through the view logic.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl Coordinates {
    /// Creates a coordinate pair.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// A validated request for a price estimate.
///
/// Built fresh from the form on every submission and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    /// Location name, one of the names served by the location directory.
    pub location: String,
    /// Total built-up area in square feet (always > 0).
    pub total_area: f64,
    /// Number of bedrooms (BHK).
    pub room_count: u32,
    /// Number of bathrooms.
    pub bath_count: u32,
    /// Age of the property in years.
    pub property_age: u32,
}

/// A property the user saved to their favorites.
///
/// Owned by the backend; `id` is assigned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteProperty {
    /// Server-assigned unique ID.
    pub id: i64,
    /// Location name.
    pub location: String,
    /// Area in square feet.
    pub area: f64,
    /// Number of bedrooms (BHK).
    pub room_count: u32,
    /// Number of bathrooms.
    pub bath_count: u32,
    /// Age of the property in years.
    pub property_age: u32,
    /// Price in lakh rupees.
    pub price: f64,
}

impl FavoriteProperty {
    /// Price divided by area, in lakh per square foot.
    ///
    /// Returns infinity for a zero area so such a property never ranks as
    /// the cheapest.
    #[must_use]
    pub fn price_per_area(&self) -> f64 {
        if self.area > 0.0 {
            self.price / self.area
        } else {
            f64::INFINITY
        }
    }
}

/// A favorite that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFavorite {
    /// Location name.
    pub location: String,
    /// Area in square feet.
    pub area: f64,
    /// Number of bedrooms (BHK).
    pub room_count: u32,
    /// Number of bathrooms.
    pub bath_count: u32,
    /// Age of the property in years.
    pub property_age: u32,
    /// Estimated price in lakh rupees.
    pub price: f64,
}

impl NewFavorite {
    /// Pairs an estimate request with the price it produced.
    #[must_use]
    pub fn from_estimate(request: &EstimateRequest, price: f64) -> Self {
        Self {
            location: request.location.clone(),
            area: request.total_area,
            room_count: request.room_count,
            bath_count: request.bath_count,
            property_age: request.property_age,
            price,
        }
    }
}

/// Category of amenity to search for around the selected location.
///
/// The backend knows a handful of categories with curated tag filters; any
/// other keyword is passed through and matched generically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum AmenityKind {
    /// Schools, colleges, universities, kindergartens.
    School,
    /// Hospitals, clinics, pharmacies.
    Hospital,
    /// Restaurants, cafes, fast food.
    Restaurant,
    /// Malls, department stores, supermarkets.
    Mall,
    /// Any other keyword.
    Other(String),
}

impl AmenityKind {
    /// The categories offered by default in the nearby-search picker.
    pub const KNOWN: &[Self] = &[Self::School, Self::Hospital, Self::Restaurant, Self::Mall];

    /// The keyword sent to the backend as the `type` parameter.
    #[must_use]
    pub fn keyword(&self) -> &str {
        match self {
            Self::School => "school",
            Self::Hospital => "hospital",
            Self::Restaurant => "restaurant",
            Self::Mall => "mall",
            Self::Other(keyword) => keyword,
        }
    }
}

impl fmt::Display for AmenityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for AmenityKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let keyword = s.trim().to_lowercase();
        Ok(match keyword.as_str() {
            "school" => Self::School,
            "hospital" => Self::Hospital,
            "restaurant" => Self::Restaurant,
            "mall" => Self::Mall,
            _ => Self::Other(keyword),
        })
    }
}

impl From<String> for AmenityKind {
    fn from(value: String) -> Self {
        let Ok(kind) = value.parse();
        kind
    }
}

impl From<AmenityKind> for String {
    fn from(value: AmenityKind) -> Self {
        value.keyword().to_string()
    }
}

/// A point of interest returned by a nearby search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmenityPlace {
    /// Display name (may include a short description suffix).
    pub name: String,
    /// Where the place is.
    pub coordinates: Coordinates,
    /// The category keyword the place was found under.
    pub kind: String,
    /// Straight-line distance from the search center in metres.
    pub distance_m: Option<f64>,
}

impl AmenityPlace {
    /// Distance rounded to whole metres, if known.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn rounded_distance(&self) -> Option<u64> {
        self.distance_m
            .filter(|d| d.is_finite() && *d > 0.0)
            .map(|d| d.round() as u64)
    }
}

/// Ordering the backend applies to nearby-search results.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NearbySort {
    /// Closest first.
    #[default]
    Distance,
    /// Alphabetical by name.
    Name,
}

/// Parameters of a single nearby-search request.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    /// Search center (the user's selected location).
    pub center: Coordinates,
    /// Category to search for.
    pub kind: AmenityKind,
    /// Search radius in metres. The backend uses 5000 when absent and caps
    /// at 10000.
    pub radius_m: Option<u32>,
    /// Result ordering.
    pub sort: Option<NearbySort>,
}

/// Email/password pair used to log in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account email.
    pub email: String,
    /// Plain-text password, sent over the configured transport.
    pub password: String,
}

/// A new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Display name.
    pub name: String,
    /// Account email (unique on the server).
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

/// Whether the backend session cookie belongs to a logged-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    /// `true` when a user is logged in.
    pub logged_in: bool,
    /// Display name of the logged-in user.
    pub user: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amenity_kind_parses_known_keywords_case_insensitively() {
        assert_eq!("School".parse::<AmenityKind>().unwrap(), AmenityKind::School);
        assert_eq!(" mall ".parse::<AmenityKind>().unwrap(), AmenityKind::Mall);
    }

    #[test]
    fn amenity_kind_passes_unknown_keywords_through() {
        let kind: AmenityKind = "Park".parse().unwrap();
        assert_eq!(kind, AmenityKind::Other("park".to_string()));
        assert_eq!(kind.to_string(), "park");
    }

    #[test]
    fn price_per_area_guards_zero_area() {
        let mut fav = FavoriteProperty {
            id: 1,
            location: "Whitefield".to_string(),
            area: 1200.0,
            room_count: 2,
            bath_count: 2,
            property_age: 5,
            price: 60.0,
        };
        assert!((fav.price_per_area() - 0.05).abs() < 1e-12);

        fav.area = 0.0;
        assert!(fav.price_per_area().is_infinite());
    }

    #[test]
    fn rounded_distance_ignores_missing_and_zero() {
        let mut place = AmenityPlace {
            name: "Cafe".to_string(),
            coordinates: Coordinates::new(12.9, 77.5),
            kind: "restaurant".to_string(),
            distance_m: Some(412.6),
        };
        assert_eq!(place.rounded_distance(), Some(413));

        place.distance_m = Some(0.0);
        assert_eq!(place.rounded_distance(), None);

        place.distance_m = None;
        assert_eq!(place.rounded_distance(), None);
    }

    #[test]
    fn nearby_sort_round_trips_through_strum() {
        assert_eq!(NearbySort::Distance.as_ref(), "distance");
        assert_eq!("name".parse::<NearbySort>().unwrap(), NearbySort::Name);
    }
}
