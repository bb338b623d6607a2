//! Scripted backend and recording map widget for unit tests.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use realty_map_client::{ClientError, RealtyApi};
use realty_map_models::{
    AmenityPlace, Coordinates, Credentials, EstimateRequest, FavoriteProperty, NearbyQuery,
    NewFavorite, Registration, SessionStatus,
};

use crate::map::{MapWidget, MarkerId, WidgetError};

pub fn unavailable() -> ClientError {
    ClientError::Status {
        status: 503,
        message: "Service Unavailable".to_string(),
    }
}

pub fn place(name: &str, distance_m: f64) -> AmenityPlace {
    AmenityPlace {
        name: name.to_string(),
        coordinates: Coordinates::new(12.9, 77.5),
        kind: "school".to_string(),
        distance_m: Some(distance_m),
    }
}

pub fn favorite(id: i64, location: &str, area: f64, price: f64) -> FavoriteProperty {
    FavoriteProperty {
        id,
        location: location.to_string(),
        area,
        room_count: 2,
        bath_count: 2,
        property_age: 5,
        price,
    }
}

struct Account {
    name: String,
    password: String,
}

/// In-memory backend. Scripted endpoints pop queued responses; the
/// favorites and session endpoints behave like a small real server.
#[derive(Default)]
pub struct FakeApi {
    locations: Mutex<VecDeque<Result<Vec<String>, ClientError>>>,
    coords: Mutex<HashMap<String, Coordinates>>,
    prices: Mutex<VecDeque<Result<Option<f64>, ClientError>>>,
    nearby: Mutex<VecDeque<Result<Vec<AmenityPlace>, ClientError>>>,
    favorites: Mutex<Vec<FavoriteProperty>>,
    next_id: Mutex<i64>,
    accounts: Mutex<HashMap<String, Account>>,
    session: Mutex<Option<String>>,
    require_login: Mutex<bool>,
    delete_errors: Mutex<VecDeque<ClientError>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose favorites endpoints reject requests without a
    /// logged-in session.
    pub fn with_login_required() -> Self {
        let api = Self::new();
        *api.require_login.lock().unwrap() = true;
        api
    }

    pub fn script_locations(&self, responses: Vec<Result<Vec<String>, ClientError>>) {
        self.locations.lock().unwrap().extend(responses);
    }

    pub fn script_prices(&self, responses: Vec<Result<Option<f64>, ClientError>>) {
        self.prices.lock().unwrap().extend(responses);
    }

    pub fn script_nearby(&self, responses: Vec<Result<Vec<AmenityPlace>, ClientError>>) {
        self.nearby.lock().unwrap().extend(responses);
    }

    /// Makes the next deletes fail with `errors`, in order.
    pub fn script_delete_errors(&self, errors: Vec<ClientError>) {
        self.delete_errors.lock().unwrap().extend(errors);
    }

    pub fn add_location(&self, name: &str, at: Coordinates) {
        self.coords.lock().unwrap().insert(name.to_string(), at);
    }

    pub fn add_account(&self, name: &str, email: &str, password: &str) {
        self.accounts.lock().unwrap().insert(
            email.to_string(),
            Account {
                name: name.to_string(),
                password: password.to_string(),
            },
        );
    }

    pub fn stored_favorites(&self) -> Vec<FavoriteProperty> {
        self.favorites.lock().unwrap().clone()
    }

    pub fn calls(&self, endpoint: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(endpoint)
            .copied()
            .unwrap_or(0)
    }

    fn record(&self, endpoint: &'static str) {
        *self.calls.lock().unwrap().entry(endpoint).or_default() += 1;
    }

    fn authorize(&self) -> Result<(), ClientError> {
        if *self.require_login.lock().unwrap() && self.session.lock().unwrap().is_none() {
            return Err(ClientError::Unauthorized {
                status: 401,
                message: "login required".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RealtyApi for FakeApi {
    async fn locations(&self) -> Result<Vec<String>, ClientError> {
        self.record("locations");
        self.locations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unavailable()))
    }

    async fn location_coords(&self, name: &str) -> Result<Coordinates, ClientError> {
        self.record("location_coords");
        self.coords
            .lock()
            .unwrap()
            .get(name)
            .copied()
            .ok_or_else(|| ClientError::NotFound {
                message: "Coordinates not found".to_string(),
            })
    }

    async fn predict_price(&self, _request: &EstimateRequest) -> Result<Option<f64>, ClientError> {
        self.record("predict_price");
        self.prices
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unavailable()))
    }

    async fn nearby_places(&self, _query: &NearbyQuery) -> Result<Vec<AmenityPlace>, ClientError> {
        self.record("nearby_places");
        self.nearby
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unavailable()))
    }

    async fn save_favorite(&self, favorite: &NewFavorite) -> Result<String, ClientError> {
        self.record("save_favorite");
        self.authorize()?;
        let id = {
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            *next_id
        };
        self.favorites.lock().unwrap().push(FavoriteProperty {
            id,
            location: favorite.location.clone(),
            area: favorite.area,
            room_count: favorite.room_count,
            bath_count: favorite.bath_count,
            property_age: favorite.property_age,
            price: favorite.price,
        });
        Ok("Property saved to favorites!".to_string())
    }

    async fn favorites(&self) -> Result<Vec<FavoriteProperty>, ClientError> {
        self.record("favorites");
        self.authorize()?;
        Ok(self.favorites.lock().unwrap().clone())
    }

    async fn delete_favorite(&self, id: i64) -> Result<String, ClientError> {
        self.record("delete_favorite");
        self.authorize()?;
        if let Some(e) = self.delete_errors.lock().unwrap().pop_front() {
            return Err(e);
        }
        let mut favorites = self.favorites.lock().unwrap();
        let before = favorites.len();
        favorites.retain(|f| f.id != id);
        if favorites.len() == before {
            return Err(ClientError::NotFound {
                message: "Not Found".to_string(),
            });
        }
        Ok("Favorite deleted successfully".to_string())
    }

    async fn register(&self, registration: &Registration) -> Result<String, ClientError> {
        self.record("register");
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(&registration.email) {
            return Err(ClientError::Status {
                status: 400,
                message: "User already exists".to_string(),
            });
        }
        accounts.insert(
            registration.email.clone(),
            Account {
                name: registration.name.clone(),
                password: registration.password.clone(),
            },
        );
        Ok("User registered successfully!".to_string())
    }

    async fn login(&self, credentials: &Credentials) -> Result<String, ClientError> {
        self.record("login");
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(&credentials.email) {
            Some(account) if account.password == credentials.password => {
                *self.session.lock().unwrap() = Some(account.name.clone());
                Ok(account.name.clone())
            }
            _ => Err(ClientError::Unauthorized {
                status: 401,
                message: "Invalid email or password".to_string(),
            }),
        }
    }

    async fn logout(&self) -> Result<String, ClientError> {
        self.record("logout");
        *self.session.lock().unwrap() = None;
        Ok("Logged out successfully".to_string())
    }

    async fn check_session(&self) -> Result<SessionStatus, ClientError> {
        self.record("check_session");
        let user = self.session.lock().unwrap().clone();
        Ok(SessionStatus {
            logged_in: user.is_some(),
            user,
        })
    }
}

/// Map widget that records marker operations.
#[derive(Debug, Default)]
pub struct RecordingMap {
    fail_mount: bool,
    next_marker: MarkerId,
    markers: BTreeMap<MarkerId, (Coordinates, String)>,
    view: Option<(Coordinates, u8)>,
    last_popup: Option<MarkerId>,
    resizes: usize,
}

impl RecordingMap {
    pub fn failing() -> Self {
        Self {
            fail_mount: true,
            ..Self::default()
        }
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn center(&self) -> Option<Coordinates> {
        self.view.map(|(center, _)| center)
    }

    pub fn zoom(&self) -> Option<u8> {
        self.view.map(|(_, zoom)| zoom)
    }

    pub const fn last_popup(&self) -> Option<MarkerId> {
        self.last_popup
    }

    pub const fn resizes(&self) -> usize {
        self.resizes
    }
}

impl MapWidget for RecordingMap {
    fn mount(&mut self, center: Coordinates, zoom: u8) -> Result<(), WidgetError> {
        if self.fail_mount {
            return Err(WidgetError {
                message: "map container not found".to_string(),
            });
        }
        self.view = Some((center, zoom));
        Ok(())
    }

    fn set_view(&mut self, center: Coordinates, zoom: u8) {
        self.view = Some((center, zoom));
    }

    fn add_marker(&mut self, at: Coordinates, popup: &str) -> MarkerId {
        self.next_marker += 1;
        self.markers
            .insert(self.next_marker, (at, popup.to_string()));
        self.next_marker
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        self.markers.remove(&marker);
    }

    fn open_popup(&mut self, marker: MarkerId) {
        self.last_popup = Some(marker);
    }

    fn invalidate_size(&mut self) {
        self.resizes += 1;
    }
}
