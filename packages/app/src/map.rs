//! Map view controller.
//!
//! Owns the mapping widget and all marker state: the single
//! current-location marker and the amenity markers from the latest nearby
//! search. Every marker change goes through [`MapController`] so the
//! invariants hold:
//!
//! - at most one current-location marker exists;
//! - the amenity marker count equals the number of places in the last
//!   accepted nearby-search response;
//! - amenity markers never outlive a location change.
//!
//! Location selection and nearby search are split into `begin_*` and
//! `complete_*` halves with a [`RequestToken`] issued at the start. A
//! response whose token has been superseded by a newer request is dropped,
//! so a slow response can never overwrite a newer one.

use realty_map_client::{ClientError, RealtyApi};
use realty_map_models::{AmenityKind, AmenityPlace, Coordinates, NearbyQuery, NearbySort};

use crate::locations::{self, LocationError};
use crate::notice::{Notice, ToNotice};

/// Viewport center used until the user picks a location (Bangalore).
pub const DEFAULT_CENTER: Coordinates = Coordinates::new(12.9716, 77.5946);

/// Popup of the marker placed at [`DEFAULT_CENTER`].
pub const DEFAULT_LABEL: &str = "Bangalore (Default Location)";

/// Zoom level for a selected location.
pub const LOCATION_ZOOM: u8 = 14;

/// Zoom level when focusing a single place.
pub const PLACE_ZOOM: u8 = 16;

/// Text of the nearby list before any search.
pub const NEARBY_PROMPT: &str = "Select an amenity type to see nearby places";

/// Handle to a marker, assigned by the widget.
pub type MarkerId = u64;

/// Failure reported by a [`MapWidget`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("map widget error: {message}")]
pub struct WidgetError {
    /// What went wrong.
    pub message: String,
}

/// The mapping widget the controller drives.
///
/// Implementations render tiles and markers; the controller only decides
/// which markers exist and where the viewport is.
pub trait MapWidget {
    /// Creates the map with its tile layer and sets the initial viewport.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError`] if the map cannot be created.
    fn mount(&mut self, center: Coordinates, zoom: u8) -> Result<(), WidgetError>;

    /// Moves the viewport.
    fn set_view(&mut self, center: Coordinates, zoom: u8);

    /// Adds a marker with a popup and returns its handle.
    fn add_marker(&mut self, at: Coordinates, popup: &str) -> MarkerId;

    /// Removes a marker. Unknown handles are ignored.
    fn remove_marker(&mut self, marker: MarkerId);

    /// Opens a marker's popup.
    fn open_popup(&mut self, marker: MarkerId);

    /// Recomputes the map size after its container became visible.
    fn invalidate_size(&mut self);
}

/// Errors from map operations.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// The widget never initialized.
    #[error("map is not ready")]
    NotReady,

    /// A nearby search needs a selected location first.
    #[error("no reference location")]
    NoReferenceLocation,

    /// `focus_place` was given an index past the listed places.
    #[error("no place at index {index} (have {len})")]
    NoSuchPlace {
        /// Requested index.
        index: usize,
        /// Number of listed places.
        len: usize,
    },
}

impl ToNotice for MapError {
    fn to_notice(&self) -> Notice {
        match self {
            Self::NotReady => {
                Notice::error("Map is not ready. Please refresh the page and try again.")
            }
            Self::NoReferenceLocation => Notice::validation("Please select a location first!"),
            Self::NoSuchPlace { .. } => Notice::validation("That place is no longer listed."),
        }
    }
}

/// Lifecycle of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapPhase {
    /// The widget is not mounted (or failed to mount).
    Uninitialized,
    /// Idle.
    Ready,
    /// A location lookup or nearby search is in flight.
    Updating,
}

/// Identifies one issued request within its operation family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Monotonic request counter for one operation family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestSequence {
    latest: u64,
    settled: bool,
}

impl Default for RequestSequence {
    fn default() -> Self {
        Self {
            latest: 0,
            settled: true,
        }
    }
}

impl RequestSequence {
    /// Issues a token that supersedes every earlier one.
    pub const fn issue(&mut self) -> RequestToken {
        self.latest += 1;
        self.settled = false;
        RequestToken(self.latest)
    }

    /// Marks `token`'s request complete. Returns `false` if a newer token
    /// has been issued, in which case the response must be dropped.
    pub const fn settle(&mut self, token: RequestToken) -> bool {
        if token.0 == self.latest {
            self.settled = true;
            true
        } else {
            false
        }
    }

    /// Supersedes every outstanding token without issuing a new request.
    pub const fn invalidate(&mut self) {
        self.latest += 1;
        self.settled = true;
    }

    /// Returns `true` while the latest issued request has not completed.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        !self.settled
    }
}

/// A location selection waiting for its coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRequest {
    /// Sequence token.
    pub token: RequestToken,
    /// Selected location name.
    pub name: String,
}

/// A nearby search waiting for its results.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyRequest {
    /// Sequence token.
    pub token: RequestToken,
    /// Query to send.
    pub query: NearbyQuery,
}

/// How a location selection ended.
#[derive(Debug)]
pub enum LocationOutcome {
    /// The map now centers on the location.
    Recentered(Coordinates),
    /// The coordinates could not be resolved; markers are untouched.
    Unresolved(LocationError),
    /// A newer selection was made; this response was dropped.
    Superseded,
}

/// How a nearby search ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NearbyOutcome {
    /// This many places are now marked.
    Found(usize),
    /// The search succeeded with no matches; no markers remain.
    NoResults,
    /// The search failed; markers are untouched.
    Failed(String),
    /// A newer search or a location change happened; dropped.
    Superseded,
}

/// One entry of the nearby-places list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceCard {
    /// Place name.
    pub name: String,
    /// Category keyword.
    pub kind: String,
    /// `412m` style distance, if known.
    pub distance: Option<String>,
}

impl From<&AmenityPlace> for PlaceCard {
    fn from(place: &AmenityPlace) -> Self {
        Self {
            name: place.name.clone(),
            kind: place.kind.clone(),
            distance: place.rounded_distance().map(|m| format!("{m}m")),
        }
    }
}

/// What the nearby-places list shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NearbyView {
    /// No search since the last location change.
    Prompt,
    /// A search is in flight.
    Loading(AmenityKind),
    /// Results, in marker order.
    Places(AmenityKind, Vec<PlaceCard>),
    /// The search matched nothing.
    NoResults(AmenityKind),
    /// The search failed.
    Failed(AmenityKind, String),
}

impl NearbyView {
    /// The list's status line.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Prompt => NEARBY_PROMPT.to_string(),
            Self::Loading(kind) => format!("Searching for nearby {kind}s..."),
            Self::Places(kind, cards) => format!("{} nearby {kind}s", cards.len()),
            Self::NoResults(kind) => {
                format!("No nearby {kind}s found within the search area.")
            }
            Self::Failed(kind, message) => format!("Error fetching nearby {kind}: {message}"),
        }
    }

    /// The list state as a notice.
    #[must_use]
    pub fn to_notice(&self) -> Notice {
        match self {
            Self::Prompt | Self::Loading(_) => Notice::info(self.message()),
            Self::Places(..) => Notice::success(self.message()),
            Self::NoResults(_) => Notice::empty(self.message()),
            Self::Failed(..) => Notice::error(self.message()),
        }
    }
}

/// Nearby-search parameters applied to every query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NearbyOptions {
    /// Search radius in metres.
    pub radius_m: Option<u32>,
    /// Result ordering.
    pub sort: Option<NearbySort>,
}

/// Marker bookkeeping for the page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapState {
    /// The single current-location marker.
    pub current_marker: Option<MarkerId>,
    /// Amenity markers, parallel to `places`.
    pub amenity_markers: Vec<MarkerId>,
    /// Places behind `amenity_markers`.
    pub places: Vec<AmenityPlace>,
    /// The user's selected location; `None` until a recenter.
    pub user_location: Option<Coordinates>,
    /// Label of the current-location marker.
    pub label: Option<String>,
}

/// Drives a [`MapWidget`] and keeps its markers consistent.
#[derive(Debug)]
pub struct MapController<W: MapWidget> {
    widget: W,
    initialized: bool,
    state: MapState,
    nearby: NearbyView,
    options: NearbyOptions,
    location_requests: RequestSequence,
    nearby_requests: RequestSequence,
}

impl<W: MapWidget> MapController<W> {
    /// Wraps an unmounted widget.
    pub fn new(widget: W, options: NearbyOptions) -> Self {
        Self {
            widget,
            initialized: false,
            state: MapState::default(),
            nearby: NearbyView::Prompt,
            options,
            location_requests: RequestSequence::default(),
            nearby_requests: RequestSequence::default(),
        }
    }

    /// Mounts the widget at [`DEFAULT_CENTER`] with the default marker.
    ///
    /// A mount failure is logged and leaves the controller
    /// [`MapPhase::Uninitialized`] for good. Calling this again after a
    /// successful mount does nothing.
    pub fn initialize(&mut self) -> bool {
        if self.initialized {
            return true;
        }

        log::info!("Initializing map...");
        if let Err(e) = self.widget.mount(DEFAULT_CENTER, LOCATION_ZOOM) {
            log::error!("Error initializing map: {e}");
            return false;
        }

        let marker = self.widget.add_marker(DEFAULT_CENTER, DEFAULT_LABEL);
        self.widget.open_popup(marker);
        self.state.current_marker = Some(marker);
        self.state.label = Some(DEFAULT_LABEL.to_string());
        self.initialized = true;
        log::info!("Map initialized");
        true
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> MapPhase {
        if !self.initialized {
            MapPhase::Uninitialized
        } else if self.location_requests.is_pending() || self.nearby_requests.is_pending() {
            MapPhase::Updating
        } else {
            MapPhase::Ready
        }
    }

    /// Marker bookkeeping.
    #[must_use]
    pub const fn state(&self) -> &MapState {
        &self.state
    }

    /// What the nearby list shows.
    #[must_use]
    pub const fn nearby_view(&self) -> &NearbyView {
        &self.nearby
    }

    /// The wrapped widget.
    #[must_use]
    pub const fn widget(&self) -> &W {
        &self.widget
    }

    /// The user's selected location.
    #[must_use]
    pub const fn user_location(&self) -> Option<Coordinates> {
        self.state.user_location
    }

    /// Number of amenity markers on the map.
    #[must_use]
    pub fn amenity_marker_count(&self) -> usize {
        self.state.amenity_markers.len()
    }

    /// Moves the current-location marker to `at` and centers the view.
    ///
    /// Amenity markers from the previous location are removed first and any
    /// in-flight nearby search is superseded. Calling this repeatedly with
    /// the same arguments leaves the same single marker.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::NotReady`] if the widget never mounted.
    pub fn recenter(&mut self, at: Coordinates, label: &str) -> Result<(), MapError> {
        self.ensure_ready()?;

        self.clear_amenities();
        self.nearby_requests.invalidate();

        if let Some(old) = self.state.current_marker.take() {
            self.widget.remove_marker(old);
        }
        let marker = self.widget.add_marker(at, label);
        self.widget.open_popup(marker);
        self.widget.set_view(at, LOCATION_ZOOM);

        self.state.current_marker = Some(marker);
        self.state.user_location = Some(at);
        self.state.label = Some(label.to_string());
        self.nearby = NearbyView::Prompt;

        log::info!("Map updated to: {at}");
        Ok(())
    }

    /// Removes every amenity marker. Safe to call with none.
    pub fn clear_amenities(&mut self) {
        for marker in self.state.amenity_markers.drain(..) {
            self.widget.remove_marker(marker);
        }
        self.state.places.clear();
    }

    /// Starts a location selection: clears amenity markers and issues a
    /// token for the coordinate lookup.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::NotReady`] if the widget never mounted.
    pub fn begin_location(&mut self, name: &str) -> Result<LocationRequest, MapError> {
        self.ensure_ready()?;

        self.clear_amenities();
        self.nearby_requests.invalidate();
        self.nearby = NearbyView::Prompt;

        Ok(LocationRequest {
            token: self.location_requests.issue(),
            name: name.to_string(),
        })
    }

    /// Applies the coordinate lookup for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::NotReady`] if the widget never mounted.
    pub fn complete_location(
        &mut self,
        request: LocationRequest,
        result: Result<Coordinates, LocationError>,
    ) -> Result<LocationOutcome, MapError> {
        if !self.location_requests.settle(request.token) {
            log::debug!("Dropping superseded location lookup for {}", request.name);
            return Ok(LocationOutcome::Superseded);
        }

        match result {
            Ok(at) => {
                self.recenter(at, &request.name)?;
                Ok(LocationOutcome::Recentered(at))
            }
            Err(e) => {
                log::error!("Error fetching location {}: {e}", request.name);
                Ok(LocationOutcome::Unresolved(e))
            }
        }
    }

    /// Resolves `name` and recenters on it.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::NotReady`] if the widget never mounted.
    pub async fn select_location(
        &mut self,
        api: &dyn RealtyApi,
        name: &str,
    ) -> Result<LocationOutcome, MapError> {
        let request = self.begin_location(name)?;
        let result = locations::fetch_location_coordinates(api, name).await;
        self.complete_location(request, result)
    }

    /// Starts a nearby search around the user's location.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::NotReady`] if the widget never mounted, or
    /// [`MapError::NoReferenceLocation`] before the first recenter.
    pub fn begin_nearby(&mut self, kind: AmenityKind) -> Result<NearbyRequest, MapError> {
        self.ensure_ready()?;
        let center = self
            .state
            .user_location
            .ok_or(MapError::NoReferenceLocation)?;

        log::info!("Fetching nearby {kind} at {center}");
        self.nearby = NearbyView::Loading(kind.clone());

        Ok(NearbyRequest {
            token: self.nearby_requests.issue(),
            query: NearbyQuery {
                center,
                kind,
                radius_m: self.options.radius_m,
                sort: self.options.sort,
            },
        })
    }

    /// Applies the response for `request`.
    ///
    /// On success every amenity marker is replaced by one marker per place.
    /// On failure the existing markers stay and the list shows the error.
    pub fn complete_nearby(
        &mut self,
        request: NearbyRequest,
        result: Result<Vec<AmenityPlace>, ClientError>,
    ) -> NearbyOutcome {
        if !self.nearby_requests.settle(request.token) {
            log::debug!("Dropping superseded nearby search for {}", request.query.kind);
            return NearbyOutcome::Superseded;
        }

        let kind = request.query.kind;
        let places = match result {
            Ok(places) => places,
            Err(e) => {
                log::error!("Error fetching places: {e}");
                let message = e.to_string();
                self.nearby = NearbyView::Failed(kind, message.clone());
                return NearbyOutcome::Failed(message);
            }
        };

        self.clear_amenities();

        if places.is_empty() {
            self.nearby = NearbyView::NoResults(kind);
            return NearbyOutcome::NoResults;
        }

        for place in &places {
            let marker = self.widget.add_marker(place.coordinates, &place_popup(place));
            self.state.amenity_markers.push(marker);
        }
        let cards = places.iter().map(PlaceCard::from).collect();
        let count = places.len();
        self.state.places = places;
        self.nearby = NearbyView::Places(kind, cards);

        NearbyOutcome::Found(count)
    }

    /// Searches for `kind` around the user's location and replaces the
    /// amenity markers with the results.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::NotReady`] if the widget never mounted, or
    /// [`MapError::NoReferenceLocation`] before the first recenter.
    pub async fn show_nearby(
        &mut self,
        api: &dyn RealtyApi,
        kind: AmenityKind,
    ) -> Result<NearbyOutcome, MapError> {
        let request = self.begin_nearby(kind)?;
        let result = api.nearby_places(&request.query).await;
        Ok(self.complete_nearby(request, result))
    }

    /// Zooms to the listed place at `index` and opens its popup.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::NoSuchPlace`] if `index` is out of range.
    pub fn focus_place(&mut self, index: usize) -> Result<&AmenityPlace, MapError> {
        self.ensure_ready()?;
        let len = self.state.places.len();
        let (Some(place), Some(marker)) = (
            self.state.places.get(index),
            self.state.amenity_markers.get(index).copied(),
        ) else {
            return Err(MapError::NoSuchPlace { index, len });
        };

        self.widget.set_view(place.coordinates, PLACE_ZOOM);
        self.widget.open_popup(marker);
        Ok(place)
    }

    /// Tells the widget its container changed size.
    pub fn invalidate_size(&mut self) {
        if self.initialized {
            self.widget.invalidate_size();
        }
    }

    const fn ensure_ready(&self) -> Result<(), MapError> {
        if self.initialized {
            Ok(())
        } else {
            Err(MapError::NotReady)
        }
    }
}

/// Popup text of an amenity marker: name, then distance when known.
fn place_popup(place: &AmenityPlace) -> String {
    place.rounded_distance().map_or_else(
        || place.name.clone(),
        |m| format!("{}\n{m} m away", place.name),
    )
}
