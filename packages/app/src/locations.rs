//! Location directory: the names offered in the location selector and
//! coordinate lookup for the selected one.
//!
//! Loading the names retries on any failure (connection error, non-2xx,
//! bad body) up to the configured attempt budget. A reachable server that
//! returns an empty list is *not* retried: that is reported as an empty
//! state, distinct from the server being unreachable.

use realty_map_client::retry::{self, RetryPolicy};
use realty_map_client::{ClientError, RealtyApi};
use realty_map_models::Coordinates;

use crate::notice::{Notice, ToNotice};

/// Label of the disabled first entry in the location selector.
pub const LOCATION_PLACEHOLDER: &str = "Choose a Location";

/// Errors from the location directory.
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    /// The server answered but listed no locations.
    #[error("no locations available")]
    Empty,

    /// Every attempt to load the locations failed.
    #[error("failed to load locations after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Attempts made.
        attempts: u32,
        /// The final attempt's error.
        #[source]
        last: Box<ClientError>,
    },

    /// The backend has no coordinates for the location.
    #[error("location not found: {name}")]
    NotFound {
        /// The location that was looked up.
        name: String,
    },

    /// Any other backend failure.
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl ToNotice for LocationError {
    fn to_notice(&self) -> Notice {
        match self {
            Self::Empty => {
                Notice::empty("No locations available. Please check the backend API!")
            }
            Self::RetriesExhausted { .. } => Notice::error(
                "Error fetching locations after multiple attempts. Check the server!",
            ),
            Self::NotFound { .. } => Notice::empty("Location not found on map."),
            Self::Client(_) => Notice::error("Error updating location. Please try again."),
        }
    }
}

/// Loading state of the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryStatus {
    /// [`LocationDirectory::load`] has not run yet.
    NotLoaded,
    /// Names are available.
    Loaded,
    /// The server returned an empty list.
    Empty,
    /// The server could not be reached within the attempt budget.
    Failed {
        /// Attempts made.
        attempts: u32,
    },
}

/// One entry of the location selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// Submitted value (empty for the placeholder).
    pub value: String,
    /// Displayed text.
    pub label: String,
    /// Placeholders cannot be chosen.
    pub disabled: bool,
}

/// The list of valid location names.
#[derive(Debug, Clone)]
pub struct LocationDirectory {
    names: Vec<String>,
    status: DirectoryStatus,
    policy: RetryPolicy,
}

impl LocationDirectory {
    /// An empty directory that will load with `policy`.
    #[must_use]
    pub const fn new(policy: RetryPolicy) -> Self {
        Self {
            names: Vec::new(),
            status: DirectoryStatus::NotLoaded,
            policy,
        }
    }

    /// Loads the names, replacing whatever was loaded before.
    ///
    /// Failures are recorded in [`Self::status`] and returned as a notice;
    /// they are not propagated further.
    pub async fn load(&mut self, api: &dyn RealtyApi) -> Option<Notice> {
        log::info!("Fetching locations...");
        self.names.clear();

        match fetch_locations(api, &self.policy).await {
            Ok(names) => {
                log::info!("Loaded {} locations", names.len());
                self.names = names;
                self.status = DirectoryStatus::Loaded;
                None
            }
            Err(e) => {
                self.status = match &e {
                    LocationError::Empty => {
                        log::warn!("No locations received from API");
                        DirectoryStatus::Empty
                    }
                    LocationError::RetriesExhausted { attempts, .. } => {
                        log::error!("Giving up on locations: {e}");
                        DirectoryStatus::Failed {
                            attempts: *attempts,
                        }
                    }
                    LocationError::NotFound { .. } | LocationError::Client(_) => {
                        log::error!("Failed to load locations: {e}");
                        DirectoryStatus::Failed { attempts: 1 }
                    }
                };
                Some(e.to_notice())
            }
        }
    }

    /// Current loading state.
    #[must_use]
    pub const fn status(&self) -> &DirectoryStatus {
        &self.status
    }

    /// Loaded names in server order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Selector entries: the disabled placeholder followed by every name.
    #[must_use]
    pub fn options(&self) -> Vec<SelectOption> {
        std::iter::once(SelectOption {
            value: String::new(),
            label: LOCATION_PLACEHOLDER.to_string(),
            disabled: true,
        })
        .chain(self.names.iter().map(|name| SelectOption {
            value: name.clone(),
            label: name.clone(),
            disabled: false,
        }))
        .collect()
    }
}

/// Fetches the location names, retrying every failure per `policy`.
///
/// # Errors
///
/// Returns [`LocationError::Empty`] if the server lists no locations (not
/// retried), or [`LocationError::RetriesExhausted`] once every attempt has
/// failed.
pub async fn fetch_locations(
    api: &dyn RealtyApi,
    policy: &RetryPolicy,
) -> Result<Vec<String>, LocationError> {
    let names = retry::with_retry(policy, "get_locations", || api.locations(), |_| true)
        .await
        .map_err(|e| match e {
            ClientError::RetriesExhausted { attempts, last, .. } => {
                LocationError::RetriesExhausted { attempts, last }
            }
            other => LocationError::Client(other),
        })?;

    if names.is_empty() {
        return Err(LocationError::Empty);
    }

    Ok(names)
}

/// Looks up the coordinates of `name`. Never retried.
///
/// # Errors
///
/// Returns [`LocationError::NotFound`] if the backend has no match, or
/// [`LocationError::Client`] for any other failure.
pub async fn fetch_location_coordinates(
    api: &dyn RealtyApi,
    name: &str,
) -> Result<Coordinates, LocationError> {
    log::debug!("Fetching coordinates for: {name}");
    api.location_coords(name).await.map_err(|e| match e {
        ClientError::NotFound { message } => {
            log::warn!("Location not found: {message}");
            LocationError::NotFound {
                name: name.to_string(),
            }
        }
        other => LocationError::Client(other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeKind;
    use crate::testing::{FakeApi, unavailable};

    #[tokio::test]
    async fn populates_after_two_failures() {
        let api = FakeApi::new();
        api.script_locations(vec![
            Err(unavailable()),
            Err(unavailable()),
            Ok(vec!["Whitefield".to_string(), "Hebbal".to_string()]),
        ]);

        let mut directory = LocationDirectory::new(RetryPolicy::immediate(3));
        let notice = directory.load(&api).await;

        assert!(notice.is_none());
        assert_eq!(directory.status(), &DirectoryStatus::Loaded);
        assert_eq!(directory.names(), ["Whitefield", "Hebbal"]);
        assert_eq!(api.calls("locations"), 3);
    }

    #[tokio::test]
    async fn shows_error_after_exactly_three_attempts() {
        let api = FakeApi::new();
        api.script_locations((0..5).map(|_| Err(unavailable())).collect());

        let mut directory = LocationDirectory::new(RetryPolicy::immediate(3));
        let notice = directory.load(&api).await.unwrap();

        assert_eq!(api.calls("locations"), 3);
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(directory.status(), &DirectoryStatus::Failed { attempts: 3 });
        assert!(directory.names().is_empty());
    }

    #[tokio::test]
    async fn empty_list_is_terminal_and_not_retried() {
        let api = FakeApi::new();
        api.script_locations(vec![Ok(Vec::new()), Ok(vec!["Hebbal".to_string()])]);

        let mut directory = LocationDirectory::new(RetryPolicy::immediate(3));
        let notice = directory.load(&api).await.unwrap();

        assert_eq!(api.calls("locations"), 1);
        assert_eq!(notice.kind, NoticeKind::Empty);
        assert_eq!(directory.status(), &DirectoryStatus::Empty);
    }

    #[tokio::test]
    async fn unknown_location_is_not_found() {
        let api = FakeApi::new();
        let err = fetch_location_coordinates(&api, "Atlantis")
            .await
            .unwrap_err();
        assert!(matches!(err, LocationError::NotFound { ref name } if name == "Atlantis"));
        assert_eq!(err.to_notice().kind, NoticeKind::Empty);
        assert_eq!(api.calls("location_coords"), 1);
    }

    #[test]
    fn options_start_with_disabled_placeholder() {
        let mut directory = LocationDirectory::new(RetryPolicy::immediate(3));
        directory.names = vec!["Hebbal".to_string()];

        let options = directory.options();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].label, LOCATION_PLACEHOLDER);
        assert!(options[0].disabled);
        assert_eq!(options[1].value, "Hebbal");
        assert!(!options[1].disabled);
    }
}
