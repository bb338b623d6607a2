//! The whole page: every component wired to one backend.
//!
//! Each user action returns the [`Notice`] to show and also keeps it as
//! [`Page::notice`]. No failure leaves the page unusable.

use std::sync::Arc;

use realty_map_client::{ClientConfig, RealtyApi};
use realty_map_models::{AmenityKind, AmenityPlace, Credentials, Registration};

use crate::compare::{self, ComparisonTable};
use crate::estimate::{EstimateForm, EstimatePanel};
use crate::favorites::{FavoritesError, FavoritesStore};
use crate::locations::LocationDirectory;
use crate::map::{LocationOutcome, MapController, MapWidget, NearbyOptions, NearbyOutcome};
use crate::notice::{Notice, ToNotice};
use crate::session::Session;
use crate::shell::{ClickTarget, Modal, Modals, Tab, Tabs};

/// Page state.
pub struct Page<W: MapWidget> {
    api: Arc<dyn RealtyApi>,
    directory: LocationDirectory,
    map: MapController<W>,
    estimate: EstimatePanel,
    favorites: FavoritesStore,
    session: Session,
    tabs: Tabs,
    modals: Modals,
    comparison: Option<ComparisonTable>,
    notice: Option<Notice>,
}

impl<W: MapWidget> Page<W> {
    /// Wires the components. Nothing is fetched until [`Self::load`].
    pub fn new(api: Arc<dyn RealtyApi>, widget: W, config: &ClientConfig) -> Self {
        let options = NearbyOptions {
            radius_m: config.nearby.radius_m,
            sort: config.nearby.sort,
        };

        Self {
            api,
            directory: LocationDirectory::new(config.locations.retry),
            map: MapController::new(widget, options),
            estimate: EstimatePanel::default(),
            favorites: FavoritesStore::default(),
            session: Session::default(),
            tabs: Tabs::default(),
            modals: Modals::default(),
            comparison: None,
            notice: None,
        }
    }

    /// Mounts the map, loads the locations and restores an existing
    /// session. Returns every notice raised on the way.
    pub async fn load(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();

        if !self.map.initialize() {
            notices.push(Notice::error(
                "Map could not be loaded. Location features are unavailable.",
            ));
        }

        if let Some(notice) = self.directory.load(self.api.as_ref()).await {
            notices.push(notice);
        }

        match self.session.refresh(self.api.as_ref()).await {
            Ok(true) => {
                if let Err(e) = self.favorites.reload(self.api.as_ref()).await {
                    notices.push(e.to_notice());
                }
            }
            Ok(false) => {}
            Err(e) => log::warn!("Could not check session: {e}"),
        }

        if let Some(last) = notices.last() {
            self.notice = Some(last.clone());
        }
        notices
    }

    /// Centers the map on a location from the directory.
    pub async fn select_location(&mut self, name: &str) -> Notice {
        let notice = match self.map.select_location(self.api.as_ref(), name).await {
            Ok(LocationOutcome::Recentered(at)) => Notice::success(format!("{name} ({at})")),
            Ok(LocationOutcome::Unresolved(e)) => e.to_notice(),
            Ok(LocationOutcome::Superseded) => Notice::info("A newer location was selected."),
            Err(e) => e.to_notice(),
        };
        self.show(notice)
    }

    /// Validates the form and requests an estimate.
    pub async fn estimate(&mut self, form: &EstimateForm) -> Notice {
        let notice = match self.estimate.submit(self.api.as_ref(), form).await {
            Ok(view) => view
                .to_notice()
                .unwrap_or_else(|| Notice::info(view.headline())),
            Err(e) => e.to_notice(),
        };
        self.show(notice)
    }

    /// Saves the estimate on screen. Opens the login dialog if the backend
    /// wants a session.
    pub async fn save_favorite(&mut self) -> Notice {
        let result = self
            .favorites
            .save(self.api.as_ref(), self.estimate.view().estimate())
            .await;

        let notice = match result {
            Ok(message) => Notice::success(message),
            Err(e) => {
                if matches!(e, FavoritesError::AuthenticationRequired) {
                    self.modals.open(Modal::Auth);
                }
                e.to_notice()
            }
        };
        self.show(notice)
    }

    /// Refetches the favorites.
    pub async fn reload_favorites(&mut self) -> Notice {
        let notice = match self.favorites.reload(self.api.as_ref()).await {
            Ok(favorites) => {
                let count = favorites.len();
                self.favorites
                    .placeholder()
                    .unwrap_or_else(|| Notice::info(format!("{count} saved properties")))
            }
            Err(e) => {
                if matches!(e, FavoritesError::AuthenticationRequired) {
                    self.modals.open(Modal::Auth);
                }
                e.to_notice()
            }
        };
        self.show(notice)
    }

    /// Deletes a favorite.
    pub async fn remove_favorite(&mut self, id: i64) -> Notice {
        let notice = match self.favorites.remove(self.api.as_ref(), id).await {
            Ok(message) => Notice::success(message),
            Err(e) => e.to_notice(),
        };
        self.show(notice)
    }

    /// Compares the selected favorites and opens the comparison dialog.
    pub fn compare(&mut self, selected: &[i64]) -> Notice {
        let notice = match compare::compare(self.favorites.list(), selected) {
            Ok(table) => {
                let notice = Notice::success(format!("Comparing {} properties", table.columns()));
                self.comparison = Some(table);
                self.modals.open(Modal::Compare);
                notice
            }
            Err(e) => e.to_notice(),
        };
        self.show(notice)
    }

    /// Searches for amenities around the selected location.
    pub async fn show_nearby(&mut self, kind: AmenityKind) -> Notice {
        let notice = match self.map.show_nearby(self.api.as_ref(), kind).await {
            Ok(NearbyOutcome::Superseded) => Notice::info("A newer search replaced this one."),
            Ok(_) => self.map.nearby_view().to_notice(),
            Err(e) => e.to_notice(),
        };
        self.show(notice)
    }

    /// Zooms to a listed place.
    ///
    /// # Errors
    ///
    /// Returns the notice to show if `index` is not listed.
    pub fn focus_place(&mut self, index: usize) -> Result<&AmenityPlace, Notice> {
        match self.map.focus_place(index) {
            Ok(place) => Ok(place),
            Err(e) => {
                let notice = e.to_notice();
                self.notice = Some(notice.clone());
                Err(notice)
            }
        }
    }

    /// Switches tabs, resizing the map when it becomes visible.
    pub fn activate_tab(&mut self, tab: Tab) {
        if self.tabs.activate(tab) {
            self.map.invalidate_size();
        }
    }

    /// Applies a click on a dialog.
    pub fn click(&mut self, modal: Modal, target: ClickTarget) -> bool {
        self.modals.click(modal, target)
    }

    /// Logs in, closes the login dialog and loads the user's favorites.
    pub async fn login(&mut self, credentials: &Credentials) -> Notice {
        let notice = match self.session.login(self.api.as_ref(), credentials).await {
            Ok(user) => {
                let notice = Notice::success(format!("Welcome back, {user}!"));
                self.modals.close(Modal::Auth);
                if let Err(e) = self.favorites.reload(self.api.as_ref()).await {
                    log::warn!("Logged in but loading favorites failed: {e}");
                }
                notice
            }
            Err(e) => e.to_notice(),
        };
        self.show(notice)
    }

    /// Creates an account.
    pub async fn register(&mut self, registration: &Registration) -> Notice {
        let notice = match self.session.register(self.api.as_ref(), registration).await {
            Ok(message) => Notice::success(format!("{message} Please log in.")),
            Err(e) => e.to_notice(),
        };
        self.show(notice)
    }

    /// Logs out and forgets the cached favorites.
    pub async fn logout(&mut self) -> Notice {
        self.favorites.clear();
        self.comparison = None;
        self.modals.close(Modal::Compare);
        let notice = match self.session.logout(self.api.as_ref()).await {
            Ok(message) => Notice::success(message),
            Err(e) => e.to_notice(),
        };
        self.show(notice)
    }

    /// Location selector contents.
    #[must_use]
    pub const fn directory(&self) -> &LocationDirectory {
        &self.directory
    }

    /// Map controller.
    #[must_use]
    pub const fn map(&self) -> &MapController<W> {
        &self.map
    }

    /// Estimate output.
    #[must_use]
    pub const fn estimate_panel(&self) -> &EstimatePanel {
        &self.estimate
    }

    /// Cached favorites.
    #[must_use]
    pub const fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    /// Login state.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Tab strip.
    #[must_use]
    pub const fn tabs(&self) -> &Tabs {
        &self.tabs
    }

    /// Open dialogs.
    #[must_use]
    pub const fn modals(&self) -> &Modals {
        &self.modals
    }

    /// The last comparison table.
    #[must_use]
    pub const fn comparison(&self) -> Option<&ComparisonTable> {
        self.comparison.as_ref()
    }

    /// The most recent notice.
    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    fn show(&mut self, notice: Notice) -> Notice {
        log::debug!("{}: {}", notice.kind, notice.message);
        self.notice = Some(notice.clone());
        notice
    }
}
