//! Saved properties.
//!
//! The cache is never edited locally: every successful save or removal is
//! followed by a full reload from the backend.

use realty_map_client::{ClientError, RealtyApi};
use realty_map_models::{FavoriteProperty, NewFavorite};

use crate::estimate::RenderedEstimate;
use crate::format;
use crate::notice::{Notice, ToNotice};

/// Shown instead of cards when nothing is saved.
pub const EMPTY_PLACEHOLDER: &str = "No saved properties found. Start by estimating a price!";

/// Errors from the favorites store.
#[derive(Debug, thiserror::Error)]
pub enum FavoritesError {
    /// Save was requested with no priced estimate on screen.
    #[error("Estimate the price first before saving.")]
    NoEstimate,

    /// The backend requires a logged-in session.
    #[error("Please log in to save properties.")]
    AuthenticationRequired,

    /// The backend refused the request.
    #[error("{message}")]
    Rejected {
        /// Server-provided reason.
        message: String,
    },

    /// Transport or decoding failure.
    #[error(transparent)]
    Client(ClientError),
}

impl From<ClientError> for FavoritesError {
    fn from(value: ClientError) -> Self {
        match value {
            ClientError::Unauthorized { .. } => Self::AuthenticationRequired,
            ClientError::Status { status, message } if (400..500).contains(&status) => {
                Self::Rejected { message }
            }
            ClientError::NotFound { message } => Self::Rejected { message },
            other => Self::Client(other),
        }
    }
}

impl ToNotice for FavoritesError {
    fn to_notice(&self) -> Notice {
        match self {
            Self::NoEstimate => Notice::validation(self.to_string()),
            Self::AuthenticationRequired => Notice::auth_required(self.to_string()),
            Self::Rejected { message } => Notice::error(format!("Error: {message}")),
            Self::Client(_) => Notice::error("Error saving favorite. Please try again."),
        }
    }
}

/// One rendered favorite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteCard {
    /// Backend id, for the remove and compare actions.
    pub id: i64,
    /// Location name.
    pub location: String,
    /// Detail lines in display order.
    pub details: Vec<String>,
    /// `₹P Lakh` price, unrounded.
    pub price: String,
}

impl From<&FavoriteProperty> for FavoriteCard {
    fn from(favorite: &FavoriteProperty) -> Self {
        Self {
            id: favorite.id,
            location: favorite.location.clone(),
            details: vec![
                format!("{} BHK", favorite.room_count),
                format!("{} Bath", favorite.bath_count),
                format!("{} sqft", favorite.area),
                format!("{} Years Old", favorite.property_age),
            ],
            price: format::stored_lakh_price(favorite.price),
        }
    }
}

/// Client-side cache of the user's favorites.
#[derive(Debug, Clone, Default)]
pub struct FavoritesStore {
    all_favorites: Vec<FavoriteProperty>,
}

impl FavoritesStore {
    /// Cached favorites in server order.
    #[must_use]
    pub fn list(&self) -> &[FavoriteProperty] {
        &self.all_favorites
    }

    /// Looks up a cached favorite.
    #[must_use]
    pub fn get(&self, id: i64) -> Option<&FavoriteProperty> {
        self.all_favorites.iter().find(|f| f.id == id)
    }

    /// Replaces the cache with the backend's list.
    ///
    /// # Errors
    ///
    /// Returns [`FavoritesError::AuthenticationRequired`] without a session,
    /// or another variant if the request fails. The cache is left as it was.
    pub async fn reload(&mut self, api: &dyn RealtyApi) -> Result<&[FavoriteProperty], FavoritesError> {
        let favorites = api.favorites().await?;
        log::debug!("Loaded {} favorites", favorites.len());
        self.all_favorites = favorites;
        Ok(&self.all_favorites)
    }

    /// Stores the estimate on screen as a favorite, then reloads.
    ///
    /// # Errors
    ///
    /// Returns [`FavoritesError::NoEstimate`] when `estimate` is `None`,
    /// [`FavoritesError::AuthenticationRequired`] on 401/403, or another
    /// variant if the backend rejects the save.
    pub async fn save(
        &mut self,
        api: &dyn RealtyApi,
        estimate: Option<&RenderedEstimate>,
    ) -> Result<String, FavoritesError> {
        let estimate = estimate.ok_or(FavoritesError::NoEstimate)?;
        let favorite = NewFavorite::from_estimate(&estimate.request, estimate.price);

        let message = api.save_favorite(&favorite).await.inspect_err(|e| {
            log::error!("Error saving favorite: {e}");
        })?;
        log::info!("Saved favorite for {}", favorite.location);

        self.reload_after_change(api).await;
        Ok(message)
    }

    /// Deletes a favorite, then reloads.
    ///
    /// # Errors
    ///
    /// Returns [`FavoritesError::AuthenticationRequired`] on 401,
    /// [`FavoritesError::Rejected`] on 403 (the favorite is not the
    /// user's), or another variant if the request fails.
    pub async fn remove(&mut self, api: &dyn RealtyApi, id: i64) -> Result<String, FavoritesError> {
        let message = api
            .delete_favorite(id)
            .await
            .inspect_err(|e| log::error!("Error removing favorite {id}: {e}"))
            .map_err(|e| match e {
                // Logged in, but the favorite belongs to someone else.
                ClientError::Unauthorized {
                    status: 403,
                    message,
                } => FavoritesError::Rejected { message },
                other => FavoritesError::from(other),
            })?;
        log::info!("Removed favorite {id}");

        self.reload_after_change(api).await;
        Ok(message)
    }

    /// Clears the cache, e.g. after logout.
    pub fn clear(&mut self) {
        self.all_favorites.clear();
    }

    /// One card per favorite, in list order.
    #[must_use]
    pub fn cards(&self) -> Vec<FavoriteCard> {
        self.all_favorites.iter().map(FavoriteCard::from).collect()
    }

    /// The favorites panel status, or `None` when there are cards to show.
    #[must_use]
    pub fn placeholder(&self) -> Option<Notice> {
        self.all_favorites
            .is_empty()
            .then(|| Notice::empty(EMPTY_PLACEHOLDER))
    }

    async fn reload_after_change(&mut self, api: &dyn RealtyApi) {
        if let Err(e) = self.reload(api).await {
            log::warn!("Favorites changed but reloading them failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeKind;
    use crate::testing::{FakeApi, favorite};
    use realty_map_models::EstimateRequest;

    fn rendered(location: &str, price: f64) -> RenderedEstimate {
        RenderedEstimate::new(
            EstimateRequest {
                location: location.to_string(),
                total_area: 1200.0,
                room_count: 2,
                bath_count: 2,
                property_age: 5,
            },
            price,
        )
    }

    #[tokio::test]
    async fn save_then_list_contains_entry() {
        let api = FakeApi::new();
        let mut store = FavoritesStore::default();

        let message = store
            .save(&api, Some(&rendered("Hebbal", -42.5)))
            .await
            .unwrap();

        assert_eq!(message, "Property saved to favorites!");
        assert_eq!(store.list().len(), 1);
        let saved = &store.list()[0];
        assert_eq!(saved.location, "Hebbal");
        assert!((saved.price - 42.5).abs() < f64::EPSILON);
        assert_eq!(api.calls("favorites"), 1);
    }

    #[tokio::test]
    async fn remove_then_list_excludes_id() {
        let api = FakeApi::new();
        let mut store = FavoritesStore::default();
        store.save(&api, Some(&rendered("Hebbal", 80.0))).await.unwrap();
        store.save(&api, Some(&rendered("Whitefield", 95.0))).await.unwrap();
        let id = store.list()[0].id;

        store.remove(&api, id).await.unwrap();

        assert!(store.get(id).is_none());
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.list()[0].location, "Whitefield");
        assert_eq!(api.calls("favorites"), 3);
    }

    #[tokio::test]
    async fn save_without_estimate_sends_nothing() {
        let api = FakeApi::new();
        let mut store = FavoritesStore::default();

        let err = store.save(&api, None).await.unwrap_err();

        assert!(matches!(err, FavoritesError::NoEstimate));
        assert_eq!(err.to_notice().kind, NoticeKind::Validation);
        assert_eq!(api.calls("save_favorite"), 0);
    }

    #[tokio::test]
    async fn unauthorized_save_requires_authentication() {
        let api = FakeApi::with_login_required();
        let mut store = FavoritesStore::default();

        let err = store
            .save(&api, Some(&rendered("Hebbal", 80.0)))
            .await
            .unwrap_err();

        assert!(matches!(err, FavoritesError::AuthenticationRequired));
        assert_eq!(err.to_notice().kind, NoticeKind::AuthRequired);
        assert!(store.list().is_empty());
    }

    #[tokio::test]
    async fn removing_unknown_id_is_rejected() {
        let api = FakeApi::new();
        let mut store = FavoritesStore::default();

        let err = store.remove(&api, 99).await.unwrap_err();

        assert!(matches!(err, FavoritesError::Rejected { .. }));
        assert_eq!(api.calls("favorites"), 0);
    }

    #[tokio::test]
    async fn removing_another_users_favorite_is_rejected() {
        let api = FakeApi::new();
        api.script_delete_errors(vec![ClientError::Unauthorized {
            status: 403,
            message: "Unauthorized".to_string(),
        }]);
        let mut store = FavoritesStore::default();
        store.save(&api, Some(&rendered("Hebbal", 80.0))).await.unwrap();
        let id = store.list()[0].id;

        let err = store.remove(&api, id).await.unwrap_err();

        assert!(matches!(err, FavoritesError::Rejected { ref message } if message == "Unauthorized"));
        assert_eq!(err.to_notice().kind, NoticeKind::Error);
        assert_eq!(store.list().len(), 1);
    }

    #[tokio::test]
    async fn removing_without_session_requires_authentication() {
        let api = FakeApi::with_login_required();
        let mut store = FavoritesStore::default();

        let err = store.remove(&api, 1).await.unwrap_err();

        assert!(matches!(err, FavoritesError::AuthenticationRequired));
    }

    #[test]
    fn card_price_is_not_rounded() {
        let card = FavoriteCard::from(&favorite(3, "Yelahanka", 900.0, 42.5));
        assert_eq!(card.price, "₹42.5 Lakh");
    }

    #[test]
    fn cards_and_placeholder() {
        let mut store = FavoritesStore::default();
        assert_eq!(
            store.placeholder().unwrap().message,
            EMPTY_PLACEHOLDER
        );

        store.all_favorites = vec![favorite(7, "Hebbal", 1200.0, 1520.4)];
        let cards = store.cards();

        assert!(store.placeholder().is_none());
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].id, 7);
        assert_eq!(cards[0].price, "₹1520.4 Lakh");
        assert_eq!(
            cards[0].details,
            ["2 BHK", "2 Bath", "1200 sqft", "5 Years Old"]
        );
    }
}
