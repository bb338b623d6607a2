//! Price estimation form.
//!
//! The form holds raw input as the page delivers it. [`EstimateForm::validate`]
//! turns it into an [`EstimateRequest`] or rejects it as a whole before any
//! request is sent. A successful estimate is kept as a [`RenderedEstimate`]
//! carrying both the typed price and its display string, and only then is
//! the save-as-favorite action available.

use std::ops::RangeInclusive;

use realty_map_client::RealtyApi;
use realty_map_models::EstimateRequest;

use crate::format;
use crate::notice::{Notice, ToNotice};

/// Choices offered for the bedroom (BHK) and bathroom counts.
pub const COUNT_CHOICES: RangeInclusive<u32> = 1..=5;

/// Shown when any field is missing or malformed.
pub const INCOMPLETE_MESSAGE: &str = "Please fill in all details before estimating the price.";

/// Errors from the estimate form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EstimateError {
    /// Validation failed; nothing was sent.
    #[error("{INCOMPLETE_MESSAGE}")]
    Incomplete,
}

impl ToNotice for EstimateError {
    fn to_notice(&self) -> Notice {
        match self {
            Self::Incomplete => Notice::validation(INCOMPLETE_MESSAGE),
        }
    }
}

/// Raw form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EstimateForm {
    /// Selected location; `None` while the placeholder is selected.
    pub location: Option<String>,
    /// Area text field.
    pub area: String,
    /// Checked BHK radio button.
    pub rooms: Option<u32>,
    /// Checked bathroom radio button.
    pub baths: Option<u32>,
    /// Property age input value.
    pub property_age: Option<String>,
}

impl EstimateForm {
    /// Checks every field and builds the request.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::Incomplete`] if any field is missing or out
    /// of range.
    pub fn validate(&self) -> Result<EstimateRequest, EstimateError> {
        let location = self
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty() && *l != crate::locations::LOCATION_PLACEHOLDER)
            .ok_or(EstimateError::Incomplete)?;

        let total_area = self
            .area
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|a| a.is_finite() && *a > 0.0)
            .ok_or(EstimateError::Incomplete)?;

        let room_count = self
            .rooms
            .filter(|r| COUNT_CHOICES.contains(r))
            .ok_or(EstimateError::Incomplete)?;

        let bath_count = self
            .baths
            .filter(|b| COUNT_CHOICES.contains(b))
            .ok_or(EstimateError::Incomplete)?;

        let property_age = self
            .property_age
            .as_deref()
            .and_then(|a| a.trim().parse::<u32>().ok())
            .ok_or(EstimateError::Incomplete)?;

        Ok(EstimateRequest {
            location: location.to_string(),
            total_area,
            room_count,
            bath_count,
            property_age,
        })
    }
}

/// A successful estimate as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEstimate {
    /// The request that produced the estimate.
    pub request: EstimateRequest,
    /// Displayed price in lakh rupees (the magnitude of the model output).
    pub price: f64,
    /// `₹43 Lakh` style display text.
    pub display: String,
}

impl RenderedEstimate {
    /// Builds the rendering for a raw model output.
    #[must_use]
    pub fn new(request: EstimateRequest, raw_price: f64) -> Self {
        Self {
            request,
            price: raw_price.abs(),
            display: format::lakh_price(raw_price),
        }
    }
}

/// What the estimate output area shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EstimateView {
    /// Nothing estimated yet.
    #[default]
    Idle,
    /// A price was received.
    Priced(RenderedEstimate),
    /// The backend answered without a price.
    NoPrice,
    /// The request failed.
    Failed,
}

impl EstimateView {
    /// The output headline.
    #[must_use]
    pub fn headline(&self) -> String {
        match self {
            Self::Idle => String::new(),
            Self::Priced(estimate) => format!("Estimated Price: {}", estimate.display),
            Self::NoPrice => "Error: No price received.".to_string(),
            Self::Failed => "Error: Could not fetch prediction.".to_string(),
        }
    }

    /// The rendered estimate, when there is one.
    #[must_use]
    pub const fn estimate(&self) -> Option<&RenderedEstimate> {
        match self {
            Self::Priced(estimate) => Some(estimate),
            Self::Idle | Self::NoPrice | Self::Failed => None,
        }
    }

    /// Whether the save-as-favorite action is offered.
    #[must_use]
    pub const fn can_save(&self) -> bool {
        self.estimate().is_some()
    }

    /// The output as a notice, if there is any output.
    #[must_use]
    pub fn to_notice(&self) -> Option<Notice> {
        match self {
            Self::Idle => None,
            Self::Priced(_) => Some(Notice::success(self.headline())),
            Self::NoPrice | Self::Failed => Some(Notice::error(self.headline())),
        }
    }
}

/// The estimate output area.
#[derive(Debug, Clone, Default)]
pub struct EstimatePanel {
    view: EstimateView,
}

impl EstimatePanel {
    /// Current output.
    #[must_use]
    pub const fn view(&self) -> &EstimateView {
        &self.view
    }

    /// Validates `form` and requests an estimate.
    ///
    /// Validation failure leaves the previous output in place and sends
    /// nothing. Otherwise the output is replaced by the outcome of exactly
    /// one request.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::Incomplete`] if validation fails.
    pub async fn submit(
        &mut self,
        api: &dyn RealtyApi,
        form: &EstimateForm,
    ) -> Result<&EstimateView, EstimateError> {
        let request = form.validate()?;

        self.view = match api.predict_price(&request).await {
            Ok(Some(price)) => {
                log::info!("Estimated {price} lakh for {}", request.location);
                EstimateView::Priced(RenderedEstimate::new(request, price))
            }
            Ok(None) => EstimateView::NoPrice,
            Err(e) => {
                log::error!("Error fetching prediction: {e}");
                EstimateView::Failed
            }
        };

        Ok(&self.view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeApi, unavailable};

    fn complete_form() -> EstimateForm {
        EstimateForm {
            location: Some("Whitefield".to_string()),
            area: "1200".to_string(),
            rooms: Some(2),
            baths: Some(2),
            property_age: Some("5".to_string()),
        }
    }

    #[test]
    fn complete_form_validates() {
        let request = complete_form().validate().unwrap();
        assert_eq!(request.location, "Whitefield");
        assert!((request.total_area - 1200.0).abs() < f64::EPSILON);
        assert_eq!(request.room_count, 2);
        assert_eq!(request.property_age, 5);
    }

    #[test]
    fn each_missing_field_fails_validation() {
        let cases = [
            EstimateForm {
                location: None,
                ..complete_form()
            },
            EstimateForm {
                location: Some(crate::locations::LOCATION_PLACEHOLDER.to_string()),
                ..complete_form()
            },
            EstimateForm {
                area: "abc".to_string(),
                ..complete_form()
            },
            EstimateForm {
                area: "-10".to_string(),
                ..complete_form()
            },
            EstimateForm {
                rooms: None,
                ..complete_form()
            },
            EstimateForm {
                baths: Some(9),
                ..complete_form()
            },
            EstimateForm {
                property_age: None,
                ..complete_form()
            },
        ];

        for form in &cases {
            assert_eq!(form.validate(), Err(EstimateError::Incomplete), "{form:?}");
        }
    }

    #[tokio::test]
    async fn invalid_form_sends_nothing() {
        let api = FakeApi::new();
        let mut panel = EstimatePanel::default();
        let form = EstimateForm {
            area: String::new(),
            ..complete_form()
        };

        let err = panel.submit(&api, &form).await.unwrap_err();

        assert_eq!(err, EstimateError::Incomplete);
        assert_eq!(api.calls("predict_price"), 0);
        assert_eq!(panel.view(), &EstimateView::Idle);
    }

    #[tokio::test]
    async fn negative_estimate_renders_magnitude() {
        let api = FakeApi::new();
        api.script_prices(vec![Ok(Some(-42.5))]);
        let mut panel = EstimatePanel::default();

        let view = panel.submit(&api, &complete_form()).await.unwrap();

        assert!(view.headline().contains("₹43"));
        let estimate = view.estimate().unwrap();
        assert!((estimate.price - 42.5).abs() < f64::EPSILON);
        assert!(view.can_save());
    }

    #[tokio::test]
    async fn missing_price_disables_saving() {
        let api = FakeApi::new();
        api.script_prices(vec![Ok(Some(80.0)), Ok(None)]);
        let mut panel = EstimatePanel::default();

        panel.submit(&api, &complete_form()).await.unwrap();
        assert!(panel.view().can_save());

        let view = panel.submit(&api, &complete_form()).await.unwrap();
        assert_eq!(view, &EstimateView::NoPrice);
        assert!(!view.can_save());
        assert_eq!(view.headline(), "Error: No price received.");
    }

    #[tokio::test]
    async fn transport_failure_renders_error_state() {
        let api = FakeApi::new();
        api.script_prices(vec![Err(unavailable())]);
        let mut panel = EstimatePanel::default();

        let view = panel.submit(&api, &complete_form()).await.unwrap();

        assert_eq!(view, &EstimateView::Failed);
        assert!(!view.can_save());
        assert!(view.to_notice().unwrap().is_error());
    }
}
