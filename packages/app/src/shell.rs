//! Tab and modal bookkeeping.

use std::collections::BTreeSet;

use strum_macros::{AsRefStr, Display, EnumString};

/// Top-level tabs. Exactly one is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Tab {
    /// Price estimation form.
    #[default]
    Estimate,
    /// Map and nearby amenities.
    Map,
    /// Saved properties.
    Favorites,
}

impl Tab {
    /// Every tab, in display order.
    pub const ALL: &[Self] = &[Self::Estimate, Self::Map, Self::Favorites];

    /// Tab caption.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Estimate => "Estimate Price",
            Self::Map => "Map View",
            Self::Favorites => "Favorites",
        }
    }
}

/// The tab strip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tabs {
    active: Tab,
}

impl Tabs {
    /// Currently active tab.
    #[must_use]
    pub const fn active(&self) -> Tab {
        self.active
    }

    /// Returns `true` if `tab` is the active one.
    #[must_use]
    pub fn is_active(&self, tab: Tab) -> bool {
        self.active == tab
    }

    /// Makes `tab` the only active tab.
    ///
    /// Returns `true` when the map tab became visible and the map has to
    /// recompute its size.
    pub fn activate(&mut self, tab: Tab) -> bool {
        log::debug!("Switching tab {} -> {tab}", self.active);
        self.active = tab;
        tab == Tab::Map
    }
}

/// Dialogs layered over the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Modal {
    /// Login and registration.
    Auth,
    /// Comparison table.
    Compare,
}

/// Where a click inside an open modal landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The dimmed area around the dialog.
    Backdrop,
    /// The dialog itself.
    Content,
    /// The dialog's close control.
    CloseButton,
}

/// Open modals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modals {
    open: BTreeSet<Modal>,
}

impl Modals {
    /// Shows `modal`.
    pub fn open(&mut self, modal: Modal) {
        self.open.insert(modal);
    }

    /// Hides `modal`.
    pub fn close(&mut self, modal: Modal) {
        self.open.remove(&modal);
    }

    /// Returns `true` while `modal` is shown.
    #[must_use]
    pub fn is_open(&self, modal: Modal) -> bool {
        self.open.contains(&modal)
    }

    /// Applies a click on `modal`. Returns `true` if it closed.
    pub fn click(&mut self, modal: Modal, target: ClickTarget) -> bool {
        if !self.is_open(modal) {
            return false;
        }
        match target {
            ClickTarget::Backdrop | ClickTarget::CloseButton => {
                self.close(modal);
                true
            }
            ClickTarget::Content => false,
        }
    }
}
