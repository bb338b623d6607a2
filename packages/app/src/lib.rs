#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Application layer of the realty map client.
//!
//! Holds the page state between user actions and keeps it consistent with
//! the backend: the location directory, the map and its markers, the
//! estimate form, saved favorites and their comparison, login state, and
//! the tab and modal shell. [`page::Page`] wires them together behind a
//! single [`realty_map_client::RealtyApi`] and a [`map::MapWidget`].

pub mod compare;
pub mod estimate;
pub mod favorites;
pub mod format;
pub mod locations;
pub mod map;
pub mod notice;
pub mod page;
pub mod session;
pub mod shell;

#[cfg(test)]
mod testing;
