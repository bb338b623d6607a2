//! Text rendering of the map.
//!
//! Keeps the viewport and markers the controller asks for and prints them
//! as a list, since a terminal has no tile layer.

use std::collections::BTreeMap;
use std::fmt;

use realty_map_app::map::{MapWidget, MarkerId, WidgetError};
use realty_map_models::Coordinates;

/// OpenStreetMap tiles the browser front end draws; shown as attribution.
const TILE_ATTRIBUTION: &str = "© OpenStreetMap contributors";

#[derive(Debug)]
struct Marker {
    at: Coordinates,
    popup: String,
}

/// A [`MapWidget`] that renders to text.
#[derive(Debug, Default)]
pub struct TerminalMap {
    mounted: bool,
    center: Option<Coordinates>,
    zoom: u8,
    next_id: MarkerId,
    markers: BTreeMap<MarkerId, Marker>,
    open_popup: Option<MarkerId>,
}

impl MapWidget for TerminalMap {
    fn mount(&mut self, center: Coordinates, zoom: u8) -> Result<(), WidgetError> {
        if self.mounted {
            return Err(WidgetError {
                message: "map is already mounted".to_string(),
            });
        }
        self.mounted = true;
        self.set_view(center, zoom);
        Ok(())
    }

    fn set_view(&mut self, center: Coordinates, zoom: u8) {
        log::debug!("View: {center} @ zoom {zoom}");
        self.center = Some(center);
        self.zoom = zoom;
    }

    fn add_marker(&mut self, at: Coordinates, popup: &str) -> MarkerId {
        self.next_id += 1;
        self.markers.insert(
            self.next_id,
            Marker {
                at,
                popup: popup.to_string(),
            },
        );
        self.next_id
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        self.markers.remove(&marker);
        if self.open_popup == Some(marker) {
            self.open_popup = None;
        }
    }

    fn open_popup(&mut self, marker: MarkerId) {
        if self.markers.contains_key(&marker) {
            self.open_popup = Some(marker);
        }
    }

    fn invalidate_size(&mut self) {
        log::trace!("Map resized");
    }
}

impl fmt::Display for TerminalMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(center) = self.center else {
            return writeln!(f, "(map not loaded)");
        };

        writeln!(f, "Center {center} @ zoom {} ({TILE_ATTRIBUTION})", self.zoom)?;
        for (id, marker) in &self.markers {
            let flag = if self.open_popup == Some(*id) { ">" } else { " " };
            let popup = marker.popup.replace('\n', " - ");
            writeln!(f, "{flag} [{}] {popup}", marker.at)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_markers_and_open_popup() {
        let mut map = TerminalMap::default();
        map.mount(Coordinates::new(12.9716, 77.5946), 14).unwrap();
        let home = map.add_marker(Coordinates::new(12.9716, 77.5946), "Home");
        let school = map.add_marker(Coordinates::new(12.98, 77.6), "School\n120 m away");
        map.open_popup(school);

        let text = map.to_string();
        assert!(text.contains("zoom 14"));
        assert!(text.contains("> [12.9800, 77.6000] School - 120 m away"));

        map.remove_marker(school);
        map.remove_marker(home);
        assert!(!map.to_string().contains("School"));
        assert!(map.open_popup.is_none());
    }

    #[test]
    fn second_mount_fails() {
        let mut map = TerminalMap::default();
        map.mount(Coordinates::new(0.0, 0.0), 1).unwrap();
        assert!(map.mount(Coordinates::new(0.0, 0.0), 1).is_err());
    }
}
