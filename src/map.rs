//! Map view assembly.
//!
//! A [`MapView`] is a plain value describing what the page should show:
//! the base tiles, the named overlays, and the controls. It is built by
//! its owner and handed to [`crate::render`] to produce the document.

use crate::config::LatLng;
use crate::legend::Legend;
use crate::marker::MarkerLayer;

/// Continental-US default center.
pub const DEFAULT_CENTER: LatLng = LatLng::new(38.5, -96.5);

pub const DEFAULT_ZOOM: u8 = 5;

/// Id of the page element the map mounts into.
pub const MAP_ELEMENT_ID: &str = "map";

/// Name of the earthquake overlay in the layer control.
pub const EARTHQUAKE_OVERLAY: &str = "Earthquakes";

const OSM_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

const OSM_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

/// Raster tile background.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    /// Template with `{s}`, `{z}`, `{x}`, `{y}` placeholders
    pub url_template: String,
    /// Trusted HTML shown in the attribution control
    pub attribution: String,
}

impl TileLayer {
    /// Public OpenStreetMap tiles.
    #[must_use]
    pub fn openstreetmap() -> Self {
        Self {
            url_template: OSM_TILE_URL.to_string(),
            attribution: OSM_ATTRIBUTION.to_string(),
        }
    }
}

/// A named, togglable layer drawn over the base tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub name: String,
    pub layer: MarkerLayer,
    /// Shown when the page opens
    pub active: bool,
}

/// Corner a control is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPosition {
    TopRight,
    BottomRight,
}

impl ControlPosition {
    /// Leaflet's name for the corner.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopRight => "topright",
            Self::BottomRight => "bottomright",
        }
    }
}

/// Widgets attached to the map.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    /// Overlay toggle listing the named overlays only
    Layers { position: ControlPosition },
    Legend(Legend),
}

/// Everything one rendered map consists of.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub element_id: String,
    pub center: LatLng,
    pub zoom: u8,
    pub base: TileLayer,
    pub overlays: Vec<Overlay>,
    pub controls: Vec<Control>,
}

impl MapView {
    /// An empty map over the given base layer.
    #[must_use]
    pub fn new(center: LatLng, zoom: u8, base: TileLayer) -> Self {
        Self {
            element_id: MAP_ELEMENT_ID.to_string(),
            center,
            zoom,
            base,
            overlays: Vec::new(),
            controls: Vec::new(),
        }
    }

    /// Add a named overlay, active at start.
    pub fn add_overlay(&mut self, name: &str, layer: MarkerLayer) {
        self.overlays.push(Overlay {
            name: name.to_string(),
            layer,
            active: true,
        });
    }

    pub fn add_control(&mut self, control: Control) {
        self.controls.push(control);
    }

    /// Total markers across overlays.
    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.overlays.iter().map(|o| o.layer.len()).sum()
    }
}

/// Build the earthquake map: OSM tiles, the marker overlay, and a layer
/// control offering only that overlay.
#[must_use]
pub fn earthquake_map(markers: MarkerLayer, center: LatLng, zoom: u8) -> MapView {
    let mut map = MapView::new(center, zoom, TileLayer::openstreetmap());
    map.add_overlay(EARTHQUAKE_OVERLAY, markers);
    map.add_control(Control::Layers {
        position: ControlPosition::TopRight,
    });
    map
}
