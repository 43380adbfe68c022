//! Marker construction: one styled circle per earthquake.

use serde::Serialize;
use tracing::warn;

use crate::config::{InvalidFeaturePolicy, LatLng, TimeDisplay};
use crate::depth::depth_color;
use crate::errors::QuakemapError;
use crate::html;
use crate::models::{EarthquakeFeature, Feature};

/// Circle radius in meters per unit of magnitude.
pub const RADIUS_PER_MAGNITUDE: f64 = 20_000.0;

/// Stroke and opacity shared by every marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub stroke_color: &'static str,
    pub stroke_weight: f64,
    pub fill_opacity: f64,
}

pub const MARKER_STYLE: MarkerStyle = MarkerStyle {
    stroke_color: "#000",
    stroke_weight: 0.5,
    fill_opacity: 1.0,
};

/// A renderable circle bound to one earthquake.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub position: LatLng,
    /// Meters; negative for negative magnitudes
    pub radius: f64,
    pub fill_color: &'static str,
    #[serde(flatten)]
    pub style: MarkerStyle,
    /// Pre-escaped HTML fragment
    pub popup: String,
}

/// Circle radius for a magnitude. Not clamped.
#[must_use]
pub fn radius_for_magnitude(magnitude: f64) -> f64 {
    magnitude * RADIUS_PER_MAGNITUDE
}

/// Popup body for one earthquake.
#[must_use]
pub fn popup_html(quake: &EarthquakeFeature, time_display: TimeDisplay) -> String {
    format!(
        "<h3>{title}</h3><hr>\
         <p><b>Date:</b> {date}</p>\
         <p><b>Magnitude:</b> {mag}</p>\
         <p><b>Depth:</b> {depth} km</p>",
        title = html::escape(&quake.title),
        date = time_display.format_millis(quake.time_ms),
        mag = quake.magnitude,
        depth = quake.depth_km,
    )
}

impl Marker {
    /// Build the marker for a validated earthquake.
    #[must_use]
    pub fn from_feature(quake: &EarthquakeFeature, time_display: TimeDisplay) -> Self {
        Self {
            id: quake.id.clone(),
            position: LatLng::new(quake.latitude, quake.longitude),
            radius: radius_for_magnitude(quake.magnitude),
            fill_color: depth_color(quake.depth_km),
            style: MARKER_STYLE,
            popup: popup_html(quake, time_display),
        }
    }
}

/// The earthquake overlay: markers in feed order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarkerLayer {
    pub markers: Vec<Marker>,
    /// Records dropped by validation
    #[serde(skip)]
    pub skipped: usize,
}

impl MarkerLayer {
    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// Build one marker per valid feed record.
///
/// # Errors
///
/// With [`InvalidFeaturePolicy::Abort`], returns the first validation error.
pub fn build_markers(
    features: &[Feature],
    policy: InvalidFeaturePolicy,
    time_display: TimeDisplay,
) -> Result<MarkerLayer, QuakemapError> {
    let mut layer = MarkerLayer {
        markers: Vec::with_capacity(features.len()),
        skipped: 0,
    };

    for raw in features {
        match EarthquakeFeature::try_from(raw) {
            Ok(quake) => layer.markers.push(Marker::from_feature(&quake, time_display)),
            Err(e) => match policy {
                InvalidFeaturePolicy::Abort => return Err(e),
                InvalidFeaturePolicy::Skip => {
                    warn!("skipping record: {}", e);
                    layer.skipped += 1;
                }
            },
        }
    }

    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeatureCollection;
    use crate::models::tests::SAMPLE_FEED;

    fn quake(magnitude: f64, depth_km: f64) -> EarthquakeFeature {
        EarthquakeFeature {
            id: Some("nc0001".into()),
            longitude: -122.4,
            latitude: 37.8,
            depth_km,
            magnitude,
            title: "M 3.2 - Test".into(),
            time_ms: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_radius_is_linear_and_unclamped() {
        assert!((radius_for_magnitude(3.2) - 64_000.0).abs() < 1e-9);
        assert!((radius_for_magnitude(1.0) - 20_000.0).abs() < f64::EPSILON);
        assert!(radius_for_magnitude(0.0).abs() < f64::EPSILON);
        assert!((radius_for_magnitude(-0.5) - (-10_000.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_marker_from_feature() {
        let marker = Marker::from_feature(&quake(3.2, 5.0), TimeDisplay::Utc);

        assert_eq!(marker.position, LatLng::new(37.8, -122.4));
        assert!((marker.radius - 64_000.0).abs() < 1e-9);
        assert_eq!(marker.fill_color, "#00ff00");
        assert_eq!(marker.style, MARKER_STYLE);
        assert!(marker.popup.contains("M 3.2 - Test"));
        assert!(marker.popup.contains("<b>Magnitude:</b> 3.2"));
        assert!(marker.popup.contains("5 km"));
        assert!(marker.popup.contains("Tue Nov 14 2023 22:13:20 GMT+0000"));
    }

    #[test]
    fn test_depth_on_threshold_uses_shallower_color() {
        let marker = Marker::from_feature(&quake(4.0, 70.0), TimeDisplay::Utc);
        assert_eq!(marker.fill_color, "#ff8c00");
    }

    #[test]
    fn test_popup_escapes_title() {
        let mut q = quake(2.0, 12.0);
        q.title = "<script>alert(1)</script>".into();
        let popup = popup_html(&q, TimeDisplay::Utc);
        assert!(!popup.contains("<script>"));
        assert!(popup.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_one_marker_per_feature_in_order() {
        let feed = FeatureCollection::from_json(SAMPLE_FEED).unwrap();
        let layer =
            build_markers(&feed.features, InvalidFeaturePolicy::Abort, TimeDisplay::Utc).unwrap();

        assert_eq!(layer.len(), feed.features.len());
        assert_eq!(layer.skipped, 0);
        assert_eq!(layer.markers[0].position, LatLng::new(37.8, -122.4));
        assert_eq!(layer.markers[1].position, LatLng::new(38.3, 142.1));
        assert_eq!(layer.markers[1].fill_color, "#ff8c00");
    }

    #[test]
    fn test_invalid_record_policies() {
        let mut feed = FeatureCollection::from_json(SAMPLE_FEED).unwrap();
        feed.features[0].properties = None;

        let layer =
            build_markers(&feed.features, InvalidFeaturePolicy::Skip, TimeDisplay::Utc).unwrap();
        assert_eq!(layer.len(), 1);
        assert_eq!(layer.skipped, 1);
        assert_eq!(layer.markers[0].id.as_deref(), Some("us0002"));

        let err = build_markers(&feed.features, InvalidFeaturePolicy::Abort, TimeDisplay::Utc)
            .expect_err("abort must fail");
        assert!(matches!(err, QuakemapError::Validation(_)));
    }

    #[test]
    fn test_empty_feed_gives_empty_layer() {
        let layer = build_markers(&[], InvalidFeaturePolicy::Abort, TimeDisplay::Utc).unwrap();
        assert!(layer.is_empty());
    }
}
