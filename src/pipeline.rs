//! Fetch → markers → map, composed by return values.

use tracing::{debug, info};

use crate::client::{UsgsClient, load_feed};
use crate::config::{FeedSource, PipelineConfig};
use crate::errors::{PipelineError, QuakemapError};
use crate::legend::add_depth_legend;
use crate::map::{MapView, earthquake_map};
use crate::marker::build_markers;
use crate::models::FeatureCollection;

/// Load the feature collection from the configured source.
///
/// # Errors
///
/// Returns an error if the request, the file read, or the parse fails.
pub fn fetch(source: &FeedSource) -> Result<FeatureCollection, QuakemapError> {
    match source {
        FeedSource::Remote { base_url, feed } => {
            UsgsClient::with_base_url(base_url)?.fetch_feed(*feed)
        }
        FeedSource::File(path) => load_feed(path),
    }
}

/// Build the full map view for a feature collection.
///
/// # Errors
///
/// Returns a validation error when a record is malformed and the policy
/// is to abort.
pub fn build_map(
    collection: &FeatureCollection,
    config: &PipelineConfig,
) -> Result<MapView, QuakemapError> {
    let markers = build_markers(
        &collection.features,
        config.invalid_features,
        config.time_display,
    )?;

    if markers.skipped > 0 {
        info!(
            "built {} markers, skipped {} malformed records",
            markers.len(),
            markers.skipped
        );
    } else {
        debug!("built {} markers", markers.len());
    }

    let mut map = earthquake_map(markers, config.center, config.zoom);
    add_depth_legend(&mut map);
    Ok(map)
}

/// Run the whole pipeline for one page.
///
/// # Errors
///
/// Returns which stage failed along with its cause.
pub fn run(config: &PipelineConfig) -> Result<MapView, PipelineError> {
    info!("loading earthquakes from {}", config.source);
    let collection = fetch(&config.source).map_err(PipelineError::Fetch)?;
    if let Some(meta) = &collection.metadata {
        debug!(
            "feed '{}' reports {} events",
            meta.title.as_deref().unwrap_or("untitled"),
            meta.count.unwrap_or(collection.features.len())
        );
    }
    build_map(&collection, config).map_err(PipelineError::Build)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InvalidFeaturePolicy, LatLng, TimeDisplay};
    use crate::map::Control;
    use crate::models::tests::SAMPLE_FEED;
    use crate::render::render_document;

    fn config() -> PipelineConfig {
        PipelineConfig {
            time_display: TimeDisplay::Utc,
            invalid_features: InvalidFeaturePolicy::Abort,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_end_to_end_single_feature() {
        let feed = FeatureCollection::from_json(
            r#"{"type": "FeatureCollection", "features": [{
                "geometry": {"coordinates": [-122.4, 37.8, 5]},
                "properties": {"mag": 3.2, "title": "M 3.2 - Test", "time": 1700000000000}
            }]}"#,
        )
        .unwrap();

        let map = build_map(&feed, &config()).unwrap();
        let marker = &map.overlays[0].layer.markers[0];

        assert_eq!(marker.position, LatLng::new(37.8, -122.4));
        assert!((marker.radius - 64_000.0).abs() < 1e-9);
        assert_eq!(marker.fill_color, "#00ff00");
        assert!(marker.popup.contains("M 3.2 - Test"));
        assert!(marker.popup.contains("3.2"));
        assert!(marker.popup.contains("5 km"));
    }

    #[test]
    fn test_empty_collection_still_renders() {
        let feed =
            FeatureCollection::from_json(r#"{"type": "FeatureCollection", "features": []}"#)
                .unwrap();

        let map = build_map(&feed, &config()).unwrap();
        assert_eq!(map.marker_count(), 0);
        assert!(map.base.url_template.contains("openstreetmap"));
        assert!(map.controls.iter().any(|c| matches!(c, Control::Legend(_))));

        let doc = render_document(&map).unwrap();
        assert!(doc.contains("Earthquake Depth (km)"));
        assert!(doc.contains(r#""markers":[]"#));
    }

    #[test]
    fn test_sample_feed_builds_all_markers() {
        let feed = FeatureCollection::from_json(SAMPLE_FEED).unwrap();
        let map = build_map(&feed, &config()).unwrap();
        assert_eq!(map.marker_count(), 2);
        assert_eq!(map.controls.len(), 2);
    }

    #[test]
    fn test_fetch_from_file() {
        let path = std::env::temp_dir().join(format!("quakemap-{}.geojson", std::process::id()));
        std::fs::write(&path, SAMPLE_FEED).unwrap();

        let feed = fetch(&FeedSource::File(path.clone())).unwrap();
        assert_eq!(feed.features.len(), 2);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_run_reports_stage() {
        let missing = PipelineConfig {
            source: FeedSource::File("/nonexistent/quakemap/feed.geojson".into()),
            ..config()
        };
        assert!(matches!(run(&missing), Err(PipelineError::Fetch(_))));

        let path = std::env::temp_dir().join(format!("quakemap-bad-{}.geojson", std::process::id()));
        std::fs::write(
            &path,
            r#"{"type": "FeatureCollection", "features": [{"id": "x", "properties": null}]}"#,
        )
        .unwrap();
        let broken = PipelineConfig {
            source: FeedSource::File(path.clone()),
            ..config()
        };
        assert!(matches!(run(&broken), Err(PipelineError::Build(_))));

        let skipping = PipelineConfig {
            invalid_features: InvalidFeaturePolicy::Skip,
            ..broken
        };
        assert_eq!(run(&skipping).unwrap().marker_count(), 0);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_mistyped_record_is_skipped_beside_good_one() {
        let good = r#"{"id": "ok", "geometry": {"coordinates": [-122.4, 37.8, 5]},
            "properties": {"mag": 3.2, "title": "M 3.2 - Test", "time": 1700000000000}}"#;
        let bad_records = [
            r#"{"id": "bad", "geometry": {"coordinates": null},
                "properties": {"mag": 1.0, "title": "t", "time": 0}}"#,
            r#"{"id": "bad", "geometry": {"coordinates": [1.0, 2.0, 3.0]},
                "properties": {"mag": "1.0", "title": "t", "time": 0}}"#,
            r#"{"id": "bad", "geometry": {"coordinates": [1.0, 2.0, 3.0]},
                "properties": {"mag": 1.0, "title": "t", "time": 1.5e12}}"#,
        ];
        let skipping = PipelineConfig {
            invalid_features: InvalidFeaturePolicy::Skip,
            ..config()
        };

        for bad in bad_records {
            let feed = FeatureCollection::from_json(&format!(
                r#"{{"type": "FeatureCollection", "features": [{bad}, {good}]}}"#
            ))
            .unwrap();

            let map = build_map(&feed, &skipping).unwrap();
            let layer = &map.overlays[0].layer;
            assert_eq!(layer.len(), 1, "{bad}");
            assert_eq!(layer.skipped, 1, "{bad}");
            assert_eq!(layer.markers[0].id.as_deref(), Some("ok"));
        }
    }
}
