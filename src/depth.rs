//! Depth-to-color banding shared by markers and the legend.

/// A depth band: every depth strictly greater than `above_km` (and not
/// claimed by a deeper band) is drawn in `color`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthColorBand {
    pub above_km: f64,
    pub color: &'static str,
}

/// Bands in descending threshold order. Must stay sorted.
pub const DEPTH_BANDS: [DepthColorBand; 4] = [
    DepthColorBand { above_km: 70.0, color: "#ff0000" },
    DepthColorBand { above_km: 50.0, color: "#ff8c00" },
    DepthColorBand { above_km: 30.0, color: "#ffd700" },
    DepthColorBand { above_km: 10.0, color: "#9acd32" },
];

/// Color for depths at or below the shallowest threshold.
pub const SHALLOW_COLOR: &str = "#00ff00";

/// Lower bounds of the legend rows, in km.
pub const LEGEND_THRESHOLDS: [f64; 6] = [-10.0, 10.0, 30.0, 50.0, 70.0, 90.0];

/// Fill color for an earthquake at `depth_km`.
///
/// Comparisons are strict, so a depth sitting exactly on a threshold
/// falls into the next shallower band.
#[must_use]
pub fn depth_color(depth_km: f64) -> &'static str {
    DEPTH_BANDS
        .iter()
        .find(|band| depth_km > band.above_km)
        .map_or(SHALLOW_COLOR, |band| band.color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands_are_descending() {
        assert!(DEPTH_BANDS.windows(2).all(|w| w[0].above_km > w[1].above_km));
    }

    #[test]
    fn test_depth_color_bands() {
        assert_eq!(depth_color(600.0), "#ff0000");
        assert_eq!(depth_color(70.5), "#ff0000");
        assert_eq!(depth_color(60.0), "#ff8c00");
        assert_eq!(depth_color(40.0), "#ffd700");
        assert_eq!(depth_color(20.0), "#9acd32");
        assert_eq!(depth_color(5.0), "#00ff00");
        assert_eq!(depth_color(-3.2), "#00ff00");
    }

    #[test]
    fn test_threshold_ties_fall_to_shallower_band() {
        assert_eq!(depth_color(70.0), "#ff8c00");
        assert_eq!(depth_color(50.0), "#ffd700");
        assert_eq!(depth_color(30.0), "#9acd32");
        assert_eq!(depth_color(10.0), "#00ff00");
    }
}
