//! Depth legend control.

use std::fmt::Write as _;

use crate::depth::{LEGEND_THRESHOLDS, depth_color};
use crate::html;
use crate::map::{Control, ControlPosition, MapView};

/// Heading shown above the legend rows.
pub const LEGEND_TITLE: &str = "Earthquake Depth (km)";

/// One swatch and its depth range label.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendRow {
    pub color: &'static str,
    pub label: String,
}

/// A static legend pinned to a corner of the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub position: ControlPosition,
    pub title: &'static str,
    pub rows: Vec<LegendRow>,
}

impl Legend {
    /// Build the depth legend from consecutive threshold pairs.
    ///
    /// Each swatch samples [`depth_color`] one kilometer inside its band, so
    /// legend and markers always agree.
    #[must_use]
    pub fn depth() -> Self {
        let rows = LEGEND_THRESHOLDS
            .iter()
            .enumerate()
            .map(|(i, &lower)| {
                let label = match LEGEND_THRESHOLDS.get(i + 1) {
                    Some(upper) => format!("{lower}\u{2013}{upper} km"),
                    None => format!("{lower}+ km"),
                };
                LegendRow {
                    color: depth_color(lower + 1.0),
                    label,
                }
            })
            .collect();

        Self {
            position: ControlPosition::BottomRight,
            title: LEGEND_TITLE,
            rows,
        }
    }

    /// Inner HTML of the legend container.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = format!("<h4>{}</h4>", html::escape(self.title));
        for row in &self.rows {
            let _ = write!(
                out,
                "<i style=\"background:{}; width:18px; height:18px; float:left; opacity:0.7;\"></i> {}<br>",
                row.color,
                html::escape(&row.label)
            );
        }
        out
    }
}

/// Attach the depth legend to a map view.
pub fn add_depth_legend(map: &mut MapView) {
    map.add_control(Control::Legend(Legend::depth()));
}
