//! Output writers for a built map.
//!
//! Supports the full HTML document, a human-readable marker listing (with
//! colors), JSON, and NDJSON.

use std::io::{self, Write};

use crate::map::MapView;
use crate::marker::Marker;
use crate::render::render_document;

// ANSI codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Standalone map page (default)
    #[default]
    Html,
    /// Colored marker listing for the terminal
    Human,
    /// JSON array of markers
    Json,
    /// Newline-delimited JSON (one marker per line)
    Ndjson,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            _ => Err(format!(
                "unknown format: {s} (expected: html, human, json, ndjson)"
            )),
        }
    }
}

/// Truecolor foreground escape for a `#rrggbb` or `#rgb` color.
fn ansi_fg(hex: &str) -> String {
    let digits = hex.trim_start_matches('#');
    let expanded: String = if digits.len() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.to_string()
    };

    let channel = |i: usize| {
        expanded
            .get(i..i + 2)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .unwrap_or(255)
    };
    format!("\x1b[38;2;{};{};{}m", channel(0), channel(2), channel(4))
}

fn markers(map: &MapView) -> impl Iterator<Item = &Marker> {
    map.overlays.iter().flat_map(|o| o.layer.markers.iter())
}

/// Write markers as colored terminal lines.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human<W: Write>(writer: &mut W, map: &MapView) -> io::Result<()> {
    for marker in markers(map) {
        let color = ansi_fg(marker.fill_color);
        let id = marker.id.as_deref().unwrap_or("-");
        writeln!(
            writer,
            "{color}●{RESET} {BOLD}{id:12}{RESET} │ \
             {lat:>8.3}, {lng:>9.3} │ \
             {DIM}r={radius:>7.0}m{RESET} │ \
             {color}{fill}{RESET}",
            lat = marker.position.lat,
            lng = marker.position.lng,
            radius = marker.radius,
            fill = marker.fill_color,
        )?;
    }
    Ok(())
}

/// Write markers as a JSON array.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write>(writer: &mut W, map: &MapView) -> io::Result<()> {
    let all: Vec<&Marker> = markers(map).collect();
    let json = serde_json::to_string_pretty(&all)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{json}")
}

/// Write markers as newline-delimited JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_ndjson<W: Write>(writer: &mut W, map: &MapView) -> io::Result<()> {
    for marker in markers(map) {
        let json = serde_json::to_string(marker)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{json}")?;
    }
    Ok(())
}

/// Write the map page.
///
/// # Errors
///
/// Returns an error if rendering or writing fails.
pub fn write_html<W: Write>(writer: &mut W, map: &MapView) -> io::Result<()> {
    let doc = render_document(map).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writer.write_all(doc.as_bytes())
}

/// Write a map in the specified format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_map<W: Write>(writer: &mut W, map: &MapView, format: Format) -> io::Result<()> {
    match format {
        Format::Html => write_html(writer, map),
        Format::Human => write_human(writer, map),
        Format::Json => write_json(writer, map),
        Format::Ndjson => write_ndjson(writer, map),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LatLng, TimeDisplay};
    use crate::map::{DEFAULT_CENTER, DEFAULT_ZOOM, earthquake_map};
    use crate::marker::MarkerLayer;
    use crate::models::EarthquakeFeature;

    fn map_with(depths: &[f64]) -> MapView {
        let markers = depths
            .iter()
            .enumerate()
            .map(|(i, &depth_km)| {
                let quake = EarthquakeFeature {
                    id: Some(format!("ev{i}")),
                    longitude: -120.0,
                    latitude: 36.0,
                    depth_km,
                    magnitude: 2.0,
                    title: format!("M 2.0 - event {i}"),
                    time_ms: 1_700_000_000_000,
                };
                Marker::from_feature(&quake, TimeDisplay::Utc)
            })
            .collect();
        earthquake_map(
            MarkerLayer { markers, skipped: 0 },
            DEFAULT_CENTER,
            DEFAULT_ZOOM,
        )
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("html".parse::<Format>().unwrap(), Format::Html);
        assert_eq!("human".parse::<Format>().unwrap(), Format::Human);
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("ndjson".parse::<Format>().unwrap(), Format::Ndjson);
        assert!("invalid".parse::<Format>().is_err());
    }

    #[test]
    fn test_ansi_fg() {
        assert_eq!(ansi_fg("#ff8c00"), "\x1b[38;2;255;140;0m");
        assert_eq!(ansi_fg("#000"), "\x1b[38;2;0;0;0m");
    }

    #[test]
    fn test_ndjson_one_line_per_marker() {
        let mut buf = Vec::new();
        write_map(&mut buf, &map_with(&[5.0, 80.0, 40.0]), Format::Ndjson).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["id"], "ev1");
        assert_eq!(second["fill_color"], "#ff0000");
    }

    #[test]
    fn test_json_array() {
        let mut buf = Vec::new();
        write_map(&mut buf, &map_with(&[5.0, 20.0]), Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
        assert_eq!(value[1]["fill_color"], "#9acd32");
    }

    #[test]
    fn test_human_lists_every_marker() {
        let mut buf = Vec::new();
        write_map(&mut buf, &map_with(&[5.0, 60.0]), Format::Human).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("ev0"));
        assert!(text.contains("#ff8c00"));
    }

    #[test]
    fn test_html_document() {
        let mut buf = Vec::new();
        let map = map_with(&[]);
        write_map(&mut buf, &map, Format::Html).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("<!DOCTYPE html>"));
        assert_eq!(map.center, LatLng::new(38.5, -96.5));
    }
}
