//! Map document rendering.
//!
//! Turns a [`MapView`] into a single HTML page that loads Leaflet from a CDN
//! and rebuilds the view client-side from an embedded JSON payload.

use serde::Serialize;

use crate::config::LatLng;
use crate::errors::QuakemapError;
use crate::html;
use crate::map::{Control, MapView};
use crate::marker::Marker;

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

#[derive(Serialize)]
struct PagePayload<'a> {
    element_id: &'a str,
    center: LatLng,
    zoom: u8,
    tiles: TilesPayload<'a>,
    overlays: Vec<OverlayPayload<'a>>,
    controls: Vec<ControlPayload>,
}

#[derive(Serialize)]
struct TilesPayload<'a> {
    url: &'a str,
    attribution: &'a str,
}

#[derive(Serialize)]
struct OverlayPayload<'a> {
    name: &'a str,
    active: bool,
    markers: &'a [Marker],
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum ControlPayload {
    Layers { position: &'static str },
    Legend { position: &'static str, html: String },
}

impl<'a> From<&'a MapView> for PagePayload<'a> {
    fn from(map: &'a MapView) -> Self {
        Self {
            element_id: &map.element_id,
            center: map.center,
            zoom: map.zoom,
            tiles: TilesPayload {
                url: &map.base.url_template,
                attribution: &map.base.attribution,
            },
            overlays: map
                .overlays
                .iter()
                .map(|o| OverlayPayload {
                    name: &o.name,
                    active: o.active,
                    markers: &o.layer.markers,
                })
                .collect(),
            controls: map
                .controls
                .iter()
                .map(|c| match c {
                    Control::Layers { position } => ControlPayload::Layers {
                        position: position.as_str(),
                    },
                    Control::Legend(legend) => ControlPayload::Legend {
                        position: legend.position.as_str(),
                        html: legend.to_html(),
                    },
                })
                .collect(),
        }
    }
}

/// Render a map view as a standalone HTML document.
///
/// # Errors
///
/// Returns an error if the view cannot be serialized.
pub fn render_document(map: &MapView) -> Result<String, QuakemapError> {
    let payload = serde_json::to_string(&PagePayload::from(map))?;

    Ok(format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Earthquake Map</title>
  <link rel="stylesheet" href="{LEAFLET_CSS}" />
  <script src="{LEAFLET_JS}"></script>
  <style>
    html, body, #{element_id} {{ height: 100%; margin: 0; }}
    .info.legend {{
      background: white;
      padding: 6px 8px;
      line-height: 18px;
      color: #555;
      border-radius: 5px;
      box-shadow: 0 0 15px rgba(0, 0, 0, 0.2);
    }}
    .legend h4 {{ margin: 0 0 5px; }}
    .legend i {{ margin-right: 8px; }}
  </style>
</head>
<body>
  <div id="{element_id}"></div>
  <script>
  (function() {{
    var view = {payload};
    var base = L.tileLayer(view.tiles.url, {{ attribution: view.tiles.attribution }});
    var overlays = {{}};
    var active = [base];

    view.overlays.forEach(function(o) {{
      var layer = L.layerGroup(o.markers.map(function(m) {{
        return L.circle([m.position.lat, m.position.lng], {{
          radius: m.radius,
          fillColor: m.fill_color,
          color: m.stroke_color,
          weight: m.stroke_weight,
          fillOpacity: m.fill_opacity
        }}).bindPopup(m.popup);
      }}));
      overlays[o.name] = layer;
      if (o.active) active.push(layer);
    }});

    var map = L.map(view.element_id, {{
      center: [view.center.lat, view.center.lng],
      zoom: view.zoom,
      layers: active
    }});

    view.controls.forEach(function(c) {{
      if (c.kind === 'layers') {{
        L.control.layers(null, overlays, {{ position: c.position }}).addTo(map);
      }} else if (c.kind === 'legend') {{
        var legend = L.control({{ position: c.position }});
        legend.onAdd = function() {{
          var div = L.DomUtil.create('div', 'info legend');
          div.innerHTML = c.html;
          return div;
        }};
        legend.addTo(map);
      }}
    }});
  }})();
  </script>
</body>
</html>
"##,
        element_id = html::escape(&map.element_id),
        payload = html::script_safe_json(&payload),
    ))
}
