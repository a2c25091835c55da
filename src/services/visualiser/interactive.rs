use crate::error::{AppError, Result};
use crate::models::{BoundingBox, Stop};
use serde::Serialize;

const LEAFLET_VERSION: &str = "1.9.4";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>__TITLE__</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@__LEAFLET__/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@__LEAFLET__/dist/leaflet.js"></script>
<style>html, body, #map { height: 100%; margin: 0; }</style>
</head>
<body>
<div id="map"></div>
<script>
const data = __DATA__;
const map = L.map('map').setView(data.center, data.zoom);
L.tileLayer(data.tile_url, {
  maxZoom: 19,
  attribution: '&copy; OpenStreetMap contributors'
}).addTo(map);

function addMarkers(points, color) {
  points.forEach(function (p) {
    const label = document.createElement('span');
    label.textContent = p.id;
    L.circleMarker([p.lat, p.lon], { color: color, fillColor: color, fillOpacity: 0.8, radius: 8 })
      .bindTooltip(label, { permanent: true, direction: 'top' })
      .addTo(map);
  });
}

addMarkers(data.pickups, 'green');
addMarkers(data.dropoffs, 'red');
L.polygon(data.bounding_box, { color: 'orange', weight: 5, fill: false }).addTo(map);
</script>
</body>
</html>
"#;

#[derive(Debug, Serialize)]
struct Marker<'a> {
    id: &'a str,
    lat: f64,
    lon: f64,
}

impl<'a> From<&'a Stop> for Marker<'a> {
    fn from(stop: &'a Stop) -> Self {
        Marker {
            id: &stop.id,
            lat: stop.lat(),
            lon: stop.lon(),
        }
    }
}

#[derive(Debug, Serialize)]
struct MapData<'a> {
    center: [f64; 2],
    zoom: u8,
    tile_url: &'a str,
    pickups: Vec<Marker<'a>>,
    dropoffs: Vec<Marker<'a>>,
    /// `[lat, lon]` pairs tracing the box.
    bounding_box: Vec<[f64; 2]>,
}

/// Leaflet page with the sampled stops and the box outline.
pub fn map_page(
    title: &str,
    bounding_box: &BoundingBox,
    pickups: &[Stop],
    dropoffs: &[Stop],
    zoom: u8,
    tile_url: &str,
) -> Result<String> {
    let (lat, lon) = bounding_box.center()?;
    let lats = bounding_box.lats()?;
    let lons = bounding_box.lons()?;

    let data = MapData {
        center: [lat, lon],
        zoom,
        tile_url,
        pickups: pickups.iter().map(Marker::from).collect(),
        dropoffs: dropoffs.iter().map(Marker::from).collect(),
        bounding_box: lats.iter().zip(lons.iter()).map(|(&y, &x)| [y, x]).collect(),
    };

    let json = serde_json::to_string(&data)
        .map_err(|e| AppError::Render(format!("Failed to serialise map data: {}", e)))?
        // Keep `</script>` inside a stop id from closing the script element.
        .replace("</", "<\\/");

    Ok(PAGE_TEMPLATE
        .replace("__TITLE__", &escape_html(title))
        .replace("__LEAFLET__", LEAFLET_VERSION)
        .replace("__DATA__", &json))
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_box() -> BoundingBox {
        BoundingBox::new(
            13.34014892578125,
            52.52791908000258,
            13.506317138671875,
            52.562995039558004,
        )
    }

    fn embedded_data(page: &str) -> serde_json::Value {
        let start = page.find("const data = ").unwrap() + "const data = ".len();
        let end = start + page[start..].find(";\n").unwrap();
        serde_json::from_str(&page[start..end].replace("<\\/", "</")).unwrap()
    }

    #[test]
    fn embeds_centre_markers_and_outline() {
        let pickups = vec![Stop::new("p1", 13.40, 52.54)];
        let dropoffs = vec![Stop::new("d1", 13.45, 52.55), Stop::new("d2", 13.41, 52.53)];
        let page = map_page("Run 1", &fixture_box(), &pickups, &dropoffs, 13, "https://t/{z}/{x}/{y}.png")
            .unwrap();

        let data = embedded_data(&page);
        assert_eq!(data["zoom"], 13);
        assert!((data["center"][0].as_f64().unwrap() - 52.54545705978029).abs() < 1e-12);
        assert!((data["center"][1].as_f64().unwrap() - 13.423233032226562).abs() < 1e-12);
        assert_eq!(data["pickups"][0]["id"], "p1");
        assert_eq!(data["dropoffs"].as_array().unwrap().len(), 2);

        let outline = data["bounding_box"].as_array().unwrap();
        assert_eq!(outline.len(), 4);
        assert_eq!(outline[0][0].as_f64().unwrap(), 52.52791908000258);
        assert_eq!(outline[0][1].as_f64().unwrap(), 13.34014892578125);
        assert_eq!(outline[2][1].as_f64().unwrap(), 13.506317138671875);

        assert!(page.contains("color: 'orange', weight: 5"));
        assert!(page.contains("permanent: true"));
    }

    #[test]
    fn script_breakout_is_neutralised() {
        let pickups = vec![Stop::new("</script><b>x", 13.40, 52.54)];
        let page = map_page("<t>", &fixture_box(), &pickups, &[], 13, "u").unwrap();
        assert_eq!(page.matches("</script>").count(), 2);
        assert!(page.contains("<title>&lt;t&gt;</title>"));
        assert_eq!(embedded_data(&page)["pickups"][0]["id"], "</script><b>x");
    }

    #[test]
    fn invalid_box_is_rejected() {
        let bbox = BoundingBox::parse(["a", "52.5", "13.5", "52.6"]);
        assert!(map_page("t", &bbox, &[], &[], 13, "u").is_err());
    }
}
