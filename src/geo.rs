//! Map placement for founders
//!
//! Cities resolve to approximate coordinates; founders sharing a city are
//! fanned out slightly so their markers don't overlap.

use crate::types::FounderCard;
use serde::Serialize;

/// Approximate (lng, lat) for cities founders list
pub const CITY_COORDINATES: &[(&str, (f64, f64))] = &[
    ("Dehradun", (78.0322, 30.3165)),
    ("Mumbai", (72.8777, 19.076)),
    ("New Delhi", (77.209, 28.6139)),
    ("Delhi", (77.209, 28.6139)),
    ("Bangalore", (77.5946, 12.9716)),
    ("Bengaluru", (77.5946, 12.9716)),
    ("Chennai", (80.2707, 13.0827)),
    ("Hyderabad", (78.4867, 17.385)),
    ("Kolkata", (88.3639, 22.5726)),
    ("Pune", (73.8563, 18.5204)),
    ("Ahmedabad", (72.5714, 23.0225)),
    ("Jaipur", (75.7873, 26.9124)),
    ("Lucknow", (80.9462, 26.8467)),
    ("Kochi", (76.2673, 9.9312)),
    ("Chandigarh", (76.7794, 30.7333)),
    ("Indore", (75.8577, 22.7196)),
    ("Coimbatore", (76.9558, 11.0168)),
    ("Nagpur", (79.0882, 21.1458)),
    ("Gurgaon", (77.0266, 28.4595)),
    ("Gurugram", (77.0266, 28.4595)),
    ("Noida", (77.391, 28.5355)),
    ("Thane", (72.9762, 19.2183)),
    ("Bhopal", (77.4126, 23.2599)),
    ("Visakhapatnam", (83.2185, 17.6868)),
    ("Surat", (72.8311, 21.1702)),
    ("Patna", (85.1376, 25.5941)),
    ("Vadodara", (73.1812, 22.3072)),
    ("Ghaziabad", (77.437, 28.6692)),
    ("Ludhiana", (75.8573, 30.901)),
    ("Agra", (78.0081, 27.1767)),
    ("Nashik", (73.7898, 19.9975)),
    ("Faridabad", (77.319, 28.4089)),
    ("Meerut", (77.708, 28.9845)),
    ("Rajkot", (70.8022, 22.3039)),
    ("Srinagar", (74.7973, 34.0837)),
    ("Ranchi", (85.3096, 23.3441)),
    ("Guwahati", (91.751, 26.1445)),
    ("Bhubaneswar", (85.8245, 20.2961)),
];

/// Group label for founders with no usable city
pub const FALLBACK_CITY: &str = "India";

/// Centre of India (lng, lat)
pub const INDIA_CENTER: (f64, f64) = (78.9629, 20.5937);

/// [min lng, min lat, max lng, max lat] of the outline map
pub const INDIA_BOUNDS: [f64; 4] = [68.0, 6.5, 97.5, 37.5];

const LAT_SPREAD: f64 = 0.02;
const LNG_SPREAD: f64 = 0.015;
const SVG_X_SPREAD: f64 = 2.0 * 0.8;
const SVG_Y_SPREAD: f64 = 1.5;

/// Look up a city, ignoring case and extra whitespace
pub fn city_coordinates(city: &str) -> Option<(f64, f64)> {
    let key = city.split_whitespace().collect::<Vec<_>>().join(" ");
    if key.is_empty() {
        return None;
    }
    CITY_COORDINATES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(&key))
        .map(|(_, coords)| *coords)
}

/// Project lng/lat into the outline map's 0..100 viewBox
pub fn lng_lat_to_svg(lng: f64, lat: f64) -> (f64, f64) {
    let [min_lng, min_lat, max_lng, max_lat] = INDIA_BOUNDS;
    let x = (lng - min_lng) / (max_lng - min_lng) * 100.0;
    let y = (max_lat - lat) / (max_lat - min_lat) * 100.0;
    (x, y)
}

/// One founder pin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub handle: String,
    pub name: String,
    /// City group label the marker belongs to
    pub city: String,
    pub lat: f64,
    pub lng: f64,
    /// Position on the 0..100 outline map
    pub x: f64,
    pub y: f64,
    /// Index of the city group, for colouring
    pub group: usize,
}

/// Place every founder, grouping by city in first-appearance order
pub fn place_markers(cards: &[FounderCard]) -> Vec<MapMarker> {
    let mut groups: Vec<(String, Vec<&FounderCard>)> = Vec::new();
    for card in cards {
        let city = card
            .city
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(FALLBACK_CITY)
            .to_string();
        match groups.iter_mut().find(|(c, _)| *c == city) {
            Some((_, members)) => members.push(card),
            None => groups.push((city, vec![card])),
        }
    }

    let mut markers = Vec::with_capacity(cards.len());
    for (group, (city, members)) in groups.iter().enumerate() {
        let known = if city == FALLBACK_CITY {
            None
        } else {
            city_coordinates(city)
        };
        let (base_lng, base_lat) = known.unwrap_or(INDIA_CENTER);
        let (base_x, base_y) = known
            .map(|(lng, lat)| lng_lat_to_svg(lng, lat))
            .unwrap_or((50.0, 50.0));

        let n = members.len();
        for (i, card) in members.iter().enumerate() {
            let (spread, alternate) = if n > 1 {
                (i as f64 - (n as f64 - 1.0) / 2.0, (i % 2) as f64)
            } else {
                (0.0, 0.0)
            };
            markers.push(MapMarker {
                handle: card.handle.clone(),
                name: card.name.clone(),
                city: city.clone(),
                lat: base_lat + spread * LAT_SPREAD,
                lng: base_lng + alternate * LNG_SPREAD,
                x: base_x + spread * SVG_X_SPREAD,
                y: base_y + alternate * SVG_Y_SPREAD,
                group,
            });
        }
    }
    markers
}
