//! Static gazetteer used to resolve free-text place names.
//!
//! Resolution never fails: an exact key match wins, then a substring match in
//! either direction (first entry in table order), and finally the country
//! centroid with the query kept as the place name.

use crate::models::{Location, RegionClass};

const DEFAULT_COUNTRY: &str = "India";
const CENTROID_LATITUDE: f64 = 20.5937;
const CENTROID_LONGITUDE: f64 = 78.9629;
const UNKNOWN_STATE: &str = "Unknown";

struct GazetteerEntry {
    key: &'static str,
    name: &'static str,
    state: &'static str,
    latitude: f64,
    longitude: f64,
    region: RegionClass,
}

/// Table order is the substring tie-break order.
const GAZETTEER: &[GazetteerEntry] = &[
    GazetteerEntry {
        key: "nadia",
        name: "Nadia",
        state: "West Bengal",
        latitude: 23.4,
        longitude: 88.5,
        region: RegionClass::Moderate,
    },
    GazetteerEntry {
        key: "mumbai",
        name: "Mumbai",
        state: "Maharashtra",
        latitude: 19.0760,
        longitude: 72.8777,
        region: RegionClass::Coastal,
    },
    GazetteerEntry {
        key: "kolkata",
        name: "Kolkata",
        state: "West Bengal",
        latitude: 22.5726,
        longitude: 88.3639,
        region: RegionClass::Coastal,
    },
    GazetteerEntry {
        key: "delhi",
        name: "Delhi",
        state: "Delhi",
        latitude: 28.7041,
        longitude: 77.1025,
        region: RegionClass::Moderate,
    },
    GazetteerEntry {
        key: "chennai",
        name: "Chennai",
        state: "Tamil Nadu",
        latitude: 13.0827,
        longitude: 80.2707,
        region: RegionClass::Coastal,
    },
    GazetteerEntry {
        key: "bangalore",
        name: "Bangalore",
        state: "Karnataka",
        latitude: 12.9716,
        longitude: 77.5946,
        region: RegionClass::Tropical,
    },
    GazetteerEntry {
        key: "hyderabad",
        name: "Hyderabad",
        state: "Telangana",
        latitude: 17.3850,
        longitude: 78.4867,
        region: RegionClass::Moderate,
    },
    GazetteerEntry {
        key: "kochi",
        name: "Kochi",
        state: "Kerala",
        latitude: 9.9312,
        longitude: 76.2673,
        region: RegionClass::Coastal,
    },
    GazetteerEntry {
        key: "goa",
        name: "Goa",
        state: "Goa",
        latitude: 15.2993,
        longitude: 74.1240,
        region: RegionClass::Coastal,
    },
    GazetteerEntry {
        key: "rajasthan",
        name: "Rajasthan",
        state: "Rajasthan",
        latitude: 27.0238,
        longitude: 74.2179,
        region: RegionClass::Arid,
    },
    GazetteerEntry {
        key: "punjab",
        name: "Punjab",
        state: "Punjab",
        latitude: 31.1471,
        longitude: 75.3412,
        region: RegionClass::Arid,
    },
    GazetteerEntry {
        key: "gujarat",
        name: "Gujarat",
        state: "Gujarat",
        latitude: 22.2587,
        longitude: 71.1924,
        region: RegionClass::Arid,
    },
];

/// Canonical form of a place query: trimmed, lowercased, inner whitespace
/// runs collapsed to one space. Also used for result-cache keys.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn lookup(normalized: &str) -> Option<&'static GazetteerEntry> {
    if normalized.is_empty() {
        return None;
    }

    GAZETTEER
        .iter()
        .find(|entry| entry.key == normalized)
        .or_else(|| {
            GAZETTEER
                .iter()
                .find(|entry| normalized.contains(entry.key) || entry.key.contains(normalized))
        })
}

/// Resolve a free-text place name to a `Location`. Total and pure.
pub fn resolve(query: &str) -> Location {
    match lookup(&normalize_query(query)) {
        Some(entry) => Location {
            name: entry.name.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            state: Some(entry.state.to_string()),
            latitude: entry.latitude,
            longitude: entry.longitude,
            region: entry.region,
        },
        None => {
            tracing::debug!("No gazetteer match for '{}', using country centroid", query);
            Location {
                name: query.trim().to_string(),
                country: DEFAULT_COUNTRY.to_string(),
                state: Some(UNKNOWN_STATE.to_string()),
                latitude: CENTROID_LATITUDE,
                longitude: CENTROID_LONGITUDE,
                region: RegionClass::Moderate,
            }
        }
    }
}

/// Region class for a query, for locations resolved by the remote geocoder.
pub fn region_for(query: &str) -> RegionClass {
    lookup(&normalize_query(query))
        .map(|entry| entry.region)
        .unwrap_or(RegionClass::Moderate)
}
