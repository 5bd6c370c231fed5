//! Named locations that can be used in place of coordinates in the URL
//! fragment (`#source,newyork`).

/// A fixed viewpoint addressed by name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NamedLocation {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
    pub zoom: u8,
}

/// Location used when the fragment does not resolve to a view.
pub const DEFAULT_LOCATION: &str = "newyork";

pub static NAMED_LOCATIONS: &[NamedLocation] = &[
    NamedLocation {
        name: "newyork",
        lat: 40.70531887544228,
        lng: -74.00976419448853,
        zoom: 15,
    },
    NamedLocation {
        name: "sanfrancisco",
        lat: 37.7749,
        lng: -122.4194,
        zoom: 14,
    },
    NamedLocation {
        name: "london",
        lat: 51.5074,
        lng: -0.1278,
        zoom: 14,
    },
    NamedLocation {
        name: "paris",
        lat: 48.8566,
        lng: 2.3522,
        zoom: 14,
    },
    NamedLocation {
        name: "berlin",
        lat: 52.5200,
        lng: 13.4050,
        zoom: 13,
    },
    NamedLocation {
        name: "tokyo",
        lat: 35.6762,
        lng: 139.6503,
        zoom: 13,
    },
    NamedLocation {
        name: "sydney",
        lat: -33.8688,
        lng: 151.2093,
        zoom: 13,
    },
    NamedLocation {
        name: "world",
        lat: 20.0,
        lng: 0.0,
        zoom: 2,
    },
];

/// Looks up a location by name, ignoring ASCII case.
pub fn get_location(name: &str) -> Option<&'static NamedLocation> {
    NAMED_LOCATIONS
        .iter()
        .find(|loc| loc.name.eq_ignore_ascii_case(name))
}

/// Returns `name` if it is a known location, otherwise the built-in default.
pub fn get_location_or_default(name: &str) -> &'static NamedLocation {
    get_location(name)
        .or_else(|| get_location(DEFAULT_LOCATION))
        .unwrap_or(&NAMED_LOCATIONS[0])
}
