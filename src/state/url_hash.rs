//! URL fragment encoding/decoding for shareable map views.
//!
//! The fragment holds the active tile source, map center, zoom and option
//! tokens (`#nextzen,40.7053,-74.0098,15,perf`), so reloading restores the
//! view and links can be shared. It also accepts the shorter forms
//! `#source`, `#lat,lng,zoom` and `#source,locationName`.
//!
//! Token-count precedence is checked in a fixed order: 3 tokens, then more
//! than 3, then 2, then 1. A 3-token fragment is therefore always read as
//! coordinates, so `#source,locationName,option` cannot be expressed and
//! falls back to the default location. Existing links depend on this, so it
//! is kept as is.

use super::options::OptionFlags;
use super::view::MapViewState;
use crate::data::{get_location_or_default, TileSourceRegistry};

/// A parsed fragment, before any defaults are applied.
#[derive(Debug, Clone, PartialEq)]
pub enum UrlRoute {
    /// No fragment at all.
    Empty,
    /// `#source`
    Source { source: String },
    /// `#lat,lng,zoom`
    View { lat: f64, lng: f64, zoom: u8 },
    /// `#source,lat,lng,zoom[,option...]`
    SourceView {
        source: String,
        lat: f64,
        lng: f64,
        zoom: u8,
        options: OptionFlags,
    },
    /// `#source,locationName`
    SourceLocation { source: String, location: String },
    /// The coordinate tokens did not parse.
    Malformed {
        source: Option<String>,
        options: OptionFlags,
    },
}

/// Parses a fragment (with or without the leading `#`).
pub fn parse_hash(hash: &str) -> UrlRoute {
    let hash = hash.trim().trim_start_matches('#');
    if hash.is_empty() {
        return UrlRoute::Empty;
    }

    let tokens: Vec<&str> = hash.split(',').map(str::trim).collect();

    if tokens.len() == 3 {
        match parse_coordinates(tokens[0], tokens[1], tokens[2]) {
            Some((lat, lng, zoom)) => UrlRoute::View { lat, lng, zoom },
            None => UrlRoute::Malformed {
                source: None,
                options: OptionFlags::new(),
            },
        }
    } else if tokens.len() > 3 {
        let source = tokens[0].to_string();
        let options = OptionFlags::from_tokens(&tokens[4..]);
        match parse_coordinates(tokens[1], tokens[2], tokens[3]) {
            Some((lat, lng, zoom)) => UrlRoute::SourceView {
                source,
                lat,
                lng,
                zoom,
                options,
            },
            None => UrlRoute::Malformed {
                source: Some(source),
                options,
            },
        }
    } else if tokens.len() == 2 {
        UrlRoute::SourceLocation {
            source: tokens[0].to_string(),
            location: tokens[1].to_string(),
        }
    } else {
        UrlRoute::Source {
            source: tokens[0].to_string(),
        }
    }
}

fn parse_coordinates(lat: &str, lng: &str, zoom: &str) -> Option<(f64, f64, u8)> {
    let lat: f64 = lat.parse().ok().filter(|v: &f64| v.is_finite())?;
    let lng: f64 = lng.parse().ok().filter(|v: &f64| v.is_finite())?;
    let zoom: f64 = zoom.parse().ok().filter(|v: &f64| v.is_finite())?;
    let zoom = zoom.round();
    if !(0.0..=f64::from(u8::MAX)).contains(&zoom) {
        return None;
    }
    Some((lat, lng, zoom as u8))
}

impl UrlRoute {
    /// Applies defaults: unknown sources become the registry default and
    /// anything that does not name a view lands on `default_location`.
    pub fn resolve(&self, registry: &TileSourceRegistry, default_location: &str) -> MapViewState {
        let fallback = get_location_or_default(default_location);
        let default_source = registry.default_id();

        match self {
            UrlRoute::Empty => MapViewState::at_location(default_source, fallback),
            UrlRoute::Source { source } => {
                MapViewState::at_location(registry.resolve_id(source), fallback)
            }
            UrlRoute::View { lat, lng, zoom } => {
                MapViewState::new(default_source, *lat, *lng, *zoom)
            }
            UrlRoute::SourceView {
                source,
                lat,
                lng,
                zoom,
                options,
            } => MapViewState::new(registry.resolve_id(source), *lat, *lng, *zoom)
                .with_options(options.clone()),
            UrlRoute::SourceLocation { source, location } => MapViewState::at_location(
                registry.resolve_id(source),
                get_location_or_default(location_or(location, default_location)),
            ),
            UrlRoute::Malformed { source, options } => {
                log::warn!("Malformed URL fragment, using location '{}'", fallback.name);
                let source = source
                    .as_deref()
                    .map(|s| registry.resolve_id(s))
                    .unwrap_or(default_source);
                MapViewState::at_location(source, fallback).with_options(options.clone())
            }
        }
    }
}

fn location_or<'a>(name: &'a str, default_location: &'a str) -> &'a str {
    if crate::data::get_location(name).is_some() {
        name
    } else {
        default_location
    }
}

/// Decimal places used for lat/lng at a given zoom: `max(0, ceil(log2(zoom)))`.
pub fn coordinate_precision(zoom: u8) -> usize {
    if zoom <= 1 {
        return 0;
    }
    f64::from(zoom).log2().ceil() as usize
}

/// Serializes the view as `source,lat,lng,zoom[,option...]`.
pub fn format_hash(state: &MapViewState) -> String {
    let precision = coordinate_precision(state.zoom);
    let mut hash = format!(
        "{},{:.*},{:.*},{}",
        state.source_id,
        precision,
        state.lat(),
        precision,
        state.lng(),
        state.zoom
    );
    for option in state.options.iter() {
        hash.push(',');
        hash.push_str(option);
    }
    hash
}

/// Read the fragment from the current browser URL.
#[cfg(target_arch = "wasm32")]
pub fn read_from_location() -> String {
    web_sys::window()
        .and_then(|w| w.location().hash().ok())
        .unwrap_or_default()
}

/// Replace the fragment using `replaceState`, so pans do not pile up in
/// the session history.
#[cfg(target_arch = "wasm32")]
pub fn write_to_location(hash: &str) -> Result<(), crate::error::ViewerError> {
    let window = web_sys::window()
        .ok_or_else(|| crate::error::ViewerError::Js("No window object".to_string()))?;
    let history = window.history()?;
    history.replace_state_with_url(
        &wasm_bindgen::JsValue::NULL,
        "",
        Some(&format!("#{}", hash)),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DEFAULT_LOCATION, DEFAULT_SOURCE_ID};

    fn resolve(hash: &str) -> MapViewState {
        parse_hash(hash).resolve(&TileSourceRegistry::default(), DEFAULT_LOCATION)
    }

    #[test]
    fn test_three_tokens_set_view_and_keep_default_source() {
        let state = resolve("#51.5,-0.12,12");
        assert_eq!(state.lat(), 51.5);
        assert_eq!(state.lng(), -0.12);
        assert_eq!(state.zoom, 12);
        assert_eq!(state.source_id, DEFAULT_SOURCE_ID);
        assert_eq!(state.options.iter().count(), 0);
    }

    #[test]
    fn test_two_tokens_use_named_location() {
        let state = resolve("#mapzen,tokyo");
        assert_eq!(state.source_id, "mapzen");
        assert_eq!(state.lat(), 35.6762);
        assert_eq!(state.lng(), 139.6503);
        assert_eq!(state.zoom, 13);
    }

    #[test]
    fn test_two_tokens_unknown_location_uses_default() {
        let state = resolve("#mapzen,atlantis");
        assert_eq!(state.source_id, "mapzen");
        assert_eq!(state.zoom, 15);
        assert_eq!(state.lat(), 40.70531887544228);
    }

    #[test]
    fn test_two_numeric_tokens_are_not_coordinates() {
        // Always [source, locationName], never [lat, lng]
        assert_eq!(
            parse_hash("40.7,-74.0"),
            UrlRoute::SourceLocation {
                source: "40.7".to_string(),
                location: "-74.0".to_string(),
            }
        );
        let state = resolve("40.7,-74.0");
        assert_eq!(state.source_id, DEFAULT_SOURCE_ID);
        assert_eq!(state.zoom, 15);
    }

    #[test]
    fn test_single_token_selects_source_at_default_location() {
        let state = resolve("#local");
        assert_eq!(state.source_id, "local");
        assert_eq!(state.zoom, 15);
        assert_eq!(state.lng(), -74.00976419448853);
    }

    #[test]
    fn test_unknown_source_falls_back() {
        let state = resolve("#nope,1,2,3");
        assert_eq!(state.source_id, DEFAULT_SOURCE_ID);
        assert_eq!((state.lat(), state.lng(), state.zoom), (1.0, 2.0, 3));
    }

    #[test]
    fn test_long_form_with_options() {
        let route = parse_hash("#mapzen,37.7749,-122.4194,14,perf,mode=night");
        match &route {
            UrlRoute::SourceView { options, zoom, .. } => {
                assert_eq!(*zoom, 14);
                assert!(options.perf());
                assert_eq!(options.render_mode(), Some("night"));
            }
            other => panic!("unexpected route {:?}", other),
        }
    }

    #[test]
    fn test_empty_and_malformed_use_default_location() {
        let state = resolve("");
        assert_eq!(state.source_id, DEFAULT_SOURCE_ID);
        assert_eq!(state.zoom, 15);

        let state = resolve("#abc,def,ghi");
        assert_eq!(state.source_id, DEFAULT_SOURCE_ID);
        assert_eq!(state.zoom, 15);

        let state = resolve("#mapzen,NaN,1,2,perf");
        assert_eq!(state.source_id, "mapzen");
        assert_eq!(state.zoom, 15);
        assert!(state.options.perf());
    }

    #[test]
    fn test_known_quirk_location_with_option_is_unreachable() {
        // Three tokens are always coordinates, so a location name followed
        // by an option is read as a malformed coordinate triple.
        assert_eq!(
            parse_hash("#mapzen,tokyo,perf"),
            UrlRoute::Malformed {
                source: None,
                options: OptionFlags::new(),
            }
        );
        let state = resolve("#mapzen,tokyo,perf");
        assert_eq!(state.source_id, DEFAULT_SOURCE_ID);
        assert_eq!(state.zoom, 15);
        assert!(!state.options.perf());
    }

    #[test]
    fn test_fractional_and_negative_zoom() {
        assert_eq!(
            parse_hash("1,2,14.6"),
            UrlRoute::View {
                lat: 1.0,
                lng: 2.0,
                zoom: 15
            }
        );
        assert!(matches!(parse_hash("1,2,-3"), UrlRoute::Malformed { .. }));
        assert!(matches!(parse_hash("1,inf,3"), UrlRoute::Malformed { .. }));
    }

    #[test]
    fn test_precision_by_zoom() {
        assert_eq!(coordinate_precision(0), 0);
        assert_eq!(coordinate_precision(1), 0);
        assert_eq!(coordinate_precision(2), 1);
        assert_eq!(coordinate_precision(8), 3);
        assert_eq!(coordinate_precision(15), 4);
        assert_eq!(coordinate_precision(17), 5);
    }

    #[test]
    fn test_format_hash() {
        let state = MapViewState::new("nextzen", 40.70531887544228, -74.00976419448853, 15)
            .with_options(OptionFlags::from_tokens(["perf", "mode=night"]));
        assert_eq!(format_hash(&state), "nextzen,40.7053,-74.0098,15,perf,mode=night");
    }

    #[test]
    fn test_formatted_hash_parses_back_with_options_in_order() {
        let state = MapViewState::new("mapzen", 48.8566, 2.3522, 14)
            .with_options(OptionFlags::from_tokens(["mode=day", "perf", "extra"]));
        let reparsed = resolve(&format_hash(&state));
        assert_eq!(reparsed.source_id, "mapzen");
        assert_eq!(reparsed.zoom, 14);
        assert_eq!(
            reparsed.options.iter().collect::<Vec<_>>(),
            vec!["mode=day", "perf", "extra"]
        );
    }
}
