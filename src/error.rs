//! Error type shared by the viewer core and the platform bindings.

/// Errors that can occur while wiring up the viewer.
///
/// None of these are surfaced to the user; callers log them and carry on
/// with defaults wherever a default exists.
#[derive(Debug, Clone)]
pub enum ViewerError {
    /// A required DOM element was not found.
    #[cfg(target_arch = "wasm32")]
    MissingElement(String),
    /// A JavaScript call threw or returned an unexpected value.
    #[cfg(target_arch = "wasm32")]
    Js(String),
    /// The viewer configuration could not be parsed.
    Config(String),
    /// A tile source URL template is missing a placeholder.
    InvalidTemplate { source_id: String, missing: &'static str },
}

impl std::fmt::Display for ViewerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(target_arch = "wasm32")]
            ViewerError::MissingElement(id) => write!(f, "Element not found: #{}", id),
            #[cfg(target_arch = "wasm32")]
            ViewerError::Js(msg) => write!(f, "JavaScript error: {}", msg),
            ViewerError::Config(msg) => write!(f, "Invalid configuration: {}", msg),
            ViewerError::InvalidTemplate { source_id, missing } => write!(
                f,
                "Tile source '{}' URL template is missing {}",
                source_id, missing
            ),
        }
    }
}

impl std::error::Error for ViewerError {}

impl From<serde_json::Error> for ViewerError {
    fn from(e: serde_json::Error) -> Self {
        ViewerError::Config(e.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for ViewerError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        ViewerError::Js(format!("{:?}", value))
    }
}
