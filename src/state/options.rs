//! Option tokens carried in the tail of the URL fragment.

/// Token that turns on the frame statistics overlay.
pub const PERF_FLAG: &str = "perf";

/// Prefix of the render mode token (`mode=<name>`).
pub const MODE_PREFIX: &str = "mode=";

/// Ordered, de-duplicated set of option tokens.
///
/// Tokens this crate does not understand are kept so they survive the
/// round trip through the fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionFlags {
    tokens: Vec<String>,
}

impl OptionFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut flags = Self::new();
        for token in tokens {
            flags.insert(token.as_ref());
        }
        flags
    }

    /// Adds a token. Blank tokens and duplicates are ignored.
    pub fn insert(&mut self, token: &str) -> bool {
        let token = token.trim();
        if token.is_empty() || self.contains(token) {
            return false;
        }
        self.tokens.push(token.to_string());
        true
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Whether the performance overlay was requested.
    pub fn perf(&self) -> bool {
        self.contains(PERF_FLAG)
    }

    /// The requested render mode; the last `mode=` token wins.
    pub fn render_mode(&self) -> Option<&str> {
        self.tokens
            .iter()
            .rev()
            .find_map(|t| t.strip_prefix(MODE_PREFIX))
            .filter(|name| !name.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}
