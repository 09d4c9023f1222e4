//! Credits of the data shown by layers.

/// Attribution of a data source: a credit text and an optional link to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    text: String,
    url: Option<String>,
}

impl Attribution {
    /// Creates a new `Attribution` with the given text and optional URL.
    pub fn new(text: String, url: Option<String>) -> Self {
        Self { text, url }
    }

    /// Text of the attribution.
    pub fn get_text(&self) -> &str {
        &self.text
    }

    /// URL associated with the attribution, if any.
    pub fn get_url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}
