use serde::{Deserialize, Serialize};

use crate::error::ConfigParseError;

/// Configuration for the header check filter.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderCheckConfig {
    /// Login endpoint clients are sent to when their token is rejected.
    #[serde(default)]
    pub redirect_url: String,
    /// Public base URL of the gateway, used to build the return address.
    #[serde(default)]
    pub gateway_base_url: String,
    /// Path on which the login flow calls back into the gateway.
    #[serde(default, rename = "call_back_path")]
    pub callback_path: String,
}

impl HeaderCheckConfig {
    /// Creates a HeaderCheckConfig from the JSON configuration payload.
    ///
    /// Missing keys, and a `null` payload, become empty strings and are
    /// caught by [`Self::is_valid`]; any other payload that is not a JSON
    /// object fails here.
    pub fn parse(raw: &[u8]) -> Result<Self, ConfigParseError> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Err(ConfigParseError::Empty);
        }
        let config: Option<Self> = serde_json::from_slice(raw)?;
        Ok(config.unwrap_or_default())
    }

    /// All three settings must be present. URLs are not checked for
    /// well-formedness.
    pub fn is_valid(&self) -> bool {
        !self.redirect_url.is_empty()
            && !self.gateway_base_url.is_empty()
            && !self.callback_path.is_empty()
    }
}
