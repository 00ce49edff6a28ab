use thiserror::Error;

/// The plugin configuration payload could not be decoded.
///
/// Surfaced to the host when a filter configuration is created; the filter
/// is not installed.
#[derive(Error, Debug)]
pub enum ConfigParseError {
    #[error("configuration payload is empty")]
    Empty,

    #[error("malformed configuration payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writing to the response failed.
#[derive(Error, Debug)]
#[error("failed to write response: {0}")]
pub struct WriteError(#[from] pub std::io::Error);

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("plugin name must not be empty")]
    MissingName,

    #[error("plugin {0} is already registered")]
    AlreadyRegistered(String),

    #[error("no plugin registered under {0}")]
    UnknownPlugin(String),

    #[error("invalid configuration for plugin {plugin}: {source}")]
    Config {
        plugin: String,
        #[source]
        source: ConfigParseError,
    },
}
