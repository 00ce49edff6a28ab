use std::sync::OnceLock;

use envoy_proxy_dynamic_modules_rust_sdk::*;
use tracing_subscriber::EnvFilter;

pub mod callback;
pub mod config;
mod envoy;
pub mod error;
pub mod exchange;
pub mod header_check;
pub mod plugin;
pub mod token;

pub use callback::{CallbackHandler, PendingCallback};
pub use config::HeaderCheckConfig;
pub use error::{ConfigParseError, RegistryError, WriteError};
pub use header_check::SimpleHeaderCheck;
pub use plugin::{ConfiguredFilter, FilterOutcome, Plugin, PluginRegistry};

declare_init_functions!(init, new_http_filter_config_fn);

static REGISTRY: OnceLock<PluginRegistry> = OnceLock::new();

/// Registry holding every plugin this module ships.
pub fn builtin_registry() -> Result<PluginRegistry, RegistryError> {
    let mut registry = PluginRegistry::new();
    registry.register(SimpleHeaderCheck::new())?;
    Ok(registry)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed by an earlier load.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// This implements the [`envoy_proxy_dynamic_modules_rust_sdk::ProgramInitFunction`].
///
/// This is called exactly once when the module is loaded. It installs logging
/// and registers the plugins.
///
/// Returning `false` will cause Envoy to reject the module.
fn init() -> bool {
    init_logging();

    let registry = match builtin_registry() {
        Ok(registry) => registry,
        Err(err) => {
            tracing::error!(error = %err, "failed to register plugins");
            return false;
        }
    };
    tracing::info!(plugins = ?registry.names(), "module initialized");
    REGISTRY.get_or_init(|| registry);
    true
}

/// This implements the [`envoy_proxy_dynamic_modules_rust_sdk::NewHttpFilterConfigFunction`].
///
/// This is the entrypoint every time a new HTTP filter is created via the DynamicModuleFilter config.
///
/// Each argument matches the corresponding argument in the Envoy config here:
/// https://www.envoyproxy.io/docs/envoy/latest/api-v3/extensions/dynamic_modules/v3/dynamic_modules.proto#envoy-v3-api-msg-extensions-dynamic-modules-v3-dynamicmoduleconfig
///
/// Returns None if the filter name is unknown or its config does not parse.
fn new_http_filter_config_fn<EC: EnvoyHttpFilterConfig, EHF: EnvoyHttpFilter>(
    _envoy_filter_config: &mut EC,
    filter_name: &str,
    filter_config: &[u8],
) -> Option<Box<dyn HttpFilterConfig<EC, EHF>>> {
    let Some(registry) = REGISTRY.get() else {
        tracing::error!(filter_name, "module was not initialized");
        return None;
    };

    match registry.configure(filter_name, filter_config) {
        Ok(filter) => {
            tracing::info!(filter_name, "created filter");
            Some(Box::new(envoy::FilterConfig::new(filter)))
        }
        Err(err) => {
            tracing::error!(filter_name, error = %err, "rejecting filter config");
            None
        }
    }
}
