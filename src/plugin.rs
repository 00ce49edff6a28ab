use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{ConfigParseError, RegistryError};
use crate::exchange::{Request, ResponseWriter};

/// What a filter decided for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// The configuration failed validation; nothing was written.
    InvalidConfig,
    /// The request hit the callback path and went to the callback handler.
    Callback,
    /// The client was sent to the login flow.
    Redirect { location: String },
    /// The token was accepted and the pass marker was written.
    Pass,
}

/// A request filter the gateway can load by name.
pub trait Plugin: Send + Sync + 'static {
    type Config: fmt::Debug + Send + Sync + 'static;

    fn name(&self) -> &str;

    fn parse_config(&self, raw: &[u8]) -> Result<Self::Config, ConfigParseError>;

    fn filter(
        &self,
        config: &Self::Config,
        request: &dyn Request,
        response: &mut dyn ResponseWriter,
    ) -> FilterOutcome;
}

/// A plugin bound to one parsed configuration, shared by every request that
/// runs under that configuration.
pub trait ConfiguredFilter: Send + Sync {
    fn plugin_name(&self) -> &str;

    fn filter(&self, request: &dyn Request, response: &mut dyn ResponseWriter) -> FilterOutcome;
}

struct BoundPlugin<P: Plugin> {
    plugin: Arc<P>,
    config: P::Config,
}

impl<P: Plugin> ConfiguredFilter for BoundPlugin<P> {
    fn plugin_name(&self) -> &str {
        self.plugin.name()
    }

    fn filter(&self, request: &dyn Request, response: &mut dyn ResponseWriter) -> FilterOutcome {
        self.plugin.filter(&self.config, request, response)
    }
}

trait PluginFactory: Send + Sync {
    fn configure(&self, raw: &[u8]) -> Result<Box<dyn ConfiguredFilter>, ConfigParseError>;
}

impl<P: Plugin> PluginFactory for Arc<P> {
    fn configure(&self, raw: &[u8]) -> Result<Box<dyn ConfiguredFilter>, ConfigParseError> {
        let config = self.parse_config(raw)?;
        Ok(Box::new(BoundPlugin {
            plugin: Arc::clone(self),
            config,
        }))
    }
}

/// Plugins available to the host, keyed by name. Filled explicitly at start-up.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, Box<dyn PluginFactory>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<P: Plugin>(&mut self, plugin: P) -> Result<(), RegistryError> {
        let name = plugin.name().to_string();
        if name.is_empty() {
            return Err(RegistryError::MissingName);
        }
        if self.plugins.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        tracing::debug!(plugin = %name, "registered plugin");
        self.plugins.insert(name, Box::new(Arc::new(plugin)));
        Ok(())
    }

    /// Parses `raw` with the named plugin and returns the bound filter.
    pub fn configure(
        &self,
        name: &str,
        raw: &[u8],
    ) -> Result<Box<dyn ConfiguredFilter>, RegistryError> {
        let factory = self
            .plugins
            .get(name)
            .ok_or_else(|| RegistryError::UnknownPlugin(name.to_string()))?;
        factory.configure(raw).map_err(|source| RegistryError::Config {
            plugin: name.to_string(),
            source,
        })
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.plugins.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}
