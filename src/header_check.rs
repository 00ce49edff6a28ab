use std::sync::Arc;

use http::StatusCode;
use url::form_urlencoded;

use crate::callback::{CallbackHandler, PendingCallback};
use crate::config::HeaderCheckConfig;
use crate::error::ConfigParseError;
use crate::exchange::{redirect, Request, ResponseWriter};
use crate::plugin::{FilterOutcome, Plugin};
use crate::token::is_valid_token;

pub const PLUGIN_NAME: &str = "simple_header_check";

/// Header carrying the caller's token.
pub const TOKEN_HEADER: &str = "X-TOKEN";

/// Marker added to replies this filter lets through.
pub const RUNNER_HEADER: &str = "X-Resp-A6-Runner";
pub const RUNNER_HEADER_VALUE: &str = "Rust";

pub const PASS_BODY: &[u8] = b"pass";

/// Sends callers without an acceptable `X-TOKEN` header to a login page and
/// marks everything else as passed.
///
/// Per request:
/// 1. an invalid configuration writes nothing;
/// 2. the callback path goes to the [`CallbackHandler`], whatever the token;
/// 3. a missing or rejected token gets a 302 to
///    `redirect_url?redirect_url=<gateway_base_url + path>`;
/// 4. otherwise the runner header and a `pass` body are written.
#[derive(Clone)]
pub struct SimpleHeaderCheck {
    callback: Arc<dyn CallbackHandler>,
}

impl SimpleHeaderCheck {
    pub fn new() -> Self {
        Self::with_callback(PendingCallback)
    }

    pub fn with_callback(callback: impl CallbackHandler + 'static) -> Self {
        SimpleHeaderCheck {
            callback: Arc::new(callback),
        }
    }
}

impl Default for SimpleHeaderCheck {
    fn default() -> Self {
        Self::new()
    }
}

/// Login URL carrying the address to come back to once the caller is
/// authenticated.
///
/// The return address is form-encoded: space becomes `+`, `~` is escaped as
/// `%7E` and `*` is left as is.
pub fn redirect_location(config: &HeaderCheckConfig, path: &str) -> String {
    let return_to = format!("{}{}", config.gateway_base_url, path);
    let encoded: String = form_urlencoded::byte_serialize(return_to.as_bytes()).collect();
    format!("{}?redirect_url={}", config.redirect_url, encoded)
}

impl Plugin for SimpleHeaderCheck {
    type Config = HeaderCheckConfig;

    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn parse_config(&self, raw: &[u8]) -> Result<HeaderCheckConfig, ConfigParseError> {
        let config = HeaderCheckConfig::parse(raw)?;
        if !config.is_valid() {
            tracing::warn!(
                plugin = PLUGIN_NAME,
                ?config,
                "configuration is incomplete, requests will not be checked"
            );
        }
        Ok(config)
    }

    fn filter(
        &self,
        config: &HeaderCheckConfig,
        request: &dyn Request,
        response: &mut dyn ResponseWriter,
    ) -> FilterOutcome {
        if !config.is_valid() {
            tracing::warn!(
                plugin = PLUGIN_NAME,
                path = request.path(),
                "skipping request, redirect_url, gateway_base_url and call_back_path are required"
            );
            return FilterOutcome::InvalidConfig;
        }

        let path = request.path();
        if path == config.callback_path {
            tracing::debug!(plugin = PLUGIN_NAME, path, "handling auth callback");
            self.callback.handle_callback(config, request, response);
            return FilterOutcome::Callback;
        }

        let token = request.header(TOKEN_HEADER).unwrap_or_default();
        if !is_valid_token(token) {
            let location = redirect_location(config, path);
            tracing::debug!(plugin = PLUGIN_NAME, path, %location, "token rejected, redirecting");
            redirect(response, &location, StatusCode::FOUND);
            return FilterOutcome::Redirect { location };
        }

        response.add_header(RUNNER_HEADER, RUNNER_HEADER_VALUE);
        if let Err(err) = response.write(PASS_BODY) {
            tracing::error!(plugin = PLUGIN_NAME, path, error = %err, "failed to write");
        }
        FilterOutcome::Pass
    }
}
