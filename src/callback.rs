use crate::config::HeaderCheckConfig;
use crate::exchange::{Request, ResponseWriter};

/// Handles the return leg of the login flow, i.e. requests whose path equals
/// the configured callback path.
///
/// An implementation is expected to pull the authorization code or token out
/// of the request (query string or headers), finish the exchange, and write
/// either a redirect back to the original target or a response that
/// establishes the session. Writing nothing lets the request through.
pub trait CallbackHandler: Send + Sync {
    fn handle_callback(
        &self,
        config: &HeaderCheckConfig,
        request: &dyn Request,
        response: &mut dyn ResponseWriter,
    );
}

/// Default handler. The exchange is not implemented yet, so the response is
/// left untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct PendingCallback;

impl CallbackHandler for PendingCallback {
    fn handle_callback(
        &self,
        _config: &HeaderCheckConfig,
        request: &dyn Request,
        _response: &mut dyn ResponseWriter,
    ) {
        tracing::debug!(path = request.path(), "callback received, no exchange configured");
    }
}
