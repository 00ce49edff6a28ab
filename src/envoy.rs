use std::sync::Arc;

use envoy_proxy_dynamic_modules_rust_sdk::*;
use ::http::StatusCode;

use crate::exchange::{RequestParts, ResponseRecorder};
use crate::plugin::ConfiguredFilter;

/// Filter chain configuration: one parsed plugin configuration shared by
/// every stream created from it.
pub struct FilterConfig {
    filter: Arc<dyn ConfiguredFilter>,
}

impl FilterConfig {
    pub fn new(filter: Box<dyn ConfiguredFilter>) -> Self {
        FilterConfig {
            filter: Arc::from(filter),
        }
    }
}

impl<EC: EnvoyHttpFilterConfig, EHF: EnvoyHttpFilter> HttpFilterConfig<EC, EHF> for FilterConfig {
    fn new_http_filter(&mut self, _envoy: &mut EC) -> Box<dyn HttpFilter<EHF>> {
        Box::new(Filter {
            filter: Arc::clone(&self.filter),
        })
    }
}

/// Snapshots the request headers into a [`RequestParts`]. The path comes from
/// `:path` without its query string; other pseudo-headers are dropped.
pub(crate) fn request_from_headers<'a, I>(headers: I) -> RequestParts
where
    I: IntoIterator<Item = (&'a [u8], &'a [u8])>,
{
    let mut raw_path = None;
    let mut extra = Vec::new();
    for (name, value) in headers {
        if name == b":path" {
            raw_path = Some(String::from_utf8_lossy(value));
        } else if !name.starts_with(b":") {
            extra.push((name, value));
        }
    }

    let mut request = RequestParts::from_raw_path(raw_path.as_deref().unwrap_or("/"));
    for (name, value) in extra {
        if !request.insert_header(name, value) {
            tracing::debug!(header = %String::from_utf8_lossy(name), "dropping malformed header");
        }
    }
    request
}

/// Local reply built from what a plugin wrote.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct LocalReply<'a> {
    pub status: u32,
    pub headers: Vec<(&'a str, &'a [u8])>,
    pub body: Option<&'a [u8]>,
}

/// `None` when the plugin wrote nothing and the request should go upstream.
pub(crate) fn local_reply(response: &ResponseRecorder) -> Option<LocalReply<'_>> {
    if response.is_untouched() {
        return None;
    }
    let status = response.status().unwrap_or(StatusCode::OK);
    Some(LocalReply {
        status: u32::from(status.as_u16()),
        headers: response
            .headers()
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_bytes()))
            .collect(),
        body: Some(response.body()).filter(|body| !body.is_empty()),
    })
}

/// Runs the plugin once per stream, when the request headers arrive.
///
/// Anything the plugin wrote is sent back as a local reply and the request
/// stops there. An untouched response lets the request continue upstream.
pub struct Filter {
    filter: Arc<dyn ConfiguredFilter>,
}

impl<EHF: EnvoyHttpFilter> HttpFilter<EHF> for Filter {
    fn on_request_headers(
        &mut self,
        envoy_filter: &mut EHF,
        _end_of_stream: bool,
    ) -> abi::envoy_dynamic_module_type_on_http_filter_request_headers_status {
        let headers = envoy_filter.get_request_headers();
        let request = request_from_headers(
            headers
                .iter()
                .map(|(name, value)| (name.as_slice(), value.as_slice())),
        );

        let mut response = ResponseRecorder::new();
        let outcome = self.filter.filter(&request, &mut response);
        tracing::trace!(plugin = self.filter.plugin_name(), ?outcome, "filter finished");

        match local_reply(&response) {
            None => abi::envoy_dynamic_module_type_on_http_filter_request_headers_status::Continue,
            Some(reply) => {
                envoy_filter.send_response(reply.status, reply.headers, reply.body);
                abi::envoy_dynamic_module_type_on_http_filter_request_headers_status::StopIteration
            }
        }
    }
}
