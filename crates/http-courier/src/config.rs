//! Courier configuration

use std::collections::HashMap;

use reqwest::Method;

use crate::request::{Auth, Placement, RedirectPolicy};

/// Base URL used when the caller never sets one
pub const DEFAULT_BASE_URL: &str = "http://httpbin.org/";

/// The header set applied when the caller never sets headers
pub fn default_headers() -> HashMap<String, String> {
    [
        ("Cache-Control", "no-cache"),
        ("Connection", "keep-alive"),
        ("Accept-Language", "en;q=1"),
        ("Accept-Encoding", "gzip, deflate"),
        ("Proxy-Connection", "keep-alive"),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}

/// Configuration for a [`Courier`](crate::Courier)
///
/// Built once and handed to the client at construction; the client never
/// mutates it, so one configuration can back any number of overlapping
/// calls.
#[derive(Debug, Clone)]
pub struct CourierConfig {
    /// Prefix for all endpoints
    pub base_url: String,
    /// Verb used by [`Courier::dispatch`](crate::Courier::dispatch)
    pub method: Method,
    /// Request headers; `None` selects the default header set
    pub headers: Option<HashMap<String, String>>,
    /// Where caller-supplied fields are placed on the wire
    pub placement: Placement,
    /// Redirect-following policy
    pub redirects: RedirectPolicy,
    /// Basic-auth credentials passed through to the transport
    pub auth: Option<Auth>,
    /// Proxy URL passed through to the transport
    pub proxy: Option<String>,
}

impl Default for CourierConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            method: Method::GET,
            headers: None,
            placement: Placement::default(),
            redirects: RedirectPolicy::default(),
            auth: None,
            proxy: None,
        }
    }
}

impl CourierConfig {
    /// A default configuration rooted at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Resolve the headers and placement in effect for one call
    ///
    /// When no headers were configured the default set applies, and a POST
    /// additionally gets a url-encoded form content type with body placement
    /// forced. A caller-supplied header set is used exactly as given.
    pub(crate) fn effective(&self, method: &Method) -> (HashMap<String, String>, Placement) {
        match &self.headers {
            Some(headers) => (headers.clone(), self.placement),
            None => {
                let mut headers = default_headers();
                let mut placement = self.placement;
                if *method == Method::POST {
                    headers.insert(
                        "Content-Type".to_string(),
                        "application/x-www-form-urlencoded".to_string(),
                    );
                    placement = placement.with_body();
                }
                (headers, placement)
            }
        }
    }
}
