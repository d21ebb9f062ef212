//! Per-call cookie handling
//!
//! Every exchange gets a jar of its own, so cookies set by one response can
//! never leak into the next request. Cross-call persistence, if wanted, is
//! the caller's business.

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use url::Url;

/// A fresh jar for one exchange
pub(crate) fn fresh_jar() -> Arc<Jar> {
    Arc::new(Jar::default())
}

/// Flatten the cookies the jar captured for `url` into a plain map
pub(crate) fn flatten(jar: &Jar, url: &Url) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    if let Some(header) = jar.cookies(url) {
        if let Ok(header) = header.to_str() {
            for pair in header.split("; ") {
                if let Some((name, value)) = pair.split_once('=') {
                    cookies.insert(name.to_string(), value.to_string());
                }
            }
        }
    }
    tracing::debug!("extracted {} cookie(s) for {url}", cookies.len());
    cookies
}
