//! HTTP courier client

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use reqwest::cookie::Jar;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use serde_json::Value;
use url::Url;

use crate::config::CourierConfig;
use crate::cookies;
use crate::error::Error;
use crate::event::{EventSink, ResponseEvent};
use crate::request::{FieldMap, Placement};
use crate::response::{self, ResponseRecord, ResponseType};

/// Outbound HTTP client wrapper
///
/// Assembles one request from its configuration, delegates the exchange to
/// reqwest, normalizes the result into a [`ResponseRecord`] and publishes a
/// [`ResponseEvent`]. All per-call state (cookie jar, timings) is local to
/// the call, so a single `Courier` is safe for concurrent overlapping
/// requests.
#[derive(Debug, Clone)]
pub struct Courier {
    config: CourierConfig,
    events: EventSink,
}

impl Default for Courier {
    fn default() -> Self {
        Self::new(CourierConfig::default(), EventSink::default())
    }
}

impl Courier {
    /// Create a courier from a configuration and an event sink
    pub fn new(config: CourierConfig, events: EventSink) -> Self {
        Self { config, events }
    }

    /// Create a courier with a default (unsubscribed) event sink
    pub fn with_config(config: CourierConfig) -> Self {
        Self::new(config, EventSink::default())
    }

    /// The configuration this courier was built with
    pub fn config(&self) -> &CourierConfig {
        &self.config
    }

    /// The sink this courier publishes response events to
    pub fn events(&self) -> &EventSink {
        &self.events
    }

    /// Issue one request and normalize whatever comes back
    ///
    /// This never fails: transport errors are recovered into a best-effort
    /// record (status from the error when it carries one, sentinel body,
    /// empty headers and cookies). Non-2xx statuses are not errors either;
    /// inspect [`ResponseRecord::status_code`]. Exactly one event is
    /// published per call.
    pub async fn send(&self, fields: &FieldMap, endpoint: &str, method: Method) -> ResponseRecord {
        let started = Instant::now();
        let url = format!("{}{}", self.config.base_url, endpoint);
        let (request_headers, placement) = self.config.effective(&method);
        let jar = cookies::fresh_jar();

        let outcome = self
            .execute(
                &url,
                method.clone(),
                fields,
                &request_headers,
                placement,
                Arc::clone(&jar),
            )
            .await;

        let (status_code, response_headers, final_url, raw_body) = match outcome {
            Ok(resp) => {
                let status = resp.status().as_u16();
                let headers = flatten_headers(resp.headers());
                tracing::debug!("received {status} from {url}");
                (
                    Some(status),
                    headers,
                    Some(resp.url().clone()),
                    resp.text().await.ok(),
                )
            }
            Err(err) => {
                tracing::warn!("request to {url} failed: {err}");
                (err.status(), HashMap::new(), None, None)
            }
        };

        let (body, response_type) = match raw_body.as_deref() {
            Some(raw) => response::normalize_body(raw),
            None => (response::no_response_body(), ResponseType::HtmlXml),
        };

        let elapsed = started.elapsed();
        // Cookies are read back for the URL the exchange ended on, so a
        // redirect target that sets cookies on its own path is captured.
        let cookies = final_url
            .or_else(|| Url::parse(&url).ok())
            .map(|u| cookies::flatten(&jar, &u))
            .unwrap_or_default();

        let record = ResponseRecord {
            status_code,
            body,
            response_type,
            headers: response_headers,
            cookies,
            elapsed,
        };

        self.events.publish(ResponseEvent {
            status_code: record.status_code,
            response_body: record.body.clone(),
            request_body: Value::Object(fields.clone()),
            url,
            response_headers: record.headers.clone(),
            request_headers,
            cookies: record.cookies.clone(),
            elapsed,
            response_type: record.response_type,
            method: method.to_string(),
        });

        record
    }

    /// [`send`](Self::send) using the configured default method
    pub async fn dispatch(&self, fields: &FieldMap, endpoint: &str) -> ResponseRecord {
        self.send(fields, endpoint, self.config.method.clone()).await
    }

    /// POST `fields` as one JSON payload and return the raw response
    ///
    /// Escape hatch for streaming/bulk payloads: no placement logic, no
    /// normalization, no event. Unlike [`send`](Self::send), transport
    /// failures propagate here.
    pub async fn create_stream_request(
        &self,
        fields: &FieldMap,
        endpoint: &str,
    ) -> Result<reqwest::Response, Error> {
        let url = Url::parse(&format!("{}{}", self.config.base_url, endpoint))?;
        let payload = serde_json::to_string(fields)?;

        let client = self.build_client(cookies::fresh_jar())?;
        Ok(client.post(url).body(payload).send().await?)
    }

    async fn execute(
        &self,
        url: &str,
        method: Method,
        fields: &FieldMap,
        headers: &HashMap<String, String>,
        placement: Placement,
        jar: Arc<Jar>,
    ) -> Result<reqwest::Response, Error> {
        let url = Url::parse(url)?;
        let client = self.build_client(jar)?;

        tracing::debug!(
            "sending {method} {url} with {} header(s), placement {placement:?}",
            headers.len()
        );

        let mut request = client.request(method, url);
        for (name, value) in headers {
            request = request.header(name, value);
        }
        if !fields.is_empty() {
            // Bracket-key flattening keeps nested values encodable.
            let pairs = crate::request::flatten_fields(fields);
            if placement.in_body() {
                request = request.form(&pairs);
            }
            if placement.in_query() {
                request = request.query(&pairs);
            }
        }
        if let Some(auth) = &self.config.auth {
            request = request.basic_auth(&auth.username, auth.password.as_deref());
        }

        Ok(request.send().await?)
    }

    /// Build the per-call client carrying jar, redirect policy and proxy
    fn build_client(&self, jar: Arc<Jar>) -> Result<Client, Error> {
        let redirects = &self.config.redirects;
        let mut builder = Client::builder()
            .cookie_provider(jar)
            .redirect(redirects.to_reqwest())
            .referer(redirects.enabled && redirects.referer);

        if let Some(proxy) = &self.config.proxy {
            let proxy = reqwest::Proxy::all(proxy).map_err(|e| Error::Proxy(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        builder.build().map_err(|e| Error::Build(e.to_string()))
    }
}

fn flatten_headers(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderName, HeaderValue};

    use super::*;

    #[test]
    fn test_flatten_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("content-type"),
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("abc"),
        );

        let flat = flatten_headers(&headers);
        assert_eq!(flat.len(), 2);
        assert_eq!(
            flat.get("content-type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn test_flatten_headers_skips_opaque_values() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-binary"),
            HeaderValue::from_bytes(&[0xff, 0xfe]).expect("opaque header value"),
        );

        assert!(flatten_headers(&headers).is_empty());
    }

    #[test]
    fn test_courier_default_config() {
        let courier = Courier::default();
        assert_eq!(courier.config().base_url, "http://httpbin.org/");
        assert_eq!(courier.config().method, Method::GET);
    }

    #[test]
    fn test_build_client_with_invalid_proxy() {
        let courier = Courier::with_config(CourierConfig {
            proxy: Some("not a proxy url".to_string()),
            ..CourierConfig::default()
        });
        let result = courier.build_client(cookies::fresh_jar());
        assert!(matches!(result, Err(Error::Proxy(_))));
    }
}
