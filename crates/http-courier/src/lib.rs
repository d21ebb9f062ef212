//! Outbound HTTP request wrapper
//!
//! This crate wraps a single delegated reqwest call: it assembles request
//! options (headers, body vs. query placement, cookie jar, redirect policy,
//! proxy, auth) from a [`CourierConfig`], issues the request, normalizes the
//! exchange into a [`ResponseRecord`], and publishes one
//! `networking.response.created` event per completed call.
//!
//! [`Courier::send`] never fails: transport errors are recovered into a
//! best-effort record, so callers always branch on
//! [`ResponseRecord::status_code`] rather than on an error path.
//!
//! # Example
//!
//! ```no_run
//! use http_courier::{Courier, CourierConfig, FieldMap, Method};
//!
//! async fn example() {
//!     let courier = Courier::with_config(CourierConfig::new("http://httpbin.org/"));
//!     let record = courier.send(&FieldMap::new(), "get", Method::GET).await;
//!     println!("{:?} -> {}", record.status_code, record.response_type);
//! }
//! ```

mod client;
mod config;
mod cookies;
mod error;
mod event;
mod request;
mod response;

pub use client::Courier;
pub use config::{default_headers, CourierConfig, DEFAULT_BASE_URL};
pub use error::Error;
pub use event::{EventSink, ResponseEvent, RESPONSE_CREATED};
pub use request::{Auth, FieldMap, Placement, RedirectPolicy};
/// HTTP method, re-exported from reqwest
pub use reqwest::Method;
pub use response::{ResponseRecord, ResponseType, NO_RESPONSE_MESSAGE};
