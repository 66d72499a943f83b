//! Live tracking lookup against the TechTrack carrier event API.
//!
//! The entry point is [`TrackingClient`], which owns its result cache and
//! rate-limiter state so callers can instantiate one per process (or per
//! test) instead of relying on ambient globals. Every lookup produces
//! exactly one [`TrackingResult`]; errors from the remote service or the
//! transport are folded into failure results rather than propagated, so a
//! bad tracking number never aborts a batch.
//!
//! # Example
//!
//! ```no_run
//! use techship::tracking::{ApiConfig, ReqwestClient, TrackingClient};
//!
//! let config = ApiConfig::default();
//! let http = ReqwestClient::new(config.timeout).unwrap();
//! let client = TrackingClient::new(http, config);
//!
//! let result = client.lookup("398384333811");
//! println!("{}", result.original_input());
//! ```

mod client;
mod http;
mod types;

pub use client::{ApiConfig, TrackingClient};
pub use http::{HttpClient, HttpError, HttpResponse, ReqwestClient};
pub use types::{
    normalize_tracking_number, TrackingEvent, TrackingResult, RETENTION_AVAILABLE,
    RETENTION_PURGED,
};

#[cfg(test)]
pub use http::tests::ScriptedHttpClient;
