//! The tracking lookup client: normalization, caching, courtesy rate
//! limiting, and error mapping around the TechTrack event API.

use std::thread;
use std::time::{Duration, Instant};

use moka::sync::Cache;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::http::{status_reason, HttpClient, HttpError, HttpResponse};
use super::types::{
    normalize_tracking_number, EventsResponse, TrackingEvent, TrackingResult, RETENTION_AVAILABLE,
    RETENTION_PURGED,
};

/// Maximum length of the message surfaced for unexpected transport errors.
const UNEXPECTED_ERROR_LIMIT: usize = 80;

/// Connection settings for the TechTrack event API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Endpoint queried with `?TrackingNumbers=<number>`.
    pub base_url: String,
    /// Value of the `x-user-key` header.
    pub user_key: String,
    /// Value of the `x-api-key` header.
    pub api_key: String,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Minimum interval between any two network requests from one client.
    pub min_interval: Duration,
    /// Wait before the single retry after a 429 response.
    pub retry_wait: Duration,
    /// Maximum number of cached lookup results.
    pub cache_capacity: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://18wheels.techtrack.cloud/api/v2/event/get-by-tracking-numbers"
                .to_string(),
            user_key: "5A9AB7A7E6BC16DB1C6025B4BFBCF4E2".to_string(),
            api_key: "a888c3c1-6884-4e3d-aeb7-438c1b519b12".to_string(),
            user_agent: "TechShipDashboard/1.0".to_string(),
            timeout: Duration::from_secs(15),
            min_interval: Duration::from_millis(50),
            retry_wait: Duration::from_secs(1),
            cache_capacity: 1000,
        }
    }
}

/// Client for live tracking lookups.
///
/// Owns a bounded result cache and the last-call timestamp used for the
/// courtesy rate limit, so each instance is independent and safe to create
/// per test. The cache is keyed by normalized tracking number; entries
/// never expire within the process lifetime.
pub struct TrackingClient<C: HttpClient> {
    http: C,
    config: ApiConfig,
    cache: Cache<String, TrackingResult>,
    last_call: Mutex<Option<Instant>>,
}

impl<C: HttpClient> TrackingClient<C> {
    /// Creates a new client with the given HTTP transport and settings.
    pub fn new(http: C, config: ApiConfig) -> Self {
        let cache = Cache::builder().max_capacity(config.cache_capacity).build();
        Self {
            http,
            config,
            cache,
            last_call: Mutex::new(None),
        }
    }

    /// Look up the latest carrier event for one tracking number.
    ///
    /// Always returns exactly one result. Remote and transport failures are
    /// folded into [`TrackingResult::Failure`] values; this method never
    /// returns an error and never panics, so a bad number in a batch cannot
    /// stop the numbers after it.
    pub fn lookup(&self, raw: &str) -> TrackingResult {
        let clean = normalize_tracking_number(raw);
        if clean.is_empty() {
            debug!(input = raw, "rejected tracking number with no alphanumeric content");
            return TrackingResult::Failure {
                tracking_number: String::new(),
                original_input: raw.to_string(),
                error: "Invalid tracking number format".to_string(),
                retention_note: None,
            };
        }

        if let Some(hit) = self.cache.get(&clean) {
            debug!(tracking = %clean, "cache hit");
            return hit.for_input(raw);
        }

        let result = self.fetch(&clean, raw);
        self.cache.insert(clean, result.clone());
        result
    }

    /// Issue the network request (with the single 429 retry) and map the
    /// outcome to a result. Everything that reaches this point is cached by
    /// the caller.
    fn fetch(&self, clean: &str, raw: &str) -> TrackingResult {
        let url = format!("{}?TrackingNumbers={}", self.config.base_url, clean);
        info!(tracking = %clean, "querying TechTrack");

        let mut response = match self.send(&url) {
            Ok(response) => response,
            Err(e) => return self.transport_failure(clean, raw, e),
        };

        if response.status == 429 {
            warn!(tracking = %clean, "rate limited by TechTrack, retrying once");
            thread::sleep(self.config.retry_wait);
            response = match self.send(&url) {
                Ok(response) => response,
                Err(e) => return self.transport_failure(clean, raw, e),
            };
        }

        self.interpret(clean, raw, response)
    }

    /// Send one GET, enforcing the minimum interval since this client's
    /// previous request.
    fn send(&self, url: &str) -> Result<HttpResponse, HttpError> {
        {
            let mut last = self.last_call.lock();
            if let Some(previous) = *last {
                let elapsed = previous.elapsed();
                if elapsed < self.config.min_interval {
                    thread::sleep(self.config.min_interval - elapsed);
                }
            }
            *last = Some(Instant::now());
        }

        let headers = [
            ("x-user-key", self.config.user_key.as_str()),
            ("x-api-key", self.config.api_key.as_str()),
            ("User-Agent", self.config.user_agent.as_str()),
        ];
        self.http.get(url, &headers)
    }

    fn interpret(&self, clean: &str, raw: &str, response: HttpResponse) -> TrackingResult {
        if response.status == 200 {
            // A body that is not JSON at all is an unexpected error; valid
            // JSON of an unrecognized shape decodes to "no events".
            let value: serde_json::Value = match serde_json::from_str(&response.body) {
                Ok(value) => value,
                Err(e) => {
                    return self.transport_failure(clean, raw, HttpError::Other(e.to_string()))
                }
            };
            let decoded: EventsResponse = serde_json::from_value(value).unwrap_or_default();

            return match decoded.events.into_iter().next() {
                Some(wire) => TrackingResult::Success {
                    tracking_number: clean.to_string(),
                    original_input: raw.to_string(),
                    event: TrackingEvent::from(wire),
                    retention_note: RETENTION_AVAILABLE.to_string(),
                },
                None => TrackingResult::Failure {
                    tracking_number: clean.to_string(),
                    original_input: raw.to_string(),
                    error: "No tracking events found".to_string(),
                    retention_note: Some(RETENTION_PURGED.to_string()),
                },
            };
        }

        let error = match response.status {
            401 => "Authentication failed - invalid API credentials".to_string(),
            403 => "Access denied - check API permissions".to_string(),
            404 => format!("Tracking number '{}' not found in carrier system", clean),
            429 => "Rate limit exceeded - please wait 1 second".to_string(),
            500 => "TechTrack server error - try again later".to_string(),
            status => format!("HTTP {}: {}", status, status_reason(status)),
        };

        warn!(tracking = %clean, status = response.status, "lookup failed");
        TrackingResult::Failure {
            tracking_number: clean.to_string(),
            original_input: raw.to_string(),
            error,
            retention_note: None,
        }
    }

    fn transport_failure(&self, clean: &str, raw: &str, e: HttpError) -> TrackingResult {
        let error = match e {
            HttpError::Timeout => "Request timeout - carrier server slow".to_string(),
            HttpError::Connection(_) => "Connection failed - check internet".to_string(),
            HttpError::Other(msg) => format!("Unexpected error: {}", truncate(&msg)),
        };

        warn!(tracking = %clean, %error, "transport failure");
        TrackingResult::Failure {
            tracking_number: clean.to_string(),
            original_input: raw.to_string(),
            error,
            retention_note: None,
        }
    }
}

fn truncate(message: &str) -> String {
    message.chars().take(UNEXPECTED_ERROR_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::ScriptedHttpClient;

    const DELIVERED_BODY: &str = r#"{
        "events": [{
            "name": "Delivered",
            "dateTime": {"local": "2026-02-01 10:00", "utc": "2026-02-01 18:00"},
            "location": {"city": "Vancouver", "state": "BC"}
        }]
    }"#;

    fn test_config() -> ApiConfig {
        ApiConfig {
            base_url: "https://tracker.test/events".to_string(),
            min_interval: Duration::from_millis(20),
            retry_wait: Duration::from_millis(30),
            ..ApiConfig::default()
        }
    }

    fn client(script: Vec<Result<HttpResponse, HttpError>>) -> TrackingClient<ScriptedHttpClient> {
        TrackingClient::new(ScriptedHttpClient::new(script), test_config())
    }

    fn ok(status: u16, body: &str) -> Result<HttpResponse, HttpError> {
        Ok(HttpResponse {
            status,
            body: body.to_string(),
        })
    }

    #[test]
    fn test_invalid_format_short_circuits_without_network() {
        let client = client(vec![]);

        for raw in ["", "   ", "!!!", "- -- -"] {
            let result = client.lookup(raw);
            assert!(!result.is_success());
            assert_eq!(result.original_input(), raw);
            assert_eq!(result.tracking_number(), "");
            match result {
                TrackingResult::Failure { error, .. } => {
                    assert_eq!(error, "Invalid tracking number format")
                }
                _ => unreachable!(),
            }
        }
        assert_eq!(client.http.call_count(), 0);
    }

    #[test]
    fn test_success_parses_first_event() {
        let client = client(vec![ok(200, DELIVERED_BODY)]);

        let result = client.lookup("398384333811");
        match result {
            TrackingResult::Success {
                tracking_number,
                original_input,
                event,
                retention_note,
            } => {
                assert_eq!(tracking_number, "398384333811");
                assert_eq!(original_input, "398384333811");
                assert_eq!(event.name, "Delivered");
                assert_eq!(event.time_local, "2026-02-01 10:00");
                assert_eq!(event.time_utc, "2026-02-01 18:00");
                assert_eq!(event.location_city, "Vancouver");
                assert_eq!(event.location_state, "BC");
                assert_eq!(retention_note, RETENTION_AVAILABLE);
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_normalization_applied_to_request_url() {
        let client = client(vec![ok(200, DELIVERED_BODY)]);

        client.lookup(" 1z-90rr 772 ");
        assert_eq!(
            client.http.call_urls(),
            vec!["https://tracker.test/events?TrackingNumbers=1Z90RR772"]
        );
    }

    #[test]
    fn test_empty_events_is_failure_with_retention_note() {
        let client = client(vec![ok(200, r#"{"events": []}"#)]);

        match client.lookup("398384333811") {
            TrackingResult::Failure {
                error,
                retention_note,
                ..
            } => {
                assert!(error.contains("No tracking events found"));
                assert_eq!(retention_note.as_deref(), Some(RETENTION_PURGED));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_unrecognized_json_shape_treated_as_no_events() {
        let client = client(vec![ok(200, "[1, 2, 3]")]);

        match client.lookup("398384333811") {
            TrackingResult::Failure { error, .. } => {
                assert!(error.contains("No tracking events found"))
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_non_json_body_is_unexpected_error() {
        let client = client(vec![ok(200, "<html>gateway error</html>")]);

        match client.lookup("398384333811") {
            TrackingResult::Failure {
                error,
                retention_note,
                ..
            } => {
                assert!(error.starts_with("Unexpected error:"), "got {:?}", error);
                assert_eq!(retention_note, None);
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_404_interpolates_normalized_number() {
        let client = client(vec![ok(404, "")]);

        match client.lookup("abc-123") {
            TrackingResult::Failure { error, .. } => {
                assert!(error.contains("not found"));
                assert!(error.contains("ABC123"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_known_status_codes_map_to_specific_messages() {
        let cases = [
            (401, "Authentication failed"),
            (403, "Access denied"),
            (429, "Rate limit exceeded"),
            (500, "TechTrack server error"),
        ];

        for (status, expected) in cases {
            // 429 scripts a second 429 so the retry is exhausted.
            let script = if status == 429 {
                vec![ok(429, ""), ok(429, "")]
            } else {
                vec![ok(status, "")]
            };
            let client = client(script);

            match client.lookup("398384333811") {
                TrackingResult::Failure { error, .. } => {
                    assert!(
                        error.contains(expected),
                        "status {}: {:?} should contain {:?}",
                        status,
                        error,
                        expected
                    );
                }
                other => panic!("expected failure, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_unknown_status_uses_generic_message() {
        let client = client(vec![ok(503, "")]);

        match client.lookup("398384333811") {
            TrackingResult::Failure { error, .. } => {
                assert_eq!(error, "HTTP 503: Service Unavailable")
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_429_retries_exactly_once_then_succeeds() {
        let client = client(vec![ok(429, ""), ok(200, DELIVERED_BODY)]);

        let result = client.lookup("398384333811");
        assert!(result.is_success());
        assert_eq!(client.http.call_count(), 2);
    }

    #[test]
    fn test_no_retry_on_other_statuses() {
        let client = client(vec![ok(500, ""), ok(200, DELIVERED_BODY)]);

        let result = client.lookup("398384333811");
        assert!(!result.is_success());
        assert_eq!(client.http.call_count(), 1);
    }

    #[test]
    fn test_no_retry_on_transport_failure() {
        let client = client(vec![Err(HttpError::Timeout), ok(200, DELIVERED_BODY)]);

        match client.lookup("398384333811") {
            TrackingResult::Failure { error, .. } => assert!(error.contains("timeout")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(client.http.call_count(), 1);
    }

    #[test]
    fn test_connection_failure_message() {
        let client = client(vec![Err(HttpError::Connection("refused".to_string()))]);

        match client.lookup("398384333811") {
            TrackingResult::Failure { error, .. } => {
                assert_eq!(error, "Connection failed - check internet")
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_unexpected_error_truncated_to_80_chars() {
        let long = "x".repeat(200);
        let client = client(vec![Err(HttpError::Other(long))]);

        match client.lookup("398384333811") {
            TrackingResult::Failure { error, .. } => {
                assert_eq!(error, format!("Unexpected error: {}", "x".repeat(80)));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_cache_hit_issues_single_network_call() {
        let client = client(vec![ok(200, DELIVERED_BODY)]);

        let first = client.lookup("398-384-333-811");
        let second = client.lookup("398384333811");

        assert!(first.is_success());
        assert!(second.is_success());
        assert_eq!(client.http.call_count(), 1);
        // Each caller gets its own raw string back.
        assert_eq!(first.original_input(), "398-384-333-811");
        assert_eq!(second.original_input(), "398384333811");
    }

    #[test]
    fn test_failures_needing_network_are_cached_too() {
        let client = client(vec![ok(404, "")]);

        client.lookup("398384333811");
        client.lookup("398384333811");
        assert_eq!(client.http.call_count(), 1);
    }

    #[test]
    fn test_invalid_format_results_are_not_cached() {
        let client = client(vec![]);

        client.lookup("!!!");
        client.lookup("!!!");
        assert_eq!(client.cache.entry_count(), 0);
    }

    #[test]
    fn test_min_interval_between_network_calls() {
        let client = client(vec![ok(200, DELIVERED_BODY), ok(200, DELIVERED_BODY)]);

        client.lookup("AAA111");
        client.lookup("BBB222");

        let instants = client.http.call_instants();
        assert_eq!(instants.len(), 2);
        let gap = instants[1].duration_since(instants[0]);
        assert!(
            gap >= Duration::from_millis(20),
            "calls only {:?} apart",
            gap
        );
    }

    #[test]
    fn test_batch_continues_after_failures() {
        let client = client(vec![
            Err(HttpError::Timeout),
            ok(200, DELIVERED_BODY),
            ok(404, ""),
        ]);

        let results: Vec<TrackingResult> = ["AAA", "BBB", "CCC"]
            .iter()
            .map(|raw| client.lookup(raw))
            .collect();

        assert_eq!(results.len(), 3);
        assert!(!results[0].is_success());
        assert!(results[1].is_success());
        assert!(!results[2].is_success());
        assert_eq!(
            results.iter().map(|r| r.original_input()).collect::<Vec<_>>(),
            vec!["AAA", "BBB", "CCC"]
        );
    }
}
