//! Blocking RDAP query client
//!
//! Registries rate-limit aggressively, so every outbound call goes through a
//! minimum-interval throttle, a bounded retry loop with exponential backoff,
//! and a single `Retry-After`-driven follow-up when the registry still
//! answers 429 after the transport retries are spent.

use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use rand::Rng;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use ureq::http::Response;
use ureq::{Agent, Body};

use super::entity::resolve_registrant;
use super::IdentifyError;
use crate::config::SpyglassConfig;

/// ARIN RDAP endpoint for IP network records
pub const DEFAULT_BASE_URL: &str = "https://rdap.arin.net/registry/ip/";

/// Default minimum spacing between outbound requests
pub const DEFAULT_THROTTLE_INTERVAL: Duration = Duration::from_millis(200);

/// Default per-attempt timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const ACCEPT_HEADER: &str = "application/rdap+json";
const MAX_ATTEMPTS: u32 = 6;
const BACKOFF_BASE_SECS: f64 = 0.8;
const RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Longest `Retry-After` wait honored on a terminal 429; anything above this
/// returns "no result" instead of blocking the caller.
const RATE_LIMIT_WAIT_CAP_SECS: u64 = 60;
const RATE_LIMIT_JITTER_SECS: f64 = 0.5;

/// Minimal shape of an RDAP IP network response. Everything below `entities`
/// is inconsistent across registries and walked untyped.
#[derive(Debug, Default, Deserialize)]
struct RdapDocument {
    #[serde(default)]
    entities: Value,
}

/// Throttled, retrying RDAP client.
///
/// The last-call timestamp lives behind a mutex inside the instance, so a
/// client shared across threads keeps the spacing invariant; there is no
/// process-global state. Construct one per registry endpoint and reuse it.
pub struct RdapClient {
    agent: Agent,
    base_url: String,
    throttle_interval: Duration,
    timeout: Duration,
    max_attempts: u32,
    last_call: Mutex<Option<Instant>>,
}

impl RdapClient {
    /// Create a client for the default ARIN endpoint.
    pub fn new() -> Self {
        Self {
            agent: build_agent(DEFAULT_REQUEST_TIMEOUT),
            base_url: DEFAULT_BASE_URL.to_string(),
            throttle_interval: DEFAULT_THROTTLE_INTERVAL,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            max_attempts: MAX_ATTEMPTS,
            last_call: Mutex::new(None),
        }
    }

    /// Create a client from configuration.
    pub fn from_config(config: &SpyglassConfig) -> Self {
        Self::new()
            .with_base_url(&config.rdap_base_url)
            .with_throttle_interval(config.throttle_interval())
            .with_timeout(config.request_timeout())
    }

    /// Set the registry base URL (the IP is appended verbatim).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the minimum spacing between outbound requests.
    pub fn with_throttle_interval(mut self, interval: Duration) -> Self {
        self.throttle_interval = interval;
        self
    }

    /// Set the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.agent = build_agent(timeout);
        self
    }

    /// Set the transport-level attempt budget.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Best-effort registrant lookup.
    ///
    /// Every failure mode short of a panic degrades to `None`: transport
    /// errors, unresolved rate limiting, unexpected statuses, and malformed
    /// bodies. Callers that need to distinguish a hard HTTP failure should
    /// use [`RdapClient::fetch_registrant`].
    pub fn lookup_registrant(&self, ip: &str) -> Option<String> {
        match self.fetch_registrant(ip) {
            Ok(name) => name,
            Err(e) => {
                debug!("registrant lookup degraded to no result: {}", e);
                None
            }
        }
    }

    /// Registrant lookup that surfaces terminal HTTP failures.
    ///
    /// Transport errors and unresolved 429s still return `Ok(None)`; only a
    /// terminal non-2xx status (after retries) becomes an error, for callers
    /// that want to report the failure instead of degrading.
    pub fn fetch_registrant(&self, ip: &str) -> Result<Option<String>, IdentifyError> {
        let url = format!("{}{}", self.base_url, ip);

        let mut response = match self.get_with_retry(&url) {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    "RDAP request to {} failed after {} attempts: {}",
                    url, self.max_attempts, e
                );
                return Ok(None);
            }
        };

        if response.status().as_u16() == 429 {
            response = match self.rate_limited_follow_up(&url, &response) {
                Some(response) => response,
                None => return Ok(None),
            };
        }

        let status = response.status();
        if !status.is_success() {
            return Err(IdentifyError::Http {
                status: status.as_u16(),
                url,
            });
        }

        let document: RdapDocument = match response.body_mut().read_json() {
            Ok(document) => document,
            Err(e) => {
                debug!("unparseable RDAP body from {}: {}", url, e);
                return Ok(None);
            }
        };
        Ok(resolve_registrant(&document.entities))
    }

    /// One throttled GET, no retries.
    fn send(&self, url: &str) -> Result<Response<Body>, ureq::Error> {
        self.throttle();
        self.agent.get(url).header("Accept", ACCEPT_HEADER).call()
    }

    /// GET with the transport retry policy: retry on any transport error and
    /// on the retryable status set, with exponential backoff overridden by a
    /// server-supplied `Retry-After`.
    fn get_with_retry(&self, url: &str) -> Result<Response<Body>, ureq::Error> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let result = self.send(url);

            let retryable = match &result {
                Ok(response) => RETRY_STATUSES.contains(&response.status().as_u16()),
                Err(_) => true,
            };
            if !retryable || attempt >= self.max_attempts {
                return result;
            }

            let delay = match &result {
                Ok(response) => {
                    let delay = retry_after(response).unwrap_or_else(|| backoff_delay(attempt));
                    debug!(
                        "HTTP {} from {}, retrying in {:?} (attempt {}/{})",
                        response.status(),
                        url,
                        delay,
                        attempt,
                        self.max_attempts
                    );
                    delay
                }
                Err(e) => {
                    let delay = backoff_delay(attempt);
                    debug!(
                        "transport error from {}: {}, retrying in {:?} (attempt {}/{})",
                        url, e, delay, attempt, self.max_attempts
                    );
                    delay
                }
            };
            thread::sleep(delay);
        }
    }

    /// The registry is still rate limiting after transport retries. Honor a
    /// short `Retry-After` once with some jitter, otherwise give up; the
    /// caller decides whether to retry at a higher level.
    fn rate_limited_follow_up(
        &self,
        url: &str,
        response: &Response<Body>,
    ) -> Option<Response<Body>> {
        let wait = match retry_after(response) {
            Some(wait) if wait.as_secs() <= RATE_LIMIT_WAIT_CAP_SECS => wait,
            _ => {
                warn!("rate limited by {} with no usable Retry-After, giving up", url);
                return None;
            }
        };

        let jitter = Duration::from_secs_f64(rand::rng().random_range(0.0..RATE_LIMIT_JITTER_SECS));
        debug!(
            "rate limited by {}, waiting {:?} before one more attempt",
            url,
            wait + jitter
        );
        thread::sleep(wait + jitter);

        match self.send(url) {
            Ok(response) if response.status().is_success() => Some(response),
            Ok(response) => {
                warn!(
                    "rate-limit follow-up to {} still returned HTTP {}",
                    url,
                    response.status()
                );
                None
            }
            Err(e) => {
                warn!("rate-limit follow-up to {} failed: {}", url, e);
                None
            }
        }
    }

    /// Reserve the next outbound slot and sleep until it. Each caller gets a
    /// send time at least `throttle_interval` after the previous one.
    fn throttle(&self) {
        let wake = {
            let mut last = self
                .last_call
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let now = Instant::now();
            let next = match *last {
                Some(previous) => (previous + self.throttle_interval).max(now),
                None => now,
            };
            *last = Some(next);
            next
        };

        let now = Instant::now();
        if wake > now {
            thread::sleep(wake - now);
        }
    }
}

impl Default for RdapClient {
    fn default() -> Self {
        Self::new()
    }
}

fn build_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        // non-2xx answers carry retry/rate-limit information; handle them as
        // responses instead of errors
        .http_status_as_error(false)
        .build()
        .new_agent()
}

/// Delay before the next attempt, given the number of attempts already made.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs_f64(BACKOFF_BASE_SECS * 2f64.powi(attempt as i32 - 1))
}

/// `Retry-After` in delta-seconds form; HTTP-date values are ignored.
fn retry_after(response: &Response<Body>) -> Option<Duration> {
    response
        .headers()
        .get("retry-after")?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

// =============================================================================
// Tests
// =============================================================================
