//! Shared blocking HTTP client with status-based retry and a circuit breaker.
//!
//! 429 and 5xx responses (and connect/timeout failures) are retried with
//! exponential backoff `base_delay * 2^(attempt-1)` up to `max_retries` extra
//! attempts. 403 trips the breaker immediately. Any other non-success status
//! fails without retry. The breaker sees one failure per call, not per attempt.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{ProviderError, ProviderErrorKind};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = concat!("argmacro/", env!("CARGO_PKG_VERSION"));

/// Retry schedule for one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    pub fn backoff(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Sleep before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt - 1))
    }
}

/// Options for building an [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub accept_invalid_certs: bool,
}

impl HttpOptions {
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            timeout,
            retry,
            accept_invalid_certs: false,
        }
    }
}

pub struct HttpFetcher {
    provider: String,
    client: reqwest::blocking::Client,
    breaker: Arc<CircuitBreaker>,
    retry: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(provider: &str, options: HttpOptions) -> Result<Self, ProviderError> {
        Self::with_breaker(provider, options, Arc::new(CircuitBreaker::default_provider()))
    }

    pub fn with_breaker(
        provider: &str,
        options: HttpOptions,
        breaker: Arc<CircuitBreaker>,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(options.timeout)
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .build()
            .map_err(|e| {
                ProviderError::new(
                    provider,
                    ProviderErrorKind::Other(format!("failed to build HTTP client: {e}")),
                )
            })?;

        Ok(Self {
            provider: provider.to_string(),
            client,
            breaker,
            retry: options.retry,
        })
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub fn is_available(&self) -> bool {
        self.breaker.is_allowed()
    }

    /// `CircuitOpen` with the real remaining cooldown while the breaker is open.
    pub fn unavailable_reason(&self) -> Option<ProviderError> {
        (!self.breaker.is_allowed()).then(|| self.circuit_open())
    }

    fn err(&self, kind: ProviderErrorKind) -> ProviderError {
        ProviderError::new(self.provider.as_str(), kind)
    }

    fn circuit_open(&self) -> ProviderError {
        self.err(ProviderErrorKind::CircuitOpen {
            remaining_secs: self.breaker.remaining_cooldown().as_secs(),
        })
    }

    /// GET `url` with `query` parameters and return the response body.
    ///
    /// Retries count as one call for the breaker: a single failure is
    /// recorded once every attempt is spent, and the error returned is the
    /// last real HTTP or network failure.
    pub fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, ProviderError> {
        if !self.breaker.is_allowed() {
            return Err(self.circuit_open());
        }

        let mut last_error = None;

        for attempt in 0..=self.retry.max_retries {
            if attempt > 0 {
                let delay = self.retry.delay_for(attempt);
                tracing::debug!(provider = %self.provider, url, attempt, ?delay, "retrying request");
                std::thread::sleep(delay);
            }

            match self.client.get(url).query(query).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == StatusCode::FORBIDDEN {
                        tracing::warn!(provider = %self.provider, url, "HTTP 403, tripping circuit breaker");
                        self.breaker.trip();
                        return Err(self.err(ProviderErrorKind::Http {
                            status: status.as_u16(),
                            url: url.to_string(),
                        }));
                    }

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        last_error = Some(self.err(ProviderErrorKind::RateLimited {
                            retry_after_secs: retry_after,
                        }));
                        continue;
                    }

                    if status.is_server_error() {
                        last_error = Some(self.err(ProviderErrorKind::Http {
                            status: status.as_u16(),
                            url: url.to_string(),
                        }));
                        continue;
                    }

                    if !status.is_success() {
                        return Err(self.err(ProviderErrorKind::Http {
                            status: status.as_u16(),
                            url: url.to_string(),
                        }));
                    }

                    let body = resp
                        .text()
                        .map_err(|e| self.err(ProviderErrorKind::Network(e.to_string())))?;
                    self.breaker.record_success();
                    return Ok(body);
                }
                Err(e) => {
                    let kind = if e.is_timeout() {
                        ProviderErrorKind::Timeout(e.to_string())
                    } else {
                        ProviderErrorKind::Network(e.to_string())
                    };
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(self.err(kind));
                        continue;
                    }
                    self.breaker.record_failure();
                    return Err(self.err(kind));
                }
            }
        }

        self.breaker.record_failure();
        Err(last_error
            .unwrap_or_else(|| self.err(ProviderErrorKind::Other("max retries exceeded".into()))))
    }

    /// GET and deserialize a JSON body.
    pub fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let body = self.get_text(url, query)?;
        serde_json::from_str(&body).map_err(|e| {
            self.err(ProviderErrorKind::Parse(format!(
                "invalid JSON from {url}: {e}"
            )))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Local server answering every request with `status`; returns its URL
    /// and a counter of requests served.
    fn always_status(status: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/series", listener.local_addr().unwrap());
        let served = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&served);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut chunk) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                counter.fetch_add(1, Ordering::SeqCst);
                let reply = format!(
                    "HTTP/1.1 {status}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                );
                let _ = stream.write_all(reply.as_bytes());
            }
        });
        (url, served)
    }

    #[test]
    fn backoff_doubles() {
        let p = RetryPolicy::backoff(3, Duration::from_secs(1));
        assert_eq!(p.delay_for(0), Duration::ZERO);
        assert_eq!(p.delay_for(1), Duration::from_secs(1));
        assert_eq!(p.delay_for(2), Duration::from_secs(2));
        assert_eq!(p.delay_for(3), Duration::from_secs(4));
    }

    #[test]
    fn open_breaker_fails_fast() {
        let breaker = Arc::new(CircuitBreaker::default_provider());
        breaker.trip();
        let fetcher = HttpFetcher::with_breaker(
            "TEST",
            HttpOptions::new(Duration::from_secs(1), RetryPolicy::none()),
            breaker,
        )
        .unwrap();
        assert!(!fetcher.is_available());
        let reason = fetcher.unavailable_reason().unwrap();
        assert!(matches!(reason.kind, ProviderErrorKind::CircuitOpen { remaining_secs } if remaining_secs > 1700));
        let err = fetcher.get_text("http://127.0.0.1:9/never", &[]).unwrap_err();
        assert!(matches!(err.kind, ProviderErrorKind::CircuitOpen { .. }));
        assert_eq!(err.provider, "TEST");
    }

    #[test]
    fn exhausted_retries_return_last_server_error() {
        let (url, served) = always_status("503 Service Unavailable");
        let fetcher = HttpFetcher::new(
            "BCRA",
            HttpOptions::new(
                Duration::from_secs(5),
                RetryPolicy::backoff(3, Duration::from_millis(1)),
            ),
        )
        .unwrap();

        let err = fetcher.get_text(&url, &[]).unwrap_err();
        assert_eq!(served.load(Ordering::SeqCst), 4);
        assert!(matches!(err.kind, ProviderErrorKind::Http { status: 503, .. }));
        // One exhausted call counts once against the breaker.
        assert!(fetcher.is_available());
    }

    #[test]
    fn repeated_exhausted_calls_open_breaker() {
        let (url, served) = always_status("500 Internal Server Error");
        let fetcher = HttpFetcher::with_breaker(
            "TEST",
            HttpOptions::new(Duration::from_secs(5), RetryPolicy::none()),
            Arc::new(CircuitBreaker::new(Duration::from_secs(60), 2)),
        )
        .unwrap();

        for _ in 0..2 {
            let err = fetcher.get_text(&url, &[]).unwrap_err();
            assert!(matches!(err.kind, ProviderErrorKind::Http { status: 500, .. }));
        }
        assert!(!fetcher.is_available());
        let err = fetcher.get_text(&url, &[]).unwrap_err();
        assert!(matches!(err.kind, ProviderErrorKind::CircuitOpen { remaining_secs } if remaining_secs > 0));
        assert_eq!(served.load(Ordering::SeqCst), 2);
    }
}
