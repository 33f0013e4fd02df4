//! Rate-limited, retrying access to Entrez on top of an [`EntrezClient`].

use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::Database;
use crate::entrez::EntrezClient;
use crate::error::MiningError;
use crate::records::SearchResult;

/// Suspends the run. Swapped out in tests to observe back-offs.
pub trait Pause {
    fn pause(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadPause;

impl Pause for ThreadPause {
    fn pause(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub server_error_delay: Duration,
    pub rate_limit_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            server_error_delay: Duration::from_secs(10),
            rate_limit_delay: Duration::from_secs(30),
        }
    }
}

/// With an API key E-utilities allow ten requests per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub every: u64,
    pub pause: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            every: 10,
            pause: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Server,
    RateLimit,
    Fatal,
}

impl FailureClass {
    pub fn of(err: &MiningError) -> Self {
        match err {
            MiningError::EntrezStatus { status, .. } if (500..=599).contains(status) => {
                FailureClass::Server
            }
            MiningError::EntrezStatus { status, .. } if (400..=499).contains(status) => {
                FailureClass::RateLimit
            }
            MiningError::EntrezTransient(_) => FailureClass::Server,
            _ => FailureClass::Fatal,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimiter {
    limit: RateLimit,
    calls: u64,
}

impl RateLimiter {
    pub fn new(limit: RateLimit) -> Self {
        Self { limit, calls: 0 }
    }

    /// Counts one call and pauses after every `every`-th. Returns whether it paused.
    pub fn tick<P: Pause>(&mut self, pause: &P) -> bool {
        self.calls += 1;
        debug!(processed = self.calls, "documents requested");
        if self.calls % self.limit.every.max(1) == 0 {
            pause.pause(self.limit.pause);
            return true;
        }
        false
    }

    pub fn calls(&self) -> u64 {
        self.calls
    }

    pub fn reset(&mut self) {
        self.calls = 0;
    }
}

pub struct Retriever<C, P = ThreadPause> {
    client: C,
    pause: P,
    retry: RetryPolicy,
    limiter: RateLimiter,
}

impl<C: EntrezClient, P: Pause> Retriever<C, P> {
    pub fn new(client: C, pause: P, retry: RetryPolicy, rate_limit: RateLimit) -> Self {
        Self {
            client,
            pause,
            retry,
            limiter: RateLimiter::new(rate_limit),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn pauser(&self) -> &P {
        &self.pause
    }

    /// Fetch and summary calls issued since the last reset.
    pub fn processed(&self) -> u64 {
        self.limiter.calls()
    }

    pub fn reset(&mut self) {
        self.limiter.reset();
    }

    /// Ids matching `query`, at most `max_results`. Not rate limited and not
    /// retried: one search returns up to 100 000 ids.
    pub fn search(
        &self,
        db: Database,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<String>, MiningError> {
        let body = self.client.esearch(db, query, max_results)?;
        let mut result = SearchResult::from_xml(&body)?;
        for message in &result.errors {
            warn!(%db, query, message = message.as_str(), "search reported an error");
        }
        result.ids.truncate(max_results);
        debug!(%db, hits = result.ids.len(), total = ?result.count, "search complete");
        Ok(result.ids)
    }

    /// Full record, or `None` once the retry policy gives up.
    pub fn fetch_full(&mut self, db: Database, id: &str) -> Option<String> {
        self.limiter.tick(&self.pause);

        let mut long_pause_taken = false;
        let mut attempt = 0u32;
        while attempt < self.retry.max_attempts {
            attempt += 1;
            let err = match self.client.efetch(db, id) {
                Ok(body) => return Some(body),
                Err(err) => err,
            };
            let has_budget = attempt < self.retry.max_attempts;
            match FailureClass::of(&err) {
                FailureClass::Server => {
                    warn!(
                        %db,
                        id,
                        attempt,
                        max = self.retry.max_attempts,
                        error = %err,
                        "server error on fetch"
                    );
                    if has_budget {
                        self.pause.pause(self.retry.server_error_delay);
                    }
                }
                FailureClass::RateLimit => {
                    warn!(%db, id, attempt, error = %err, "fetch refused, too many requests");
                    if long_pause_taken || !has_budget {
                        break;
                    }
                    long_pause_taken = true;
                    self.pause.pause(self.retry.rate_limit_delay);
                }
                FailureClass::Fatal => {
                    warn!(%db, id, error = %err, "fetch failed");
                    return None;
                }
            }
        }
        warn!(%db, id, attempts = attempt, "giving up on record");
        None
    }

    /// Summary document. Not retried; errors propagate.
    pub fn fetch_summary(&mut self, db: Database, id: &str) -> Result<String, MiningError> {
        self.limiter.tick(&self.pause);
        self.client.esummary(db, id)
    }
}
