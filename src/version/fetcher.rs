//! HTTP fetcher with bounded retry shared by every resolver

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::version::error::{FetchFailure, ResolveError};

const USER_AGENT: &str = concat!("tagwatch/", env!("CARGO_PKG_VERSION"));

/// How many times a failed request is retried and how long to wait before each retry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: usize,
    delays: Vec<Duration>,
}

impl RetryPolicy {
    /// Creates a policy allowing `max_retries` retries after the first attempt.
    ///
    /// `delays[n]` is the wait before retry `n`. There must be one delay per
    /// retry and the delays must be strictly increasing.
    pub fn new(max_retries: usize, delays: Vec<Duration>) -> Result<Self, ResolveError> {
        if delays.len() < max_retries {
            return Err(ResolveError::Config(format!(
                "{} retries need {} backoff delays, got {}",
                max_retries,
                max_retries,
                delays.len()
            )));
        }
        if delays.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ResolveError::Config(format!(
                "backoff delays must be strictly increasing: {:?}",
                delays
            )));
        }
        Ok(Self {
            max_retries,
            delays,
        })
    }

    /// A policy that gives up after the first failure
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            delays: Vec::new(),
        }
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    /// Wait before retry number `retry` (0-based), or `None` when the budget is spent
    pub fn delay_before_retry(&self, retry: usize) -> Option<Duration> {
        if retry < self.max_retries {
            self.delays.get(retry).copied()
        } else {
            None
        }
    }
}

/// Performs GET requests, retrying failures according to a [`RetryPolicy`]
pub struct Fetcher {
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(policy: RetryPolicy, request_timeout: Duration) -> Result<Self, ResolveError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(request_timeout)
            .build()
            .map_err(|e| ResolveError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client, policy })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches `url` and returns the response body.
    ///
    /// Only `200 OK` counts as success. The URL is logged once before the
    /// first attempt; retries only log the wait.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, ResolveError> {
        info!("Fetching {}", url);

        let mut retry = 0;
        loop {
            let failure = match self.attempt(url).await {
                Ok(body) => return Ok(body),
                Err(failure) => failure,
            };

            let Some(delay) = self.policy.delay_before_retry(retry) else {
                return Err(ResolveError::Network {
                    url: url.to_string(),
                    source: failure,
                });
            };

            warn!(
                "Request failed ({}), retrying in {}s ({}/{})",
                failure,
                delay.as_secs_f64(),
                retry + 1,
                self.policy.max_retries
            );
            sleep(delay).await;
            retry += 1;
        }
    }

    /// Fetches `url` and deserializes the JSON body
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ResolveError> {
        let body = self.fetch(url).await?;
        serde_json::from_slice(&body).map_err(|e| ResolveError::parse(url, e))
    }

    /// Fetches `url` and decodes the body as UTF-8
    pub async fn fetch_text(&self, url: &str) -> Result<String, ResolveError> {
        let body = self.fetch(url).await?;
        String::from_utf8(body).map_err(|e| ResolveError::parse(url, e))
    }

    async fn attempt(&self, url: &str) -> Result<Vec<u8>, FetchFailure> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchFailure::Status(status));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
