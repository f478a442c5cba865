use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;

use crate::http_client::http_client;

/// Transport-level failure: connection, timeout, non-success status, unreadable body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FetchError(pub String);

/// Issues one GET for a JSON resource and hands back the raw body.
pub trait JsonFetcher: Send + Sync {
    fn fetch_body(&self, url: &str) -> Result<String, FetchError>;
}

pub struct HttpFetcher {
    client: &'static Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
        })
    }
}

impl JsonFetcher for HttpFetcher {
    fn fetch_body(&self, url: &str) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|err| FetchError(format!("request failed: {err}")))?;
        let status = resp.status();
        let body = resp
            .text()
            .map_err(|err| FetchError(format!("failed reading body: {err}")))?;
        if !status.is_success() {
            return Err(FetchError(format!("http {status} for {url}")));
        }
        Ok(body)
    }
}

#[derive(Debug, Clone)]
struct StaticRoute {
    response: Result<String, FetchError>,
    delay: Duration,
}

/// In-memory fetcher keyed by exact URL. Unknown URLs fail as transport errors.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    routes: HashMap<String, StaticRoute>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.routes.insert(
            url.into(),
            StaticRoute {
                response: Ok(body.into()),
                delay: Duration::ZERO,
            },
        );
        self
    }

    pub fn with_failure(mut self, url: impl Into<String>, cause: impl Into<String>) -> Self {
        self.routes.insert(
            url.into(),
            StaticRoute {
                response: Err(FetchError(cause.into())),
                delay: Duration::ZERO,
            },
        );
        self
    }

    /// Holds the response for `url` back by `delay` before returning it.
    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        if let Some(route) = self.routes.get_mut(url) {
            route.delay = delay;
        }
        self
    }
}

impl JsonFetcher for StaticFetcher {
    fn fetch_body(&self, url: &str) -> Result<String, FetchError> {
        let Some(route) = self.routes.get(url) else {
            return Err(FetchError(format!("http 404 Not Found for {url}")));
        };
        if !route.delay.is_zero() {
            thread::sleep(route.delay);
        }
        route.response.clone()
    }
}
