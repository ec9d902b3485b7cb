use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{DataSource, Endpoint};
use crate::error::{Error, Result};

/// In-memory data source with canned documents.
///
/// Responses can be delayed per endpoint to force a particular completion
/// order, and the mock tracks how many calls were in flight at once.
#[derive(Clone, Default)]
pub struct MockDataSource {
    responses: Arc<Mutex<HashMap<Endpoint, MockResponse>>>,
    call_history: Arc<Mutex<Vec<Endpoint>>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

#[derive(Clone)]
struct MockResponse {
    outcome: std::result::Result<Value, String>,
    delay: Duration,
}

impl MockDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `endpoint` with `document`.
    pub fn respond(&self, endpoint: Endpoint, document: Value) -> &Self {
        self.respond_after(endpoint, document, Duration::ZERO)
    }

    /// Answer `endpoint` with `document` after sleeping for `delay`.
    pub fn respond_after(&self, endpoint: Endpoint, document: Value, delay: Duration) -> &Self {
        self.responses.lock().unwrap().insert(
            endpoint,
            MockResponse {
                outcome: Ok(document),
                delay,
            },
        );
        self
    }

    /// Fail `endpoint` at the transport level.
    pub fn fail(&self, endpoint: Endpoint, message: &str) -> &Self {
        self.responses.lock().unwrap().insert(
            endpoint,
            MockResponse {
                outcome: Err(message.to_string()),
                delay: Duration::ZERO,
            },
        );
        self
    }

    pub fn get_call_history(&self) -> Vec<Endpoint> {
        self.call_history.lock().unwrap().clone()
    }

    pub fn verify_called(&self, endpoint: &Endpoint, times: usize) -> bool {
        let history = self.call_history.lock().unwrap();
        history.iter().filter(|e| *e == endpoint).count() == times
    }

    /// Highest number of fetches observed running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Value> {
        self.call_history.lock().unwrap().push(endpoint.clone());

        let response = self.responses.lock().unwrap().get(endpoint).cloned();
        let Some(response) = response else {
            return Err(Error::HttpStatus(format!("no mock response for {}", endpoint)));
        };

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);

        if !response.delay.is_zero() {
            tokio::time::sleep(response.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response.outcome.map_err(Error::HttpStatus)
    }
}
