//! Concurrent fetch of a fixed set of named documents
//!
//! Every request runs on its own task; the fetcher waits for all of them
//! before returning. Each finished document is checked for an error
//! indicator and stored in the slot for its name. Whether a failed slot
//! aborts the report is left to the caller.

use crate::document::check_error;
use crate::error::{Error, Result};
use crate::source::{Endpoint, SharedSource};
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// A zero-argument fetch operation.
pub type FetchOp = BoxFuture<'static, Result<Value>>;

/// Results of one fan-out, one slot per requested name.
#[derive(Debug, Default)]
pub struct FetchResults {
    slots: HashMap<String, Result<Value>>,
}

impl FetchResults {
    /// Move the document for `name` out of its slot.
    pub fn take(&mut self, name: &str) -> Result<Value> {
        self.slots
            .remove(name)
            .unwrap_or_else(|| Err(Error::MissingDocument(name.to_string())))
    }

    pub fn is_ok(&self, name: &str) -> bool {
        matches!(self.slots.get(name), Some(Ok(_)))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Names whose fetch failed, sorted.
    pub fn failed(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .slots
            .iter()
            .filter(|(_, result)| result.is_err())
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

#[derive(Clone)]
pub struct ResourceFetcher {
    source: SharedSource,
    timeout: Option<Duration>,
}

impl ResourceFetcher {
    pub fn new(source: SharedSource, timeout: Option<Duration>) -> Self {
        Self { source, timeout }
    }

    /// Fetch each `(name, endpoint)` pair concurrently.
    pub async fn fetch<I, N>(&self, requests: I) -> FetchResults
    where
        I: IntoIterator<Item = (N, Endpoint)>,
        N: Into<String>,
    {
        let ops = requests
            .into_iter()
            .map(|(name, endpoint)| {
                let source = self.source.clone();
                let op: FetchOp = async move {
                    let document = source.fetch(&endpoint).await?;
                    check_error(endpoint.kind(), &document)?;
                    Ok::<_, Error>(document)
                }
                .boxed();
                (name.into(), op)
            })
            .collect::<Vec<_>>();

        self.run(ops).await
    }

    /// Run arbitrary named operations concurrently and collect their results.
    pub async fn run(&self, ops: Vec<(String, FetchOp)>) -> FetchResults {
        debug!("Fetching {} documents concurrently", ops.len());

        let mut names = Vec::with_capacity(ops.len());
        let mut handles = Vec::with_capacity(ops.len());
        for (name, op) in ops {
            let timeout = self.timeout;
            names.push(name);
            handles.push(tokio::spawn(async move {
                match timeout {
                    Some(limit) => tokio::time::timeout(limit, op)
                        .await
                        .unwrap_or(Err(Error::Timeout(limit))),
                    None => op.await,
                }
            }));
        }

        let mut slots = HashMap::with_capacity(names.len());
        for (name, joined) in names.into_iter().zip(join_all(handles).await) {
            let result = joined.unwrap_or_else(|e| Err(Error::Join(e)));
            match &result {
                Ok(_) => debug!("Fetched '{}'", name),
                Err(e) => warn!("Fetch '{}' failed: {}", name, e),
            }
            if slots.insert(name.clone(), result).is_some() {
                warn!("Duplicate fetch name '{}', keeping the last result", name);
            }
        }

        FetchResults { slots }
    }
}
