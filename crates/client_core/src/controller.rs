//! Drives [`RequestStore`] through one topic submission.
//!
//! The controller is the error boundary for the request lifecycle: transport
//! and decode failures end as a `failed` status and never reach the caller.

use std::{str::FromStr, sync::Arc};

use shared::protocol::TopicResult;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    error::{SubmitError, TransportError},
    store::{Generation, RequestStatus, RequestStore},
    transport::{decode_topic_result, TopicTransport},
};

/// What to do with a resolution that arrives after a newer submission began.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Only the latest submission may resolve the store.
    #[default]
    DiscardStale,
    /// Whichever submission resolves last wins, even if it is older.
    LastWriterWins,
}

impl FromStr for StalePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "discard_stale" | "discard-stale" => Ok(Self::DiscardStale),
            "last_writer_wins" | "last-writer-wins" => Ok(Self::LastWriterWins),
            other => Err(format!("unknown stale policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The store moved to this terminal status.
    Applied(RequestStatus),
    /// A newer submission owns the store; this resolution was dropped.
    Discarded,
}

#[derive(Clone)]
pub struct TopicController {
    store: Arc<RequestStore>,
    transport: Arc<dyn TopicTransport>,
    stale_policy: StalePolicy,
}

impl TopicController {
    pub fn new(store: Arc<RequestStore>, transport: Arc<dyn TopicTransport>) -> Self {
        Self {
            store,
            transport,
            stale_policy: StalePolicy::default(),
        }
    }

    pub fn with_stale_policy(mut self, stale_policy: StalePolicy) -> Self {
        self.stale_policy = stale_policy;
        self
    }

    pub fn store(&self) -> &Arc<RequestStore> {
        &self.store
    }

    pub fn stale_policy(&self) -> StalePolicy {
        self.stale_policy
    }

    /// Submits `topic`, which should be the draft text at call time.
    ///
    /// The draft is cleared and the status set to `loading` before this
    /// returns; the fetch itself runs on the Tokio runtime. Dropping the
    /// returned handle does not cancel the request.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn submit(&self, topic: impl Into<String>) -> JoinHandle<SubmitOutcome> {
        let topic = topic.into();
        let generation = self.begin(&topic);
        let controller = self.clone();
        tokio::spawn(async move { controller.finish(generation, &topic).await })
    }

    /// Same lifecycle as [`submit`](Self::submit), awaited in place.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub async fn resolve(&self, topic: impl Into<String>) -> SubmitOutcome {
        let topic = topic.into();
        let generation = self.begin(&topic);
        self.finish(generation, &topic).await
    }

    fn begin(&self, topic: &str) -> Generation {
        self.store.clear_draft();
        let generation = self.store.begin_request();
        info!(
            generation = generation.0,
            topic_len = topic.len(),
            "topic submitted"
        );
        generation
    }

    async fn finish(&self, generation: Generation, topic: &str) -> SubmitOutcome {
        match self.fetch(topic).await {
            Ok(result) => self.apply_success(generation, result),
            Err(error) => {
                warn!(
                    generation = generation.0,
                    kind = error.kind(),
                    %error,
                    "topic request failed"
                );
                self.apply_failure(generation)
            }
        }
    }

    /// The transport runs in its own task so a panicking implementation
    /// still ends the request as `failed`.
    async fn fetch(&self, topic: &str) -> Result<TopicResult, SubmitError> {
        let transport = Arc::clone(&self.transport);
        let topic = topic.to_string();
        let body = tokio::spawn(async move { transport.explain_topic(&topic).await })
            .await
            .map_err(TransportError::Aborted)??;
        Ok(decode_topic_result(&body)?)
    }

    fn apply_success(&self, generation: Generation, result: TopicResult) -> SubmitOutcome {
        debug!(
            generation = generation.0,
            test_cases = result.test_cases.len(),
            "topic request succeeded"
        );
        match self.stale_policy {
            StalePolicy::LastWriterWins => {
                self.store.complete_request(result);
                SubmitOutcome::Applied(RequestStatus::Succeeded)
            }
            StalePolicy::DiscardStale => {
                if self.store.complete_request_for(generation, result) {
                    SubmitOutcome::Applied(RequestStatus::Succeeded)
                } else {
                    SubmitOutcome::Discarded
                }
            }
        }
    }

    fn apply_failure(&self, generation: Generation) -> SubmitOutcome {
        match self.stale_policy {
            StalePolicy::LastWriterWins => {
                self.store.fail_request();
                SubmitOutcome::Applied(RequestStatus::Failed)
            }
            StalePolicy::DiscardStale => {
                if self.store.fail_request_for(generation) {
                    SubmitOutcome::Applied(RequestStatus::Failed)
                } else {
                    SubmitOutcome::Discarded
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
