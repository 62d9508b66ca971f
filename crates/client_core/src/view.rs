//! What a front end should show for a given store snapshot.

use std::sync::Arc;

use shared::protocol::TopicResult;

use crate::store::{RequestStatus, StoreSnapshot};

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// Only the topic input.
    Input,
    Loading,
    Failed,
    Explanation(Arc<TopicResult>),
}

impl View {
    pub fn from_snapshot(snapshot: &StoreSnapshot) -> Self {
        match (snapshot.status, &snapshot.result) {
            (RequestStatus::Loading, _) => Self::Loading,
            (RequestStatus::Failed, _) => Self::Failed,
            (RequestStatus::Succeeded, Some(result)) => Self::Explanation(Arc::clone(result)),
            (RequestStatus::Succeeded, None) | (RequestStatus::Idle, _) => Self::Input,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(status: RequestStatus, result: Option<TopicResult>) -> StoreSnapshot {
        StoreSnapshot {
            draft: String::new(),
            status,
            result: result.map(Arc::new),
        }
    }

    fn result() -> TopicResult {
        TopicResult {
            explanation: "prose".to_string(),
            test_cases: Vec::new(),
        }
    }

    #[test]
    fn each_status_maps_to_one_view() {
        assert_eq!(
            View::from_snapshot(&snapshot(RequestStatus::Idle, None)),
            View::Input
        );
        assert_eq!(
            View::from_snapshot(&snapshot(RequestStatus::Loading, Some(result()))),
            View::Loading
        );
        assert_eq!(
            View::from_snapshot(&snapshot(RequestStatus::Failed, Some(result()))),
            View::Failed
        );
        assert_eq!(
            View::from_snapshot(&snapshot(RequestStatus::Succeeded, Some(result()))),
            View::Explanation(Arc::new(result()))
        );
    }

    #[test]
    fn succeeded_without_result_shows_input() {
        assert_eq!(
            View::from_snapshot(&snapshot(RequestStatus::Succeeded, None)),
            View::Input
        );
    }
}
