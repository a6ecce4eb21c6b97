//! Job status and progress broadcasting for real-time status streaming.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Lifecycle state of a collection job.
///
/// Moves forward through `Queued → CollectingLinks → Extracting → Done`;
/// `Failed` is reachable from every non-terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    Queued,
    CollectingLinks,
    Extracting,
    Done,
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::CollectingLinks => write!(f, "collecting-links"),
            JobStatus::Extracting => write!(f, "extracting"),
            JobStatus::Done => write!(f, "done"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }

    /// Returns true if `self → next` is a legal transition.
    pub fn can_advance_to(self, next: JobStatus) -> bool {
        match (self, next) {
            (JobStatus::Queued, JobStatus::CollectingLinks)
            | (JobStatus::CollectingLinks, JobStatus::Extracting)
            | (JobStatus::Extracting, JobStatus::Done) => true,
            (from, JobStatus::Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

/// What changed on a job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobProgressKind {
    Status,
    Log,
}

/// Progress event for a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobProgressEvent {
    /// Unique job identifier.
    pub job_id: String,
    pub kind: JobProgressKind,
    /// Job status at the time of the event.
    pub status: JobStatus,
    /// Status name or the appended log line.
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl JobProgressEvent {
    pub fn status(job_id: &str, status: JobStatus) -> Self {
        Self {
            job_id: job_id.to_string(),
            kind: JobProgressKind::Status,
            status,
            message: status.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn log(job_id: &str, status: JobStatus, line: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            kind: JobProgressKind::Log,
            status,
            message: line.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Broadcasts job progress events for streaming.
#[derive(Clone)]
pub struct JobProgressBroadcaster {
    sender: Arc<broadcast::Sender<JobProgressEvent>>,
}

impl JobProgressBroadcaster {
    /// Creates a new job progress broadcaster with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Sends a progress event to all subscribers.
    pub fn send(&self, event: JobProgressEvent) {
        // No active receivers is fine
        let _ = self.sender.send(event);
    }

    /// Creates a new subscriber for progress events.
    pub fn subscribe(&self) -> broadcast::Receiver<JobProgressEvent> {
        self.sender.subscribe()
    }
}

impl Default for JobProgressBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(JobStatus::Queued.can_advance_to(JobStatus::CollectingLinks));
        assert!(JobStatus::CollectingLinks.can_advance_to(JobStatus::Extracting));
        assert!(JobStatus::Extracting.can_advance_to(JobStatus::Done));
    }

    #[test]
    fn test_no_regress_or_skip() {
        assert!(!JobStatus::Extracting.can_advance_to(JobStatus::CollectingLinks));
        assert!(!JobStatus::Done.can_advance_to(JobStatus::Queued));
        assert!(!JobStatus::Queued.can_advance_to(JobStatus::Extracting));
        assert!(!JobStatus::Queued.can_advance_to(JobStatus::Done));
        assert!(!JobStatus::CollectingLinks.can_advance_to(JobStatus::CollectingLinks));
    }

    #[test]
    fn test_failed_from_non_terminal_only() {
        assert!(JobStatus::Queued.can_advance_to(JobStatus::Failed));
        assert!(JobStatus::CollectingLinks.can_advance_to(JobStatus::Failed));
        assert!(JobStatus::Extracting.can_advance_to(JobStatus::Failed));
        assert!(!JobStatus::Done.can_advance_to(JobStatus::Failed));
        assert!(!JobStatus::Failed.can_advance_to(JobStatus::Failed));
    }

    #[test]
    fn test_status_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&JobStatus::CollectingLinks).unwrap(),
            "\"collecting-links\""
        );
        assert_eq!(JobStatus::CollectingLinks.to_string(), "collecting-links");
    }

    #[test]
    fn test_broadcaster_send_receive() {
        let broadcaster = JobProgressBroadcaster::new(10);
        let mut rx = broadcaster.subscribe();

        broadcaster.send(JobProgressEvent::status("job-1", JobStatus::Extracting));
        broadcaster.send(JobProgressEvent::log("job-1", JobStatus::Extracting, "hello"));

        let received = rx.try_recv().unwrap();
        assert_eq!(received.job_id, "job-1");
        assert_eq!(received.kind, JobProgressKind::Status);
        assert_eq!(received.status, JobStatus::Extracting);

        let received = rx.try_recv().unwrap();
        assert_eq!(received.kind, JobProgressKind::Log);
        assert_eq!(received.message, "hello");
    }

    #[test]
    fn test_send_without_subscribers() {
        let broadcaster = JobProgressBroadcaster::default();
        broadcaster.send(JobProgressEvent::status("job-1", JobStatus::Queued));
    }
}
