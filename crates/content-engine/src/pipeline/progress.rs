use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::stages::Stage;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Running,
    Complete,
    Error,
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageStatus::Pending => write!(f, "pending"),
            StageStatus::Running => write!(f, "running"),
            StageStatus::Complete => write!(f, "complete"),
            StageStatus::Error => write!(f, "error"),
        }
    }
}

/// Progress event for one stage of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub stage: Stage,
    pub status: StageStatus,
    /// Human-readable message describing current activity.
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ProgressEvent {
    pub fn new(stage: Stage, status: StageStatus, message: impl Into<String>) -> Self {
        Self {
            stage,
            status,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn pending(stage: Stage) -> Self {
        Self::new(stage, StageStatus::Pending, "Waiting...")
    }

    pub fn running(stage: Stage, message: impl Into<String>) -> Self {
        Self::new(stage, StageStatus::Running, message)
    }

    pub fn complete(stage: Stage, message: impl Into<String>) -> Self {
        Self::new(stage, StageStatus::Complete, message)
    }

    pub fn error(stage: Stage, message: impl Into<String>) -> Self {
        Self::new(stage, StageStatus::Error, message)
    }
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Writes each event to the tracing subscriber.
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&self, event: ProgressEvent) {
        match event.status {
            StageStatus::Pending => {}
            StageStatus::Error => {
                warn!(stage = %event.stage, "[{}] {}", event.status, event.message)
            }
            _ => info!(stage = %event.stage, "[{}] {}", event.status, event.message),
        }
    }
}

/// Fans progress events out to any number of subscribers.
#[derive(Clone)]
pub struct BroadcastProgress {
    sender: Arc<broadcast::Sender<ProgressEvent>>,
}

impl BroadcastProgress {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn with_sender(sender: Arc<broadcast::Sender<ProgressEvent>>) -> Self {
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.sender.subscribe()
    }
}

impl ProgressReporter for BroadcastProgress {
    fn report(&self, event: ProgressEvent) {
        // No active receivers is fine
        let _ = self.sender.send(event);
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `(stage, status)` pairs, handy for ordering assertions.
    pub fn transitions(&self) -> Vec<(Stage, StageStatus)> {
        self.events().iter().map(|e| (e.stage, e.status)).collect()
    }
}

impl ProgressReporter for RecordingProgress {
    fn report(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_camel_case() {
        let event = ProgressEvent::running(Stage::Writer, "Writing article with Claude...");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["stage"], "writer");
        assert_eq!(json["status"], "running");
        assert_eq!(json["message"], "Writing article with Claude...");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_recording_keeps_order() {
        let recorder = RecordingProgress::new();
        recorder.report(ProgressEvent::running(Stage::Research, "a"));
        recorder.report(ProgressEvent::complete(Stage::Research, "b"));
        assert_eq!(
            recorder.transitions(),
            vec![
                (Stage::Research, StageStatus::Running),
                (Stage::Research, StageStatus::Complete)
            ]
        );
    }

    #[tokio::test]
    async fn test_broadcast_delivers_to_subscribers() {
        let progress = BroadcastProgress::new(16);
        let mut rx = progress.subscribe();
        progress.report(ProgressEvent::error(Stage::Scorer, "boom"));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.stage, Stage::Scorer);
        assert_eq!(event.status, StageStatus::Error);
    }

    #[test]
    fn test_broadcast_without_receivers_does_not_panic() {
        let progress = BroadcastProgress::new(4);
        progress.report(ProgressEvent::pending(Stage::Ideas));
    }
}
