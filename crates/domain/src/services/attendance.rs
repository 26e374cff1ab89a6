//! Auto-attendance hook invoked when a student enters school grounds.
//!
//! Which class session an entry should count towards is decided by the
//! integrator; the core only reports the entry.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// An ENTER event on a `SCHOOL_GROUNDS` geofence.
#[derive(Debug, Clone, PartialEq)]
pub struct SchoolEntry {
    pub tenant_id: Uuid,
    pub actor_id: Uuid,
    pub geofence_id: Uuid,
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("Attendance hook failed: {0}")]
    Failed(String),
}

/// Downstream consumer of school-grounds entries.
#[async_trait::async_trait]
pub trait AttendanceHook: Send + Sync {
    async fn on_school_entry(&self, entry: &SchoolEntry) -> Result<(), AttendanceError>;
}

/// Hook that only logs entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingAttendanceHook;

#[async_trait::async_trait]
impl AttendanceHook for LoggingAttendanceHook {
    async fn on_school_entry(&self, entry: &SchoolEntry) -> Result<(), AttendanceError> {
        info!(
            tenant_id = %entry.tenant_id,
            actor_id = %entry.actor_id,
            geofence_id = %entry.geofence_id,
            event_id = %entry.event_id,
            occurred_at = %entry.occurred_at,
            "School grounds entry"
        );
        Ok(())
    }
}

/// Mock attendance hook for development and testing.
///
/// Records every entry it receives.
#[derive(Debug, Default)]
pub struct MockAttendanceHook {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
    calls: Mutex<Vec<SchoolEntry>>,
}

impl MockAttendanceHook {
    /// Create a new mock hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock hook that simulates failures.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Entries received so far, including failed ones.
    pub fn calls(&self) -> Vec<SchoolEntry> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl AttendanceHook for MockAttendanceHook {
    async fn on_school_entry(&self, entry: &SchoolEntry) -> Result<(), AttendanceError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(entry.clone());
        }

        if self.simulate_failure {
            tracing::warn!(event_id = %entry.event_id, "Mock attendance hook simulating failure");
            return Err(AttendanceError::Failed("simulated failure".to_string()));
        }

        tracing::info!(event_id = %entry.event_id, "Mock attendance hook accepted entry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> SchoolEntry {
        SchoolEntry {
            tenant_id: Uuid::new_v4(),
            actor_id: Uuid::new_v4(),
            geofence_id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_mock_hook_records_calls() {
        let hook = MockAttendanceHook::new();
        let entry = entry();
        hook.on_school_entry(&entry).await.unwrap();
        assert_eq!(hook.calls(), vec![entry]);
    }

    #[tokio::test]
    async fn test_failing_mock_hook() {
        let hook = MockAttendanceHook::failing();
        let result = hook.on_school_entry(&entry()).await;
        assert!(matches!(result, Err(AttendanceError::Failed(_))));
        assert_eq!(hook.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_logging_hook_accepts() {
        tokio_test::assert_ok!(LoggingAttendanceHook.on_school_entry(&entry()).await);
    }
}
