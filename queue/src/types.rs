//! The §4.8 job queue's data model: a game's place in the priority queue,
//! its externally-visible status, and the phased progress percentages a
//! caller polls while analysis runs.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Coarse lifecycle state of one game's analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

/// Which part of the two-phase analyzer last reported progress (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    Waiting,
    Initial,
    Intermediate,
    Complete,
}

impl JobPhase {
    /// The progress percentage this phase reports once stored (§4.8:
    /// initial -> 25%, intermediate -> 60%, complete -> 100%).
    pub fn progress_percent(self) -> u8 {
        match self {
            JobPhase::Waiting => 0,
            JobPhase::Initial => 25,
            JobPhase::Intermediate => 60,
            JobPhase::Complete => 100,
        }
    }
}

/// One entry in the priority queue (§4.8). Ordering is by `priority`
/// descending, ties broken by `enqueued_at` ascending (earlier first).
#[derive(Debug, Clone)]
pub struct AnalysisJob {
    pub game_id: String,
    pub requester: String,
    pub priority: i64,
    pub enqueued_at: SystemTime,
}

/// The status record a caller polls (§4.8, §6 persistence surface).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusRecord {
    pub status: JobStatus,
    pub phase: JobPhase,
    pub progress: u8,
    pub queued_at: SystemTime,
    pub started_at: Option<SystemTime>,
    pub ended_at: Option<SystemTime>,
    pub error: Option<String>,
}

impl JobStatusRecord {
    pub fn queued(now: SystemTime) -> Self {
        Self {
            status: JobStatus::Queued,
            phase: JobPhase::Waiting,
            progress: 0,
            queued_at: now,
            started_at: None,
            ended_at: None,
            error: None,
        }
    }
}

/// A stored analysis payload with its own time-to-live, independent of the
/// status record's lifetime (§4.8, §6).
#[derive(Debug, Clone)]
pub struct StoredResult {
    pub payload: serde_json::Value,
    pub phase: JobPhase,
    pub stored_at: SystemTime,
    pub ttl: std::time::Duration,
}

impl StoredResult {
    pub fn is_expired(&self, now: SystemTime) -> bool {
        now.duration_since(self.stored_at).unwrap_or_default() >= self.ttl
    }
}

/// Outcome passed to `release` once a claim finishes (§4.8).
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Completed,
    Error(String),
}
