//! The job queue backing store (§4.8), following the shape of the
//! Redis-backed `AnalysisQueue` (`original_source/backend/app/services/queue_service.py`):
//! a priority-ordered queue, a disjoint processing set for claim exclusivity,
//! and independent status/result records. Reimplemented here as an in-process
//! store behind a single synchronous lock, the same shape `EvaluationCache`
//! uses for its own in-memory state.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use crate::types::{AnalysisJob, JobOutcome, JobPhase, JobStatus, JobStatusRecord, StoredResult};

/// Default result time-to-live: 24 hours, matching the Python original's
/// `store_result` default.
pub const DEFAULT_RESULT_TTL: Duration = Duration::from_secs(86_400);

/// Default stall threshold for `reap_stalled` (§5 Timeouts).
pub const DEFAULT_MAX_PROCESSING_TIME: Duration = Duration::from_secs(1_800);

struct QueueState {
    /// Visible, unclaimed jobs. Not a heap: `peek_next` only ever looks at
    /// the single highest-priority entry, mirroring the original's
    /// `zrange(0, 0)` — it does not skip past a processing top entry.
    pending: Vec<AnalysisJob>,
    processing: HashMap<String, SystemTime>,
    statuses: HashMap<String, JobStatusRecord>,
    results: HashMap<String, StoredResult>,
}

/// The priority job queue (§4.8). All operations are synchronous and
/// protected by one lock; callers awaiting queue round-trips from async
/// worker code simply call through without holding the lock across an
/// await point.
pub struct JobQueue {
    state: Mutex<QueueState>,
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl JobQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                pending: Vec::new(),
                processing: HashMap::new(),
                statuses: HashMap::new(),
                results: HashMap::new(),
            }),
        }
    }

    /// Enqueue a game for analysis. Idempotent: a game already `queued` is a
    /// no-op (§4.8).
    pub fn enqueue(&self, game_id: &str, requester: &str, priority: i64) {
        let now = SystemTime::now();
        let mut state = self.state.lock().expect("queue lock poisoned");

        if let Some(existing) = state.statuses.get(game_id) {
            if existing.status == JobStatus::Queued {
                tracing::debug!(game_id, "enqueue is a no-op, already queued");
                return;
            }
        }

        state.pending.push(AnalysisJob {
            game_id: game_id.to_string(),
            requester: requester.to_string(),
            priority,
            enqueued_at: now,
        });
        state
            .statuses
            .insert(game_id.to_string(), JobStatusRecord::queued(now));
        tracing::info!(game_id, priority, "job enqueued");
    }

    /// The single highest-priority job not currently claimed, without
    /// removing it. Ties broken by earliest enqueue time (§4.8).
    pub fn peek_next(&self) -> Option<AnalysisJob> {
        let state = self.state.lock().expect("queue lock poisoned");
        let top = state.pending.iter().min_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.enqueued_at.cmp(&b.enqueued_at))
        })?;

        if state.processing.contains_key(&top.game_id) {
            return None;
        }
        Some(top.clone())
    }

    /// Atomically move `game_id` from queue-visible to processing. Returns
    /// `true` only if this caller won the race (§4.8, §5 claim ordering):
    /// insertion into the processing set is conditional on absence.
    pub fn claim(&self, game_id: &str) -> bool {
        let now = SystemTime::now();
        let mut state = self.state.lock().expect("queue lock poisoned");

        if state.processing.contains_key(game_id) {
            return false;
        }

        let Some(idx) = state.pending.iter().position(|j| j.game_id == game_id) else {
            return false;
        };
        state.pending.remove(idx);
        state.processing.insert(game_id.to_string(), now);

        if let Some(status) = state.statuses.get_mut(game_id) {
            status.status = JobStatus::Processing;
            status.phase = JobPhase::Initial;
            status.started_at = Some(now);
        }
        tracing::info!(game_id, "job claimed");
        true
    }

    /// Remove `game_id` from processing and record the final outcome
    /// (§4.8). Idempotent if the game was not in processing.
    pub fn release(&self, game_id: &str, outcome: JobOutcome) {
        let now = SystemTime::now();
        let mut state = self.state.lock().expect("queue lock poisoned");
        state.processing.remove(game_id);

        let status = state
            .statuses
            .entry(game_id.to_string())
            .or_insert_with(|| JobStatusRecord::queued(now));
        status.ended_at = Some(now);
        match outcome {
            JobOutcome::Completed => {
                status.status = JobStatus::Completed;
                status.phase = JobPhase::Complete;
                status.progress = 100;
                status.error = None;
            }
            JobOutcome::Error(message) => {
                tracing::warn!(game_id, error = %message, "job released with error");
                status.status = JobStatus::Error;
                status.error = Some(message);
            }
        }
    }

    /// Persist an intermediate or final payload and advance progress
    /// (§4.8: initial -> 25%, intermediate -> 60%, complete -> 100%).
    pub fn store_result(&self, game_id: &str, payload: serde_json::Value, phase: JobPhase) {
        self.store_result_with_ttl(game_id, payload, phase, DEFAULT_RESULT_TTL);
    }

    pub fn store_result_with_ttl(
        &self,
        game_id: &str,
        payload: serde_json::Value,
        phase: JobPhase,
        ttl: Duration,
    ) {
        let now = SystemTime::now();
        let mut state = self.state.lock().expect("queue lock poisoned");

        if let Some(status) = state.statuses.get_mut(game_id) {
            status.phase = phase;
            status.progress = phase.progress_percent();
            if phase == JobPhase::Complete {
                status.status = JobStatus::Completed;
                status.ended_at = Some(now);
            }
        }

        state.results.insert(
            game_id.to_string(),
            StoredResult {
                payload,
                phase,
                stored_at: now,
                ttl,
            },
        );
    }

    /// The stored payload, if present and not expired (§4.8 independent TTL).
    pub fn get_result(&self, game_id: &str) -> Option<serde_json::Value> {
        let now = SystemTime::now();
        let state = self.state.lock().expect("queue lock poisoned");
        let result = state.results.get(game_id)?;
        if result.is_expired(now) {
            return None;
        }
        Some(result.payload.clone())
    }

    pub fn get_status(&self, game_id: &str) -> Option<JobStatusRecord> {
        let state = self.state.lock().expect("queue lock poisoned");
        state.statuses.get(game_id).cloned()
    }

    pub fn queue_length(&self) -> usize {
        self.state.lock().expect("queue lock poisoned").pending.len()
    }

    pub fn processing_count(&self) -> usize {
        self.state
            .lock()
            .expect("queue lock poisoned")
            .processing
            .len()
    }

    /// Force-release any processing entry older than `max_age`, marking it
    /// errored (§4.8, §5). Returns the number of entries reaped.
    pub fn reap_stalled(&self, max_age: Duration) -> usize {
        let now = SystemTime::now();
        let stalled: Vec<String> = {
            let state = self.state.lock().expect("queue lock poisoned");
            state
                .processing
                .iter()
                .filter(|(_, started)| {
                    now.duration_since(**started).unwrap_or_default() > max_age
                })
                .map(|(game_id, _)| game_id.clone())
                .collect()
        };

        for game_id in &stalled {
            tracing::warn!(game_id, "reaping stalled job");
            self.release(game_id, JobOutcome::Error("Processing timed out".to_string()));
        }
        stalled.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_is_idempotent_while_queued() {
        let queue = JobQueue::new();
        queue.enqueue("g1", "u1", 0);
        queue.enqueue("g1", "u1", 5);
        assert_eq!(queue.queue_length(), 1);
    }

    #[test]
    fn peek_next_prefers_higher_priority() {
        let queue = JobQueue::new();
        queue.enqueue("low", "u1", 0);
        queue.enqueue("high", "u1", 10);
        let top = queue.peek_next().unwrap();
        assert_eq!(top.game_id, "high");
    }

    #[test]
    fn ties_break_by_enqueue_order() {
        let queue = JobQueue::new();
        queue.enqueue("first", "u1", 5);
        queue.enqueue("second", "u1", 5);
        let top = queue.peek_next().unwrap();
        assert_eq!(top.game_id, "first");
    }

    #[test]
    fn claim_removes_from_pending_and_marks_processing() {
        let queue = JobQueue::new();
        queue.enqueue("g1", "u1", 0);
        assert!(queue.claim("g1"));
        assert_eq!(queue.queue_length(), 0);
        assert_eq!(queue.processing_count(), 1);
        assert_eq!(queue.get_status("g1").unwrap().status, JobStatus::Processing);
    }

    #[test]
    fn second_claim_on_same_game_loses_the_race() {
        let queue = JobQueue::new();
        queue.enqueue("g1", "u1", 0);
        assert!(queue.claim("g1"));
        assert!(!queue.claim("g1"));
    }

    #[test]
    fn claim_of_unknown_game_fails() {
        let queue = JobQueue::new();
        assert!(!queue.claim("nonexistent"));
    }

    #[test]
    fn peek_next_is_none_when_top_entry_is_claimed() {
        let queue = JobQueue::new();
        queue.enqueue("g1", "u1", 0);
        queue.claim("g1");
        assert!(queue.peek_next().is_none());
    }

    #[test]
    fn release_completed_updates_status() {
        let queue = JobQueue::new();
        queue.enqueue("g1", "u1", 0);
        queue.claim("g1");
        queue.release("g1", JobOutcome::Completed);
        let status = queue.get_status("g1").unwrap();
        assert_eq!(status.status, JobStatus::Completed);
        assert_eq!(status.progress, 100);
        assert_eq!(queue.processing_count(), 0);
    }

    #[test]
    fn release_error_records_message() {
        let queue = JobQueue::new();
        queue.enqueue("g1", "u1", 0);
        queue.claim("g1");
        queue.release("g1", JobOutcome::Error("boom".to_string()));
        let status = queue.get_status("g1").unwrap();
        assert_eq!(status.status, JobStatus::Error);
        assert_eq!(status.error.as_deref(), Some("boom"));
    }

    #[test]
    fn store_result_progress_follows_phase_table() {
        let queue = JobQueue::new();
        queue.enqueue("g1", "u1", 0);
        queue.claim("g1");

        queue.store_result("g1", serde_json::json!({"partial": true}), JobPhase::Initial);
        assert_eq!(queue.get_status("g1").unwrap().progress, 25);

        queue.store_result("g1", serde_json::json!({"partial": true}), JobPhase::Intermediate);
        assert_eq!(queue.get_status("g1").unwrap().progress, 60);

        queue.store_result("g1", serde_json::json!({"done": true}), JobPhase::Complete);
        let status = queue.get_status("g1").unwrap();
        assert_eq!(status.progress, 100);
        assert_eq!(status.status, JobStatus::Completed);
    }

    #[test]
    fn get_result_returns_stored_payload() {
        let queue = JobQueue::new();
        queue.enqueue("g1", "u1", 0);
        let payload = serde_json::json!({"move_count": 4});
        queue.store_result(&"g1".to_string(), payload.clone(), JobPhase::Complete);
        assert_eq!(queue.get_result("g1"), Some(payload));
    }

    #[test]
    fn expired_result_is_not_returned() {
        let queue = JobQueue::new();
        queue.enqueue("g1", "u1", 0);
        queue.store_result_with_ttl(
            "g1",
            serde_json::json!({"x": 1}),
            JobPhase::Complete,
            Duration::from_secs(0),
        );
        assert!(queue.get_result("g1").is_none());
    }

    #[test]
    fn reap_stalled_releases_old_processing_entries() {
        let queue = JobQueue::new();
        queue.enqueue("g1", "u1", 0);
        queue.claim("g1");
        let reaped = queue.reap_stalled(Duration::from_secs(0));
        assert_eq!(reaped, 1);
        assert_eq!(queue.processing_count(), 0);
        let status = queue.get_status("g1").unwrap();
        assert_eq!(status.status, JobStatus::Error);
        assert_eq!(status.error.as_deref(), Some("Processing timed out"));
    }

    #[test]
    fn reap_stalled_leaves_fresh_processing_entries() {
        let queue = JobQueue::new();
        queue.enqueue("g1", "u1", 0);
        queue.claim("g1");
        let reaped = queue.reap_stalled(Duration::from_secs(1_800));
        assert_eq!(reaped, 0);
        assert_eq!(queue.processing_count(), 1);
    }

    #[test]
    fn requeue_after_completion_is_allowed() {
        let queue = JobQueue::new();
        queue.enqueue("g1", "u1", 0);
        queue.claim("g1");
        queue.release("g1", JobOutcome::Completed);

        queue.enqueue("g1", "u1", 0);
        assert_eq!(queue.queue_length(), 1);
        assert_eq!(queue.get_status("g1").unwrap().status, JobStatus::Queued);
    }
}
