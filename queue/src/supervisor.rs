//! The fixed worker pool that drains the job queue (§4.8, §5, §9 "From
//! cooperative async to explicit tasks"). Follows the shape of
//! `ReviewManager`/`run_review_worker` (`server/src/review/mod.rs`,
//! `server/src/review/worker.rs`): a fixed pool of long-lived tasks, each
//! looping `{claim, analyze, report}`, restarted by a supervisor if one
//! exits abnormally. `ReviewManager` hands jobs to workers over an mpsc
//! channel; here the queue itself is the shared state workers poll, per
//! §4.8's `peek_next`/`claim` contract, so there is no channel to own.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use analysis::{AnalyzerConfig, GameAnalyzer};
use engine::PositionEvaluator;

use crate::store::JobQueue;
use crate::types::{JobOutcome, JobPhase};

/// How a worker fetches the PGN text for a claimed game. The queue crate
/// has no opinion on persistence (§6 leaves the record store abstract); a
/// caller wires this to whatever store holds finished games.
pub trait GameSource: Send + Sync {
    fn load_pgn(&self, game_id: &str) -> Option<String>;
}

/// How long an idle worker waits before polling `peek_next` again.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Default worker pool size (§5: `WORKER_COUNT`, default 2).
pub const DEFAULT_WORKER_COUNT: usize = 2;

/// Minimum delay between a worker task's abnormal exit and its restart, to
/// avoid a crash loop (§9).
pub const DEFAULT_MIN_RESTART_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
pub struct WorkerSupervisorConfig {
    pub worker_count: usize,
    pub poll_interval: Duration,
    pub min_restart_interval: Duration,
    pub analyzer: AnalyzerConfig,
}

impl Default for WorkerSupervisorConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            min_restart_interval: DEFAULT_MIN_RESTART_INTERVAL,
            analyzer: AnalyzerConfig::default(),
        }
    }
}

/// Owns a fixed pool of worker tasks draining the shared `JobQueue`
/// (§4.8). Each worker polls `peek_next` + `claim`, hands a win to the
/// two-phase `GameAnalyzer`, and reports the outcome back through
/// `store_result`/`release`.
pub struct WorkerSupervisor {
    shutdown: Arc<AtomicBool>,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl WorkerSupervisor {
    /// Spawn the configured number of supervised worker tasks. Each is
    /// itself wrapped in a restart loop: if the inner worker task panics,
    /// the supervisor logs it, waits `min_restart_interval`, and respawns
    /// (§9).
    pub fn spawn(
        queue: Arc<JobQueue>,
        evaluator: Arc<PositionEvaluator>,
        source: Arc<dyn GameSource>,
        config: WorkerSupervisorConfig,
    ) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut handles = Vec::with_capacity(config.worker_count);

        for worker_id in 0..config.worker_count {
            let queue = queue.clone();
            let evaluator = evaluator.clone();
            let source = source.clone();
            let shutdown = shutdown.clone();

            let handle = tokio::spawn(async move {
                loop {
                    if shutdown.load(Ordering::Relaxed) {
                        tracing::info!(worker_id, "supervisor shutting down, not respawning");
                        break;
                    }

                    let queue = queue.clone();
                    let evaluator = evaluator.clone();
                    let source = source.clone();
                    let shutdown_inner = shutdown.clone();

                    let worker = tokio::spawn(async move {
                        run_worker(worker_id, queue, evaluator, source, config, shutdown_inner).await;
                    });

                    match worker.await {
                        Ok(()) => {
                            tracing::info!(worker_id, "worker exited cleanly");
                            break;
                        }
                        Err(join_err) => {
                            tracing::error!(worker_id, error = %join_err, "worker task panicked, restarting");
                            tokio::time::sleep(config.min_restart_interval).await;
                        }
                    }
                }
            });

            handles.push(handle);
        }

        tracing::info!(worker_count = config.worker_count, "worker supervisor started");
        Self { shutdown, handles }
    }

    /// Signal every worker to stop after its current claim (if any)
    /// finishes, and wait for them to exit.
    pub async fn shutdown(self) {
        self.shutdown.store(true, Ordering::Relaxed);
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

/// One worker's `{claim, analyze, report}` loop (§9).
async fn run_worker(
    worker_id: usize,
    queue: Arc<JobQueue>,
    evaluator: Arc<PositionEvaluator>,
    source: Arc<dyn GameSource>,
    config: WorkerSupervisorConfig,
    shutdown: Arc<AtomicBool>,
) {
    tracing::info!(worker_id, "worker started");

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        let Some(job) = queue.peek_next() else {
            tokio::time::sleep(config.poll_interval).await;
            continue;
        };

        if !queue.claim(&job.game_id) {
            // Lost the race to another worker; retry peek_next immediately
            // (§5 Queue claim ordering).
            continue;
        }

        tracing::info!(worker_id, game_id = %job.game_id, "claimed job");
        let outcome = process_job(
            worker_id,
            &job.game_id,
            evaluator.as_ref(),
            source.as_ref(),
            &queue,
            config.analyzer,
        )
        .await;
        queue.release(&job.game_id, outcome);
    }

    tracing::info!(worker_id, "worker stopped");
}

/// Run the two-phase analyzer over one claimed game and persist the
/// result. The Phase-1/initial result is stored as soon as it exists so a
/// caller polling status sees a partial view (§4.8); since `GameAnalyzer`
/// itself returns only a finished `GameAnalysis`, the initial progress
/// marker is stored immediately on claim and the full result on
/// completion.
async fn process_job(
    worker_id: usize,
    game_id: &str,
    evaluator: &PositionEvaluator,
    source: &dyn GameSource,
    queue: &JobQueue,
    analyzer_config: AnalyzerConfig,
) -> JobOutcome {
    let Some(pgn) = source.load_pgn(game_id) else {
        tracing::warn!(worker_id, game_id, "no stored game for claimed job");
        return JobOutcome::Error("game not found".to_string());
    };

    queue.store_result(game_id, serde_json::Value::Null, JobPhase::Initial);

    let analyzer = GameAnalyzer::new(evaluator, analyzer_config);
    let analysis = analyzer
        .analyze_game(&pgn, Some(game_id.to_string()), worker_id)
        .await;

    if !analysis.transaction_successful {
        let message = analysis
            .error
            .unwrap_or_else(|| "analysis failed with no error detail".to_string());
        return JobOutcome::Error(message);
    }

    let payload = match serde_json::to_value(&analysis) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(worker_id, game_id, error = %e, "failed to serialize completed analysis");
            return JobOutcome::Error(format!("serialization failure: {e}"));
        }
    };

    queue.store_result(game_id, payload, JobPhase::Complete);
    tracing::info!(worker_id, game_id, "job completed");
    JobOutcome::Completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::cache::EvaluationCache;
    use engine::pool::EnginePool;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration as StdDuration;

    struct StaticSource(StdMutex<HashMap<String, String>>);

    impl GameSource for StaticSource {
        fn load_pgn(&self, game_id: &str) -> Option<String> {
            self.0.lock().unwrap().get(game_id).cloned()
        }
    }

    fn evaluator() -> Arc<PositionEvaluator> {
        Arc::new(PositionEvaluator::new(
            EnginePool::new(1, 1, None),
            EvaluationCache::new(1_000),
        ))
    }

    #[tokio::test]
    async fn worker_reports_error_for_missing_game() {
        let queue = Arc::new(JobQueue::new());
        let source: Arc<dyn GameSource> = Arc::new(StaticSource(StdMutex::new(HashMap::new())));
        queue.enqueue("ghost", "u1", 0);

        let supervisor = WorkerSupervisor::spawn(
            queue.clone(),
            evaluator(),
            source,
            WorkerSupervisorConfig {
                worker_count: 1,
                poll_interval: Duration::from_millis(10),
                min_restart_interval: StdDuration::from_millis(10),
                ..Default::default()
            },
        );

        let start = std::time::Instant::now();
        loop {
            if let Some(status) = queue.get_status("ghost") {
                if status.status == crate::types::JobStatus::Error {
                    break;
                }
            }
            if start.elapsed() > Duration::from_secs(5) {
                panic!("timed out waiting for worker to report missing game");
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        supervisor.shutdown().await;

        let status = queue.get_status("ghost").unwrap();
        assert_eq!(status.error.as_deref(), Some("game not found"));
    }

    #[tokio::test]
    async fn zero_workers_never_claims_anything() {
        let queue = Arc::new(JobQueue::new());
        let source: Arc<dyn GameSource> = Arc::new(StaticSource(StdMutex::new(HashMap::new())));
        queue.enqueue("g1", "u1", 0);

        let supervisor = WorkerSupervisor::spawn(
            queue.clone(),
            evaluator(),
            source,
            WorkerSupervisorConfig {
                worker_count: 0,
                ..Default::default()
            },
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(queue.queue_length(), 1);
        supervisor.shutdown().await;
    }
}
