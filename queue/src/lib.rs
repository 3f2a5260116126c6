//! The job queue (§4.8) and its worker supervisor (§5, §9): priority
//! scheduling and claim exclusivity over games awaiting analysis, and a
//! fixed pool of tasks that drains it through the `analysis` crate's
//! `GameAnalyzer`.

pub mod store;
pub mod supervisor;
pub mod types;

pub use store::{JobQueue, DEFAULT_MAX_PROCESSING_TIME, DEFAULT_RESULT_TTL};
pub use supervisor::{
    GameSource, WorkerSupervisor, WorkerSupervisorConfig, DEFAULT_MIN_RESTART_INTERVAL,
    DEFAULT_POLL_INTERVAL, DEFAULT_WORKER_COUNT,
};
pub use types::{AnalysisJob, JobOutcome, JobPhase, JobStatus, JobStatusRecord, StoredResult};
