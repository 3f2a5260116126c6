//! Process entry point (§10): wires engine pool → evaluation cache →
//! position evaluator → game analyzer → job queue → worker supervisor,
//! then runs until a shutdown signal arrives. Follows the shape of
//! `server/src/main.rs`: `tracing-subscriber` init with an `EnvFilter`
//! default of `info`, construct-then-run wiring, and `tokio::select!`
//! against SIGTERM/SIGINT for graceful shutdown. `anyhow::Result` is used
//! at this process boundary only, per §10 — every lower layer returns its
//! own typed error.

mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use analysis::{AnalyzerConfig, GameAnalyzer};
use engine::cache::EvaluationCache;
use engine::pool::EnginePool;
use engine::evaluator::PositionEvaluator;
use queue::{GameSource, JobQueue, WorkerSupervisor, WorkerSupervisorConfig};

#[derive(Parser)]
#[command(name = "chess-analysis", about = "Chess game analysis pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a single PGN file directly, bypassing the job queue, and
    /// print the resulting GameAnalysis as JSON.
    Analyze {
        pgn_path: PathBuf,
        #[arg(long)]
        game_id: Option<String>,
    },
    /// Start the worker pool, enqueue every `*.pgn` file already present in
    /// `games_dir`, and serve until a shutdown signal arrives.
    Serve {
        games_dir: PathBuf,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

fn build_evaluator() -> PositionEvaluator {
    let pool = EnginePool::new(config::pool_size(), config::engine_threads(), config::engine_path());
    let cache = EvaluationCache::new(config::cache_capacity());
    PositionEvaluator::new(pool, cache)
}

/// Reads `<game_id>.pgn` files out of a flat directory. The persistence
/// surface proper (§6's `games`/`enhanced_move_annotations` rows) is out of
/// scope here; this is the minimal `GameSource` a single-process deployment
/// needs to hand the supervisor real PGN text.
struct PgnDirectorySource {
    dir: PathBuf,
}

impl GameSource for PgnDirectorySource {
    fn load_pgn(&self, game_id: &str) -> Option<String> {
        std::fs::read_to_string(self.dir.join(format!("{game_id}.pgn"))).ok()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Analyze { pgn_path, game_id } => run_analyze(pgn_path, game_id).await,
        Command::Serve { games_dir } => run_serve(games_dir).await,
    }
}

async fn run_analyze(pgn_path: PathBuf, game_id: Option<String>) -> Result<()> {
    let pgn = std::fs::read_to_string(&pgn_path)
        .with_context(|| format!("reading {}", pgn_path.display()))?;

    let evaluator = build_evaluator();
    let analyzer_config = AnalyzerConfig {
        full_depth: config::full_depth(),
        shallow_depth: config::shallow_depth(),
        ..AnalyzerConfig::default()
    };
    let analyzer = GameAnalyzer::new(&evaluator, analyzer_config);

    let analysis = analyzer.analyze_game(&pgn, game_id, 0).await;
    evaluator.close().await;

    println!("{}", serde_json::to_string_pretty(&analysis)?);
    if !analysis.transaction_successful {
        anyhow::bail!(analysis.error.unwrap_or_else(|| "analysis failed".to_string()));
    }
    Ok(())
}

async fn run_serve(games_dir: PathBuf) -> Result<()> {
    tracing::info!(dir = %games_dir.display(), "starting chess analysis server");

    let evaluator = Arc::new(build_evaluator());
    let queue = Arc::new(JobQueue::new());
    let source: Arc<dyn GameSource> = Arc::new(PgnDirectorySource {
        dir: games_dir.clone(),
    });

    let entries = std::fs::read_dir(&games_dir)
        .with_context(|| format!("reading games directory {}", games_dir.display()))?;
    let mut enqueued = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("pgn") {
            continue;
        }
        let Some(game_id) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        queue.enqueue(game_id, "startup-scan", 0);
        enqueued += 1;
    }
    tracing::info!(enqueued, "seeded job queue from games directory");

    let supervisor_config = WorkerSupervisorConfig {
        worker_count: config::worker_count(),
        analyzer: AnalyzerConfig {
            full_depth: config::full_depth(),
            shallow_depth: config::shallow_depth(),
            ..AnalyzerConfig::default()
        },
        ..WorkerSupervisorConfig::default()
    };
    let supervisor = WorkerSupervisor::spawn(queue.clone(), evaluator.clone(), source, supervisor_config);

    let stall_threshold = Duration::from_secs(config::stall_seconds());
    let reaper_queue = queue.clone();
    let reaper = tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(60)).await;
            let reaped = reaper_queue.reap_stalled(stall_threshold);
            if reaped > 0 {
                tracing::warn!(reaped, "reaped stalled jobs");
            }
        }
    });

    wait_for_shutdown_signal().await;
    tracing::info!("shutdown signal received, draining workers");

    reaper.abort();
    supervisor.shutdown().await;
    evaluator.close().await;
    tracing::info!("shut down cleanly");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "failed to install SIGTERM handler");
            std::future::pending::<()>().await;
            return;
        }
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "failed to install SIGINT handler");
            std::future::pending::<()>().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("received SIGTERM"),
        _ = sigint.recv() => tracing::info!("received SIGINT"),
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
