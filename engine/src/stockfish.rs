//! Raw process transport for a Stockfish (or Stockfish-compatible UCI)
//! subprocess: spawn, line-oriented stdin/stdout, process reap. This is the
//! bottom of the engine stack; protocol semantics (handshake, `go depth`,
//! score parsing) live one layer up in [`crate::adapter`].

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin};
use tokio::sync::mpsc;

use crate::error::EngineError;

/// Per-adapter engine configuration (§4.2's `total_threads / N_max` division
/// happens one layer up in the pool; this struct just carries the resolved
/// values down to the UCI handshake).
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub binary_path: Option<PathBuf>,
    pub threads: Option<u32>,
    pub hash_mb: Option<u32>,
}

/// A spawned engine subprocess with a line-oriented read/write surface.
/// Holds no UCI protocol state of its own — that belongs to the adapter.
pub struct StockfishProcess {
    child: Child,
    stdin: ChildStdin,
    lines_rx: mpsc::Receiver<std::io::Result<String>>,
}

impl StockfishProcess {
    #[tracing::instrument(level = "info", skip(config))]
    pub async fn spawn(config: &EngineConfig) -> Result<Self, EngineError> {
        let path = config
            .binary_path
            .clone()
            .or_else(find_stockfish_path)
            .ok_or(EngineError::BinaryNotFound)?;

        tracing::debug!(path = %path.display(), "spawning engine process");
        let mut child = tokio::process::Command::new(&path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(EngineError::Io)?;

        let stdin = child.stdin.take().ok_or(EngineError::BinaryNotFound)?;
        let stdout = child.stdout.take().ok_or(EngineError::BinaryNotFound)?;

        let (tx, lines_rx) = mpsc::channel(64);
        tokio::spawn(async move {
            let mut reader = BufReader::new(stdout);
            let mut line = String::new();
            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        tracing::warn!("engine stdout closed");
                        break;
                    }
                    Ok(_) => {
                        let trimmed = line.trim_end().to_string();
                        if tx.send(Ok(trimmed)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(Err(e)).await;
                        break;
                    }
                }
            }
        });

        let mut process = Self {
            child,
            stdin,
            lines_rx,
        };

        process.send_line("uci").await?;
        process
            .wait_for(|line| line == "uciok", Duration::from_secs(10))
            .await?;

        if let Some(threads) = config.threads {
            let threads = threads.clamp(1, 256);
            process
                .send_line(&format!("setoption name Threads value {threads}"))
                .await?;
        }
        if let Some(hash_mb) = config.hash_mb {
            let hash_mb = hash_mb.clamp(1, 8192);
            process
                .send_line(&format!("setoption name Hash value {hash_mb}"))
                .await?;
        }

        process.send_line("isready").await?;
        process
            .wait_for(|line| line == "readyok", Duration::from_secs(10))
            .await?;

        Ok(process)
    }

    pub async fn send_line(&mut self, line: &str) -> Result<(), EngineError> {
        tracing::trace!("UCI >> {line}");
        self.stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| EngineError::Transport(e.to_string()))?;
        self.stdin
            .write_all(b"\n")
            .await
            .map_err(|e| EngineError::Transport(e.to_string()))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| EngineError::Transport(e.to_string()))
    }

    /// Read the next raw line from the engine, bounded by `timeout`.
    pub async fn recv_line(&mut self, timeout: Duration) -> Result<String, EngineError> {
        match tokio::time::timeout(timeout, self.lines_rx.recv()).await {
            Ok(Some(Ok(line))) => {
                tracing::trace!("UCI << {line}");
                Ok(line)
            }
            Ok(Some(Err(e))) => Err(EngineError::Transport(e.to_string())),
            Ok(None) => Err(EngineError::Transport("engine closed stdout".into())),
            Err(_) => Err(EngineError::Timeout(timeout)),
        }
    }

    /// Drain lines until one satisfies `pred`, bounded by `timeout` overall.
    async fn wait_for(
        &mut self,
        pred: impl Fn(&str) -> bool,
        timeout: Duration,
    ) -> Result<(), EngineError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Err(EngineError::Timeout(timeout));
            }
            let line = self.recv_line(remaining).await?;
            if pred(&line) {
                return Ok(());
            }
        }
    }

    /// Send `quit` and reap the process, with a bounded grace period before
    /// a hard kill.
    pub async fn close(mut self) {
        let _ = self.send_line("quit").await;
        if tokio::time::timeout(Duration::from_secs(2), self.child.wait())
            .await
            .is_err()
        {
            let _ = self.child.kill().await;
        }
    }
}

fn find_stockfish_path() -> Option<PathBuf> {
    let candidates = [
        "/usr/local/bin/stockfish",
        "/usr/bin/stockfish",
        "/opt/homebrew/bin/stockfish",
        "/usr/games/stockfish",
    ];

    for candidate in candidates {
        if Path::new(candidate).exists() {
            return Some(PathBuf::from(candidate));
        }
    }

    which_in_path("stockfish")
}

fn which_in_path(binary: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.exists())
}
