//! The Engine Pool (§4.2): up to `N_max` lazily-spawned adapters behind a
//! shared, append-only vector (§5 "the engine pool's adapter vector is
//! append-only after first creation under a lock"). A `slot_hint` picks
//! which adapter a caller prefers, enabling parallel fan-out across
//! adapters while each adapter itself stays single-threaded; calls to the
//! same adapter serialize on that adapter's own mutex, which gives the
//! "block until available, fair FIFO" behavior §5 asks for without a
//! second, pool-wide lock.

use std::sync::Arc;

use cozy_chess::Board;
use tokio::sync::Mutex;

use crate::adapter::{EngineAdapter, EngineEvaluation};
use crate::error::EngineError;
use crate::stockfish::EngineConfig;

pub const DEFAULT_N_MAX: usize = 6;

pub struct EnginePool {
    n_max: usize,
    binary_path: Option<std::path::PathBuf>,
    total_threads: u32,
    hash_mb: Option<u32>,
    adapters: Mutex<Vec<Option<Arc<EngineAdapter>>>>,
}

impl EnginePool {
    pub fn new(n_max: usize, total_threads: u32, binary_path: Option<std::path::PathBuf>) -> Self {
        let n_max = n_max.max(1);
        Self {
            n_max,
            binary_path,
            total_threads: total_threads.max(1),
            hash_mb: None,
            adapters: Mutex::new((0..n_max).map(|_| None).collect()),
        }
    }

    pub fn with_hash_mb(mut self, hash_mb: u32) -> Self {
        self.hash_mb = Some(hash_mb);
        self
    }

    /// Threads handed to each adapter: `total_threads / N_max`, minimum one
    /// (§4.2).
    fn threads_per_adapter(&self) -> u32 {
        (self.total_threads / self.n_max as u32).max(1)
    }

    async fn adapter_for_slot(&self, slot_hint: usize) -> Arc<EngineAdapter> {
        let index = slot_hint % self.n_max;
        let mut adapters = self.adapters.lock().await;
        if adapters[index].is_none() {
            let config = EngineConfig {
                binary_path: self.binary_path.clone(),
                threads: Some(self.threads_per_adapter()),
                hash_mb: self.hash_mb,
            };
            adapters[index] = Some(Arc::new(EngineAdapter::new(config)));
        }
        adapters[index].clone().expect("just ensured")
    }

    /// Evaluate `board` at `depth` using the adapter selected by
    /// `slot_hint`. If that adapter is busy, this call blocks on its mutex
    /// (fair FIFO) rather than stealing another adapter's turn.
    pub async fn evaluate(
        &self,
        board: &Board,
        depth: u32,
        slot_hint: usize,
    ) -> Result<EngineEvaluation, EngineError> {
        let adapter = self.adapter_for_slot(slot_hint).await;
        adapter.evaluate(board, depth).await
    }

    pub async fn set_skill(&self, level: u8) -> Result<(), EngineError> {
        let count = { self.adapters.lock().await.len() };
        for slot in 0..count {
            let adapter = self.adapter_for_slot(slot).await;
            adapter.set_skill(level).await?;
        }
        Ok(())
    }

    /// Close every spawned adapter. Unspawned slots are no-ops.
    pub async fn close_all(&self) {
        let adapters = self.adapters.lock().await;
        for adapter in adapters.iter().flatten() {
            adapter.close().await;
        }
    }

    pub fn n_max(&self) -> usize {
        self.n_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threads_per_adapter_has_minimum_one() {
        let pool = EnginePool::new(6, 2, None);
        assert_eq!(pool.threads_per_adapter(), 1);
    }

    #[test]
    fn threads_divided_evenly() {
        let pool = EnginePool::new(4, 16, None);
        assert_eq!(pool.threads_per_adapter(), 4);
    }

    #[test]
    fn n_max_has_floor_of_one() {
        let pool = EnginePool::new(0, 4, None);
        assert_eq!(pool.n_max(), 1);
    }
}
