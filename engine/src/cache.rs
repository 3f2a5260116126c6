//! The Evaluation Cache (§4.3): a bounded map from `(piece-placement +
//! active color + castling rights, depth) -> EngineEvaluation`. Eviction is
//! approximate-LRU by insertion order, which is deterministic and
//! documented (§9) rather than a true LRU, since only determinism for
//! repeatability under test is required, not recency-optimality.
//!
//! The cache itself is synchronous — no suspension points — per §5; the
//! suspension happens one layer up, in [`crate::evaluator::PositionEvaluator`],
//! which is the actual "single funnel" the Game Analyzer calls through.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::adapter::EngineEvaluation;

pub const DEFAULT_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub fen_key: String,
    pub depth: u32,
}

struct CacheState {
    map: HashMap<CacheKey, EngineEvaluation>,
    order: VecDeque<CacheKey>,
}

pub struct EvaluationCache {
    capacity: usize,
    state: Mutex<CacheState>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl EvaluationCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(CacheState {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<EngineEvaluation> {
        let state = self.state.lock().expect("cache mutex poisoned");
        let hit = state.map.get(key).copied();
        if hit.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        hit
    }

    pub fn insert(&self, key: CacheKey, value: EngineEvaluation) {
        let mut state = self.state.lock().expect("cache mutex poisoned");
        if !state.map.contains_key(&key) {
            state.order.push_back(key.clone());
        }
        state.map.insert(key, value);

        while state.map.len() > self.capacity {
            if let Some(oldest) = state.order.pop_front() {
                state.map.remove(&oldest);
            } else {
                break;
            }
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.state.lock().expect("cache mutex poisoned").map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EvaluationCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
