//! Mock node collaborators and transaction builders shared by the
//! integration tests.
#![allow(dead_code)]

use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use fee_forecaster::{
    BlockAssembler, BlockIndex, BlockTemplate, ChainState, ConfirmationTarget, FeeCalculation,
    FeeFrac, FeeRate, Mempool, PolicyEstimator, PolicyEstimatorOptions, RemovedTransaction, Txid,
    WITNESS_SCALE_FACTOR,
};

/// Chain-state stub with a settable tip.
pub struct MockChainState {
    tip: Mutex<Option<BlockIndex>>,
}

impl MockChainState {
    pub fn with_tip(height: u32) -> Self {
        Self {
            tip: Mutex::new(Some(BlockIndex { height })),
        }
    }

    pub fn without_tip() -> Self {
        Self {
            tip: Mutex::new(None),
        }
    }

    pub fn set_tip(&self, height: u32) {
        *self.tip.lock() = Some(BlockIndex { height });
    }
}

impl ChainState for MockChainState {
    fn active_tip(&self) -> Option<BlockIndex> {
        *self.tip.lock()
    }
}

/// In-memory stand-in for the unconfirmed transaction pool: just the
/// `(fee, vsize)` pairs fee forecasting cares about.
pub struct MockMempool {
    entries: Mutex<Vec<FeeFrac>>,
    load_tried: AtomicBool,
}

impl MockMempool {
    pub fn loaded() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            load_tried: AtomicBool::new(true),
        }
    }

    pub fn still_loading() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            load_tried: AtomicBool::new(false),
        }
    }

    pub fn set_load_tried(&self, load_tried: bool) {
        self.load_tried.store(load_tried, Ordering::SeqCst);
    }

    pub fn add_transaction(&self, fee: u64, vsize: u64) {
        self.entries.lock().push(FeeFrac::new(fee, vsize));
    }

    /// Adds `fee`-paying transactions of `vsize` vbytes until the pool's
    /// total weight exceeds `weight_target` weight units.
    pub fn fill_past_weight(&self, fee: u64, vsize: u64, weight_target: u64) {
        while self.total_weight() <= weight_target {
            self.add_transaction(fee, vsize);
        }
    }

    pub fn total_weight(&self) -> u64 {
        self.entries
            .lock()
            .iter()
            .map(|entry| entry.size * WITNESS_SCALE_FACTOR)
            .sum()
    }

    pub fn snapshot(&self) -> Vec<FeeFrac> {
        self.entries.lock().clone()
    }
}

impl Mempool for MockMempool {
    fn load_tried(&self) -> bool {
        self.load_tried.load(Ordering::SeqCst)
    }

    fn size(&self) -> usize {
        self.entries.lock().len()
    }
}

/// Assembler stub: emits the mock mempool ordered by fee rate, best first.
/// Real assemblers also bound the template at one block of weight; the
/// tests never fill the pool that far past the reference weight.
pub struct MockAssembler {
    mempool: Arc<MockMempool>,
}

impl MockAssembler {
    pub fn new(mempool: Arc<MockMempool>) -> Self {
        Self { mempool }
    }
}

impl BlockAssembler for MockAssembler {
    fn create_new_block(&self) -> BlockTemplate {
        let mut fee_rate_histogram = self.mempool.snapshot();
        fee_rate_histogram.sort_by(|a, b| b.cmp(a));
        BlockTemplate { fee_rate_histogram }
    }
}

/// Policy-estimator stub answering with fixed conservative and economical
/// rates.
pub struct MockPolicyEstimator {
    options: PolicyEstimatorOptions,
    conservative: FeeRate,
    economical: FeeRate,
    best_height: u32,
}

impl MockPolicyEstimator {
    pub fn new(
        options: PolicyEstimatorOptions,
        conservative: FeeRate,
        economical: FeeRate,
        best_height: u32,
    ) -> Self {
        Self {
            options,
            conservative,
            economical,
            best_height,
        }
    }

    /// An estimator with no data: both rates zero.
    pub fn unavailable(options: PolicyEstimatorOptions, best_height: u32) -> Self {
        Self::new(options, FeeRate::ZERO, FeeRate::ZERO, best_height)
    }

    pub fn estimates_filepath(&self) -> &Path {
        &self.options.estimates_filepath
    }
}

impl PolicyEstimator for MockPolicyEstimator {
    fn estimate_smart_fee(
        &self,
        _target: ConfirmationTarget,
        fee_calc: &mut FeeCalculation,
        conservative: bool,
    ) -> FeeRate {
        fee_calc.best_height = self.best_height;
        if conservative {
            self.conservative
        } else {
            self.economical
        }
    }
}

/// Deterministic txid from a small counter.
pub fn txid(n: u64) -> Txid {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&n.to_be_bytes());
    Txid::new(bytes)
}

/// A txid outside the removed set (another block or a coinbase). Test ids
/// stay below 1_000_000 so the ranges never collide.
pub fn external_txid(n: u64) -> Txid {
    txid(1_000_000 + n)
}

/// A transaction spending only outputs from outside the block.
pub fn unrelated_tx(id: u64, fee: u64, vsize: u64) -> RemovedTransaction {
    RemovedTransaction::new(txid(id), vec![external_txid(id)], fee, vsize)
}

/// A transaction spending one output of each listed parent.
pub fn child_tx(id: u64, parents: &[Txid], fee: u64, vsize: u64) -> RemovedTransaction {
    RemovedTransaction::new(txid(id), parents.to_vec(), fee, vsize)
}

/// Unrelated transactions of `fee`/`vsize` whose combined weight exceeds
/// `weight_target`; ids start at `first_id`.
pub fn block_filling_txs(
    first_id: u64,
    fee: u64,
    vsize: u64,
    weight_target: u64,
) -> Vec<RemovedTransaction> {
    let count = weight_target / (vsize * WITNESS_SCALE_FACTOR) + 1;
    (0..count)
        .map(|i| unrelated_tx(first_id + i, fee, vsize))
        .collect()
}
