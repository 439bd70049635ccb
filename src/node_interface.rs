//! Contracts for the node subsystems the forecasting engine is wired to.
//!
//! The engine never owns a mempool, chain state, or block assembler; it
//! talks to whatever the embedding node provides through the traits below.
//! Implementations guard their own state: where a trait call needs both the
//! chain-state and mempool locks, the chain-state lock is taken first, and
//! both are released before the call returns owned data.

use std::path::PathBuf;

use crate::{
    fee_frac::{FeeFrac, FeeRate},
    forecaster::ConfirmationTarget,
    linearize::RemovedTransaction,
};

/// Position of the active chain tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockIndex {
    /// Height of the tip block.
    pub height: u32,
}

/// Read access to the active chain state.
pub trait ChainState: Send + Sync {
    /// The current tip, or `None` while no chain state is active.
    fn active_tip(&self) -> Option<BlockIndex>;
}

/// Read access to the pool of unconfirmed transactions.
pub trait Mempool: Send + Sync {
    /// Whether the initial mempool load has been attempted.
    fn load_tried(&self) -> bool;

    /// Number of transactions currently in the pool.
    fn size(&self) -> usize;
}

/// A candidate next block reduced to what fee forecasting needs: one fee
/// fraction per selected transaction, ordered by descending mining score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockTemplate {
    /// Per-transaction `(fee, vsize)` pairs, best mining score first.
    pub fee_rate_histogram: Vec<FeeFrac>,
}

/// Builds candidate blocks from the current mempool.
///
/// Forecasting asks for composition only: implementations skip block
/// validity checking, take the chain-state lock before the mempool lock,
/// and drop both before returning.
pub trait BlockAssembler: Send + Sync {
    /// Composes a candidate next block.
    fn create_new_block(&self) -> BlockTemplate;
}

/// Observer of block-connection events.
///
/// The validation subsystem calls this each time a connected block removes
/// transactions from the mempool, handing them over in confirmation order
/// (parents before children).
pub trait ValidationInterface: Send + Sync {
    /// A block at `block_height` connected and removed `txs_removed` from
    /// the mempool.
    fn mempool_txs_removed_for_block(
        &self,
        txs_removed: &[RemovedTransaction],
        block_height: u32,
    );
}

/// Bookkeeping a long-horizon estimate is computed against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeCalculation {
    /// Chain height the estimator's statistics are current at.
    pub best_height: u32,

    /// The target the caller asked for.
    pub desired_target: u32,

    /// The target the estimate actually answers, possibly wider.
    pub returned_target: u32,
}

/// Construction surface for long-horizon policy estimators.
///
/// The estimator persists its statistics itself; the file location and the
/// willingness to load stale data are decided when the estimator is built
/// and stay invisible to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyEstimatorOptions {
    /// Where the estimator dumps and restores its statistics.
    pub estimates_filepath: PathBuf,

    /// Whether statistics from an old dump may still be served.
    pub read_stale_estimates: bool,
}

/// The long-horizon policy estimator maintained by the embedding node.
pub trait PolicyEstimator: Send + Sync {
    /// Smart-fee estimate for `target`.
    ///
    /// `conservative` asks for the cautious (high-priority) band. The zero
    /// rate means the estimator has no answer; `fee_calc` reports the chain
    /// height and targets the estimate was computed against.
    fn estimate_smart_fee(
        &self,
        target: ConfirmationTarget,
        fee_calc: &mut FeeCalculation,
        conservative: bool,
    ) -> FeeRate;
}
