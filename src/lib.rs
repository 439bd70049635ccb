//! A fee-rate forecasting engine.
//!
//! Given a confirmation target expressed in blocks, the engine produces a
//! short-horizon estimate of the fee rate a transaction should pay for
//! timely inclusion. Several independent forecasters each draw on their own
//! signal:
//!
//! - [`MempoolForecaster`] assembles a candidate next block from the
//!   unconfirmed transactions and reads percentile fee rates off it,
//!   memoizing the result for [`CACHE_LIFE`];
//! - [`BlockForecaster`] watches block-connection notifications and averages
//!   the mining-score percentiles of the last [`MAX_NUMBER_OF_BLOCKS`]
//!   mined blocks;
//! - an optional long-horizon [`PolicyEstimator`] supplied by the embedding
//!   node covers wider targets.
//!
//! The [`FeeEstimator`] coordinator fans a request out to every registered
//! forecaster covering the target and answers with the cheapest usable
//! estimate, alongside the diagnostics of the forecasters that could not
//! help. Failures are values, not panics: each forecaster reports them
//! inside its [`ForecastResult`].
//!
//! # Example
//! ```
//! use fee_forecaster::{ConfirmationTarget, FeeEstimator};
//!
//! let estimator = FeeEstimator::new(None);
//! let (response, errors) = estimator.get_fee_estimate(ConfirmationTarget::blocks(1));
//!
//! // Without a mempool collaborator the coordinator explains itself.
//! assert!(response.is_none());
//! assert_eq!(errors, vec!["Mempool not available.".to_string()]);
//! ```

// Public modules
pub mod error;

// Data structures and forecasters
mod block_forecaster;
mod cache;
mod fee_estimator;
mod fee_frac;
mod forecaster;
mod linearize;
mod mempool_forecaster;
mod node_interface;
mod percentiles;

// Public exports
pub use block_forecaster::{BlockForecaster, BLOCK_FORECAST_MAX_TARGET, MAX_NUMBER_OF_BLOCKS};
pub use cache::CACHE_LIFE;
pub use error::ForecasterError;
pub use fee_estimator::FeeEstimator;
pub use fee_frac::{FeeFrac, FeeRate, DEFAULT_BLOCK_MAX_WEIGHT, WITNESS_SCALE_FACTOR};
pub use forecaster::{
    ConfirmationTarget, ForecastResponse, ForecastResult, ForecastType, Forecaster, TargetKind,
};
pub use linearize::{
    linearize_transactions, RemovedTransaction, TxAncestryGraph, TxLineage, Txid,
};
pub use mempool_forecaster::{MempoolForecaster, MEMPOOL_FORECAST_MAX_TARGET};
pub use node_interface::{
    BlockAssembler, BlockIndex, BlockTemplate, ChainState, FeeCalculation, Mempool,
    PolicyEstimator, PolicyEstimatorOptions, ValidationInterface,
};
pub use percentiles::{calculate_block_percentiles, Percentiles, PERCENTILE_CUTOFFS};
