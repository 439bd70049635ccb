use thiserror::Error;

/// Diagnostic reported when a forecaster cannot produce a usable estimate.
///
/// Forecast failures are ordinary values: they travel inside a
/// [`ForecastResult`](crate::ForecastResult) next to an empty response
/// rather than aborting the request, and the coordinator hands the caller
/// every message collected from the forecasters it polled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForecasterError {
    /// The requested confirmation target was zero.
    #[error("Confirmation target must be greater than zero")]
    ZeroTarget,

    /// The requested target is expressed in a unit the forecaster does not
    /// understand.
    #[error("Forecaster can only provide an estimate for block targets")]
    UnsupportedTargetKind,

    /// The requested target is beyond the mempool forecaster's horizon.
    #[error("Confirmation target {target} is above the maximum limit of {max}, mempool conditions might change and forecasts above {max} blocks may be unreliable")]
    TargetAboveLimit { target: u32, max: u32 },

    /// The requested target is beyond the block forecaster's horizon.
    #[error("Confirmation target {target} is above the maximum limit of {max}")]
    BlockTargetAboveLimit { target: u32, max: u32 },

    /// No active chain state to read the tip from.
    #[error("No active chainstate available")]
    NoActiveChainstate,

    /// The candidate next block came back with no transactions.
    #[error("No enough transactions in the mempool to provide a fee rate forecast")]
    NotEnoughTransactions,

    /// The candidate block never accumulated enough weight to reach the
    /// widest percentile cutoff.
    #[error("Forecaster unable to provide an estimate due to insufficient data")]
    InsufficientMempoolData,

    /// The mined-block window has not filled up yet.
    #[error("Insufficient block data to perform an estimate")]
    InsufficientBlockData,

    /// The long-horizon policy estimator returned the zero rate.
    #[error("Insufficient data or no feerate found")]
    NoFeeRateFound,

    /// The coordinator has no mempool collaborator attached.
    #[error("Mempool not available.")]
    MempoolUnavailable,

    /// The mempool has not attempted its initial load.
    #[error("Mempool not finished loading; can't get accurate fee rate forecast")]
    MempoolNotLoaded,

    /// The mempool is loaded but holds no transactions.
    #[error("No transactions available in the mempool")]
    EmptyMempool,
}
