use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{error::ForecasterError, fee_frac::FeeFrac};

/// Unit in which a confirmation target is expressed.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    /// A number of future blocks.
    Blocks,
}

/// The horizon within which a transaction should confirm.
///
/// # Example
/// ```
/// use fee_forecaster::{ConfirmationTarget, TargetKind};
///
/// let target = ConfirmationTarget::blocks(2);
/// assert_eq!(target.value, 2);
/// assert_eq!(target.kind, TargetKind::Blocks);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationTarget {
    /// How many units of `kind` away the desired confirmation is.
    pub value: u32,

    /// The unit `value` is measured in.
    pub kind: TargetKind,
}

impl ConfirmationTarget {
    /// A target of `value` blocks.
    pub const fn blocks(value: u32) -> Self {
        Self {
            value,
            kind: TargetKind::Blocks,
        }
    }
}

/// Identifies a forecaster kind; the key of the coordinator's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ForecastType {
    /// Forecast derived from a candidate block built out of the mempool.
    MempoolForecast,
    /// The long-horizon policy estimator supplied by the embedding node.
    BlockPolicyEstimator,
    /// Forecast derived from recently mined blocks.
    BlockForecast,
}

impl fmt::Display for ForecastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ForecastType::MempoolForecast => "Mempool Forecast",
            ForecastType::BlockPolicyEstimator => "Block Policy Estimator",
            ForecastType::BlockForecast => "Block Forecast",
        };
        f.write_str(name)
    }
}

/// The fee-rate bands a forecaster answers with.
///
/// `low_priority` is the looser band (slower confirmation is acceptable),
/// `high_priority` the faster one; when the response is non-empty
/// `low_priority <= high_priority` holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    /// Which forecaster produced this response.
    pub forecaster: ForecastType,

    /// Chain height the forecast was made at.
    pub current_block_height: u32,

    /// Fee rate for callers content with slower inclusion.
    pub low_priority: FeeFrac,

    /// Fee rate for callers wanting fast inclusion.
    pub high_priority: FeeFrac,
}

impl ForecastResponse {
    /// A response carrying no fee rates, used when a forecaster fails.
    pub const fn empty(forecaster: ForecastType, current_block_height: u32) -> Self {
        Self {
            forecaster,
            current_block_height,
            low_priority: FeeFrac::ZERO,
            high_priority: FeeFrac::ZERO,
        }
    }

    /// Whether both fee-rate bands are empty.
    pub const fn is_empty(&self) -> bool {
        self.low_priority.is_empty() && self.high_priority.is_empty()
    }
}

/// Outcome of polling one forecaster: a usable response, or an empty
/// response plus the diagnostic explaining why.
///
/// Non-empty results are ranked by their `high_priority` band; the lower
/// one is the better (cheaper) forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    response: ForecastResponse,
    error: Option<ForecasterError>,
}

impl ForecastResult {
    /// Wraps a successful response.
    pub const fn new(response: ForecastResponse) -> Self {
        Self {
            response,
            error: None,
        }
    }

    /// An empty result carrying `error`. The block height is still recorded
    /// so callers can tell which tip the attempt was made against.
    pub const fn with_error(
        forecaster: ForecastType,
        current_block_height: u32,
        error: ForecasterError,
    ) -> Self {
        Self {
            response: ForecastResponse::empty(forecaster, current_block_height),
            error: Some(error),
        }
    }

    /// The response, empty when the forecaster failed.
    pub const fn response(&self) -> &ForecastResponse {
        &self.response
    }

    /// The diagnostic, if the forecaster failed.
    pub const fn error(&self) -> Option<&ForecasterError> {
        self.error.as_ref()
    }

    /// Whether the response carries no fee rates.
    pub const fn is_empty(&self) -> bool {
        self.response.is_empty()
    }

    /// Unwraps into the response, dropping any diagnostic.
    pub fn into_response(self) -> ForecastResponse {
        self.response
    }
}

/// A source of fee-rate forecasts.
///
/// Implementations draw on one signal each (unconfirmed mempool contents,
/// recently mined blocks, ...) and report failures as values inside the
/// returned [`ForecastResult`] rather than through `Err`.
pub trait Forecaster: Send + Sync {
    /// The registry key identifying this forecaster.
    fn forecast_type(&self) -> ForecastType;

    /// The largest confirmation target this forecaster will answer for.
    fn max_target(&self) -> u32;

    /// Produces a forecast for `target`.
    fn estimate_fee(&self, target: ConfirmationTarget) -> ForecastResult;
}
