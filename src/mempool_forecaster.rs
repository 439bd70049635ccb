use std::sync::Arc;
use tracing::debug;

use crate::{
    cache::ForecastCache,
    error::ForecasterError,
    fee_frac::DEFAULT_BLOCK_MAX_WEIGHT,
    forecaster::{
        ConfirmationTarget, ForecastResponse, ForecastResult, ForecastType, Forecaster,
        TargetKind,
    },
    node_interface::{BlockAssembler, ChainState, Mempool},
    percentiles::calculate_block_percentiles,
};

/// Largest confirmation target the mempool forecaster answers for.
/// Mempool conditions drift too much to trust forecasts beyond it.
pub const MEMPOOL_FORECAST_MAX_TARGET: u32 = 2;

/// Forecasts the fee rate for inclusion within the next couple of blocks.
///
/// The forecaster asks the block assembler to compose a candidate next
/// block from the unconfirmed transactions, computes percentile fee rates
/// over that block, and answers with the 75th percentile as the low band
/// and the 50th as the high band. The percentile result is cached for
/// [`CACHE_LIFE`](crate::CACHE_LIFE) so bursts of requests do not rebuild
/// the block each time.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use fee_forecaster::{
///     BlockAssembler, ChainState, ConfirmationTarget, Forecaster, Mempool, MempoolForecaster,
/// };
///
/// # fn collaborators() -> (Arc<dyn ChainState>, Arc<dyn Mempool>, Arc<dyn BlockAssembler>) {
/// #     unimplemented!()
/// # }
/// let (chain_state, mempool, assembler) = collaborators();
/// let forecaster = MempoolForecaster::new(chain_state, mempool, assembler);
///
/// let result = forecaster.estimate_fee(ConfirmationTarget::blocks(1));
/// if !result.is_empty() {
///     println!(
///         "low {} / high {}",
///         result.response().low_priority,
///         result.response().high_priority,
///     );
/// }
/// ```
pub struct MempoolForecaster {
    chain_state: Arc<dyn ChainState>,
    mempool: Arc<dyn Mempool>,
    assembler: Arc<dyn BlockAssembler>,
    cache: ForecastCache,
}

impl MempoolForecaster {
    /// Creates a forecaster over the given node collaborators.
    pub fn new(
        chain_state: Arc<dyn ChainState>,
        mempool: Arc<dyn Mempool>,
        assembler: Arc<dyn BlockAssembler>,
    ) -> Self {
        Self {
            chain_state,
            mempool,
            assembler,
            cache: ForecastCache::new(),
        }
    }
}

impl Forecaster for MempoolForecaster {
    fn forecast_type(&self) -> ForecastType {
        ForecastType::MempoolForecast
    }

    fn max_target(&self) -> u32 {
        MEMPOOL_FORECAST_MAX_TARGET
    }

    fn estimate_fee(&self, target: ConfirmationTarget) -> ForecastResult {
        let Some(tip) = self.chain_state.active_tip() else {
            return ForecastResult::with_error(
                ForecastType::MempoolForecast,
                0,
                ForecasterError::NoActiveChainstate,
            );
        };
        let current_block_height = tip.height;

        if target.kind != TargetKind::Blocks {
            return ForecastResult::with_error(
                ForecastType::MempoolForecast,
                current_block_height,
                ForecasterError::UnsupportedTargetKind,
            );
        }
        if target.value == 0 {
            return ForecastResult::with_error(
                ForecastType::MempoolForecast,
                current_block_height,
                ForecasterError::ZeroTarget,
            );
        }
        if target.value > MEMPOOL_FORECAST_MAX_TARGET {
            return ForecastResult::with_error(
                ForecastType::MempoolForecast,
                current_block_height,
                ForecasterError::TargetAboveLimit {
                    target: target.value,
                    max: MEMPOOL_FORECAST_MAX_TARGET,
                },
            );
        }

        if !self.mempool.load_tried() {
            return ForecastResult::with_error(
                ForecastType::MempoolForecast,
                current_block_height,
                ForecasterError::MempoolNotLoaded,
            );
        }

        if let Some(cached) = self.cache.get() {
            return ForecastResult::new(ForecastResponse {
                forecaster: ForecastType::MempoolForecast,
                current_block_height,
                low_priority: cached.p75,
                high_priority: cached.p50,
            });
        }

        // The assembler locks chain state and mempool internally and hands
        // back owned data; percentile math below runs lock-free.
        let template = self.assembler.create_new_block();
        if template.fee_rate_histogram.is_empty() {
            return ForecastResult::with_error(
                ForecastType::MempoolForecast,
                current_block_height,
                ForecasterError::NotEnoughTransactions,
            );
        }

        let percentiles =
            calculate_block_percentiles(&template.fee_rate_histogram, DEFAULT_BLOCK_MAX_WEIGHT);
        if percentiles.is_empty() {
            return ForecastResult::with_error(
                ForecastType::MempoolForecast,
                current_block_height,
                ForecasterError::InsufficientMempoolData,
            );
        }

        debug!(
            "{}: next block 25th percentile fee rate {}, 50th percentile {}, 75th percentile {}, 95th percentile {}",
            ForecastType::MempoolForecast,
            percentiles.p25,
            percentiles.p50,
            percentiles.p75,
            percentiles.p95,
        );
        self.cache.update(percentiles);

        ForecastResult::new(ForecastResponse {
            forecaster: ForecastType::MempoolForecast,
            current_block_height,
            low_priority: percentiles.p75,
            high_priority: percentiles.p50,
        })
    }
}
