use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::debug;

use crate::{
    error::ForecasterError,
    fee_frac::{FeeRate, DEFAULT_BLOCK_MAX_WEIGHT},
    forecaster::{
        ConfirmationTarget, ForecastResponse, ForecastResult, ForecastType, Forecaster,
        TargetKind,
    },
    linearize::{linearize_transactions, RemovedTransaction},
    node_interface::ValidationInterface,
    percentiles::{calculate_block_percentiles, Percentiles},
};

/// Number of recent blocks whose percentiles feed the forecast.
pub const MAX_NUMBER_OF_BLOCKS: usize = 6;

/// Largest confirmation target the block forecaster answers for.
pub const BLOCK_FORECAST_MAX_TARGET: u32 = 1;

// Written only by the validation thread; read under the same lock on the
// estimate path.
#[derive(Debug, Default)]
struct BlockWindow {
    percentiles: VecDeque<Percentiles>,
    last_block_height: u32,
}

/// Forecasts the fee rate for as-soon-as-possible inclusion from the mining
/// scores of recently confirmed transactions.
///
/// The forecaster subscribes to block-connection notifications. Each block's
/// removed transactions are linearized into a mining-score histogram whose
/// percentiles enter a window covering the last [`MAX_NUMBER_OF_BLOCKS`]
/// blocks; an estimate averages the window, answering with the mean 75th
/// percentile as the low band and the mean 50th as the high band.
#[derive(Debug, Default)]
pub struct BlockForecaster {
    window: Mutex<BlockWindow>,
}

impl BlockForecaster {
    /// Creates a forecaster with an empty block window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of block percentile records currently held, at most
    /// [`MAX_NUMBER_OF_BLOCKS`].
    pub fn window_len(&self) -> usize {
        self.window.lock().percentiles.len()
    }
}

impl ValidationInterface for BlockForecaster {
    fn mempool_txs_removed_for_block(
        &self,
        txs_removed: &[RemovedTransaction],
        block_height: u32,
    ) {
        // Linearization and percentile math run before the lock is taken;
        // the critical section is a queue rotation.
        let histogram = linearize_transactions(txs_removed);
        let percentiles = calculate_block_percentiles(&histogram, DEFAULT_BLOCK_MAX_WEIGHT);

        let mut window = self.window.lock();
        window.last_block_height = block_height;
        if !percentiles.p75.is_empty() {
            if window.percentiles.len() == MAX_NUMBER_OF_BLOCKS {
                window.percentiles.pop_front();
            }
            window.percentiles.push_back(percentiles);
        }
    }
}

impl Forecaster for BlockForecaster {
    fn forecast_type(&self) -> ForecastType {
        ForecastType::BlockForecast
    }

    fn max_target(&self) -> u32 {
        BLOCK_FORECAST_MAX_TARGET
    }

    fn estimate_fee(&self, target: ConfirmationTarget) -> ForecastResult {
        let window = self.window.lock();
        let current_block_height = window.last_block_height;

        if target.kind != TargetKind::Blocks {
            return ForecastResult::with_error(
                ForecastType::BlockForecast,
                current_block_height,
                ForecasterError::UnsupportedTargetKind,
            );
        }
        if target.value == 0 {
            return ForecastResult::with_error(
                ForecastType::BlockForecast,
                current_block_height,
                ForecasterError::ZeroTarget,
            );
        }
        if target.value > BLOCK_FORECAST_MAX_TARGET {
            return ForecastResult::with_error(
                ForecastType::BlockForecast,
                current_block_height,
                ForecasterError::BlockTargetAboveLimit {
                    target: target.value,
                    max: BLOCK_FORECAST_MAX_TARGET,
                },
            );
        }
        if window.percentiles.len() < MAX_NUMBER_OF_BLOCKS {
            return ForecastResult::with_error(
                ForecastType::BlockForecast,
                current_block_height,
                ForecasterError::InsufficientBlockData,
            );
        }

        let mut sums = [0u64; 4];
        for percentiles in &window.percentiles {
            sums[0] += percentiles.p25.fee_per_kvb();
            sums[1] += percentiles.p50.fee_per_kvb();
            sums[2] += percentiles.p75.fee_per_kvb();
            sums[3] += percentiles.p95.fee_per_kvb();
        }
        drop(window);

        let [p25, p50, p75, p95] =
            sums.map(|sum| FeeRate::from_sat_per_kvb(sum / MAX_NUMBER_OF_BLOCKS as u64));
        debug!(
            "{}: last {} blocks 25th percentile fee rate {}, 50th percentile {}, 75th percentile {}, 95th percentile {}",
            ForecastType::BlockForecast,
            MAX_NUMBER_OF_BLOCKS,
            p25,
            p50,
            p75,
            p95,
        );

        ForecastResult::new(ForecastResponse {
            forecaster: ForecastType::BlockForecast,
            current_block_height,
            low_priority: p75.to_fee_frac(),
            high_priority: p50.to_fee_frac(),
        })
    }
}
