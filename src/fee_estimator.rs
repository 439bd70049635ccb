use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::{
    block_forecaster::BLOCK_FORECAST_MAX_TARGET,
    error::ForecasterError,
    forecaster::{ConfirmationTarget, ForecastResponse, ForecastResult, ForecastType, Forecaster},
    node_interface::{FeeCalculation, Mempool, PolicyEstimator},
};

/// Registry and dispatcher for fee-rate forecasters.
///
/// Forecasters register under their [`ForecastType`]; an estimation request
/// fans out to every registered forecaster covering the target, and the
/// cheapest usable answer wins. Failures never abort a request: the caller
/// receives the selected response (if any) together with every diagnostic
/// the polled forecasters reported.
///
/// # Example
/// ```
/// use fee_forecaster::{ConfirmationTarget, FeeEstimator};
///
/// // A coordinator with no mempool attached reports why it cannot answer.
/// let estimator = FeeEstimator::new(None);
/// let (response, errors) = estimator.get_fee_estimate(ConfirmationTarget::blocks(1));
/// assert!(response.is_none());
/// assert_eq!(errors, vec!["Mempool not available.".to_string()]);
/// ```
pub struct FeeEstimator {
    forecasters: BTreeMap<ForecastType, Arc<dyn Forecaster>>,
    policy_estimator: Option<Box<dyn PolicyEstimator>>,
    mempool: Option<Arc<dyn Mempool>>,
}

impl FeeEstimator {
    /// Coordinator without a long-horizon policy estimator.
    pub fn new(mempool: Option<Arc<dyn Mempool>>) -> Self {
        Self {
            forecasters: BTreeMap::new(),
            policy_estimator: None,
            mempool,
        }
    }

    /// Coordinator with a long-horizon policy estimator attached.
    ///
    /// The estimator's persistence location and staleness policy are fixed
    /// at its own construction (see
    /// [`PolicyEstimatorOptions`](crate::PolicyEstimatorOptions)); the
    /// coordinator only ever queries it.
    pub fn with_policy_estimator(
        mempool: Option<Arc<dyn Mempool>>,
        policy_estimator: Box<dyn PolicyEstimator>,
    ) -> Self {
        Self {
            forecasters: BTreeMap::new(),
            policy_estimator: Some(policy_estimator),
            mempool,
        }
    }

    /// Registers `forecaster` under its type; a later registration replaces
    /// an earlier one. Registration is expected to finish before worker
    /// threads start asking for estimates.
    pub fn register_forecaster(&mut self, forecaster: Arc<dyn Forecaster>) {
        self.forecasters.insert(forecaster.forecast_type(), forecaster);
    }

    /// Largest confirmation target any registered forecaster covers.
    pub fn max_forecasting_target(&self) -> u32 {
        self.forecasters
            .values()
            .map(|forecaster| forecaster.max_target())
            .max()
            .unwrap_or(0)
    }

    /// Polls the registered forecasters for `target` and picks the cheapest
    /// usable forecast.
    ///
    /// The long-horizon policy estimator and the mempool forecaster are
    /// consulted first; between usable answers the lower `high_priority`
    /// rate wins, with ties kept by the mempool forecast. For targets the
    /// block forecaster covers, its answer substitutes when strictly
    /// cheaper or when nothing else was usable.
    ///
    /// The second element always carries every diagnostic collected during
    /// the request, whether or not a response was selected.
    pub fn get_fee_estimate(
        &self,
        target: ConfirmationTarget,
    ) -> (Option<ForecastResponse>, Vec<String>) {
        let mut err_messages: Vec<String> = Vec::new();

        if target.value == 0 {
            err_messages.push(ForecasterError::ZeroTarget.to_string());
            return (None, err_messages);
        }
        let Some(mempool) = &self.mempool else {
            err_messages.push(ForecasterError::MempoolUnavailable.to_string());
            return (None, err_messages);
        };
        if !mempool.load_tried() {
            err_messages.push(ForecasterError::MempoolNotLoaded.to_string());
            return (None, err_messages);
        }
        if mempool.size() == 0 {
            err_messages.push(ForecasterError::EmptyMempool.to_string());
            return (None, err_messages);
        }

        let policy_forecast = self
            .policy_estimator
            .as_deref()
            .map(|policy_estimator| Self::policy_estimator_forecast(policy_estimator, target));
        if let Some(result) = &policy_forecast {
            Self::collect_error(result, &mut err_messages);
        }

        let mempool_forecast = self
            .forecasters
            .get(&ForecastType::MempoolForecast)
            .map(|forecaster| forecaster.estimate_fee(target));
        if let Some(result) = &mempool_forecast {
            Self::collect_error(result, &mut err_messages);
        }

        // Cheapest usable high-priority rate wins; on a tie the mempool
        // forecast is kept.
        let mut selected: Option<ForecastResult> = None;
        for candidate in [mempool_forecast, policy_forecast].into_iter().flatten() {
            if candidate.is_empty() {
                continue;
            }
            match &selected {
                Some(current)
                    if candidate.response().high_priority
                        >= current.response().high_priority => {}
                _ => selected = Some(candidate),
            }
        }

        if target.value <= BLOCK_FORECAST_MAX_TARGET {
            if let Some(forecaster) = self.forecasters.get(&ForecastType::BlockForecast) {
                let candidate = forecaster.estimate_fee(target);
                Self::collect_error(&candidate, &mut err_messages);
                if !candidate.is_empty() {
                    match &selected {
                        Some(current)
                            if candidate.response().high_priority
                                >= current.response().high_priority => {}
                        _ => selected = Some(candidate),
                    }
                }
            }
        }

        let Some(selected) = selected else {
            return (None, err_messages);
        };
        let response = *selected.response();
        debug!(
            "{}: block height {}, low priority fee rate {}, high priority fee rate {}",
            response.forecaster,
            response.current_block_height,
            response.low_priority,
            response.high_priority,
        );
        (Some(response), err_messages)
    }

    fn collect_error(result: &ForecastResult, err_messages: &mut Vec<String>) {
        if let Some(error) = result.error() {
            err_messages.push(format!("{}: {}", result.response().forecaster, error));
        }
    }

    // Two smart-fee queries make up one forecast: the conservative rate is
    // the high-priority band, the economical one the low-priority band.
    fn policy_estimator_forecast(
        policy_estimator: &dyn PolicyEstimator,
        target: ConfirmationTarget,
    ) -> ForecastResult {
        let mut conservative_calc = FeeCalculation::default();
        let conservative_rate =
            policy_estimator.estimate_smart_fee(target, &mut conservative_calc, true);

        let mut economical_calc = FeeCalculation::default();
        let economical_rate =
            policy_estimator.estimate_smart_fee(target, &mut economical_calc, false);

        let current_block_height = conservative_calc.best_height;
        if conservative_rate.is_zero() || economical_rate.is_zero() {
            return ForecastResult::with_error(
                ForecastType::BlockPolicyEstimator,
                current_block_height,
                ForecasterError::NoFeeRateFound,
            );
        }

        ForecastResult::new(ForecastResponse {
            forecaster: ForecastType::BlockPolicyEstimator,
            current_block_height,
            low_priority: economical_rate.to_fee_frac(),
            high_priority: conservative_rate.to_fee_frac(),
        })
    }
}
