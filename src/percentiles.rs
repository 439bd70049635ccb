use serde::{Deserialize, Serialize};

use crate::fee_frac::{FeeFrac, WITNESS_SCALE_FACTOR};

/// Cumulative-weight cutoffs, in percent of the reference block weight.
pub const PERCENTILE_CUTOFFS: [u64; 4] = [25, 50, 75, 95];

/// Fee rates at the cumulative-weight marks of a candidate block.
///
/// Each slot holds the fee fraction of the transaction at which cumulative
/// weight first reached the corresponding share of the reference maximum
/// block weight, scanning from the best mining score down. After
/// monotonicity correction `p25 >= p50 >= p75 >= p95` in fee-rate order:
/// the narrower the slice of the block, the higher the rate it paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    /// Fee rate at 25% of the reference weight.
    pub p25: FeeFrac,
    /// Fee rate at 50% of the reference weight.
    pub p50: FeeFrac,
    /// Fee rate at 75% of the reference weight.
    pub p75: FeeFrac,
    /// Fee rate at 95% of the reference weight.
    pub p95: FeeFrac,
}

impl Percentiles {
    /// Whether no percentile was reached.
    pub const fn is_empty(&self) -> bool {
        self.p25.is_empty()
            && self.p50.is_empty()
            && self.p75.is_empty()
            && self.p95.is_empty()
    }
}

/// Computes percentile fee rates over a histogram of per-transaction fee
/// fractions ordered by descending mining score.
///
/// Each entry contributes `size * WITNESS_SCALE_FACTOR` weight units; a
/// percentile slot records the entry at which the running total first
/// crossed its cutoff (fraction of `total_weight`). If the scan ends before
/// the widest cutoff is crossed there is not enough data and the empty
/// `Percentiles` is returned.
///
/// Mining-score order is not monotone in raw fee rate (a package can place
/// a high-rate child behind a low-rate parent), so after the scan each
/// wider percentile is capped at its narrower neighbour.
pub fn calculate_block_percentiles(
    fee_rate_histogram: &[FeeFrac],
    total_weight: u64,
) -> Percentiles {
    let cutoff_weights = PERCENTILE_CUTOFFS.map(|percent| total_weight * percent / 100);
    let mut slots = [FeeFrac::ZERO; 4];

    let mut cumulative_weight: u64 = 0;
    for entry in fee_rate_histogram {
        cumulative_weight =
            cumulative_weight.saturating_add(entry.size.saturating_mul(WITNESS_SCALE_FACTOR));
        for (slot, cutoff) in slots.iter_mut().zip(cutoff_weights) {
            if cumulative_weight >= cutoff && slot.is_empty() {
                *slot = *entry;
            }
        }
    }

    if slots[3].is_empty() {
        return Percentiles::default();
    }

    for i in 1..slots.len() {
        if slots[i] > slots[i - 1] {
            slots[i] = slots[i - 1];
        }
    }

    Percentiles {
        p25: slots[0],
        p50: slots[1],
        p75: slots[2],
        p95: slots[3],
    }
}
