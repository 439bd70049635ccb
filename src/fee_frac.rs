use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Factor by which virtual size is scaled to weight units.
pub const WITNESS_SCALE_FACTOR: u64 = 4;

/// Nominal maximum block weight, the reference for percentile cutoffs.
pub const DEFAULT_BLOCK_MAX_WEIGHT: u64 = 4_000_000;

/// A fee amount paired with the virtual size paying it.
///
/// `FeeFrac` keeps the raw fraction instead of a divided-out rate so that
/// two fee rates can be compared by cross-multiplication without losing
/// precision. Equality and ordering follow the implied fee rate: two
/// fractions that reduce to the same rate are equal even when their fields
/// differ.
///
/// A fraction with a zero fee or a zero size is *empty*, the sentinel for
/// "no data".
///
/// # Example
/// ```
/// use fee_forecaster::FeeFrac;
///
/// let cheap = FeeFrac::new(1_000, 500);
/// let pricey = FeeFrac::new(5_000, 500);
/// assert!(cheap < pricey);
///
/// // Rate equality: 2 sat/vB either way.
/// assert_eq!(FeeFrac::new(1_000, 500), FeeFrac::new(2_000, 1_000));
/// assert_eq!(cheap.fee_per_kvb(), 2_000);
/// ```
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FeeFrac {
    /// Fee in the smallest currency unit (satoshis).
    pub fee: u64,

    /// Virtual size in vbytes.
    pub size: u64,
}

impl FeeFrac {
    /// The empty fraction, meaning "no data".
    pub const ZERO: FeeFrac = FeeFrac { fee: 0, size: 0 };

    /// Creates a fee fraction from a fee and a virtual size.
    pub const fn new(fee: u64, size: u64) -> Self {
        Self { fee, size }
    }

    /// Whether this fraction carries no usable rate.
    pub const fn is_empty(&self) -> bool {
        self.fee == 0 || self.size == 0
    }

    /// The fee rate normalized to satoshis per kilo-vbyte, truncating.
    ///
    /// Returns 0 for a zero-size fraction.
    pub fn fee_per_kvb(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        ((self.fee as u128 * 1_000) / self.size as u128) as u64
    }
}

impl PartialEq for FeeFrac {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FeeFrac {}

impl PartialOrd for FeeFrac {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FeeFrac {
    fn cmp(&self, other: &Self) -> Ordering {
        // fee_a/size_a <=> fee_b/size_b without division: cross-multiply in
        // u128 so the products cannot overflow.
        let lhs = self.fee as u128 * other.size as u128;
        let rhs = other.fee as u128 * self.size as u128;
        lhs.cmp(&rhs)
    }
}

impl fmt::Display for FeeFrac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} sat/kvB", self.fee_per_kvb())
    }
}

/// A fee rate flattened to satoshis per kilo-vbyte.
///
/// This is the shape fee rates take at the long-horizon policy estimator
/// seam; inside the engine computation stays on [`FeeFrac`] to avoid
/// rounding. The zero rate means "no data".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FeeRate(u64);

impl FeeRate {
    /// The "no data" sentinel.
    pub const ZERO: FeeRate = FeeRate(0);

    /// Creates a fee rate from satoshis per kilo-vbyte.
    pub const fn from_sat_per_kvb(sat_per_kvb: u64) -> Self {
        Self(sat_per_kvb)
    }

    /// The rate in satoshis per kilo-vbyte.
    pub const fn sat_per_kvb(self) -> u64 {
        self.0
    }

    /// Whether this is the "no data" sentinel.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// The rate as a fraction over one kilo-vbyte.
    pub const fn to_fee_frac(self) -> FeeFrac {
        FeeFrac::new(self.0, 1_000)
    }
}

impl From<FeeFrac> for FeeRate {
    fn from(frac: FeeFrac) -> Self {
        Self(frac.fee_per_kvb())
    }
}

impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} sat/kvB", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_is_exact() {
        // 1/3 vs 333333/1000000: division would round both to the same
        // float-ish rate, cross-multiplication keeps them apart.
        let third = FeeFrac::new(1, 3);
        let almost_third = FeeFrac::new(333_333, 1_000_000);
        assert!(almost_third < third);
    }

    #[test]
    fn test_rate_equality() {
        assert_eq!(FeeFrac::new(1, 2), FeeFrac::new(2, 4));
        assert_ne!(FeeFrac::new(1, 2), FeeFrac::new(2, 3));
    }

    #[test]
    fn test_is_empty() {
        assert!(FeeFrac::ZERO.is_empty());
        assert!(FeeFrac::new(0, 100).is_empty());
        assert!(FeeFrac::new(100, 0).is_empty());
        assert!(!FeeFrac::new(1, 1).is_empty());
    }

    #[test]
    fn test_fee_per_kvb_truncates() {
        assert_eq!(FeeFrac::new(1_000, 300).fee_per_kvb(), 3_333);
        assert_eq!(FeeFrac::new(5, 10_000).fee_per_kvb(), 0);
        assert_eq!(FeeFrac::new(7, 0).fee_per_kvb(), 0);
    }

    #[test]
    fn test_no_overflow_on_large_values() {
        let a = FeeFrac::new(u64::MAX, 1);
        let b = FeeFrac::new(u64::MAX, 2);
        assert!(b < a);
        assert_eq!(a.fee_per_kvb(), u64::MAX);
    }

    #[test]
    fn test_fee_rate_round_trip() {
        let rate = FeeRate::from_sat_per_kvb(2_500);
        assert_eq!(rate.to_fee_frac(), FeeFrac::new(2_500, 1_000));
        assert_eq!(FeeRate::from(FeeFrac::new(5_000, 2_000)), rate);
        assert!(FeeRate::ZERO.is_zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(FeeFrac::new(2_000, 1_000).to_string(), "2000 sat/kvB");
        assert_eq!(FeeRate::from_sat_per_kvb(15).to_string(), "15 sat/kvB");
    }
}
