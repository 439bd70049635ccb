use parking_lot::RwLock;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::percentiles::Percentiles;

/// How long a cached percentile result stays usable.
pub const CACHE_LIFE: Duration = Duration::from_secs(30);

/// The most recent percentile result and when it was computed.
#[derive(Debug, Clone, Copy)]
struct CachedEstimate {
    percentiles: Percentiles,
    last_updated: Instant,
}

/// Time-bounded memoization of the latest percentile result.
///
/// Building a candidate block is the expensive step of a mempool forecast;
/// under bursty request load the cache answers instead, as long as the
/// entry is younger than [`CACHE_LIFE`]. Readers share the lock and a
/// writer is serialized against them. The cache starts without an entry,
/// and a stale entry is hidden from readers rather than removed.
#[derive(Debug)]
pub(crate) struct ForecastCache {
    entry: RwLock<Option<CachedEstimate>>,
    life: Duration,
}

impl ForecastCache {
    pub(crate) fn new() -> Self {
        Self::with_life(CACHE_LIFE)
    }

    fn with_life(life: Duration) -> Self {
        Self {
            entry: RwLock::new(None),
            life,
        }
    }

    /// The cached percentiles, unless absent or stale.
    pub(crate) fn get(&self) -> Option<Percentiles> {
        let entry = self.entry.read();
        let cached = entry.as_ref()?;
        if cached.last_updated.elapsed() > self.life {
            return None;
        }
        debug!("forecast cache is not stale, using cached value");
        Some(cached.percentiles)
    }

    /// Overwrites the cached percentiles and restamps the entry.
    pub(crate) fn update(&self, percentiles: Percentiles) {
        let mut entry = self.entry.write();
        *entry = Some(CachedEstimate {
            percentiles,
            last_updated: Instant::now(),
        });
        debug!("forecast cache updated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fee_frac::FeeFrac;

    fn sample_percentiles(fee: u64) -> Percentiles {
        let frac = FeeFrac::new(fee, 250);
        Percentiles {
            p25: frac,
            p50: frac,
            p75: frac,
            p95: frac,
        }
    }

    #[test]
    fn test_starts_stale() {
        let cache = ForecastCache::new();
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_update_then_get() {
        let cache = ForecastCache::new();
        cache.update(sample_percentiles(500));
        assert_eq!(cache.get(), Some(sample_percentiles(500)));
    }

    #[test]
    fn test_update_overwrites() {
        let cache = ForecastCache::new();
        cache.update(sample_percentiles(500));
        cache.update(sample_percentiles(900));
        assert_eq!(cache.get(), Some(sample_percentiles(900)));
    }

    #[test]
    fn test_stale_entry_is_hidden() {
        let cache = ForecastCache::with_life(Duration::ZERO);
        cache.update(sample_percentiles(500));
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_concurrent_readers() {
        use std::sync::Arc;

        let cache = Arc::new(ForecastCache::new());
        cache.update(sample_percentiles(123));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        assert_eq!(cache.get(), Some(sample_percentiles(123)));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("reader thread panicked");
        }
    }
}
