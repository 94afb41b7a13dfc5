use crate::event_log::EventLog;

/// Clicks counted within the trailing window at one instant.
pub type RateSample = u32;

/// Stateless: the cached "current rate" belongs to whoever calls this.
pub struct RateCalculator;

impl RateCalculator {
    pub fn evaluate(log: &EventLog, now: u64, window: u64) -> RateSample {
        let count = log.count_since(now, window);
        RateSample::try_from(count).unwrap_or(RateSample::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn no_clicks_reads_zero() {
        let log = EventLog::new();
        for now in [0, 1, 5_000, 1_000_000] {
            assert_eq!(RateCalculator::evaluate(&log, now, 5_000), 0);
        }
    }

    #[test]
    fn boundary_event_ages_out_at_exactly_window() {
        let mut log = EventLog::new();
        log.append(1_000);
        assert_eq!(RateCalculator::evaluate(&log, 5_999, 5_000), 1);
        assert_eq!(RateCalculator::evaluate(&log, 6_000, 5_000), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn matches_brute_force_count(
            stamps in prop::collection::vec(0u64..100_000, 0..200),
            now in 0u64..120_000,
            window in 1u64..80_000,
        ) {
            let mut log = EventLog::new();
            for &t in &stamps {
                log.append(t);
            }
            let expected = stamps
                .iter()
                .filter(|&&t| (now as i128 - window as i128) < t as i128 && t <= now)
                .count() as u32;

            let first = RateCalculator::evaluate(&log, now, window);
            prop_assert_eq!(first, expected);
            prop_assert!(first as usize <= log.len());
            // No append in between: same answer
            prop_assert_eq!(RateCalculator::evaluate(&log, now, window), first);
        }
    }
}
