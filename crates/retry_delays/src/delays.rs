// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::iter::FusedIterator;
use std::time::Duration;

use crate::constants::{JITTER_GROWTH, MIN_FACTOR};
use crate::rnd::Rnd;

/// A lazy, finite sequence of retry delays.
///
/// Created by [`BackoffPolicy::delays`][crate::BackoffPolicy::delays] or one of the
/// factory functions such as [`exponential_backoff`][crate::exponential_backoff]. Every
/// delay is computed when it is requested, so stopping early costs nothing. The sequence
/// cannot be restarted; create a new one from the same policy instead.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use retry_delays::constant_backoff;
///
/// let delays: Vec<_> = constant_backoff(Duration::from_millis(200), 3, false)?.collect();
///
/// assert_eq!(delays, vec![Duration::from_millis(200); 3]);
/// # Ok::<(), retry_delays::InvalidArgument>(())
/// ```
#[derive(Debug)]
pub struct Delays {
    kind: DelayKind,
    remaining: u32,
    fast_first: bool,
    // Zero-based index among computed delays; fast-first zeros do not advance it.
    index: u32,
}

#[derive(Debug)]
pub(crate) enum DelayKind {
    Constant(Duration),
    Exponential {
        initial_delay: Duration,
        factor: f64,
    },
    DecorrelatedJitter {
        min_delay: Duration,
        max_delay: Duration,
        // The previous draw in milliseconds; starts at the minimum delay.
        prev_ms: f64,
        rnd: Rnd,
    },
}

impl Delays {
    /// Creates the sequence from already validated parameters.
    pub(crate) fn new(kind: DelayKind, retry_count: u32, fast_first: bool) -> Self {
        Self {
            kind,
            remaining: retry_count,
            fast_first,
            index: 0,
        }
    }

    fn compute(&mut self) -> Duration {
        match &mut self.kind {
            DelayKind::Constant(delay) => *delay,
            DelayKind::Exponential { initial_delay, factor } => exponential(*initial_delay, *factor, self.index),
            DelayKind::DecorrelatedJitter {
                min_delay,
                max_delay,
                prev_ms,
                rnd,
            } => decorrelated_jitter(*min_delay, *max_delay, prev_ms, rnd),
        }
    }
}

impl Iterator for Delays {
    type Item = Duration;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        self.remaining -= 1;

        if self.fast_first {
            self.fast_first = false;
            return Some(Duration::ZERO);
        }

        let delay = self.compute();
        self.index = self.index.saturating_add(1);
        Some(delay)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Delays {}

impl FusedIterator for Delays {}

/// `initial_delay * factor^index`, saturating at [`Duration::MAX`].
fn exponential(initial_delay: Duration, factor: f64, index: u32) -> Duration {
    // zero initial delay => always zero, even when the power overflows to infinity
    if initial_delay.is_zero() {
        return Duration::ZERO;
    }

    // the first delay and identity growth are exact, without a round trip through f64
    if index == 0 || factor == MIN_FACTOR {
        return initial_delay;
    }

    let pow = factor.powi(i32::try_from(index).unwrap_or(i32::MAX));
    secs_to_duration_saturating(initial_delay.as_secs_f64() * pow)
}

/// AWS decorrelated jitter: a uniform draw from `[min, min(max, prev * 3)]`.
///
/// The upper bound follows the previous draw instead of the attempt number, so delays grow
/// in a randomized way but can also shrink back towards the minimum. The draw itself is
/// never clamped; the final clamp only absorbs floating point rounding.
fn decorrelated_jitter(min_delay: Duration, max_delay: Duration, prev_ms: &mut f64, rnd: &mut Rnd) -> Duration {
    let min_ms = duration_to_ms(min_delay);
    let max_ms = duration_to_ms(max_delay);

    let ceiling = max_ms.min(*prev_ms * JITTER_GROWTH);
    let drawn = (ceiling - min_ms).mul_add(rnd.next_f64(), min_ms);
    *prev_ms = drawn;

    secs_to_duration_saturating(drawn / 1000.0).clamp(min_delay, max_delay)
}

pub(crate) fn duration_to_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

fn secs_to_duration_saturating(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }

    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use static_assertions::assert_impl_all;

    use super::*;
    use crate::RandomSource;

    assert_impl_all!(Delays: Send, Sync);

    fn jitter(min_ms: u64, max_ms: u64, source: &RandomSource) -> DelayKind {
        let min_delay = Duration::from_millis(min_ms);
        DelayKind::DecorrelatedJitter {
            min_delay,
            max_delay: Duration::from_millis(max_ms),
            prev_ms: duration_to_ms(min_delay),
            rnd: source.rnd(),
        }
    }

    #[test]
    fn constant_repeats_delay() {
        let delays = Delays::new(DelayKind::Constant(Duration::from_millis(200)), 3, false);

        assert_eq!(delays.collect::<Vec<_>>(), vec![Duration::from_millis(200); 3]);
    }

    #[test]
    fn exponential_doubles() {
        let kind = DelayKind::Exponential {
            initial_delay: Duration::from_millis(100),
            factor: 2.0,
        };
        let v: Vec<_> = Delays::new(kind, 4, false).collect();

        assert_eq!(
            v,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(800),
            ]
        );
    }

    #[test]
    fn exponential_is_not_capped() {
        let kind = DelayKind::Exponential {
            initial_delay: Duration::from_secs(1),
            factor: 10.0,
        };
        let last = Delays::new(kind, 7, false).last().unwrap();

        assert_eq!(last, Duration::from_secs(1_000_000));
    }

    #[test]
    fn exponential_saturates_on_overflow() {
        assert_eq!(exponential(Duration::from_secs(1), 2.0, 10_000), Duration::MAX);
        assert_eq!(exponential(Duration::from_secs(1), f64::INFINITY, 1), Duration::MAX);
    }

    #[test]
    fn exponential_keeps_nanosecond_precision() {
        let initial_delay = Duration::new(1 << 40, 1);

        assert_eq!(exponential(initial_delay, 2.0, 0), initial_delay);
        assert_eq!(exponential(initial_delay, 1.0, 0), initial_delay);
        assert_eq!(exponential(initial_delay, 1.0, 7), initial_delay);
    }

    #[test]
    fn exponential_zero_initial_delay_stays_zero() {
        assert_eq!(exponential(Duration::ZERO, 2.0, 10_000), Duration::ZERO);
        assert_eq!(exponential(Duration::ZERO, f64::INFINITY, 3), Duration::ZERO);
    }

    #[test]
    fn fast_first_emits_zero_then_restarts_formula() {
        let kind = DelayKind::Exponential {
            initial_delay: Duration::from_millis(100),
            factor: 2.0,
        };
        let v: Vec<_> = Delays::new(kind, 3, true).collect();

        assert_eq!(v, vec![Duration::ZERO, Duration::from_millis(100), Duration::from_millis(200)]);
    }

    #[test]
    fn fast_first_with_single_retry_is_only_zero() {
        let v: Vec<_> = Delays::new(DelayKind::Constant(Duration::from_secs(1)), 1, true).collect();

        assert_eq!(v, vec![Duration::ZERO]);
    }

    #[test]
    fn zero_retries_is_empty() {
        let mut delays = Delays::new(DelayKind::Constant(Duration::from_secs(1)), 0, true);

        assert_eq!(delays.len(), 0);
        assert_eq!(delays.next(), None);
    }

    #[test]
    fn len_tracks_remaining_and_fuses() {
        let mut delays = Delays::new(DelayKind::Constant(Duration::from_secs(1)), 2, true);
        assert_eq!(delays.len(), 2);

        delays.next();
        assert_eq!(delays.len(), 1);

        delays.next();
        assert_eq!(delays.len(), 0);

        assert_eq!(delays.next(), None);
        assert_eq!(delays.next(), None);
    }

    #[test]
    fn jitter_draw_at_lower_end_returns_min() {
        let v: Vec<_> = Delays::new(jitter(10, 1000, &RandomSource::new_fixed(0.0)), 4, false).collect();

        assert_eq!(v, vec![Duration::from_millis(10); 4]);
    }

    #[test]
    fn jitter_ceiling_triples_previous_draw() {
        // with draws approaching 1.0 the delays approach 10 * 3^n until the cap is hit
        let v: Vec<_> = Delays::new(jitter(10, 1000, &RandomSource::new_fixed(1.0)), 6, false).collect();

        assert_eq!(
            v,
            vec![
                Duration::from_millis(30),
                Duration::from_millis(90),
                Duration::from_millis(270),
                Duration::from_millis(810),
                Duration::from_millis(1000),
                Duration::from_millis(1000),
            ]
        );
    }

    #[test]
    fn jitter_midpoint_draw() {
        // [10, 30] at 0.5 => 20, then [10, 60] at 0.5 => 35
        let v: Vec<_> = Delays::new(jitter(10, 1000, &RandomSource::new_fixed(0.5)), 2, false).collect();

        assert_eq!(v, vec![Duration::from_millis(20), Duration::from_millis(35)]);
    }

    #[test]
    fn jitter_can_recover_towards_min() {
        let calls = AtomicU32::new(0);
        let source = RandomSource::new_function(move || {
            // alternates between the top and the bottom of the interval
            if calls.fetch_add(1, Ordering::Relaxed) % 2 == 0 { 1.0 } else { 0.0 }
        });
        let v: Vec<_> = Delays::new(jitter(10, 1000, &source), 2, false).collect();

        assert_eq!(v, vec![Duration::from_millis(30), Duration::from_millis(10)]);
    }

    #[test]
    fn jitter_with_equal_bounds_is_constant() {
        let v: Vec<_> = Delays::new(jitter(50, 50, &RandomSource::thread_local()), 5, false).collect();

        assert_eq!(v, vec![Duration::from_millis(50); 5]);
    }

    #[test]
    fn jitter_with_zero_min_stays_zero() {
        let v: Vec<_> = Delays::new(jitter(0, 1000, &RandomSource::thread_local()), 5, false).collect();

        assert_eq!(v, vec![Duration::ZERO; 5]);
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let min = Duration::from_millis(7);
        let max = Duration::from_millis(333);

        for seed in 0..200 {
            for delay in Delays::new(jitter(7, 333, &RandomSource::with_seed(seed)), 20, false) {
                assert!(delay >= min && delay <= max, "delay {delay:?} out of bounds for seed {seed}");
            }
        }
    }

    #[test]
    fn secs_to_duration_edge_cases() {
        assert_eq!(secs_to_duration_saturating(-1.0), Duration::ZERO);
        assert_eq!(secs_to_duration_saturating(f64::NAN), Duration::ZERO);
        assert_eq!(secs_to_duration_saturating(f64::INFINITY), Duration::MAX);
        assert_eq!(secs_to_duration_saturating(1.5), Duration::from_millis(1500));
    }
}
