// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use crate::constants::{DEFAULT_FACTOR, MIN_FACTOR};
use crate::delays::{DelayKind, Delays, duration_to_ms};
use crate::{InvalidArgument, RandomSource};

/// A backoff policy: how the delay between retry attempts evolves.
///
/// Call [`delays`][BackoffPolicy::delays] to validate the policy and obtain a lazy
/// sequence of delays. The policy itself is immutable and can be reused to create any
/// number of independent sequences.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use retry_delays::BackoffPolicy;
///
/// let policy = BackoffPolicy::exponential(Duration::from_millis(100), 2.0);
/// let delays: Vec<_> = policy.delays(3, true)?.collect();
///
/// assert_eq!(
///     delays,
///     vec![Duration::ZERO, Duration::from_millis(100), Duration::from_millis(200)]
/// );
/// # Ok::<(), retry_delays::InvalidArgument>(())
/// ```
#[derive(Debug, Clone)]
pub enum BackoffPolicy {
    /// Every delay equals `delay`.
    ///
    /// **Example with `2s` delay:** `2s, 2s, 2s, 2s, ...`
    Constant {
        /// The delay between attempts.
        delay: Duration,
    },

    /// The delay at zero-based index `i` is `initial_delay * factor^i`.
    ///
    /// There is no upper bound on the delay; it saturates at [`Duration::MAX`].
    ///
    /// **Example with `2s` initial delay and factor `2.0`:** `2s, 4s, 8s, 16s, ...`
    Exponential {
        /// The first computed delay.
        initial_delay: Duration,
        /// Growth factor, at least `1.0`.
        factor: f64,
    },

    /// AWS-style decorrelated jitter.
    ///
    /// Each delay is drawn uniformly from `[min_delay, min(max_delay, previous * 3)]`,
    /// where `previous` starts at `min_delay`. Every delay lies within
    /// `[min_delay, max_delay]`.
    DecorrelatedJitter {
        /// Lower bound of every delay.
        min_delay: Duration,
        /// Upper bound of every delay, at least `min_delay`.
        max_delay: Duration,
        /// Where random draws come from.
        random: RandomSource,
    },
}

impl BackoffPolicy {
    /// Creates a constant policy.
    #[must_use]
    pub fn constant(delay: Duration) -> Self {
        Self::Constant { delay }
    }

    /// Creates an exponential policy. See [`DEFAULT_FACTOR`][crate::DEFAULT_FACTOR] for the
    /// conventional factor.
    #[must_use]
    pub fn exponential(initial_delay: Duration, factor: f64) -> Self {
        Self::Exponential { initial_delay, factor }
    }

    /// Creates a decorrelated jitter policy drawing from the thread-local generator.
    #[must_use]
    pub fn decorrelated_jitter(min_delay: Duration, max_delay: Duration) -> Self {
        Self::DecorrelatedJitter {
            min_delay,
            max_delay,
            random: RandomSource::default(),
        }
    }

    /// Replaces the source of randomness. Policies without randomness are returned unchanged.
    #[must_use]
    pub fn random(self, random: RandomSource) -> Self {
        match self {
            Self::DecorrelatedJitter { min_delay, max_delay, .. } => Self::DecorrelatedJitter {
                min_delay,
                max_delay,
                random,
            },
            other => other,
        }
    }

    /// Short `snake_case` name of the policy, used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Constant { .. } => "constant",
            Self::Exponential { .. } => "exponential",
            Self::DecorrelatedJitter { .. } => "decorrelated_jitter",
        }
    }

    /// Checks the policy parameters.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`] when the exponential `factor` is below `1.0` or not a
    /// number, or when `max_delay` is smaller than `min_delay`.
    pub fn validate(&self) -> Result<(), InvalidArgument> {
        match self {
            Self::Constant { .. } => Ok(()),
            Self::Exponential { factor, .. } => {
                if factor.is_nan() || *factor < MIN_FACTOR {
                    return Err(InvalidArgument::new("factor", factor, "must be greater than or equal to 1.0"));
                }
                Ok(())
            }
            Self::DecorrelatedJitter { min_delay, max_delay, .. } => {
                if max_delay < min_delay {
                    return Err(InvalidArgument::new(
                        "max_delay",
                        format!("{max_delay:?}"),
                        "must be greater than or equal to `min_delay`",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Validates the policy and returns a lazy sequence of `retry_count` delays.
    ///
    /// When `fast_first` is set and `retry_count` is at least one, the first delay is zero
    /// (an immediate retry) and the policy formula starts with the second delay. A
    /// `retry_count` of zero yields an empty sequence.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`] when [`validate`][Self::validate] fails. Validation
    /// happens here, never while iterating.
    pub fn delays(&self, retry_count: u32, fast_first: bool) -> Result<Delays, InvalidArgument> {
        if let Err(error) = self.validate() {
            log_rejected(self.name(), &error);
            return Err(error);
        }

        let kind = match self {
            Self::Constant { delay } => DelayKind::Constant(*delay),
            Self::Exponential { initial_delay, factor } => DelayKind::Exponential {
                initial_delay: *initial_delay,
                factor: *factor,
            },
            Self::DecorrelatedJitter {
                min_delay,
                max_delay,
                random,
            } => DelayKind::DecorrelatedJitter {
                min_delay: *min_delay,
                max_delay: *max_delay,
                prev_ms: duration_to_ms(*min_delay),
                rnd: random.rnd(),
            },
        };

        log_created(self.name(), retry_count, fast_first);
        Ok(Delays::new(kind, retry_count, fast_first))
    }
}

/// Returns `retry_count` copies of `delay`.
///
/// # Errors
///
/// Never fails today; the signature matches the other generators.
pub fn constant_backoff(delay: Duration, retry_count: u32, fast_first: bool) -> Result<Delays, InvalidArgument> {
    BackoffPolicy::constant(delay).delays(retry_count, fast_first)
}

/// Returns `retry_count` exponentially growing delays, `initial_delay * factor^i`.
///
/// Use [`DEFAULT_FACTOR`][crate::DEFAULT_FACTOR] for plain doubling.
///
/// # Errors
///
/// Returns [`InvalidArgument`] when `factor` is below `1.0` or not a number.
pub fn exponential_backoff(
    initial_delay: Duration,
    retry_count: u32,
    factor: f64,
    fast_first: bool,
) -> Result<Delays, InvalidArgument> {
    BackoffPolicy::exponential(initial_delay, factor).delays(retry_count, fast_first)
}

/// Returns `retry_count` decorrelated jitter delays within `[min_delay, max_delay]`.
///
/// With a `seed` the sequence is reproducible. Without one, draws come from the calling
/// thread's entropy-seeded generator.
///
/// # Errors
///
/// Returns [`InvalidArgument`] when `max_delay` is smaller than `min_delay`.
pub fn decorrelated_jitter_backoff(
    min_delay: Duration,
    max_delay: Duration,
    retry_count: u32,
    seed: Option<u64>,
    fast_first: bool,
) -> Result<Delays, InvalidArgument> {
    let random = seed.map_or_else(RandomSource::thread_local, RandomSource::with_seed);

    BackoffPolicy::decorrelated_jitter(min_delay, max_delay)
        .random(random)
        .delays(retry_count, fast_first)
}

impl Default for BackoffPolicy {
    /// Exponential doubling starting at one second.
    fn default() -> Self {
        Self::exponential(Duration::from_secs(1), DEFAULT_FACTOR)
    }
}

#[cfg_attr(
    not(any(feature = "logs", test)),
    expect(unused_variables, reason = "unused when logs feature not used")
)]
fn log_created(policy: &'static str, retry_count: u32, fast_first: bool) {
    #[cfg(any(feature = "logs", test))]
    tracing::event!(
        name: "retry_delays.created",
        tracing::Level::DEBUG,
        backoff.policy = policy,
        backoff.retry_count = retry_count,
        backoff.fast_first = fast_first,
    );
}

#[cfg_attr(
    not(any(feature = "logs", test)),
    expect(unused_variables, reason = "unused when logs feature not used")
)]
fn log_rejected(policy: &'static str, error: &InvalidArgument) {
    #[cfg(any(feature = "logs", test))]
    tracing::event!(
        name: "retry_delays.rejected",
        tracing::Level::DEBUG,
        backoff.policy = policy,
        backoff.parameter = error.parameter(),
        backoff.constraint = error.constraint(),
    );
}
