// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use crate::{Delays, InvalidArgument, constant_backoff, decorrelated_jitter_backoff, exponential_backoff};

/// Backoff configuration in plain numbers, suitable for configuration files.
///
/// Delays are expressed in (possibly fractional) milliseconds and the retry count is
/// signed, so values from untrusted sources can be represented and then rejected by
/// [`delays`][BackoffConfig::delays] with an [`InvalidArgument`] error.
///
/// With the `serde` feature the type is (de)serializable. The policy is selected by the
/// `type` field:
///
/// ```
/// # #[cfg(feature = "serde")]
/// # {
/// use std::time::Duration;
///
/// use retry_delays::BackoffConfig;
///
/// let config: BackoffConfig = serde_json::from_str(
///     r#"{ "type": "exponential", "initial_delay_ms": 100, "retry_count": 3 }"#,
/// )
/// .unwrap();
///
/// let delays: Vec<_> = config.delays().unwrap().collect();
/// assert_eq!(delays[2], Duration::from_millis(400));
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(any(feature = "serde", test), derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(any(feature = "serde", test), serde(tag = "type", rename_all = "snake_case"))]
pub enum BackoffConfig {
    /// See [`constant_backoff`].
    Constant {
        /// Delay between attempts, in milliseconds.
        delay_ms: f64,
        /// Number of delays to produce.
        retry_count: i64,
        /// Whether the first retry is immediate.
        #[cfg_attr(any(feature = "serde", test), serde(default))]
        fast_first: bool,
    },

    /// See [`exponential_backoff`].
    Exponential {
        /// First computed delay, in milliseconds.
        initial_delay_ms: f64,
        /// Number of delays to produce.
        retry_count: i64,
        /// Growth factor; defaults to [`DEFAULT_FACTOR`][crate::DEFAULT_FACTOR].
        #[cfg_attr(any(feature = "serde", test), serde(default = "default_factor"))]
        factor: f64,
        /// Whether the first retry is immediate.
        #[cfg_attr(any(feature = "serde", test), serde(default))]
        fast_first: bool,
    },

    /// See [`decorrelated_jitter_backoff`].
    DecorrelatedJitter {
        /// Lower bound of every delay, in milliseconds.
        min_delay_ms: f64,
        /// Upper bound of every delay, in milliseconds.
        max_delay_ms: f64,
        /// Number of delays to produce.
        retry_count: i64,
        /// Seed for reproducible sequences.
        #[cfg_attr(any(feature = "serde", test), serde(default))]
        seed: Option<u64>,
        /// Whether the first retry is immediate.
        #[cfg_attr(any(feature = "serde", test), serde(default))]
        fast_first: bool,
    },
}

#[cfg(any(feature = "serde", test))]
fn default_factor() -> f64 {
    crate::DEFAULT_FACTOR
}

impl BackoffConfig {
    /// Validates the configuration and creates the delay sequence.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`] for negative or non-finite milliseconds, a negative or
    /// oversized retry count, or any error of the underlying generator.
    pub fn delays(&self) -> Result<Delays, InvalidArgument> {
        match *self {
            Self::Constant {
                delay_ms,
                retry_count,
                fast_first,
            } => constant_backoff(millis("delay", delay_ms)?, retries(retry_count)?, fast_first),
            Self::Exponential {
                initial_delay_ms,
                retry_count,
                factor,
                fast_first,
            } => exponential_backoff(
                millis("initial_delay", initial_delay_ms)?,
                retries(retry_count)?,
                factor,
                fast_first,
            ),
            Self::DecorrelatedJitter {
                min_delay_ms,
                max_delay_ms,
                retry_count,
                seed,
                fast_first,
            } => decorrelated_jitter_backoff(
                millis("min_delay", min_delay_ms)?,
                millis("max_delay", max_delay_ms)?,
                retries(retry_count)?,
                seed,
                fast_first,
            ),
        }
    }
}

fn millis(parameter: &'static str, ms: f64) -> Result<Duration, InvalidArgument> {
    if !ms.is_finite() {
        return Err(InvalidArgument::new(parameter, ms, "must be a finite number of milliseconds"));
    }

    if ms < 0.0 {
        return Err(InvalidArgument::new(parameter, ms, "must not be negative"));
    }

    Duration::try_from_secs_f64(ms / 1000.0)
        .ok()
        .ok_or_else(|| InvalidArgument::new(parameter, ms, "must fit into a duration"))
}

fn retries(retry_count: i64) -> Result<u32, InvalidArgument> {
    if retry_count < 0 {
        return Err(InvalidArgument::new("retry_count", retry_count, "must not be negative"));
    }

    u32::try_from(retry_count)
        .ok()
        .ok_or_else(|| InvalidArgument::new("retry_count", retry_count, "must not exceed u32::MAX"))
}
