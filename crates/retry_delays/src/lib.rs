// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Lazy, validated sequences of retry delays.
//!
//! This crate computes how long a retry loop should wait between attempts. It does not
//! run the retry loop itself: it hands out a finite [`Iterator`] of [`Duration`] values
//! that the caller consumes, one delay per retry.
//!
//! # Policies
//!
//! - **Constant**: every delay is the same. See [`constant_backoff`].
//! - **Exponential**: `initial_delay * factor^i`, without an upper bound. See [`exponential_backoff`].
//! - **Decorrelated jitter**: AWS-style randomized delays within `[min_delay, max_delay]`,
//!   where each draw is bounded by three times the previous one. See
//!   [`decorrelated_jitter_backoff`].
//!
//! All three are variants of [`BackoffPolicy`], evaluated by [`BackoffPolicy::delays`].
//!
//! # Quick Start
//!
//! ```rust
//! use std::time::Duration;
//!
//! use retry_delays::{DEFAULT_FACTOR, exponential_backoff};
//!
//! let delays: Vec<_> = exponential_backoff(Duration::from_millis(100), 4, DEFAULT_FACTOR, false)?.collect();
//!
//! assert_eq!(
//!     delays,
//!     vec![
//!         Duration::from_millis(100),
//!         Duration::from_millis(200),
//!         Duration::from_millis(400),
//!         Duration::from_millis(800),
//!     ]
//! );
//! # Ok::<(), retry_delays::InvalidArgument>(())
//! ```
//!
//! # Sequence Contract
//!
//! - Parameters are validated when the sequence is created. Invalid parameters produce an
//!   [`InvalidArgument`] error, even when zero delays are requested. No error is ever
//!   raised while iterating.
//! - A sequence yields exactly `retry_count` delays.
//! - With `fast_first`, the first delay is [`Duration::ZERO`] and the policy formula starts
//!   with the second delay.
//! - Delays are computed on demand. A sequence cannot be restarted; create a new one from
//!   the same policy instead.
//!
//! # Randomness
//!
//! The decorrelated jitter policy draws from a [`RandomSource`]. By default every thread
//! uses its own entropy-seeded generator, so concurrent sequences are independent. A seed
//! makes a sequence reproducible, and a [`SharedRandom`] lets several sequences draw from
//! one synchronized generator.
//!
//! # Features
//!
//! - `serde`: Makes [`BackoffConfig`] (de)serializable.
//! - `logs`: Emits `tracing` events when sequences are created or rejected.
//!
//! [`Duration`]: std::time::Duration
//! [`Duration::ZERO`]: std::time::Duration::ZERO

mod config;
mod constants;
mod delays;
mod error;
mod policy;
mod rnd;

pub use config::BackoffConfig;
pub use constants::DEFAULT_FACTOR;
pub use delays::Delays;
pub use error::InvalidArgument;
pub use policy::{BackoffPolicy, constant_backoff, decorrelated_jitter_backoff, exponential_backoff};
pub use rnd::{RandomSource, SharedRandom};
