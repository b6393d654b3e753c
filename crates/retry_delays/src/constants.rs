// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Default growth factor of the exponential policy.
///
/// Doubling the delay on every attempt is the conventional exponential backoff.
pub const DEFAULT_FACTOR: f64 = 2.0;

/// Smallest accepted growth factor of the exponential policy.
///
/// Smaller factors would make the sequence decrease.
pub(crate) const MIN_FACTOR: f64 = 1.0;

/// How much the upper bound of a decorrelated jitter draw may grow relative to the
/// previous draw.
///
/// See [Exponential Backoff and Jitter](https://aws.amazon.com/blogs/architecture/exponential-backoff-and-jitter).
pub(crate) const JITTER_GROWTH: f64 = 3.0;
