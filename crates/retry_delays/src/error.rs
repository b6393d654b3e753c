// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Display;

use ohno::OhnoCore;

/// Error returned when a backoff policy is given an out-of-range parameter.
///
/// The error is raised when the delay sequence is created, before any delay is produced,
/// and never while iterating. It identifies the offending parameter, the rejected value
/// and the constraint the value violated.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use retry_delays::exponential_backoff;
///
/// let error = exponential_backoff(Duration::from_millis(100), 3, 0.5, false).unwrap_err();
///
/// assert_eq!(error.parameter(), "factor");
/// assert_eq!(error.value(), "0.5");
/// ```
#[derive(ohno::Error)]
#[no_constructors]
#[display("invalid argument `{parameter}` = {value}: {constraint}")]
pub struct InvalidArgument {
    parameter: &'static str,
    value: String,
    constraint: &'static str,
    #[error]
    inner_error: OhnoCore,
}

impl InvalidArgument {
    pub(crate) fn new(parameter: &'static str, value: impl Display, constraint: &'static str) -> Self {
        Self {
            parameter,
            value: value.to_string(),
            constraint,
            inner_error: OhnoCore::default(),
        }
    }

    /// The name of the rejected parameter.
    #[must_use]
    pub fn parameter(&self) -> &'static str {
        self.parameter
    }

    /// The rejected value, rendered as text.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Human-readable description of the constraint the value violated.
    #[must_use]
    pub fn constraint(&self) -> &'static str {
        self.constraint
    }
}
