// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::Mutex;

/// Source of randomness for the decorrelated jitter policy.
///
/// The generators used here are **NOT cryptographically secure**. Jitter only needs
/// uniformly distributed values, so a fast non-cryptographic generator is used.
///
/// - [`RandomSource::thread_local`] (the default) draws from a per-thread generator seeded
///   from system entropy. Sequences running on different threads never share state and
///   therefore never produce correlated delays.
/// - [`RandomSource::with_seed`] gives every created sequence its own generator seeded
///   with the given value. Two sequences created from the same seed are identical.
/// - [`RandomSource::shared`] draws from a [`SharedRandom`] that may be used by many
///   sequences, possibly on different threads. Each draw is atomic.
#[derive(Clone, Default)]
pub struct RandomSource(Source);

#[derive(Clone, Default)]
enum Source {
    #[default]
    ThreadLocal,
    Seeded(u64),
    Shared(SharedRandom),
    #[cfg(test)]
    Test(Arc<dyn Fn() -> f64 + Send + Sync>),
}

impl Debug for RandomSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Source::ThreadLocal => write!(f, "ThreadLocal"),
            Source::Seeded(seed) => write!(f, "Seeded({seed})"),
            Source::Shared(_) => write!(f, "Shared"),
            #[cfg(test)]
            Source::Test(_) => write!(f, "Test"),
        }
    }
}

impl RandomSource {
    /// Draws from the calling thread's generator, seeded from system entropy.
    #[must_use]
    pub fn thread_local() -> Self {
        Self(Source::ThreadLocal)
    }

    /// Gives each created sequence a private generator seeded with `seed`.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self(Source::Seeded(seed))
    }

    /// Draws from a generator shared with other sequences.
    #[must_use]
    pub fn shared(random: &SharedRandom) -> Self {
        Self(Source::Shared(random.clone()))
    }

    #[cfg(test)]
    pub(crate) fn new_fixed(value: f64) -> Self {
        Self(Source::Test(Arc::new(move || value)))
    }

    #[cfg(test)]
    pub(crate) fn new_function<F>(f: F) -> Self
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        Self(Source::Test(Arc::new(f)))
    }

    /// Creates the per-sequence generator state.
    pub(crate) fn rnd(&self) -> Rnd {
        match &self.0 {
            Source::ThreadLocal => Rnd::ThreadLocal,
            Source::Seeded(seed) => Rnd::Owned(fastrand::Rng::with_seed(*seed)),
            Source::Shared(shared) => Rnd::Shared(shared.clone()),
            #[cfg(test)]
            Source::Test(generator) => Rnd::Test(Arc::clone(generator)),
        }
    }
}

/// A generator that can be shared by many delay sequences across threads.
///
/// Cloning the handle shares the underlying generator.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use retry_delays::{BackoffPolicy, RandomSource, SharedRandom};
///
/// let shared = SharedRandom::with_seed(7);
/// let policy = BackoffPolicy::decorrelated_jitter(Duration::from_millis(10), Duration::from_secs(1))
///     .random(RandomSource::shared(&shared));
///
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let policy = policy.clone();
///         std::thread::spawn(move || policy.delays(5, false).map(Iterator::count))
///     })
///     .collect();
///
/// for handle in handles {
///     assert_eq!(handle.join().unwrap().unwrap(), 5);
/// }
/// ```
#[derive(Clone)]
pub struct SharedRandom(Arc<Mutex<fastrand::Rng>>);

impl SharedRandom {
    /// Creates a shared generator seeded from system entropy.
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(fastrand::Rng::new())))
    }

    /// Creates a shared generator with a fixed seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self(Arc::new(Mutex::new(fastrand::Rng::with_seed(seed))))
    }

    fn next_f64(&self) -> f64 {
        self.0.lock().f64()
    }
}

impl Default for SharedRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for SharedRandom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedRandom").finish_non_exhaustive()
    }
}

/// Generator state owned by a single delay sequence.
pub(crate) enum Rnd {
    ThreadLocal,
    Owned(fastrand::Rng),
    Shared(SharedRandom),
    #[cfg(test)]
    Test(Arc<dyn Fn() -> f64 + Send + Sync>),
}

impl Debug for Rnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ThreadLocal => write!(f, "ThreadLocal"),
            Self::Owned(_) => write!(f, "Owned"),
            Self::Shared(_) => write!(f, "Shared"),
            #[cfg(test)]
            Self::Test(_) => write!(f, "Test"),
        }
    }
}

impl Rnd {
    /// Returns a uniformly distributed value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        match self {
            Self::ThreadLocal => fastrand::f64(),
            Self::Owned(rng) => rng.f64(),
            Self::Shared(shared) => shared.next_f64(),
            #[cfg(test)]
            Self::Test(generator) => generator(),
        }
    }
}
