// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::{Coordinates, haversine_km};

/// A driver that can be matched with riders.
#[derive(Debug, Clone, PartialEq)]
pub struct Driver {
    id: String,
    location: Coordinates,
    available: bool,
}

impl Driver {
    /// Creates an available driver.
    #[must_use]
    pub fn new(id: impl Into<String>, location: Coordinates) -> Self {
        Self {
            id: id.into(),
            location,
            available: true,
        }
    }

    /// The driver identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Where the driver currently is.
    #[must_use]
    pub fn location(&self) -> Coordinates {
        self.location
    }

    /// Whether the driver can take a ride.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available
    }
}

/// A rider requesting a ride.
#[derive(Debug, Clone, PartialEq)]
pub struct Rider {
    id: String,
    location: Coordinates,
}

impl Rider {
    /// Creates a rider.
    #[must_use]
    pub fn new(id: impl Into<String>, location: Coordinates) -> Self {
        Self { id: id.into(), location }
    }

    /// The rider identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Where the rider waits.
    #[must_use]
    pub fn location(&self) -> Coordinates {
        self.location
    }
}

/// The outcome of a successful match.
#[derive(Debug, Clone, PartialEq)]
pub struct RideMatch {
    driver_id: String,
    rider_id: String,
    distance_km: f64,
}

impl RideMatch {
    /// The matched driver.
    #[must_use]
    pub fn driver_id(&self) -> &str {
        &self.driver_id
    }

    /// The matched rider.
    #[must_use]
    pub fn rider_id(&self) -> &str {
        &self.rider_id
    }

    /// Distance between driver and rider at match time, in kilometers.
    #[must_use]
    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }
}

/// Matches riders with the nearest available driver.
///
/// Matching is a linear scan over the pool. The chosen driver is marked unavailable until
/// [`release`][RideMatcher::release] is called; this is the only state a match changes.
///
/// # Examples
///
/// ```
/// use ride_match::{Coordinates, Driver, RideMatcher, Rider};
///
/// let mut matcher = RideMatcher::new(vec![
///     Driver::new("far", Coordinates::new(40.0, -74.0)?),
///     Driver::new("near", Coordinates::new(40.71, -74.0)?),
/// ]);
///
/// let rider = Rider::new("alice", Coordinates::new(40.7128, -74.006)?);
/// let ride = matcher.match_rider(&rider).unwrap();
///
/// assert_eq!(ride.driver_id(), "near");
/// assert_eq!(matcher.available_count(), 1);
/// # Ok::<(), ride_match::InvalidCoordinates>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct RideMatcher {
    drivers: Vec<Driver>,
}

impl RideMatcher {
    /// Creates a matcher over the given drivers.
    #[must_use]
    pub fn new(drivers: Vec<Driver>) -> Self {
        Self { drivers }
    }

    /// Adds a driver to the pool.
    pub fn add_driver(&mut self, driver: Driver) {
        self.drivers.push(driver);
    }

    /// All drivers, in insertion order.
    #[must_use]
    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    /// Number of drivers that can take a ride.
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.drivers.iter().filter(|d| d.available).count()
    }

    /// Makes a driver available again. Returns `false` when no driver has the given id.
    pub fn release(&mut self, driver_id: &str) -> bool {
        match self.drivers.iter_mut().find(|d| d.id == driver_id) {
            Some(driver) => {
                driver.available = true;
                true
            }
            None => false,
        }
    }

    /// Matches `rider` with the nearest available driver and marks that driver unavailable.
    ///
    /// When several drivers are equally near, the one added first wins. Returns `None`
    /// when no driver is available.
    pub fn match_rider(&mut self, rider: &Rider) -> Option<RideMatch> {
        let nearest = self
            .drivers
            .iter()
            .enumerate()
            .filter(|(_, driver)| driver.available)
            .map(|(index, driver)| (index, haversine_km(rider.location, driver.location)))
            .min_by(|(_, a), (_, b)| a.total_cmp(b));

        let Some((index, distance_km)) = nearest else {
            log_no_driver(rider);
            return None;
        };

        let driver = &mut self.drivers[index];
        driver.available = false;

        let ride = RideMatch {
            driver_id: driver.id.clone(),
            rider_id: rider.id.clone(),
            distance_km,
        };

        log_matched(&ride);
        Some(ride)
    }
}

#[cfg_attr(
    not(any(feature = "logs", test)),
    expect(unused_variables, reason = "unused when logs feature not used")
)]
fn log_matched(ride: &RideMatch) {
    #[cfg(any(feature = "logs", test))]
    tracing::event!(
        name: "ride_match.matched",
        tracing::Level::DEBUG,
        ride.driver_id = %ride.driver_id,
        ride.rider_id = %ride.rider_id,
        ride.distance_km = ride.distance_km,
    );
}

#[cfg_attr(
    not(any(feature = "logs", test)),
    expect(unused_variables, reason = "unused when logs feature not used")
)]
fn log_no_driver(rider: &Rider) {
    #[cfg(any(feature = "logs", test))]
    tracing::event!(
        name: "ride_match.no_driver",
        tracing::Level::INFO,
        ride.rider_id = %rider.id,
    );
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(RideMatcher: Send, Sync, Clone);

    fn at(latitude: f64, longitude: f64) -> Coordinates {
        Coordinates::new(latitude, longitude).unwrap()
    }

    #[test]
    fn new_driver_is_available() {
        let driver = Driver::new("d1", at(1.0, 2.0));

        assert_eq!(driver.id(), "d1");
        assert_eq!(driver.location(), at(1.0, 2.0));
        assert!(driver.is_available());
    }

    #[test]
    fn picks_nearest_available() {
        let mut matcher = RideMatcher::new(vec![
            Driver::new("far", at(10.0, 10.0)),
            Driver::new("near", at(0.1, 0.1)),
            Driver::new("middle", at(1.0, 1.0)),
        ]);

        let ride = matcher.match_rider(&Rider::new("r1", at(0.0, 0.0))).unwrap();

        assert_eq!(ride.driver_id(), "near");
        assert_eq!(ride.rider_id(), "r1");
        assert!((ride.distance_km() - haversine_km(at(0.0, 0.0), at(0.1, 0.1))).abs() < 1e-9);
    }

    #[test]
    fn matched_driver_becomes_unavailable() {
        let mut matcher = RideMatcher::new(vec![Driver::new("near", at(0.1, 0.1)), Driver::new("far", at(5.0, 5.0))]);
        let rider = Rider::new("r", at(0.0, 0.0));

        assert_eq!(matcher.match_rider(&rider).unwrap().driver_id(), "near");
        assert!(!matcher.drivers()[0].is_available());
        assert_eq!(matcher.available_count(), 1);

        assert_eq!(matcher.match_rider(&rider).unwrap().driver_id(), "far");
        assert_eq!(matcher.available_count(), 0);
        assert_eq!(matcher.match_rider(&rider), None);
    }

    #[test]
    fn empty_pool_has_no_match() {
        let mut matcher = RideMatcher::default();

        assert_eq!(matcher.match_rider(&Rider::new("r", at(0.0, 0.0))), None);
    }

    #[test]
    fn driver_next_door_beats_antipodal_driver() {
        let mut matcher = RideMatcher::new(vec![
            Driver::new("antipode", at(87.843, 3.21)),
            Driver::new("next_door", at(-87.834, -176.79)),
        ]);

        let ride = matcher.match_rider(&Rider::new("r", at(-87.843, -176.79))).unwrap();

        assert_eq!(ride.driver_id(), "next_door");
        assert!(ride.distance_km() < 2.0, "unexpected distance: {}", ride.distance_km());
    }

    #[test]
    fn tie_goes_to_first_added() {
        let mut matcher = RideMatcher::new(vec![Driver::new("east", at(0.0, 1.0)), Driver::new("west", at(0.0, -1.0))]);

        let ride = matcher.match_rider(&Rider::new("r", at(0.0, 0.0))).unwrap();

        assert_eq!(ride.driver_id(), "east");
    }

    #[test]
    fn release_restores_availability() {
        let mut matcher = RideMatcher::new(vec![Driver::new("d", at(0.0, 0.0))]);
        matcher.match_rider(&Rider::new("r", at(0.0, 0.0))).unwrap();

        assert!(matcher.release("d"));
        assert!(!matcher.release("unknown"));
        assert_eq!(matcher.available_count(), 1);
    }

    #[test]
    fn add_driver_extends_pool() {
        let mut matcher = RideMatcher::default();
        matcher.add_driver(Driver::new("d", at(3.0, 3.0)));

        assert_eq!(matcher.drivers().len(), 1);
        assert_eq!(matcher.available_count(), 1);
    }
}
