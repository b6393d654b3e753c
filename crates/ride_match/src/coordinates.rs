// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use ohno::OhnoCore;

/// Mean radius of the Earth in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point on Earth in decimal degrees.
///
/// Latitude lies within `[-90, 90]` and longitude within `[-180, 180]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Creates validated coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinates`] when either value is not finite or out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinates> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(InvalidCoordinates::new(latitude, longitude));
        }

        Ok(Self { latitude, longitude })
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other` in kilometers. See [`haversine_km`].
    #[must_use]
    pub fn distance_km(&self, other: Self) -> f64 {
        haversine_km(*self, other)
    }
}

/// Great-circle distance between two points in kilometers, using the haversine formula
/// on a sphere of radius [`EARTH_RADIUS_KM`].
#[must_use]
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    // rounding can push `a` just past 1.0 for near-antipodal points
    let a = ((d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2)).clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Latitude or longitude outside the valid range, or not a number.
#[derive(ohno::Error)]
#[no_constructors]
#[display("invalid coordinates ({latitude}, {longitude}): latitude must be within [-90, 90] and longitude within [-180, 180]")]
pub struct InvalidCoordinates {
    latitude: f64,
    longitude: f64,
    #[error]
    inner_error: OhnoCore,
}

impl InvalidCoordinates {
    fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            inner_error: OhnoCore::default(),
        }
    }

    /// The rejected latitude.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// The rejected longitude.
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}
