// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Dispatches a handful of riders to drivers around Manhattan.

use ohno::AppError;
use ride_match::{Coordinates, Driver, RideMatcher, Rider};

fn main() -> Result<(), AppError> {
    let mut matcher = RideMatcher::new(vec![
        Driver::new("driver-1", Coordinates::new(40.7580, -73.9855)?),
        Driver::new("driver-2", Coordinates::new(40.7061, -74.0087)?),
        Driver::new("driver-3", Coordinates::new(40.7829, -73.9654)?),
    ]);

    let riders = [
        Rider::new("rider-1", Coordinates::new(40.7128, -74.0060)?),
        Rider::new("rider-2", Coordinates::new(40.7614, -73.9776)?),
        Rider::new("rider-3", Coordinates::new(40.7794, -73.9632)?),
        Rider::new("rider-4", Coordinates::new(40.7306, -73.9866)?),
    ];

    for rider in &riders {
        match matcher.match_rider(rider) {
            Some(ride) => println!(
                "{} -> {} ({:.2} km)",
                ride.rider_id(),
                ride.driver_id(),
                ride.distance_km()
            ),
            None => println!("{} -> no driver available", rider.id()),
        }
    }

    Ok(())
}
