// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Nearest-available-driver ride matching.
//!
//! A [`RideMatcher`] holds a pool of [`Driver`]s. [`RideMatcher::match_rider`] picks the
//! available driver with the smallest great-circle distance to the [`Rider`], computed by
//! [`haversine_km`], and marks that driver unavailable.
//!
//! Positions are [`Coordinates`], validated on construction.
//!
//! # Features
//!
//! - `logs`: Emits `tracing` events for matches and for riders left without a driver.

mod coordinates;
mod matcher;

pub use coordinates::{Coordinates, EARTH_RADIUS_KM, InvalidCoordinates, haversine_km};
pub use matcher::{Driver, RideMatch, RideMatcher, Rider};
