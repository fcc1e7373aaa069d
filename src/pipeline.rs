//! Trip snapshot assembly.
//!
//! One snapshot is the record handed to feature engineering: the GPS fix,
//! the weather at that fix, and the resolved speed limit, under a single
//! timestamp.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::{DriveSession, Resolver};
use crate::error::ResolveError;
use crate::models::{GeoPoint, Resolution};
use crate::nvdb::RoadNetwork;
use crate::weather::{WeatherFetcher, WeatherSample};

/// One timestamped observation along a trip
#[derive(Debug, Clone, Serialize)]
pub struct TripSnapshot {
    pub timestamp: DateTime<Utc>,
    pub gps: GeoPoint,
    pub weather: WeatherSample,
    pub speed_limit: Resolution,
}

/// Collects snapshots by combining the resolver with the weather fetcher
pub struct SnapshotCollector<N: RoadNetwork> {
    resolver: Resolver<N>,
    weather: WeatherFetcher,
}

impl<N: RoadNetwork> SnapshotCollector<N> {
    pub fn new(resolver: Resolver<N>, weather: WeatherFetcher) -> Self {
        Self { resolver, weather }
    }

    pub fn resolver(&self) -> &Resolver<N> {
        &self.resolver
    }

    /// Collect one snapshot for `point`.
    ///
    /// A `NotFound` speed limit is a valid snapshot; only transport trouble
    /// (on either upstream) or malformed input fails the collection.
    pub async fn collect(
        &self,
        session: &mut DriveSession,
        point: &GeoPoint,
    ) -> Result<TripSnapshot, ResolveError> {
        let weather = self.weather.fetch(point).await?;
        let speed_limit = self.resolver.resolve(session, point).await?;

        Ok(TripSnapshot {
            timestamp: Utc::now(),
            gps: *point,
            weather,
            speed_limit,
        })
    }
}
