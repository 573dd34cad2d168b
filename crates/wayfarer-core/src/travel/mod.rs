//! Travel-time aggregation: pairwise routing metrics between consecutive
//! waypoints, fetched per travel mode from the routing provider.
//!
//! Provider failures are contained: a mode that fails to fetch is dropped
//! from the result with a warning, and a leg that cannot be computed is
//! rendered as `"N/A"` while keeping its slot in the sequence.

pub mod http;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use futures::future::join_all;
use thiserror::Error;
use tracing::warn;

use crate::model::{Day, LatLng};

pub use http::HttpRoutingProvider;

/// How the traveller gets between two waypoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TravelMode {
    Drive,
    Walk,
    Bicycle,
    Transit,
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Drive => "drive",
            Self::Walk => "walk",
            Self::Bicycle => "bicycle",
            Self::Transit => "transit",
        };
        f.write_str(s)
    }
}

impl FromStr for TravelMode {
    type Err = TravelModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drive" => Ok(Self::Drive),
            "walk" => Ok(Self::Walk),
            "bicycle" => Ok(Self::Bicycle),
            "transit" => Ok(Self::Transit),
            other => Err(TravelModeParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`TravelMode`] string.
#[derive(Debug, Clone)]
pub struct TravelModeParseError(pub String);

impl fmt::Display for TravelModeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid travel mode: {:?}", self.0)
    }
}

impl std::error::Error for TravelModeParseError {}

/// Raw metrics for one leg, as the provider reports them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteLeg {
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

/// Errors from the routing provider call.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("routing request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("routing provider returned status {0}")]
    Status(u16),

    #[error("routing provider returned a malformed payload: {0}")]
    Malformed(String),

    #[error("routing provider rejected the request: {0}")]
    Provider(String),
}

/// Adapter interface for the routing/geocoding provider.
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    /// Distance and duration between two coordinates for one mode.
    async fn route(&self, from: LatLng, to: LatLng, mode: TravelMode)
        -> Result<RouteLeg, RoutingError>;

    /// Resolve a free-text place to coordinates.
    async fn geocode(&self, place: &str) -> Result<LatLng, RoutingError>;
}

// Compile-time assertion: RoutingProvider must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn RoutingProvider) {}
};

/// One leg of a trip-level summary, human-readable.
#[derive(Debug, Clone, PartialEq)]
pub struct LegSummary {
    pub from_index: usize,
    pub to_index: usize,
    pub distance: String,
    pub duration: String,
}

/// One leg between consecutive activities within a day. The entry exists
/// even when metrics could not be computed (`"N/A"` fields).
#[derive(Debug, Clone, PartialEq)]
pub struct DayLeg {
    pub from: String,
    pub to: String,
    pub distance: String,
    pub duration: String,
}

/// Render a second count: `"<H> hr <M> min"` at an hour or more (minutes
/// clause omitted when zero), `"<M> min"` at a minute or more, `"<S> sec"`
/// under a minute.
pub fn format_duration(seconds: f64) -> String {
    let secs = seconds.round().max(0.0) as u64;
    if secs >= 3600 {
        let hours = secs / 3600;
        let minutes = (secs % 3600) / 60;
        if minutes == 0 {
            format!("{hours} hr")
        } else {
            format!("{hours} hr {minutes} min")
        }
    } else if secs >= 60 {
        format!("{} min", secs / 60)
    } else {
        format!("{secs} sec")
    }
}

/// Render a meter count as kilometers to one decimal place.
pub fn format_distance(meters: f64) -> String {
    format!("{:.1} km", meters / 1000.0)
}

/// Fetch every consecutive leg of `waypoints` for every requested mode.
///
/// Modes are fetched independently and concurrently. A mode whose fetch
/// fails is logged and omitted from the result; the remaining modes are
/// still delivered.
pub async fn trip_summary(
    provider: &dyn RoutingProvider,
    waypoints: &[LatLng],
    modes: &[TravelMode],
) -> BTreeMap<TravelMode, Vec<LegSummary>> {
    let fetches = modes.iter().map(|&mode| async move {
        let legs = mode_legs(provider, waypoints, mode).await;
        (mode, legs)
    });

    let mut summary = BTreeMap::new();
    for (mode, legs) in join_all(fetches).await {
        match legs {
            Ok(legs) => {
                summary.insert(mode, legs);
            }
            Err(err) => {
                warn!(mode = %mode, error = %err, "dropping travel mode from summary");
            }
        }
    }
    summary
}

/// All consecutive legs of one mode; any leg failure fails the mode.
async fn mode_legs(
    provider: &dyn RoutingProvider,
    waypoints: &[LatLng],
    mode: TravelMode,
) -> Result<Vec<LegSummary>, RoutingError> {
    let fetches = waypoints.windows(2).enumerate().map(|(i, pair)| async move {
        let leg = provider.route(pair[0], pair[1], mode).await?;
        Ok(LegSummary {
            from_index: i,
            to_index: i + 1,
            distance: format_distance(leg.distance_meters),
            duration: format_duration(leg.duration_seconds),
        })
    });

    join_all(fetches).await.into_iter().collect()
}

/// Legs between consecutive activities within one day, never spanning a
/// day boundary. An activity without coordinates (or a failed provider
/// call) yields an `"N/A"` leg rather than a missing entry.
pub async fn day_legs(
    provider: &dyn RoutingProvider,
    day: &Day,
    mode: TravelMode,
) -> Vec<DayLeg> {
    let fetches = day.activities.windows(2).map(|pair| async move {
        let (from, to) = (&pair[0], &pair[1]);
        let mut leg = DayLeg {
            from: from.name.clone(),
            to: to.name.clone(),
            distance: "N/A".to_owned(),
            duration: "N/A".to_owned(),
        };

        let (Some(origin), Some(dest)) = (from.location.coords, to.location.coords) else {
            return leg;
        };

        match provider.route(origin, dest, mode).await {
            Ok(metrics) => {
                leg.distance = format_distance(metrics.distance_meters);
                leg.duration = format_duration(metrics.duration_seconds);
            }
            Err(err) => {
                warn!(
                    from = %leg.from,
                    to = %leg.to,
                    error = %err,
                    "leg metrics unavailable"
                );
            }
        }
        leg
    });

    join_all(fetches).await
}

/// Geocode each place concurrently; a place that fails resolves to `None`
/// without failing the batch.
pub async fn geocode_places(
    provider: &dyn RoutingProvider,
    places: &[String],
) -> Vec<Option<LatLng>> {
    let fetches = places.iter().map(|place| async move {
        match provider.geocode(place).await {
            Ok(coords) => Some(coords),
            Err(err) => {
                warn!(place = %place, error = %err, "geocoding failed");
                None
            }
        }
    });

    join_all(fetches).await
}
