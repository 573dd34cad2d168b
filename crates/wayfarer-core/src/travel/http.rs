//! HTTP implementation of the [`RoutingProvider`] trait.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::LatLng;

use super::{RouteLeg, RoutingError, RoutingProvider, TravelMode};

/// Routing provider client: `POST {base_url}/route` and
/// `POST {base_url}/geocode`, JSON in both directions.
#[derive(Debug, Clone)]
pub struct HttpRoutingProvider {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct RouteRequestWire<'a> {
    from: &'a LatLng,
    to: &'a LatLng,
    mode: String,
}

#[derive(Debug, Deserialize)]
struct RouteResponseWire {
    distance_meters: f64,
    duration_seconds: f64,
}

#[derive(Debug, Serialize)]
struct GeocodeRequestWire<'a> {
    place: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponseWire {
    lat: f64,
    lng: f64,
}

impl HttpRoutingProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl RoutingProvider for HttpRoutingProvider {
    async fn route(
        &self,
        from: LatLng,
        to: LatLng,
        mode: TravelMode,
    ) -> Result<RouteLeg, RoutingError> {
        let url = self.url("route");
        debug!(url = %url, mode = %mode, "requesting route");

        let response = self
            .client
            .post(&url)
            .json(&RouteRequestWire {
                from: &from,
                to: &to,
                mode: mode.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(RoutingError::Provider("rate limited".to_owned()));
        }
        if !status.is_success() {
            return Err(RoutingError::Status(status.as_u16()));
        }

        let wire: RouteResponseWire = response
            .json()
            .await
            .map_err(|e| RoutingError::Malformed(e.to_string()))?;

        Ok(RouteLeg {
            distance_meters: wire.distance_meters,
            duration_seconds: wire.duration_seconds,
        })
    }

    async fn geocode(&self, place: &str) -> Result<LatLng, RoutingError> {
        let url = self.url("geocode");
        debug!(url = %url, place = %place, "requesting geocode");

        let response = self
            .client
            .post(&url)
            .json(&GeocodeRequestWire { place })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RoutingError::Status(status.as_u16()));
        }

        let wire: GeocodeResponseWire = response
            .json()
            .await
            .map_err(|e| RoutingError::Malformed(e.to_string()))?;

        Ok(LatLng {
            lat: wire.lat,
            lng: wire.lng,
        })
    }
}
