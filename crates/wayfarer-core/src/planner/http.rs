//! HTTP implementation of the [`Planner`] trait.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::model::Itinerary;

use super::{ChatMessage, PlanRequest, PlanResponse, Planner, PlannerError};

/// Planning backend client: `POST {base_url}/plan`, JSON in both
/// directions.
#[derive(Debug, Clone)]
pub struct HttpPlanner {
    client: Client,
    base_url: String,
}

/// Wire shape of the backend response: exactly one of the two fields is
/// expected to be present.
#[derive(Debug, Deserialize)]
struct PlanResponseWire {
    itinerary: Option<Itinerary>,
    message: Option<ChatMessage>,
}

impl HttpPlanner {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Planner for HttpPlanner {
    async fn plan(&self, request: &PlanRequest) -> Result<PlanResponse, PlannerError> {
        let url = format!("{}/plan", self.base_url.trim_end_matches('/'));
        debug!(url = %url, messages = request.messages.len(), "sending plan request");

        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlannerError::Status(status.as_u16()));
        }

        let wire: PlanResponseWire = response
            .json()
            .await
            .map_err(|e| PlannerError::Malformed(e.to_string()))?;

        match (wire.itinerary, wire.message) {
            (Some(itinerary), _) => Ok(PlanResponse::Itinerary(itinerary)),
            (None, Some(message)) => Ok(PlanResponse::Message(message)),
            (None, None) => Err(PlannerError::Malformed(
                "response carries neither an itinerary nor a message".to_owned(),
            )),
        }
    }
}
