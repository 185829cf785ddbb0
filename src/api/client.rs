use std::collections::BTreeMap;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::api::error::ApiError;
use crate::domain::solution::{GameResult, ScoredSolution};
use crate::domain::types::{GlobalConstants, MapData};

/// Source of maps and constants, and the remote scorer for finished solutions.
#[allow(async_fn_in_trait)]
pub trait GameDataProvider {
    async fn fetch_map(&self, map_name: &str) -> Result<MapData, ApiError>;
    async fn fetch_constants(&self) -> Result<GlobalConstants, ApiError>;
    async fn submit(
        &self,
        map_name: &str,
        solution: &ScoredSolution<'_>,
    ) -> Result<GameResult, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmittedCounts {
    freestyle3100_count: u8,
    freestyle9100_count: u8,
}

#[derive(Debug, Serialize)]
struct SubmitSolutionRequest<'a> {
    locations: BTreeMap<&'a str, SubmittedCounts>,
}

impl<'a> SubmitSolutionRequest<'a> {
    fn from_scored(solution: &ScoredSolution<'a>) -> Self {
        let locations = solution
            .locations
            .iter()
            .map(|(name, outcome)| {
                (
                    *name,
                    SubmittedCounts {
                        freestyle3100_count: outcome.gene.freestyle3100,
                        freestyle9100_count: outcome.gene.freestyle9100,
                    },
                )
            })
            .collect();
        Self { locations }
    }
}

pub struct ConsiditionClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ConsiditionClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request
            .header("x-api-key", &self.api_key)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("{} -> {} ({} bytes)", endpoint, status, body.len());

        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

impl GameDataProvider for ConsiditionClient {
    async fn fetch_map(&self, map_name: &str) -> Result<MapData, ApiError> {
        info!("Fetching map data for '{}'", map_name);
        let request = self
            .client
            .get(self.url("/api/Game/getMapData"))
            .query(&[("mapName", map_name)]);
        self.send("getMapData", request).await
    }

    async fn fetch_constants(&self) -> Result<GlobalConstants, ApiError> {
        info!("Fetching general game data");
        let request = self.client.get(self.url("/api/Game/getGeneralGameData"));
        self.send("getGeneralGameData", request).await
    }

    async fn submit(
        &self,
        map_name: &str,
        solution: &ScoredSolution<'_>,
    ) -> Result<GameResult, ApiError> {
        let body = SubmitSolutionRequest::from_scored(solution);
        info!(
            "Submitting {} active locations for '{}'",
            body.locations.len(),
            map_name
        );
        let request = self
            .client
            .post(self.url("/api/Game/submitSolution"))
            .query(&[("mapName", map_name)])
            .json(&body);
        self.send("submitSolution", request).await
    }
}
