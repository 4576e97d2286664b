use std::time::Duration;

use reqwest::Client;
use reqwest::header::HeaderMap;
use serde_json::Value;
use tracing::{debug, error};

use crate::config::Config;
use crate::errors::UpstreamError;

const SPORTS_PATH: &str = "/v4/sports/";
const HEADER_REQUESTS_REMAINING: &str = "x-requests-remaining";
const HEADER_REQUESTS_USED: &str = "x-requests-used";
const USAGE_UNAVAILABLE: &str = "N/A";

/// Request-quota counters the odds API reports through response headers on
/// every call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UsageCounters {
    pub requests_used: String,
    pub requests_remaining: String,
}

/// Thin client over the odds API. Injects the API key as a query parameter
/// and applies the configured fixed timeout to every outbound call.
#[derive(Clone, Debug)]
pub struct OddsApiClient {
    client: Client,
    config: Config,
}

impl OddsApiClient {
    pub fn new(config: Config) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(|error| format!("failed to initialize upstream HTTP client: {error}"))?;
        Ok(Self { client, config })
    }

    /// `GET <base>/v4/sports/?apiKey=..[&all=true]`, relaying the JSON body.
    pub async fn sports(&self, all: bool) -> Result<Value, UpstreamError> {
        let query = sports_query(&self.config.odds_api_key, all);
        let response = self.send_request(SPORTS_PATH, &query).await?;
        let response = require_success(response)?;
        read_json_body(response).await
    }

    /// `GET <base>/v4/sports/<sport>/odds/?apiKey=..&regions=..&markets=..`,
    /// relaying the JSON body. Usage headers are logged in passing.
    pub async fn odds(
        &self,
        sport: &str,
        regions: &str,
        markets: &str,
    ) -> Result<Value, UpstreamError> {
        let path = odds_path(sport);
        let query = odds_query(&self.config.odds_api_key, regions, markets);
        let response = self.send_request(&path, &query).await?;
        let response = require_success(response)?;

        let usage = usage_from_headers(response.headers());
        debug!(
            requests_used = %usage.requests_used,
            requests_remaining = %usage.requests_remaining,
            sport,
            "odds API usage after odds fetch"
        );

        read_json_body(response).await
    }

    /// Issues the sports-list call only to read the usage headers off the
    /// response; the body and status are irrelevant here.
    pub async fn usage(&self) -> Result<UsageCounters, UpstreamError> {
        let query = sports_query(&self.config.odds_api_key, false);
        let response = self.send_request(SPORTS_PATH, &query).await?;
        Ok(usage_from_headers(response.headers()))
    }

    async fn send_request(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<reqwest::Response, UpstreamError> {
        let url = format!(
            "{}{}",
            self.config.odds_base_url.trim_end_matches('/'),
            path
        );

        debug!(url = %url, "sending upstream request");
        self.client.get(&url).query(query).send().await.map_err(|error| {
            error!(url = %url, "upstream request failed: {error}");
            UpstreamError::new(error.to_string())
        })
    }
}

fn require_success(response: reqwest::Response) -> Result<reqwest::Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(UpstreamError::new(status_error_message(status.as_u16())))
    }
}

fn status_error_message(status: u16) -> String {
    format!("API responded with status: {status}")
}

async fn read_json_body(response: reqwest::Response) -> Result<Value, UpstreamError> {
    response
        .json::<Value>()
        .await
        .map_err(|error| UpstreamError::new(format!("failed to parse upstream JSON: {error}")))
}

fn sports_query(api_key: &str, all: bool) -> Vec<(&'static str, String)> {
    let mut query = vec![("apiKey", api_key.to_string())];
    if all {
        query.push(("all", "true".to_string()));
    }
    query
}

fn odds_query(api_key: &str, regions: &str, markets: &str) -> Vec<(&'static str, String)> {
    vec![
        ("apiKey", api_key.to_string()),
        ("regions", regions.to_string()),
        ("markets", markets.to_string()),
    ]
}

fn odds_path(sport: &str) -> String {
    format!("/v4/sports/{sport}/odds/")
}

fn usage_from_headers(headers: &HeaderMap) -> UsageCounters {
    UsageCounters {
        requests_used: header_or_unavailable(headers, HEADER_REQUESTS_USED),
        requests_remaining: header_or_unavailable(headers, HEADER_REQUESTS_REMAINING),
    }
}

fn header_or_unavailable(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| USAGE_UNAVAILABLE.to_string())
}
