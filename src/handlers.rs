use salvo::http::StatusCode;
use salvo::prelude::*;
use serde::Serialize;
use tracing::{error, info};

use crate::state::app_state;
use crate::utils::now_timestamp_string;

pub fn router() -> Router {
    Router::new()
        .get(root)
        .push(Router::with_path("health").get(health_check))
        .push(
            Router::with_path("api")
                .push(Router::with_path("sports").get(list_sports))
                .push(Router::with_path("odds/<sport>").get(sport_odds))
                .push(Router::with_path("usage").get(usage_check)),
        )
}

/// Catcher hoop: unmatched routes and uncaught server errors become the JSON
/// envelopes callers expect instead of salvo's default error page.
#[handler]
pub async fn error_envelope(res: &mut Response, ctrl: &mut FlowCtrl) {
    match res.status_code {
        Some(StatusCode::NOT_FOUND) => {
            res.render(Json(ErrorMessage {
                error: "Endpoint not found".to_string(),
            }));
            ctrl.skip_rest();
        }
        Some(status) if status.is_server_error() => {
            res.render(Json(ErrorMessage {
                error: "Internal server error".to_string(),
            }));
            ctrl.skip_rest();
        }
        _ => {}
    }
}

#[handler]
pub async fn root(res: &mut Response) {
    res.render(Json(RootResponse {
        status: "Betting API Proxy Server Running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: RootEndpoints {
            sports: "/api/sports".to_string(),
            odds: "/api/odds/:sport".to_string(),
            usage: "/api/usage".to_string(),
            health: "/health".to_string(),
        },
    }));
}

#[handler]
pub async fn health_check(res: &mut Response) {
    res.render(Json(HealthCheckResponse {
        status: "healthy".to_string(),
        timestamp: now_timestamp_string(),
    }));
}

#[handler]
pub async fn list_sports(req: &mut Request, res: &mut Response) {
    let show_all = parse_show_all(req.query::<String>("all"));
    info!(all = show_all, "fetching sports list");

    match app_state().upstream.sports(show_all).await {
        Ok(data) => {
            info!(count = json_array_len(&data), "fetched sports");
            res.render(Json(data));
        }
        Err(upstream_error) => {
            fetch_failed(res, "Failed to fetch sports", upstream_error.message);
        }
    }
}

#[handler]
pub async fn sport_odds(req: &mut Request, res: &mut Response) {
    let Some(sport) = req.param::<String>("sport") else {
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        res.render(Json(ErrorMessage {
            error: "Internal server error".to_string(),
        }));
        return;
    };
    let regions = req
        .query::<String>("regions")
        .unwrap_or_else(|| "us".to_string());
    let markets = req
        .query::<String>("markets")
        .unwrap_or_else(|| "h2h".to_string());
    info!(sport = %sport, regions = %regions, markets = %markets, "fetching odds");

    match app_state().upstream.odds(&sport, &regions, &markets).await {
        Ok(data) => {
            info!(sport = %sport, count = json_array_len(&data), "fetched odds");
            res.render(Json(data));
        }
        Err(upstream_error) => {
            fetch_failed(res, "Failed to fetch odds", upstream_error.message);
        }
    }
}

#[handler]
pub async fn usage_check(res: &mut Response) {
    match app_state().upstream.usage().await {
        Ok(usage) => {
            info!(
                requests_used = %usage.requests_used,
                requests_remaining = %usage.requests_remaining,
                "odds API usage check"
            );
            res.render(Json(UsageResponse {
                requests_used: usage.requests_used,
                requests_remaining: usage.requests_remaining,
                timestamp: now_timestamp_string(),
            }));
        }
        Err(upstream_error) => {
            fetch_failed(res, "Failed to check usage", upstream_error.message);
        }
    }
}

// The inbound `all` flag is a literal string compare, not bool parsing:
// `all=1` or `all=TRUE` do not enable it.
fn parse_show_all(value: Option<String>) -> bool {
    value.as_deref() == Some("true")
}

fn json_array_len(value: &serde_json::Value) -> usize {
    value.as_array().map(Vec::len).unwrap_or(0)
}

fn fetch_failed(res: &mut Response, error_label: &str, message: String) {
    error!("{error_label}: {message}");
    res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
    res.render(Json(ErrorEnvelope {
        error: error_label.to_string(),
        message,
    }));
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorMessage {
    error: String,
}

#[derive(Debug, Serialize)]
struct RootResponse {
    status: String,
    version: String,
    endpoints: RootEndpoints,
}

#[derive(Debug, Serialize)]
struct RootEndpoints {
    sports: String,
    odds: String,
    usage: String,
    health: String,
}

#[derive(Debug, Serialize)]
struct HealthCheckResponse {
    status: String,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct UsageResponse {
    #[serde(rename = "requestsUsed")]
    requests_used: String,
    #[serde(rename = "requestsRemaining")]
    requests_remaining: String,
    timestamp: String,
}
