use dotenvy::dotenv;
use salvo::catcher::Catcher;
use salvo::cors::{AllowOrigin, Cors, CorsHandler};
use salvo::http::Method;
use salvo::prelude::*;
use tracing::info;

use crate::config::Config;
use crate::handlers;
use crate::state::{AppState, app_state, set_app_state};
use crate::upstream::OddsApiClient;
use crate::utils::init_tracing;

pub async fn run() {
    let _ = dotenv();
    let config = load_config_or_exit();
    init_tracing(&config.log_level);

    let upstream = build_upstream_or_exit(config.clone());
    set_app_state(AppState { config, upstream });

    let config = &app_state().config;
    info!(
        port = config.port,
        environment = %config.environment,
        frontend_origin = %config.frontend_origin.as_deref().unwrap_or("any origin"),
        "betting API proxy starting"
    );

    let acceptor = TcpListener::new((config.host.as_str(), config.port))
        .bind()
        .await;
    Server::new(acceptor).serve(service()).await;
}

/// Assembles the servable pipeline from the installed state: CORS around the
/// router, catcher for the 404 / uncaught-500 JSON envelopes. Shared with the
/// end-to-end tests.
pub fn service() -> Service {
    Service::new(handlers::router())
        .hoop(build_cors(&app_state().config))
        .catcher(Catcher::default().hoop(handlers::error_envelope))
}

// Wildcard origin cannot be combined with credentials, so the unrestricted
// case mirrors the request origin instead.
fn build_cors(config: &Config) -> CorsHandler {
    let cors = match config.frontend_origin.as_deref() {
        Some(origin) => Cors::new().allow_origin(origin),
        None => Cors::new().allow_origin(AllowOrigin::mirror_request()),
    };

    cors.allow_methods(vec![Method::GET, Method::POST])
        .allow_credentials(true)
        .into_handler()
}

fn load_config_or_exit() -> Config {
    match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("Configuration Error: {error}");
            std::process::exit(1);
        }
    }
}

fn build_upstream_or_exit(config: Config) -> OddsApiClient {
    match OddsApiClient::new(config) {
        Ok(upstream) => upstream,
        Err(error) => {
            eprintln!("Initialization Error: {error}");
            std::process::exit(1);
        }
    }
}
