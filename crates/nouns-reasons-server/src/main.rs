// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use nouns_reasons_core::{ExitCode, MachineError, ENV_REASONS_LOG_JSON, ENV_REASONS_OTEL_ENABLED};
use nouns_reasons_server::{
    build_router, validate_startup_config_contract, ApiConfig, AppState, RetryPolicy,
    RpcChainClient, SubgraphClient, UpstreamConfig, DEFAULT_IPFS_GATEWAY,
};
use opentelemetry::trace::TracerProvider as _;
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name).as_deref().map(str::trim) {
        Ok("1" | "true" | "TRUE" | "yes" | "on") => true,
        Ok("0" | "false" | "FALSE" | "no" | "off") => false,
        _ => default,
    }
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn env_millis(name: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_parse(name, default_ms))
}

fn env_text(name: &str, default: &str) -> String {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().to_owned(),
        _ => default.to_owned(),
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing() -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = if env_flag(ENV_REASONS_LOG_JSON, true) {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().boxed()
    };
    let otel_layer = if env_flag(ENV_REASONS_OTEL_ENABLED, false) {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_http()
            .build()
            .map_err(|e| format!("otlp exporter: {e}"))?;
        let provider = opentelemetry_sdk::trace::TracerProvider::builder()
            .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
            .build();
        Some(tracing_opentelemetry::layer().with_tracer(provider.tracer("nouns-reasons-server")))
    } else {
        None
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()
        .map_err(|e| format!("tracing subscriber: {e}"))
}

fn load_config() -> (ApiConfig, UpstreamConfig) {
    let defaults = UpstreamConfig::default();
    let api = ApiConfig {
        page_size: env_parse("REASONS_PAGE_SIZE", 10),
        max_page_size: env_parse("REASONS_MAX_PAGE_SIZE", 100),
        home_votes: env_parse("REASONS_HOME_VOTES", 5),
        home_proposals: env_parse("REASONS_HOME_PROPOSALS", 10),
        cache_ttl: env_millis("REASONS_CACHE_TTL_MS", 30_000),
        cache_max_entries: env_parse("REASONS_CACHE_MAX_ENTRIES", 1024),
        request_timeout: env_millis("REASONS_REQUEST_TIMEOUT_MS", 10_000),
        enrich_cards: env_flag("REASONS_ENRICH_CARDS", true),
    };
    let upstream = UpstreamConfig {
        subgraph_url: env_text("REASONS_SUBGRAPH_URL", &defaults.subgraph_url),
        rpc_url: env_text("REASONS_RPC_URL", &defaults.rpc_url),
        ipfs_gateway: env_text("REASONS_IPFS_GATEWAY", DEFAULT_IPFS_GATEWAY),
        timeout: env_millis("REASONS_UPSTREAM_TIMEOUT_MS", 8_000),
        retry: RetryPolicy {
            max_attempts: env_parse("REASONS_RETRY_ATTEMPTS", 3),
            base_backoff_ms: env_parse("REASONS_RETRY_BASE_MS", 150),
        },
    };
    (api, upstream)
}

async fn run() -> Result<(), MachineError> {
    init_tracing().map_err(|e| MachineError::new(ExitCode::Software, e))?;

    let bind_addr = env_text("REASONS_BIND", "0.0.0.0:8080");
    let (api_cfg, upstream_cfg) = load_config();
    validate_startup_config_contract(&api_cfg, &upstream_cfg)
        .map_err(|e| MachineError::new(ExitCode::Config, e))?;

    let subgraph = Arc::new(SubgraphClient::new(
        upstream_cfg.subgraph_url.clone(),
        upstream_cfg.timeout,
        upstream_cfg.retry.clone(),
    ));
    let chain = Arc::new(RpcChainClient::new(
        upstream_cfg.rpc_url.clone(),
        upstream_cfg.timeout,
        upstream_cfg.retry.clone(),
        upstream_cfg.ipfs_gateway.clone(),
    ));
    let state = AppState::with_config(subgraph.clone(), subgraph, chain, api_cfg);
    let request_timeout = state.api.request_timeout;
    let app = build_router(state).layer(axum::middleware::from_fn(
        move |req: axum::extract::Request, next: axum::middleware::Next| async move {
            match tokio::time::timeout(request_timeout, next.run(req)).await {
                Ok(resp) => resp,
                Err(_) => {
                    error!(timeout = ?request_timeout, "request timed out");
                    axum::response::IntoResponse::into_response(
                        axum::http::StatusCode::GATEWAY_TIMEOUT,
                    )
                }
            }
        },
    ));

    let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
        MachineError::new(ExitCode::OsError, format!("bind failed: {e}"))
            .with_detail("bind", &bind_addr)
    })?;
    info!(
        bind = %bind_addr,
        subgraph = %upstream_cfg.subgraph_url,
        "nouns-reasons-server listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            let drain_ms = env_parse("REASONS_SHUTDOWN_DRAIN_MS", 2000);
            info!(drain_ms, "shutdown signal received, draining");
            tokio::time::sleep(Duration::from_millis(drain_ms)).await;
        })
        .await
        .map_err(|e| MachineError::new(ExitCode::Unavailable, format!("server failed: {e}")))
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        error!(exit = err.exit.as_str(), "{}", err.message);
        eprintln!("{}", err.to_json_line());
        std::process::exit(err.exit.as_i32());
    }
}
