use crate::config::Config;
use crate::db::Database;
use crate::server::layers::{errors, security, statics};
use crate::server::{redirect, routes};

use axum::{
    Router,
    extract::{ConnectInfo, Request, State},
    http::{HeaderName, HeaderValue, Version, header::USER_AGENT},
    middleware::{self, Next},
    response::Response,
};
use base64::Engine as _;
use rand::RngCore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::{error, info, warn};

const MAX_REQUEST_ID_LEN: usize = 128;
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

fn generate_request_id() -> String {
    // 96 bits => 16 chars base64url (no padding).
    let mut bytes = [0u8; 12];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn format_http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/?",
    }
}

/// Successful script/style responses are too noisy to log.
fn is_quiet_asset(path: &str) -> bool {
    path.starts_with("/js") || path.starts_with("/css")
}

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Database, config: Arc<Config>) -> Self {
        Self { db, config }
    }
}

async fn access_log(State(state): State<AppState>, req: Request, next: Next) -> Response {
    // Capture request metadata before moving `req` into the handler stack.
    let method = req.method().clone();
    let uri = req.uri().clone();
    let version = req.version();

    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(generate_request_id);

    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let client_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(peer)| {
            let forwarded_for = req
                .headers()
                .get(X_FORWARDED_FOR)
                .and_then(|v| v.to_str().ok());
            state
                .config
                .http
                .trust_proxy
                .client_ip(peer.ip(), forwarded_for)
                .to_string()
        })
        .unwrap_or_else(|| "unknown ip".to_string());

    let start = Instant::now();
    let mut resp = next.run(req).await;

    // Always reflect `x-request-id` for easier correlation, even if the client didn't send one.
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status();
    let path = uri.path();
    if is_quiet_asset(path) && status.as_u16() < 400 {
        return resp;
    }

    let latency_ms = start.elapsed().as_secs_f64() * 1e3;
    let protocol = format_http_version(version);

    if status.is_server_error() {
        error!(
            "| {:>3} | {} | {:<15} | {:^7} | {:<8} | {} | {:.3}ms | {}",
            status.as_u16(),
            request_id,
            client_ip,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    } else if status.is_client_error() {
        warn!(
            "| {:>3} | {} | {:<15} | {:^7} | {:<8} | {} | {:.3}ms | {}",
            status.as_u16(),
            request_id,
            client_ip,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    } else {
        info!(
            "| {:>3} | {} | {:<15} | {:^7} | {:<8} | {} | {:.3}ms | {}",
            status.as_u16(),
            request_id,
            client_ip,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    }

    resp
}

/// Builds the full request pipeline.
///
/// Outermost first: access log, CORS, security headers, error rendering, panic
/// capture, `.html` extension lookup, static assets (`public`, then `built`),
/// the `/api` sub-application with its JSON 404, and finally the redirect lookup.
pub fn catalog_router(state: AppState) -> Router {
    let api = routes::router().fallback(routes::api_not_found);

    let app = Router::new()
        .nest("/api", api)
        .fallback(redirect::redirect_lookup)
        .with_state(state.clone());

    let assets = statics::static_assets(&state.config.http, app);

    Router::new()
        .fallback_service(assets)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            statics::html_extension,
        ))
        .layer(CatchPanicLayer::custom(errors::panic_response))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            errors::render_errors,
        ))
        .layer(middleware::from_fn(security::security_headers))
        .layer(security::cors())
        .layer(middleware::from_fn_with_state(state, access_log))
}
