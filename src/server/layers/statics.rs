use crate::config::HttpConfig;
use crate::server::router::AppState;
use axum::{
    Router,
    extract::{Request, State},
    http::{Method, Uri},
    middleware::Next,
    response::Response,
};
use std::path::{Component, Path, PathBuf};
use tower_http::services::ServeDir;
use tracing::debug;

/// `public`, then `built`, then `app`. Misses fall through for any method.
pub fn static_assets(
    config: &HttpConfig,
    app: Router,
) -> ServeDir<ServeDir<Router>> {
    let built = ServeDir::new(&config.built_dir)
        .precompressed_br()
        .precompressed_gzip()
        .append_index_html_on_directories(false)
        .call_fallback_on_method_not_allowed(true)
        .fallback(app);

    ServeDir::new(&config.public_dir)
        .precompressed_br()
        .precompressed_gzip()
        .call_fallback_on_method_not_allowed(true)
        .fallback(built)
}

/// Resolves `/about` to `public/about.html` when that file exists.
pub async fn html_extension(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    if matches!(*req.method(), Method::GET | Method::HEAD)
        && let Some(rewritten) = html_candidate(&state.config.http.public_dir, req.uri()).await
    {
        debug!(from = %req.uri(), to = %rewritten, "serving .html variant");
        *req.uri_mut() = rewritten;
    }
    next.run(req).await
}

async fn html_candidate(public_dir: &Path, uri: &Uri) -> Option<Uri> {
    let path = uri.path();
    let relative = path.trim_start_matches('/');
    if relative.is_empty() || path.ends_with('/') {
        return None;
    }

    let mut file = PathBuf::from(public_dir);
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => file.push(part),
            _ => return None,
        }
    }
    if file.extension().is_some() {
        return None;
    }
    file.set_extension("html");

    let meta = tokio::fs::metadata(&file).await.ok()?;
    if !meta.is_file() {
        return None;
    }

    let target = match uri.query() {
        Some(query) => format!("{path}.html?{query}"),
        None => format!("{path}.html"),
    };
    target.parse().ok()
}
