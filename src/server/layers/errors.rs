use crate::error::{CatalogError, ErrorBody, ErrorReport};
use crate::server::router::AppState;
use axum::{
    Json,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::any::Any;

/// Terminal error translation.
///
/// Every 500 produced by [`CatalogError`] carries an [`ErrorReport`]. In
/// development mode the opaque body is replaced with the report; otherwise
/// the response passes through untouched.
pub async fn render_errors(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let resp = next.run(req).await;
    if !state.config.is_development() {
        return resp;
    }

    match resp.extensions().get::<ErrorReport>().cloned() {
        Some(report) => (resp.status(), Json(ErrorBody::one(report))).into_response(),
        None => resp,
    }
}

/// Turns a handler panic into a regular 500.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };
    CatalogError::Panic(message).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn panic_payloads_become_reports() {
        let resp = panic_response(Box::new("boom"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let report = resp.extensions().get::<ErrorReport>().expect("report");
        assert_eq!(report.name, "Panic");
        assert!(report.message.contains("boom"));

        let resp = panic_response(Box::new(String::from("owned boom")));
        let report = resp.extensions().get::<ErrorReport>().expect("report");
        assert!(report.message.contains("owned boom"));
    }
}
