use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use tower_http::cors::{AllowHeaders, Any, CorsLayer};

const CONTENT_SECURITY_POLICY: &str = concat!(
    "default-src *;",
    "base-uri 'self';",
    "font-src 'self' https: data:;",
    "form-action 'self';",
    "frame-ancestors 'self';",
    "img-src *;",
    "object-src 'none';",
    "script-src 'self' 'unsafe-inline' 'unsafe-eval' https://code.jquery.com/ ",
    "https://cdnjs.cloudflare.com/ https://stackpath.bootstrapcdn.com/;",
    "script-src-attr 'none';",
    "style-src 'self' https: 'unsafe-inline';",
    "upgrade-insecure-requests",
);

/// Headers added to every response unless a handler already set them.
pub const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("content-security-policy", CONTENT_SECURITY_POLICY),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "same-origin"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

pub async fn security_headers(req: Request, next: Next) -> Response {
    let mut resp = next.run(req).await;
    let headers = resp.headers_mut();
    for (name, value) in SECURITY_HEADERS {
        headers
            .entry(HeaderName::from_static(name))
            .or_insert_with(|| HeaderValue::from_static(value));
    }
    headers.remove("x-powered-by");
    resp
}

/// Any origin, request headers mirrored.
pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers(AllowHeaders::mirror_request())
}
