use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Send clients that reached the proxy over plain HTTP to the https URL.
///
/// Only acts on `X-Forwarded-Proto: http`; direct connections pass through.
pub async fn redirect_plain_http(request: Request, next: Next) -> Response {
    let forwarded_http = request
        .headers()
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("http"));

    if !forwarded_http {
        return next.run(request).await;
    }

    let Some(host) = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
    else {
        tracing::debug!("Plain HTTP request without Host header, not redirecting");
        return next.run(request).await;
    };

    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or("/");
    let location = format!("https://{}{}", host, path);
    tracing::debug!("Redirecting to {}", location);

    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
}
