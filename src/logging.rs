//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// The number of bytes of a body that are logged at the `info` level.
///
/// Longer bodies are truncated, and the full body is logged at the `debug` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Only bodies with a text content type (JSON, forms, plain text) are logged,
/// so static files and rendered pages do not flood the logs.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(body) => body,
        Err(error) => {
            tracing::error!("could not read request body: {error}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    tracing::info!("Received request: {} {}", parts.method, parts.uri);
    if is_loggable(parts.headers.get(CONTENT_TYPE)) {
        log_body("request", &body);
    }

    let request = Request::from_parts(parts, Body::from(body));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(body) => body,
        Err(error) => {
            tracing::error!("could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    tracing::info!("Sending response: {}", parts.status);
    if is_loggable(parts.headers.get(CONTENT_TYPE)) {
        log_body("response", &body);
    }

    Response::from_parts(parts, Body::from(body))
}

fn is_loggable(content_type: Option<&axum::http::HeaderValue>) -> bool {
    let Some(content_type) = content_type.and_then(|value| value.to_str().ok()) else {
        return false;
    };

    content_type.starts_with("application/json")
        || content_type.starts_with("application/x-www-form-urlencoded")
        || content_type.starts_with("text/plain")
}

fn log_body(direction: &str, body: &Bytes) {
    let text = String::from_utf8_lossy(body);

    if text.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "{direction} body: {}...",
            truncate_at_char_boundary(&text, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full {direction} body: {text:?}");
    } else {
        tracing::info!("{direction} body: {text:?}");
    }
}

fn truncate_at_char_boundary(text: &str, limit: usize) -> &str {
    let mut end = limit.min(text.len());

    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}

#[cfg(test)]
mod tests {
    use axum::{Router, middleware, routing::post};
    use axum_test::TestServer;

    use super::{logging_middleware, truncate_at_char_boundary};

    #[test]
    fn truncation_respects_char_boundaries() {
        // 'é' is two bytes long, so a limit of 2 falls inside it.
        let text = "aéb";

        assert_eq!(truncate_at_char_boundary(text, 2), "a");
        assert_eq!(truncate_at_char_boundary(text, 3), "aé");
        assert_eq!(truncate_at_char_boundary(text, 100), "aéb");
    }

    #[tokio::test]
    async fn middleware_passes_body_through() {
        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");
        let body = "x".repeat(200);

        let response = server
            .post("/echo")
            .content_type("text/plain")
            .text(&body)
            .await;

        response.assert_status_ok();
        assert_eq!(response.text(), body);
    }
}
