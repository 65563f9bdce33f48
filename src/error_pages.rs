//! The pages shown for missing routes and unexpected server failures.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

pub fn get_404_not_found_response() -> Response {
    render_error_page(
        StatusCode::NOT_FOUND,
        "Not Found",
        "Something's missing.",
        "Sorry, we can't find that page. Head back to the dashboard to see your transactions.",
    )
}

/// Render the 500 page. The cause is never shown to the client, only logged.
pub fn get_internal_server_error_response() -> Response {
    render_error_page(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error",
        "Sorry, something went wrong.",
        "Try again later or check the server logs",
    )
}

fn render_error_page(status: StatusCode, title: &str, description: &str, fix: &str) -> Response {
    let header = status.as_str();

    (
        status,
        Html(error_view(title, header, description, fix).into_string()),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_utils::{assert_valid_html, parse_html_document};

    use super::{get_404_not_found, get_internal_server_error_response};

    #[tokio::test]
    async fn renders_not_found_page() {
        let response = get_404_not_found().await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
    }

    #[tokio::test]
    async fn renders_internal_server_error_page() {
        let response = get_internal_server_error_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
    }
}
