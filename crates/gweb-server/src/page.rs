//! Root page.
//!
//! Serves `index.html` from the static directory at `/`. Falls back to a
//! built-in welcome page when the file does not exist. With HMR enabled the
//! listener script is injected so the page reloads on `reload` messages.

use std::io::ErrorKind;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};

use crate::state::AppState;

const DEFAULT_PAGE: &str = include_str!("../assets/index.html");

/// Handle `GET /`.
pub(crate) async fn page_handler(State(state): State<Arc<AppState>>) -> Response {
    let index = state.static_dir.join("index.html");
    let html = match tokio::fs::read_to_string(&index).await {
        Ok(html) => html,
        Err(err) if err.kind() == ErrorKind::NotFound => DEFAULT_PAGE.to_owned(),
        Err(err) => {
            tracing::error!(path = %index.display(), error = %err, "Failed to read page");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let html = if state.hub.is_some() {
        inject_client(&html, &state.hmr_endpoint)
    } else {
        html
    };

    ([(header::CACHE_CONTROL, "no-cache")], Html(html)).into_response()
}

/// Insert the listener script tag before the last `</body>`, or append it.
fn inject_client(html: &str, endpoint: &str) -> String {
    let tag = format!("<script src=\"{endpoint}/client.js\"></script>\n");

    // ASCII lowercasing keeps byte offsets intact
    match html.to_ascii_lowercase().rfind("</body>") {
        Some(pos) => {
            let mut out = String::with_capacity(html.len() + tag.len());
            out.push_str(&html[..pos]);
            out.push_str(&tag);
            out.push_str(&html[pos..]);
            out
        }
        None => format!("{html}{tag}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use pretty_assertions::assert_eq;

    use crate::test_support::get;
    use crate::{HmrHub, ServerConfig, create_app};

    const SCRIPT_TAG: &str = "<script src=\"/__hmr/client.js\"></script>";

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_inject_before_body_close() {
        let html = inject_client("<html><body><p>hi</p></BODY></html>", "/__hmr");
        assert_eq!(
            html,
            "<html><body><p>hi</p><script src=\"/__hmr/client.js\"></script>\n</BODY></html>"
        );
    }

    #[test]
    fn test_inject_without_body_appends() {
        let html = inject_client("<p>fragment</p>", "/events");
        assert_eq!(
            html,
            "<p>fragment</p><script src=\"/events/client.js\"></script>\n"
        );
    }

    #[tokio::test]
    async fn test_serves_index_with_client_script() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("index.html"),
            "<html><body><h1>App</h1></body></html>",
        )
        .unwrap();
        let config = ServerConfig {
            static_dir: dir.path().to_path_buf(),
            keep_alive_secs: 0,
            ..ServerConfig::default()
        };

        let response = get(create_app(&config, Some(HmrHub::new(4))), "/").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "text/html; charset=utf-8"
        );
        let body = body_text(response).await;
        assert!(body.contains("<h1>App</h1>"));
        assert!(body.contains(&format!("{SCRIPT_TAG}\n</body>")));
    }

    #[tokio::test]
    async fn test_missing_index_serves_default_page() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            static_dir: dir.path().to_path_buf(),
            ..ServerConfig::default()
        };

        let response = get(create_app(&config, Some(HmrHub::new(4))), "/").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Welcome to GWeb"));
        assert!(body.contains(SCRIPT_TAG));
    }

    #[tokio::test]
    async fn test_no_script_without_hmr() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            static_dir: dir.path().to_path_buf(),
            hmr_enabled: false,
            ..ServerConfig::default()
        };

        let response = get(create_app(&config, None), "/").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(!body_text(response).await.contains("client.js"));
    }
}
