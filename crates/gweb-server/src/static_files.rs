//! Static file serving.
//!
//! Serves the static directory under its mount prefix.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tower_http::services::ServeDir;

use crate::state::AppState;

/// Create router serving `dir` under `mount` (e.g. `/static/app.js`).
pub(crate) fn static_router(dir: &Path, mount: &str) -> Router<Arc<AppState>> {
    Router::new().nest_service(mount, ServeDir::new(dir))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt;

    use crate::test_support::get;
    use crate::{ServerConfig, create_app};

    #[tokio::test]
    async fn test_serves_file_under_mount() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1);").unwrap();

        let config = ServerConfig {
            static_dir: dir.path().to_path_buf(),
            ..ServerConfig::default()
        };
        let response = get(create_app(&config, None), "/static/app.js").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"console.log(1);");
    }

    #[tokio::test]
    async fn test_missing_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            static_dir: dir.path().to_path_buf(),
            ..ServerConfig::default()
        };

        let response = get(create_app(&config, None), "/static/missing.css").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
