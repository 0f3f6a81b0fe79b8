//! Test utilities for integration testing
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use url::Url;

use crate::config::Config;

/// Config pointed at a mock upstream, with a credential set.
pub fn create_test_config(upstream_url: &str) -> Config {
    let mut config = Config::default();
    config.gemini.api_key = Some("test-api-key".to_string());
    config.gemini.base_url = Url::parse(upstream_url).expect("upstream url");
    config.gemini.timeout = std::time::Duration::from_secs(5);
    config
}

/// Config with no credential at all, for configuration-error paths.
pub fn create_unconfigured_test_config() -> Config {
    let mut config = Config::default();
    config.gemini.api_key = None;
    config
}

pub fn create_test_app(config: Config) -> TestServer {
    let app = crate::Application::new(config).expect("Failed to create application");
    app.into_test_server()
}

/// Multipart form with a single `image` field, the way the upload widget
/// submits it.
pub fn image_form(bytes: &[u8], mime_type: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "image",
        Part::bytes(bytes.to_vec()).file_name("headshot.jpg").mime_type(mime_type),
    )
}

/// A Gemini success body whose first image part carries `payload`.
pub fn upstream_image_response(payload: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {
                "parts": [
                    { "text": "Here is the professional portrait you asked for." },
                    { "inlineData": { "mimeType": "image/png", "data": payload } }
                ]
            }
        }]
    })
}
