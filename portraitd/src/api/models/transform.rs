use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response for the transform endpoint.
///
/// Always one of two shapes on the wire:
/// `{"success":true,"processedImageData":"data:image/png;base64,..."}` or
/// `{"success":false,"error":"..."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransformResponse {
    pub success: bool,
    /// PNG data URI of the generated portrait, present on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_image_data: Option<String>,
    /// Human-readable failure reason, present on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransformResponse {
    pub fn success(data_uri: impl Into<String>) -> Self {
        Self {
            success: true,
            processed_image_data: Some(data_uri.into()),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            processed_image_data: None,
            error: Some(message.into()),
        }
    }
}

/// Liveness report for the gateway. Never calls the upstream.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// Whether an upstream credential was configured at startup
    pub upstream_configured: bool,
}
