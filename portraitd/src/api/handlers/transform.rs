//! HTTP handlers for the transform gateway.

use axum::{
    Json,
    extract::{Multipart, State},
};

use crate::AppState;
use crate::api::models::transform::{HealthResponse, TransformResponse};
use crate::errors::{Error, Result};
use crate::gemini::PORTRAIT_INSTRUCTION;
use crate::upload::UploadedImage;

#[utoipa::path(
    post,
    path = "/api/transform-image",
    tag = "transform",
    summary = "Transform a headshot",
    description = "Upload a JPEG headshot and receive a professional portrait rendered by the \
                   generative-image upstream, returned as a PNG data URI.",
    request_body(
        content_type = "multipart/form-data",
        description = "Multipart form with the headshot in a single `image` field"
    ),
    responses(
        (status = 200, description = "Portrait generated", body = TransformResponse),
        (status = 400, description = "Missing image field or invalid file type", body = TransformResponse),
        (status = 401, description = "Upstream rejected the server credential", body = TransformResponse),
        (status = 413, description = "Upload exceeds the size ceiling", body = TransformResponse),
        (status = 429, description = "Upstream quota exhausted", body = TransformResponse),
        (status = 500, description = "Configuration error or upstream failure", body = TransformResponse)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn transform_image(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<TransformResponse>> {
    let mut image: Option<UploadedImage> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Failed to parse multipart data: {}", e),
    })? {
        if field.name() != Some("image") {
            continue;
        }

        let mime_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|e| Error::BadRequest {
            message: format!("Failed to read image field: {}", e),
        })?;

        image = Some(UploadedImage::new(bytes, mime_type));
        break;
    }

    let Some(image) = image else {
        return Err(Error::MissingFile);
    };

    tracing::info!(
        mime_type = %image.mime_type,
        size = image.size(),
        "Received transform request"
    );

    // The credential is a deployment precondition: report it even for
    // uploads that would not pass validation.
    let gemini = state.gemini.as_ref().ok_or(Error::Configuration)?;

    image.validate(&state.config.upload)?;

    let payload = gemini.transform_image(&image, PORTRAIT_INSTRUCTION).await?;

    Ok(Json(TransformResponse::success(format!("data:image/png;base64,{payload}"))))
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    summary = "Gateway liveness",
    description = "Reports whether the gateway is up and whether an upstream credential is configured. \
                   Never calls the upstream.",
    responses(
        (status = 200, description = "Gateway is up", body = HealthResponse),
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        upstream_configured: state.gemini.is_some(),
    })
}
