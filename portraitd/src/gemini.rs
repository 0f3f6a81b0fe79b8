//! Client for the Gemini `generateContent` upstream.
//!
//! One synchronous call per request: the uploaded image travels up as inline
//! base64 data alongside the fixed portrait instruction, and the first image
//! part of the response comes back as a base64 payload. The credential is
//! injected at construction, never read from the environment at request time.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as Base64;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::GeminiConfig;
use crate::errors::{Error, Result};
use crate::upload::UploadedImage;

/// The fixed, non-configurable transformation instruction sent with every
/// upload. Kept as a single named constant so tests and future localization
/// have one place to look.
pub const PORTRAIT_INSTRUCTION: &str = "\
Transform this headshot photo into a professional portrait while preserving the person's identity and facial features. Make the following enhancements:

1. Replace the background with a clean, neutral, professional studio-like background (soft gradient or solid professional color)
2. Transform clothing to professional business attire (business suit or formal shirt/blouse, professional colors)
3. Enhance hair styling and grooming to professional standards
4. Improve lighting, color balance, and overall image clarity
5. Maintain natural skin tone and facial features exactly as they are
6. Ensure the person looks polished and professional while keeping their authentic appearance
7. Ensure the person is looking directly into the camera
8. Ensure the person is standing straight and confidently
9. Ensure the person is wearing a professional tie or bow tie if appropriate
10. Ensure the person is wearing professional watches and glasses if appropriate

The result should look like a high-quality professional headshot suitable for LinkedIn, corporate websites, or business cards.";

/// Client for the generative-image upstream.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: Url,
}

impl GeminiClient {
    /// Build a client from configuration. Returns `None` when no credential
    /// is configured; the gateway then reports a configuration error per
    /// request instead of refusing to start.
    pub fn from_config(config: &GeminiConfig) -> anyhow::Result<Option<Self>> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Some(Self {
            http,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
        }))
    }

    /// Send one image plus instruction upstream and return the base64
    /// payload of the first image part in the response.
    ///
    /// The payload is passed through exactly as the upstream returned it;
    /// no decode/re-encode round trip.
    #[tracing::instrument(skip_all, fields(model = %self.model, upload_bytes = image.size()))]
    pub async fn transform_image(&self, image: &UploadedImage, instruction: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.as_str().trim_end_matches('/'),
            self.model,
        );

        let body = GenerateContentRequest::new(image, instruction);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Upstream { message: e.to_string() })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_upstream_error(status, &text));
        }

        let response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Upstream { message: e.to_string() })?;

        extract_image_payload(response)
    }
}

/// Scan the ordered response parts for the first one carrying inline image
/// data. First match wins; multiple image parts are never merged.
fn extract_image_payload(response: GenerateContentResponse) -> Result<String> {
    let candidate = response.candidates.into_iter().next().ok_or(Error::EmptyResponse)?;

    let parts = candidate
        .content
        .and_then(|content| content.parts)
        .ok_or(Error::MalformedResponse)?;

    parts
        .into_iter()
        .find_map(|part| match part {
            ResponsePart::Image { inline_data } => Some(inline_data.data),
            _ => None,
        })
        .ok_or(Error::NoImageInResponse)
}

/// Map an upstream failure onto the gateway taxonomy.
///
/// Structured signals (HTTP status, the error's gRPC-style status code) are
/// consulted first; the prose substrings the vendor has historically used
/// are kept as a compatibility shim and never override a structured signal.
fn classify_upstream_error(status: StatusCode, body: &str) -> Error {
    let parsed: Option<GeminiErrorEnvelope> = serde_json::from_str(body).ok();
    let code = parsed.as_ref().and_then(|envelope| envelope.error.status.as_deref());
    let message = parsed
        .as_ref()
        .map(|envelope| envelope.error.message.clone())
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || matches!(code, Some("UNAUTHENTICATED") | Some("PERMISSION_DENIED"))
    {
        return Error::InvalidCredential;
    }

    if status == StatusCode::TOO_MANY_REQUESTS || code == Some("RESOURCE_EXHAUSTED") {
        return Error::QuotaExceeded;
    }

    let lower = message.to_lowercase();
    if lower.contains("api key") {
        return Error::InvalidCredential;
    }
    if lower.contains("quota") {
        return Error::QuotaExceeded;
    }

    Error::Upstream { message }
}

// Wire types for generateContent.
// https://ai.google.dev/api/generate-content

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

/// A part in a request - either inline image data or text.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
}

impl GenerateContentRequest {
    fn new(image: &UploadedImage, instruction: &str) -> Self {
        // Image first, instruction second, matching the editing convention
        let parts = vec![
            RequestPart::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type.clone(),
                    data: Base64.encode(&image.bytes),
                },
            },
            RequestPart::Text {
                text: instruction.to_string(),
            },
        ];

        Self {
            contents: vec![RequestContent { parts }],
            generation_config: GenerationConfig {
                response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

/// A part in a response - the model interleaves text and image parts in
/// arbitrary order, so each is a tagged variant and unknown kinds are kept
/// inert rather than failing deserialization.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ResponsePart {
    Image {
        #[serde(rename = "inlineData")]
        inline_data: InlineImage,
    },
    Text {
        #[allow(dead_code)]
        text: String,
    },
    Other(#[allow(dead_code)] serde_json::Value),
}

#[derive(Debug, Deserialize)]
struct InlineImage {
    data: String,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    message: String,
    status: Option<String>,
}
