//! OpenAPI documentation configuration.
//!
//! The generated document is served at `/api-docs/openapi.json` and rendered
//! by RapiDoc at `/docs`.

use utoipa::OpenApi;

use crate::api;
use crate::api::models::transform::{HealthResponse, TransformResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "portraitd",
        description = "Stateless gateway that turns headshots into professional portraits via a hosted generative-image model"
    ),
    paths(api::handlers::transform::transform_image, api::handlers::transform::health),
    components(schemas(TransformResponse, HealthResponse)),
    tags(
        (name = "transform", description = "Headshot transformation"),
        (name = "health", description = "Gateway liveness")
    )
)]
pub struct ApiDoc;
