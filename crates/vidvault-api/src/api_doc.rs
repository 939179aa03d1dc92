//! OpenAPI documentation served at `/api/openapi.json` and rendered at `/docs`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use vidvault_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "vidvault API",
        version = "0.1.0",
        description = "Video registry: upload videos, list them with playable URLs, edit descriptions and delete videos together with their files."
    ),
    paths(
        handlers::videos::list_videos,
        handlers::videos::upload_video,
        handlers::videos::update_video,
        handlers::videos::delete_video,
    ),
    components(
        schemas(
            models::VideoView,
            handlers::videos::VideoMessageResponse,
            handlers::videos::MessageResponse,
            handlers::videos::UpdateVideoRequest,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "videos", description = "Video upload and management")
    )
)]
pub struct ApiDoc;
