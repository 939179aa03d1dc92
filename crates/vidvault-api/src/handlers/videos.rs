use crate::constants::{
    MSG_DESCRIPTION_UPDATED, MSG_VIDEO_DELETED, MSG_VIDEO_NOT_FOUND, MSG_VIDEO_UPLOADED,
    VIDEOS_MOUNT,
};
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::services::PersistedVideo;
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::io::StreamReader;
use utoipa::ToSchema;
use uuid::Uuid;
use vidvault_core::{AppError, Config, VideoView};

/// Multipart field carrying the video file.
const VIDEO_FIELD: &str = "video";
/// Multipart field carrying the optional description.
const DESCRIPTION_FIELD: &str = "description";

#[derive(Debug, Serialize, ToSchema)]
pub struct VideoMessageResponse {
    pub message: String,
    pub video: VideoView,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateVideoRequest {
    /// New description. Missing or empty keeps the current one.
    #[serde(default)]
    pub description: Option<String>,
}

/// Base URL for playable links: the configured public URL, else the request's host.
fn video_base_url(config: &Config, headers: &HeaderMap) -> String {
    if let Some(url) = &config.public_base_url {
        return url.clone();
    }

    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| format!("localhost:{}", config.server_port));

    format!("http://{}{}", host, VIDEOS_MOUNT)
}

/// Ids that are not UUIDs cannot name a stored video.
fn parse_video_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(MSG_VIDEO_NOT_FOUND.to_string()))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::InvalidInput(format!("Invalid multipart body: {}", err.body_text()))
    }
}

#[utoipa::path(
    get,
    path = "/api/videos",
    tag = "videos",
    responses(
        (status = 200, description = "All videos in upload order", body = Vec<VideoView>),
        (status = 500, description = "Metadata store unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, headers))]
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<VideoView>>, HttpAppError> {
    let base_url = video_base_url(&state.config, &headers);
    let videos = state.videos.list(&base_url).await?;
    Ok(Json(videos))
}

#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "videos",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Field `video`: the file (required). Field `description`: text (optional)."),
    responses(
        (status = 200, description = "Video uploaded successfully", body = VideoMessageResponse),
        (status = 400, description = "Missing or duplicate video field", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Upload could not be stored", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, headers, multipart))]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<VideoMessageResponse>, HttpAppError> {
    let mut persisted: Option<PersistedVideo> = None;
    let mut description: Option<String> = None;

    // The description may arrive before or after the file, so the file is persisted
    // first and only committed once the whole form has been read.
    let read_result: Result<(), AppError> = async {
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some(VIDEO_FIELD) => {
                    if persisted.is_some() {
                        return Err(AppError::InvalidInput(
                            "Only one video file may be uploaded per request".to_string(),
                        ));
                    }

                    let filename = field.file_name().unwrap_or("video").to_string();
                    let too_large = AtomicBool::new(false);
                    let result = {
                        let stream = field.map_err(|e| {
                            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                                too_large.store(true, Ordering::Relaxed);
                            }
                            io::Error::new(io::ErrorKind::Other, e)
                        });
                        let reader = StreamReader::new(stream);
                        tokio::pin!(reader);
                        state.uploads.persist(&filename, &mut reader).await
                    };

                    match result {
                        Ok(video) => persisted = Some(video),
                        Err(_) if too_large.load(Ordering::Relaxed) => {
                            return Err(AppError::PayloadTooLarge(format!(
                                "Video exceeds the {} MB limit",
                                state.config.max_video_size_bytes / 1024 / 1024
                            )));
                        }
                        Err(e) => return Err(e),
                    }
                }
                Some(DESCRIPTION_FIELD) => {
                    let text = field.text().await.map_err(multipart_error)?;
                    description = Some(text).filter(|d| !d.is_empty());
                }
                other => {
                    tracing::debug!(field = ?other, "Ignoring unexpected multipart field");
                }
            }
        }
        Ok(())
    }
    .await;

    if let Err(e) = read_result {
        if let Some(video) = &persisted {
            state.uploads.discard(video).await;
        }
        return Err(e.into());
    }

    let persisted = persisted
        .ok_or_else(|| AppError::InvalidInput("No video file provided".to_string()))?;

    let record = match state.uploads.complete(&persisted, description).await {
        Ok(record) => record,
        Err(e) => {
            state.uploads.discard(&persisted).await;
            return Err(e.into());
        }
    };

    let base_url = video_base_url(&state.config, &headers);
    Ok(Json(VideoMessageResponse {
        message: MSG_VIDEO_UPLOADED.to_string(),
        video: VideoView::from_record(&record, &base_url),
    }))
}

#[utoipa::path(
    put,
    path = "/api/videos/{id}",
    tag = "videos",
    params(
        ("id" = String, Path, description = "Video ID")
    ),
    request_body = UpdateVideoRequest,
    responses(
        (status = 200, description = "Description updated", body = VideoMessageResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 500, description = "Metadata could not be saved", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, headers, request))]
pub async fn update_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<UpdateVideoRequest>,
) -> Result<Json<VideoMessageResponse>, HttpAppError> {
    let id = parse_video_id(&id)?;
    let record = state
        .videos
        .update_description(id, request.description)
        .await?;

    let base_url = video_base_url(&state.config, &headers);
    Ok(Json(VideoMessageResponse {
        message: MSG_DESCRIPTION_UPDATED.to_string(),
        video: VideoView::from_record(&record, &base_url),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/videos/{id}",
    tag = "videos",
    params(
        ("id" = String, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video and its file deleted", body = MessageResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 500, description = "File or metadata could not be removed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn delete_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, HttpAppError> {
    let id = parse_video_id(&id)?;
    state.videos.delete(id).await?;

    Ok(Json(MessageResponse {
        message: MSG_VIDEO_DELETED.to_string(),
    }))
}
