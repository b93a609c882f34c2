//! HTTP Handlers for the Bookmarks API

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use super::model::BookmarkInput;
use super::validate;
use crate::error::ApiError;
use crate::handler::AppState;

type ApiResult = Result<Response, ApiError>;

fn success<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

fn empty() -> Response {
    success(json!({}))
}

fn parse_body(payload: Result<Json<BookmarkInput>, JsonRejection>) -> Result<BookmarkInput, ApiError> {
    payload
        .map(|Json(input)| input)
        .map_err(|rejection| ApiError::validation(rejection.body_text()))
}

fn parse_path(path: Result<Path<String>, PathRejection>) -> Result<String, ApiError> {
    path.map(|Path(bookmark_id)| bookmark_id).map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "rejected bookmark id");
        ApiError::validation("invalid bookmark id")
    })
}

pub async fn list_bookmarks(State(state): State<AppState>) -> ApiResult {
    let bookmarks = state.bookmarks.list().await?;
    tracing::info!(count = bookmarks.len(), "got bookmarks");
    Ok(success(bookmarks))
}

pub async fn get_bookmark(State(state): State<AppState>, path: Result<Path<String>, PathRejection>) -> ApiResult {
    let bookmark_id = parse_path(path)?;
    let bookmark = validate::ensure_bookmark(state.bookmarks.as_ref(), &bookmark_id).await?;
    Ok(success(bookmark))
}

pub async fn create_bookmark(
    State(state): State<AppState>,
    payload: Result<Json<BookmarkInput>, JsonRejection>,
) -> ApiResult {
    let input = parse_body(payload)?;
    validate::run(&input, validate::CREATE_CHECKS)?;

    let saved = state.bookmarks.insert(validate::into_new_bookmark(input)).await?;
    tracing::info!(id = saved.id, "created bookmark");

    let location = format!("/bookmarks/{}", saved.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(saved)).into_response())
}

pub async fn update_bookmark(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<BookmarkInput>, JsonRejection>,
) -> ApiResult {
    let bookmark_id = parse_path(path)?;
    let bookmark = validate::ensure_bookmark(state.bookmarks.as_ref(), &bookmark_id).await?;
    let input = parse_body(payload)?;
    validate::run(&input, validate::UPDATE_CHECKS)?;

    // The row can vanish between the existence check and the write.
    if state.bookmarks.update(bookmark.id, validate::into_changes(input)).await?.is_none() {
        return Err(ApiError::NotFound(format!("unable to find bookmark with id {}", bookmark.id)));
    }
    tracing::info!(id = bookmark.id, "updated bookmark");

    Ok(empty())
}

pub async fn delete_bookmark(State(state): State<AppState>, path: Result<Path<String>, PathRejection>) -> ApiResult {
    let bookmark_id = parse_path(path)?;
    let bookmark = validate::ensure_bookmark(state.bookmarks.as_ref(), &bookmark_id).await?;

    state.bookmarks.delete(bookmark.id).await?;
    tracing::info!(id = bookmark.id, "deleted bookmark");

    Ok(empty())
}
