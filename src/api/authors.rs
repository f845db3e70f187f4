use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, PageQuery, TOTAL_COUNT_HEADER};
use crate::api::validation::{catalog_id, validate_page};
use crate::models::catalog::{Author, Book};

fn validate_author(author: &Author) -> Result<(), ApiError> {
    if author.name.trim().is_empty() {
        return Err(ApiError::validation("Author name cannot be empty"));
    }
    if author.surname.trim().is_empty() {
        return Err(ApiError::validation("Author surname cannot be empty"));
    }
    Ok(())
}

pub async fn list_authors(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, per_page) = validate_page(query.page, query.per_page)?;
    let result = state.store().list_authors(page, per_page).await?;

    Ok((
        [(TOTAL_COUNT_HEADER, result.total.to_string())],
        Json(ApiResponse::success(result.items)),
    ))
}

pub async fn get_author(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<Author>>, ApiError> {
    let id = catalog_id("Author", &raw_id)?;
    let author = state
        .store()
        .get_author(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Author", id))?;

    Ok(Json(ApiResponse::success(author)))
}

pub async fn list_author_books(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Book>>>, ApiError> {
    let id = catalog_id("Author", &raw_id)?;
    if !state.store().author_exists(id).await? {
        return Err(ApiError::not_found("Author", id));
    }

    let books = state.store().list_books_for_author(id).await?;
    Ok(Json(ApiResponse::success(books)))
}

pub async fn create_author(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Author>,
) -> Result<(StatusCode, Json<ApiResponse<Author>>), ApiError> {
    if payload.id.is_some() {
        return Err(ApiError::validation(
            "A new author cannot already have an ID",
        ));
    }
    validate_author(&payload)?;

    let author = state.store().create_author(&payload).await?;
    tracing::debug!(author_id = ?author.id, "Created author");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(author))))
}

/// PUT /authors. A body without an id is created instead.
pub async fn update_author(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Author>,
) -> Result<Response, ApiError> {
    let Some(id) = payload.id else {
        return create_author(State(state), Json(payload))
            .await
            .map(IntoResponse::into_response);
    };
    validate_author(&payload)?;

    let author = state
        .store()
        .update_author(id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Author", id))?;

    Ok(Json(ApiResponse::success(author)).into_response())
}

pub async fn delete_author(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = catalog_id("Author", &raw_id)?;
    if !state.store().delete_author(id).await? {
        return Err(ApiError::not_found("Author", id));
    }

    tracing::debug!(author_id = id, "Deleted author");
    Ok(Json(ApiResponse::success(())))
}
