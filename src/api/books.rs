use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, PageQuery, TOTAL_COUNT_HEADER};
use crate::api::validation::{catalog_id, validate_page};
use crate::models::catalog::Book;

async fn validate_book(state: &AppState, book: &Book) -> Result<(), ApiError> {
    if book.title.trim().is_empty() {
        return Err(ApiError::validation("Book title cannot be empty"));
    }

    if book.price.is_some_and(|p| p < 0.0 || !p.is_finite()) {
        return Err(ApiError::validation("Book price cannot be negative"));
    }

    if let Some(author_id) = book.author_id
        && !state.store().author_exists(author_id).await?
    {
        return Err(ApiError::validation(format!(
            "Author {} does not exist",
            author_id
        )));
    }

    Ok(())
}

pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, per_page) = validate_page(query.page, query.per_page)?;
    let result = state.store().list_books(page, per_page).await?;

    Ok((
        [(TOTAL_COUNT_HEADER, result.total.to_string())],
        Json(ApiResponse::success(result.items)),
    ))
}

pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<Book>>, ApiError> {
    let id = catalog_id("Book", &raw_id)?;
    let book = state
        .store()
        .get_book(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Book", id))?;

    Ok(Json(ApiResponse::success(book)))
}

pub async fn create_book(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Book>,
) -> Result<(StatusCode, Json<ApiResponse<Book>>), ApiError> {
    if payload.id.is_some() {
        return Err(ApiError::validation("A new book cannot already have an ID"));
    }
    validate_book(&state, &payload).await?;

    let book = state.store().create_book(&payload).await?;
    tracing::debug!(book_id = ?book.id, "Created book");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(book))))
}

/// PUT /books. A body without an id is created instead.
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Book>,
) -> Result<Response, ApiError> {
    let Some(id) = payload.id else {
        return create_book(State(state), Json(payload))
            .await
            .map(IntoResponse::into_response);
    };
    validate_book(&state, &payload).await?;

    let book = state
        .store()
        .update_book(id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Book", id))?;

    Ok(Json(ApiResponse::success(book)).into_response())
}

pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = catalog_id("Book", &raw_id)?;
    if !state.store().delete_book(id).await? {
        return Err(ApiError::not_found("Book", id));
    }

    tracing::debug!(book_id = id, "Deleted book");
    Ok(Json(ApiResponse::success(())))
}
