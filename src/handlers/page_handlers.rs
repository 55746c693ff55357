//! HTTP handlers for SEO page operations.
//! Thin wrappers that deserialize the wire shapes and delegate to
//! `PageService`.

use crate::{
    errors::AppError,
    models::seo::{PageRequest, SeoPageDto},
    services::page_service::PageService,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

/// GET `/pages/{code}` — fetch a page with its SEO data expanded.
pub async fn get_page(
    State(service): State<PageService>,
    Path(code): Path<String>,
) -> Result<Json<SeoPageDto>, AppError> {
    let dto = service.get_page(&code).await?;
    Ok(Json(dto))
}

/// GET `/pages` — list stored page codes.
pub async fn list_pages(
    State(service): State<PageService>,
) -> Result<Json<Vec<String>>, AppError> {
    let codes = service.list_pages().await?;
    Ok(Json(codes))
}

/// POST `/pages` — create a page from a request body.
pub async fn create_page(
    State(service): State<PageService>,
    Json(request): Json<PageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let dto = service.create_page(request).await?;
    Ok((StatusCode::CREATED, Json(dto)))
}

/// PUT `/pages/{code}` — replace a page's metadata wholesale.
///
/// The body's owner group must match the stored one; the path code wins
/// over any code in the body.
pub async fn update_page(
    State(service): State<PageService>,
    Path(code): Path<String>,
    Json(request): Json<PageRequest>,
) -> Result<Json<SeoPageDto>, AppError> {
    let dto = service.update_page(&code, request).await?;
    Ok(Json(dto))
}

/// DELETE `/pages/{code}` — remove a page and its metadata.
pub async fn delete_page(
    State(service): State<PageService>,
    Path(code): Path<String>,
) -> Result<StatusCode, AppError> {
    service.delete_page(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}
