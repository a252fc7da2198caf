//! HTTP handlers for the books module, mounted under `/api/books`.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        OriginalUri, Path, Query, State,
    },
    routing::{get, patch, post},
    Json, Router,
};
use bookshelf_http::error::AppError;

use super::models::{BookView, PartialUpdate, SearchFilter};
use super::service::{BookError, BookService};

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::Validation(message) => AppError::validation(message),
            BookError::InvalidArgument(message) => AppError::invalid_input(message),
            err @ BookError::NotFound(_) => AppError::not_found(err.to_string()),
            BookError::Store(source) => AppError::from(anyhow::Error::new(source)),
        }
    }
}

/// Build the books router over a shared service.
pub fn router(service: Arc<BookService>) -> Router {
    Router::new()
        .route("/create", post(create_book))
        .route("/search", get(search_books))
        .route("/check", get(available_titles))
        .route("/health", get(health_check))
        .route("/{id}", patch(update_book).delete(delete_book))
        .with_state(service)
}

async fn health_check() -> &'static str {
    "books module is healthy"
}

async fn create_book(
    State(service): State<Arc<BookService>>,
    OriginalUri(uri): OriginalUri,
    payload: Result<Json<BookView>, JsonRejection>,
) -> Result<String, AppError> {
    let Json(view) = payload.map_err(|rejection| {
        AppError::validation(rejection.body_text()).at(uri.path())
    })?;

    let id = service
        .create(view)
        .await
        .map_err(|err| AppError::from(err).at(uri.path()))?;

    Ok(format!("Book created with id: {}", id))
}

async fn search_books(
    State(service): State<Arc<BookService>>,
    OriginalUri(uri): OriginalUri,
    filter: Result<Query<SearchFilter>, QueryRejection>,
) -> Result<Json<Vec<BookView>>, AppError> {
    let Query(filter) = filter.map_err(|rejection| {
        AppError::validation(rejection.body_text()).at(uri.path())
    })?;

    let books = service
        .search(filter)
        .await
        .map_err(|err| AppError::from(err).at(uri.path()))?;

    Ok(Json(books))
}

async fn available_titles(
    State(service): State<Arc<BookService>>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<Vec<String>>, AppError> {
    let titles = service
        .available_titles()
        .await
        .map_err(|err| AppError::from(err).at(uri.path()))?;

    Ok(Json(titles))
}

/// A JSON `null` body reaches the service as `None`.
async fn update_book(
    State(service): State<Arc<BookService>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    payload: Result<Json<Option<PartialUpdate>>, JsonRejection>,
) -> Result<&'static str, AppError> {
    let Json(updates) = payload.map_err(|rejection| {
        AppError::validation(rejection.body_text()).at(uri.path())
    })?;

    service
        .update(&id, updates)
        .await
        .map_err(|err| AppError::from(err).at(uri.path()))
}

async fn delete_book(
    State(service): State<Arc<BookService>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> Result<String, AppError> {
    service
        .delete(&id)
        .await
        .map_err(|err| AppError::from(err).at(uri.path()))
}
