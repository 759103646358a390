//! HTTP handlers for `/books`.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookly_http::error::AppError;
use serde_json::Value;

use super::models::{BookEnvelope, BooksEnvelope};
use super::schema::{SchemaName, SchemaRegistry};
use super::store::BookStore;

/// Shared handler state.
#[derive(Clone)]
pub struct BooksState {
    pub store: Arc<dyn BookStore>,
    pub schemas: Arc<SchemaRegistry>,
}

pub fn router(state: BooksState) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/{isbn}", get(get_book).put(update_book))
        .with_state(state)
}

async fn list_books(State(state): State<BooksState>) -> Result<Json<BooksEnvelope>, AppError> {
    let books = state.store.list_all().await?;
    Ok(Json(BooksEnvelope { books }))
}

async fn get_book(
    State(state): State<BooksState>,
    Path(isbn): Path<String>,
) -> Result<Json<BookEnvelope>, AppError> {
    let book = state.store.get_by_isbn(&isbn).await?;
    Ok(Json(BookEnvelope { book }))
}

async fn create_book(
    State(state): State<BooksState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<BookEnvelope>), AppError> {
    let Json(payload) = payload?;
    let book = state
        .schemas
        .validate_book(SchemaName::BookCreate, payload)
        .map_err(AppError::validation)?;

    let book = state.store.create(book).await?;
    tracing::info!(target: "bookly::books", isbn = %book.isbn, "book created");

    Ok((StatusCode::CREATED, Json(BookEnvelope { book })))
}

async fn update_book(
    State(state): State<BooksState>,
    Path(isbn): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BookEnvelope>, AppError> {
    let Json(payload) = payload?;
    let book = state
        .schemas
        .validate_book(SchemaName::BookUpdate, payload)
        .map_err(AppError::validation)?;

    // The path names the row; the body may not silently re-key it.
    if book.isbn != isbn {
        return Err(AppError::bad_request(format!(
            "isbn in body ('{}') does not match isbn in path ('{}')",
            book.isbn, isbn
        )));
    }

    let book = state.store.update(&isbn, book).await?;
    tracing::info!(target: "bookly::books", isbn = %book.isbn, "book updated");

    Ok(Json(BookEnvelope { book }))
}
