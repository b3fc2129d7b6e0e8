//! API handlers for Storyshelf REST endpoints

pub mod catalog;
pub mod children;
pub mod circulation;
pub mod health;
pub mod import;
pub mod isbn;
pub mod openapi;
pub mod reader;

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, AppState};

/// JSON body extractor whose rejections use the standard error body
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::validation("body", rejection.body_text())),
        }
    }
}

/// Query string extractor whose rejections use the standard error body
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::try_from_uri(&parts.uri)
            .map(|Query(value)| Self(value))
            .map_err(|rejection: QueryRejection| AppError::validation("query", rejection.body_text()))
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Children (anonymous readers)
        .route("/children", get(children::list_children))
        .route("/children", post(children::create_child))
        .route("/children/:id", get(children::get_child))
        .route("/children/:id", patch(children::update_child))
        .route("/children/:id", delete(children::delete_child))
        // Circulation
        .route("/checkout", post(circulation::checkout))
        .route("/return", post(circulation::return_loan))
        .route("/loans", get(circulation::list_loans))
        .route("/loans/:id", get(circulation::get_loan))
        // Reader page and journal
        .route("/reader/:emoji_id", get(reader::reader_lookup))
        .route("/journal", post(reader::create_journal_entry))
        // Catalog
        .route("/books", get(catalog::list_books))
        .route("/books", post(catalog::create_book))
        .route("/books/:id", get(catalog::get_book))
        .route("/books/:id", delete(catalog::delete_book))
        .route("/copies", get(catalog::list_copies))
        .route("/copies", post(catalog::create_copy))
        .route("/copies/:id", delete(catalog::delete_copy))
        .route("/copies/:id/status", patch(catalog::set_copy_status))
        .route("/catalogue", get(catalog::catalogue))
        .route("/locations", get(catalog::list_locations))
        .route("/locations", post(catalog::create_location))
        // Bulk import and ISBN lookup
        .route("/import/csv", post(import::import_csv))
        .route("/isbn", get(isbn::lookup_isbn))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
