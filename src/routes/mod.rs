//! HTTP handlers and the mapping of service failures onto responses.

use actix_web::HttpResponse;

use crate::dto::api::ErrorBody;
use crate::repository::errors::RepositoryError;
use crate::services::ServiceError;

pub mod api;

/// Converts a service failure into its JSON error response.
///
/// Validation failures carry per-field messages; anything unexpected is logged
/// and answered with a generic 500 body.
pub fn service_error_response(err: ServiceError, action: &str) -> HttpResponse {
    match err {
        ServiceError::Query(query_error) => HttpResponse::BadRequest().json(
            ErrorBody::new("invalid query parameters").with_errors(query_error.field_messages()),
        ),
        ServiceError::TypeConstraint(message) => {
            HttpResponse::BadRequest().json(ErrorBody::new(message))
        }
        ServiceError::Unauthenticated => {
            HttpResponse::Unauthorized().json(ErrorBody::new("authentication required"))
        }
        ServiceError::Unauthorized => {
            HttpResponse::Forbidden().json(ErrorBody::new("insufficient permissions"))
        }
        ServiceError::NotFound | ServiceError::Repository(RepositoryError::NotFound) => {
            HttpResponse::NotFound().json(ErrorBody::new("not found"))
        }
        ServiceError::Precondition(message) => {
            HttpResponse::UnprocessableEntity().json(ErrorBody::new(message))
        }
        err => {
            log::error!("Failed to {action}: {err}");
            HttpResponse::InternalServerError().json(ErrorBody::new("internal server error"))
        }
    }
}
