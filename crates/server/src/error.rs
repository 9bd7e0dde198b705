use actix_web::http::header::WWW_AUTHENTICATE;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use simsearch_common::SimSearchError;
use tracing::{error, warn};

use crate::types::ErrorResponse;

/// HTTP face of `SimSearchError`
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub SimSearchError);

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }

        let mut builder = HttpResponse::build(status);
        if matches!(self.0, SimSearchError::Unauthorized) {
            builder.insert_header((WWW_AUTHENTICATE, "Bearer"));
        }
        builder.json(ErrorResponse {
            error: self.0.kind().to_string(),
            message: self.0.public_message(),
        })
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
