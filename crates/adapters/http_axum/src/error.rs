//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use myhouse_domain::error::{AuthError, MyHouseError};

/// JSON error body returned by every endpoint.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: &'static str,
}

fn error_response(status: StatusCode, label: &'static str, message: String) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message,
            status: label,
        }),
    )
        .into_response()
}

/// Maps [`MyHouseError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(MyHouseError);

impl From<MyHouseError> for ApiError {
    fn from(err: MyHouseError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            MyHouseError::Validation(err) => {
                error_response(StatusCode::BAD_REQUEST, "BAD_REQUEST", err.to_string())
            }
            MyHouseError::NotFound(err) => {
                error_response(StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
            }
            MyHouseError::TokenCorruption(_) => error_response(
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                "Token corruption".to_string(),
            ),
            MyHouseError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SERVER_ERROR",
                    "Internal Server Error".to_string(),
                )
            }
        }
    }
}

/// Rejection produced when a request fails the auth gate.
#[derive(Debug)]
pub struct AuthRejection(pub AuthError);

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        error_response(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.0.to_string())
    }
}

/// A required request input is absent or unusable.
#[derive(Debug)]
pub struct BadRequest(pub &'static str);

impl IntoResponse for BadRequest {
    fn into_response(self) -> Response {
        error_response(StatusCode::BAD_REQUEST, "BAD_REQUEST", self.0.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use myhouse_domain::error::{CipherError, MalformedCredential, ValidationError};

    #[test]
    fn should_map_validation_to_bad_request() {
        let response = ApiError::from(MyHouseError::from(ValidationError::EmptyClientId)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn should_map_token_corruption_to_bad_request() {
        let response =
            ApiError::from(MyHouseError::TokenCorruption(CipherError::new("bad"))).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn should_map_storage_to_internal_server_error() {
        let response =
            ApiError::from(MyHouseError::Storage("disk on fire".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn should_map_every_auth_error_to_unauthorized() {
        for err in [
            AuthError::Missing,
            AuthError::Malformed(MalformedCredential::MissingSeparator),
            AuthError::Invalid,
        ] {
            assert_eq!(
                AuthRejection(err).into_response().status(),
                StatusCode::UNAUTHORIZED
            );
        }
    }
}
