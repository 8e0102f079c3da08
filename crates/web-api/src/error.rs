use application::ApplicationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code,
                message: message.into(),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        use ApplicationError as AppErr;

        match error {
            AppErr::Validation(message) => {
                ApiError::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message)
            }
            AppErr::Upstream(err) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "MEDIA_ENGINE_ERROR",
                format!("media engine error: {}", err),
            ),
            AppErr::UploadTimeout(timeout) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "MEDIA_ENGINE_TIMEOUT",
                format!("upload relay timed out after {:?}", timeout),
            ),
            AppErr::Persistence(err) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                format!("database error: {}", err),
            ),
            AppErr::Serialize(err) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                format!("serialization error: {}", err),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::MediaError;
    use std::time::Duration;

    #[test]
    fn upstream_failures_map_to_internal_error() {
        let err = ApiError::from(ApplicationError::Upstream(MediaError::Unavailable(
            "refused".into(),
        )));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = ApiError::from(ApplicationError::UploadTimeout(Duration::from_secs(10)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_maps_to_bad_request() {
        let err = ApiError::from(ApplicationError::Validation("missing file".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
