use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::warn;

#[derive(thiserror::Error, Debug)]
pub(crate) enum Error {
    #[error(transparent)]
    Library(#[from] libgeoloc::Error),
    #[error("The request body was rejected: {0}")]
    BodyRejection(#[from] JsonRejection),
    #[error("The query string was rejected: {0}")]
    QueryRejection(#[from] QueryRejection),
    #[error("No location matches the given path: {0}")]
    PathRejection(#[from] PathRejection),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl Error {
    pub(crate) fn to_client_status(&self) -> (StatusCode, String) {
        use libgeoloc::Error as LibError;
        match self {
            Error::Library(e) => match e {
                LibError::MalformedInput(_) | LibError::Validation(_) => {
                    (StatusCode::BAD_REQUEST, e.to_string())
                }
                LibError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
                // store failures are passed through with their raw message
                _ => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            },
            Error::BodyRejection(rejection) => (
                StatusCode::BAD_REQUEST,
                format!("malformed input: {}", rejection.body_text()),
            ),
            Error::QueryRejection(rejection) => (
                StatusCode::BAD_REQUEST,
                format!("malformed query string: {}", rejection.body_text()),
            ),
            Error::PathRejection(_) => (StatusCode::NOT_FOUND, "Not found".to_string()),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        warn!("Got error for response: {self:?}");
        let (status, error) = self.to_client_status();
        (status, Json(ErrorBody { error })).into_response()
    }
}
