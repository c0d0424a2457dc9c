//! Mapping of sync errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use entity_sync_shared::Entity;
use serde::Serialize;

use crate::errors::SyncError;
use crate::server::headers::failure_alert;

/// JSON body of every error response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub entity_name: &'static str,
    pub error_key: &'static str,
    pub message: String,
    pub status: u16,
}

/// A [`SyncError`] raised while serving a request for one entity type.
#[derive(Debug)]
pub struct ApiError {
    entity: &'static str,
    error: SyncError,
}

impl ApiError {
    pub fn new(entity: &'static str, error: SyncError) -> Self {
        Self { entity, error }
    }

    /// Wrap an error from an `E` operation. Usable directly in `map_err`.
    pub fn for_entity<E: Entity>(error: SyncError) -> Self {
        Self::new(E::ENTITY_NAME, error)
    }

    /// Status code and error key for the wrapped error.
    pub fn classify(&self) -> (StatusCode, &'static str) {
        match &self.error {
            SyncError::Validation { .. } => (StatusCode::BAD_REQUEST, "idexists"),
            SyncError::NotFound { .. } => (StatusCode::NOT_FOUND, "notfound"),
            SyncError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storefailure"),
            SyncError::Index { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "indexstale"),
            SyncError::Search { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "searchfailure"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_key) = self.classify();
        let body = ErrorBody {
            entity_name: self.entity,
            error_key,
            message: self.error.to_string(),
            status: status.as_u16(),
        };

        (status, failure_alert(self.entity, error_key), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity_sync_repository::{RecordStoreError, SearchIndexError};
    use entity_sync_shared::Sample;

    #[test]
    fn test_classification() {
        let cases = [
            (
                SyncError::validation("sample", "A new sample cannot already have an ID"),
                StatusCode::BAD_REQUEST,
                "idexists",
            ),
            (
                SyncError::NotFound {
                    entity: "sample",
                    id: 1,
                },
                StatusCode::NOT_FOUND,
                "notfound",
            ),
            (
                SyncError::Store(RecordStoreError::unavailable("down")),
                StatusCode::INTERNAL_SERVER_ERROR,
                "storefailure",
            ),
            (
                SyncError::Index {
                    entity: "sample",
                    id: 1,
                    source: SearchIndexError::index("down"),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
                "indexstale",
            ),
        ];

        for (error, status, key) in cases {
            assert_eq!(ApiError::for_entity::<Sample>(error).classify(), (status, key));
        }
    }

    #[test]
    fn test_response_carries_failure_headers() {
        let response =
            ApiError::for_entity::<Sample>(SyncError::validation("sample", "bad")).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["x-entitysyncapp-error"], "error.idexists");
        assert_eq!(response.headers()["x-entitysyncapp-params"], "sample");
    }
}
