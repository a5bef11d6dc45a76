use rouille::Response;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{domain::fields::FieldError, storage::error::StorageError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal: {0}")]
    Internal(String),
}

/// JSON body of every failed response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::TrackNotFound(id) => {
                ApiError::NotFound(format!("Track {} doesn't exist", id))
            }

            StorageError::Database(_) | StorageError::Internal(_) => {
                log::error!("storage failure: {err}");
                ApiError::Internal("internal server error".into())
            }
        }
    }
}

impl From<FieldError> for ApiError {
    fn from(err: FieldError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::BadRequest(_) => 400,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) | ApiError::Internal(msg) => msg,
        }
    }

    pub fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            message: self.message().to_string(),
        };
        Response::json(&body).with_status_code(status)
    }
}
