use lambda_http::http::StatusCode;
use thiserror::Error;

/// Domain outcomes that handlers translate into HTTP responses.
///
/// `Blob` and `Storage` carry backend detail that is logged server-side but
/// never returned to the caller.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("blob store error: {0}")]
    Blob(String),

    #[error("metadata store error: {0}")]
    Storage(String),

    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Blob(_) | ServiceError::Storage(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The message exposed in the response body. Backend failures get a
    /// generic message; the detail stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::InvalidRequest(msg) | ServiceError::NotFound(msg) => msg.clone(),
            ServiceError::Blob(_) | ServiceError::Storage(_) => "A service error occurred.".to_string(),
            ServiceError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_errors_hide_detail() {
        let err = ServiceError::Storage("connection reset".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "A service error occurred.");
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn caller_errors_keep_their_message() {
        let err = ServiceError::NotFound("Image with ID 'abc' not found.".to_string());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.public_message(), "Image with ID 'abc' not found.");

        let err = ServiceError::InvalidRequest("Invalid nextToken format.".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Invalid nextToken format.");
    }
}
