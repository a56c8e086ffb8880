//! API error type and its HTTP mapping.

use crate::executor::DbError;
use crate::profile::IdentError;

#[derive(Debug)]
pub enum ApiError {
    /// Malformed identifier or parameter (400)
    BadRequest(String),
    /// Unknown route, table or column (404)
    NotFound(String),
    /// Anything but GET/OPTIONS (405)
    MethodNotAllowed(String),
    /// Database failure (500)
    Database(DbError),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::MethodNotAllowed(_) => 405,
            ApiError::Database(_) => 500,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => f.write_str(msg),
            ApiError::MethodNotAllowed(method) => write!(f, "Method {method} not allowed"),
            ApiError::Database(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<IdentError> for ApiError {
    fn from(err: IdentError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        ApiError::Database(err)
    }
}
