use rocket::http::{ContentType, Status};
use rocket::response::Responder;
use rocket::{Request, Response};
use rocket_okapi::OpenApiError;
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::Responses;
use rocket_okapi::response::OpenApiResponderInner;
use std::io::Cursor;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to load stored data")]
    Redis {
        message: String,
        #[source]
        source: redis::RedisError,
    },
    #[error("Failed to load stored data")]
    Db {
        message: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("Failed to load stored data")]
    Serialization {
        message: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),
    #[error("No company has been registered")]
    CompanyNotRegistered,
    #[error("A company is already registered")]
    CompanyAlreadyRegistered,
    #[error("Verification session not found")]
    SessionNotFound,
    #[error("Verification session has expired")]
    SessionExpired,
    #[error("Cannot continue: {0}")]
    StepBlocked(String),
    #[error("Invalid attachment: {0}")]
    InvalidAttachment(String),
    #[error("Attachment of {size} bytes exceeds the {limit} byte limit")]
    AttachmentTooLarge { size: usize, limit: usize },
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    pub fn redis(message: impl Into<String>, source: redis::RedisError) -> Self {
        Self::Redis {
            message: message.into(),
            source,
        }
    }

    pub fn db(message: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Db {
            message: message.into(),
            source,
        }
    }

    pub fn serialization(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            message: message.into(),
            source,
        }
    }
}

impl From<&AppError> for Status {
    fn from(e: &AppError) -> Self {
        match e {
            AppError::Redis { .. } => Status::InternalServerError,
            AppError::Db { .. } => Status::InternalServerError,
            AppError::Serialization { .. } => Status::InternalServerError,
            AppError::BadRequest(_) => Status::BadRequest,
            AppError::NotFound(_) => Status::NotFound,
            AppError::ValidationError(_) => Status::BadRequest,
            AppError::CompanyNotRegistered => Status::NotFound,
            AppError::CompanyAlreadyRegistered => Status::Conflict,
            AppError::SessionNotFound => Status::NotFound,
            AppError::SessionExpired => Status::Gone,
            AppError::StepBlocked(_) => Status::Conflict,
            AppError::InvalidAttachment(_) => Status::BadRequest,
            AppError::AttachmentTooLarge { .. } => Status::PayloadTooLarge,
            AppError::Internal(_) => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, req: &Request<'_>) -> rocket::response::Result<'static> {
        let method = req.method();
        let uri = req.uri();

        let request_id = req
            .local_cache(|| None::<crate::middleware::RequestId>)
            .as_ref()
            .map(|r| r.0.as_str())
            .unwrap_or("unknown");

        let status = Status::from(&self);

        if status.class().is_server_error() {
            error!(
                error = ?self,
                request_id = %request_id,
                method = %method,
                uri = %uri,
                "request failed"
            );
        } else {
            tracing::warn!(
                error = %self,
                request_id = %request_id,
                method = %method,
                uri = %uri,
                "request rejected"
            );
        }

        let body = serde_json::json!({ "message": self.to_string() }).to_string();

        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}

impl OpenApiResponderInner for AppError {
    fn responses(_gen: &mut OpenApiGenerator) -> Result<Responses, OpenApiError> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response as OpenApiResponse};
        let mut responses = Responses::default();
        for (code, description) in [
            ("400", "Bad Request"),
            ("404", "Not Found"),
            ("409", "Conflict"),
            ("410", "Gone"),
            ("413", "Payload Too Large"),
            ("500", "Internal Server Error"),
        ] {
            responses.responses.insert(
                code.to_string(),
                RefOr::Object(OpenApiResponse {
                    description: description.to_string(),
                    ..Default::default()
                }),
            );
        }
        Ok(responses)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::db("Database error", e)
    }
}

impl From<redis::RedisError> for AppError {
    fn from(e: redis::RedisError) -> Self {
        AppError::redis("Redis error", e)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::serialization("Malformed stored JSON", e)
    }
}
