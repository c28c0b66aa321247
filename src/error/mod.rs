use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use deadpool_redis::redis;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcErrorResponse {
    pub jsonrpc: &'static str,
    pub id: Option<Value>,
    pub error: JsonRpcError,
}

impl JsonRpcErrorResponse {
    pub fn new(error: JsonRpcError, id: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            error,
        }
    }

    pub fn from_error(err: &AppError, id: Option<Value>) -> Value {
        serde_json::to_value(Self::new(err.user_safe_format(), id))
            .unwrap_or_else(|_| serde_json::json!({ "jsonrpc": "2.0", "id": null }))
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{field} invalid - {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Canvas {0} does not exist")]
    NotFound(u32),

    #[error("Canvas {0} already exists")]
    AlreadyExists(u32),

    #[error("Canvas {0} already complete")]
    AlreadyComplete(u32),

    #[error("{0} cannot be changed once the canvas is active")]
    ImmutableField(&'static str),

    #[error("Start block height {start} is after end block height {end}")]
    InvalidWindow { start: u64, end: u64 },

    #[error("Canvas {0} not active")]
    NotActive(u32),

    #[error("Coordinate {coordinate} outside canvas of {capacity} pixels")]
    OutOfBounds { coordinate: u32, capacity: u64 },

    #[error("Too many pixels - {count} exceeds maximum of {max}")]
    TooManyPixels { count: usize, max: u32 },

    #[error("Too many draws - next draw allowed at block {next_height}")]
    DrawTooSoon { next_height: u64 },

    #[error("Insufficient funds - balance {balance} below {required}")]
    InsufficientFunds { balance: u64, required: u64 },

    #[error("Invalid length - {0}")]
    InvalidLength(String),

    #[error("Ledger inconsistency - {0}")]
    Inconsistency(String),

    #[error("Invalid params - {0}")]
    InvalidParams(String),

    #[error("Internal server error - {0}")]
    InternalServerError(String),

    #[error("Database error - {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Redis error - {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error - {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Decode error - {0}")]
    DecodeError(#[from] prost::DecodeError),

    #[error("IO error - {0}")]
    IoError(#[from] std::io::Error),

    #[error("Method not found - {0}")]
    MethodNotFound(String),

    #[error("TryInitError - {0}")]
    TryInitError(#[from] tracing_subscriber::util::TryInitError),

    #[error("Mempool full")]
    MempoolFull,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

impl AppError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::Validation { .. } => -32001,
            Self::Unauthorized => -32020,
            Self::NotFound(_) => -32030,
            Self::AlreadyExists(_) => -32031,
            Self::AlreadyComplete(_) => -32032,
            Self::ImmutableField(_) => -32033,
            Self::InvalidWindow { .. } => -32034,
            Self::NotActive(_) => -32035,
            Self::OutOfBounds { .. } => -32040,
            Self::TooManyPixels { .. } => -32041,
            Self::DrawTooSoon { .. } => -32042,
            Self::InsufficientFunds { .. } => -32050,
            Self::InvalidLength(_) => -32002,
            Self::Inconsistency(_) => -32090,
            Self::InvalidParams(_) => -32602,
            Self::InternalServerError(_) => -32603,
            Self::DatabaseError(_) => -32070,
            Self::RedisError(_) => -32071,
            Self::SerializationError(_) => -32072,
            Self::DecodeError(_) => -32073,
            Self::IoError(_) => -32080,
            Self::MethodNotFound(_) => -32601,
            Self::TryInitError(_) => -32080,
            Self::MempoolFull => -32082,
            Self::RateLimitExceeded => -32081,
        }
    }

    /// True for failures a transaction sender can correct by changing the transaction.
    pub fn is_transaction_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::Unauthorized
                | Self::NotFound(_)
                | Self::AlreadyExists(_)
                | Self::AlreadyComplete(_)
                | Self::ImmutableField(_)
                | Self::InvalidWindow { .. }
                | Self::NotActive(_)
                | Self::OutOfBounds { .. }
                | Self::TooManyPixels { .. }
                | Self::DrawTooSoon { .. }
                | Self::InsufficientFunds { .. }
                | Self::InvalidLength(_)
        )
    }

    pub fn user_safe_format(&self) -> JsonRpcError {
        match self {
            Self::InvalidParams(msg) => JsonRpcError {
                code: self.code(),
                message: msg.clone(),
                data: None,
            },
            Self::RedisError(error) => {
                tracing::error!(error = %error, "Redis error");

                JsonRpcError {
                    code: self.code(),
                    message: "Service temporarily unavailable. Please try again later.".to_string(),
                    data: None,
                }
            }
            Self::DatabaseError(error) => {
                tracing::error!(error = %error, "Database error");

                JsonRpcError {
                    code: self.code(),
                    message: "Service temporarily unavailable. Please try again later.".to_string(),
                    data: None,
                }
            }
            Self::SerializationError(error) => {
                tracing::error!(error = %error, "Serialization error");

                JsonRpcError {
                    code: self.code(),
                    message: "Internal server error".to_string(),
                    data: None,
                }
            }
            Self::DecodeError(error) => {
                tracing::error!(error = %error, "Decode error");

                JsonRpcError {
                    code: self.code(),
                    message: "Internal server error".to_string(),
                    data: None,
                }
            }
            Self::TryInitError(error) => {
                tracing::error!(error = %error, "TryInitError");

                JsonRpcError {
                    code: self.code(),
                    message: "Internal server error".to_string(),
                    data: None,
                }
            }
            Self::InternalServerError(error) => {
                tracing::error!(error = %error, "Internal server error");

                JsonRpcError {
                    code: self.code(),
                    message: "Internal server error".to_string(),
                    data: None,
                }
            }
            Self::IoError(error) => {
                tracing::error!(error = %error, "IO error");

                JsonRpcError {
                    code: self.code(),
                    message: "Service temporarily unavailable. Please try again later.".to_string(),
                    data: None,
                }
            }
            Self::Inconsistency(error) => {
                tracing::error!(error = %error, "Ledger inconsistency");

                JsonRpcError {
                    code: self.code(),
                    message: "Internal server error".to_string(),
                    data: None,
                }
            }
            Self::Validation { field, reason } => JsonRpcError {
                code: self.code(),
                message: self.to_string(),
                data: Some(serde_json::json!({ "field": field, "reason": reason })),
            },
            Self::DrawTooSoon { next_height } => JsonRpcError {
                code: self.code(),
                message: format!("Please wait until block {next_height} before drawing again."),
                data: Some(serde_json::json!({ "next_height": next_height })),
            },
            Self::InsufficientFunds { balance, required } => JsonRpcError {
                code: self.code(),
                message: "Insufficient balance to pay for this draw.".to_string(),
                data: Some(serde_json::json!({ "balance": balance, "required": required })),
            },
            Self::MethodNotFound(method) => JsonRpcError {
                code: self.code(),
                message: format!("Method '{}' not found", method),
                data: None,
            },
            Self::RateLimitExceeded => JsonRpcError {
                code: self.code(),
                message: "Too many requests. Try again in a moment.".to_string(),
                data: None,
            },
            _ => JsonRpcError {
                code: self.code(),
                message: self.to_string(),
                data: None,
            },
        }
    }
}

impl From<&AppError> for JsonRpcError {
    fn from(error: &AppError) -> Self {
        error.user_safe_format()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyExists(_) => StatusCode::CONFLICT,
            Self::Validation { .. }
            | Self::InvalidParams(_)
            | Self::InvalidLength(_)
            | Self::OutOfBounds { .. }
            | Self::TooManyPixels { .. } => StatusCode::BAD_REQUEST,
            Self::AlreadyComplete(_)
            | Self::ImmutableField(_)
            | Self::InvalidWindow { .. }
            | Self::NotActive(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::DrawTooSoon { .. } | Self::RateLimitExceeded | Self::MempoolFull => {
                StatusCode::TOO_MANY_REQUESTS
            }
            Self::InsufficientFunds { .. } => StatusCode::PAYMENT_REQUIRED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let json_error = self.user_safe_format();
        let body = serde_json::to_string(&json_error)
            .unwrap_or_else(|_| r#"{"code":-32603,"message":"Internal server error"}"#.to_string());

        (status, [("content-type", "application/json")], body).into_response()
    }
}
