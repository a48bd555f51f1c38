use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error_codes;

/// Discriminator placed in `error.name` for every protocol-level failure
pub const PROTOCOL_ERROR_NAME: &str = "JSONRPCError";

/// Discriminator placed in `error.name` when the host runtime faulted
pub const HOST_FAULT_NAME: &str = "HostFault";

/// Error codes emitted by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRpcErrorCode {
    ServerError,
    ParseError,
    InvalidRequest,
    ProcedureNotFound,
    InvalidParams,
}

impl JsonRpcErrorCode {
    pub fn code(&self) -> i64 {
        match self {
            JsonRpcErrorCode::ServerError => error_codes::SERVER_ERROR,
            JsonRpcErrorCode::ParseError => error_codes::PARSE_ERROR,
            JsonRpcErrorCode::InvalidRequest => error_codes::INVALID_REQUEST,
            JsonRpcErrorCode::ProcedureNotFound => error_codes::PROCEDURE_NOT_FOUND,
            JsonRpcErrorCode::InvalidParams => error_codes::INVALID_PARAMS,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            JsonRpcErrorCode::ServerError => "Server error",
            JsonRpcErrorCode::ParseError => "Parse Error",
            JsonRpcErrorCode::InvalidRequest => "Invalid Request",
            JsonRpcErrorCode::ProcedureNotFound => "Procedure not found",
            JsonRpcErrorCode::InvalidParams => "Invalid params",
        }
    }
}

impl fmt::Display for JsonRpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// Nested `error` object of an [`JsonRpcErrorObject`].
///
/// `name` discriminates protocol failures from host faults; any further
/// diagnostic fields are flattened next to it on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub name: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ErrorDetail {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Map::new(),
        }
    }

    pub fn protocol() -> Self {
        Self::new(PROTOCOL_ERROR_NAME)
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// JSON-RPC error object carried in the `error` member of a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
    pub error: ErrorDetail,
}

impl JsonRpcErrorObject {
    pub fn new(code: JsonRpcErrorCode, message: Option<String>) -> Self {
        Self {
            code: code.code(),
            message: message.unwrap_or_else(|| code.message().to_string()),
            error: ErrorDetail::protocol(),
        }
    }

    pub fn with_detail(mut self, detail: ErrorDetail) -> Self {
        self.error = detail;
        self
    }

    pub fn parse_error(diagnostic: &str) -> Self {
        Self::new(
            JsonRpcErrorCode::ParseError,
            Some(format!("{}: {}", JsonRpcErrorCode::ParseError.message(), diagnostic)),
        )
    }

    pub fn invalid_request(reason: &str) -> Self {
        Self::new(
            JsonRpcErrorCode::InvalidRequest,
            Some(format!("{}: {}", JsonRpcErrorCode::InvalidRequest.message(), reason)),
        )
    }

    pub fn procedure_not_found(method: &str) -> Self {
        Self::new(
            JsonRpcErrorCode::ProcedureNotFound,
            Some(format!("Procedure `{}' not found", method)),
        )
    }

    pub fn invalid_params(message: &str) -> Self {
        Self::new(JsonRpcErrorCode::InvalidParams, Some(message.to_string()))
    }

    pub fn server_error(message: &str) -> Self {
        Self::new(JsonRpcErrorCode::ServerError, None)
            .with_detail(ErrorDetail::new(HOST_FAULT_NAME).with_field("message", message))
    }
}

impl fmt::Display for JsonRpcErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JSON-RPC Error {}: {}", self.code, self.message)
    }
}

/// Errors that can be converted to JSON-RPC error objects
pub trait ToJsonRpcError: std::error::Error {
    /// Convert this error to a JSON-RPC error object
    fn to_error_object(&self) -> JsonRpcErrorObject;
}

/// Failures turning a raw payload into a request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("no data")]
    EmptyPayload,

    #[error("{0}")]
    ParseError(String),
}

impl ToJsonRpcError for DecodeError {
    fn to_error_object(&self) -> JsonRpcErrorObject {
        JsonRpcErrorObject::parse_error(&self.to_string())
    }
}

/// A decoded request lacking a method or id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("no method")]
    MissingMethod,

    #[error("no id")]
    MissingId,

    #[error("unknown reason")]
    UnknownReason,
}

impl ToJsonRpcError for RequestError {
    fn to_error_object(&self) -> JsonRpcErrorObject {
        JsonRpcErrorObject::invalid_request(&self.to_string())
    }
}

/// Failures resolving or invoking a procedure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Procedure `{0}' not found")]
    MethodNotFound(String),

    #[error("Wrong number of parameters. Got {got} expect {expected}")]
    ArityMismatch { got: usize, expected: usize },

    #[error("{0}")]
    InvocationFailure(String),
}

impl ToJsonRpcError for DispatchError {
    fn to_error_object(&self) -> JsonRpcErrorObject {
        match self {
            DispatchError::MethodNotFound(method) => JsonRpcErrorObject::procedure_not_found(method),
            DispatchError::ArityMismatch { .. } | DispatchError::InvocationFailure(_) => {
                JsonRpcErrorObject::invalid_params(&self.to_string())
            }
        }
    }
}

impl From<ProcedureError> for DispatchError {
    fn from(err: ProcedureError) -> Self {
        DispatchError::InvocationFailure(err.message)
    }
}

/// A runtime fault (panic) raised while a request was being processed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HostFault {
    pub message: String,
}

impl HostFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl ToJsonRpcError for HostFault {
    fn to_error_object(&self) -> JsonRpcErrorObject {
        JsonRpcErrorObject::server_error(&self.message)
    }
}

/// Failure returned by a service procedure or fallback
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProcedureError {
    message: String,
}

impl ProcedureError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for ProcedureError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ProcedureError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<serde_json::Error> for ProcedureError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// I/O errors raised by the payload source or output sink collaborators
#[derive(Debug, Error)]
pub enum JsonRpcTransportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
