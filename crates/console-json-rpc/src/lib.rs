//! # Console JSON-RPC
//!
//! A transport-agnostic JSON-RPC request handler. The host hands over a raw
//! request payload and a service; the dispatcher decodes it, resolves the
//! method, checks arity, invokes the procedure, and always answers with a
//! well-formed response envelope.
//!
//! ## Features
//! - Tolerant decoding (UTF-8 BOM, UTF-16, Latin-1 payloads)
//! - Request id recovery from payloads that are not valid JSON
//! - `system.describe` service introspection
//! - Catch-all fallback procedures
//! - Panic supervision reported as a host fault
//!
//! ```rust
//! use console_json_rpc::prelude::*;
//! use serde_json::{Value, json};
//!
//! let service = Service::new("Calculator").with_procedure(
//!     "add",
//!     &["a", "b"],
//!     |params: Vec<Value>| -> Result<Value, ProcedureError> {
//!         let a: i64 = serde_json::from_value(params[0].clone())?;
//!         let b: i64 = serde_json::from_value(params[1].clone())?;
//!         Ok(json!(a + b))
//!     },
//! );
//!
//! let reply = JsonRpcDispatcher::new().reply(br#"{"method":"add","params":[2,3],"id":7}"#, &service);
//! assert_eq!(reply.body, r#"{"jsonrpc":"2.0","result":5,"id":7,"error":null}"#);
//! ```

pub mod config;
pub mod decode;
pub mod describe;
pub mod dispatch;
pub mod error;
pub mod io;
pub mod prelude;
pub mod request;
pub mod response;
pub mod service;
pub mod types;

// Re-export main types
pub use config::DispatcherConfig;
pub use decode::{decode, extract_id};
pub use describe::{ProcedureDescriptor, ServiceDescriptor, describe};
pub use dispatch::{JsonRpcDispatcher, Reply};
pub use error::{JsonRpcErrorCode, JsonRpcErrorObject, ProcedureError};
pub use request::{JsonRpcRequest, RequestParams};
pub use response::JsonRpcResponse;
pub use service::{JsonRpcService, Service};
pub use types::{JsonRpcVersion, RequestId};

/// JSON-RPC version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Error codes emitted by the dispatcher
pub mod error_codes {
    pub const SERVER_ERROR: i64 = 100;
    pub const PARSE_ERROR: i64 = 101;
    pub const INVALID_REQUEST: i64 = 103;
    pub const PROCEDURE_NOT_FOUND: i64 = 104;
    pub const INVALID_PARAMS: i64 = 105;
}
