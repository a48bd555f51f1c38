//! # Console JSON-RPC Prelude
//!
//! Convenient re-exports of the most commonly used types.
//!
//! ```rust
//! use console_json_rpc::prelude::*;
//! ```

pub use crate::config::DispatcherConfig;
pub use crate::decode::{decode, extract_id};
pub use crate::describe::{ProcedureDescriptor, ServiceDescriptor, describe};
pub use crate::dispatch::{JsonRpcDispatcher, Reply};
pub use crate::error::{
    DecodeError, DispatchError, HostFault, JsonRpcErrorCode, JsonRpcErrorObject,
    JsonRpcTransportError, ProcedureError, RequestError, ToJsonRpcError,
};
pub use crate::io::{OutputSink, PayloadSource, ReaderSource, WriterSink};
pub use crate::request::{JsonRpcRequest, RequestParams};
pub use crate::response::JsonRpcResponse;
pub use crate::service::{FallbackHandler, JsonRpcService, Procedure, RegisteredProcedure, Service};
pub use crate::types::{JsonRpcVersion, RequestId};

// Error codes
pub use crate::error_codes::*;
