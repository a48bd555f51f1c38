use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{JsonRpcErrorObject, ToJsonRpcError};
use crate::types::{JsonRpcVersion, RequestId};

/// A JSON-RPC response envelope.
///
/// All four members are always emitted; exactly one of `result` and `error`
/// carries content, the other is `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub result: Option<Value>,
    pub id: Option<RequestId>,
    pub error: Option<JsonRpcErrorObject>,
}

impl JsonRpcResponse {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            result: Some(result),
            id: Some(id),
            error: None,
        }
    }

    pub fn error(id: Option<RequestId>, error: JsonRpcErrorObject) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            result: None,
            id,
            error: Some(error),
        }
    }

    /// Error response built from any protocol error
    pub fn from_error<E: ToJsonRpcError>(id: Option<RequestId>, err: &E) -> Self {
        Self::error(id, err.to_error_object())
    }

    /// Check if this is an error response
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Error code, if this is an error response
    pub fn error_code(&self) -> Option<i64> {
        self.error.as_ref().map(|e| e.code)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
