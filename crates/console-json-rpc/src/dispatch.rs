use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::config::DispatcherConfig;
use crate::decode::{decode, extract_id};
use crate::describe::describe;
use crate::error::{
    DispatchError, HostFault, JsonRpcErrorObject, JsonRpcTransportError, RequestError,
    ToJsonRpcError,
};
use crate::io::{OutputSink, PayloadSource};
use crate::request::JsonRpcRequest;
use crate::response::JsonRpcResponse;
use crate::service::JsonRpcService;
use crate::types::RequestId;

/// A finished response ready to be emitted
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub response: JsonRpcResponse,
    pub body: String,
}

impl Reply {
    fn new(response: JsonRpcResponse) -> Self {
        let body = response.to_json_string().unwrap_or_else(|err| {
            error!("Failed to serialize JSON-RPC response: {}", err);
            fallback_body(response.id)
        });
        Self { response, body }
    }

    /// Write the body to `sink`, then flush and end the request there
    pub fn deliver<S: OutputSink + ?Sized>(&self, sink: &mut S) -> Result<(), JsonRpcTransportError> {
        sink.write_response(self.body.as_bytes())?;
        sink.finish()
    }
}

fn fallback_body(id: Option<RequestId>) -> String {
    let id = id.map_or_else(|| "null".to_string(), |id| id.to_string());
    format!(
        r#"{{"jsonrpc":"2.0","result":null,"id":{},"error":{{"code":100,"message":"Server error","error":{{"name":"HostFault"}}}}}}"#,
        id
    )
}

/// Turns raw request payloads into responses against a service.
///
/// Every failure is reported as an error response; nothing is raised past
/// [`JsonRpcDispatcher::handle`].
#[derive(Debug, Clone, Default)]
pub struct JsonRpcDispatcher {
    config: DispatcherConfig,
}

impl JsonRpcDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DispatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Process one raw request payload and return the response
    pub fn handle(&self, raw: &[u8], service: &dyn JsonRpcService) -> JsonRpcResponse {
        debug!("Received JSON-RPC payload: {} bytes", raw.len());

        let request = match decode(raw) {
            Ok(request) => request,
            Err(err) => return reject(extract_id(raw), &err),
        };

        let (method, id) = match validate(&request, raw) {
            Ok(valid) => valid,
            Err((id, err)) => return reject(id, &err),
        };

        if method == self.config.describe_method {
            debug!("Describing service {}", service.name());
            return self.describe_response(id, service);
        }

        match invoke(method, request.params.clone(), service) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => reject(Some(id), &err),
        }
    }

    /// Like [`handle`](Self::handle), but a panic inside the service is caught
    /// and reported as a host fault (code 100) with the id recovered from `raw`.
    pub fn handle_supervised(&self, raw: &[u8], service: &dyn JsonRpcService) -> JsonRpcResponse {
        match panic::catch_unwind(AssertUnwindSafe(|| self.handle(raw, service))) {
            Ok(response) => response,
            Err(payload) => {
                let fault = HostFault::new(panic_message(payload.as_ref()));
                error!("Host fault while processing JSON-RPC request: {}", fault);
                JsonRpcResponse::from_error(extract_id(raw), &fault)
            }
        }
    }

    /// Supervised handling plus serialization of the response body
    pub fn reply(&self, raw: &[u8], service: &dyn JsonRpcService) -> Reply {
        Reply::new(self.handle_supervised(raw, service))
    }

    /// Read one payload from `source`, serve it, and deliver the reply to `sink`
    pub fn serve<P, S>(
        &self,
        source: &mut P,
        service: &dyn JsonRpcService,
        sink: &mut S,
    ) -> Result<Reply, JsonRpcTransportError>
    where
        P: PayloadSource + ?Sized,
        S: OutputSink + ?Sized,
    {
        let payload = source.read_payload()?;
        let reply = self.reply(&payload, service);
        reply.deliver(sink)?;
        debug!("Sent JSON-RPC response");
        Ok(reply)
    }

    fn describe_response(&self, id: RequestId, service: &dyn JsonRpcService) -> JsonRpcResponse {
        let mut descriptor = describe(service, &self.config.address);
        descriptor.sdversion = self.config.sd_version.clone();

        match serde_json::to_value(descriptor) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => JsonRpcResponse::error(
                Some(id),
                JsonRpcErrorObject::server_error(&err.to_string()),
            ),
        }
    }
}

/// Require a method and a non-zero id.
///
/// On failure the id for the error response is the decoded one if usable,
/// otherwise whatever can be recovered from the raw text.
fn validate<'a>(
    request: &'a JsonRpcRequest,
    raw: &[u8],
) -> Result<(&'a str, RequestId), (Option<RequestId>, RequestError)> {
    match (request.method.as_deref(), request.usable_id()) {
        (Some(method), Some(id)) => Ok((method, id)),
        (method, id) => {
            let id = id.or_else(|| extract_id(raw));
            let err = if method.is_none() {
                RequestError::MissingMethod
            } else if id.is_none_or(|id| id == 0) {
                RequestError::MissingId
            } else {
                RequestError::UnknownReason
            };
            Err((id, err))
        }
    }
}

/// Resolve `method` on the service and call it with positional `params`
fn invoke(
    method: &str,
    params: Vec<Value>,
    service: &dyn JsonRpcService,
) -> Result<Value, DispatchError> {
    if let Some(procedure) = service.procedure(method) {
        let (got, expected) = (params.len(), procedure.arity());
        if got != expected {
            return Err(DispatchError::ArityMismatch { got, expected });
        }
        debug!("Invoking procedure {}", method);
        return procedure.call(params).map_err(DispatchError::from);
    }

    match service.fallback() {
        Some(fallback) => {
            debug!("No procedure {}, invoking fallback", method);
            fallback.call(method, params).map_err(DispatchError::from)
        }
        None => Err(DispatchError::MethodNotFound(method.to_string())),
    }
}

fn reject<E: ToJsonRpcError>(id: Option<RequestId>, err: &E) -> JsonRpcResponse {
    let response = JsonRpcResponse::from_error(id, err);
    if let Some(error) = &response.error {
        warn!("JSON-RPC request failed: {}", error);
    }
    response
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown fault".to_string()
    }
}
