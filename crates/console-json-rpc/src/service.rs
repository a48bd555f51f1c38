//! Service handles: the named operations a dispatcher can invoke.
//!
//! A service declares its procedures up front, each with the names of its
//! formal parameters, so arity checks and introspection need no runtime
//! reflection.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ProcedureError;

/// A callable operation taking ordered positional arguments
pub trait Procedure: Send + Sync {
    fn call(&self, params: Vec<Value>) -> Result<Value, ProcedureError>;
}

impl<F> Procedure for F
where
    F: Fn(Vec<Value>) -> Result<Value, ProcedureError> + Send + Sync,
{
    fn call(&self, params: Vec<Value>) -> Result<Value, ProcedureError> {
        self(params)
    }
}

/// Catch-all handler invoked for method names with no registered procedure.
///
/// It receives the method name and is responsible for its own argument checks.
pub trait FallbackHandler: Send + Sync {
    fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, ProcedureError>;
}

impl<F> FallbackHandler for F
where
    F: Fn(&str, Vec<Value>) -> Result<Value, ProcedureError> + Send + Sync,
{
    fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, ProcedureError> {
        self(method, params)
    }
}

/// A procedure together with its declared signature
#[derive(Clone)]
pub struct RegisteredProcedure {
    name: String,
    params: Vec<String>,
    handler: Arc<dyn Procedure>,
}

impl RegisteredProcedure {
    pub fn new<P>(name: impl Into<String>, params: &[&str], handler: P) -> Self
    where
        P: Procedure + 'static,
    {
        Self {
            name: name.into(),
            params: params.iter().map(|p| p.to_string()).collect(),
            handler: Arc::new(handler),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Formal parameter names in declaration order
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Number of declared formal parameters
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn call(&self, params: Vec<Value>) -> Result<Value, ProcedureError> {
        self.handler.call(params)
    }
}

impl fmt::Debug for RegisteredProcedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredProcedure")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Trait for services a dispatcher can serve
pub trait JsonRpcService: Send + Sync {
    /// Service name reported by introspection
    fn name(&self) -> &str;

    /// Invocable procedures in declaration order
    fn procedures(&self) -> &[RegisteredProcedure];

    /// Resolve a procedure by exact, case-sensitive name
    fn procedure(&self, name: &str) -> Option<&RegisteredProcedure> {
        self.procedures().iter().find(|p| p.name() == name)
    }

    /// Catch-all handler for unmatched names (optional)
    fn fallback(&self) -> Option<&dyn FallbackHandler> {
        None
    }

    /// Service-level static data, e.g. `add_documentation` help text (optional)
    fn attribute(&self, key: &str) -> Option<&str> {
        let _ = key;
        None
    }
}

/// Builder-style service assembled from closures
#[derive(Default)]
pub struct Service {
    name: String,
    procedures: Vec<RegisteredProcedure>,
    fallback: Option<Box<dyn FallbackHandler>>,
    attributes: HashMap<String, String>,
}

impl Service {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Register a procedure; re-registering a name replaces it in place
    pub fn with_procedure<P>(mut self, name: &str, params: &[&str], handler: P) -> Self
    where
        P: Procedure + 'static,
    {
        let procedure = RegisteredProcedure::new(name, params, handler);
        match self.procedures.iter_mut().find(|p| p.name() == name) {
            Some(existing) => *existing = procedure,
            None => self.procedures.push(procedure),
        }
        self
    }

    /// Set a catch-all handler for unregistered methods
    pub fn with_fallback<H>(mut self, handler: H) -> Self
    where
        H: FallbackHandler + 'static,
    {
        self.fallback = Some(Box::new(handler));
        self
    }

    /// Attach static data readable through [`JsonRpcService::attribute`]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Attach help text for `method`, stored as the `<method>_documentation` attribute
    pub fn with_documentation(self, method: &str, help: impl Into<String>) -> Self {
        self.with_attribute(documentation_key(method), help)
    }
}

impl JsonRpcService for Service {
    fn name(&self) -> &str {
        &self.name
    }

    fn procedures(&self) -> &[RegisteredProcedure] {
        &self.procedures
    }

    fn fallback(&self) -> Option<&dyn FallbackHandler> {
        self.fallback.as_deref()
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("name", &self.name)
            .field("procedures", &self.procedures)
            .field("fallback", &self.fallback.is_some())
            .field("attributes", &self.attributes)
            .finish()
    }
}

/// Attribute key holding help text for `method`
pub fn documentation_key(method: &str) -> String {
    format!("{}_documentation", method)
}
