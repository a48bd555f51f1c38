use serde_json::{Map, Value};

use crate::types::RequestId;

/// Parameters as they appear on the wire
#[derive(Debug, Clone, PartialEq)]
pub enum RequestParams {
    /// Positional parameters as an array
    Array(Vec<Value>),
    /// Named parameters as an object, kept in declaration order
    Object(Map<String, Value>),
}

impl RequestParams {
    /// Interpret an arbitrary `params` value.
    ///
    /// `null` is no params at all; a scalar becomes a single positional argument.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Array(vec) => Some(RequestParams::Array(vec)),
            Value::Object(map) => Some(RequestParams::Object(map)),
            scalar => Some(RequestParams::Array(vec![scalar])),
        }
    }

    /// Ordered positional arguments; object members contribute their values
    /// in declaration order and their names are dropped.
    pub fn into_positional(self) -> Vec<Value> {
        match self {
            RequestParams::Array(vec) => vec,
            RequestParams::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        }
    }
}

/// A decoded request.
///
/// Every field is optional at this stage; the dispatcher decides whether the
/// request is complete enough to be served.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonRpcRequest {
    /// Method name, `None` when absent, not a string, empty or `"0"`
    pub method: Option<String>,
    /// Positional arguments after normalization
    pub params: Vec<Value>,
    /// Id coerced to an integer, `None` when the field was absent
    pub id: Option<RequestId>,
}

impl JsonRpcRequest {
    /// Build a request from a parsed JSON document.
    ///
    /// Missing fields fall back to defaults rather than failing; a document
    /// that is not an object has no fields at all.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(object) = value else {
            return Self::default();
        };

        let method = match field_or(&object, "method", Value::Null) {
            Value::String(method) if !method.is_empty() && method != "0" => Some(method),
            _ => None,
        };

        let params = RequestParams::from_value(field_or(&object, "params", Value::Null))
            .map(RequestParams::into_positional)
            .unwrap_or_default();

        let id = match field_or(&object, "id", Value::Null) {
            Value::Null => None,
            other => Some(coerce_id(&other)),
        };

        Self { method, params, id }
    }

    /// Id usable for a response, treating zero as absent
    pub fn usable_id(&self) -> Option<RequestId> {
        self.id.filter(|id| *id != 0)
    }
}

/// Look up `field`, treating an explicit `null` the same as a missing key
fn field_or(object: &Map<String, Value>, field: &str, default: Value) -> Value {
    match object.get(field) {
        Some(Value::Null) | None => default,
        Some(value) => value.clone(),
    }
}

/// Integer interpretation of an id value; anything unusable becomes zero
pub fn coerce_id(value: &Value) -> RequestId {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => leading_integer(s),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

/// Parse the integer prefix of a string (`"12abc"` is 12, `"abc"` is 0)
fn leading_integer(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let magnitude = digits[..end].parse::<i64>().unwrap_or(0);
    if negative { -magnitude } else { magnitude }
}
