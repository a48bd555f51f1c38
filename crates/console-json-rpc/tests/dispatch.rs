//! End-to-end tests: raw payload bytes in, serialized response out.

use console_json_rpc::prelude::*;
use serde_json::{Value, json};

fn arg(params: &[Value], index: usize) -> Result<f64, ProcedureError> {
    params[index]
        .as_f64()
        .ok_or_else(|| ProcedureError::new(format!("parameter {} must be a number", index)))
}

fn calculator() -> Service {
    Service::new("DemoService")
        .with_procedure("add", &["a", "b"], |params: Vec<Value>| -> Result<Value, ProcedureError> {
            Ok(json!(arg(&params, 0)? as i64 + arg(&params, 1)? as i64))
        })
        .with_procedure("divide", &["a", "b"], |params: Vec<Value>| -> Result<Value, ProcedureError> {
            let b = arg(&params, 1)?;
            if b == 0.0 {
                return Err(ProcedureError::new("Division by zero"));
            }
            Ok(json!(arg(&params, 0)? / b))
        })
        .with_procedure("ping", &[], |_params: Vec<Value>| -> Result<Value, ProcedureError> {
            Ok(json!("pong"))
        })
        .with_documentation("add", "Adds two integers")
}

fn handle(raw: &str, service: &dyn JsonRpcService) -> Value {
    let reply = JsonRpcDispatcher::new().reply(raw.as_bytes(), service);
    serde_json::from_str(&reply.body).unwrap()
}

#[test]
fn add_returns_result_and_echoes_id() {
    let reply = JsonRpcDispatcher::new().reply(br#"{"method":"add","params":[2,3],"id":7}"#, &calculator());
    assert_eq!(reply.body, r#"{"jsonrpc":"2.0","result":5,"id":7,"error":null}"#);
}

#[test]
fn named_params_are_passed_in_declaration_order() {
    let response = handle(
        r#"{"method":"divide","params":{"a":9,"b":3},"id":12}"#,
        &calculator(),
    );
    assert_eq!(response["result"], 3.0);
    assert_eq!(response["id"], 12);
}

#[test]
fn absent_params_mean_no_arguments() {
    let response = handle(r#"{"method":"ping","id":1}"#, &calculator());
    assert_eq!(response["result"], "pong");

    let response = handle(r#"{"method":"ping","params":{},"id":1}"#, &calculator());
    assert_eq!(response["result"], "pong");
}

#[test]
fn empty_payload_is_parse_error_with_null_id() {
    let response = handle("", &calculator());
    assert_eq!(response["error"]["code"], 101);
    assert_eq!(response["error"]["message"], "Parse Error: no data");
    assert!(response["id"].is_null());
    assert!(response["result"].is_null());
}

#[test]
fn broken_json_recovers_textual_id() {
    let response = handle(r#"{"method":"add","params":[1,2],"id": 42"#, &calculator());
    assert_eq!(response["error"]["code"], 101);
    assert_eq!(response["id"], 42);

    let response = handle(r#"not json "id": 9"#, &calculator());
    assert_eq!(response["error"]["code"], 101);
    assert_eq!(response["id"], 9);
    assert_eq!(response["error"]["error"]["name"], "JSONRPCError");
}

#[test]
fn missing_method_is_invalid_request() {
    let response = handle(r#"{"params":[1],"id":3}"#, &calculator());
    assert_eq!(response["error"]["code"], 103);
    assert_eq!(response["error"]["message"], "Invalid Request: no method");
    assert_eq!(response["id"], 3);
}

#[test]
fn missing_id_is_invalid_request() {
    let response = handle(r#"{"method":"ping"}"#, &calculator());
    assert_eq!(response["error"]["code"], 103);
    assert_eq!(response["error"]["message"], "Invalid Request: no id");
    assert!(response["id"].is_null());

    let response = handle(r#"{"method":"ping","id":0}"#, &calculator());
    assert_eq!(response["error"]["code"], 103);
    assert_eq!(response["error"]["message"], "Invalid Request: no id");
}

#[test]
fn non_object_document_is_invalid_request() {
    let response = handle("[1,2,3]", &calculator());
    assert_eq!(response["error"]["code"], 103);
    assert_eq!(response["error"]["message"], "Invalid Request: no method");
}

#[test]
fn unknown_method_is_procedure_not_found() {
    let response = handle(r#"{"method":"multiply","params":[2,3],"id":5}"#, &calculator());
    assert_eq!(response["error"]["code"], 104);
    assert_eq!(response["error"]["message"], "Procedure `multiply' not found");
    assert_eq!(response["id"], 5);
}

#[test]
fn arity_mismatch_states_both_counts() {
    let response = handle(r#"{"method":"add","params":[2],"id":7}"#, &calculator());
    assert_eq!(response["error"]["code"], 105);
    assert_eq!(
        response["error"]["message"],
        "Wrong number of parameters. Got 1 expect 2"
    );
    assert_eq!(response["id"], 7);
}

#[test]
fn procedure_failure_shares_invalid_params_code() {
    let response = handle(r#"{"method":"divide","params":[1,0],"id":8}"#, &calculator());
    assert_eq!(response["error"]["code"], 105);
    assert_eq!(response["error"]["message"], "Division by zero");
    assert!(response["result"].is_null());
}

#[test]
fn fallback_receives_unmatched_methods_without_arity_check() {
    let service = calculator().with_fallback(
        |method: &str, params: Vec<Value>| -> Result<Value, ProcedureError> {
            if method == "fail" {
                return Err(ProcedureError::new("fallback refused"));
            }
            Ok(json!({"called": method, "args": params}))
        },
    );

    let response = handle(r#"{"method":"anything","params":[1,2,3],"id":4}"#, &service);
    assert_eq!(response["result"], json!({"called": "anything", "args": [1, 2, 3]}));

    // Registered procedures still win and are still arity-checked
    let response = handle(r#"{"method":"add","params":[1],"id":4}"#, &service);
    assert_eq!(response["error"]["code"], 105);

    let response = handle(r#"{"method":"fail","id":4}"#, &service);
    assert_eq!(response["error"]["code"], 105);
    assert_eq!(response["error"]["message"], "fallback refused");
}

#[test]
fn system_describe_lists_every_procedure() {
    let service = calculator();
    let response = handle(r#"{"method":"system.describe","params":[1,2,3],"id":2}"#, &service);

    assert!(response["error"].is_null());
    assert_eq!(response["id"], 2);

    let result = &response["result"];
    assert_eq!(result["sdversion"], "1.0");
    assert_eq!(result["name"], "DemoService");
    assert_eq!(result["address"], "http://localhost/");
    assert!(result["id"].as_str().unwrap().starts_with("urn:md5:"));

    let procs = result["procs"].as_array().unwrap();
    assert_eq!(procs.len(), service.procedures().len());
    assert_eq!(
        procs[0],
        json!({"name": "add", "params": ["a", "b"], "help": "Adds two integers"})
    );
    assert_eq!(procs[2], json!({"name": "ping", "params": []}));
}

#[test]
fn system_describe_is_case_sensitive() {
    let response = handle(r#"{"method":"System.Describe","id":2}"#, &calculator());
    assert_eq!(response["error"]["code"], 104);
}

#[test]
fn string_and_float_ids_are_coerced() {
    let response = handle(r#"{"method":"ping","id":"15"}"#, &calculator());
    assert_eq!(response["id"], 15);

    let response = handle(r#"{"method":"ping","id":6.7}"#, &calculator());
    assert_eq!(response["id"], 6);
}

#[test]
fn latin1_payload_is_transcoded() {
    let mut raw = br#"{"method":"echo","params":["caf"#.to_vec();
    raw.push(0xE9);
    raw.extend_from_slice(br#""],"id":3}"#);

    let service = Service::new("Echo").with_procedure(
        "echo",
        &["text"],
        |params: Vec<Value>| -> Result<Value, ProcedureError> { Ok(params[0].clone()) },
    );
    let reply = JsonRpcDispatcher::new().reply(&raw, &service);
    let response: Value = serde_json::from_str(&reply.body).unwrap();
    assert_eq!(response["result"], "café");
}

fn utf16_le(text: &str) -> Vec<u8> {
    let mut raw = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        raw.extend_from_slice(&unit.to_le_bytes());
    }
    raw
}

#[test]
fn utf16_payload_is_transcoded() {
    let raw = utf16_le(r#"{"method":"add","params":[19,23],"id":11}"#);

    let reply = JsonRpcDispatcher::new().reply(&raw, &calculator());
    assert_eq!(reply.body, r#"{"jsonrpc":"2.0","result":42,"id":11,"error":null}"#);
}

#[test]
fn truncated_utf16_payload_recovers_id() {
    let mut raw = utf16_le(r#"{"method":"add","id": 42, "params":[1"#);
    raw.push(0x00);

    let reply = JsonRpcDispatcher::new().reply(&raw, &calculator());
    let response: Value = serde_json::from_str(&reply.body).unwrap();
    assert_eq!(response["error"]["code"], 101);
    assert_eq!(response["id"], 42);
}

/// A hand-written service, without the closure builder
struct Inventory {
    procedures: Vec<RegisteredProcedure>,
}

impl Inventory {
    fn new() -> Self {
        Self {
            procedures: vec![RegisteredProcedure::new(
                "count",
                &[],
                |_params: Vec<Value>| -> Result<Value, ProcedureError> { Ok(json!(3)) },
            )],
        }
    }
}

impl JsonRpcService for Inventory {
    fn name(&self) -> &str {
        "Inventory"
    }

    fn procedures(&self) -> &[RegisteredProcedure] {
        &self.procedures
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        (key == "count_documentation").then_some("Number of items in stock")
    }
}

#[test]
fn custom_service_implementation() {
    let response = handle(r#"{"method":"count","id":1}"#, &Inventory::new());
    assert_eq!(response["result"], 3);

    let response = handle(r#"{"method":"system.describe","id":1}"#, &Inventory::new());
    assert_eq!(response["result"]["procs"][0]["help"], "Number of items in stock");

    let response = handle(r#"{"method":"restock","id":1}"#, &Inventory::new());
    assert_eq!(response["error"]["code"], 104);
}

#[test]
fn panicking_procedure_reports_host_fault() {
    let service = Service::new("Faulty").with_procedure(
        "crash",
        &["index"],
        |params: Vec<Value>| -> Result<Value, ProcedureError> {
            let items: Vec<i64> = Vec::new();
            let index = params[0].as_u64().unwrap_or(0) as usize;
            Ok(json!(items[index]))
        },
    );

    let response = handle(r#"{"method":"crash","params":[3],"id":21}"#, &service);
    assert_eq!(response["error"]["code"], 100);
    assert_eq!(response["error"]["message"], "Server error");
    assert_eq!(response["error"]["error"]["name"], "HostFault");
    assert_eq!(response["id"], 21);
}

#[test]
fn decoding_is_idempotent() {
    let raw = br#"{"method":"add","params":{"x":1,"y":2},"id":9}"#;
    assert_eq!(decode(raw), decode(raw));
}

#[test]
fn serve_writes_reply_and_finishes_sink() {
    let mut source = ReaderSource::new(&br#"{"method":"add","params":[20,22],"id":1}"#[..]);
    let mut sink = WriterSink::new(Vec::new());

    JsonRpcDispatcher::new()
        .serve(&mut source, &calculator(), &mut sink)
        .unwrap();

    assert!(sink.is_finished());
    let written: Value = serde_json::from_slice(&sink.into_inner()).unwrap();
    assert_eq!(written, json!({"jsonrpc": "2.0", "result": 42, "id": 1, "error": null}));
}
