//! Calculator JSON-RPC Example
//!
//! Reads one JSON-RPC request from stdin, serves it against a small
//! calculator service, and writes the response to stdout.
//!
//! ```sh
//! echo '{"method":"add","params":[2,3],"id":7}' | cargo run --example calculator
//! echo '{"method":"system.describe","id":1}' | RUST_LOG=debug cargo run --example calculator
//! ```

use std::io;
use std::process::ExitCode;

use console_json_rpc::prelude::*;
use serde_json::{Value, json};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn number(params: &[Value], index: usize) -> Result<f64, ProcedureError> {
    params[index]
        .as_f64()
        .ok_or_else(|| ProcedureError::new(format!("Parameter {} must be a number", index + 1)))
}

fn calculator() -> Service {
    Service::new("CalculatorService")
        .with_procedure("add", &["a", "b"], |params: Vec<Value>| -> Result<Value, ProcedureError> {
            Ok(json!(number(&params, 0)? + number(&params, 1)?))
        })
        .with_procedure("subtract", &["a", "b"], |params: Vec<Value>| -> Result<Value, ProcedureError> {
            Ok(json!(number(&params, 0)? - number(&params, 1)?))
        })
        .with_procedure("divide", &["a", "b"], |params: Vec<Value>| -> Result<Value, ProcedureError> {
            let divisor = number(&params, 1)?;
            if divisor == 0.0 {
                return Err(ProcedureError::new("Division by zero"));
            }
            Ok(json!(number(&params, 0)? / divisor))
        })
        .with_documentation("add", "Returns the sum of a and b")
        .with_documentation("subtract", "Returns a minus b")
        .with_documentation("divide", "Returns a divided by b")
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout carries nothing but the response
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let dispatcher = JsonRpcDispatcher::with_config(
        DispatcherConfig::default().with_address("stdio://calculator"),
    );

    let mut source = ReaderSource::new(io::stdin().lock());
    let mut sink = WriterSink::new(io::stdout().lock());

    match dispatcher.serve(&mut source, &calculator(), &mut sink) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Failed to serve request: {}", err);
            ExitCode::FAILURE
        }
    }
}
