use serde::{Deserialize, Serialize};

use crate::service::{JsonRpcService, documentation_key};

/// Version of the service description format
pub const SD_VERSION: &str = "1.0";

/// Introspected description of one procedure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureDescriptor {
    pub name: String,
    pub params: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

/// Introspected description of a whole service, returned by `system.describe`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub sdversion: String,
    pub name: String,
    pub address: String,
    pub id: String,
    pub procs: Vec<ProcedureDescriptor>,
}

/// Describe `service` as served from `address`.
///
/// Deterministic for a given service shape and address; the id is the MD5
/// of the address as a `urn:md5:` URN.
pub fn describe(service: &dyn JsonRpcService, address: &str) -> ServiceDescriptor {
    let procs = service
        .procedures()
        .iter()
        .map(|procedure| ProcedureDescriptor {
            name: procedure.name().to_string(),
            params: procedure.params().to_vec(),
            help: service
                .attribute(&documentation_key(procedure.name()))
                .map(str::to_string),
        })
        .collect();

    ServiceDescriptor {
        sdversion: SD_VERSION.to_string(),
        name: service.name().to_string(),
        address: address.to_string(),
        id: service_id(address),
        procs,
    }
}

/// Stable service id derived from its address
pub fn service_id(address: &str) -> String {
    format!("urn:md5:{:x}", md5::compute(address.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcedureError;
    use crate::service::Service;
    use serde_json::{Value, json};

    fn noop(_params: Vec<Value>) -> Result<Value, ProcedureError> {
        Ok(Value::Null)
    }

    fn demo_service() -> Service {
        Service::new("DemoService")
            .with_procedure("add", &["a", "b"], noop)
            .with_procedure("ping", &[], noop)
            .with_documentation("add", "Adds two numbers")
    }

    #[test]
    fn test_describe_lists_procedures_in_order() {
        let descriptor = describe(&demo_service(), "http://localhost/rpc");

        assert_eq!(descriptor.sdversion, "1.0");
        assert_eq!(descriptor.name, "DemoService");
        assert_eq!(descriptor.address, "http://localhost/rpc");
        assert_eq!(descriptor.procs.len(), 2);
        assert_eq!(descriptor.procs[0].name, "add");
        assert_eq!(descriptor.procs[0].params, vec!["a", "b"]);
        assert_eq!(descriptor.procs[0].help.as_deref(), Some("Adds two numbers"));
        assert_eq!(descriptor.procs[1].name, "ping");
        assert!(descriptor.procs[1].help.is_none());
    }

    #[test]
    fn test_service_id_is_md5_of_address() {
        // md5("") is the well-known empty digest
        assert_eq!(service_id(""), "urn:md5:d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(
            describe(&demo_service(), "a").id,
            describe(&demo_service(), "a").id
        );
        assert_ne!(service_id("a"), service_id("b"));
    }

    #[test]
    fn test_help_is_omitted_when_absent() {
        let descriptor = describe(&demo_service(), "addr");
        let value = serde_json::to_value(&descriptor).unwrap();

        assert_eq!(
            value["procs"][1],
            json!({"name": "ping", "params": []})
        );
        assert_eq!(value["procs"][0]["help"], "Adds two numbers");
    }
}
