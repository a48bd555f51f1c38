use crate::describe::SD_VERSION;

/// Reserved method answered with a service description
pub const DESCRIBE_METHOD: &str = "system.describe";

/// Dispatcher configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Address the service is reachable at, reported by introspection
    pub address: String,
    /// Version tag of the service description format
    pub sd_version: String,
    /// Method name answered with the service description
    pub describe_method: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            address: "http://localhost/".to_string(),
            sd_version: SD_VERSION.to_string(),
            describe_method: DESCRIBE_METHOD.to_string(),
        }
    }
}

impl DispatcherConfig {
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_sd_version(mut self, sd_version: impl Into<String>) -> Self {
        self.sd_version = sd_version.into();
        self
    }

    pub fn with_describe_method(mut self, method: impl Into<String>) -> Self {
        self.describe_method = method.into();
        self
    }
}
