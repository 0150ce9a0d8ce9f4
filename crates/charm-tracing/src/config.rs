use opentelemetry::KeyValue;
use opentelemetry_sdk::Resource;

/// Environment switch for charm tracing. Unset or `"1"` means on.
pub const CHARM_TRACING_ENABLED: &str = "CHARM_TRACING_ENABLED";

/// Set by the host to the hook being dispatched, e.g. `hooks/install`.
pub const JUJU_DISPATCH_PATH: &str = "JUJU_DISPATCH_PATH";

/// Whether [`CHARM_TRACING_ENABLED`] allows charm tracing.
pub fn is_enabled() -> bool {
    enabled_from(std::env::var(CHARM_TRACING_ENABLED).ok().as_deref())
}

fn enabled_from(value: Option<&str>) -> bool {
    value.is_none_or(|v| v == "1")
}

/// Identity and switches for one charm execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharmTracingConfig {
    /// Reported as `service.name`; usually the application name.
    pub service_name: String,
    pub charm_type: String,
    pub dispatch_path: String,
    pub enabled: bool,
}

impl CharmTracingConfig {
    pub fn new(service_name: impl Into<String>, charm_type: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            charm_type: charm_type.into(),
            dispatch_path: String::new(),
            enabled: true,
        }
    }

    /// Like [`CharmTracingConfig::new`], with the dispatch path and the
    /// enable switch taken from the process environment.
    pub fn from_env(service_name: impl Into<String>, charm_type: impl Into<String>) -> Self {
        Self {
            dispatch_path: std::env::var(JUJU_DISPATCH_PATH).unwrap_or_default(),
            enabled: is_enabled(),
            ..Self::new(service_name, charm_type)
        }
    }

    pub fn with_dispatch_path(mut self, dispatch_path: impl Into<String>) -> Self {
        self.dispatch_path = dispatch_path.into();
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub(crate) fn resource(&self) -> Resource {
        Resource::builder()
            .with_service_name(self.service_name.clone())
            .with_attributes([
                KeyValue::new("compose_service", self.service_name.clone()),
                KeyValue::new("charm_type", self.charm_type.clone()),
            ])
            .build()
    }
}
