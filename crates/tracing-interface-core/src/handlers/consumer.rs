use crate::constants::{DEFAULT_RELATION_NAME, RELATION_INTERFACE_NAME};
use crate::error::RelationError;
use crate::events::{EndpointChangedEvent, Relation, RelationEvent, RelationEventKind};
use crate::metadata::{CharmMetadata, RelationRole};
use crate::traits::{RelationHost, RelationObserver};
use crate::types::{IngesterType, TracingRequirerData};
use crate::validation::validate_relation;

type EndpointChangedHandler = Box<dyn FnMut(&EndpointChangedEvent)>;

/// Reads the tracing endpoints published by the other side of the relation.
///
/// Runs on the tracing backend. Nothing is cached: every notification and
/// every accessor call re-reads the remote databag, and invalid data is
/// logged and reported as "nothing new".
pub struct EndpointConsumer {
    relation_name: String,
    handlers: Vec<EndpointChangedHandler>,
}

impl EndpointConsumer {
    /// Bind to the default `tracing` relation.
    pub fn new(metadata: &CharmMetadata) -> Result<Self, RelationError> {
        Self::for_relation(metadata, DEFAULT_RELATION_NAME)
    }

    /// Bind to the default `tracing` relation declared in the host's metadata.
    pub fn from_host(host: &dyn RelationHost) -> Result<Self, RelationError> {
        Self::new(host.metadata())
    }

    /// Bind to `relation_name`, which must be a `requires` relation with the
    /// `tracing` interface.
    pub fn for_relation(
        metadata: &CharmMetadata,
        relation_name: &str,
    ) -> Result<Self, RelationError> {
        validate_relation(
            metadata,
            relation_name,
            RELATION_INTERFACE_NAME,
            RelationRole::Requires,
        )?;
        Ok(Self {
            relation_name: relation_name.to_string(),
            handlers: Vec::new(),
        })
    }

    /// Register a callback for [`EndpointChangedEvent`]s.
    pub fn on_endpoint_changed(&mut self, handler: impl FnMut(&EndpointChangedEvent) + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Decode the remote data on `relation` and, if valid, notify every
    /// registered handler. The emitted event is also returned.
    #[tracing::instrument(skip_all, fields(relation_id = relation.id))]
    pub fn on_relation_changed(
        &mut self,
        host: &dyn RelationHost,
        relation: &Relation,
    ) -> Option<EndpointChangedEvent> {
        let (hostname, ingesters) = self.read(host, relation)?.into_parts();
        let event = EndpointChangedEvent {
            relation: relation.clone(),
            hostname,
            ingesters,
        };

        tracing::info!(
            relation_id = relation.id,
            hostname = %event.hostname,
            ingesters = event.ingesters.len(),
            "tracing endpoints changed"
        );
        for handler in &mut self.handlers {
            handler(&event);
        }
        Some(event)
    }

    /// The descriptor currently published on the bound relation.
    pub fn current_endpoint(&self, host: &dyn RelationHost) -> Option<TracingRequirerData> {
        let Some(relation) = host.get_relation(&self.relation_name) else {
            tracing::error!(relation_name = %self.relation_name, "no relation");
            return None;
        };
        self.read(host, &relation)
    }

    /// `http://{hostname}:{port}` of the first ingester of `ingester_type`.
    pub fn endpoint(&self, host: &dyn RelationHost, ingester_type: IngesterType) -> Option<String> {
        let data = self.current_endpoint(host)?;
        let endpoint = data.endpoint(ingester_type);
        if endpoint.is_none() {
            tracing::error!(%ingester_type, "no ingester found with type {ingester_type}");
        }
        endpoint
    }

    pub fn otlp_grpc_endpoint(&self, host: &dyn RelationHost) -> Option<String> {
        self.endpoint(host, IngesterType::OtlpGrpc)
    }

    pub fn otlp_http_endpoint(&self, host: &dyn RelationHost) -> Option<String> {
        self.endpoint(host, IngesterType::OtlpHttp)
    }

    pub fn zipkin_endpoint(&self, host: &dyn RelationHost) -> Option<String> {
        self.endpoint(host, IngesterType::Zipkin)
    }

    pub fn tempo_endpoint(&self, host: &dyn RelationHost) -> Option<String> {
        self.endpoint(host, IngesterType::Tempo)
    }

    fn read(&self, host: &dyn RelationHost, relation: &Relation) -> Option<TracingRequirerData> {
        let Some(remote_app) = relation.remote_app.as_deref() else {
            tracing::error!(
                relation_id = relation.id,
                "{relation} event received but there is no relation.app"
            );
            return None;
        };

        let databag = match host.app_data(relation, remote_app) {
            Ok(databag) => databag,
            Err(e) => {
                tracing::error!(
                    relation_id = relation.id,
                    error = %e,
                    "cannot read remote application data"
                );
                return None;
            }
        };

        match TracingRequirerData::from_databag(&databag) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::error!(
                    relation_id = relation.id,
                    remote_app,
                    error = %e,
                    databag = ?databag,
                    "invalid tracing relation data"
                );
                None
            }
        }
    }
}

impl std::fmt::Debug for EndpointConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointConsumer")
            .field("relation_name", &self.relation_name)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl RelationObserver for EndpointConsumer {
    fn relation_name(&self) -> &str {
        &self.relation_name
    }

    fn observes(&self, kind: RelationEventKind) -> bool {
        kind == RelationEventKind::Changed
    }

    fn handle(&mut self, host: &mut dyn RelationHost, event: &RelationEvent) {
        self.on_relation_changed(host, &event.relation);
    }
}
