use crate::constants::{DEFAULT_RELATION_NAME, RELATION_INTERFACE_NAME};
use crate::error::{HostError, PublishError, RelationError};
use crate::events::{RelationEvent, RelationEventKind};
use crate::metadata::{CharmMetadata, RelationRole};
use crate::traits::{RelationHost, RelationObserver};
use crate::types::TracingRequirerData;
use crate::validation::validate_relation;

/// Publishes where the local service accepts traces.
///
/// Runs on the traced service. Whenever a `tracing` relation is created or
/// joined, the leader writes its hostname and ingesters into the local
/// application databag of every such relation.
#[derive(Debug, Clone)]
pub struct EndpointProvider {
    relation_name: String,
    data: TracingRequirerData,
}

impl EndpointProvider {
    /// Bind to the default `tracing` relation.
    pub fn new(metadata: &CharmMetadata, data: TracingRequirerData) -> Result<Self, RelationError> {
        Self::for_relation(metadata, DEFAULT_RELATION_NAME, data)
    }

    /// Bind to the default `tracing` relation, checked against the metadata
    /// the host declares for the local charm.
    pub fn from_host(
        host: &dyn RelationHost,
        data: TracingRequirerData,
    ) -> Result<Self, RelationError> {
        Self::new(host.metadata(), data)
    }

    /// Bind to `relation_name`, which must be a `provides` relation with the
    /// `tracing` interface.
    pub fn for_relation(
        metadata: &CharmMetadata,
        relation_name: &str,
        data: TracingRequirerData,
    ) -> Result<Self, RelationError> {
        validate_relation(
            metadata,
            relation_name,
            RELATION_INTERFACE_NAME,
            RelationRole::Provides,
        )?;
        Ok(Self {
            relation_name: relation_name.to_string(),
            data,
        })
    }

    pub fn data(&self) -> &TracingRequirerData {
        &self.data
    }

    /// Write the descriptor to every bound relation and return how many
    /// databags were updated.
    ///
    /// Followers write nothing. A relation that disappears mid-write stops
    /// the pass without an error.
    #[tracing::instrument(skip_all, fields(relation_name = %self.relation_name))]
    pub fn publish(&self, host: &mut dyn RelationHost) -> Result<usize, PublishError> {
        if !host.is_leader() {
            tracing::debug!(
                relation_name = %self.relation_name,
                "not the leader, skipping relation data update"
            );
            return Ok(0);
        }

        let databag = self.data.to_databag()?;
        let mut written = 0;
        for relation in host.relations(&self.relation_name) {
            match host.update_app_data(&relation, &databag) {
                Ok(()) => written += 1,
                Err(HostError::RelationGone { .. }) => {
                    tracing::error!(
                        relation_id = relation.id,
                        relation_name = %relation.name,
                        "relation data could not be updated, the relation must be gone"
                    );
                    return Ok(written);
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::debug!(
            app = host.app_name(),
            relation_name = %self.relation_name,
            written,
            hostname = %self.data.hostname(),
            "published tracing endpoints"
        );
        Ok(written)
    }
}

impl RelationObserver for EndpointProvider {
    fn relation_name(&self) -> &str {
        &self.relation_name
    }

    fn observes(&self, kind: RelationEventKind) -> bool {
        matches!(kind, RelationEventKind::Created | RelationEventKind::Joined)
    }

    fn handle(&mut self, host: &mut dyn RelationHost, event: &RelationEvent) {
        if let Err(e) = self.publish(host) {
            tracing::error!(
                relation_id = event.relation.id,
                error = %e,
                "failed to publish tracing endpoints"
            );
        }
    }
}
