//! Relation data exchange for the `tracing` charm interface.
//!
//! A traced service runs an [`EndpointProvider`] that publishes its hostname
//! and ingesters into the application databag of every `tracing` relation.
//! The tracing backend runs an [`EndpointConsumer`] that decodes that data
//! whenever the relation changes and hands an [`EndpointChangedEvent`] to the
//! owning charm.
//!
//! All host interaction goes through [`RelationHost`]; [`MemoryHost`] is an
//! in-process implementation used by tests and the CLI.

pub mod constants;
pub mod error;
pub mod events;
pub mod handlers;
pub mod metadata;
pub mod runtime;
pub mod scrape;
pub mod traits;
pub mod types;
pub mod validation;

pub use error::{DecodeError, HostError, MetadataError, PublishError, RelationError, ScrapeJobError};
pub use events::{EndpointChangedEvent, Relation, RelationEvent, RelationEventKind};
pub use handlers::{EndpointConsumer, EndpointProvider, dispatch};
pub use metadata::{CharmMetadata, RelationMeta, RelationRole};
pub use runtime::MemoryHost;
pub use traits::{Databag, RelationHost, RelationObserver};
pub use types::{Ingester, IngesterType, TracingRequirerData};
pub use validation::validate_relation;
