//! Traces of the charm itself, sent to the backend on the `tracing` relation.
//!
//! A charm that consumes the `tracing` interface can export its own
//! execution: one root span per dispatch, a child span for every relation
//! event routed through `dispatch`, and spans for the instrumented handler
//! methods underneath.
//!
//! ```no_run
//! use charm_tracing::{CharmTracer, CharmTracingConfig};
//! use tracing_interface_core::{CharmMetadata, EndpointConsumer, MemoryHost};
//! use tracing_subscriber::layer::SubscriberExt as _;
//! use tracing_subscriber::util::SubscriberInitExt as _;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metadata = CharmMetadata::new("jolly").with_requires("tracing", "tracing");
//! let host = MemoryHost::new("jolly", metadata);
//! let consumer = EndpointConsumer::from_host(&host)?;
//!
//! let config = CharmTracingConfig::from_env("jolly", "JollyCharm");
//! if let Some(tracer) = CharmTracer::from_relation(config, &consumer, &host)? {
//!     tracing_subscriber::registry().with(tracer.layer()).try_init()?;
//!     {
//!         let root = tracer.root_span();
//!         let _entered = root.enter();
//!         // dispatch events here
//!     }
//!     tracer.shutdown()?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Setting `CHARM_TRACING_ENABLED` to anything but `1` turns export off.

pub mod config;
pub mod error;
pub mod tracer;

pub use config::{CHARM_TRACING_ENABLED, CharmTracingConfig, is_enabled};
pub use error::CharmTracingError;
pub use tracer::CharmTracer;
