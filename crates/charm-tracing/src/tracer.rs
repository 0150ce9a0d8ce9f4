use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig as _;
use opentelemetry_sdk::trace::{SdkTracerProvider, SpanExporter};
use tracing::Subscriber;
use tracing_interface_core::{EndpointConsumer, RelationHost};
use tracing_subscriber::Layer;
use tracing_subscriber::registry::LookupSpan;
use url::Url;

use crate::config::CharmTracingConfig;
use crate::error::CharmTracingError;

/// Path the OTLP/HTTP receiver accepts spans on.
pub const TRACES_PATH: &str = "/v1/traces";

/// Exports the spans of one charm execution.
///
/// Spans come from the `tracing` spans opened while the charm runs: the
/// root span from [`CharmTracer::root_span`], one span per relation event
/// opened by `dispatch`, and one per instrumented handler method. Attach
/// [`CharmTracer::layer`] to the subscriber to forward them, and call
/// [`CharmTracer::shutdown`] before the process exits.
#[derive(Debug)]
pub struct CharmTracer {
    provider: SdkTracerProvider,
    config: CharmTracingConfig,
}

impl CharmTracer {
    /// Set up export to the OTLP/HTTP `endpoint`.
    ///
    /// Returns `Ok(None)` when tracing is switched off or there is no
    /// endpoint yet; the charm keeps running untraced in both cases.
    pub fn install(
        config: CharmTracingConfig,
        endpoint: Option<&str>,
    ) -> Result<Option<Self>, CharmTracingError> {
        if !config.enabled {
            tracing::info!(
                service = %config.service_name,
                "charm tracing disabled, skipping root span initialization"
            );
            return Ok(None);
        }
        let Some(endpoint) = endpoint else {
            tracing::warn!(
                service = %config.service_name,
                "no tracing endpoint available, continuing with charm tracing disabled"
            );
            return Ok(None);
        };

        let traces_url = traces_url(endpoint)?;
        tracing::debug!(%traces_url, "setting up span exporter");
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_http()
            .with_endpoint(traces_url)
            .build()?;

        let provider = SdkTracerProvider::builder()
            .with_resource(config.resource())
            .with_batch_exporter(exporter)
            .build();
        Ok(Some(Self { provider, config }))
    }

    /// [`CharmTracer::install`] against the OTLP/HTTP endpoint the tracing
    /// backend currently publishes on the consumer's relation.
    pub fn from_relation(
        config: CharmTracingConfig,
        consumer: &EndpointConsumer,
        host: &dyn RelationHost,
    ) -> Result<Option<Self>, CharmTracingError> {
        let endpoint = if config.enabled {
            consumer.otlp_http_endpoint(host)
        } else {
            None
        };
        Self::install(config, endpoint.as_deref())
    }

    /// Export through `exporter`, one span at a time as spans end.
    pub fn with_exporter<E>(config: CharmTracingConfig, exporter: E) -> Self
    where
        E: SpanExporter + 'static,
    {
        let provider = SdkTracerProvider::builder()
            .with_resource(config.resource())
            .with_simple_exporter(exporter)
            .build();
        Self { provider, config }
    }

    pub fn config(&self) -> &CharmTracingConfig {
        &self.config
    }

    /// Subscriber layer forwarding `tracing` spans to this tracer.
    pub fn layer<S>(&self) -> impl Layer<S> + use<S>
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        let tracer = self.provider.tracer(self.config.service_name.clone());
        tracing_opentelemetry::layer().with_tracer(tracer)
    }

    /// The span covering the whole charm execution. Enter it before
    /// dispatching any event.
    pub fn root_span(&self) -> tracing::Span {
        tracing::info_span!(
            "charm_exec",
            otel.name = "charm exec",
            juju.dispatch_path = self.config.dispatch_path.as_str(),
        )
    }

    /// Flush buffered spans and stop exporting.
    pub fn shutdown(self) -> Result<(), CharmTracingError> {
        self.provider.force_flush().map_err(CharmTracingError::Flush)?;
        self.provider.shutdown().map_err(CharmTracingError::Shutdown)
    }
}

fn traces_url(endpoint: &str) -> Result<String, CharmTracingError> {
    let invalid = |reason: String| CharmTracingError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };

    let url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    Ok(format!("{}{TRACES_PATH}", endpoint.trim_end_matches('/')))
}
