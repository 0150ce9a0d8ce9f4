//! `tracing` interface constants

/// Relation name both roles bind to unless told otherwise.
pub const DEFAULT_RELATION_NAME: &str = "tracing";

/// Interface tag the relation must declare in charm metadata.
pub const RELATION_INTERFACE_NAME: &str = "tracing";

pub mod keys {
    // Application databag, written by the provider
    pub const HOSTNAME: &str = "hostname";
    pub const INGESTERS: &str = "ingesters";

    // Legacy application databag keys
    pub const SCRAPE_METADATA: &str = "scrape_metadata";
    pub const SCRAPE_JOBS: &str = "scrape_jobs";
    pub const ALERT_RULES: &str = "alert_rules";

    // Legacy unit databag keys
    pub const UNIT_NAME: &str = "tempo_scrape_unit_name";
    pub const UNIT_ADDRESS: &str = "tempo_scrape_unit_address";
}

pub mod ports {
    // Ports Tempo listens on for each ingestion protocol
    pub const TEMPO: u16 = 3200;
    pub const OTLP_GRPC: u16 = 4317;
    pub const OTLP_HTTP: u16 = 4318;
    pub const ZIPKIN: u16 = 9411;
}
