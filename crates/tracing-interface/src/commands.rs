use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing_interface_core::constants::RELATION_INTERFACE_NAME;
use tracing_interface_core::{
    CharmMetadata, Databag, EndpointConsumer, EndpointProvider, Ingester, IngesterType,
    MemoryHost, RelationRole, TracingRequirerData, validate_relation,
};

/// Name of the application on the far side of simulated relations.
const REMOTE_APP: &str = "remote";

pub fn validate(
    metadata: &Path,
    relation: &str,
    interface: &str,
    role: RelationRole,
) -> Result<()> {
    let metadata = load_metadata(metadata)?;
    validate_relation(&metadata, relation, interface, role)?;
    println!("relation '{relation}' of '{}' is valid", metadata.name);
    Ok(())
}

pub fn publish(
    metadata: Option<&Path>,
    relation: &str,
    hostname: String,
    ingesters: Vec<Ingester>,
    leader: bool,
) -> Result<()> {
    let metadata = match metadata {
        Some(path) => load_metadata(path)?,
        None => {
            CharmMetadata::new("traced-service").with_provides(relation, RELATION_INTERFACE_NAME)
        }
    };
    let ingesters = if ingesters.is_empty() {
        Ingester::tempo_defaults()
    } else {
        ingesters
    };

    let data = TracingRequirerData::new(hostname, ingesters)?;
    let provider = EndpointProvider::for_relation(&metadata, relation, data)?;

    let mut host = MemoryHost::new(metadata.name.clone(), metadata).with_leader(leader);
    let bound = host.add_relation(relation, REMOTE_APP);
    let written = provider.publish(&mut host)?;
    tracing::info!(written, "publish finished");

    let databag = host.local_app_data(bound.id).cloned().unwrap_or_default();
    println!("{}", serde_json::to_string_pretty(&databag)?);
    Ok(())
}

#[derive(Serialize)]
struct Decoded<'a> {
    hostname: &'a str,
    ingesters: &'a [Ingester],
    endpoints: Databag,
}

pub fn decode(path: &Path, ingester_type: Option<IngesterType>) -> Result<()> {
    let databag = read_databag(path)?;

    let metadata =
        CharmMetadata::new("tracing-backend").with_requires("tracing", RELATION_INTERFACE_NAME);
    let mut host = MemoryHost::new(metadata.name.clone(), metadata);
    let mut consumer = EndpointConsumer::from_host(&host)?;
    let relation = host.add_relation("tracing", REMOTE_APP);
    host.set_remote_app_data(relation.id, databag);

    if consumer.on_relation_changed(&host, &relation).is_none() {
        bail!("relation data was rejected; see the log for details");
    }
    let data = consumer
        .current_endpoint(&host)
        .context("relation data disappeared")?;

    if let Some(ingester_type) = ingester_type {
        let endpoint = data
            .endpoint(ingester_type)
            .with_context(|| format!("no ingester of type {ingester_type}"))?;
        println!("{endpoint}");
        return Ok(());
    }

    let endpoints = IngesterType::ALL
        .into_iter()
        .filter_map(|t| data.endpoint(t).map(|url| (t.to_string(), url)))
        .collect();
    let decoded = Decoded {
        hostname: data.hostname(),
        ingesters: data.ingesters(),
        endpoints,
    };
    println!("{}", serde_json::to_string_pretty(&decoded)?);
    Ok(())
}

fn load_metadata(path: &Path) -> Result<CharmMetadata> {
    CharmMetadata::load(path)
        .with_context(|| format!("Failed to load charm metadata from {}", path.display()))
}

fn read_databag(path: &Path) -> Result<Databag> {
    let source = if path == Path::new("-") {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read databag from stdin")?;
        source
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read databag from {}", path.display()))?
    };
    serde_json::from_str(&source).context("Databag must be a JSON object of string values")
}
