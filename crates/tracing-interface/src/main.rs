mod commands;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_interface_core::constants::{DEFAULT_RELATION_NAME, RELATION_INTERFACE_NAME};
use tracing_interface_core::{Ingester, IngesterType, RelationRole};

#[derive(Parser)]
#[command(
    name = "tracing-interface",
    about = "Inspect and exercise `tracing` relation data",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that charm metadata declares a relation the way a role needs it
    ///
    /// Metadata is read from a .toml or .json file with `provides`,
    /// `requires` and `peers` tables.
    Validate {
        /// Charm metadata file
        #[arg(long, short = 'm')]
        metadata: PathBuf,

        /// Relation name to check
        #[arg(long, short = 'r', default_value = DEFAULT_RELATION_NAME)]
        relation: String,

        /// Expected interface
        #[arg(long, default_value = RELATION_INTERFACE_NAME)]
        interface: String,

        /// Expected role (provides or requires)
        #[arg(long)]
        role: RelationRole,
    },

    /// Publish endpoints the way a traced service would, and print the
    /// resulting application databag as JSON
    ///
    /// Examples:
    ///   tracing-interface publish --hostname myhost.local
    ///   tracing-interface publish --hostname myhost.local --ingester otlp_grpc=4317
    Publish {
        /// Charm metadata file (defaults to a charm providing `tracing`)
        #[arg(long, short = 'm')]
        metadata: Option<PathBuf>,

        /// Relation name to publish on
        #[arg(long, short = 'r', default_value = DEFAULT_RELATION_NAME)]
        relation: String,

        /// Hostname the backend should send traces to
        #[arg(long)]
        hostname: String,

        /// Ingester as <type>=<port>; repeatable. Defaults to every Tempo
        /// protocol on its stock port.
        #[arg(long = "ingester", short = 'i', value_name = "TYPE=PORT")]
        ingesters: Vec<Ingester>,

        /// Run as a non-leader unit
        #[arg(long)]
        follower: bool,
    },

    /// Decode an application databag the way the tracing backend would
    ///
    /// The databag is a JSON object of string values, read from a file or
    /// from stdin when the path is `-`.
    Decode {
        /// Databag file, or `-` for stdin
        databag: PathBuf,

        /// Print only the endpoint URL for this ingester type
        #[arg(long = "type", short = 't')]
        ingester_type: Option<IngesterType>,
    },
}

fn main() -> Result<()> {
    logging::init()?;
    let cli = Cli::parse();

    match cli.command {
        Command::Validate {
            metadata,
            relation,
            interface,
            role,
        } => commands::validate(&metadata, &relation, &interface, role),
        Command::Publish {
            metadata,
            relation,
            hostname,
            ingesters,
            follower,
        } => commands::publish(metadata.as_deref(), &relation, hostname, ingesters, !follower),
        Command::Decode {
            databag,
            ingester_type,
        } => commands::decode(&databag, ingester_type),
    }
}
