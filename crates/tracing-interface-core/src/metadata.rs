//! Charm metadata: the registry of relations a charm declares.
//!
//! Only the parts the relation validator needs are modelled. Metadata can be
//! loaded from TOML or JSON:
//!
//! ```toml
//! name = "tempo"
//!
//! [provides.tracing]
//! interface = "tracing"
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MetadataError;

/// Which side of a relation a charm declares it on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationRole {
    Provides,
    Requires,
    Peer,
}

impl fmt::Display for RelationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelationRole::Provides => "provides",
            RelationRole::Requires => "requires",
            RelationRole::Peer => "peer",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for RelationRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "provides" => Ok(RelationRole::Provides),
            "requires" => Ok(RelationRole::Requires),
            "peer" | "peers" => Ok(RelationRole::Peer),
            other => Err(format!("unknown relation role '{other}'")),
        }
    }
}

/// A single relation endpoint declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationMeta {
    pub interface: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl RelationMeta {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            limit: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharmMetadata {
    pub name: String,
    #[serde(default)]
    pub provides: BTreeMap<String, RelationMeta>,
    #[serde(default)]
    pub requires: BTreeMap<String, RelationMeta>,
    #[serde(default)]
    pub peers: BTreeMap<String, RelationMeta>,
}

impl CharmMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Declare `relation_name` under `provides`.
    pub fn with_provides(mut self, relation_name: &str, interface: &str) -> Self {
        self.provides
            .insert(relation_name.to_string(), RelationMeta::new(interface));
        self
    }

    /// Declare `relation_name` under `requires`.
    pub fn with_requires(mut self, relation_name: &str, interface: &str) -> Self {
        self.requires
            .insert(relation_name.to_string(), RelationMeta::new(interface));
        self
    }

    /// Look a relation up across all three sections.
    ///
    /// Juju forbids the same name in two sections, so the first hit is the
    /// only one.
    pub fn relation(&self, relation_name: &str) -> Option<(RelationRole, &RelationMeta)> {
        self.provides
            .get(relation_name)
            .map(|meta| (RelationRole::Provides, meta))
            .or_else(|| {
                self.requires
                    .get(relation_name)
                    .map(|meta| (RelationRole::Requires, meta))
            })
            .or_else(|| {
                self.peers
                    .get(relation_name)
                    .map(|meta| (RelationRole::Peer, meta))
            })
    }

    pub fn from_toml_str(source: &str) -> Result<Self, MetadataError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self, MetadataError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Load metadata from a `.toml` or `.json` file.
    pub fn load(path: &Path) -> Result<Self, MetadataError> {
        let source = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&source),
            Some("json") => Self::from_json_str(&source),
            other => Err(MetadataError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_lookup_reports_role() {
        let meta = CharmMetadata::new("tempo")
            .with_provides("tracing", "tracing")
            .with_requires("logging", "loki_push_api");

        let (role, rel) = meta.relation("tracing").unwrap();
        assert_eq!(role, RelationRole::Provides);
        assert_eq!(rel.interface, "tracing");

        let (role, _) = meta.relation("logging").unwrap();
        assert_eq!(role, RelationRole::Requires);

        assert!(meta.relation("missing").is_none());
    }

    #[test]
    fn test_from_toml_str() {
        let meta = CharmMetadata::from_toml_str(
            r#"
            name = "jolly"

            [requires.tracing]
            interface = "tracing"
            limit = 1

            [peers.replicas]
            interface = "tempo_replica"
            "#,
        )
        .unwrap();

        assert_eq!(meta.name, "jolly");
        assert!(meta.provides.is_empty());
        assert_eq!(meta.requires["tracing"].limit, Some(1));
        assert_eq!(meta.relation("replicas").unwrap().0, RelationRole::Peer);
    }

    #[test]
    fn test_from_json_str() {
        let meta = CharmMetadata::from_json_str(
            r#"{"name": "jolly", "provides": {"tracing": {"interface": "tracing"}}}"#,
        )
        .unwrap();
        assert_eq!(meta, CharmMetadata::new("jolly").with_provides("tracing", "tracing"));
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.yaml");
        std::fs::write(&path, "name: jolly").unwrap();

        let err = CharmMetadata::load(&path).unwrap_err();
        assert!(matches!(err, MetadataError::UnsupportedFormat(ext) if ext == "yaml"));
    }

    #[test]
    fn test_load_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.toml");
        std::fs::write(&path, "name = \"jolly\"\n[provides.tracing]\ninterface = \"tracing\"\n")
            .unwrap();

        let meta = CharmMetadata::load(&path).unwrap();
        assert_eq!(meta.relation("tracing").unwrap().0, RelationRole::Provides);
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("provides".parse::<RelationRole>().unwrap(), RelationRole::Provides);
        assert_eq!("requires".parse::<RelationRole>().unwrap(), RelationRole::Requires);
        assert!("sideways".parse::<RelationRole>().is_err());
    }
}
