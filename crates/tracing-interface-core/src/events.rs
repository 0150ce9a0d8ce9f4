use std::fmt;

use serde::Serialize;

use crate::types::Ingester;

/// A live relation as seen from the local unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Relation {
    pub id: u32,
    pub name: String,
    /// The application on the other end. Absent while the host is still
    /// setting the relation up or already tearing it down.
    pub remote_app: Option<String>,
}

impl Relation {
    pub fn new(id: u32, name: impl Into<String>, remote_app: Option<String>) -> Self {
        Self {
            id,
            name: name.into(),
            remote_app,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Relation {}:{}>", self.name, self.id)
    }
}

/// Relation lifecycle notifications delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationEventKind {
    Created,
    Joined,
    Changed,
    Departed,
    Broken,
}

impl RelationEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationEventKind::Created => "created",
            RelationEventKind::Joined => "joined",
            RelationEventKind::Changed => "changed",
            RelationEventKind::Departed => "departed",
            RelationEventKind::Broken => "broken",
        }
    }
}

impl fmt::Display for RelationEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationEvent {
    pub kind: RelationEventKind,
    pub relation: Relation,
}

impl RelationEvent {
    pub fn new(kind: RelationEventKind, relation: Relation) -> Self {
        Self { kind, relation }
    }

    /// Hook name as the host reports it, e.g. `tracing_relation_changed`.
    pub fn name(&self) -> String {
        format!("{}_relation_{}", self.relation.name.replace('-', "_"), self.kind)
    }
}

/// The remote side published a new, valid set of tracing endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointChangedEvent {
    pub relation: Relation,
    pub hostname: String,
    pub ingesters: Vec<Ingester>,
}
