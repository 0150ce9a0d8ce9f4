use std::collections::{BTreeMap, BTreeSet};

use crate::error::HostError;
use crate::events::Relation;
use crate::metadata::CharmMetadata;
use crate::traits::{Databag, RelationHost};

/// In-process [`RelationHost`] holding relation databags in memory.
///
/// Used by the tests and the CLI. Relations can be torn down to reproduce
/// the host refusing access to a relation that is going away.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    app_name: String,
    metadata: CharmMetadata,
    leader: bool,
    next_relation_id: u32,
    relations: Vec<Relation>,
    app_data: BTreeMap<(u32, String), Databag>,
    torn_down: BTreeSet<u32>,
    writes: usize,
}

impl MemoryHost {
    pub fn new(app_name: impl Into<String>, metadata: CharmMetadata) -> Self {
        Self {
            app_name: app_name.into(),
            metadata,
            leader: false,
            next_relation_id: 0,
            relations: Vec::new(),
            app_data: BTreeMap::new(),
            torn_down: BTreeSet::new(),
            writes: 0,
        }
    }

    pub fn with_leader(mut self, leader: bool) -> Self {
        self.leader = leader;
        self
    }

    pub fn set_leader(&mut self, leader: bool) {
        self.leader = leader;
    }

    /// Relate the local application to `remote_app` over `relation_name`.
    pub fn add_relation(&mut self, relation_name: &str, remote_app: &str) -> Relation {
        let relation = Relation::new(
            self.next_relation_id,
            relation_name,
            Some(remote_app.to_string()),
        );
        self.next_relation_id += 1;
        self.relations.push(relation.clone());
        relation
    }

    /// Keep the relation listed but refuse every databag access on it.
    pub fn tear_down(&mut self, relation_id: u32) {
        self.torn_down.insert(relation_id);
    }

    /// Replace what the remote application has published on a relation.
    pub fn set_remote_app_data(&mut self, relation_id: u32, data: Databag) {
        let Some(remote_app) = self
            .relation(relation_id)
            .and_then(|r| r.remote_app.clone())
        else {
            return;
        };
        self.app_data.insert((relation_id, remote_app), data);
    }

    /// What the local application has written on a relation, if anything.
    pub fn local_app_data(&self, relation_id: u32) -> Option<&Databag> {
        self.app_data.get(&(relation_id, self.app_name.clone()))
    }

    /// Number of successful databag writes so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    fn relation(&self, relation_id: u32) -> Option<&Relation> {
        self.relations.iter().find(|r| r.id == relation_id)
    }

    fn check_access(&self, relation: &Relation) -> Result<(), HostError> {
        if self.relation(relation.id).is_none() {
            return Err(HostError::UnknownRelation {
                relation_id: relation.id,
            });
        }
        if self.torn_down.contains(&relation.id) {
            return Err(HostError::RelationGone {
                relation_id: relation.id,
                message: "cannot read relation application settings: permission denied".to_string(),
            });
        }
        Ok(())
    }
}

impl RelationHost for MemoryHost {
    fn app_name(&self) -> &str {
        &self.app_name
    }

    fn metadata(&self) -> &CharmMetadata {
        &self.metadata
    }

    fn is_leader(&self) -> bool {
        self.leader
    }

    fn relations(&self, relation_name: &str) -> Vec<Relation> {
        self.relations
            .iter()
            .filter(|r| r.name == relation_name)
            .cloned()
            .collect()
    }

    fn app_data(&self, relation: &Relation, app: &str) -> Result<Databag, HostError> {
        self.check_access(relation)?;
        Ok(self
            .app_data
            .get(&(relation.id, app.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn update_app_data(&mut self, relation: &Relation, data: &Databag) -> Result<(), HostError> {
        self.check_access(relation)?;
        if !self.leader {
            return Err(HostError::Other(
                "only the leader may write application data".to_string(),
            ));
        }
        self.app_data
            .entry((relation.id, self.app_name.clone()))
            .or_default()
            .extend(data.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.writes += 1;
        Ok(())
    }
}
