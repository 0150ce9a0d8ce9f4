use std::collections::BTreeMap;

use crate::error::HostError;
use crate::events::Relation;
use crate::metadata::CharmMetadata;

/// Key/value contents of one application's side of a relation.
pub type Databag = BTreeMap<String, String>;

/// The narrow slice of the charm framework this crate talks to.
///
/// Implementations wrap whatever model the host exposes; everything is
/// synchronous and called from inside a single event handler.
pub trait RelationHost {
    /// Name of the local application
    fn app_name(&self) -> &str;

    /// The relation registry declared by the local charm
    fn metadata(&self) -> &CharmMetadata;

    /// Whether this unit may write application-scoped relation data
    fn is_leader(&self) -> bool;

    /// All active relations bound to `relation_name`
    fn relations(&self, relation_name: &str) -> Vec<Relation>;

    /// The single relation bound to `relation_name`, if any
    fn get_relation(&self, relation_name: &str) -> Option<Relation> {
        self.relations(relation_name).into_iter().next()
    }

    /// Read the application databag of `app` on `relation`
    fn app_data(&self, relation: &Relation, app: &str) -> Result<Databag, HostError>;

    /// Merge `data` into the local application's databag on `relation`
    fn update_app_data(&mut self, relation: &Relation, data: &Databag) -> Result<(), HostError>;
}
