use crate::events::{RelationEvent, RelationEventKind};
use crate::traits::RelationHost;

/// Something that reacts to host notifications about one relation name.
///
/// Observers declare what they listen to and [`crate::dispatch`] routes
/// matching events to them.
pub trait RelationObserver {
    /// Relation name this observer is bound to
    fn relation_name(&self) -> &str;

    /// Whether `kind` notifications should be delivered
    fn observes(&self, kind: RelationEventKind) -> bool;

    /// React to a notification. Must not fail: anything that goes wrong is
    /// logged and swallowed.
    fn handle(&mut self, host: &mut dyn RelationHost, event: &RelationEvent);
}
