use crate::events::RelationEvent;
use crate::traits::{RelationHost, RelationObserver};

/// Deliver a host notification to every observer bound to the event's
/// relation name that listens for its kind.
///
/// This is the subscription point between the host and the roles in this
/// crate:
/// 1. The host turns its own relation hook into a [`RelationEvent`].
/// 2. Each matching observer handles it, in slice order.
/// 3. The number of observers that were notified is returned.
pub fn dispatch(
    host: &mut dyn RelationHost,
    event: &RelationEvent,
    observers: &mut [&mut dyn RelationObserver],
) -> usize {
    let otel_name = format!("event: {}", event.name());
    let span = tracing::info_span!(
        "relation_event",
        otel.name = otel_name.as_str(),
        relation_id = event.relation.id,
        kind = %event.kind,
    );
    let _entered = span.enter();

    let mut notified = 0;
    for observer in observers.iter_mut() {
        if observer.relation_name() != event.relation.name || !observer.observes(event.kind) {
            continue;
        }
        observer.handle(host, event);
        notified += 1;
    }

    tracing::trace!(notified, "dispatched relation event");
    notified
}
