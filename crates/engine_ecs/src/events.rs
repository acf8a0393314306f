//! Event bus: synchronous broadcast of named events to subscribed systems.

use serde_json::Value;
use tracing::trace;

use crate::system::System;

/// Deliver `event` to every system whose `on` list names it, in registration
/// order. Systems subscribed without an `on_event` hook are skipped.
///
/// Returns the number of hooks invoked.
pub(crate) fn broadcast(systems: &[System], event: &str, args: &[Value]) -> usize {
    let mut delivered = 0;
    for system in systems {
        if system.subscribes_to(event) && system.deliver(args) {
            delivered += 1;
        }
    }
    trace!(event, delivered, "event broadcast");
    delivered
}
