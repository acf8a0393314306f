//! Membership engine: incremental enter/leave on every attach and detach.
//!
//! Each notification walks every system once, in registration order, and
//! compares the entity's *current* component set with that system's match
//! specification. No component-to-system index is kept, so the cost is
//! O(systems) per mutation.
//!
//! For any one system a notification fires at most one of enter or leave,
//! and the tracked list never holds an entity twice.

use crate::entity::Entity;
use crate::system::System;

/// Called after a component was attached to `entity` (and once when the
/// entity is created).
///
/// A tracked entity leaves when it now carries an excluded component. An
/// untracked entity enters when it now has every required component and no
/// excluded one.
pub(crate) fn on_component_added(systems: &[System], entity: &Entity) {
    for system in systems {
        if system.tracks(entity) {
            if system.has_excluded(entity) {
                system.leave(entity);
            }
        } else if system.has_required(entity) && !system.has_excluded(entity) {
            system.enter(entity);
        }
    }
}

/// Called after a component was detached from `entity`.
///
/// A tracked entity leaves when a required component is gone. An untracked
/// entity enters when the detached component was the one excluding it.
pub(crate) fn on_component_removed(systems: &[System], entity: &Entity) {
    for system in systems {
        if system.tracks(entity) {
            if !system.has_required(entity) {
                system.leave(entity);
            }
        } else if system.has_required(entity) && !system.has_excluded(entity) {
            system.enter(entity);
        }
    }
}

/// Enroll already-existing entities into a newly created system.
pub(crate) fn enroll_existing(system: &System, entities: &[Entity]) {
    for entity in entities {
        if !system.tracks(entity) && system.matches(entity) {
            system.enter(entity);
        }
    }
}
