//! Scheduler: run every system, or one named group, once per call.
//!
//! Groups are a secondary index built when systems are created. They do not
//! own systems and have no effect on membership.

use std::collections::HashMap;

use serde_json::Value;
use tracing::trace;

use crate::system::System;

/// Systems batched by their `group` key, each list in creation order.
#[derive(Debug, Default)]
pub(crate) struct Groups {
    groups: HashMap<String, Vec<System>>,
}

impl Groups {
    pub(crate) fn insert(&mut self, group: &str, system: System) {
        self.groups.entry(group.to_string()).or_default().push(system);
    }

    pub(crate) fn get(&self, group: &str) -> Option<Vec<System>> {
        self.groups.get(group).cloned()
    }

    pub(crate) fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Run each system in order with the same global value.
pub(crate) fn run_all(systems: &[System], global: Option<&Value>) {
    trace!(systems = systems.len(), "run pass");
    for system in systems {
        system.run(global);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::config::SystemConfig;
    use crate::registry::Registry;

    #[test]
    fn test_groups_keep_creation_order() {
        let registry = Registry::new();
        let a = registry.create_system(SystemConfig::new().group("g"));
        let b = registry.create_system(SystemConfig::new().group("g"));
        let mut groups = Groups::default();
        groups.insert("g", a.clone());
        groups.insert("g", b.clone());
        groups.insert("h", b.clone());
        assert_eq!(groups.get("g"), Some(vec![a, b]));
        assert!(groups.get("missing").is_none());
        assert_eq!(groups.names(), vec!["g".to_string(), "h".to_string()]);
    }

    #[test]
    fn test_run_all_in_order() {
        let registry = Registry::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut systems = Vec::new();
        for label in ["one", "two"] {
            let sink = Rc::clone(&log);
            let config = SystemConfig::new()
                .pre(move |_, global| sink.borrow_mut().push((label, global.cloned())));
            systems.push(registry.create_system(config));
        }
        run_all(&systems, Some(&json!(1)));
        assert_eq!(*log.borrow(), vec![("one", Some(json!(1))), ("two", Some(json!(1)))]);
    }
}
