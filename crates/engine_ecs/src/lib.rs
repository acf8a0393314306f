//! # engine_ecs
//!
//! A registry-based ECS runtime whose systems derive their membership from
//! the components each entity carries.
//!
//! - [`Registry`] owns component definitions, entities, systems and groups.
//! - [`Entity`] handles attach and detach components; every change runs the
//!   membership engine, which fires `on_enter`/`on_leave` on the systems
//!   whose match result changed.
//! - [`System`] tracks its matching entities and is driven by
//!   [`Registry::run`] / [`Registry::run_group`].
//! - [`Registry::emit`] and [`System::emit`] broadcast named events to
//!   subscribed systems.
//!
//! Everything is single-threaded and synchronous. Callbacks run inline and
//! may call back into the registry.
//!
//! ```rust
//! use engine_ecs::{Registry, SystemConfig};
//! use serde_json::json;
//!
//! let registry = Registry::new();
//! registry.define_component("position", None).unwrap();
//! registry.define_component("velocity", None).unwrap();
//!
//! registry.create_system(
//!     SystemConfig::new()
//!         .components(["position", "velocity"])
//!         .every(|_, args| {
//!             let (Some(pos), Some(vel)) = (args.get(0), args.get(1)) else { return };
//!             let x = pos.value().and_then(|v| v.as_f64()).unwrap_or(0.0);
//!             let dx = vel.value().and_then(|v| v.as_f64()).unwrap_or(0.0);
//!             pos.set("value", x + dx);
//!         }),
//! );
//!
//! let e = registry.create_entity();
//! e.attach("position", &[json!(1.0)]).unwrap();
//! e.attach("velocity", &[json!(0.5)]).unwrap();
//! registry.run(None);
//! assert_eq!(e.get("position").unwrap().value(), Some(json!(1.5)));
//! ```

pub mod config;
pub mod entity;
pub mod error;
mod events;
mod membership;
pub mod registry;
mod scheduler;
pub mod system;

pub use config::{EntityHook, EventHook, Hooks, InitHook, MatchSpec, PreHook, SystemConfig};
pub use engine_component::{Component, Constructor, EntityId, Fields};
pub use entity::Entity;
pub use error::EcsError;
pub use registry::{Registry, create_registry};
pub use system::{Bindings, System};
