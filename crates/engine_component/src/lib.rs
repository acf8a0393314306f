//! # engine_component
//!
//! The "C" in ECS: what a component is and how instances come to exist.
//!
//! This crate provides:
//!
//! - [`ComponentRegistry`] maps a component name to its [`Constructor`].
//! - [`Component`] is a shared handle to one instance's field map.
//! - [`EntityId`] and [`EntityAllocator`] issue never-reused entity ids.
//! - [`ComponentError`] covers duplicate, unknown and failing definitions.

pub mod component;
pub mod entity;
pub mod error;
pub mod registry;

pub use component::{Component, Constructor, Fields, VALUE_FIELD};
pub use entity::{EntityAllocator, EntityId};
pub use error::ComponentError;
pub use registry::ComponentRegistry;
