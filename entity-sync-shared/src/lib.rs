//! # Entity Sync Shared
//!
//! Shared types for the entity sync workspace: the `Entity` trait implemented
//! by every synchronised record type, the list filter, and the concrete
//! entities exposed by the application.

pub mod types;

pub use types::{Entity, EntityId, ListFilter, PaymentMethod, Sample};
