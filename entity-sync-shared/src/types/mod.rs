//! Entity types shared across the record store, search index and HTTP layer.

mod entity;
mod list_filter;
mod payment_method;
mod sample;

pub use entity::{Entity, EntityId};
pub use list_filter::ListFilter;
pub use payment_method::PaymentMethod;
pub use sample::Sample;
