//! The `Entity` trait implemented by every record type kept in sync between
//! the record store and the search index.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::Debug;

/// Identifier assigned by the record store on first save.
pub type EntityId = i64;

/// A record type that can be persisted in the record store and mirrored into
/// the search index.
///
/// Implementors describe how they are named in each surface (alerts, HTTP
/// paths, index aliases) and expose their identifier and optional parent
/// reference. Everything else about the record travels through its serde
/// schema.
///
/// # Identifier lifecycle
///
/// A record starts with `id() == None`. The record store assigns the id on
/// first save; after that it never changes.
pub trait Entity:
    Serialize + DeserializeOwned + Clone + Debug + PartialEq + Send + Sync + 'static
{
    /// camelCase name used in alert headers and error bodies (e.g. `"sample"`).
    const ENTITY_NAME: &'static str;

    /// Plural kebab-case name used as the HTTP path segment, the record store
    /// partition and the search index alias (e.g. `"samples"`).
    const COLLECTION: &'static str;

    /// Lowercase name of the related entity that list filters can test for
    /// absence (e.g. `"salesorder"`), if the entity has one.
    const PARENT_RELATION: Option<&'static str> = None;

    /// The record's identifier, `None` until first persisted.
    fn id(&self) -> Option<EntityId>;

    /// Set the record's identifier. Only record stores should call this.
    fn set_id(&mut self, id: EntityId);

    /// The identifier of the related parent entity, if any.
    fn parent_id(&self) -> Option<EntityId> {
        None
    }

    /// Project the record into a field-name to value mapping.
    ///
    /// The `id` field is included when set. Fields serialized as `null` are
    /// kept so the mapping always carries the full schema.
    fn to_fields(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(serde::ser::Error::custom(format!(
                "{} must serialize to a JSON object, got {}",
                Self::ENTITY_NAME,
                other
            ))),
        }
    }

    /// Rebuild a record from a field mapping, forcing the given identifier.
    fn from_fields(fields: Map<String, Value>, id: EntityId) -> Result<Self, serde_json::Error> {
        let mut record: Self = serde_json::from_value(Value::Object(fields))?;
        record.set_id(id);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sample;

    #[test]
    fn test_to_fields_includes_id_when_set() {
        let mut sample = Sample::named("A");
        sample.set_id(7);

        let fields = sample.to_fields().unwrap();

        assert_eq!(fields["id"], Value::from(7));
        assert_eq!(fields["name"], Value::from("A"));
    }

    #[test]
    fn test_from_fields_forces_id() {
        let sample = Sample::named("A");
        let fields = sample.to_fields().unwrap();

        let restored = Sample::from_fields(fields, 42).unwrap();

        assert_eq!(restored.id(), Some(42));
        assert_eq!(restored.name.as_deref(), Some("A"));
    }
}
