//! The `Sample` entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId};

/// A laboratory sample record.
///
/// All descriptive fields are optional; only `id` is managed by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub batch: Option<String>,
    #[serde(default)]
    pub date_sampling: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sampling_location: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
}

impl Sample {
    /// Create an unsaved sample with only a name.
    ///
    /// # Example
    ///
    /// ```
    /// use entity_sync_shared::{Entity, Sample};
    ///
    /// let sample = Sample::named("AAAAAAAAAA");
    /// assert!(sample.id().is_none());
    /// ```
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

impl Entity for Sample {
    const ENTITY_NAME: &'static str = "sample";
    const COLLECTION: &'static str = "samples";

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}
