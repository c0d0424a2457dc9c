//! List filters applied by the record store.

use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// Predicate applied by `find_all` over an entity's parent reference.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListFilter {
    /// Every record of the entity type.
    #[default]
    All,

    /// Only records whose parent reference is unset.
    WithoutParent,
}

impl ListFilter {
    /// Suffix of the HTTP filter parameter that selects `WithoutParent`.
    pub const IS_NULL_SUFFIX: &'static str = "-is-null";

    /// Parse the `filter` query parameter for entity `E`.
    ///
    /// `"<relation>-is-null"` selects `WithoutParent` when `<relation>` is the
    /// entity's `PARENT_RELATION`. Anything else, including no parameter,
    /// selects `All`.
    ///
    /// # Example
    ///
    /// ```
    /// use entity_sync_shared::{ListFilter, PaymentMethod, Sample};
    ///
    /// assert_eq!(
    ///     ListFilter::parse::<PaymentMethod>(Some("salesorder-is-null")),
    ///     ListFilter::WithoutParent
    /// );
    /// assert_eq!(ListFilter::parse::<Sample>(Some("salesorder-is-null")), ListFilter::All);
    /// ```
    pub fn parse<E: Entity>(raw: Option<&str>) -> Self {
        let (Some(raw), Some(relation)) = (raw, E::PARENT_RELATION) else {
            return Self::All;
        };

        match raw.strip_suffix(Self::IS_NULL_SUFFIX) {
            Some(name) if name.eq_ignore_ascii_case(relation) => Self::WithoutParent,
            _ => Self::All,
        }
    }

    /// Whether a record with the given parent reference passes this filter.
    pub fn accepts<E: Entity>(&self, record: &E) -> bool {
        match self {
            Self::All => true,
            Self::WithoutParent => record.parent_id().is_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentMethod, Sample};

    #[test]
    fn test_parse_without_parameter() {
        assert_eq!(ListFilter::parse::<PaymentMethod>(None), ListFilter::All);
    }

    #[test]
    fn test_parse_parent_relation() {
        assert_eq!(
            ListFilter::parse::<PaymentMethod>(Some("salesorder-is-null")),
            ListFilter::WithoutParent
        );
        assert_eq!(
            ListFilter::parse::<PaymentMethod>(Some("SalesOrder-is-null")),
            ListFilter::WithoutParent
        );
    }

    #[test]
    fn test_parse_unknown_filter_is_ignored() {
        assert_eq!(
            ListFilter::parse::<PaymentMethod>(Some("customer-is-null")),
            ListFilter::All
        );
        assert_eq!(
            ListFilter::parse::<PaymentMethod>(Some("salesorder")),
            ListFilter::All
        );
    }

    #[test]
    fn test_parse_entity_without_relation() {
        assert_eq!(
            ListFilter::parse::<Sample>(Some("salesorder-is-null")),
            ListFilter::All
        );
    }

    #[test]
    fn test_accepts() {
        let orphan = PaymentMethod::new("Card", None);
        let owned = PaymentMethod::new("Cash", Some(3));

        assert!(ListFilter::All.accepts(&owned));
        assert!(ListFilter::WithoutParent.accepts(&orphan));
        assert!(!ListFilter::WithoutParent.accepts(&owned));
    }
}
