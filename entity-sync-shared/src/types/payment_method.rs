//! The `PaymentMethod` entity.

use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId};

/// A payment method, optionally attached to the sales order that uses it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub name: Option<String>,
    /// Owning sales order. `None` for payment methods not yet attached.
    #[serde(default)]
    pub sales_order_id: Option<EntityId>,
}

impl PaymentMethod {
    /// Create an unsaved payment method.
    pub fn new(name: impl Into<String>, sales_order_id: Option<EntityId>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            sales_order_id,
        }
    }
}

impl Entity for PaymentMethod {
    const ENTITY_NAME: &'static str = "paymentMethod";
    const COLLECTION: &'static str = "payment-methods";
    const PARENT_RELATION: Option<&'static str> = Some("salesorder");

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn parent_id(&self) -> Option<EntityId> {
        self.sales_order_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_id_is_sales_order() {
        let method = PaymentMethod::new("Card", Some(12));
        assert_eq!(method.parent_id(), Some(12));
        assert!(method.id().is_none());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(PaymentMethod::new("Card", Some(12))).unwrap();
        assert_eq!(json["salesOrderId"], 12);
        assert_eq!(json["name"], "Card");
    }
}
