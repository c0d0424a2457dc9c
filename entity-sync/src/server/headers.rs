//! Alert headers attached to entity responses.
//!
//! Header names are sent lowercase; HTTP header names are case-insensitive.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use entity_sync_shared::EntityId;

/// Application name used as the alert key prefix.
pub const APPLICATION_NAME: &str = "entitySyncApp";

/// `X-entitySyncApp-alert`: `<app>.<entity>.<action>` on success.
pub const ALERT_HEADER: &str = "x-entitysyncapp-alert";

/// `X-entitySyncApp-error`: `error.<key>` on failure.
pub const ERROR_HEADER: &str = "x-entitysyncapp-error";

/// `X-entitySyncApp-params`: the record id on success, the entity name on failure.
pub const PARAMS_HEADER: &str = "x-entitysyncapp-params";

/// The mutation an alert reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertAction {
    Created,
    Updated,
    Deleted,
}

impl AlertAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

fn insert(headers: &mut HeaderMap, name: &'static str, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(HeaderName::from_static(name), value);
    }
}

/// Headers announcing a successful mutation of `entity` record `id`.
pub fn entity_alert(entity: &str, action: AlertAction, id: EntityId) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(
        &mut headers,
        ALERT_HEADER,
        &format!("{}.{}.{}", APPLICATION_NAME, entity, action.as_str()),
    );
    insert(&mut headers, PARAMS_HEADER, &id.to_string());
    headers
}

/// Headers announcing a failed request on `entity`.
pub fn failure_alert(entity: &str, error_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(&mut headers, ERROR_HEADER, &format!("error.{}", error_key));
    insert(&mut headers, PARAMS_HEADER, entity);
    headers
}
