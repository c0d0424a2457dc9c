//! HTTP request handlers, generic over the entity type.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use entity_sync_shared::{Entity, EntityId, ListFilter};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::server::error::ApiError;
use crate::server::headers::{entity_alert, AlertAction};
use crate::sync::EntitySyncService;

type Service<E> = State<Arc<EntitySyncService<E>>>;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub filter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "UP" })))
}

/// `201 Created` with a `Location` header and the creation alert.
fn created<E: Entity>(record: &E) -> Response {
    let id = record.id().unwrap_or_default();
    let mut headers = entity_alert(E::ENTITY_NAME, AlertAction::Created, id);
    if let Ok(location) = HeaderValue::from_str(&format!("/api/{}/{}", E::COLLECTION, id)) {
        headers.insert(header::LOCATION, location);
    }
    (StatusCode::CREATED, headers, Json(record)).into_response()
}

/// `POST /api/{collection}`
pub async fn create_entity<E: Entity>(
    State(service): Service<E>,
    Json(record): Json<E>,
) -> Result<Response, ApiError> {
    let created_record = service
        .create(record)
        .await
        .map_err(ApiError::for_entity::<E>)?;
    Ok(created(&created_record))
}

/// `PUT /api/{collection}`. A body without an id is created.
pub async fn update_entity<E: Entity>(
    State(service): Service<E>,
    Json(record): Json<E>,
) -> Result<Response, ApiError> {
    let is_new = record.id().is_none();
    let saved = service
        .update(record)
        .await
        .map_err(ApiError::for_entity::<E>)?;

    if is_new {
        return Ok(created(&saved));
    }

    let headers = entity_alert(
        E::ENTITY_NAME,
        AlertAction::Updated,
        saved.id().unwrap_or_default(),
    );
    Ok((StatusCode::OK, headers, Json(saved)).into_response())
}

/// `GET /api/{collection}?filter=`
pub async fn list_entities<E: Entity>(
    State(service): Service<E>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<E>>, ApiError> {
    let filter = ListFilter::parse::<E>(params.filter.as_deref());
    service
        .list(filter)
        .await
        .map(Json)
        .map_err(ApiError::for_entity::<E>)
}

/// `GET /api/{collection}/{id}`
pub async fn get_entity<E: Entity>(
    State(service): Service<E>,
    Path(id): Path<EntityId>,
) -> Result<Json<E>, ApiError> {
    service
        .get(id)
        .await
        .map(Json)
        .map_err(ApiError::for_entity::<E>)
}

/// `DELETE /api/{collection}/{id}`
pub async fn delete_entity<E: Entity>(
    State(service): Service<E>,
    Path(id): Path<EntityId>,
) -> Result<Response, ApiError> {
    service
        .delete(id)
        .await
        .map_err(ApiError::for_entity::<E>)?;
    let headers = entity_alert(E::ENTITY_NAME, AlertAction::Deleted, id);
    Ok((StatusCode::OK, headers).into_response())
}

/// `GET /api/_search/{collection}?query=`
pub async fn search_entities<E: Entity>(
    State(service): Service<E>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<E>>, ApiError> {
    service
        .search(&params.query)
        .await
        .map(Json)
        .map_err(ApiError::for_entity::<E>)
}
