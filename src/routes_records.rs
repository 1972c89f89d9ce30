// --------------------------------------------------
// Handles the flat collections: /api/achievements and /api/testimonials.
//
// Both share the same shape (a JSON array of records), so the handlers
// take the collection as a parameter and `routes()` binds it per path.
// --------------------------------------------------

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, MethodRouter},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::models::{Collection, RecordSet};
use crate::routes_support::{
    deleted_message, json_body, not_found, required_query, required_record, required_text,
    store_failure,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

/// GET/POST/PUT/DELETE for one flat collection.
pub fn routes(collection: Collection) -> MethodRouter<AppState> {
    get(move |state: State<AppState>| list_records(state, collection))
        .post(move |state: State<AppState>, body: Result<Json<Value>, JsonRejection>| {
            create_record(state, collection, body)
        })
        .put(move |state: State<AppState>, body: Result<Json<Value>, JsonRejection>| {
            update_record(state, collection, body)
        })
        .delete(move |state: State<AppState>, query: Query<IdQuery>| {
            delete_record(state, collection, query)
        })
}

// -----------------------------
// GET
// Returns the whole array
// -----------------------------
pub async fn list_records(
    State(state): State<AppState>,
    collection: Collection,
) -> Result<Json<Value>, ApiError> {
    let records = state
        .repo
        .list(RecordSet::Flat(collection))
        .map_err(store_failure("fetch", collection))?;
    Ok(Json(records))
}

// -----------------------------
// POST
// Body is the record itself
// -----------------------------
pub async fn create_record(
    State(state): State<AppState>,
    collection: Collection,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = json_body(body)?;
    let Some(record) = required_record(Some(&body)) else {
        return Err(ApiError::bad_request(format!(
            "{} data must be a JSON object",
            collection.noun()
        )));
    };

    let created = state
        .repo
        .create(RecordSet::Flat(collection), record)
        .await
        .map_err(store_failure("create", collection))?;

    Ok((StatusCode::CREATED, Json(created)))
}

// -----------------------------
// PUT
// Body: {id, <achievement|testimonial>}
// -----------------------------
pub async fn update_record(
    State(state): State<AppState>,
    collection: Collection,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = json_body(body)?;
    let key = collection.payload_key();

    let (Some(id), Some(payload)) = (
        required_text(body.get("id")),
        body.get(key).filter(|p| !p.is_null()),
    ) else {
        return Err(ApiError::bad_request(format!(
            "ID and {key} data are required"
        )));
    };
    let Some(patch) = required_record(Some(payload)) else {
        return Err(ApiError::bad_request(format!(
            "{} data must be a JSON object",
            collection.noun()
        )));
    };

    let updated = state
        .repo
        .update(RecordSet::Flat(collection), &id, &patch)
        .await
        .map_err(store_failure("update", collection))?
        .ok_or_else(|| not_found(collection))?;

    Ok(Json(updated))
}

// -----------------------------
// DELETE ?id=
// -----------------------------
pub async fn delete_record(
    State(state): State<AppState>,
    collection: Collection,
    Query(q): Query<IdQuery>,
) -> Result<Json<Value>, ApiError> {
    let Some(id) = required_query(q.id.as_deref()) else {
        return Err(ApiError::bad_request("ID is required"));
    };

    state
        .repo
        .delete(RecordSet::Flat(collection), id)
        .await
        .map_err(store_failure("delete", collection))?
        .ok_or_else(|| not_found(collection))?;

    Ok(Json(deleted_message(collection)))
}
