// --------------------------------------------------
// Handles /api/projects.
//
// Projects live in one document split into two buckets,
// "developer" and "designer", selected by the `mode` field.
// --------------------------------------------------

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::models::{Bucket, Collection, RecordSet};
use crate::routes_support::{
    deleted_message, json_body, not_found, parse_bucket, required_query, required_record,
    required_text, store_failure,
};
use crate::AppState;

const PROJECTS: Collection = Collection::Projects;

#[derive(Debug, Deserialize)]
pub struct ProjectsQuery {
    pub mode: Option<String>,
    pub id: Option<String>,
}

// -----------------------------
// GET /api/projects?mode=developer|designer
// One bucket; the whole document when `mode` is absent or unrecognized
// -----------------------------
pub async fn get_projects(
    State(state): State<AppState>,
    Query(q): Query<ProjectsQuery>,
) -> Result<Json<Value>, ApiError> {
    let doc = match required_query(q.mode.as_deref()).and_then(Bucket::parse) {
        Some(bucket) => state.repo.list(RecordSet::Projects(bucket)),
        None => state.repo.document(PROJECTS),
    }
    .map_err(store_failure("fetch", PROJECTS))?;

    Ok(Json(doc))
}

// -----------------------------
// POST /api/projects
// Body: {mode, project}
// -----------------------------
pub async fn create_project(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = json_body(body)?;

    let (Some(mode), Some(project)) = (
        required_text(body.get("mode")),
        body.get("project").filter(|p| !p.is_null()),
    ) else {
        return Err(ApiError::bad_request("Mode and project data are required"));
    };
    let bucket = parse_bucket(&mode)?;
    let Some(project) = required_record(Some(project)) else {
        return Err(ApiError::bad_request("Project data must be a JSON object"));
    };

    let created = state
        .repo
        .create(RecordSet::Projects(bucket), project)
        .await
        .map_err(store_failure("create", PROJECTS))?;

    Ok((StatusCode::CREATED, Json(created)))
}

// -----------------------------
// PUT /api/projects
// Body: {mode, id, project}; shallow-merges project into the stored one
// -----------------------------
pub async fn update_project(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = json_body(body)?;

    let (Some(mode), Some(id), Some(project)) = (
        required_text(body.get("mode")),
        required_text(body.get("id")),
        body.get("project").filter(|p| !p.is_null()),
    ) else {
        return Err(ApiError::bad_request("Mode, ID, and project data are required"));
    };
    let bucket = parse_bucket(&mode)?;
    let Some(patch) = required_record(Some(project)) else {
        return Err(ApiError::bad_request("Project data must be a JSON object"));
    };

    let updated = state
        .repo
        .update(RecordSet::Projects(bucket), &id, &patch)
        .await
        .map_err(store_failure("update", PROJECTS))?
        .ok_or_else(|| not_found(PROJECTS))?;

    Ok(Json(updated))
}

// -----------------------------
// DELETE /api/projects?mode=&id=
// -----------------------------
pub async fn delete_project(
    State(state): State<AppState>,
    Query(q): Query<ProjectsQuery>,
) -> Result<Json<Value>, ApiError> {
    let (Some(mode), Some(id)) = (
        required_query(q.mode.as_deref()),
        required_query(q.id.as_deref()),
    ) else {
        return Err(ApiError::bad_request("Mode and ID are required"));
    };
    let bucket = parse_bucket(mode)?;

    state
        .repo
        .delete(RecordSet::Projects(bucket), id)
        .await
        .map_err(store_failure("delete", PROJECTS))?
        .ok_or_else(|| not_found(PROJECTS))?;

    Ok(Json(deleted_message(PROJECTS)))
}
