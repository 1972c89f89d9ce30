// Request-shape helpers shared by the resource handlers.

use axum::{extract::rejection::JsonRejection, Json};
use serde_json::{json, Value};

use crate::error::{ApiError, StoreError};
use crate::models::{Bucket, Collection, Record};

/// Unwrap a JSON body, turning axum's rejection into a 400 with an error body.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(v)) => Ok(v),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected request body");
            Err(ApiError::bad_request("Request body must be valid JSON"))
        }
    }
}

/// A required identifier-like field.
///
/// Absent, null and blank strings count as missing. Numbers are accepted
/// and used in their decimal form.
pub fn required_text(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn required_query(v: Option<&str>) -> Option<&str> {
    v.filter(|s| !s.trim().is_empty())
}

/// A required record payload; must be a JSON object.
pub fn required_record(v: Option<&Value>) -> Option<Record> {
    v?.as_object().cloned()
}

pub fn parse_bucket(mode: &str) -> Result<Bucket, ApiError> {
    Bucket::parse(mode).ok_or_else(|| ApiError::bad_request("Mode must be developer or designer"))
}

pub fn not_found(collection: Collection) -> ApiError {
    ApiError::not_found(format!("{} not found", collection.noun()))
}

// verb is one of fetch / create / update / delete
pub fn store_failure(verb: &str, collection: Collection) -> impl FnOnce(StoreError) -> ApiError {
    let message = match verb {
        "fetch" => format!("Failed to fetch {}", collection.name()),
        _ => format!("Failed to {verb} {}", collection.noun().to_lowercase()),
    };
    move |source| ApiError::internal(message, source)
}

pub fn deleted_message(collection: Collection) -> Value {
    json!({ "message": format!("{} deleted successfully", collection.noun()) })
}
