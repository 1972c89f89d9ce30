/*
Record manipulation shared by every collection.
Kept independent from HTTP / Axum so it can be tested on plain JSON values.
*/

use serde_json::Value;

use crate::models::{Record, RecordSet};

// Borrow the record list a set refers to inside its collection document.
//
// Returns None when the document does not have the expected shape; the
// store validates shape on read, so callers treat None as corruption.
pub fn records_mut(doc: &mut Value, set: RecordSet) -> Option<&mut Vec<Value>> {
    match set {
        RecordSet::Flat(_) => doc.as_array_mut(),
        RecordSet::Projects(bucket) => doc.get_mut(bucket.key())?.as_array_mut(),
    }
}

pub fn records(doc: &Value, set: RecordSet) -> Option<&Vec<Value>> {
    match set {
        RecordSet::Flat(_) => doc.as_array(),
        RecordSet::Projects(bucket) => doc.get(bucket.key())?.as_array(),
    }
}

fn record_id(record: &Value) -> Option<&str> {
    record.get("id")?.as_str()
}

// Number after the prefix, e.g. "d12" with prefix "d" -> 12
fn numeric_suffix(id: &str, prefix: &str) -> Option<u64> {
    id.strip_prefix(prefix)?.parse().ok()
}

/// Pick the next id number for a record list.
///
/// The result is one past the largest of: the list length, the highest
/// numeric id currently present, and the persisted high-water mark. For an
/// untouched list with ids 1..=N this is N + 1; ids freed by deletions are
/// never handed out again as long as the high-water mark is kept.
///
/// Returns None when the id space is exhausted (a stored id or mark at
/// `u64::MAX`).
pub fn next_id_number(records: &[Value], prefix: &str, high_water: u64) -> Option<u64> {
    let highest_present = records
        .iter()
        .filter_map(record_id)
        .filter_map(|id| numeric_suffix(id, prefix))
        .max()
        .unwrap_or(0);

    let len = records.len() as u64;
    len.max(highest_present).max(high_water).checked_add(1)
}

/// Overwrite `target` with every key of `patch`. Keys missing from the patch
/// are kept. `id` is server-owned and never taken from the patch.
pub fn shallow_merge(target: &mut Record, patch: &Record) {
    for (key, value) in patch {
        if key == "id" {
            continue;
        }
        target.insert(key.clone(), value.clone());
    }
}

/// Append `payload` under a freshly assigned id.
///
/// Returns the stored record and the id number that was used, so the caller
/// can advance the persisted sequence. None when no id is left.
pub fn create(
    records: &mut Vec<Value>,
    mut payload: Record,
    prefix: &str,
    high_water: u64,
) -> Option<(Value, u64)> {
    let n = next_id_number(records, prefix, high_water)?;
    payload.insert("id".to_string(), Value::String(format!("{prefix}{n}")));

    let created = Value::Object(payload);
    records.push(created.clone());
    Some((created, n))
}

/// Shallow-merge `patch` into the record with `id`.
///
/// Returns the merged record, or None when no record matches.
pub fn update(records: &mut [Value], id: &str, patch: &Record) -> Option<Value> {
    let record = records
        .iter_mut()
        .find(|r| record_id(r) == Some(id))?
        .as_object_mut()?;

    shallow_merge(record, patch);
    Some(Value::Object(record.clone()))
}

/// Remove the first record with `id`, returning it.
pub fn delete(records: &mut Vec<Value>, id: &str) -> Option<Value> {
    let index = records.iter().position(|r| record_id(r) == Some(id))?;
    Some(records.remove(index))
}
