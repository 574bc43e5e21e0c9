//! Bulk JSON import
//!
//! Accepts either one client object or an array of them. Scalar values are
//! taken as text (`"tripsCount": 2` reads as `"2"`), nulls as absent, and
//! unknown keys are ignored.

use chrono::Utc;
use jurat_core::{NormalizedClientRecord, RawClientRecord};
use serde_json::{Map, Value};

use crate::capture::capture_at;
use crate::error::{IntakeError, Result};
use crate::store::ClientStore;

/// Parse a bulk import payload into raw records
pub fn parse_client_batch(json: &str) -> Result<Vec<RawClientRecord>> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| IntakeError::InvalidImportPayload(format!("not valid JSON: {}", e)))?;

    match value {
        Value::Object(object) => Ok(vec![record_from_object(object)?]),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(object) => record_from_object(object),
                other => Err(IntakeError::InvalidImportPayload(format!(
                    "item {} is {}, expected an object",
                    index,
                    kind(&other)
                ))),
            })
            .collect(),
        other => Err(IntakeError::InvalidImportPayload(format!(
            "payload is {}, expected an object or an array of objects",
            kind(&other)
        ))),
    }
}

/// Capture a batch of records into the store
///
/// Records keep their own `source` and otherwise count as assistant entries.
/// The whole batch shares one capture instant, so ids that would collide
/// get a `-2`, `-3`, ... suffix. Returns the stored clients in batch order.
pub fn import_clients(
    store: &mut dyn ClientStore,
    records: Vec<RawClientRecord>,
) -> Result<Vec<RawClientRecord>> {
    let mut clients = store.load_clients()?;
    let now = Utc::now();
    let mut imported: Vec<RawClientRecord> = Vec::with_capacity(records.len());

    for record in records {
        let source = record.source.clone().unwrap_or_default();
        let mut client = capture_at(record, source, now);
        let base = client.id.clone().unwrap_or_default();
        let mut suffix = 1;
        while clients
            .iter()
            .chain(imported.iter())
            .any(|existing| existing.id == client.id)
        {
            suffix += 1;
            client.id = Some(format!("{}-{}", base, suffix));
        }
        imported.push(client);
    }

    for client in &imported {
        clients.insert(0, client.clone());
    }
    store.save_clients(&clients)?;
    log::debug!("Imported {} clients", imported.len());
    Ok(imported)
}

/// Convert one JSON object into a raw record
pub(crate) fn record_from_object(object: Map<String, Value>) -> Result<RawClientRecord> {
    let mut cleaned = Map::with_capacity(object.len());
    for (key, value) in object {
        match value {
            Value::Null => {}
            Value::String(_) => {
                cleaned.insert(key, value);
            }
            Value::Number(n) => {
                cleaned.insert(key, Value::String(n.to_string()));
            }
            Value::Bool(b) => {
                cleaned.insert(key, Value::String(b.to_string()));
            }
            Value::Array(_) | Value::Object(_) => {
                // Nested values are tolerated only under keys the record does not model.
                if NormalizedClientRecord::KEYS.contains(&key.as_str()) {
                    return Err(IntakeError::InvalidImportPayload(format!(
                        "field {} must be a string",
                        key
                    )));
                }
            }
        }
    }

    serde_json::from_value(Value::Object(cleaned))
        .map_err(|e| IntakeError::InvalidImportPayload(e.to_string()))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use jurat_core::IntakeSource;

    #[test]
    fn test_single_object() {
        let records = parse_client_batch(r#"{"fullName": "Ana Maria Gutierrez"}"#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].full_name.as_deref(), Some("Ana Maria Gutierrez"));
    }

    #[test]
    fn test_array_of_objects() {
        let records = parse_client_batch(
            r#"[{"firstName": "Diego", "source": "client"}, {"address": "9 Elm St, Boston, MA 02118"}]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source, Some(IntakeSource::Client));
        assert_eq!(records[1].address.as_deref(), Some("9 Elm St, Boston, MA 02118"));
    }

    #[test]
    fn test_scalars_become_text() {
        let records =
            parse_client_batch(r#"{"tripsCount": 2, "tripsDays": 18.5, "notes": null, "ssn": true}"#)
                .unwrap();
        assert_eq!(records[0].trips_count.as_deref(), Some("2"));
        assert_eq!(records[0].trips_days.as_deref(), Some("18.5"));
        assert_eq!(records[0].notes, None);
        assert_eq!(records[0].ssn.as_deref(), Some("true"));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let records =
            parse_client_batch(r#"{"firstName": "Ana", "favoriteColor": "blue", "tags": ["x"]}"#)
                .unwrap();
        assert_eq!(records[0].first_name.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_rejects_non_object_payloads() {
        for payload in ["42", "\"client\"", "null", "true", "[1, 2]", "[{}, \"x\"]"] {
            assert!(
                matches!(
                    parse_client_batch(payload),
                    Err(IntakeError::InvalidImportPayload(_))
                ),
                "{} was accepted",
                payload
            );
        }
    }

    #[test]
    fn test_rejects_invalid_json() {
        assert!(matches!(
            parse_client_batch("{not json"),
            Err(IntakeError::InvalidImportPayload(_))
        ));
    }

    #[test]
    fn test_rejects_structured_value_in_known_field() {
        assert!(matches!(
            parse_client_batch(r#"{"address": {"city": "Chicago"}}"#),
            Err(IntakeError::InvalidImportPayload(_))
        ));
    }

    #[test]
    fn test_unknown_source_is_kept() {
        let records = parse_client_batch(r#"{"source": "fax"}"#).unwrap();
        assert_eq!(records[0].source, Some(IntakeSource::Other("fax".to_string())));
    }

    #[test]
    fn test_import_clients_gets_distinct_ids() {
        let mut store = MemoryStore::new();
        let batch = parse_client_batch(
            r#"[{"firstName": "Ana"}, {"firstName": "Diego", "source": "client"}, {"firstName": "Luz"}]"#,
        )
        .unwrap();
        let imported = import_clients(&mut store, batch).unwrap();

        let ids: Vec<_> = imported.iter().map(|c| c.id.clone().unwrap()).collect();
        assert_eq!(ids[1], format!("{}-2", ids[0]));
        assert_eq!(ids[2], format!("{}-3", ids[0]));
        assert_eq!(imported[0].source, Some(IntakeSource::Assistant));
        assert_eq!(imported[1].source, Some(IntakeSource::Client));

        let stored = store.load_clients().unwrap();
        assert_eq!(stored[0].first_name.as_deref(), Some("Luz"));
        assert_eq!(stored.len(), 3);
    }

    #[test]
    fn test_empty_array() {
        assert!(parse_client_batch("[]").unwrap().is_empty());
    }
}
