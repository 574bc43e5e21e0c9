//! Intake capture
//!
//! Stamps a freshly entered record with its identity and derives the
//! denormalized `fullName` and `address` lines from the structured parts.

use chrono::{DateTime, SecondsFormat, Utc};
use jurat_core::{
    format_free_text, join_name, AddressParts, IntakeSource, NameInput, NameParts,
    RawClientRecord, N400_FORM_ID,
};

use crate::error::Result;
use crate::store::{add_client, ClientStore};

/// Six-digit suffix taken from the millisecond clock
fn id_suffix(now: DateTime<Utc>) -> String {
    format!("{:06}", now.timestamp_millis().rem_euclid(1_000_000))
}

/// Client id (`CL-xxxxxx`) for a capture at `now`
pub fn client_id_at(now: DateTime<Utc>) -> String {
    format!("CL-{}", id_suffix(now))
}

/// Draft id (`DR-xxxxxx`) for a draft created at `now`
pub fn draft_id_at(now: DateTime<Utc>) -> String {
    format!("DR-{}", id_suffix(now))
}

/// Timestamp text stored in `createdAt` and friends
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Capture a record entered now
pub fn capture(record: RawClientRecord, source: IntakeSource) -> RawClientRecord {
    capture_at(record, source, Utc::now())
}

/// Capture a record at a fixed instant
pub fn capture_at(
    mut record: RawClientRecord,
    source: IntakeSource,
    now: DateTime<Utc>,
) -> RawClientRecord {
    record.id = Some(client_id_at(now));
    record.source = Some(source);
    record.created_at = Some(timestamp(now));
    if text(&record.form_id).is_empty() {
        record.form_id = Some(N400_FORM_ID.to_string());
    }

    if let NameInput::Structured {
        first,
        middle,
        last,
    } = record.name_input()
    {
        let full_name = join_name(&NameParts::new(first, middle, last));
        record.full_name = Some(full_name);
    }

    let parts = AddressParts {
        address_line1: text(&record.address_line1).to_string(),
        city: text(&record.city).to_string(),
        state: text(&record.state).to_string(),
        zip_code: text(&record.zip_code).to_string(),
        country: text(&record.country).to_string(),
    };
    if parts != AddressParts::default() {
        record.address = Some(format_free_text(&parts));
    }

    record
}

/// Capture a record and put it at the front of the store
pub fn save_client(
    store: &mut dyn ClientStore,
    record: RawClientRecord,
    source: IntakeSource,
) -> Result<RawClientRecord> {
    let client = capture(record, source);
    add_client(store, client.clone())?;
    log::debug!("Captured client {:?}", client.id);
    Ok(client)
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_760_000_123_456).unwrap()
    }

    #[test]
    fn test_ids_use_last_six_clock_digits() {
        assert_eq!(client_id_at(instant()), "CL-123456");
        assert_eq!(draft_id_at(instant()), "DR-123456");

        let early = Utc.timestamp_millis_opt(42).unwrap();
        assert_eq!(client_id_at(early), "CL-000042");
    }

    #[test]
    fn test_capture_stamps_identity() {
        let client = capture_at(RawClientRecord::default(), IntakeSource::Assistant, instant());
        assert_eq!(client.id.as_deref(), Some("CL-123456"));
        assert_eq!(client.source, Some(IntakeSource::Assistant));
        assert_eq!(client.form_id.as_deref(), Some("N-400"));
        assert_eq!(client.created_at.as_deref(), Some("2025-10-09T08:55:23.456Z"));
        assert_eq!(client.full_name, None);
        assert_eq!(client.address, None);
    }

    #[test]
    fn test_capture_keeps_requested_form() {
        let record = RawClientRecord {
            form_id: Some("I-130".to_string()),
            ..Default::default()
        };
        let client = capture_at(record, IntakeSource::Client, instant());
        assert_eq!(client.form_id.as_deref(), Some("I-130"));
    }

    #[test]
    fn test_capture_derives_name_and_address() {
        let record = RawClientRecord {
            first_name: Some("Valeria".to_string()),
            last_name: Some("Gomez".to_string()),
            address_line1: Some("4100 W Irving Park Rd".to_string()),
            city: Some("Chicago".to_string()),
            state: Some("IL".to_string()),
            zip_code: Some("60641".to_string()),
            ..Default::default()
        };
        let client = capture_at(record, IntakeSource::Assistant, instant());
        assert_eq!(client.full_name.as_deref(), Some("Valeria Gomez"));
        assert_eq!(
            client.address.as_deref(),
            Some("4100 W Irving Park Rd, Chicago, IL 60641")
        );
    }

    #[test]
    fn test_capture_keeps_free_text_only_values() {
        let record = RawClientRecord {
            full_name: Some("Ana Maria Gutierrez".to_string()),
            address: Some("215 Grand Ave, Los Angeles, CA 90012".to_string()),
            ..Default::default()
        };
        let client = capture_at(record, IntakeSource::Client, instant());
        assert_eq!(client.full_name.as_deref(), Some("Ana Maria Gutierrez"));
        assert_eq!(
            client.address.as_deref(),
            Some("215 Grand Ave, Los Angeles, CA 90012")
        );
    }
}
