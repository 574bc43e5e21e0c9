//! Shareable intake drafts
//!
//! A draft is a pending intake sent to a client as a link. The client fills
//! it in (`completed`), and the assistant later imports completed drafts as
//! clients. Each draft is imported at most once.

use chrono::{DateTime, Utc};
use jurat_core::{IntakeSource, RawClientRecord};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::capture::{client_id_at, draft_id_at};
use crate::error::{IntakeError, Result};
use crate::import::record_from_object;
use crate::store::ClientStore;

/// Draft lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DraftStatus {
    /// Link sent, waiting on the client
    #[default]
    Sent,
    /// Client submitted their answers
    Completed,
}

/// A pending or completed client intake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub id: String,
    pub form_id: String,
    #[serde(default)]
    pub status: DraftStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_answers"
    )]
    pub data: Option<RawClientRecord>,
}

/// Answers read back leniently, the same way bulk imports are
fn deserialize_answers<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<RawClientRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Map<String, Value>>::deserialize(deserializer)? {
        Some(object) => record_from_object(object)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

impl Draft {
    pub fn new(form_id: &str) -> Self {
        Self::new_at(form_id, Utc::now())
    }

    pub fn new_at(form_id: &str, now: DateTime<Utc>) -> Self {
        Self::with_id(draft_id_at(now), form_id, now)
    }

    fn with_id(id: String, form_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id,
            form_id: form_id.to_string(),
            status: DraftStatus::Sent,
            created_at: now,
            completed_at: None,
            imported_at: None,
            data: None,
        }
    }

    /// Record the client's answers
    pub fn complete(&mut self, data: RawClientRecord) {
        self.complete_at(data, Utc::now());
    }

    pub fn complete_at(&mut self, data: RawClientRecord, now: DateTime<Utc>) {
        self.status = DraftStatus::Completed;
        self.data = Some(data);
        self.completed_at = Some(now);
    }

    /// Completed and not yet imported
    pub fn is_importable(&self) -> bool {
        self.status == DraftStatus::Completed && self.imported_at.is_none()
    }

    /// Client-facing link relative to `base`
    pub fn intake_link(&self, base: &str) -> String {
        format!(
            "{}/client.html?draft={}&form={}",
            base.trim_end_matches('/'),
            self.id,
            self.form_id
        )
    }
}

/// Create a draft and store it first in the list
pub fn send_draft(store: &mut dyn ClientStore, form_id: &str) -> Result<Draft> {
    let draft = Draft::new(form_id);
    let mut drafts = store.load_drafts()?;
    drafts.insert(0, draft.clone());
    store.save_drafts(&drafts)?;
    log::debug!("Sent draft {} for {}", draft.id, form_id);
    Ok(draft)
}

/// Find a draft by id, creating a sent one when a link outlived its draft
pub fn open_draft(store: &mut dyn ClientStore, id: &str, form_id: &str) -> Result<Draft> {
    let mut drafts = store.load_drafts()?;
    if let Some(draft) = drafts.iter().find(|d| d.id == id) {
        return Ok(draft.clone());
    }

    let draft = Draft::with_id(id.to_string(), form_id, Utc::now());
    drafts.insert(0, draft.clone());
    store.save_drafts(&drafts)?;
    Ok(draft)
}

/// Store the client's answers on a draft
pub fn submit_draft(store: &mut dyn ClientStore, id: &str, data: RawClientRecord) -> Result<Draft> {
    let mut drafts = store.load_drafts()?;
    let draft = drafts
        .iter_mut()
        .find(|d| d.id == id)
        .ok_or_else(|| IntakeError::DraftNotFound(id.to_string()))?;
    draft.complete(data);
    let draft = draft.clone();
    store.save_drafts(&drafts)?;
    Ok(draft)
}

/// Convert every importable draft into a client
///
/// Returns the new clients in the order they were added. Each one lands at
/// the front of the client list, so the last imported ends up first.
pub fn import_completed_drafts(store: &mut dyn ClientStore) -> Result<Vec<RawClientRecord>> {
    import_completed_drafts_at(store, Utc::now())
}

pub fn import_completed_drafts_at(
    store: &mut dyn ClientStore,
    now: DateTime<Utc>,
) -> Result<Vec<RawClientRecord>> {
    let mut drafts = store.load_drafts()?;
    let mut clients = store.load_clients()?;
    let mut imported = Vec::new();

    for draft in drafts.iter_mut().filter(|d| d.is_importable()) {
        let mut client = draft.data.clone().unwrap_or_default();
        client.id = Some(format!("{}-{}", client_id_at(now), draft.id));
        client.form_id = Some(draft.form_id.clone());
        client.source = Some(IntakeSource::Client);

        clients.insert(0, client.clone());
        draft.imported_at = Some(now);
        imported.push(client);
    }

    if imported.is_empty() {
        log::debug!("No completed drafts to import");
        return Ok(imported);
    }

    store.save_clients(&clients)?;
    store.save_drafts(&drafts)?;
    log::debug!("Imported {} drafts", imported.len());
    Ok(imported)
}
