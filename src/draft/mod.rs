//! Draft State Store
//!
//! Owns the in-progress booking and mirrors every field into its own
//! `booking_*` storage key as soon as it changes, so a reload resumes
//! exactly where the client left off. The attachment is the one field
//! that is never persisted.

mod storage;

pub use storage::{DraftStorage, FileStorage, MemoryStorage};

use crate::api::types::{Attachment, ContactMethod};
use crate::catalog;
use crate::error::{Result, StorageError};
use crate::utils::{date_key, parse_date_key};
use chrono::NaiveDate;

pub const KEY_CORE_SERVICES: &str = "booking_coreServices";
pub const KEY_ADD_ONS: &str = "booking_addOns";
pub const KEY_ART_LEVEL: &str = "booking_nailArtLevel";
pub const KEY_REMOVALS: &str = "booking_removals";
pub const KEY_DATE: &str = "booking_date";
pub const KEY_TIME: &str = "booking_time";
pub const KEY_NAME: &str = "booking_name";
pub const KEY_CONTACT_METHOD: &str = "booking_contactMethod";
pub const KEY_EMAIL: &str = "booking_email";
pub const KEY_PHONE: &str = "booking_phone";

/// Every persisted key
pub const ALL_KEYS: &[&str] = &[
    KEY_CORE_SERVICES,
    KEY_ADD_ONS,
    KEY_ART_LEVEL,
    KEY_REMOVALS,
    KEY_DATE,
    KEY_TIME,
    KEY_NAME,
    KEY_CONTACT_METHOD,
    KEY_EMAIL,
    KEY_PHONE,
];

/// The full in-progress selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftBooking {
    pub core_service_ids: Vec<String>,
    pub add_on_ids: Vec<String>,
    pub removal_ids: Vec<String>,
    pub art_level_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub client_name: String,
    pub contact_method: ContactMethod,
    pub client_email: String,
    pub client_phone: String,
    pub attachment: Option<Attachment>,
}

impl DraftBooking {
    /// Derived total; never stored
    pub fn total_price(&self) -> u32 {
        catalog::compute_total(
            &self.core_service_ids,
            &self.add_on_ids,
            &self.removal_ids,
            self.art_level_id.as_deref(),
        )
    }

    pub fn selected_items(&self) -> Vec<catalog::LineItem> {
        catalog::list_selected_items(
            &self.core_service_ids,
            &self.add_on_ids,
            &self.removal_ids,
            self.art_level_id.as_deref(),
        )
    }

    /// Value of the contact field selected by `contact_method`
    pub fn active_contact(&self) -> &str {
        match self.contact_method {
            ContactMethod::Email => &self.client_email,
            ContactMethod::Phone => &self.client_phone,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Which id list a multi-select mutation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdList {
    CoreServices,
    AddOns,
    Removals,
}

impl IdList {
    fn key(&self) -> &'static str {
        match self {
            Self::CoreServices => KEY_CORE_SERVICES,
            Self::AddOns => KEY_ADD_ONS,
            Self::Removals => KEY_REMOVALS,
        }
    }
}

/// Draft booking plus its durable mirror
pub struct DraftStore<S: DraftStorage> {
    storage: S,
    draft: DraftBooking,
}

impl<S: DraftStorage> DraftStore<S> {
    /// Rehydrate each field independently from `storage`. Absent or
    /// malformed entries fall back to the field default.
    pub fn open(storage: S) -> Self {
        let draft = DraftBooking {
            core_service_ids: read_id_list(&storage, KEY_CORE_SERVICES),
            add_on_ids: read_id_list(&storage, KEY_ADD_ONS),
            removal_ids: read_id_list(&storage, KEY_REMOVALS),
            art_level_id: storage
                .get(KEY_ART_LEVEL)
                .filter(|id| catalog::find_art_level(id).is_some()),
            date: storage.get(KEY_DATE).and_then(|v| {
                let parsed = parse_date_key(&v);
                if parsed.is_none() {
                    tracing::warn!("Ignoring malformed {} entry: {:?}", KEY_DATE, v);
                }
                parsed
            }),
            time: storage.get(KEY_TIME).filter(|t| !t.is_empty()),
            client_name: storage.get(KEY_NAME).unwrap_or_default(),
            contact_method: storage
                .get(KEY_CONTACT_METHOD)
                .and_then(|v| ContactMethod::parse(&v))
                .unwrap_or_default(),
            client_email: storage.get(KEY_EMAIL).unwrap_or_default(),
            client_phone: storage.get(KEY_PHONE).unwrap_or_default(),
            attachment: None,
        };

        if !draft.is_empty() {
            tracing::debug!("Resumed draft booking from storage");
        }

        Self { storage, draft }
    }

    pub fn draft(&self) -> &DraftBooking {
        &self.draft
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn ids(&self, list: IdList) -> &[String] {
        match list {
            IdList::CoreServices => &self.draft.core_service_ids,
            IdList::AddOns => &self.draft.add_on_ids,
            IdList::Removals => &self.draft.removal_ids,
        }
    }

    fn ids_mut(&mut self, list: IdList) -> &mut Vec<String> {
        match list {
            IdList::CoreServices => &mut self.draft.core_service_ids,
            IdList::AddOns => &mut self.draft.add_on_ids,
            IdList::Removals => &mut self.draft.removal_ids,
        }
    }

    /// Append `id` unless already present. Returns whether it was added.
    pub fn add_id(&mut self, list: IdList, id: &str) -> Result<bool> {
        if id.is_empty() || self.ids(list).iter().any(|existing| existing == id) {
            return Ok(false);
        }
        let mut ids = self.ids(list).to_vec();
        ids.push(id.to_string());
        self.replace_ids(list, ids)?;
        Ok(true)
    }

    /// Remove `id` if present. Returns whether it was removed.
    pub fn remove_id(&mut self, list: IdList, id: &str) -> Result<bool> {
        if !self.ids(list).iter().any(|existing| existing == id) {
            return Ok(false);
        }
        let ids = self
            .ids(list)
            .iter()
            .filter(|existing| *existing != id)
            .cloned()
            .collect();
        self.replace_ids(list, ids)?;
        Ok(true)
    }

    /// Replace a whole list, dropping duplicates but keeping first-seen order
    pub fn set_ids(&mut self, list: IdList, ids: Vec<String>) -> Result<()> {
        self.replace_ids(list, dedup_ids(ids))
    }

    pub fn set_art_level(&mut self, id: Option<String>) -> Result<()> {
        write_optional(&mut self.storage, KEY_ART_LEVEL, id.as_deref())?;
        self.draft.art_level_id = id;
        Ok(())
    }

    pub fn set_date(&mut self, date: Option<NaiveDate>) -> Result<()> {
        let key = date.map(date_key);
        write_optional(&mut self.storage, KEY_DATE, key.as_deref())?;
        self.draft.date = date;
        Ok(())
    }

    pub fn set_time(&mut self, time: Option<String>) -> Result<()> {
        let time = time.filter(|t| !t.is_empty());
        write_optional(&mut self.storage, KEY_TIME, time.as_deref())?;
        self.draft.time = time;
        Ok(())
    }

    pub fn set_client_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.storage.set(KEY_NAME, &name)?;
        self.draft.client_name = name;
        Ok(())
    }

    pub fn set_contact_method(&mut self, method: ContactMethod) -> Result<()> {
        self.storage.set(KEY_CONTACT_METHOD, method.as_str())?;
        self.draft.contact_method = method;
        Ok(())
    }

    pub fn set_client_email(&mut self, email: impl Into<String>) -> Result<()> {
        let email = email.into();
        self.storage.set(KEY_EMAIL, &email)?;
        self.draft.client_email = email;
        Ok(())
    }

    pub fn set_client_phone(&mut self, phone: impl Into<String>) -> Result<()> {
        let phone = phone.into();
        self.storage.set(KEY_PHONE, &phone)?;
        self.draft.client_phone = phone;
        Ok(())
    }

    /// Held in memory only
    pub fn set_attachment(&mut self, attachment: Option<Attachment>) {
        self.draft.attachment = attachment;
    }

    /// Wipe the draft and every persisted key in one storage write. If the
    /// write fails the draft is left as it was.
    pub fn clear(&mut self) -> Result<()> {
        self.storage.remove_all(ALL_KEYS)?;
        self.forget();
        tracing::debug!("Cleared draft booking");
        Ok(())
    }

    /// Reset the in-memory draft without touching storage
    pub fn forget(&mut self) {
        self.draft = DraftBooking::default();
    }

    /// Persist `ids`, then adopt them. A failed write changes nothing.
    fn replace_ids(&mut self, list: IdList, ids: Vec<String>) -> Result<()> {
        let key = list.key();
        let json = serde_json::to_string(&ids).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.storage.set(key, &json)?;
        *self.ids_mut(list) = ids;
        tracing::debug!("Persisted {} = {}", key, json);
        Ok(())
    }
}

fn dedup_ids(ids: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !id.is_empty() && !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}

fn read_id_list<S: DraftStorage>(storage: &S, key: &str) -> Vec<String> {
    let Some(raw) = storage.get(key) else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<String>>(&raw) {
        Ok(ids) => dedup_ids(ids),
        Err(e) => {
            tracing::warn!("Ignoring malformed {} entry: {}", key, e);
            Vec::new()
        }
    }
}

fn write_optional<S: DraftStorage>(storage: &mut S, key: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(value) => storage.set(key, value)?,
        None => storage.remove(key)?,
    }
    Ok(())
}
