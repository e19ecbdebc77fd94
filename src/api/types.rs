//! Wire types for the booking API
//!
//! `GET /appointment/public` returns a [`BookingSnapshot`];
//! `POST /appointment/book` accepts a [`BookingPayload`], optionally
//! alongside an [`Attachment`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// First and last hourly slot offered on a full-day date
pub const FULL_DAY_FIRST_HOUR: u32 = 10;
pub const FULL_DAY_LAST_HOUR: u32 = 18;

/// Hourly slots synthesized for full-day dates, `10:00` to `18:00` inclusive.
/// Full-day dates carry no discrete slot data from the server.
pub fn full_day_slots() -> Vec<String> {
    (FULL_DAY_FIRST_HOUR..=FULL_DAY_LAST_HOUR)
        .map(|hour| format!("{:02}:00", hour))
        .collect()
}

/// How a date is booked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateType {
    FullDay,
    Timed,
}

/// One calendar day in the provider's schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableDate {
    /// Calendar-day key (`YYYY-MM-DD` on the wire)
    pub date: NaiveDate,
    #[serde(default)]
    pub display_date: String,
    #[serde(rename = "type")]
    pub kind: DateType,
    #[serde(default)]
    pub is_full: bool,
    #[serde(default)]
    pub slots_remaining: u32,
    #[serde(default)]
    pub can_book: bool,
    #[serde(default)]
    pub available_slots: Vec<String>,
}

impl AvailableDate {
    /// Times a client may pick on this date
    pub fn offerable_slots(&self) -> Vec<String> {
        match self.kind {
            DateType::FullDay => full_day_slots(),
            DateType::Timed => self.available_slots.clone(),
        }
    }

    pub fn offers(&self, time: &str) -> bool {
        match self.kind {
            DateType::FullDay => full_day_slots().iter().any(|slot| slot == time),
            DateType::Timed => self.available_slots.iter().any(|slot| slot == time),
        }
    }
}

/// Service entry as published by the server.
///
/// Only used for display; prices for the running total come from the
/// static catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteService {
    pub name: String,
    /// Per-level prices keyed `level1`..`level4`, when the service has levels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prices: Option<BTreeMap<String, u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u32>,
}

/// Snapshot returned by `GET /appointment/public`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSnapshot {
    #[serde(default)]
    pub services: Vec<RemoteService>,
    #[serde(default)]
    pub available_dates: Vec<AvailableDate>,
    #[serde(default)]
    pub total_available_dates: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<String>,
}

impl BookingSnapshot {
    pub fn find_date(&self, date: NaiveDate) -> Option<&AvailableDate> {
        self.available_dates.iter().find(|d| d.date == date)
    }

    /// Dates the client can actually book, in server order
    pub fn bookable_dates(&self) -> impl Iterator<Item = &AvailableDate> {
        self.available_dates.iter().filter(|d| d.can_book)
    }
}

/// Which contact field the client fills in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactMethod {
    #[default]
    Email,
    Phone,
}

impl ContactMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "email" => Some(Self::Email),
            "phone" => Some(Self::Phone),
            _ => None,
        }
    }
}

/// Body of `POST /appointment/book`.
///
/// Items are listed by display name; the server has no notion of catalog ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub core_services: Vec<String>,
    #[serde(rename = "addons", skip_serializing_if = "Vec::is_empty")]
    pub add_ons: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub removals: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// `DD/MM/YYYY`
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl BookingPayload {
    /// Flattened `(field, value)` pairs for multipart encoding. List
    /// fields repeat their key once per entry.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("name", self.name.clone())];
        if let Some(email) = &self.email {
            fields.push(("email", email.clone()));
        }
        if let Some(phone) = &self.phone {
            fields.push(("phone", phone.clone()));
        }
        fields.push(("date", self.date.clone()));
        if let Some(time) = &self.time {
            fields.push(("time", time.clone()));
        }
        fields.extend(self.core_services.iter().map(|s| ("coreServices", s.clone())));
        fields.extend(self.add_ons.iter().map(|s| ("addons", s.clone())));
        fields.extend(self.removals.iter().map(|s| ("removals", s.clone())));
        if let Some(level) = &self.level {
            fields.push(("level", level.clone()));
        }
        fields
    }
}

/// Inspiration image sent as the `customDesignImage` file part
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A complete submission: payload plus optional image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub payload: BookingPayload,
    pub attachment: Option<Attachment>,
}

impl BookingRequest {
    /// Multipart is required whenever an attachment is present
    pub fn is_multipart(&self) -> bool {
        self.attachment.is_some()
    }
}

/// Server acknowledgement of an accepted booking
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingReceipt {
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> BookingPayload {
        BookingPayload {
            name: "Jess".into(),
            email: Some("jess@example.com".into()),
            phone: None,
            core_services: vec!["Full Set Gel-X Extension".into(), "Gel on Toes".into()],
            add_ons: vec!["Chrome".into()],
            removals: vec![],
            level: Some("Level 2: Advanced".into()),
            date: "10/06/2024".into(),
            time: Some("14:00".into()),
        }
    }

    #[test]
    fn test_full_day_slots() {
        let slots = full_day_slots();
        assert_eq!(slots.len(), 9);
        assert_eq!(slots.first().map(String::as_str), Some("10:00"));
        assert_eq!(slots.last().map(String::as_str), Some("18:00"));
    }

    #[test]
    fn test_available_date_parsing() {
        let json = r#"{
            "date": "2024-06-10",
            "displayDate": "10/06/2024",
            "type": "full-day",
            "isFull": false,
            "slotsRemaining": 1,
            "canBook": true,
            "availableSlots": []
        }"#;
        let date: AvailableDate = serde_json::from_str(json).unwrap();
        assert_eq!(date.date, NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        assert_eq!(date.kind, DateType::FullDay);
        assert!(date.can_book);
        assert_eq!(date.offerable_slots(), full_day_slots());
        assert!(date.offers("13:00"));
        assert!(!date.offers("19:00"));
    }

    #[test]
    fn test_timed_date_ignores_fallback() {
        let json = r#"{"date": "2024-06-11", "type": "timed", "canBook": true,
                       "availableSlots": ["14:00", "16:30"]}"#;
        let date: AvailableDate = serde_json::from_str(json).unwrap();
        assert_eq!(date.offerable_slots(), vec!["14:00", "16:30"]);
        assert!(date.offers("16:30"));
        assert!(!date.offers("10:00"));
        assert_eq!(date.slots_remaining, 0);
    }

    #[test]
    fn test_snapshot_lookup() {
        let json = r#"{
            "services": [{"name": "Gel-X", "prices": {"level1": 50, "level2": 60}}],
            "availableDates": [
                {"date": "2024-06-10", "type": "timed", "canBook": false, "isFull": true},
                {"date": "2024-06-11", "type": "full-day", "canBook": true}
            ],
            "totalAvailableDates": 2,
            "asOf": "2024-06-01T09:00:00.000Z"
        }"#;
        let snapshot: BookingSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.services[0].prices.as_ref().map(|p| p["level2"]), Some(60));
        let june_10 = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert!(snapshot.find_date(june_10).is_some_and(|d| d.is_full));
        let bookable: Vec<NaiveDate> = snapshot.bookable_dates().map(|d| d.date).collect();
        assert_eq!(bookable, vec![NaiveDate::from_ymd_opt(2024, 6, 11).unwrap()]);
    }

    #[test]
    fn test_contact_method_roundtrip_strings() {
        assert_eq!(ContactMethod::parse("phone"), Some(ContactMethod::Phone));
        assert_eq!(ContactMethod::parse("fax"), None);
        assert_eq!(ContactMethod::default().as_str(), "email");
    }

    #[test]
    fn test_payload_json_shape() {
        let value = serde_json::to_value(payload()).unwrap();
        assert_eq!(value["name"], "Jess");
        assert_eq!(value["coreServices"][1], "Gel on Toes");
        assert_eq!(value["addons"][0], "Chrome");
        assert_eq!(value["level"], "Level 2: Advanced");
        assert_eq!(value["date"], "10/06/2024");
        assert!(value.get("phone").is_none());
        assert!(value.get("removals").is_none());
    }

    #[test]
    fn test_form_fields_repeat_list_keys() {
        let fields = payload().form_fields();
        let core: Vec<&str> = fields
            .iter()
            .filter(|(k, _)| *k == "coreServices")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(core, vec!["Full Set Gel-X Extension", "Gel on Toes"]);
        assert!(fields.iter().any(|(k, v)| *k == "time" && v == "14:00"));
        assert!(!fields.iter().any(|(k, _)| *k == "phone"));
    }

    #[test]
    fn test_attachment_debug_hides_bytes() {
        let attachment = Attachment::new("inspo.png", "image/png", vec![1, 2, 3]);
        let debug = format!("{:?}", attachment);
        assert!(debug.contains("len: 3"));
        assert!(!debug.contains("[1, 2, 3]"));
    }
}
