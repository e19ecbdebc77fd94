//! Wizard Controller
//!
//! Owns the draft store and the step machine, validates each step before
//! letting the client move forward, and turns a finished draft into a
//! submission.

use super::state::{WizardState, WizardStep};
use crate::api::types::{
    Attachment, AvailableDate, BookingPayload, BookingRequest, BookingSnapshot, ContactMethod,
};
use crate::api::{AvailabilityProvider, BookingSubmitter};
use crate::catalog::{self, Category, LineItem};
use crate::config::DEFAULT_MAX_ATTACHMENT_BYTES;
use crate::draft::{DraftBooking, DraftStorage, DraftStore, IdList};
use crate::error::{BookingError, Result, ValidationError};
use crate::utils::{display_date, submission_date};
use chrono::NaiveDate;

const BYTES_PER_MB: usize = 1024 * 1024;

/// Progress of the booking data fetch
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    NotLoaded,
    Loading,
    Loaded,
    Failed(String),
}

/// Priced breakdown of the current selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingSummary {
    pub items: Vec<LineItem>,
    pub total: u32,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
}

/// Shown once the server has accepted a booking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingConfirmation {
    pub client_name: String,
    pub date: NaiveDate,
    pub time: String,
    pub message: Option<String>,
    /// False when the saved selection outlived the booking and must be
    /// cleared before booking again
    pub draft_cleared: bool,
}

pub struct WizardController<S: DraftStorage> {
    store: DraftStore<S>,
    state: WizardState,
    load_state: LoadState,
    snapshot: Option<BookingSnapshot>,
    removals_enabled: bool,
    max_attachment_bytes: usize,
    submitting: bool,
    confirmation: Option<BookingConfirmation>,
}

impl<S: DraftStorage> WizardController<S> {
    pub fn new(store: DraftStore<S>) -> Self {
        let removals_enabled = !store.draft().removal_ids.is_empty();
        Self {
            store,
            state: WizardState::new(),
            load_state: LoadState::NotLoaded,
            snapshot: None,
            removals_enabled,
            max_attachment_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
            submitting: false,
            confirmation: None,
        }
    }

    pub fn with_max_attachment_bytes(mut self, max_bytes: usize) -> Self {
        self.max_attachment_bytes = max_bytes;
        self
    }

    pub fn draft(&self) -> &DraftBooking {
        self.store.draft()
    }

    pub fn store(&self) -> &DraftStore<S> {
        &self.store
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn snapshot(&self) -> Option<&BookingSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn removals_enabled(&self) -> bool {
        self.removals_enabled
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn confirmation(&self) -> Option<&BookingConfirmation> {
        self.confirmation.as_ref()
    }

    // ── Booking data ─────────────────────────────────────────────

    /// Fetch the catalog and calendar. May be called again after a
    /// failure; a previously loaded snapshot is kept until a fetch
    /// succeeds.
    pub async fn load_availability(&mut self, provider: &dyn AvailabilityProvider) -> Result<()> {
        self.load_state = LoadState::Loading;
        match provider.fetch_booking_data().await {
            Ok(snapshot) => {
                self.snapshot = Some(snapshot);
                self.load_state = LoadState::Loaded;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Booking data unavailable: {}", e);
                self.load_state = LoadState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    pub fn bookable_dates(&self) -> Vec<&AvailableDate> {
        self.snapshot
            .as_ref()
            .map(|s| s.bookable_dates().collect())
            .unwrap_or_default()
    }

    /// Times that may be picked for the selected date
    pub fn available_time_slots(&self) -> Vec<String> {
        self.selected_available_date()
            .map(AvailableDate::offerable_slots)
            .unwrap_or_default()
    }

    fn selected_available_date(&self) -> Option<&AvailableDate> {
        let date = self.draft().date?;
        self.snapshot.as_ref()?.find_date(date)
    }

    // ── Treatments ───────────────────────────────────────────────

    pub fn add_core_service(&mut self, id: &str) -> Result<()> {
        self.add_option(Category::CoreService, IdList::CoreServices, id)
    }

    pub fn remove_core_service(&mut self, id: &str) -> Result<()> {
        self.store.remove_id(IdList::CoreServices, id)?;
        Ok(())
    }

    pub fn add_add_on(&mut self, id: &str) -> Result<()> {
        self.add_option(Category::AddOn, IdList::AddOns, id)
    }

    pub fn remove_add_on(&mut self, id: &str) -> Result<()> {
        self.store.remove_id(IdList::AddOns, id)?;
        Ok(())
    }

    pub fn add_removal(&mut self, id: &str) -> Result<()> {
        if !self.removals_enabled {
            return Err(ValidationError::RemovalsNotEnabled.into());
        }
        self.add_option(Category::Removal, IdList::Removals, id)
    }

    pub fn remove_removal(&mut self, id: &str) -> Result<()> {
        self.store.remove_id(IdList::Removals, id)?;
        Ok(())
    }

    /// Opting out of removals drops every selected removal
    pub fn set_removals_enabled(&mut self, enabled: bool) -> Result<()> {
        self.removals_enabled = enabled;
        if !enabled && !self.draft().removal_ids.is_empty() {
            self.store.set_ids(IdList::Removals, Vec::new())?;
        }
        Ok(())
    }

    pub fn select_art_level(&mut self, id: Option<&str>) -> Result<()> {
        if let Some(id) = id
            && catalog::find_art_level(id).is_none()
        {
            return Err(unknown(Category::ArtLevel, id));
        }
        self.store.set_art_level(id.map(str::to_string))
    }

    fn add_option(&mut self, category: Category, list: IdList, id: &str) -> Result<()> {
        if catalog::find_option(category, id).is_none() {
            return Err(unknown(category, id));
        }
        self.store.add_id(list, id)?;
        Ok(())
    }

    // ── Date & time ──────────────────────────────────────────────

    /// Pick a date from the loaded calendar. Always clears the time,
    /// since the offerable times depend on the date.
    pub fn select_date(&mut self, date: NaiveDate) -> Result<()> {
        let snapshot = self
            .snapshot
            .as_ref()
            .ok_or(ValidationError::ScheduleNotLoaded)?;
        if !snapshot.find_date(date).is_some_and(|d| d.can_book) {
            return Err(ValidationError::DateUnavailable(display_date(date)).into());
        }
        self.store.set_date(Some(date))?;
        self.store.set_time(None)?;
        tracing::debug!("Selected date {}", date);
        Ok(())
    }

    pub fn select_time(&mut self, time: &str) -> Result<()> {
        let date = self.draft().date.ok_or(ValidationError::MissingDate)?;
        if self.snapshot.is_none() {
            return Err(ValidationError::ScheduleNotLoaded.into());
        }
        if !self.selected_available_date().is_some_and(|d| d.offers(time)) {
            return Err(ValidationError::TimeUnavailable {
                date: display_date(date),
                time: time.to_string(),
            }
            .into());
        }
        self.store.set_time(Some(time.to_string()))
    }

    // ── Contact ──────────────────────────────────────────────────

    pub fn set_client_name(&mut self, name: &str) -> Result<()> {
        self.store.set_client_name(name)
    }

    pub fn set_contact_method(&mut self, method: ContactMethod) -> Result<()> {
        self.store.set_contact_method(method)
    }

    pub fn set_client_email(&mut self, email: &str) -> Result<()> {
        self.store.set_client_email(email)
    }

    pub fn set_client_phone(&mut self, phone: &str) -> Result<()> {
        self.store.set_client_phone(phone)
    }

    /// Attach an inspiration image. Oversized files are refused here and
    /// never reach the network.
    pub fn attach_image(&mut self, attachment: Attachment) -> Result<()> {
        if attachment.len() > self.max_attachment_bytes {
            return Err(ValidationError::AttachmentTooLarge {
                size: attachment.len(),
                limit_mb: self.max_attachment_bytes.div_ceil(BYTES_PER_MB),
            }
            .into());
        }
        tracing::debug!("Attached {:?}", attachment);
        self.store.set_attachment(Some(attachment));
        Ok(())
    }

    pub fn detach_image(&mut self) {
        self.store.set_attachment(None);
    }

    // ── Step machine ─────────────────────────────────────────────

    /// Check the content a step is responsible for
    pub fn validate_step(&self, step: WizardStep) -> std::result::Result<(), ValidationError> {
        match step {
            WizardStep::Treatments => self.validate_treatments(),
            WizardStep::DateAndTime => self.validate_schedule(),
            WizardStep::Contact => self.validate_contact(),
        }
    }

    pub fn can_advance(&self, step: WizardStep) -> bool {
        self.state.is_visible(step) && self.state.pending().is_none() && self.validate_step(step).is_ok()
    }

    /// Validate `step` and mark it in flight. An invalid step leaves the
    /// state untouched.
    pub fn begin_advance(&mut self, step: WizardStep) -> Result<()> {
        if let Some(pending) = self.state.pending() {
            return Err(ValidationError::TransitionPending(pending.index()).into());
        }
        if !self.state.is_visible(step) {
            return Err(ValidationError::StepNotVisible(step.index()).into());
        }
        self.validate_step(step)?;
        self.state.begin(step)?;
        Ok(())
    }

    /// Complete the transition started by [`Self::begin_advance`]
    pub fn finish_advance(&mut self) -> Option<WizardStep> {
        self.state.finish()
    }

    /// Abandon the transition started by [`Self::begin_advance`]
    pub fn cancel_advance(&mut self) {
        self.state.abort();
    }

    /// Confirm a step and move on to the next one
    pub fn advance(&mut self, step: WizardStep) -> Result<()> {
        self.begin_advance(step)?;
        self.finish_advance();
        Ok(())
    }

    pub fn toggle_expanded(&mut self, step: WizardStep) -> bool {
        self.state.toggle_expanded(step)
    }

    fn validate_treatments(&self) -> std::result::Result<(), ValidationError> {
        let has_core = self
            .draft()
            .core_service_ids
            .iter()
            .any(|id| catalog::find_core_service(id).is_some());
        if has_core {
            Ok(())
        } else {
            Err(ValidationError::NoCoreService)
        }
    }

    fn validate_schedule(&self) -> std::result::Result<(), ValidationError> {
        let date = self.draft().date.ok_or(ValidationError::MissingDate)?;
        let snapshot = self
            .snapshot
            .as_ref()
            .ok_or(ValidationError::ScheduleNotLoaded)?;
        let available = snapshot
            .find_date(date)
            .filter(|d| d.can_book)
            .ok_or_else(|| ValidationError::DateUnavailable(display_date(date)))?;
        let time = self.draft().time.as_deref().ok_or(ValidationError::MissingTime)?;
        if !available.offers(time) {
            return Err(ValidationError::TimeUnavailable {
                date: display_date(date),
                time: time.to_string(),
            });
        }
        Ok(())
    }

    fn validate_contact(&self) -> std::result::Result<(), ValidationError> {
        let draft = self.draft();
        if draft.client_name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        if draft.active_contact().trim().is_empty() {
            return Err(match draft.contact_method {
                ContactMethod::Email => ValidationError::MissingEmail,
                ContactMethod::Phone => ValidationError::MissingPhone,
            });
        }
        Ok(())
    }

    // ── Summary & submission ─────────────────────────────────────

    pub fn summary(&self) -> BookingSummary {
        let draft = self.draft();
        BookingSummary {
            items: draft.selected_items(),
            total: draft.total_price(),
            date: draft.date,
            time: draft.time.clone(),
        }
    }

    /// Build the request for the current draft. Fails without touching
    /// any state if the draft is incomplete.
    pub fn build_request(&self) -> Result<BookingRequest> {
        self.validate_treatments()?;
        self.validate_contact()?;
        let draft = self.draft();
        let date = draft.date.ok_or(ValidationError::MissingDate)?;
        let time = draft.time.clone().ok_or(ValidationError::MissingTime)?;
        if self.snapshot.is_some() {
            self.validate_schedule()?;
        }

        let names = |category: Category, ids: &[String]| -> Vec<String> {
            ids.iter()
                .filter_map(|id| catalog::find_option(category, id))
                .map(|s| s.name.to_string())
                .collect()
        };

        let contact = draft.active_contact().trim().to_string();
        let (email, phone) = match draft.contact_method {
            ContactMethod::Email => (Some(contact), None),
            ContactMethod::Phone => (None, Some(contact)),
        };

        let payload = BookingPayload {
            name: draft.client_name.trim().to_string(),
            email,
            phone,
            core_services: names(Category::CoreService, &draft.core_service_ids),
            add_ons: names(Category::AddOn, &draft.add_on_ids),
            removals: names(Category::Removal, &draft.removal_ids),
            level: draft
                .art_level_id
                .as_deref()
                .and_then(catalog::find_art_level)
                .map(|level| level.name.to_string()),
            date: submission_date(date),
            time: Some(time),
        };

        Ok(BookingRequest {
            payload,
            attachment: draft.attachment.clone(),
        })
    }

    /// Send the booking. On success the draft is wiped and the wizard
    /// starts over; on failure nothing changes so the client can retry.
    /// Once the server has accepted, a storage failure never turns the
    /// result into an error.
    pub async fn submit(&mut self, submitter: &dyn BookingSubmitter) -> Result<BookingConfirmation> {
        if self.submitting {
            return Err(ValidationError::SubmissionInFlight.into());
        }
        let request = self.build_request()?;
        let draft = self.draft();
        let client_name = draft.client_name.trim().to_string();
        let date = draft.date.ok_or(ValidationError::MissingDate)?;
        let time = draft.time.clone().ok_or(ValidationError::MissingTime)?;

        self.submitting = true;
        let outcome = submitter.submit(&request).await;
        self.submitting = false;

        let receipt = outcome?;
        let mut confirmation = BookingConfirmation {
            client_name,
            date,
            time,
            message: receipt.message,
            draft_cleared: true,
        };

        if let Err(e) = self.store.clear() {
            tracing::warn!("Booking accepted but the saved draft could not be cleared: {}", e);
            self.store.forget();
            confirmation.draft_cleared = false;
        }
        self.state.reset();
        self.removals_enabled = false;
        self.confirmation = Some(confirmation.clone());
        tracing::info!(
            "Booking confirmed for {} on {} at {}",
            confirmation.client_name,
            confirmation.date,
            confirmation.time
        );
        Ok(confirmation)
    }

    /// Leave the confirmation screen
    pub fn start_new_booking(&mut self) {
        self.confirmation = None;
    }
}

fn unknown(category: Category, id: &str) -> BookingError {
    ValidationError::UnknownItem {
        kind: category.label(),
        id: id.to_string(),
    }
    .into()
}
