//! CLI subcommands: services, dates, draft, book, init, and config loading.

use anyhow::{Context, Result};
use std::path::Path;

use super::ui;
use super::{BookArgs, DraftCommands};
use crate::api::{self, Attachment, AvailabilityClient, AvailabilityProvider, ContactMethod};
use crate::config::Config;
use crate::draft::{DraftStorage, DraftStore, FileStorage};
use crate::utils::parse_date_key;
use crate::wizard::{WizardController, WizardStep};

/// Load configuration from file or defaults
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config = if let Some(path) = config_path {
        tracing::info!("Loading configuration from custom path: {}", path);
        Config::load_from_path(path)?
    } else {
        tracing::debug!("Loading default configuration");
        Config::load()?
    };

    config.validate()?;

    Ok(config)
}

fn open_store(config: &Config) -> DraftStore<FileStorage> {
    DraftStore::open(FileStorage::open(&config.storage.draft_path))
}

/// Print the static catalog
pub(crate) fn cmd_services() -> Result<()> {
    print!("{}", ui::render_catalog());
    Ok(())
}

/// Fetch and print bookable dates
pub(crate) async fn cmd_dates(config: &Config) -> Result<()> {
    let client = AvailabilityClient::new(&config.api.base_url, config.api.timeout_secs)?;
    let snapshot = client
        .fetch_booking_data()
        .await
        .context("Could not load availability. Please try again")?;

    let dates: Vec<_> = snapshot.bookable_dates().collect();
    print!("{}", ui::render_dates(&dates));
    Ok(())
}

pub(crate) fn cmd_draft(config: &Config, operation: DraftCommands) -> Result<()> {
    let mut store = open_store(config);

    match operation {
        DraftCommands::Show => {
            let draft = store.draft();
            if draft.is_empty() {
                println!("No booking in progress.");
                return Ok(());
            }
            let wizard = WizardController::new(store);
            println!("Booking in progress:\n");
            print!("{}", ui::render_summary(&wizard.summary()));
            print!("{}", ui::render_contact(wizard.draft()));
        }
        DraftCommands::Clear => {
            store.clear()?;
            println!("Draft booking cleared.");
        }
    }

    Ok(())
}

/// Merge the given values into the saved draft, then walk every step and
/// submit. Whatever was applied stays saved if a step blocks.
pub(crate) async fn cmd_book(config: &Config, args: BookArgs) -> Result<()> {
    let mut store = open_store(config);
    if args.fresh {
        store.clear()?;
    }
    let mut wizard =
        WizardController::new(store).with_max_attachment_bytes(config.api.max_attachment_bytes);

    let (availability, submission) = api::clients_from_config(&config.api)?;
    wizard
        .load_availability(&availability)
        .await
        .context("Could not load availability. Please try again")?;

    apply_args(&mut wizard, args)?;

    for step in WizardStep::ALL {
        wizard
            .advance(step)
            .with_context(|| format!("Step {} ({}) is incomplete", step.index() + 1, step.title()))?;
    }

    println!("Booking summary:\n");
    print!("{}", ui::render_summary(&wizard.summary()));
    print!("{}", ui::render_contact(wizard.draft()));
    println!();

    let confirmation = wizard
        .submit(&submission)
        .await
        .context("Your selection has been kept; run `book` again to retry")?;

    print!("{}", ui::render_confirmation(&confirmation));
    Ok(())
}

fn apply_args<S: DraftStorage>(wizard: &mut WizardController<S>, args: BookArgs) -> Result<()> {
    for id in &args.services {
        wizard.add_core_service(id)?;
    }
    for id in &args.add_ons {
        wizard.add_add_on(id)?;
    }
    if !args.removals.is_empty() {
        wizard.set_removals_enabled(true)?;
        for id in &args.removals {
            wizard.add_removal(id)?;
        }
    }
    if let Some(level) = &args.level {
        wizard.select_art_level(Some(level.as_str()))?;
    }

    if let Some(date) = &args.date {
        let date = parse_date_key(date)
            .with_context(|| format!("Invalid date {:?}, expected YYYY-MM-DD", date))?;
        wizard.select_date(date)?;
    }
    if let Some(time) = &args.time {
        wizard.select_time(time)?;
    }

    if let Some(name) = &args.name {
        wizard.set_client_name(name)?;
    }
    if let Some(email) = &args.email {
        wizard.set_contact_method(ContactMethod::Email)?;
        wizard.set_client_email(email)?;
    }
    if let Some(phone) = &args.phone {
        wizard.set_contact_method(ContactMethod::Phone)?;
        wizard.set_client_phone(phone)?;
    }

    if let Some(path) = &args.image {
        wizard.attach_image(read_attachment(path)?)?;
    }
    Ok(())
}

fn read_attachment(path: &Path) -> Result<Attachment> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read image: {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();
    Ok(Attachment::new(file_name, image_content_type(path), bytes))
}

fn image_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

/// Initialize configuration file
pub(crate) fn cmd_init(force: bool) -> Result<()> {
    let config_path =
        Config::system_config_path().context("Could not determine config directory")?;

    if config_path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at: {}\nUse --force to overwrite",
            config_path.display()
        );
    }

    Config::default().save(&config_path)?;

    println!("✅ Configuration initialized at: {}", config_path.display());
    println!("   Set api.base_url to {} to book for real", crate::config::PRODUCTION_BASE_URL);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{AvailableDate, BookingSnapshot, DateType};
    use crate::draft::MemoryStorage;
    use crate::error::Result as BookingResult;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::io::Write;

    struct FixedSchedule;

    #[async_trait]
    impl AvailabilityProvider for FixedSchedule {
        async fn fetch_booking_data(&self) -> BookingResult<BookingSnapshot> {
            Ok(BookingSnapshot {
                available_dates: vec![AvailableDate {
                    date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
                    display_date: "10/06/2024".into(),
                    kind: DateType::FullDay,
                    is_full: false,
                    slots_remaining: 1,
                    can_book: true,
                    available_slots: vec![],
                }],
                total_available_dates: 1,
                ..Default::default()
            })
        }
    }

    async fn wizard() -> WizardController<MemoryStorage> {
        let mut wizard = WizardController::new(DraftStore::open(MemoryStorage::new()));
        wizard.load_availability(&FixedSchedule).await.unwrap();
        wizard
    }

    #[test]
    fn test_image_content_type() {
        assert_eq!(image_content_type(Path::new("nails.PNG")), "image/png");
        assert_eq!(image_content_type(Path::new("a/b/nails.jpeg")), "image/jpeg");
        assert_eq!(image_content_type(Path::new("nails")), "application/octet-stream");
    }

    #[test]
    fn test_read_attachment() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"fake-png-bytes").unwrap();

        let attachment = read_attachment(file.path()).unwrap();
        assert_eq!(attachment.content_type, "image/png");
        assert_eq!(attachment.len(), 14);
        assert!(attachment.file_name.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_apply_args_fills_every_step() {
        let mut wizard = wizard().await;
        let args = BookArgs {
            services: vec!["gel-x".into()],
            removals: vec!["gel-x-removal".into()],
            date: Some("2024-06-10".into()),
            time: Some("12:00".into()),
            name: Some("Jess".into()),
            phone: Some("07700 900123".into()),
            ..Default::default()
        };
        apply_args(&mut wizard, args).unwrap();

        for step in WizardStep::ALL {
            wizard.advance(step).unwrap();
        }
        let request = wizard.build_request().unwrap();
        assert_eq!(request.payload.date, "10/06/2024");
        assert_eq!(request.payload.removals, vec!["Gel-X Removal"]);
        assert_eq!(request.payload.phone.as_deref(), Some("07700 900123"));
    }

    #[tokio::test]
    async fn test_apply_args_rejects_bad_date() {
        let mut wizard = wizard().await;
        let args = BookArgs {
            date: Some("10/06/2024".into()),
            ..Default::default()
        };
        let err = apply_args(&mut wizard, args).unwrap_err();
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }

    #[tokio::test]
    async fn test_apply_args_keeps_earlier_values_on_error() {
        let mut wizard = wizard().await;
        let args = BookArgs {
            services: vec!["biab".into()],
            level: Some("nail-art-42".into()),
            ..Default::default()
        };
        assert!(apply_args(&mut wizard, args).is_err());
        assert_eq!(wizard.draft().core_service_ids, vec!["biab"]);
    }
}
