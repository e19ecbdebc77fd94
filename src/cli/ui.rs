//! Plain-text rendering for the CLI: catalog, calendar, draft and summary.

use crate::api::types::{AvailableDate, DateType};
use crate::catalog::{ADD_ONS, ART_LEVELS, CORE_SERVICES, REMOVALS, ServiceOption};
use crate::draft::DraftBooking;
use crate::utils::display_date;
use crate::wizard::{BookingConfirmation, BookingSummary};
use std::fmt::Write;

pub(crate) fn price(amount: u32) -> String {
    format!("£{}", amount)
}

fn option_rows(out: &mut String, title: &str, options: &[ServiceOption]) {
    let _ = writeln!(out, "{}", title);
    for option in options {
        let _ = writeln!(out, "  {:<18} {:<28} {:>5}", option.id, option.name, price(option.price));
    }
    out.push('\n');
}

pub(crate) fn render_catalog() -> String {
    let mut out = String::new();
    option_rows(&mut out, "Treatments", CORE_SERVICES);
    option_rows(&mut out, "Add-ons", ADD_ONS);

    let _ = writeln!(out, "Nail art");
    for level in ART_LEVELS {
        let _ = writeln!(out, "  {:<18} {:<28} {:>5}", level.id, level.name, price(level.price));
        let _ = writeln!(out, "      {}", level.description);
    }
    out.push('\n');

    option_rows(&mut out, "Removals", REMOVALS);
    out
}

pub(crate) fn render_dates(dates: &[&AvailableDate]) -> String {
    if dates.is_empty() {
        return "No dates are available right now.\n".to_string();
    }
    let mut out = String::new();
    for date in dates {
        let kind = match date.kind {
            DateType::FullDay => "full day",
            DateType::Timed => "timed",
        };
        let _ = writeln!(
            out,
            "{}  {:<22} ({})  {}",
            date.date,
            display_date(date.date),
            kind,
            date.offerable_slots().join(" ")
        );
    }
    out
}

pub(crate) fn render_summary(summary: &BookingSummary) -> String {
    let mut out = String::new();
    if summary.items.is_empty() {
        let _ = writeln!(out, "  (nothing selected)");
    }
    for item in &summary.items {
        let _ = writeln!(out, "  {:<32} {:>5}", item.name, price(item.price));
    }
    let _ = writeln!(out, "  {:<32} {:>5}", "Total", price(summary.total));

    let when = match (summary.date, summary.time.as_deref()) {
        (Some(date), Some(time)) => format!("{} at {}", display_date(date), time),
        (Some(date), None) => format!("{} (no time chosen)", display_date(date)),
        _ => "not chosen".to_string(),
    };
    let _ = writeln!(out, "  When: {}", when);
    out
}

pub(crate) fn render_contact(draft: &DraftBooking) -> String {
    let name = if draft.client_name.is_empty() { "-" } else { draft.client_name.as_str() };
    let contact = if draft.active_contact().is_empty() { "-" } else { draft.active_contact() };
    format!(
        "  Name: {}\n  Contact ({}): {}\n",
        name,
        draft.contact_method.as_str(),
        contact
    )
}

pub(crate) fn render_confirmation(confirmation: &BookingConfirmation) -> String {
    let mut out = format!(
        "✅ Thanks {}! Your booking request for {} at {} has been sent.\n",
        confirmation.client_name,
        display_date(confirmation.date),
        confirmation.time
    );
    if let Some(message) = &confirmation.message {
        let _ = writeln!(out, "   {}", message);
    }
    if !confirmation.draft_cleared {
        out.push_str(
            "⚠️  The saved selection could not be removed. Run `draft clear` before booking again.\n",
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, LineItem};
    use chrono::NaiveDate;

    fn june_10() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    #[test]
    fn test_catalog_lists_every_option() {
        let out = render_catalog();
        for option in CORE_SERVICES.iter().chain(ADD_ONS).chain(REMOVALS) {
            assert!(out.contains(option.id), "missing {}", option.id);
        }
        for level in ART_LEVELS {
            assert!(out.contains(level.name));
        }
        assert!(out.contains("£50"));
    }

    #[test]
    fn test_summary_rendering() {
        let summary = BookingSummary {
            items: vec![LineItem {
                category: Category::CoreService,
                name: "Full Set Gel-X Extension",
                price: 50,
            }],
            total: 50,
            date: Some(june_10()),
            time: Some("14:00".into()),
        };
        let out = render_summary(&summary);
        assert!(out.contains("Full Set Gel-X Extension"));
        assert!(out.contains("Total"));
        assert!(out.contains("Mon 10 June 2024 at 14:00"));
    }

    #[test]
    fn test_empty_dates() {
        assert!(render_dates(&[]).contains("No dates"));
    }

    #[test]
    fn test_full_day_dates_show_fallback_slots() {
        let date = AvailableDate {
            date: june_10(),
            display_date: "10/06/2024".into(),
            kind: DateType::FullDay,
            is_full: false,
            slots_remaining: 1,
            can_book: true,
            available_slots: vec![],
        };
        let out = render_dates(&[&date]);
        assert!(out.contains("2024-06-10"));
        assert!(out.contains("10:00"));
        assert!(out.contains("18:00"));
    }

    #[test]
    fn test_confirmation_includes_server_message() {
        let out = render_confirmation(&BookingConfirmation {
            client_name: "Jess".into(),
            date: june_10(),
            time: "14:00".into(),
            message: Some("Booking request received".into()),
            draft_cleared: true,
        });
        assert!(out.contains("Thanks Jess"));
        assert!(out.contains("Booking request received"));
        assert!(!out.contains("draft clear"));
    }

    #[test]
    fn test_confirmation_warns_about_stale_draft() {
        let out = render_confirmation(&BookingConfirmation {
            client_name: "Jess".into(),
            date: june_10(),
            time: "14:00".into(),
            message: None,
            draft_cleared: false,
        });
        assert!(out.contains("Thanks Jess"));
        assert!(out.contains("Run `draft clear` before booking again"));
    }
}
