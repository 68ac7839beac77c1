//! The personal planner: appointments, medications, and where to consult online.
//!
//! Both stores are plain ordered lists owned by their screen. Nothing is
//! persisted; the lists live exactly as long as the process.

pub mod appointments;
pub mod medications;

pub use appointments::AppointmentBook;
pub use medications::{end_date, MedicationTracker};

use chrono::NaiveDate;

use medai_contracts::{
    error::{MedaiError, MedaiResult},
    services::OnlineConsultation,
};

/// Date format used by every planner form.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Trimmed `value`, or `InvalidInput` if it is blank.
pub(crate) fn required(field: &str, value: &str) -> MedaiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(MedaiError::invalid(field, format!("{field} is required")))
    } else {
        Ok(trimmed.to_string())
    }
}

/// A required `YYYY-MM-DD` date.
pub(crate) fn required_date(field: &str, value: &str) -> MedaiResult<NaiveDate> {
    let text = required(field, value)?;
    NaiveDate::parse_from_str(&text, DATE_FORMAT).map_err(|_| {
        MedaiError::invalid(field, format!("'{text}' is not a date in YYYY-MM-DD form"))
    })
}

/// Online doctor consultation services, Indian providers first.
pub fn online_consultations() -> Vec<OnlineConsultation> {
    [
        ("Apollo 24/7", "https://www.apollo247.com/", "India"),
        ("Practo", "https://www.practo.com/", "India"),
        ("Tata 1mg", "https://www.1mg.com/", "India"),
        ("Teladoc", "https://www.teladochealth.com/", "USA"),
        ("MDLIVE", "https://www.mdlive.com/", "USA"),
        ("Amwell", "https://www.amwell.com/", "USA"),
    ]
    .into_iter()
    .map(|(name, url, region)| OnlineConsultation {
        name: name.to_string(),
        url: url.to_string(),
        region: region.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_counts_as_missing() {
        let err = required("title", " \t ").unwrap_err();
        assert_eq!(err.to_string(), "invalid input for 'title': title is required");
        assert_eq!(required("title", "  Checkup ").unwrap(), "Checkup");
    }

    #[test]
    fn dates_use_iso_form() {
        assert_eq!(
            required_date("date", "2026-03-09").unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
        );
        assert!(required_date("date", "09/03/2026").is_err());
        assert!(required_date("date", "2026-02-30").is_err());
    }

    #[test]
    fn consultation_directory_lists_six_services() {
        let services = online_consultations();
        assert_eq!(services.len(), 6);
        assert_eq!(services[0].name, "Apollo 24/7");
        assert!(services.iter().all(|s| s.url.starts_with("https://")));
        assert_eq!(services.iter().filter(|s| s.region == "USA").count(), 3);
    }
}
