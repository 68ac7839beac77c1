//! Appointment and medication records kept by the personal planner.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a planner entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an id printed by `Display`.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s.trim()).ok().map(Self)
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Appointments ─────────────────────────────────────────────────────────────

/// How an appointment takes place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentType {
    #[default]
    InPerson,
    Video,
    Phone,
}

impl AppointmentType {
    pub const ALL: [AppointmentType; 3] = [
        AppointmentType::InPerson,
        AppointmentType::Video,
        AppointmentType::Phone,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AppointmentType::InPerson => "In-person",
            AppointmentType::Video => "Video",
            AppointmentType::Phone => "Phone",
        }
    }

    /// Accepts "in-person", "inperson", "video" or "phone", any case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in-person" | "inperson" | "in person" => Some(AppointmentType::InPerson),
            "video" => Some(AppointmentType::Video),
            "phone" => Some(AppointmentType::Phone),
            _ => None,
        }
    }
}

/// A scheduled appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    /// Free-form time of day, e.g. "14:30".
    pub time: String,
    #[serde(rename = "type")]
    pub kind: AppointmentType,
}

/// The appointment form before validation. Everything is raw text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentDraft {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub kind: Option<AppointmentType>,
}

// ── Medications ──────────────────────────────────────────────────────────────

/// A medication course being tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: RecordId,
    pub name: String,
    pub dosage: String,
    /// Free-form schedule, e.g. "Morning, Evening".
    pub timings: String,
    pub after_food: bool,
    pub duration_days: u32,
    pub start_date: NaiveDate,
}

/// The medication form before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MedicationDraft {
    pub name: String,
    pub dosage: String,
    pub timings: String,
    pub after_food: bool,
    /// Empty means the planner's default course length.
    pub duration_days: String,
    pub start_date: String,
}
