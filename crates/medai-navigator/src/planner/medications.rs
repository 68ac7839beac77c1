use chrono::{Days, NaiveDate};
use tracing::{debug, info};

use medai_contracts::{
    error::{MedaiError, MedaiResult},
    planner::{Medication, MedicationDraft, RecordId},
};

use super::{required, required_date, DATE_FORMAT};

/// Medication courses in the order they were added.
#[derive(Debug, Clone)]
pub struct MedicationTracker {
    entries: Vec<Medication>,
    default_days: u32,
}

struct Checked {
    name: String,
    dosage: String,
    timings: String,
    after_food: bool,
    duration_days: u32,
    start_date: NaiveDate,
}

/// The last day of a course: start plus its length in days.
pub fn end_date(medication: &Medication) -> NaiveDate {
    medication
        .start_date
        .checked_add_days(Days::new(u64::from(medication.duration_days)))
        .unwrap_or(NaiveDate::MAX)
}

impl MedicationTracker {
    /// `default_days` fills a blank duration (see `[planner]` in the config).
    pub fn new(default_days: u32) -> Self {
        Self {
            entries: Vec::new(),
            default_days: default_days.max(1),
        }
    }

    /// A fresh form: default course length, starting `today`.
    pub fn blank_draft(&self, today: NaiveDate) -> MedicationDraft {
        MedicationDraft {
            duration_days: self.default_days.to_string(),
            start_date: today.format(DATE_FORMAT).to_string(),
            ..MedicationDraft::default()
        }
    }

    fn check(&self, draft: &MedicationDraft) -> MedaiResult<Checked> {
        let name = required("name", &draft.name)?;
        let dosage = required("dosage", &draft.dosage)?;
        let timings = required("timings", &draft.timings)?;
        let start_date = required_date("start date", &draft.start_date)?;

        let days_text = draft.duration_days.trim();
        let duration_days = if days_text.is_empty() {
            self.default_days
        } else {
            days_text.parse::<u32>().map_err(|_| {
                MedaiError::invalid("duration", format!("'{days_text}' is not a number of days"))
            })?
        };
        if duration_days == 0 {
            return Err(MedaiError::invalid("duration", "a course lasts at least one day"));
        }
        if start_date.checked_add_days(Days::new(u64::from(duration_days))).is_none() {
            return Err(MedaiError::invalid("duration", "the course would end past the calendar"));
        }

        Ok(Checked {
            name,
            dosage,
            timings,
            after_food: draft.after_food,
            duration_days,
            start_date,
        })
    }

    /// Validate `draft` and append it. On error the list is unchanged.
    pub fn add(&mut self, draft: &MedicationDraft) -> MedaiResult<RecordId> {
        let checked = self.check(draft)?;
        let id = RecordId::new();
        info!(%id, name = %checked.name, days = checked.duration_days, "medication added");
        self.entries.push(Medication {
            id,
            name: checked.name,
            dosage: checked.dosage,
            timings: checked.timings,
            after_food: checked.after_food,
            duration_days: checked.duration_days,
            start_date: checked.start_date,
        });
        Ok(id)
    }

    pub fn update(&mut self, id: RecordId, draft: &MedicationDraft) -> MedaiResult<()> {
        let checked = self.check(draft)?;
        let entry = self
            .entries
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| not_found(id))?;

        entry.name = checked.name;
        entry.dosage = checked.dosage;
        entry.timings = checked.timings;
        entry.after_food = checked.after_food;
        entry.duration_days = checked.duration_days;
        entry.start_date = checked.start_date;
        info!(%id, "medication updated");
        Ok(())
    }

    pub fn remove(&mut self, id: RecordId) -> MedaiResult<Medication> {
        let index = self
            .entries
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| not_found(id))?;
        let removed = self.entries.remove(index);
        debug!(%id, remaining = self.entries.len(), "medication removed");
        Ok(removed)
    }

    pub fn get(&self, id: RecordId) -> Option<&Medication> {
        self.entries.iter().find(|m| m.id == id)
    }

    pub fn list(&self) -> &[Medication] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn not_found(id: RecordId) -> MedaiError {
    MedaiError::NotFound {
        kind: "medication".to_string(),
        id: id.to_string(),
    }
}

/// A draft pre-filled from an existing course, for editing.
pub fn draft_from(medication: &Medication) -> MedicationDraft {
    MedicationDraft {
        name: medication.name.clone(),
        dosage: medication.dosage.clone(),
        timings: medication.timings.clone(),
        after_food: medication.after_food,
        duration_days: medication.duration_days.to_string(),
        start_date: medication.start_date.format(DATE_FORMAT).to_string(),
    }
}
