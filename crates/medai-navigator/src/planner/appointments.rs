use chrono::NaiveDate;
use tracing::{debug, info};

use medai_contracts::{
    error::{MedaiError, MedaiResult},
    planner::{Appointment, AppointmentDraft, AppointmentType, RecordId},
};

use super::{required, required_date};

/// Scheduled appointments in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct AppointmentBook {
    entries: Vec<Appointment>,
}

/// A draft that passed validation.
struct Checked {
    title: String,
    description: String,
    date: NaiveDate,
    time: String,
    kind: AppointmentType,
}

fn check(draft: &AppointmentDraft, today: NaiveDate) -> MedaiResult<Checked> {
    let title = required("title", &draft.title)?;
    let description = required("description", &draft.description)?;
    let date = required_date("date", &draft.date)?;
    let time = required("time", &draft.time)?;

    if date < today {
        return Err(MedaiError::invalid(
            "date",
            format!("{date} is in the past; pick today or later"),
        ));
    }

    Ok(Checked {
        title,
        description,
        date,
        time,
        kind: draft.kind.unwrap_or_default(),
    })
}

impl AppointmentBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `draft` and append it. `today` bounds the earliest date.
    ///
    /// On error the book is unchanged.
    pub fn add(&mut self, draft: &AppointmentDraft, today: NaiveDate) -> MedaiResult<RecordId> {
        let checked = check(draft, today)?;
        let id = RecordId::new();
        info!(%id, title = %checked.title, date = %checked.date, "appointment scheduled");
        self.entries.push(Appointment {
            id,
            title: checked.title,
            description: checked.description,
            date: checked.date,
            time: checked.time,
            kind: checked.kind,
        });
        Ok(id)
    }

    /// Replace the fields of appointment `id`, keeping its id and position.
    pub fn update(
        &mut self,
        id: RecordId,
        draft: &AppointmentDraft,
        today: NaiveDate,
    ) -> MedaiResult<()> {
        let checked = check(draft, today)?;
        let entry = self
            .entries
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| not_found(id))?;

        entry.title = checked.title;
        entry.description = checked.description;
        entry.date = checked.date;
        entry.time = checked.time;
        entry.kind = checked.kind;
        info!(%id, "appointment updated");
        Ok(())
    }

    /// Remove appointment `id`; the others keep their order.
    pub fn remove(&mut self, id: RecordId) -> MedaiResult<Appointment> {
        let index = self
            .entries
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| not_found(id))?;
        let removed = self.entries.remove(index);
        debug!(%id, remaining = self.entries.len(), "appointment removed");
        Ok(removed)
    }

    pub fn get(&self, id: RecordId) -> Option<&Appointment> {
        self.entries.iter().find(|a| a.id == id)
    }

    pub fn list(&self) -> &[Appointment] {
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
        kind: "appointment".to_string(),
        id: id.to_string(),
    }
}

/// A draft pre-filled from an existing appointment, for editing.
pub fn draft_from(appointment: &Appointment) -> AppointmentDraft {
    AppointmentDraft {
        title: appointment.title.clone(),
        description: appointment.description.clone(),
        date: appointment.date.format(super::DATE_FORMAT).to_string(),
        time: appointment.time.clone(),
        kind: Some(appointment.kind),
    }
}
