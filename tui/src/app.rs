//! Screen state and key handling, kept apart from drawing so it can be
//! driven from tests.

use std::{
    sync::{
        mpsc::{self, Receiver, Sender},
        Arc,
    },
    thread,
};

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info};

use medai_contracts::{
    error::MedaiError,
    flow::{AnalyzeSymptomsInput, FlowOutcome, MedicalAnswer},
    planner::{AppointmentDraft, AppointmentType, MedicationDraft, RecordId},
    services::{EmergencyContact, MedicalFacility, OnlineConsultation},
};
use medai_core::FlowRunner;
use medai_navigator::{
    flows::{
        medical_qa,
        symptom_analyzer::{self, with_follow_up, SymptomReport},
        treatment_advisor::{self, TreatmentForm, TreatmentReport},
    },
    gate::{RequestGate, RequestGuard},
    hand_off_to_treatment,
    mock_data::{self, parse_location},
    parse_handoff,
    planner::{appointments, medications, online_consultations, AppointmentBook, MedicationTracker},
};

use crate::form::Form;

// ── Screens ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Symptoms,
    Treatment,
    Questions,
    Appointments,
    Medications,
    FindHelp,
}

impl Screen {
    pub const ALL: [Screen; 6] = [
        Screen::Symptoms,
        Screen::Treatment,
        Screen::Questions,
        Screen::Appointments,
        Screen::Medications,
        Screen::FindHelp,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Screen::Symptoms => "Symptoms",
            Screen::Treatment => "Treatment",
            Screen::Questions => "Q&A",
            Screen::Appointments => "Appointments",
            Screen::Medications => "Medications",
            Screen::FindHelp => "Find Help",
        }
    }
}

pub mod field {
    pub const SYMPTOMS: usize = 0;
    pub const HISTORY: usize = 1;
    pub const ALLERGIES: usize = 2;
    pub const AGE: usize = 3;
    pub const HEIGHT: usize = 4;
    pub const WEIGHT: usize = 5;

    pub const QUESTION: usize = 0;

    pub const TITLE: usize = 0;
    pub const DESCRIPTION: usize = 1;
    pub const DATE: usize = 2;
    pub const TIME: usize = 3;

    pub const NAME: usize = 0;
    pub const DOSAGE: usize = 1;
    pub const TIMINGS: usize = 2;
    pub const DURATION: usize = 3;
    pub const START: usize = 4;

    pub const LOCATION: usize = 0;
    pub const SPECIALTY: usize = 1;
}

/// A finished flow run, sent back from a worker thread.
#[derive(Debug)]
pub enum Reply {
    Symptoms(SymptomReport),
    Treatment(TreatmentReport),
    Answer(FlowOutcome<MedicalAnswer>),
}

/// A short message shown above the footer until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
    pub is_error: bool,
}

impl Notice {
    fn info(title: &str, body: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            body: body.into(),
            is_error: false,
        }
    }

    fn error(title: &str, body: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            body: body.into(),
            is_error: true,
        }
    }
}

// ── Per-screen state ─────────────────────────────────────────────────────────

pub struct SymptomScreen {
    pub form: Form,
    pub report: Option<SymptomReport>,
    /// Highlighted follow-up question.
    pub follow_up: usize,
    pub anonymous: bool,
    pub gate: RequestGate,
}

pub struct TreatmentScreen {
    pub form: Form,
    pub anonymous: bool,
    pub report: Option<TreatmentReport>,
    pub gate: RequestGate,
}

pub struct QuestionScreen {
    pub form: Form,
    pub answer: Option<FlowOutcome<MedicalAnswer>>,
    pub gate: RequestGate,
}

pub struct AppointmentScreen {
    pub form: Form,
    pub kind: AppointmentType,
    pub book: AppointmentBook,
    pub selected: usize,
    pub editing: Option<RecordId>,
}

pub struct MedicationScreen {
    pub form: Form,
    pub after_food: bool,
    pub tracker: MedicationTracker,
    pub selected: usize,
    pub editing: Option<RecordId>,
}

pub struct HelpScreen {
    pub form: Form,
    pub facilities: Vec<MedicalFacility>,
    pub error: Option<String>,
    pub contacts: Vec<EmergencyContact>,
    pub consultations: Vec<OnlineConsultation>,
}

// ── App ──────────────────────────────────────────────────────────────────────

pub struct App {
    pub screen: Screen,
    pub model_name: String,
    /// Read on every save so a session left open past midnight moves on.
    clock: fn() -> NaiveDate,
    pub notice: Option<Notice>,

    pub symptoms: SymptomScreen,
    pub treatment: TreatmentScreen,
    pub questions: QuestionScreen,
    pub appointments: AppointmentScreen,
    pub medications: MedicationScreen,
    pub help: HelpScreen,

    runner: Arc<FlowRunner>,
    tx: Sender<Reply>,
    rx: Receiver<Reply>,
}

impl App {
    pub fn new(runner: FlowRunner, default_medication_days: u32, clock: fn() -> NaiveDate) -> Self {
        let (tx, rx) = mpsc::channel();
        let tracker = MedicationTracker::new(default_medication_days);
        let mut medication_form = Form::new(&[
            "Name",
            "Dosage",
            "Timings",
            "Duration (days)",
            "Start date (YYYY-MM-DD)",
        ]);
        fill_medication_form(&mut medication_form, &tracker.blank_draft(clock()));

        Self {
            screen: Screen::Symptoms,
            model_name: runner.model_name(),
            clock,
            notice: None,
            symptoms: SymptomScreen {
                form: Form::new(&["Symptoms", "Medical history", "Allergies"]),
                report: None,
                follow_up: 0,
                anonymous: false,
                gate: RequestGate::new(),
            },
            treatment: TreatmentScreen {
                form: Form::new(&[
                    "Symptoms",
                    "Medical history",
                    "Allergies",
                    "Age",
                    "Height",
                    "Weight",
                ]),
                anonymous: false,
                report: None,
                gate: RequestGate::new(),
            },
            questions: QuestionScreen {
                form: Form::new(&["Question"]),
                answer: None,
                gate: RequestGate::new(),
            },
            appointments: AppointmentScreen {
                form: Form::new(&["Title", "Description", "Date (YYYY-MM-DD)", "Time"]),
                kind: AppointmentType::default(),
                book: AppointmentBook::new(),
                selected: 0,
                editing: None,
            },
            medications: MedicationScreen {
                form: medication_form,
                after_food: false,
                tracker,
                selected: 0,
                editing: None,
            },
            help: HelpScreen {
                form: Form::new(&["Location (lat,lng)", "Specialty"]),
                facilities: Vec::new(),
                error: None,
                contacts: mock_data::emergency_contacts(),
                consultations: online_consultations(),
            },
            runner: Arc::new(runner),
            tx,
            rx,
        }
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    /// The form on the current screen.
    pub fn form(&self) -> &Form {
        match self.screen {
            Screen::Symptoms => &self.symptoms.form,
            Screen::Treatment => &self.treatment.form,
            Screen::Questions => &self.questions.form,
            Screen::Appointments => &self.appointments.form,
            Screen::Medications => &self.medications.form,
            Screen::FindHelp => &self.help.form,
        }
    }

    fn form_mut(&mut self) -> &mut Form {
        match self.screen {
            Screen::Symptoms => &mut self.symptoms.form,
            Screen::Treatment => &mut self.treatment.form,
            Screen::Questions => &mut self.questions.form,
            Screen::Appointments => &mut self.appointments.form,
            Screen::Medications => &mut self.medications.form,
            Screen::FindHelp => &mut self.help.form,
        }
    }

    /// Whether a model request for the current screen is in flight.
    pub fn is_loading(&self) -> bool {
        match self.screen {
            Screen::Symptoms => self.symptoms.gate.is_loading(),
            Screen::Treatment => self.treatment.gate.is_loading(),
            Screen::Questions => self.questions.gate.is_loading(),
            _ => false,
        }
    }

    /// Apply every reply the workers have sent so far.
    pub fn drain_replies(&mut self) {
        while let Ok(reply) = self.rx.try_recv() {
            self.apply(reply);
        }
    }

    fn apply(&mut self, reply: Reply) {
        match reply {
            Reply::Symptoms(report) => {
                if let Some(reason) = &report.fallback_reason {
                    self.notice = Some(Notice::error("Analysis failed", reason.clone()));
                }
                self.symptoms.follow_up = 0;
                self.symptoms.report = Some(report);
            }
            Reply::Treatment(report) => {
                if let Some(reason) = &report.fallback_reason {
                    self.notice = Some(Notice::error("Recommendation failed", reason.clone()));
                }
                self.treatment.report = Some(report);
            }
            Reply::Answer(outcome) => {
                if let Some(reason) = outcome.fallback_reason() {
                    self.notice = Some(Notice::error("Question failed", reason));
                }
                self.questions.answer = Some(outcome);
            }
        }
    }

    // ── Keys ─────────────────────────────────────────────────────────────────

    /// Handle one key press. Returns `true` when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => return true,
            KeyCode::F(n @ 1..=6) => {
                self.screen = Screen::ALL[usize::from(n - 1)];
            }
            KeyCode::Esc => self.cancel(),
            KeyCode::Tab => self.form_mut().next(),
            KeyCode::BackTab => self.form_mut().prev(),
            KeyCode::Backspace => self.form_mut().backspace(),
            KeyCode::Enter => self.submit(),
            KeyCode::Up => self.move_selection(false),
            KeyCode::Down => self.move_selection(true),
            KeyCode::Char(c) if ctrl => self.screen_command(c),
            KeyCode::Char(c) => self.form_mut().insert(c),
            _ => {}
        }
        false
    }

    fn screen_command(&mut self, c: char) {
        match (self.screen, c) {
            (Screen::Symptoms, 't') => self.hand_off(),
            (Screen::Symptoms, 'f') => self.ask_follow_up(),
            (Screen::Symptoms, 'n') => self.new_analysis(),
            (Screen::Symptoms, 'a') => {
                self.symptoms.anonymous = !self.symptoms.anonymous;
            }
            (Screen::Treatment, 'a') => {
                self.treatment.anonymous = !self.treatment.anonymous;
            }
            (Screen::Appointments, 't') => {
                let all = AppointmentType::ALL;
                let at = all
                    .iter()
                    .position(|k| *k == self.appointments.kind)
                    .unwrap_or(0);
                self.appointments.kind = all[(at + 1) % all.len()];
            }
            (Screen::Appointments, 'e') => self.edit_appointment(),
            (Screen::Appointments, 'd') => self.remove_appointment(),
            (Screen::Medications, 'a') => {
                self.medications.after_food = !self.medications.after_food;
            }
            (Screen::Medications, 'e') => self.edit_medication(),
            (Screen::Medications, 'd') => self.remove_medication(),
            _ => {}
        }
    }

    fn cancel(&mut self) {
        if self.notice.take().is_some() {
            return;
        }
        match self.screen {
            Screen::Appointments => self.reset_appointment_form(),
            Screen::Medications => self.reset_medication_form(),
            _ => {}
        }
    }

    fn move_selection(&mut self, down: bool) {
        let (selected, len) = match self.screen {
            Screen::Symptoms => (
                &mut self.symptoms.follow_up,
                self.symptoms.report.as_ref().map_or(0, |r| r.follow_ups.len()),
            ),
            Screen::Appointments => (&mut self.appointments.selected, self.appointments.book.len()),
            Screen::Medications => (
                &mut self.medications.selected,
                self.medications.tracker.len(),
            ),
            _ => return,
        };
        if len == 0 {
            return;
        }
        *selected = if down {
            (*selected + 1).min(len - 1)
        } else {
            selected.saturating_sub(1)
        };
    }

    fn submit(&mut self) {
        match self.screen {
            Screen::Symptoms => self.submit_symptoms(),
            Screen::Treatment => self.submit_treatment(),
            Screen::Questions => self.submit_question(),
            Screen::Appointments => self.save_appointment(),
            Screen::Medications => self.save_medication(),
            Screen::FindHelp => self.search_facilities(),
        }
    }

    // ── Model-backed screens ─────────────────────────────────────────────────

    /// Run `job` on a worker thread. The gate is released before the reply
    /// is sent, so the screen is idle by the time the reply is applied.
    fn spawn<F>(&self, guard: RequestGuard, job: F)
    where
        F: FnOnce(&FlowRunner) -> Reply + Send + 'static,
    {
        let runner = Arc::clone(&self.runner);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let reply = {
                let _guard = guard;
                job(&runner)
            };
            if tx.send(reply).is_err() {
                debug!("reply dropped after the interface closed");
            }
        });
    }

    fn busy(&mut self) {
        self.notice = Some(Notice::info(
            "Please wait",
            "The previous request is still running.",
        ));
    }

    fn submit_symptoms(&mut self) {
        let Some(guard) = self.symptoms.gate.try_begin() else {
            return self.busy();
        };
        let form = &self.symptoms.form;
        let input = AnalyzeSymptomsInput {
            symptoms: form.value(field::SYMPTOMS).to_string(),
            medical_history: form.value(field::HISTORY).to_string(),
            allergies: form.value(field::ALLERGIES).to_string(),
        };
        if self.symptoms.anonymous {
            info!("symptom analysis submitted in anonymous mode");
        }
        self.spawn(guard, move |runner| {
            Reply::Symptoms(symptom_analyzer::submit_symptoms(runner, &input))
        });
    }

    fn ask_follow_up(&mut self) {
        let Some(question) = self
            .symptoms
            .report
            .as_ref()
            .and_then(|r| r.follow_ups.get(self.symptoms.follow_up))
            .copied()
        else {
            return;
        };
        let symptoms = with_follow_up(self.symptoms.form.value(field::SYMPTOMS), question);
        self.symptoms.form.set(field::SYMPTOMS, symptoms);
        self.submit_symptoms();
    }

    /// Clear the symptom screen for a fresh analysis.
    fn new_analysis(&mut self) {
        if self.symptoms.gate.is_loading() {
            return self.busy();
        }
        let screen = &mut self.symptoms;
        screen.form.clear();
        screen.report = None;
        screen.follow_up = 0;
        self.notice = None;
    }

    /// Carry the symptom form over to the treatment screen. Offered once any
    /// analysis has come back, failed ones included.
    fn hand_off(&mut self) {
        if self.symptoms.report.is_none() {
            return;
        }
        let form = &self.symptoms.form;
        let link = hand_off_to_treatment(
            form.value(field::SYMPTOMS),
            form.value(field::HISTORY),
            form.value(field::ALLERGIES),
        );
        match parse_handoff(&link) {
            Ok(params) => {
                let prefilled = TreatmentForm::from_handoff(params);
                let target = &mut self.treatment.form;
                target.set(field::SYMPTOMS, prefilled.symptoms);
                target.set(field::HISTORY, prefilled.medical_history);
                target.set(field::ALLERGIES, prefilled.allergies);
                target.focus = field::AGE;
                self.screen = Screen::Treatment;
            }
            Err(e) => self.notice = Some(Notice::error("Hand-off failed", e.to_string())),
        }
    }

    fn submit_treatment(&mut self) {
        let form = &self.treatment.form;
        let typed = TreatmentForm {
            symptoms: form.value(field::SYMPTOMS).to_string(),
            medical_history: form.value(field::HISTORY).to_string(),
            allergies: form.value(field::ALLERGIES).to_string(),
            age: form.value(field::AGE).to_string(),
            height: form.value(field::HEIGHT).to_string(),
            weight: form.value(field::WEIGHT).to_string(),
            anonymous: self.treatment.anonymous,
        };
        let input = match typed.to_input() {
            Ok(input) => input,
            Err(e) => {
                self.notice = Some(Notice::error("Check the form", user_message(&e)));
                return;
            }
        };
        let Some(guard) = self.treatment.gate.try_begin() else {
            return self.busy();
        };
        self.spawn(guard, move |runner| {
            Reply::Treatment(treatment_advisor::request_treatment(runner, &input))
        });
    }

    fn submit_question(&mut self) {
        let Some(guard) = self.questions.gate.try_begin() else {
            return self.busy();
        };
        let question = self.questions.form.value(field::QUESTION).to_string();
        self.spawn(guard, move |runner| Reply::Answer(medical_qa::ask(runner, &question)));
    }

    // ── Appointments ─────────────────────────────────────────────────────────

    fn appointment_draft(&self) -> AppointmentDraft {
        let form = &self.appointments.form;
        AppointmentDraft {
            title: form.value(field::TITLE).to_string(),
            description: form.value(field::DESCRIPTION).to_string(),
            date: form.value(field::DATE).to_string(),
            time: form.value(field::TIME).to_string(),
            kind: Some(self.appointments.kind),
        }
    }

    fn save_appointment(&mut self) {
        let draft = self.appointment_draft();
        let today = self.today();
        let screen = &mut self.appointments;
        let result = match screen.editing {
            Some(id) => screen.book.update(id, &draft, today).map(|()| {
                Notice::info(
                    "Appointment Updated",
                    format!("{} has been updated in your calendar.", draft.title.trim()),
                )
            }),
            None => screen.book.add(&draft, today).map(|_| {
                Notice::info(
                    "Appointment Scheduled",
                    format!("{} has been added to your calendar.", draft.title.trim()),
                )
            }),
        };
        match result {
            Ok(notice) => {
                self.notice = Some(notice);
                self.reset_appointment_form();
            }
            Err(e) => self.notice = Some(Notice::error("Missing information", user_message(&e))),
        }
    }

    fn edit_appointment(&mut self) {
        let screen = &mut self.appointments;
        let Some(appt) = screen.book.list().get(screen.selected) else {
            return;
        };
        let draft = appointments::draft_from(appt);
        screen.editing = Some(appt.id);
        screen.kind = draft.kind.unwrap_or_default();
        screen.form.set(field::TITLE, draft.title);
        screen.form.set(field::DESCRIPTION, draft.description);
        screen.form.set(field::DATE, draft.date);
        screen.form.set(field::TIME, draft.time);
        screen.form.focus = 0;
    }

    fn remove_appointment(&mut self) {
        let screen = &mut self.appointments;
        let Some(id) = screen.book.list().get(screen.selected).map(|a| a.id) else {
            return;
        };
        if let Err(e) = screen.book.remove(id) {
            self.notice = Some(Notice::error("Remove failed", e.to_string()));
            return;
        }
        if screen.editing == Some(id) {
            screen.editing = None;
            screen.form.clear();
        }
        screen.selected = screen.selected.min(screen.book.len().saturating_sub(1));
        self.notice = Some(Notice::info(
            "Appointment Removed",
            "Appointment has been removed from your calendar.",
        ));
    }

    fn reset_appointment_form(&mut self) {
        let screen = &mut self.appointments;
        screen.form.clear();
        screen.kind = AppointmentType::default();
        screen.editing = None;
    }

    // ── Medications ──────────────────────────────────────────────────────────

    fn medication_draft(&self) -> MedicationDraft {
        let form = &self.medications.form;
        MedicationDraft {
            name: form.value(field::NAME).to_string(),
            dosage: form.value(field::DOSAGE).to_string(),
            timings: form.value(field::TIMINGS).to_string(),
            after_food: self.medications.after_food,
            duration_days: form.value(field::DURATION).to_string(),
            start_date: form.value(field::START).to_string(),
        }
    }

    fn save_medication(&mut self) {
        let draft = self.medication_draft();
        let screen = &mut self.medications;
        let result = match screen.editing {
            Some(id) => screen.tracker.update(id, &draft).map(|()| {
                Notice::info(
                    "Medication Updated",
                    format!("{} has been updated in your medication list.", draft.name.trim()),
                )
            }),
            None => screen.tracker.add(&draft).map(|_| {
                Notice::info(
                    "Medication Added",
                    format!("{} has been added to your medication list.", draft.name.trim()),
                )
            }),
        };
        match result {
            Ok(notice) => {
                self.notice = Some(notice);
                self.reset_medication_form();
            }
            Err(e) => self.notice = Some(Notice::error("Missing information", user_message(&e))),
        }
    }

    fn edit_medication(&mut self) {
        let screen = &mut self.medications;
        let Some(med) = screen.tracker.list().get(screen.selected) else {
            return;
        };
        let draft = medications::draft_from(med);
        screen.editing = Some(med.id);
        screen.after_food = draft.after_food;
        fill_medication_form(&mut screen.form, &draft);
        screen.form.focus = 0;
    }

    fn remove_medication(&mut self) {
        let screen = &mut self.medications;
        let Some(id) = screen.tracker.list().get(screen.selected).map(|m| m.id) else {
            return;
        };
        if let Err(e) = screen.tracker.remove(id) {
            self.notice = Some(Notice::error("Remove failed", e.to_string()));
            return;
        }
        if screen.editing == Some(id) {
            self.reset_medication_form();
        }
        let screen = &mut self.medications;
        screen.selected = screen.selected.min(screen.tracker.len().saturating_sub(1));
        self.notice = Some(Notice::info(
            "Medication Removed",
            "Medication has been removed from your medication list.",
        ));
    }

    fn reset_medication_form(&mut self) {
        let today = self.today();
        let screen = &mut self.medications;
        let blank = screen.tracker.blank_draft(today);
        fill_medication_form(&mut screen.form, &blank);
        screen.form.focus = 0;
        screen.after_food = false;
        screen.editing = None;
    }

    // ── Find help ────────────────────────────────────────────────────────────

    fn search_facilities(&mut self) {
        let location_text = self.help.form.value(field::LOCATION).trim().to_string();
        let specialty = self.help.form.value(field::SPECIALTY).trim().to_string();

        let location = if location_text.is_empty() {
            Ok(None)
        } else {
            parse_location(&location_text).map(Some)
        };
        let result = location.and_then(|loc| {
            mock_data::medical_facilities(loc, Some(specialty.as_str()).filter(|s| !s.is_empty()))
        });

        match result {
            Ok(found) => {
                self.help.facilities = found;
                self.help.error = None;
            }
            Err(e) => {
                self.help.facilities.clear();
                self.help.error = Some(user_message(&e));
            }
        }
    }
}

fn fill_medication_form(form: &mut Form, draft: &MedicationDraft) {
    form.set(field::NAME, draft.name.clone());
    form.set(field::DOSAGE, draft.dosage.clone());
    form.set(field::TIMINGS, draft.timings.clone());
    form.set(field::DURATION, draft.duration_days.clone());
    form.set(field::START, draft.start_date.clone());
}

/// The part of an error worth showing on a form.
fn user_message(err: &MedaiError) -> String {
    match err {
        MedaiError::InvalidInput { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicU32, Ordering as AtomicOrdering},
        time::Duration,
    };

    use medai_model::MockModelClient;
    use medai_navigator::{build_runner, mock_data::LOCATION_REQUIRED, mock_data::offline_model};

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()
    }

    fn make_app() -> App {
        App::new(build_runner(Box::new(offline_model())), 7, today)
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(app: &mut App, c: char) -> bool {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    /// Block until one worker reply arrives, then apply it.
    fn wait_for_reply(app: &mut App) {
        let reply = app
            .rx
            .recv_timeout(Duration::from_secs(5))
            .expect("worker reply");
        app.apply(reply);
    }

    // ── Navigation ───────────────────────────────────────────────────────────

    #[test]
    fn function_keys_select_screens_and_ctrl_q_quits() {
        let mut app = make_app();
        assert!(!press(&mut app, KeyCode::F(5)));
        assert_eq!(app.screen, Screen::Medications);
        press(&mut app, KeyCode::F(6));
        assert_eq!(app.screen, Screen::FindHelp);
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert!(ctrl(&mut app, 'q'));
    }

    // ── Symptoms ─────────────────────────────────────────────────────────────

    #[test]
    fn symptoms_analyzed_on_worker_and_gate_cleared() {
        let mut app = make_app();
        type_text(&mut app, "runny nose");
        press(&mut app, KeyCode::Enter);
        wait_for_reply(&mut app);

        let report = app.symptoms.report.as_ref().unwrap();
        assert!(!report.is_fallback());
        assert_eq!(report.follow_ups.len(), 3);
        assert!(!app.is_loading());
        assert!(app.notice.is_none());
    }

    /// A second submit while one is in flight sends nothing.
    #[test]
    fn submit_while_busy_is_ignored() {
        let mut app = make_app();
        let _held = app.symptoms.gate.try_begin().unwrap();
        type_text(&mut app, "cough");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.notice.as_ref().unwrap().title, "Please wait");
        assert!(app.rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn model_failure_shows_notice_and_fallback() {
        let mut app = App::new(build_runner(Box::new(MockModelClient::unreachable())), 7, today);
        type_text(&mut app, "dizzy");
        press(&mut app, KeyCode::Enter);
        wait_for_reply(&mut app);

        assert!(app.symptoms.report.as_ref().unwrap().is_fallback());
        assert!(app.notice.as_ref().unwrap().is_error);
        assert!(!app.symptoms.gate.is_loading());
    }

    #[test]
    fn follow_up_appends_question_and_resubmits() {
        let mut app = make_app();
        type_text(&mut app, "headache");
        press(&mut app, KeyCode::Enter);
        wait_for_reply(&mut app);

        press(&mut app, KeyCode::Down);
        ctrl(&mut app, 'f');
        let expected = with_follow_up("headache", symptom_analyzer::FOLLOW_UP_QUESTIONS[1]);
        assert_eq!(app.symptoms.form.value(field::SYMPTOMS), expected);
        wait_for_reply(&mut app);
        assert!(app.symptoms.report.is_some());
    }

    #[test]
    fn hand_off_prefills_treatment_form() {
        let mut app = make_app();
        type_text(&mut app, "sore throat & fever");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "asthma");
        press(&mut app, KeyCode::Enter);
        wait_for_reply(&mut app);

        ctrl(&mut app, 't');
        assert_eq!(app.screen, Screen::Treatment);
        assert_eq!(app.treatment.form.value(field::SYMPTOMS), "sore throat & fever");
        assert_eq!(app.treatment.form.value(field::HISTORY), "asthma");
        assert_eq!(app.treatment.form.focus, field::AGE);
    }

    /// A failed analysis still leaves the typed symptoms worth carrying over.
    #[test]
    fn hand_off_works_after_failed_analysis() {
        let mut app = App::new(build_runner(Box::new(MockModelClient::unreachable())), 7, today);
        type_text(&mut app, "chest pain & dizziness");
        press(&mut app, KeyCode::Enter);
        wait_for_reply(&mut app);
        assert!(app.symptoms.report.as_ref().unwrap().is_fallback());

        press(&mut app, KeyCode::Esc);
        ctrl(&mut app, 't');
        assert_eq!(app.screen, Screen::Treatment);
        assert_eq!(app.treatment.form.value(field::SYMPTOMS), "chest pain & dizziness");
    }

    #[test]
    fn hand_off_needs_an_analysis_first() {
        let mut app = make_app();
        type_text(&mut app, "cough");
        ctrl(&mut app, 't');
        assert_eq!(app.screen, Screen::Symptoms);
        assert_eq!(app.treatment.form.value(field::SYMPTOMS), "");
    }

    #[test]
    fn new_analysis_clears_screen() {
        let mut app = make_app();
        type_text(&mut app, "cough");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "asthma");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "penicillin");
        press(&mut app, KeyCode::Enter);
        wait_for_reply(&mut app);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.symptoms.follow_up, 1);

        ctrl(&mut app, 'n');
        assert!(app.symptoms.report.is_none());
        assert_eq!(app.symptoms.follow_up, 0);
        for index in [field::SYMPTOMS, field::HISTORY, field::ALLERGIES] {
            assert_eq!(app.symptoms.form.value(index), "");
        }
        assert_eq!(app.symptoms.form.focus, field::SYMPTOMS);
    }

    #[test]
    fn new_analysis_waits_for_request_in_flight() {
        let mut app = make_app();
        type_text(&mut app, "cough");
        let _held = app.symptoms.gate.try_begin().unwrap();
        ctrl(&mut app, 'n');
        assert_eq!(app.symptoms.form.value(field::SYMPTOMS), "cough");
        assert_eq!(app.notice.as_ref().unwrap().title, "Please wait");
    }

    /// Anonymous mode is local to the screen; the prompt sent is the same.
    #[test]
    fn symptom_anonymous_toggle_leaves_prompt_unchanged() {
        let model = offline_model();
        let requests = model.requests();
        let mut app = App::new(build_runner(Box::new(model)), 7, today);
        assert!(!app.symptoms.anonymous);

        type_text(&mut app, "cough");
        press(&mut app, KeyCode::Enter);
        wait_for_reply(&mut app);

        ctrl(&mut app, 'a');
        assert!(app.symptoms.anonymous);
        press(&mut app, KeyCode::Enter);
        wait_for_reply(&mut app);
        assert!(!app.symptoms.report.as_ref().unwrap().is_fallback());

        let sent = requests.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].prompt, sent[1].prompt);
        drop(sent);

        ctrl(&mut app, 'a');
        assert!(!app.symptoms.anonymous);
    }

    // ── Treatment ────────────────────────────────────────────────────────────

    #[test]
    fn bad_age_is_reported_without_a_request() {
        let mut app = make_app();
        press(&mut app, KeyCode::F(2));
        type_text(&mut app, "cough");
        app.treatment.form.set(field::AGE, "thirty");
        press(&mut app, KeyCode::Enter);

        let notice = app.notice.as_ref().unwrap();
        assert!(notice.is_error);
        assert!(notice.body.contains("thirty"));
        assert!(app.rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn treatment_report_carries_links() {
        let mut app = make_app();
        press(&mut app, KeyCode::F(2));
        type_text(&mut app, "sore throat");
        app.treatment.form.set(field::AGE, "30");
        ctrl(&mut app, 'a');
        assert!(app.treatment.anonymous);
        press(&mut app, KeyCode::Enter);
        wait_for_reply(&mut app);

        let report = app.treatment.report.as_ref().unwrap();
        assert!(!report.medication_links.is_empty());
        assert_eq!(report.percent, 70);
    }

    // ── Planner ──────────────────────────────────────────────────────────────

    fn fill_appointment(app: &mut App, title: &str) {
        let form = &mut app.appointments.form;
        form.set(field::TITLE, title);
        form.set(field::DESCRIPTION, "Checkup");
        form.set(field::DATE, "2026-05-10");
        form.set(field::TIME, "09:00");
    }

    #[test]
    fn appointment_add_edit_remove() {
        let mut app = make_app();
        press(&mut app, KeyCode::F(4));

        fill_appointment(&mut app, "Dentist");
        ctrl(&mut app, 't');
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.appointments.book.len(), 1);
        assert_eq!(app.appointments.book.list()[0].kind, AppointmentType::Video);
        assert_eq!(app.notice.as_ref().unwrap().title, "Appointment Scheduled");
        assert_eq!(app.appointments.form.value(field::TITLE), "");

        ctrl(&mut app, 'e');
        app.appointments.form.set(field::TITLE, "Dentist (moved)");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.appointments.book.list()[0].title, "Dentist (moved)");
        assert_eq!(app.notice.as_ref().unwrap().title, "Appointment Updated");

        ctrl(&mut app, 'd');
        assert!(app.appointments.book.is_empty());
        assert_eq!(app.notice.as_ref().unwrap().title, "Appointment Removed");
    }

    #[test]
    fn incomplete_appointment_is_not_added() {
        let mut app = make_app();
        press(&mut app, KeyCode::F(4));
        fill_appointment(&mut app, "");
        press(&mut app, KeyCode::Enter);
        assert!(app.appointments.book.is_empty());
        assert!(app.notice.as_ref().unwrap().is_error);
    }

    #[test]
    fn medication_form_resets_to_default_duration() {
        let mut app = make_app();
        press(&mut app, KeyCode::F(5));
        assert_eq!(app.medications.form.value(field::DURATION), "7");
        assert_eq!(app.medications.form.value(field::START), "2026-05-01");

        let form = &mut app.medications.form;
        form.set(field::NAME, "Ibuprofen");
        form.set(field::DOSAGE, "200mg");
        form.set(field::TIMINGS, "Morning");
        form.set(field::DURATION, "3");
        ctrl(&mut app, 'a');
        press(&mut app, KeyCode::Enter);

        let med = &app.medications.tracker.list()[0];
        assert_eq!(med.duration_days, 3);
        assert!(med.after_food);
        assert_eq!(app.medications.form.value(field::DURATION), "7");
        assert!(!app.medications.after_food);
        assert_eq!(
            app.notice.as_ref().unwrap().body,
            "Ibuprofen has been added to your medication list."
        );
    }

    static DAY: AtomicU32 = AtomicU32::new(1);

    fn may_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, DAY.load(AtomicOrdering::SeqCst)).unwrap()
    }

    /// The date bound comes from the clock at save time, not at startup.
    #[test]
    fn appointment_dates_follow_the_clock() {
        let mut app = App::new(build_runner(Box::new(offline_model())), 7, may_day);
        press(&mut app, KeyCode::F(4));
        DAY.store(20, AtomicOrdering::SeqCst);

        fill_appointment(&mut app, "Dentist");
        press(&mut app, KeyCode::Enter);
        assert!(app.appointments.book.is_empty());
        assert!(app.notice.as_ref().unwrap().body.contains("in the past"));

        press(&mut app, KeyCode::F(5));
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.medications.form.value(field::START), "2026-05-20");
    }

    // ── Find help ────────────────────────────────────────────────────────────

    #[test]
    fn facility_search_needs_location() {
        let mut app = make_app();
        press(&mut app, KeyCode::F(6));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.help.error.as_deref(), Some(LOCATION_REQUIRED));

        type_text(&mut app, "12.97,77.59");
        press(&mut app, KeyCode::Enter);
        assert!(app.help.error.is_none());
        assert_eq!(app.help.facilities.len(), 1);
    }
}
