//! Carrying the symptom form over to the treatment form.
//!
//! The symptom screen builds a link to the treatment route with the three
//! shared fields as query parameters; the treatment screen reads them back.
//! Links look like
//! `/treatment-recommendations?symptoms=sore+throat&medicalHistory=&allergies=penicillin`.

use tracing::debug;
use url::{form_urlencoded, Url};

use medai_contracts::error::{MedaiError, MedaiResult};

pub const TREATMENT_ROUTE: &str = "/treatment-recommendations";

const SYMPTOMS: &str = "symptoms";
const MEDICAL_HISTORY: &str = "medicalHistory";
const ALLERGIES: &str = "allergies";

/// The fields handed from the symptom form to the treatment form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandoffParams {
    pub symptoms: String,
    pub medical_history: String,
    pub allergies: String,
}

impl HandoffParams {
    pub fn new(
        symptoms: impl Into<String>,
        medical_history: impl Into<String>,
        allergies: impl Into<String>,
    ) -> Self {
        Self {
            symptoms: symptoms.into(),
            medical_history: medical_history.into(),
            allergies: allergies.into(),
        }
    }

    /// The treatment-route link carrying these fields.
    pub fn to_link(&self) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(SYMPTOMS, &self.symptoms)
            .append_pair(MEDICAL_HISTORY, &self.medical_history)
            .append_pair(ALLERGIES, &self.allergies)
            .finish();
        format!("{TREATMENT_ROUTE}?{query}")
    }
}

/// Build the link that opens the treatment form pre-filled.
pub fn hand_off_to_treatment(symptoms: &str, medical_history: &str, allergies: &str) -> String {
    HandoffParams::new(symptoms, medical_history, allergies).to_link()
}

/// Read hand-off fields back from a link.
///
/// Accepts an absolute URL, a path with a query, or a bare query string.
/// `+` and `%20` both decode to a space. Missing parameters are empty; if a
/// parameter repeats, the first occurrence wins.
///
/// # Errors
///
/// `Handoff` if the link is empty, is not a URL, or points at a route other
/// than the treatment form.
pub fn parse_handoff(link: &str) -> MedaiResult<HandoffParams> {
    let link = link.trim();
    if link.is_empty() {
        return Err(MedaiError::Handoff {
            reason: "hand-off link is empty".to_string(),
        });
    }

    let (path, query) = if link.contains("://") {
        let url = Url::parse(link).map_err(|e| MedaiError::Handoff {
            reason: format!("'{link}' is not a valid URL: {e}"),
        })?;
        (Some(url.path().to_string()), url.query().unwrap_or("").to_string())
    } else if link.starts_with('/') {
        match link.split_once('?') {
            Some((path, query)) => (Some(path.to_string()), query.to_string()),
            None => (Some(link.to_string()), String::new()),
        }
    } else {
        (None, link.trim_start_matches('?').to_string())
    };

    if let Some(path) = path {
        let path = path.trim_end_matches('/');
        if path != TREATMENT_ROUTE {
            return Err(MedaiError::Handoff {
                reason: format!("'{path}' is not the treatment route '{TREATMENT_ROUTE}'"),
            });
        }
    }

    let mut params = HandoffParams::default();
    let mut seen = [false; 3];
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let slot = match key.as_ref() {
            SYMPTOMS => 0,
            MEDICAL_HISTORY => 1,
            ALLERGIES => 2,
            _ => continue,
        };
        if seen[slot] {
            continue;
        }
        seen[slot] = true;
        let value = value.into_owned();
        match slot {
            0 => params.symptoms = value,
            1 => params.medical_history = value,
            _ => params.allergies = value,
        }
    }

    debug!(
        has_symptoms = !params.symptoms.is_empty(),
        has_history = !params.medical_history.is_empty(),
        has_allergies = !params.allergies.is_empty(),
        "hand-off parsed"
    );
    Ok(params)
}
