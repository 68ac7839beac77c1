//! Placeholder health services.
//!
//! Every function here returns fixed, fictional data and logs that it did
//! so. They stand in for real providers that have not been connected yet.

use serde_json::json;
use tracing::debug;

use medai_contracts::{
    error::{MedaiError, MedaiResult},
    services::{
        EmergencyContact, GeoLocation, HealthMetrics, HealthReport, MedicalFacility,
        MedicalRecord, StubAnswer,
    },
};
use medai_model::MockModelClient;

use crate::flows::{medical_qa, symptom_analyzer, treatment_advisor};

/// Shown when a facility search has no location to search around.
pub const LOCATION_REQUIRED: &str =
    "Please allow location access or enter your location manually.";

/// Largest offset, in degrees, between the search point and a facility.
const MAX_JITTER_DEG: f64 = 0.05;

// ── Personal records ─────────────────────────────────────────────────────────

pub fn emergency_contacts() -> Vec<EmergencyContact> {
    debug!("placeholder emergency contacts");
    vec![EmergencyContact {
        name: "Example Emergency Contact".to_string(),
        phone_number: "555-123-4567".to_string(),
    }]
}

pub fn health_metrics() -> HealthMetrics {
    debug!("placeholder health metrics");
    HealthMetrics {
        blood_pressure: "120/80".to_string(),
        heart_rate: 72,
    }
}

pub fn health_reports() -> Vec<HealthReport> {
    debug!("placeholder health reports");
    vec![HealthReport {
        name: "Example Health Report".to_string(),
        url: "https://example.com".to_string(),
    }]
}

pub fn medical_records() -> Vec<MedicalRecord> {
    debug!("placeholder medical records");
    vec![MedicalRecord {
        name: "Example Medical Record".to_string(),
        url: "https://example.com".to_string(),
    }]
}

/// The canned answer service. Echoes the question.
pub fn medical_answer(question: &str) -> StubAnswer {
    debug!(question, "placeholder medical answer");
    StubAnswer {
        question: question.to_string(),
        answer: "This is an example answer.".to_string(),
        sources: vec!["https://example.com".to_string()],
    }
}

// ── Facility locator ─────────────────────────────────────────────────────────

/// Parse a typed `lat,lng` pair, e.g. `"12.97, 77.59"`.
pub fn parse_location(text: &str) -> MedaiResult<GeoLocation> {
    let invalid = |reason: &str| MedaiError::invalid("location", reason);

    let (lat, lng) = text
        .split_once(',')
        .ok_or_else(|| invalid("expected 'lat,lng'"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| invalid("latitude is not a number"))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|_| invalid("longitude is not a number"))?;

    if !(-90.0..=90.0).contains(&lat) {
        return Err(invalid("latitude must be between -90 and 90"));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(invalid("longitude must be between -180 and 180"));
    }
    Ok(GeoLocation { lat, lng })
}

/// Facilities near `location`, optionally filtered by `specialty`.
///
/// The placeholder data ignores the specialty. A missing location is an
/// error carrying [`LOCATION_REQUIRED`].
pub fn medical_facilities(
    location: Option<GeoLocation>,
    specialty: Option<&str>,
) -> MedaiResult<Vec<MedicalFacility>> {
    let origin =
        location.ok_or_else(|| MedaiError::invalid("location", LOCATION_REQUIRED))?;
    debug!(lat = origin.lat, lng = origin.lng, ?specialty, "placeholder facility search");

    let name = "Example Hospital";
    Ok(vec![MedicalFacility {
        name: name.to_string(),
        address: "123 Main St".to_string(),
        phone_number: "555-123-4567".to_string(),
        rating: 4.5,
        distance: 1.2,
        location: near(origin, name),
    }])
}

/// `origin` shifted by a stable per-name offset of at most `MAX_JITTER_DEG`.
fn near(origin: GeoLocation, name: &str) -> GeoLocation {
    let hash = fnv1a(name.as_bytes());
    let unit = |bits: u64| (bits & 0xFFFF) as f64 / f64::from(0xFFFF_u32) * 2.0 - 1.0;
    GeoLocation {
        lat: origin.lat + unit(hash) * MAX_JITTER_DEG,
        lng: origin.lng + unit(hash >> 16) * MAX_JITTER_DEG,
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
    })
}

// ── Offline model ────────────────────────────────────────────────────────────

/// A scripted model with one plausible reply per flow, for running the
/// front ends without a model endpoint.
pub fn offline_model() -> MockModelClient {
    let analysis = json!({
        "conditions": [
            {
                "condition": "Common cold",
                "confidence": 0.62,
                "recommendations": "Rest, drink fluids, and see a doctor if fever lasts more than three days."
            },
            {
                "condition": "Seasonal allergies",
                "confidence": 0.35,
                "recommendations": "Avoid known triggers; an over-the-counter antihistamine may help."
            }
        ]
    });
    let prescription = json!({
        "prescription": "**Likely diagnosis:** Upper respiratory infection\n\n\
**Medications:**\n\
1. **Paracetamol** 500mg\n\
* Dosage: one tablet every 6 hours as needed\n\
* Duration: 3 days\n\
2. **Cetirizine** 10mg\n\
* Dosage: one tablet at night\n\n\
**Warning signs:**\n\
- Severe breathing difficulty needs urgent care\n\
- Mild sore throat is expected",
        "confidenceLevel": 0.7,
        "disclaimer": "This is not medical advice. Consult a qualified doctor before taking any medication."
    });
    let answer = json!({
        "answer": "Most adults need 7 to 9 hours of sleep per night.",
        "sources": ["https://www.cdc.gov/sleep"]
    });

    MockModelClient::new(answer.to_string())
        .with_flow_response(symptom_analyzer::FLOW_NAME, analysis.to_string())
        .with_flow_response(treatment_advisor::FLOW_NAME, prescription.to_string())
        .with_flow_response(medical_qa::FLOW_NAME, answer.to_string())
}

#[cfg(test)]
mod tests {
    use medai_contracts::flow::AnalyzeSymptomsInput;

    use crate::flows::build_runner;
    use crate::risk::RiskLevel;

    use super::*;

    // ── Fixed payloads ───────────────────────────────────────────────────────

    #[test]
    fn fixed_payloads_match_placeholder_values() {
        assert_eq!(emergency_contacts()[0].phone_number, "555-123-4567");
        assert_eq!(health_metrics().heart_rate, 72);
        assert_eq!(health_metrics().blood_pressure, "120/80");
        assert_eq!(health_reports()[0].name, "Example Health Report");
        assert_eq!(medical_records()[0].name, "Example Medical Record");
    }

    #[test]
    fn stub_answer_echoes_question() {
        let reply = medical_answer("Is coffee bad?");
        assert_eq!(reply.question, "Is coffee bad?");
        assert_eq!(reply.answer, "This is an example answer.");
        assert_eq!(reply.sources, vec!["https://example.com".to_string()]);
    }

    #[test]
    fn records_serialize_with_camel_case_keys() {
        let value = serde_json::to_value(&emergency_contacts()[0]).unwrap();
        assert!(value.get("phoneNumber").is_some());
    }

    // ── Facility locator ─────────────────────────────────────────────────────

    #[test]
    fn parse_location_accepts_spaced_pair() {
        let loc = parse_location(" 12.97 , 77.59 ").unwrap();
        assert_eq!(loc, GeoLocation { lat: 12.97, lng: 77.59 });
    }

    #[test]
    fn parse_location_rejects_bad_text() {
        for text in ["", "12.97", "north,east", "95,10", "10,181"] {
            assert!(parse_location(text).is_err(), "{text:?} should be rejected");
        }
    }

    /// Searching without a location reports the manual-entry message.
    #[test]
    fn search_without_location_is_rejected() {
        let err = medical_facilities(None, Some("cardiology")).unwrap_err();
        assert!(err.to_string().contains(LOCATION_REQUIRED));
    }

    /// Facilities sit within the jitter bound and land in the same spot each time.
    #[test]
    fn facility_is_placed_near_search_point() {
        let origin = GeoLocation { lat: 40.0, lng: -74.0 };
        let first = medical_facilities(Some(origin), None).unwrap();
        let again = medical_facilities(Some(origin), Some("dentist")).unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].name, "Example Hospital");
        assert_eq!(first[0].rating, 4.5);
        assert_eq!(first[0].location, again[0].location);
        assert!((first[0].location.lat - origin.lat).abs() <= MAX_JITTER_DEG);
        assert!((first[0].location.lng - origin.lng).abs() <= MAX_JITTER_DEG);
    }

    // ── Offline model ────────────────────────────────────────────────────────

    #[test]
    fn offline_model_drives_symptom_flow() {
        let runner = build_runner(Box::new(offline_model()));
        let report = symptom_analyzer::submit_symptoms(
            &runner,
            &AnalyzeSymptomsInput {
                symptoms: "runny nose".to_string(),
                ..Default::default()
            },
        );
        assert!(!report.is_fallback());
        assert_eq!(report.analysis.conditions[0].condition, "Common cold");
        assert_eq!(report.risk, RiskLevel::Moderate);
    }

    #[test]
    fn offline_model_answers_questions() {
        let runner = build_runner(Box::new(offline_model()));
        let outcome = medical_qa::ask(&runner, "How much sleep?");
        assert!(!outcome.is_fallback());
        assert_eq!(outcome.output().sources.len(), 1);
    }
}
