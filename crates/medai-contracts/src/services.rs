//! Records returned by the auxiliary health services and the help directory.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub name: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetrics {
    /// Systolic/diastolic, e.g. "120/80".
    pub blood_pressure: String,
    pub heart_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub name: String,
    pub url: String,
}

/// A point on the map in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoLocation {
    pub lat: f64,
    pub lng: f64,
}

/// A hospital or clinic near the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalFacility {
    pub name: String,
    pub address: String,
    pub phone_number: String,
    pub rating: f64,
    /// Kilometres from the search location.
    pub distance: f64,
    pub location: GeoLocation,
}

/// An online doctor consultation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineConsultation {
    pub name: String,
    pub url: String,
    pub region: String,
}

/// The stub answer service's reply, which echoes the question back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StubAnswer {
    pub question: String,
    pub answer: String,
    pub sources: Vec<String>,
}
