//! Finding medications in a prescription and linking them to online pharmacies.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::form_urlencoded::byte_serialize;

/// Common drugs and brands recognised by name.
pub const KNOWN_MEDICATIONS: &[&str] = &[
    "acetaminophen",
    "paracetamol",
    "ibuprofen",
    "aspirin",
    "diphenhydramine",
    "loratadine",
    "cetirizine",
    "pseudoephedrine",
    "guaifenesin",
    "dextromethorphan",
    "amoxicillin",
    "azithromycin",
    "omeprazole",
    "ranitidine",
    "famotidine",
    "simvastatin",
    "atorvastatin",
    "lisinopril",
    "metformin",
    "albuterol",
    "fluticasone",
    "prednisone",
    "metoprolol",
    "amlodipine",
    "losartan",
    "fluoxetine",
    "sertraline",
    "citalopram",
    "escitalopram",
    "bupropion",
    "advil",
    "tylenol",
    "motrin",
    "benadryl",
    "zyrtec",
    "claritin",
    "pepto-bismol",
    "tums",
    "prilosec",
    "nexium",
    "zantac",
];

static KNOWN_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    KNOWN_MEDICATIONS
        .iter()
        .filter_map(|med| {
            Regex::new(&format!(r"(?i)\b{}\b", regex::escape(med)))
                .ok()
                .map(|re| (*med, re))
        })
        .collect()
});

/// `**Name** 500mg` and similar: a bold name followed by a dose in mg.
static DOSED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*\s+\d+mg").expect("dosed-name pattern is valid"));

/// A medication found in a prescription, with pharmacy search links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationLink {
    pub name: String,
    pub apollo_url: String,
    pub medplus_url: String,
    pub netmeds_url: String,
}

impl MedicationLink {
    fn for_name(raw: &str) -> Self {
        let query: String = byte_serialize(raw.as_bytes()).collect();
        Self {
            name: capitalize(raw),
            apollo_url: format!("https://www.apollopharmacy.in/search-medicines/{query}"),
            medplus_url: format!("https://www.medplusmart.com/search/product?text={query}"),
            netmeds_url: format!("https://www.netmeds.com/catalogsearch/result/{query}/all"),
        }
    }
}

/// Every distinct medication mentioned in `prescription`.
///
/// Known names come first in list order, then unknown bold-and-dosed names
/// in text order. Names are compared case-insensitively and reported with
/// the first letter capitalised.
pub fn extract_medication_links(prescription: &str) -> Vec<MedicationLink> {
    let mut found: Vec<MedicationLink> = Vec::new();
    let mut push = |link: MedicationLink| {
        if !found.iter().any(|f| f.name.eq_ignore_ascii_case(&link.name)) {
            found.push(link);
        }
    };

    for (med, re) in KNOWN_PATTERNS.iter() {
        if re.is_match(prescription) {
            push(MedicationLink::for_name(med));
        }
    }

    for caps in DOSED_NAME.captures_iter(prescription) {
        let Some(first_word) = caps[1].split_whitespace().next() else {
            continue;
        };
        let lower = first_word.to_lowercase();
        if KNOWN_MEDICATIONS.contains(&lower.as_str()) {
            continue;
        }
        push(MedicationLink::for_name(first_word));
    }

    found
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
