//! Plain-text output for the terminal.

use medai_contracts::services::{MedicalFacility, OnlineConsultation};
use medai_navigator::{
    flows::{symptom_analyzer::SymptomReport, treatment_advisor::TreatmentReport},
    prescription::{plain_text, PrescriptionLine, Tone},
    risk::confidence_percent,
};

pub fn symptom_report(report: &SymptomReport, handoff_link: &str) {
    println!("Risk level: {}  ({})", report.risk, report.urgency);
    println!();
    for (i, c) in report.analysis.conditions.iter().enumerate() {
        println!(
            "{}. {}  [{}%]",
            i + 1,
            c.condition,
            confidence_percent(c.confidence)
        );
        println!("   {}", c.recommendations);
    }

    if let Some(reason) = &report.fallback_reason {
        println!();
        println!("(analysis unavailable: {reason})");
        return;
    }

    if !report.follow_ups.is_empty() {
        println!();
        println!("Follow-up questions (re-run with --follow-up N):");
        for (i, q) in report.follow_ups.iter().enumerate() {
            println!("  {}. {q}", i + 1);
        }
    }
    println!();
    println!("Treatment advice: medai treat --handoff '{handoff_link}' --age <years>");
}

pub fn treatment_report(report: &TreatmentReport) {
    for line in &report.lines {
        println!("{}", prescription_line(line));
    }
    println!();
    println!(
        "Confidence: {}% ({})",
        report.percent,
        report.band.label()
    );
    println!("{}", report.prescription.disclaimer);

    if let Some(reason) = &report.fallback_reason {
        println!("(treatment advice unavailable: {reason})");
    }

    if !report.medication_links.is_empty() {
        println!();
        println!("Buy online:");
        for link in &report.medication_links {
            println!("  {}", link.name);
            println!("    Apollo:  {}", link.apollo_url);
            println!("    MedPlus: {}", link.medplus_url);
            println!("    Netmeds: {}", link.netmeds_url);
        }
    }
}

fn prescription_line(line: &PrescriptionLine) -> String {
    match line {
        PrescriptionLine::Blank => String::new(),
        PrescriptionLine::SectionHeading {
            title,
            description,
            tone,
        } => format!("{}{title}:{description}", marker(*tone)),
        PrescriptionLine::MedicationHeading => "Medication Name:".to_string(),
        PrescriptionLine::Bullet { spans, tone } => {
            format!("  {}- {}", marker(*tone), plain_text(spans))
        }
        PrescriptionLine::Numbered { number, spans } => {
            format!("  {number}. {}", plain_text(spans))
        }
        PrescriptionLine::Detail { label, value } => format!("     {label}:{value}"),
        PrescriptionLine::Text { spans } => plain_text(spans),
    }
}

fn marker(tone: Tone) -> &'static str {
    match tone {
        Tone::Warning => "! ",
        Tone::Mild => "~ ",
        Tone::Neutral => "",
    }
}

pub fn answer(text: &str, sources: &[String], fallback_reason: Option<&str>) {
    println!("{text}");
    if !sources.is_empty() {
        println!();
        println!("Sources:");
        for s in sources {
            println!("  - {s}");
        }
    }
    if let Some(reason) = fallback_reason {
        println!("(answer unavailable: {reason})");
    }
}

pub fn facilities(facilities: &[MedicalFacility]) {
    for f in facilities {
        println!("{}  ({:.1} km, rated {:.1})", f.name, f.distance, f.rating);
        println!("  {}  tel. {}", f.address, f.phone_number);
        println!("  at {:.5}, {:.5}", f.location.lat, f.location.lng);
    }
}

pub fn consultations(services: &[OnlineConsultation]) {
    for s in services {
        println!("{:<12} {:<6} {}", s.name, s.region, s.url);
    }
}
