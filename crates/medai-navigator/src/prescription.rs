//! Classifying prescription text line by line for panel rendering.
//!
//! The treatment advisor answers in loose markdown. Each line is sorted into
//! one of a few shapes so a front end can style it without parsing markdown.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static SECTION_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z\s]+)(\(.+\)):?$").expect("heading pattern is valid"));
static MEDICATION_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*Medication Name:$").expect("name pattern is valid"));
static BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*-\s+(.+)$").expect("bullet pattern is valid"));
static NUMBERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\.\s+(.+)$").expect("numbered pattern is valid"));
static DETAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\*\s+([A-Za-z]+):(.*)$").expect("detail pattern is valid"));
static EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("emphasis pattern is valid"));

/// How alarming a line reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    /// Mentions something severe, a warning, a test, or a diagnosis.
    Warning,
    /// Mentions something mild or moderate.
    Mild,
    Neutral,
}

/// A run of inline text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextSpan {
    Plain(String),
    Bold(String),
    /// `**Label:**`, rendered as an inline heading. Holds the text with its colon.
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrescriptionLine {
    /// Empty line; paragraph break.
    Blank,
    /// `Pain Relievers (for headache):`
    SectionHeading {
        title: String,
        description: String,
        tone: Tone,
    },
    /// A lone `Medication Name:` line.
    MedicationHeading,
    /// `- item`
    Bullet { spans: Vec<TextSpan>, tone: Tone },
    /// `1. item`
    Numbered { number: u32, spans: Vec<TextSpan> },
    /// `* Dosage: 500mg`
    Detail { label: String, value: String },
    Text { spans: Vec<TextSpan> },
}

/// Classify every line of `text`, in order.
pub fn format_prescription(text: &str) -> Vec<PrescriptionLine> {
    text.lines().map(classify_line).collect()
}

pub fn classify_line(line: &str) -> PrescriptionLine {
    let line = line.trim_end();
    if line.trim().is_empty() {
        return PrescriptionLine::Blank;
    }

    if let Some(caps) = SECTION_HEADING.captures(line) {
        let lower = line.to_lowercase();
        let tone = if ["diagnosis", "test", "severe", "warning"]
            .iter()
            .any(|w| lower.contains(w))
        {
            Tone::Warning
        } else {
            Tone::Neutral
        };
        return PrescriptionLine::SectionHeading {
            title: caps[1].trim().to_string(),
            description: caps[2].to_string(),
            tone,
        };
    }

    if MEDICATION_NAME.is_match(line) {
        return PrescriptionLine::MedicationHeading;
    }

    if let Some(caps) = BULLET.captures(line) {
        let item = &caps[1];
        return PrescriptionLine::Bullet {
            spans: parse_spans(item),
            tone: bullet_tone(item),
        };
    }

    if let Some(caps) = NUMBERED.captures(line) {
        if let Ok(number) = caps[1].parse::<u32>() {
            return PrescriptionLine::Numbered {
                number,
                spans: parse_spans(&caps[2]),
            };
        }
    }

    if let Some(caps) = DETAIL.captures(line) {
        return PrescriptionLine::Detail {
            label: caps[1].to_string(),
            value: caps[2].trim().to_string(),
        };
    }

    PrescriptionLine::Text {
        spans: parse_spans(line),
    }
}

fn bullet_tone(item: &str) -> Tone {
    let lower = item.to_lowercase();
    if lower.contains("severe") || lower.contains("warning") {
        Tone::Warning
    } else if lower.contains("mild") || lower.contains("moderate") {
        Tone::Mild
    } else {
        Tone::Neutral
    }
}

/// Split `**bold**` and `**Label:**` runs out of plain text.
pub fn parse_spans(text: &str) -> Vec<TextSpan> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in EMPHASIS.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            spans.push(TextSpan::Plain(text[last..whole.start()].to_string()));
        }
        let inner = caps[1].to_string();
        if inner.ends_with(':') {
            spans.push(TextSpan::Label(inner));
        } else {
            spans.push(TextSpan::Bold(inner));
        }
        last = whole.end();
    }

    if last < text.len() {
        spans.push(TextSpan::Plain(text[last..].to_string()));
    }
    spans
}

/// Spans flattened back to unstyled text.
pub fn plain_text(spans: &[TextSpan]) -> String {
    spans
        .iter()
        .map(|s| match s {
            TextSpan::Plain(t) | TextSpan::Bold(t) | TextSpan::Label(t) => t.as_str(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(s: &str) -> TextSpan {
        TextSpan::Plain(s.to_string())
    }

    fn bold(s: &str) -> TextSpan {
        TextSpan::Bold(s.to_string())
    }

    // ── Line classes ─────────────────────────────────────────────────────────

    #[test]
    fn section_heading_splits_title_and_description() {
        assert_eq!(
            classify_line("Pain Relievers (for fever and aches):"),
            PrescriptionLine::SectionHeading {
                title: "Pain Relievers".to_string(),
                description: "(for fever and aches)".to_string(),
                tone: Tone::Neutral,
            }
        );
    }

    #[test]
    fn diagnostic_heading_reads_as_warning() {
        match classify_line("Recommended Tests (if symptoms persist)") {
            PrescriptionLine::SectionHeading { tone, .. } => assert_eq!(tone, Tone::Warning),
            other => panic!("expected heading, got {other:?}"),
        }
    }

    #[test]
    fn medication_name_heading_ignores_case() {
        assert_eq!(classify_line("  medication name:"), PrescriptionLine::MedicationHeading);
    }

    #[test]
    fn bullets_carry_tone() {
        let cases = [
            ("- Seek care if pain becomes severe", Tone::Warning),
            ("- WARNING: do not exceed 4g a day", Tone::Warning),
            ("- Mild drowsiness may occur", Tone::Mild),
            ("- Take with water", Tone::Neutral),
        ];
        for (line, expected) in cases {
            match classify_line(line) {
                PrescriptionLine::Bullet { tone, .. } => assert_eq!(tone, expected, "{line}"),
                other => panic!("expected bullet for {line}, got {other:?}"),
            }
        }
    }

    #[test]
    fn numbered_item_keeps_number_and_spans() {
        assert_eq!(
            classify_line("2. **Ibuprofen** 400mg every 8 hours"),
            PrescriptionLine::Numbered {
                number: 2,
                spans: vec![bold("Ibuprofen"), plain(" 400mg every 8 hours")],
            }
        );
    }

    #[test]
    fn asterisk_detail_line() {
        assert_eq!(
            classify_line("* Timing: after food"),
            PrescriptionLine::Detail {
                label: "Timing".to_string(),
                value: "after food".to_string(),
            }
        );
    }

    #[test]
    fn blank_lines_are_paragraph_breaks() {
        let lines = format_prescription("Rest well.\n\nDrink fluids.");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], PrescriptionLine::Blank);
    }

    // ── Inline spans ─────────────────────────────────────────────────────────

    #[test]
    fn label_spans_are_distinguished_from_bold() {
        assert_eq!(
            parse_spans("**Diet:** avoid **spicy** food"),
            vec![
                TextSpan::Label("Diet:".to_string()),
                plain(" avoid "),
                bold("spicy"),
                plain(" food"),
            ]
        );
    }

    #[test]
    fn unmatched_stars_stay_plain() {
        assert_eq!(parse_spans("5 ** 2"), vec![plain("5 ** 2")]);
    }

    #[test]
    fn plain_text_drops_markup() {
        let spans = parse_spans("Take **two** tablets");
        assert_eq!(plain_text(&spans), "Take two tablets");
    }
}
