//! MedAi Navigator command line.
//!
//! Usage:
//!   medai analyze "headache and fever" --history asthma
//!   medai treat --handoff '/treatment-recommendations?symptoms=...' --age 34
//!   medai ask "How much sleep do adults need?"
//!   medai facilities --location 12.97,77.59
//!   medai --offline analyze "runny nose"

mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use medai_config::MedaiConfig;
use medai_contracts::{
    error::{MedaiError, MedaiResult},
    flow::AnalyzeSymptomsInput,
};
use medai_core::{traits::ModelClient, FlowRunner};
use medai_model::HttpModelClient;
use medai_navigator::{
    build_runner,
    flows::{
        medical_qa,
        symptom_analyzer::{self, with_follow_up, SymptomReport},
        treatment_advisor::{self, TreatmentForm},
    },
    hand_off_to_treatment,
    mock_data::{self, offline_model, parse_location},
    parse_handoff,
    planner::online_consultations,
};

// ── CLI definition ───────────────────────────────────────────────────────────

/// MedAi Navigator: AI-assisted symptom analysis, treatment advice and
/// medical Q&A, plus placeholder health services.
#[derive(Parser)]
#[command(
    name = "medai",
    version,
    about = "MedAi Navigator",
    long_about = "AI-assisted symptom analysis, treatment advice and medical Q&A.\n\
                  Not a substitute for professional medical care."
)]
struct Cli {
    /// TOML configuration file. Defaults to the built-in settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Answer from canned replies instead of calling the model endpoint.
    #[arg(long, global = true)]
    offline: bool,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze symptoms into likely conditions and a risk level.
    Analyze {
        symptoms: String,
        #[arg(long, default_value = "")]
        history: String,
        #[arg(long, default_value = "")]
        allergies: String,
        /// After the first analysis, append its suggested follow-up question
        /// number N (1-3) and analyze again. Skipped if the first run fails.
        #[arg(long, value_name = "N", value_parser = clap::value_parser!(u8).range(1..=3))]
        follow_up: Option<u8>,
    },
    /// Get a prescription-style treatment recommendation.
    Treat {
        /// Pre-fill the form from a hand-off link.
        #[arg(long)]
        handoff: Option<String>,
        #[arg(long)]
        symptoms: Option<String>,
        #[arg(long)]
        history: Option<String>,
        #[arg(long)]
        allergies: Option<String>,
        #[arg(long, default_value = "")]
        age: String,
        #[arg(long, default_value = "")]
        height: String,
        #[arg(long, default_value = "")]
        weight: String,
        #[arg(long)]
        anonymous: bool,
    },
    /// Ask a medical question.
    Ask {
        question: String,
        /// Use the placeholder answer service instead of the model.
        #[arg(long)]
        stub: bool,
    },
    /// Find medical facilities near a location.
    Facilities {
        /// Search location as "lat,lng".
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        specialty: Option<String>,
    },
    /// List online consultation services.
    Consult,
    /// Show emergency contacts.
    Contacts,
    /// Show the latest health metrics.
    Metrics,
    /// List health reports.
    Reports,
    /// List medical records.
    Records,
    /// Build the link that carries symptoms over to treatment advice.
    Handoff {
        symptoms: String,
        #[arg(long, default_value = "")]
        history: String,
        #[arg(long, default_value = "")]
        allergies: String,
    },
    /// List the models the configured endpoint serves.
    Models,
}

// ── Entry point ──────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("medai: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> MedaiResult<()> {
    let config = MedaiConfig::load(cli.config.as_deref())?;
    let out = Output { json: cli.json };

    match cli.command {
        Command::Analyze {
            symptoms,
            history,
            allergies,
            follow_up,
        } => {
            let input = AnalyzeSymptomsInput {
                symptoms,
                medical_history: history,
                allergies,
            };
            let runner = runner(&config, cli.offline)?;
            let (input, report) = analyze(&runner, input, follow_up);
            let link =
                hand_off_to_treatment(&input.symptoms, &input.medical_history, &input.allergies);
            out.show(&report, || render::symptom_report(&report, &link))
        }

        Command::Treat {
            handoff,
            symptoms,
            history,
            allergies,
            age,
            height,
            weight,
            anonymous,
        } => {
            let mut form = match handoff {
                Some(link) => TreatmentForm::from_handoff(parse_handoff(&link)?),
                None => TreatmentForm::default(),
            };
            if let Some(s) = symptoms {
                form.symptoms = s;
            }
            if let Some(h) = history {
                form.medical_history = h;
            }
            if let Some(a) = allergies {
                form.allergies = a;
            }
            form.age = age;
            form.height = height;
            form.weight = weight;
            form.anonymous = anonymous;

            let input = form.to_input()?;
            let runner = runner(&config, cli.offline)?;
            let report = treatment_advisor::request_treatment(&runner, &input);
            out.show(&report, || render::treatment_report(&report))
        }

        Command::Ask { question, stub } => {
            if stub {
                let reply = mock_data::medical_answer(&question);
                return out.show(&reply, || render::answer(&reply.answer, &reply.sources, None));
            }
            let runner = runner(&config, cli.offline)?;
            let outcome = medical_qa::ask(&runner, &question);
            let answer = outcome.output();
            out.show(answer, || {
                render::answer(&answer.answer, &answer.sources, outcome.fallback_reason())
            })
        }

        Command::Facilities {
            location,
            specialty,
        } => {
            let origin = location.as_deref().map(parse_location).transpose()?;
            let facilities = mock_data::medical_facilities(origin, specialty.as_deref())?;
            out.show(&facilities, || render::facilities(&facilities))
        }

        Command::Consult => {
            let services = online_consultations();
            out.show(&services, || render::consultations(&services))
        }

        Command::Contacts => {
            let contacts = mock_data::emergency_contacts();
            out.show(&contacts, || {
                for c in &contacts {
                    println!("{:<30} {}", c.name, c.phone_number);
                }
            })
        }

        Command::Metrics => {
            let metrics = mock_data::health_metrics();
            out.show(&metrics, || {
                println!("Blood pressure: {}", metrics.blood_pressure);
                println!("Heart rate:     {} bpm", metrics.heart_rate);
            })
        }

        Command::Reports => {
            let reports = mock_data::health_reports();
            out.show(&reports, || {
                for r in &reports {
                    println!("{:<30} {}", r.name, r.url);
                }
            })
        }

        Command::Records => {
            let records = mock_data::medical_records();
            out.show(&records, || {
                for r in &records {
                    println!("{:<30} {}", r.name, r.url);
                }
            })
        }

        Command::Handoff {
            symptoms,
            history,
            allergies,
        } => {
            println!("{}", hand_off_to_treatment(&symptoms, &history, &allergies));
            Ok(())
        }

        Command::Models => {
            if cli.offline {
                println!("scripted");
                return Ok(());
            }
            let client = HttpModelClient::new(&config.model)?;
            let models = client.list_models()?;
            out.show(&models, || {
                println!("Models at {}:", client.base_url());
                for m in &models {
                    let marker = if *m == config.model.model { "*" } else { " " };
                    println!(" {marker} {m}");
                }
            })
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn runner(config: &MedaiConfig, offline: bool) -> MedaiResult<FlowRunner> {
    let model: Box<dyn ModelClient> = if offline {
        Box::new(offline_model())
    } else {
        Box::new(HttpModelClient::new(&config.model)?)
    };
    debug!(model = %model.model_name(), offline, "flow runner ready");
    Ok(build_runner(model))
}

/// Run the analysis, then, if it succeeded and a follow-up was picked, run it
/// again with that question appended. Returns the input of the last run.
fn analyze(
    runner: &FlowRunner,
    input: AnalyzeSymptomsInput,
    follow_up: Option<u8>,
) -> (AnalyzeSymptomsInput, SymptomReport) {
    let report = symptom_analyzer::submit_symptoms(runner, &input);
    let question = follow_up
        .filter(|_| !report.is_fallback())
        .and_then(|n| report.follow_ups.get(usize::from(n).saturating_sub(1)).copied());
    let Some(question) = question else {
        return (input, report);
    };

    debug!(question, "asking follow-up");
    let input = AnalyzeSymptomsInput {
        symptoms: with_follow_up(&input.symptoms, question),
        ..input
    };
    let report = symptom_analyzer::submit_symptoms(runner, &input);
    (input, report)
}

/// Chooses between JSON and human-readable output.
struct Output {
    json: bool,
}

impl Output {
    fn show<T: Serialize>(&self, value: &T, human: impl FnOnce()) -> MedaiResult<()> {
        if self.json {
            let text = serde_json::to_string_pretty(value).map_err(|e| {
                MedaiError::OutputEncoding {
                    reason: e.to_string(),
                }
            })?;
            println!("{text}");
        } else {
            human();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use clap::CommandFactory;
    use medai_model::MockModelClient;

    use super::*;

    fn make_input(symptoms: &str) -> AnalyzeSymptomsInput {
        AnalyzeSymptomsInput {
            symptoms: symptoms.to_string(),
            ..AnalyzeSymptomsInput::default()
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from(["medai", "ask", "why?", "--offline", "--json"]).unwrap();
        assert!(cli.offline);
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Ask { stub: false, .. }));
    }

    #[test]
    fn follow_up_index_is_bounded() {
        assert!(Cli::try_parse_from(["medai", "analyze", "cough", "--follow-up", "4"]).is_err());
        assert!(Cli::try_parse_from(["medai", "analyze", "cough", "--follow-up", "2"]).is_ok());
    }

    #[test]
    fn treat_accepts_handoff_link() {
        let cli = Cli::try_parse_from([
            "medai",
            "treat",
            "--handoff",
            "/treatment-recommendations?symptoms=cough",
            "--age",
            "30",
        ])
        .unwrap();
        match cli.command {
            Command::Treat { handoff, age, .. } => {
                assert_eq!(handoff.as_deref(), Some("/treatment-recommendations?symptoms=cough"));
                assert_eq!(age, "30");
            }
            _ => panic!("expected treat"),
        }
    }

    // ── Follow-up ────────────────────────────────────────────────────────────

    /// The follow-up question comes from the first report, so it is only
    /// asked once that report is in.
    #[test]
    fn follow_up_is_asked_after_first_analysis() {
        let model = offline_model();
        let requests = model.requests();
        let runner = build_runner(Box::new(model));

        let (input, report) = analyze(&runner, make_input("cough"), Some(2));
        assert!(!report.is_fallback());
        let expected = with_follow_up("cough", symptom_analyzer::FOLLOW_UP_QUESTIONS[1]);
        assert_eq!(input.symptoms, expected);

        let sent = requests.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert!(!sent[0].prompt.contains(symptom_analyzer::FOLLOW_UP_QUESTIONS[1]));
        assert!(sent[1].prompt.contains(symptom_analyzer::FOLLOW_UP_QUESTIONS[1]));
    }

    #[test]
    fn follow_up_skipped_when_first_analysis_fails() {
        let model = MockModelClient::failing("model overloaded");
        let requests = model.requests();
        let runner = build_runner(Box::new(model));

        let (input, report) = analyze(&runner, make_input("cough"), Some(1));
        assert!(report.is_fallback());
        assert_eq!(input.symptoms, "cough");
        assert_eq!(requests.lock().unwrap().len(), 1);
    }

    #[test]
    fn no_follow_up_means_one_request() {
        let model = offline_model();
        let requests = model.requests();
        let runner = build_runner(Box::new(model));

        let (input, _) = analyze(&runner, make_input("cough"), None);
        assert_eq!(input.symptoms, "cough");
        assert_eq!(requests.lock().unwrap().len(), 1);
    }

    // ── Output ───────────────────────────────────────────────────────────────

    /// JSON objects need string keys; the failure is reported as an output
    /// problem, not a model one.
    #[test]
    fn unencodable_output_is_an_encoding_error() {
        let mut value = HashMap::new();
        value.insert((1u8, 2u8), 3u8);
        let err = Output { json: true }.show(&value, || {}).unwrap_err();
        assert!(matches!(err, MedaiError::OutputEncoding { .. }));
    }

    #[test]
    fn json_report_carries_risk_and_follow_ups() {
        let runner = build_runner(Box::new(offline_model()));
        let (_, report) = analyze(&runner, make_input("cough"), None);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["risk"].is_string());
        assert!(json["urgency"].is_string());
        assert_eq!(json["followUps"].as_array().unwrap().len(), 3);
        assert!(json["fallbackReason"].is_null());
        assert!(json["analysis"]["conditions"].is_array());
    }
}
