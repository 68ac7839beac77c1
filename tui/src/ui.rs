//! Drawing. Reads the [`App`] and never changes it.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use medai_navigator::{
    planner::end_date,
    prescription::{PrescriptionLine, TextSpan, Tone},
    risk::{confidence_percent, RiskLevel},
};

use crate::{
    app::{App, Screen},
    form::Form,
};

const ACCENT: Color = Color::Cyan;

pub fn ui(f: &mut Frame, app: &App) {
    let notice_height = if app.notice.is_some() { 3 } else { 0 };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(notice_height),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, rows[0], app);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[1]);

    match app.screen {
        Screen::Symptoms => {
            let extra = vec![toggle_line("Anonymous mode", app.symptoms.anonymous, "Ctrl-A")];
            render_form(f, columns[0], " Describe your symptoms ", app.form(), extra, app.is_loading());
            render_symptom_report(f, columns[1], app);
        }
        Screen::Treatment => {
            let extra = vec![toggle_line("Anonymous mode", app.treatment.anonymous, "Ctrl-A")];
            render_form(f, columns[0], " Treatment details ", app.form(), extra, app.is_loading());
            render_treatment_report(f, columns[1], app);
        }
        Screen::Questions => {
            render_form(f, columns[0], " Ask a medical question ", app.form(), Vec::new(), app.is_loading());
            render_answer(f, columns[1], app);
        }
        Screen::Appointments => {
            let extra = vec![Line::from(vec![
                Span::raw("  Type: "),
                Span::styled(app.appointments.kind.label(), Style::default().fg(ACCENT)),
                Span::styled("  (Ctrl-T)", Style::default().fg(Color::DarkGray)),
            ])];
            let title = if app.appointments.editing.is_some() {
                " Edit appointment "
            } else {
                " Schedule appointment "
            };
            render_form(f, columns[0], title, app.form(), extra, false);
            render_appointments(f, columns[1], app);
        }
        Screen::Medications => {
            let extra = vec![toggle_line("After food", app.medications.after_food, "Ctrl-A")];
            let title = if app.medications.editing.is_some() {
                " Edit medication "
            } else {
                " Add medication "
            };
            render_form(f, columns[0], title, app.form(), extra, false);
            render_medications(f, columns[1], app);
        }
        Screen::FindHelp => {
            let left = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(5), Constraint::Min(3)])
                .split(columns[0]);
            render_form(f, left[0], " Find nearby facilities ", app.form(), Vec::new(), false);
            render_facilities(f, left[1], app);
            render_directory(f, columns[1], app);
        }
    }

    if app.notice.is_some() {
        render_notice(f, rows[2], app);
    }
    render_footer(f, rows[3], app);
}

fn bordered(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        "MedAi Navigator  ",
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    )];
    for (i, screen) in Screen::ALL.iter().enumerate() {
        let style = if *screen == app.screen {
            Style::default()
                .fg(Color::Black)
                .bg(ACCENT)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[F{}] {}", i + 1, screen.title()), style));
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled(
        format!("model: {}", app.model_name),
        Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(Paragraph::new(Line::from(spans)).block(bordered("")), area);
}

fn render_form(
    f: &mut Frame,
    area: Rect,
    title: &str,
    form: &Form,
    extra: Vec<Line<'static>>,
    loading: bool,
) {
    let mut lines: Vec<Line> = Vec::new();
    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let label_style = if focused {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let cursor = if focused { "▏" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(format!("{}{}: ", if focused { "› " } else { "  " }, field.label), label_style),
            Span::raw(format!("{}{cursor}", field.value)),
        ]));
    }
    lines.extend(extra);
    if loading {
        lines.push(Line::raw(""));
        lines.push(Line::styled("  Working…", Style::default().fg(Color::Yellow)));
    }

    let widget = Paragraph::new(lines)
        .block(bordered(title))
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn toggle_line(label: &'static str, on: bool, key: &'static str) -> Line<'static> {
    let (text, color) = if on { ("ON", Color::Green) } else { ("OFF", Color::DarkGray) };
    Line::from(vec![
        Span::raw(format!("  {label}: ")),
        Span::styled(text, Style::default().fg(color)),
        Span::styled(format!("  ({key})"), Style::default().fg(Color::DarkGray)),
    ])
}

fn risk_color(risk: RiskLevel) -> Color {
    match risk {
        RiskLevel::Severe => Color::Red,
        RiskLevel::Moderate => Color::Yellow,
        RiskLevel::Mild => Color::Green,
        RiskLevel::Unknown => Color::Gray,
    }
}

fn render_symptom_report(f: &mut Frame, area: Rect, app: &App) {
    let Some(report) = &app.symptoms.report else {
        let hint = Paragraph::new("Describe your symptoms and press Enter.")
            .style(Style::default().fg(Color::DarkGray))
            .block(bordered(" Analysis "));
        f.render_widget(hint, area);
        return;
    };

    let color = risk_color(report.risk);
    let mut lines = vec![
        Line::from(vec![
            Span::raw("Risk level: "),
            Span::styled(
                report.risk.label(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
            Span::styled(report.urgency, Style::default().fg(color)),
        ]),
        Line::raw(""),
    ];

    for c in &report.analysis.conditions {
        lines.push(Line::from(vec![
            Span::styled(c.condition.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("  {}%", confidence_percent(c.confidence)),
                Style::default().fg(ACCENT),
            ),
        ]));
        lines.push(Line::styled(
            format!("  {}", c.recommendations),
            Style::default().fg(Color::Gray),
        ));
    }

    if !report.follow_ups.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            "Follow-up questions (Up/Down, Ctrl-F to ask):",
            Style::default().fg(Color::DarkGray),
        ));
        for (i, q) in report.follow_ups.iter().enumerate() {
            let style = if i == app.symptoms.follow_up {
                Style::default().fg(Color::Black).bg(ACCENT)
            } else {
                Style::default()
            };
            lines.push(Line::styled(format!("  {q}"), style));
        }
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        "Ctrl-T: get treatment recommendations",
        Style::default().fg(ACCENT),
    ));

    let widget = Paragraph::new(lines)
        .block(bordered(" Analysis "))
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Warning => Style::default().fg(Color::Red),
        Tone::Mild => Style::default().fg(Color::Yellow),
        Tone::Neutral => Style::default(),
    }
}

fn spans_of(spans: &[TextSpan], base: Style) -> Vec<Span<'static>> {
    spans
        .iter()
        .map(|s| match s {
            TextSpan::Plain(t) => Span::styled(t.clone(), base),
            TextSpan::Bold(t) => Span::styled(t.clone(), base.add_modifier(Modifier::BOLD)),
            TextSpan::Label(t) => Span::styled(
                t.clone(),
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ),
        })
        .collect()
}

fn prescription_line(line: &PrescriptionLine) -> Line<'static> {
    match line {
        PrescriptionLine::Blank => Line::raw(""),
        PrescriptionLine::SectionHeading {
            title,
            description,
            tone,
        } => Line::from(vec![
            Span::styled(format!("{title}:"), tone_style(*tone).add_modifier(Modifier::BOLD)),
            Span::raw(description.clone()),
        ]),
        PrescriptionLine::MedicationHeading => Line::styled(
            "Medication Name:",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        PrescriptionLine::Bullet { spans, tone } => {
            let mut out = vec![Span::styled("  • ", tone_style(*tone))];
            out.extend(spans_of(spans, tone_style(*tone)));
            Line::from(out)
        }
        PrescriptionLine::Numbered { number, spans } => {
            let mut out = vec![Span::styled(format!("  {number}. "), Style::default().fg(ACCENT))];
            out.extend(spans_of(spans, Style::default()));
            Line::from(out)
        }
        PrescriptionLine::Detail { label, value } => Line::from(vec![
            Span::styled(format!("      {label}:"), Style::default().fg(Color::Gray)),
            Span::raw(value.clone()),
        ]),
        PrescriptionLine::Text { spans } => Line::from(spans_of(spans, Style::default())),
    }
}

fn render_treatment_report(f: &mut Frame, area: Rect, app: &App) {
    let Some(report) = &app.treatment.report else {
        let hint = Paragraph::new("Fill in the details and press Enter. Age is required.")
            .style(Style::default().fg(Color::DarkGray))
            .block(bordered(" Prescription "));
        f.render_widget(hint, area);
        return;
    };

    let mut lines: Vec<Line> = report.lines.iter().map(prescription_line).collect();
    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::raw("Confidence: "),
        Span::styled(
            format!("{}% ({})", report.percent, report.band.label()),
            Style::default().fg(ACCENT),
        ),
    ]));
    lines.push(Line::styled(
        report.prescription.disclaimer.clone(),
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    ));

    if !report.medication_links.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::styled("Buy online:", Style::default().add_modifier(Modifier::BOLD)));
        for link in &report.medication_links {
            lines.push(Line::raw(format!("  {}", link.name)));
            lines.push(Line::styled(
                format!("    {}", link.apollo_url),
                Style::default().fg(Color::DarkGray),
            ));
        }
    }

    let widget = Paragraph::new(lines)
        .block(bordered(" Prescription "))
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn render_answer(f: &mut Frame, area: Rect, app: &App) {
    let lines = match &app.questions.answer {
        None => vec![Line::styled(
            "Type a question and press Enter.",
            Style::default().fg(Color::DarkGray),
        )],
        Some(outcome) => {
            let answer = outcome.output();
            let mut lines = vec![Line::raw(answer.answer.clone())];
            if !answer.sources.is_empty() {
                lines.push(Line::raw(""));
                lines.push(Line::styled("Sources:", Style::default().add_modifier(Modifier::BOLD)));
                for s in &answer.sources {
                    lines.push(Line::styled(format!("  {s}"), Style::default().fg(ACCENT)));
                }
            }
            lines
        }
    };
    let widget = Paragraph::new(lines)
        .block(bordered(" Answer "))
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn selected_style(selected: bool) -> Style {
    if selected {
        Style::default().fg(Color::Black).bg(ACCENT)
    } else {
        Style::default()
    }
}

fn render_appointments(f: &mut Frame, area: Rect, app: &App) {
    let screen = &app.appointments;
    let lines: Vec<Line> = if screen.book.is_empty() {
        vec![Line::styled("No appointments scheduled.", Style::default().fg(Color::DarkGray))]
    } else {
        screen
            .book
            .list()
            .iter()
            .enumerate()
            .flat_map(|(i, a)| {
                [
                    Line::styled(
                        format!("{} {}  {} ({})", a.date, a.time, a.title, a.kind.label()),
                        selected_style(i == screen.selected),
                    ),
                    Line::styled(format!("    {}", a.description), Style::default().fg(Color::Gray)),
                ]
            })
            .collect()
    };
    let title = format!(" Appointments ({}) ", screen.book.len());
    let widget = Paragraph::new(lines).block(bordered(&title)).wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn render_medications(f: &mut Frame, area: Rect, app: &App) {
    let screen = &app.medications;
    let lines: Vec<Line> = if screen.tracker.is_empty() {
        vec![Line::styled("No medications tracked.", Style::default().fg(Color::DarkGray))]
    } else {
        screen
            .tracker
            .list()
            .iter()
            .enumerate()
            .flat_map(|(i, m)| {
                let food = if m.after_food { "after food" } else { "before food" };
                [
                    Line::styled(
                        format!("{} {}  {} ({food})", m.name, m.dosage, m.timings),
                        selected_style(i == screen.selected),
                    ),
                    Line::styled(
                        format!("    {} to {} ({} days)", m.start_date, end_date(m), m.duration_days),
                        Style::default().fg(Color::Gray),
                    ),
                ]
            })
            .collect()
    };
    let title = format!(" Medications ({}) ", screen.tracker.len());
    let widget = Paragraph::new(lines).block(bordered(&title)).wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn render_facilities(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = Vec::new();
    if let Some(err) = &app.help.error {
        lines.push(Line::styled(err.clone(), Style::default().fg(Color::Red)));
    }
    for fac in &app.help.facilities {
        lines.push(Line::styled(fac.name.clone(), Style::default().add_modifier(Modifier::BOLD)));
        lines.push(Line::raw(format!("  {}  tel. {}", fac.address, fac.phone_number)));
        lines.push(Line::styled(
            format!(
                "  {:.1} km, rated {:.1}, at {:.4},{:.4}",
                fac.distance, fac.rating, fac.location.lat, fac.location.lng
            ),
            Style::default().fg(Color::Gray),
        ));
    }
    let widget = Paragraph::new(lines)
        .block(bordered(" Facilities "))
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn render_directory(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![Line::styled(
        "Emergency contacts",
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    )];
    for c in &app.help.contacts {
        lines.push(Line::raw(format!("  {}  {}", c.name, c.phone_number)));
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        "Online consultations",
        Style::default().add_modifier(Modifier::BOLD),
    ));
    for s in &app.help.consultations {
        lines.push(Line::from(vec![
            Span::raw(format!("  {:<12} ", s.name)),
            Span::styled(format!("{:<6} ", s.region), Style::default().fg(Color::Gray)),
            Span::styled(s.url.clone(), Style::default().fg(ACCENT)),
        ]));
    }
    let widget = Paragraph::new(lines).block(bordered(" Get help "));
    f.render_widget(widget, area);
}

fn render_notice(f: &mut Frame, area: Rect, app: &App) {
    let Some(notice) = &app.notice else {
        return;
    };
    let color = if notice.is_error { Color::Red } else { Color::Green };
    let line = Line::from(vec![
        Span::styled(
            format!("{}: ", notice.title),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(notice.body.clone()),
        Span::styled("  (Esc)", Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(line).block(bordered("")), area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(ACCENT));
    let mut spans = vec![
        key(" [F1-F6] "),
        Span::raw("Screen  "),
        key("[Tab] "),
        Span::raw("Field  "),
        key("[Enter] "),
        Span::raw("Submit  "),
    ];
    match app.screen {
        Screen::Symptoms => {
            spans.push(key("[Ctrl-N] "));
            spans.push(Span::raw("New analysis  "));
        }
        Screen::Appointments | Screen::Medications => {
            spans.push(key("[Up/Down] "));
            spans.push(Span::raw("Select  "));
            spans.push(key("[Ctrl-E] "));
            spans.push(Span::raw("Edit  "));
            spans.push(key("[Ctrl-D] "));
            spans.push(Span::raw("Delete  "));
            spans.push(key("[Esc] "));
            spans.push(Span::raw("Cancel  "));
        }
        _ => {}
    }
    spans.push(key("[Ctrl-Q] "));
    spans.push(Span::raw("Quit"));

    f.render_widget(Paragraph::new(Line::from(spans)).block(bordered("")), area);
}
