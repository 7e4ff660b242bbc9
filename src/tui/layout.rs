//! TUI layout and widget rendering.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, Gauge, Paragraph, Wrap};

use super::runtime::{App, ProjectField, Status};
use super::style;
use crate::components::ComponentKey;
use crate::stores::{ResourceSource, UncertaintyModel};
use crate::wizard::Step;

/// Renders the full TUI frame.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Length(3), // progress
            Constraint::Min(10),   // step body
            Constraint::Length(1), // status
            Constraint::Length(1), // footer
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_progress(frame, app, chunks[1]);
    match app.step() {
        Step::ProjectSetup => render_project(frame, app, chunks[2]),
        Step::SystemConfiguration => render_system(frame, app, chunks[2]),
        Step::TechnologyParameters => render_tech(frame, app, chunks[2]),
        Step::LoadDemand => render_load(frame, app, chunks[2]),
        Step::ModelUncertainties => render_uncertainty(frame, app, chunks[2]),
    }
    render_status(frame, app, chunks[3]);
    render_footer(frame, app, chunks[4]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let step = app.step();
    let header = Line::from(vec![
        Span::styled(
            " AUTARKY ",
            Style::default()
                .fg(style::HEADER_FG)
                .bg(style::HEADER_BG)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" Step {} of {} │ ", step.number(), Step::COUNT)),
        Span::styled(step.title(), Style::default().add_modifier(Modifier::BOLD)),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

fn render_progress(frame: &mut Frame, app: &App, area: Rect) {
    let pct = app.step().progress_percent();
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(style::PROGRESS))
        .percent(pct)
        .label(format!("{pct}%"));
    frame.render_widget(gauge, area);
}

/// One selectable row, highlighted when focused.
fn row<'a>(focused: bool, text: String, on: Option<bool>) -> Line<'a> {
    let marker = if focused { "▶ " } else { "  " };
    let mut s = Style::default();
    if let Some(on) = on {
        s = s.fg(if on { style::ON } else { style::OFF });
    }
    if focused {
        s = s.fg(style::FOCUS).add_modifier(Modifier::BOLD);
    }
    Line::from(Span::styled(format!("{marker}{text}"), s))
}

fn render_project(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = ProjectField::ALL
        .iter()
        .enumerate()
        .map(|(i, &field)| {
            let focused = i == app.focus;
            let value = match (&app.editing, focused) {
                (Some(buf), true) => format!("{buf}_"),
                _ => app.field_value(field),
            };
            row(focused, format!("{:<22}{value}", field.label()), None)
        })
        .collect();
    let body = Paragraph::new(lines).block(
        Block::default()
            .title(" Project Setup ")
            .borders(Borders::ALL),
    );
    frame.render_widget(body, area);
}

fn render_system(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(30)])
        .split(area);

    let system = &app.state().system;
    let enabled = &system.config().enabled_components;
    let toggles: Vec<Line> = ComponentKey::ALL
        .iter()
        .enumerate()
        .map(|(i, &key)| {
            let on = enabled.is_enabled(key);
            let check = if on { "[x]" } else { "[ ]" };
            row(i == app.focus, format!("{check} {}", key.label()), Some(on))
        })
        .collect();
    frame.render_widget(
        Paragraph::new(toggles).block(Block::default().title(" Components ").borders(Borders::ALL)),
        chunks[0],
    );

    let layout = system.current_layout();
    let carousel = system.carousel();
    let mut lines = vec![
        Line::from(Span::styled(
            format!("#{} {}", layout.id, layout.name),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(layout.description),
        Line::from(""),
        Line::from(format!(
            "Uses: {}",
            layout
                .components
                .iter()
                .map(|c| c.label())
                .collect::<Vec<_>>()
                .join(", ")
        )),
    ];
    if carousel.is_fallback() {
        lines.push(Line::from(Span::styled(
            "No layout matches the selection; showing the full catalog.",
            Style::default().fg(style::FAILED),
        )));
    }
    let title = format!(" Layout {} ", carousel.position());
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().title(title).borders(Borders::ALL)),
        chunks[1],
    );
}

fn render_tech(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(30)])
        .split(area);

    let tech = &app.state().tech;
    let econ = &tech.params().project_economic_settings;
    let mut left = vec![
        Line::from(format!("Discount rate  {}%", econ.discount_rate)),
        Line::from(format!("Currency       {}", econ.currency)),
        Line::from(""),
    ];
    left.extend(app.configurable().iter().enumerate().map(|(i, key)| {
        let selected = tech.selected_component() == Some(*key);
        row(i == app.focus, key.label().to_string(), Some(selected))
    }));
    frame.render_widget(
        Paragraph::new(left).block(Block::default().title(" Economics ").borders(Borders::ALL)),
        chunks[0],
    );

    let (title, lines) = match tech.selected_component() {
        Some(key) => {
            let fields = tech
                .component(key)
                .and_then(|p| serde_json::to_value(p).ok())
                .and_then(|v| v.as_object().cloned())
                .unwrap_or_default();
            let lines: Vec<Line> = fields
                .iter()
                .map(|(name, value)| Line::from(format!("{name:<24}{value}")))
                .collect();
            (format!(" {} ", key.label()), lines)
        }
        None => (
            " Parameters ".to_string(),
            vec![Line::from("Select a component with space.")],
        ),
    };
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().title(title).borders(Borders::ALL)),
        chunks[1],
    );
}

fn render_load(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(22), Constraint::Min(30)])
        .split(area);

    let load = &app.state().load;
    let names = app.series_names();
    let toggles: Vec<Line> = if names.is_empty() {
        vec![Line::from("  no profile loaded")]
    } else {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let on = load.is_visible(name);
                let check = if on { "[x]" } else { "[ ]" };
                row(i == app.focus, format!("{check} {name}"), Some(on))
            })
            .collect()
    };
    frame.render_widget(
        Paragraph::new(toggles).block(Block::default().title(" Series ").borders(Borders::ALL)),
        chunks[0],
    );

    let Some(profile) = load.profile() else {
        let msg = Paragraph::new("No upload. A generated profile will be submitted.")
            .block(Block::default().title(" Load Profile ").borders(Borders::ALL));
        frame.render_widget(msg, chunks[1]);
        return;
    };

    // Data must outlive the datasets that borrow it.
    let points: Vec<(usize, Vec<(f64, f64)>)> = names
        .iter()
        .enumerate()
        .filter(|(_, name)| load.is_visible(name))
        .filter_map(|(i, name)| {
            let values = profile.series.get(name.as_str())?;
            let pts = profile
                .timestep
                .iter()
                .zip(values)
                .map(|(&t, &v)| (f64::from(t), v))
                .collect();
            Some((i, pts))
        })
        .collect();

    let y_bounds = style::auto_bounds_y(points.iter().map(|(_, p)| p.as_slice()));
    let x_hi = profile
        .timestep
        .last()
        .map_or(1.0, |&t| f64::from(t))
        .max(1.0);

    let datasets = points
        .iter()
        .map(|(i, pts)| {
            Dataset::default()
                .name(names[*i].clone())
                .marker(symbols::Marker::Braille)
                .style(Style::default().fg(style::series_color(*i)))
                .data(pts)
        })
        .collect();

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(" Load Profile ")
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title("step")
                .bounds([0.0, x_hi])
                .labels(vec!["0".to_string(), format!("{x_hi:.0}")]),
        )
        .y_axis(
            Axis::default()
                .title("kW")
                .bounds(y_bounds)
                .labels(vec![
                    format!("{:.1}", y_bounds[0]),
                    format!("{:.1}", y_bounds[1]),
                ]),
        );
    frame.render_widget(chart, chunks[1]);
}

fn render_uncertainty(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(6)])
        .split(area);

    let renewable = &app.state().renewable;
    let resource = renewable.current();
    let source = match renewable.source(resource) {
        Some(ResourceSource::Upload { path }) => format!("uploaded {}", path.display()),
        Some(ResourceSource::Download { provider }) => format!("download from {provider}"),
        None => "not provided".to_string(),
    };
    let potential = vec![
        Line::from(Span::styled(
            resource.label(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(resource.upload_hint()),
        Line::from(resource.provider_hint()),
        Line::from(format!("Source: {source}")),
    ];
    let title = format!(
        " Renewable Potential {} of {} ",
        renewable.index() + 1,
        crate::stores::Resource::ALL.len()
    );
    frame.render_widget(
        Paragraph::new(potential)
            .wrap(Wrap { trim: true })
            .block(Block::default().title(title).borders(Borders::ALL)),
        chunks[0],
    );

    let data = app.state().uncertainty.data();
    let mut lines: Vec<Line> = UncertaintyModel::ALL
        .iter()
        .enumerate()
        .map(|(i, &model)| {
            let selected = data.selected_model == model;
            let radio = if selected { "(•)" } else { "( )" };
            row(i == app.focus, format!("{radio} {}", model.label()), Some(selected))
        })
        .collect();
    let p = &data.parameters;
    let show = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
    lines.push(Line::from(""));
    lines.push(Line::from(format!(
        "  outages/yr={}  hours/outage={}  constraint={}",
        show(p.expected_outage_frequency),
        show(p.expected_outage_duration),
        p.probability_model.as_str(),
    )));
    lines.push(Line::from(format!(
        "  P(outage)={}  P(islanding)={}",
        show(p.probability_of_outage),
        show(p.probability_of_islanding),
    )));
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(" Model Uncertainties ")
                .borders(Borders::ALL),
        ),
        chunks[1],
    );
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let line = match &app.status {
        Status::Idle => Line::from(""),
        Status::Saved(msg) => Line::from(Span::styled(
            format!(" ✓ {msg}"),
            Style::default().fg(style::SAVED),
        )),
        Status::Failed(msg) => Line::from(Span::styled(
            format!(" ✗ {msg}"),
            Style::default().fg(style::FAILED),
        )),
        Status::Completed => Line::from(Span::styled(
            " ✓ All steps saved. Press q to exit.",
            Style::default()
                .fg(style::SAVED)
                .add_modifier(Modifier::BOLD),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let extra = match app.step() {
        Step::ProjectSetup => " space:edit/cycle  ←→:cycle",
        Step::SystemConfiguration => " space:toggle  ←→:layout",
        Step::TechnologyParameters => " space:inspect",
        Step::LoadDemand => " space:show/hide  c:clear",
        Step::ModelUncertainties => " space:select  ←→:resource  d:download",
    };
    let help = format!(" enter:save & next  b:back  ↑↓:move {extra}  q:quit");
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            help,
            Style::default().fg(style::FOOTER_FG),
        ))),
        area,
    );
}
