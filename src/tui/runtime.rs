//! Wizard driver and TUI application state.

use std::io;
use std::time::Duration;

use tokio::runtime::Runtime;

use crate::backend::LocalBackend;
use crate::components::ComponentKey;
use crate::stores::{
    LocationPatch, ProjectPatch, Seasonality, TechParamsStore, TimeResolution, UncertaintyModel,
};
use crate::wizard::{Navigation, Step, Wizard, WizardState};

/// Editable rows of the project setup form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectField {
    Name,
    Description,
    Latitude,
    Longitude,
    TimeHorizon,
    TimeResolution,
    Seasonality,
}

impl ProjectField {
    pub const ALL: [ProjectField; 7] = [
        ProjectField::Name,
        ProjectField::Description,
        ProjectField::Latitude,
        ProjectField::Longitude,
        ProjectField::TimeHorizon,
        ProjectField::TimeResolution,
        ProjectField::Seasonality,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Project name",
            Self::Description => "Description",
            Self::Latitude => "Latitude",
            Self::Longitude => "Longitude",
            Self::TimeHorizon => "Time horizon (years)",
            Self::TimeResolution => "Time resolution",
            Self::Seasonality => "Seasonality",
        }
    }

    /// Whether the field is edited as text rather than cycled.
    pub fn is_text(self) -> bool {
        !matches!(self, Self::TimeResolution | Self::Seasonality)
    }
}

/// Outcome of the last submission, shown in the footer.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Idle,
    Saved(String),
    Failed(String),
    Completed,
}

/// TUI application state.
pub struct App {
    rt: Runtime,
    wizard: Wizard<LocalBackend>,
    /// Highlighted row on the current step.
    pub focus: usize,
    /// Text buffer while a project field is being edited.
    pub editing: Option<String>,
    pub status: Status,
    /// Whether the user has requested quit.
    pub quit: bool,
}

impl App {
    /// Creates the app around an already configured wizard state.
    ///
    /// # Errors
    ///
    /// Returns an error if the async runtime cannot be created.
    pub fn new(state: WizardState, latency: Duration) -> io::Result<Self> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        Ok(Self {
            rt,
            wizard: Wizard::new(state, LocalBackend::new(latency)),
            focus: 0,
            editing: None,
            status: Status::Idle,
            quit: false,
        })
    }

    pub fn step(&self) -> Step {
        self.wizard.step()
    }

    pub fn state(&self) -> &WizardState {
        self.wizard.state()
    }

    /// Submits the current step and moves forward on success.
    ///
    /// Blocks until the acknowledgement arrives.
    pub fn advance(&mut self) {
        self.cancel_edit();
        let result = self.rt.block_on(self.wizard.next());
        self.status = match result {
            Ok(Navigation::Moved(_)) => {
                self.focus = 0;
                let message = self
                    .wizard
                    .last_acknowledgement()
                    .and_then(|ack| ack["message"].as_str())
                    .unwrap_or("saved")
                    .to_string();
                Status::Saved(message)
            }
            Ok(Navigation::Completed) => Status::Completed,
            Err(e) => Status::Failed(e.to_string()),
        };
    }

    /// Goes back one step without submitting.
    pub fn back(&mut self) {
        self.cancel_edit();
        let before = self.wizard.step();
        if self.wizard.back() != before {
            self.focus = 0;
        }
        self.status = Status::Idle;
    }

    /// Number of selectable rows on the current step.
    pub fn focus_len(&self) -> usize {
        let state = self.wizard.state();
        match self.wizard.step() {
            Step::ProjectSetup => ProjectField::ALL.len(),
            Step::SystemConfiguration => ComponentKey::ALL.len(),
            Step::TechnologyParameters => self.configurable().len(),
            Step::LoadDemand => state.load.profile().map_or(0, |p| p.series_names().count()),
            Step::ModelUncertainties => UncertaintyModel::ALL.len(),
        }
    }

    pub fn focus_next(&mut self) {
        if self.editing.is_none() && self.focus + 1 < self.focus_len() {
            self.focus += 1;
        }
    }

    pub fn focus_prev(&mut self) {
        if self.editing.is_none() {
            self.focus = self.focus.saturating_sub(1);
        }
    }

    /// Components with parameters given the current selection.
    pub fn configurable(&self) -> Vec<ComponentKey> {
        TechParamsStore::configurable_components(
            &self.wizard.state().system.config().enabled_components,
        )
    }

    /// Names of the load series, in column order.
    pub fn series_names(&self) -> Vec<String> {
        self.wizard
            .state()
            .load
            .profile()
            .map(|p| p.series_names().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Acts on the highlighted row (Space).
    pub fn activate(&mut self) {
        let focus = self.focus;
        match self.wizard.step() {
            Step::ProjectSetup => {
                let field = ProjectField::ALL[focus];
                if field.is_text() {
                    self.editing = Some(self.field_value(field));
                } else {
                    self.cycle_project_field(field, true);
                }
            }
            Step::SystemConfiguration => {
                let key = ComponentKey::ALL[focus];
                let system = &mut self.wizard.state_mut().system;
                let on = system.config().enabled_components.is_enabled(key);
                system.toggle(key, !on);
            }
            Step::TechnologyParameters => {
                let key = self.configurable().get(focus).copied();
                self.wizard.state_mut().tech.select_component(key);
            }
            Step::LoadDemand => {
                if let Some(name) = self.series_names().get(focus) {
                    let load = &mut self.wizard.state_mut().load;
                    let visible = load.is_visible(name);
                    load.toggle_season(name, !visible);
                }
            }
            Step::ModelUncertainties => {
                self.wizard
                    .state_mut()
                    .uncertainty
                    .select_model(UncertaintyModel::ALL[focus]);
            }
        }
    }

    /// Left/Right: layout carousel, resource carousel or enum fields.
    pub fn cycle(&mut self, forward: bool) {
        match self.wizard.step() {
            Step::ProjectSetup => {
                let field = ProjectField::ALL[self.focus];
                if !field.is_text() {
                    self.cycle_project_field(field, forward);
                }
            }
            Step::SystemConfiguration => {
                let system = &mut self.wizard.state_mut().system;
                if forward {
                    system.next_layout();
                } else {
                    system.prev_layout();
                }
            }
            Step::ModelUncertainties => {
                let renewable = &mut self.wizard.state_mut().renewable;
                if forward {
                    renewable.next();
                } else {
                    renewable.prev();
                }
            }
            Step::TechnologyParameters | Step::LoadDemand => {}
        }
    }

    /// Requests potential data for the resource on screen.
    pub fn request_download(&mut self) {
        if self.wizard.step() == Step::ModelUncertainties {
            self.wizard.state_mut().renewable.request_download();
        }
    }

    /// Drops the uploaded load profile.
    pub fn clear_load(&mut self) {
        if self.wizard.step() == Step::LoadDemand {
            self.wizard.state_mut().load.clear();
            self.focus = 0;
        }
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(buf) = &mut self.editing {
            buf.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(buf) = &mut self.editing {
            buf.pop();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Writes the edit buffer into the project store.
    ///
    /// Numbers that do not parse leave the field unchanged.
    pub fn commit_edit(&mut self) {
        let Some(buf) = self.editing.take() else {
            return;
        };
        let mut patch = ProjectPatch::default();
        match ProjectField::ALL[self.focus] {
            ProjectField::Name => patch.project_name = Some(buf),
            ProjectField::Description => patch.description = Some(buf),
            ProjectField::Latitude => {
                patch.location = buf.trim().parse().ok().map(|v| LocationPatch {
                    latitude: Some(v),
                    longitude: None,
                });
            }
            ProjectField::Longitude => {
                patch.location = buf.trim().parse().ok().map(|v| LocationPatch {
                    latitude: None,
                    longitude: Some(v),
                });
            }
            ProjectField::TimeHorizon => patch.time_horizon = buf.trim().parse().ok(),
            ProjectField::TimeResolution | ProjectField::Seasonality => {}
        }
        self.wizard.state_mut().project.update(&patch);
    }

    /// Display value of a project field.
    pub fn field_value(&self, field: ProjectField) -> String {
        let data = self.wizard.state().project.data();
        match field {
            ProjectField::Name => data.project_name.clone(),
            ProjectField::Description => data.description.clone(),
            ProjectField::Latitude => data.location.latitude.to_string(),
            ProjectField::Longitude => data.location.longitude.to_string(),
            ProjectField::TimeHorizon => data.time_horizon.to_string(),
            ProjectField::TimeResolution => data.time_resolution.as_str().to_string(),
            ProjectField::Seasonality => self
                .wizard
                .state()
                .project
                .effective_seasonality()
                .map_or_else(|| "off".to_string(), |s| s.as_str().to_string()),
        }
    }

    fn cycle_project_field(&mut self, field: ProjectField, forward: bool) {
        let data = self.wizard.state().project.data();
        let mut patch = ProjectPatch::default();
        match field {
            ProjectField::TimeResolution => {
                let all = TimeResolution::ALL;
                let i = all
                    .iter()
                    .position(|r| *r == data.time_resolution)
                    .unwrap_or(0);
                let next = if forward {
                    (i + 1) % all.len()
                } else {
                    (i + all.len() - 1) % all.len()
                };
                patch.time_resolution = Some(all[next]);
            }
            ProjectField::Seasonality => {
                // off -> 2 seasons -> 4 seasons -> off
                let (enabled, option) = match (data.seasonality_enabled, data.seasonality_option) {
                    (false, _) => (true, if forward { Seasonality::Two } else { Seasonality::Four }),
                    (true, Seasonality::Two) if forward => (true, Seasonality::Four),
                    (true, Seasonality::Four) if !forward => (true, Seasonality::Two),
                    (true, option) => (false, option),
                };
                patch.seasonality_enabled = Some(enabled);
                patch.seasonality_option = Some(option);
            }
            _ => return,
        }
        self.wizard.state_mut().project.update(&patch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::ResourceSource;

    fn app() -> App {
        App::new(WizardState::default(), Duration::ZERO).unwrap()
    }

    fn fill_project(app: &mut App) {
        app.activate();
        app.editing = Some("Lamu".to_string());
        app.commit_edit();
    }

    #[test]
    fn empty_project_name_is_rejected() {
        let mut app = app();
        app.advance();
        assert_eq!(app.step(), Step::ProjectSetup);
        assert!(matches!(&app.status, Status::Failed(msg) if msg.contains("Missing required fields")));

        fill_project(&mut app);
        app.advance();
        assert_eq!(app.step(), Step::SystemConfiguration);
        assert_eq!(
            app.status,
            Status::Saved("Project setup saved successfully".to_string())
        );
    }

    #[test]
    fn edits_reach_the_store() {
        let mut app = app();
        fill_project(&mut app);
        assert_eq!(app.state().project.data().project_name, "Lamu");

        app.focus = 2;
        app.activate();
        app.editing = Some("-1.5".to_string());
        app.commit_edit();
        assert!((app.state().project.data().location.latitude + 1.5).abs() < 1e-12);

        app.activate();
        app.editing = Some("north".to_string());
        app.commit_edit();
        assert!((app.state().project.data().location.latitude + 1.5).abs() < 1e-12);
    }

    #[test]
    fn seasonality_cycles_through_off() {
        let mut app = app();
        app.focus = 6;
        assert_eq!(app.field_value(ProjectField::Seasonality), "off");
        app.cycle(true);
        assert_eq!(app.field_value(ProjectField::Seasonality), "2 seasons");
        app.cycle(true);
        assert_eq!(app.field_value(ProjectField::Seasonality), "4 seasons");
        app.cycle(true);
        assert_eq!(app.field_value(ProjectField::Seasonality), "off");
    }

    #[test]
    fn toggling_components_moves_the_layout() {
        let mut app = app();
        fill_project(&mut app);
        app.advance();

        // solar, battery, fully AC -> add grid and diesel, drop solar and battery
        app.focus = 0;
        app.activate();
        app.focus = 3;
        app.activate();
        app.focus = 4;
        app.activate();
        app.focus = 6;
        app.activate();
        assert_eq!(app.state().system.config().layout_id, 10);
    }

    #[test]
    fn back_and_forward_keep_focus_in_range() {
        let mut app = app();
        fill_project(&mut app);
        app.back();
        assert_eq!(app.step(), Step::ProjectSetup);
        for _ in 0..20 {
            app.focus_next();
        }
        assert_eq!(app.focus, ProjectField::ALL.len() - 1);
        app.advance();
        assert_eq!(app.focus, 0);
    }

    #[test]
    fn walks_to_completion() {
        let mut app = app();
        fill_project(&mut app);
        for _ in 0..4 {
            app.advance();
        }
        assert_eq!(app.step(), Step::ModelUncertainties);
        app.request_download();
        assert!(matches!(
            app.state().renewable.source(app.state().renewable.current()),
            Some(ResourceSource::Download { .. })
        ));
        app.focus = 2;
        app.activate();
        assert_eq!(
            app.state().uncertainty.data().selected_model,
            UncertaintyModel::ALL[2]
        );
        app.advance();
        assert_eq!(app.status, Status::Completed);
    }
}
