//! Linear five-step navigation over the form stores.
//!
//! Moving forward submits the current step and only advances once the
//! submission is acknowledged. Moving back never submits. Earlier steps are
//! not re-checked when a later one is entered.

use std::fmt;

use serde_json::Value;
use tracing::{info, warn};

use crate::backend::{Backend, SubmitError};
use crate::endpoints::Endpoint;
use crate::stores::{
    DEFAULT_PROJECT_ID, LoadDemandStore, ProjectStore, RenewablePotentialStore, SystemConfigStore,
    TechParamsStore, UncertaintyStore,
};

/// One screen of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    ProjectSetup,
    SystemConfiguration,
    TechnologyParameters,
    LoadDemand,
    /// Renewable potential sources together with the grid uncertainty model.
    ModelUncertainties,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::ProjectSetup,
        Step::SystemConfiguration,
        Step::TechnologyParameters,
        Step::LoadDemand,
        Step::ModelUncertainties,
    ];

    pub const COUNT: u8 = 5;

    /// 1-based position.
    pub fn number(self) -> u8 {
        match self {
            Self::ProjectSetup => 1,
            Self::SystemConfiguration => 2,
            Self::TechnologyParameters => 3,
            Self::LoadDemand => 4,
            Self::ModelUncertainties => 5,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::ProjectSetup => "Project Setup",
            Self::SystemConfiguration => "System Configuration",
            Self::TechnologyParameters => "Technology Parameters",
            Self::LoadDemand => "Load Demand",
            Self::ModelUncertainties => "Renewable Potential & Model Uncertainties",
        }
    }

    pub fn progress_percent(self) -> u16 {
        u16::from(self.number()) * 100 / u16::from(Self::COUNT)
    }

    pub fn next(self) -> Option<Step> {
        Self::ALL.get(usize::from(self.number())).copied()
    }

    pub fn prev(self) -> Option<Step> {
        usize::from(self.number())
            .checked_sub(2)
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Endpoint the step submits to.
    pub fn endpoint(self) -> Endpoint {
        match self {
            Self::ProjectSetup => Endpoint::ProjectSetup,
            Self::SystemConfiguration => Endpoint::SystemConfiguration,
            Self::TechnologyParameters => Endpoint::TechnologyParameters,
            Self::LoadDemand => Endpoint::LoadDemand,
            Self::ModelUncertainties => Endpoint::ModelUncertainties,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {} of {}: {}", self.number(), Self::COUNT, self.title())
    }
}

/// All form state of one wizard session.
#[derive(Debug, Clone)]
pub struct WizardState {
    pub project: ProjectStore,
    pub system: SystemConfigStore,
    pub tech: TechParamsStore,
    pub load: LoadDemandStore,
    pub renewable: RenewablePotentialStore,
    pub uncertainty: UncertaintyStore,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT_ID, 42)
    }
}

impl WizardState {
    /// Fresh stores sharing `project_id`. `seed` drives the fallback load profile.
    pub fn new(project_id: &str, seed: u64) -> Self {
        Self {
            project: ProjectStore::new(),
            system: SystemConfigStore::new(project_id),
            tech: TechParamsStore::new(project_id),
            load: LoadDemandStore::new(project_id, seed),
            renewable: RenewablePotentialStore::new(),
            uncertainty: UncertaintyStore::new(project_id),
        }
    }

    /// Submits the store behind `step`.
    ///
    /// # Errors
    ///
    /// Whatever the store's `submit` returns.
    pub async fn submit<B: Backend>(&self, step: Step, backend: &B) -> Result<Value, SubmitError> {
        match step {
            Step::ProjectSetup => self.project.submit(backend).await,
            Step::SystemConfiguration => self.system.submit(backend).await,
            Step::TechnologyParameters => self.tech.submit(backend).await,
            Step::LoadDemand => self.load.submit(backend).await,
            Step::ModelUncertainties => self.uncertainty.submit(backend).await,
        }
    }
}

/// Outcome of a successful forward move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Moved(Step),
    /// The last step was acknowledged.
    Completed,
}

/// Drives a [`WizardState`] through the steps using a [`Backend`].
#[derive(Debug)]
pub struct Wizard<B> {
    backend: B,
    state: WizardState,
    step: Step,
    completed: bool,
    last_ack: Option<Value>,
}

impl<B: Backend> Wizard<B> {
    pub fn new(state: WizardState, backend: B) -> Self {
        Self {
            backend,
            state,
            step: Step::ProjectSetup,
            completed: false,
            last_ack: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut WizardState {
        &mut self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Whether the final step has been acknowledged.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Body of the most recent successful submission.
    pub fn last_acknowledgement(&self) -> Option<&Value> {
        self.last_ack.as_ref()
    }

    /// Submits the current step and advances on success.
    ///
    /// On error the step is unchanged and the stores keep their contents.
    ///
    /// # Errors
    ///
    /// The [`SubmitError`] from the current step's submission.
    pub async fn next(&mut self) -> Result<Navigation, SubmitError> {
        let step = self.step;
        let ack = match self.state.submit(step, &self.backend).await {
            Ok(ack) => ack,
            Err(e) => {
                warn!(step = step.number(), error = %e, "staying on step");
                return Err(e);
            }
        };
        self.last_ack = Some(ack);

        match step.next() {
            Some(to) => {
                info!(from = step.number(), to = to.number(), "advanced");
                self.step = to;
                Ok(Navigation::Moved(to))
            }
            None => {
                info!("wizard completed");
                self.completed = true;
                Ok(Navigation::Completed)
            }
        }
    }

    /// Returns to the previous step without submitting. Stays on the first step.
    pub fn back(&mut self) -> Step {
        if let Some(prev) = self.step.prev() {
            self.step = prev;
        }
        self.completed = false;
        self.step
    }
}
