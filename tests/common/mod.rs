//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use autarky_wizard::backend::{Backend, LocalBackend, SubmitError};
use autarky_wizard::components::{ComponentKey, EnabledComponents};
use autarky_wizard::endpoints::{Endpoint, Reply};
use autarky_wizard::stores::ProjectPatch;
use autarky_wizard::wizard::WizardState;

/// Path of the four-row winter/summer CSV fixture.
pub const LOAD_FIXTURE: &str = "tests/fixtures/load_profile.csv";

/// Default wizard state (project `abc123`, seed 42) with a project name set,
/// so every step is accepted.
pub fn default_state() -> WizardState {
    let mut state = WizardState::default();
    state.project.update(&ProjectPatch {
        project_name: Some("Test site".to_string()),
        ..ProjectPatch::default()
    });
    state
}

/// Backend that answers immediately.
pub fn instant_backend() -> LocalBackend {
    LocalBackend::new(Duration::ZERO)
}

/// Solar, battery and diesel with the fully-AC toggle.
pub fn hybrid_components() -> EnabledComponents {
    EnabledComponents::with(&[
        ComponentKey::SolarPv,
        ComponentKey::Battery,
        ComponentKey::DieselGenerator,
        ComponentKey::FullyAc,
    ])
}

/// Local backend that records every endpoint it is asked to post to.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub calls: Mutex<Vec<Endpoint>>,
}

impl RecordingBackend {
    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Backend for RecordingBackend {
    async fn post(&self, endpoint: Endpoint, body: Vec<u8>) -> Result<Reply, SubmitError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(endpoint);
        }
        instant_backend().post(endpoint, body).await
    }
}
