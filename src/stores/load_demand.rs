use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::{DEFAULT_PROJECT_ID, StoreError};
use crate::backend::{Backend, SubmitError, submit_json};
use crate::endpoints::Endpoint;
use crate::io;

const SAMPLE_WINTER: [f64; 24] = [
    4.5, 4.2, 4.0, 3.8, 4.1, 5.2, 7.8, 9.5, 8.7, 7.9, 8.2, 9.1, 10.2, 11.5, 12.8, 14.2, 16.5, 18.9,
    19.2, 17.8, 15.4, 12.1, 8.7, 6.2,
];

const SAMPLE_SUMMER: [f64; 24] = [
    3.8, 3.5, 3.2, 3.0, 3.4, 4.8, 6.9, 8.2, 9.8, 11.2, 13.5, 15.8, 17.2, 18.9, 20.1, 19.8, 18.5,
    16.9, 14.7, 12.3, 9.8, 7.5, 5.9, 4.7,
];

/// Steps in the generated fallback profile.
pub const FALLBACK_STEPS: u32 = 24;
/// Name of the generated fallback series.
pub const FALLBACK_SERIES: &str = "default";

/// Demand time series in kW, one column per season or profile.
///
/// Serializes as `{"timestep": [...], "<name>": [...], ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadProfile {
    pub timestep: Vec<u32>,
    #[serde(flatten)]
    pub series: BTreeMap<String, Vec<f64>>,
}

impl LoadProfile {
    /// A profile with the given series names and no rows.
    pub fn empty(names: &[String]) -> Self {
        Self {
            timestep: Vec::new(),
            series: names.iter().map(|n| (n.clone(), Vec::new())).collect(),
        }
    }

    /// The 24-hour winter/summer sample shown before any upload.
    pub fn sample() -> Self {
        Self {
            timestep: (0..24).collect(),
            series: BTreeMap::from([
                ("winter".to_string(), SAMPLE_WINTER.to_vec()),
                ("summer".to_string(), SAMPLE_SUMMER.to_vec()),
            ]),
        }
    }

    /// A single `default` series of uniform draws in 5..15 kW.
    pub fn random(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let values: Vec<f64> = (0..FALLBACK_STEPS)
            .map(|_| rng.random_range(5.0..15.0))
            .collect();
        Self {
            timestep: (0..FALLBACK_STEPS).collect(),
            series: BTreeMap::from([(FALLBACK_SERIES.to_string(), values)]),
        }
    }

    pub fn len(&self) -> usize {
        self.timestep.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestep.is_empty()
    }

    pub fn series_names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Largest value across all series.
    pub fn peak_kw(&self) -> Option<f64> {
        self.series.values().flatten().copied().reduce(f64::max)
    }
}

/// Body of a load demand submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadDemandPayload {
    pub project_id: String,
    pub load_profile: LoadProfile,
}

/// Store for step 4.
#[derive(Debug, Clone)]
pub struct LoadDemandStore {
    project_id: String,
    profile: Option<LoadProfile>,
    visible_seasons: Vec<String>,
    ramp_enabled: bool,
    seed: u64,
}

impl Default for LoadDemandStore {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT_ID, 42)
    }
}

impl LoadDemandStore {
    /// Starts with the sample profile loaded. `seed` drives the fallback
    /// profile used when the profile is cleared.
    pub fn new(project_id: impl Into<String>, seed: u64) -> Self {
        let mut store = Self {
            project_id: project_id.into(),
            profile: None,
            visible_seasons: Vec::new(),
            ramp_enabled: false,
            seed,
        };
        store.set_profile(LoadProfile::sample());
        store
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn profile(&self) -> Option<&LoadProfile> {
        self.profile.as_ref()
    }

    pub fn visible_seasons(&self) -> &[String] {
        &self.visible_seasons
    }

    pub fn ramp_enabled(&self) -> bool {
        self.ramp_enabled
    }

    pub fn set_ramp_enabled(&mut self, enabled: bool) {
        self.ramp_enabled = enabled;
    }

    /// Replaces the profile and shows all of its series.
    pub fn set_profile(&mut self, profile: LoadProfile) {
        self.visible_seasons = profile.series_names().map(str::to_string).collect();
        debug!(steps = profile.len(), series = ?self.visible_seasons, "load profile set");
        self.profile = Some(profile);
    }

    /// Parses a CSV profile and makes it current.
    ///
    /// # Errors
    ///
    /// [`StoreError::Profile`] if the CSV is invalid; the current profile is kept.
    pub fn load_csv(&mut self, reader: impl Read) -> Result<(), StoreError> {
        let profile = io::read_profile(reader)?;
        self.set_profile(profile);
        Ok(())
    }

    /// Like [`load_csv`](Self::load_csv), reading from a file.
    ///
    /// # Errors
    ///
    /// [`StoreError::Profile`] if the file cannot be read or is invalid.
    pub fn load_csv_path(&mut self, path: &Path) -> Result<(), StoreError> {
        let profile = io::read_profile_path(path)?;
        info!(path = %path.display(), steps = profile.len(), "load profile imported");
        self.set_profile(profile);
        Ok(())
    }

    /// Shows or hides one series in the chart. Unknown names are ignored.
    pub fn toggle_season(&mut self, name: &str, visible: bool) {
        let known = self
            .profile
            .as_ref()
            .is_some_and(|p| p.series.contains_key(name));
        if !known {
            return;
        }
        let shown = self.visible_seasons.iter().any(|s| s == name);
        if visible && !shown {
            self.visible_seasons.push(name.to_string());
        } else if !visible && shown {
            self.visible_seasons.retain(|s| s != name);
        }
    }

    pub fn is_visible(&self, name: &str) -> bool {
        self.visible_seasons.iter().any(|s| s == name)
    }

    /// Drops the profile. Submission then sends the generated fallback.
    pub fn clear(&mut self) {
        self.profile = None;
        self.visible_seasons.clear();
    }

    pub fn reset(&mut self) {
        *self = Self::new(std::mem::take(&mut self.project_id), self.seed);
    }

    /// The body that [`submit`](Self::submit) sends.
    pub fn payload(&self) -> LoadDemandPayload {
        let load_profile = match &self.profile {
            Some(p) => p.clone(),
            None => {
                debug!(seed = self.seed, "no load profile, generating fallback");
                LoadProfile::random(self.seed)
            }
        };
        LoadDemandPayload {
            project_id: self.project_id.clone(),
            load_profile,
        }
    }

    /// Posts the load profile to `/api/load-demand`.
    ///
    /// # Errors
    ///
    /// See [`submit_json`].
    pub async fn submit<B: Backend>(&self, backend: &B) -> Result<Value, SubmitError> {
        submit_json(backend, Endpoint::LoadDemand, &self.payload()).await
    }
}
