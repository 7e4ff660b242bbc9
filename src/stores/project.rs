use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::backend::{Backend, SubmitError, submit_json};
use crate::endpoints::Endpoint;

/// Site coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            latitude: -2.05627616659381,
            longitude: 41.11023900111167,
        }
    }
}

/// Partial update for [`Location`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocationPatch {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LocationPatch {
    fn apply(&self, target: &mut Location) {
        if let Some(v) = self.latitude {
            target.latitude = v;
        }
        if let Some(v) = self.longitude {
            target.longitude = v;
        }
    }
}

/// Length of one simulation timestep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeResolution {
    #[default]
    #[serde(rename = "hours")]
    Hours,
    #[serde(rename = "30-minutes")]
    HalfHour,
    #[serde(rename = "15-minutes")]
    QuarterHour,
    #[serde(rename = "minute")]
    Minute,
}

impl TimeResolution {
    pub const ALL: [TimeResolution; 4] = [
        TimeResolution::Hours,
        TimeResolution::HalfHour,
        TimeResolution::QuarterHour,
        TimeResolution::Minute,
    ];

    /// Wire value, e.g. `"30-minutes"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hours => "hours",
            Self::HalfHour => "30-minutes",
            Self::QuarterHour => "15-minutes",
            Self::Minute => "minute",
        }
    }

    /// Timesteps in one day.
    pub fn steps_per_day(self) -> u32 {
        match self {
            Self::Hours => 24,
            Self::HalfHour => 48,
            Self::QuarterHour => 96,
            Self::Minute => 1440,
        }
    }
}

impl fmt::Display for TimeResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How many seasons the year is split into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Seasonality {
    #[default]
    #[serde(rename = "2 seasons")]
    Two,
    #[serde(rename = "4 seasons")]
    Four,
}

impl Seasonality {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Two => "2 seasons",
            Self::Four => "4 seasons",
        }
    }

    pub fn count(self) -> u8 {
        match self {
            Self::Two => 2,
            Self::Four => 4,
        }
    }
}

impl fmt::Display for Seasonality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contents of the project setup step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectData {
    pub project_name: String,
    pub description: String,
    pub location: Location,
    /// Planning horizon in years.
    pub time_horizon: u32,
    pub time_resolution: TimeResolution,
    pub seasonality_enabled: bool,
    /// Only meaningful while `seasonality_enabled` is set.
    pub seasonality_option: Seasonality,
}

impl Default for ProjectData {
    fn default() -> Self {
        Self {
            project_name: String::new(),
            description: String::new(),
            location: Location::default(),
            time_horizon: 20,
            time_resolution: TimeResolution::Hours,
            seasonality_enabled: false,
            seasonality_option: Seasonality::Two,
        }
    }
}

/// Partial update for [`ProjectData`].
///
/// Top-level fields replace; `location` merges one level deep.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectPatch {
    pub project_name: Option<String>,
    pub description: Option<String>,
    pub location: Option<LocationPatch>,
    pub time_horizon: Option<u32>,
    pub time_resolution: Option<TimeResolution>,
    pub seasonality_enabled: Option<bool>,
    pub seasonality_option: Option<Seasonality>,
}

impl ProjectPatch {
    pub fn apply(&self, target: &mut ProjectData) {
        if let Some(v) = &self.project_name {
            target.project_name.clone_from(v);
        }
        if let Some(v) = &self.description {
            target.description.clone_from(v);
        }
        if let Some(loc) = &self.location {
            loc.apply(&mut target.location);
        }
        if let Some(v) = self.time_horizon {
            target.time_horizon = v;
        }
        if let Some(v) = self.time_resolution {
            target.time_resolution = v;
        }
        if let Some(v) = self.seasonality_enabled {
            target.seasonality_enabled = v;
        }
        if let Some(v) = self.seasonality_option {
            target.seasonality_option = v;
        }
    }
}

/// Store for step 1.
#[derive(Debug, Clone, Default)]
pub struct ProjectStore {
    data: ProjectData,
}

impl ProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> &ProjectData {
        &self.data
    }

    pub fn update(&mut self, patch: &ProjectPatch) {
        patch.apply(&mut self.data);
        debug!(project = %self.data.project_name, "project data updated");
    }

    pub fn set_location(&mut self, latitude: f64, longitude: f64) {
        self.data.location = Location {
            latitude,
            longitude,
        };
        debug!(latitude, longitude, "location set");
    }

    /// The season split in effect, or `None` when seasonality is off.
    pub fn effective_seasonality(&self) -> Option<Seasonality> {
        self.data
            .seasonality_enabled
            .then_some(self.data.seasonality_option)
    }

    pub fn reset(&mut self) {
        self.data = ProjectData::default();
    }

    /// Posts the project data to `/api/project-setup`.
    ///
    /// # Errors
    ///
    /// See [`submit_json`].
    pub async fn submit<B: Backend>(&self, backend: &B) -> Result<Value, SubmitError> {
        submit_json(backend, Endpoint::ProjectSetup, &self.data).await
    }
}
