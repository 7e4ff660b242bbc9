//! TOML-based session configuration and preset definitions.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::components::{ComponentKey, EnabledComponents, EnabledComponentsPatch};
use crate::layouts::catalog::CATALOG_LEN;
use crate::layouts::compatible_layouts;
use crate::stores::{
    ChanceConstraint, ComponentParamsPatch, DEFAULT_PROJECT_ID, EconomicSettingsPatch,
    LocationPatch, OutageParametersPatch, ParamKind, ProjectPatch, Resource, ResourceSource,
    Seasonality, SystemConfigPatch, UncertaintyModel,
};
use crate::wizard::WizardState;

/// Top-level session configuration parsed from TOML.
///
/// Every section is optional. Store sections are patches applied on top of
/// the wizard's initial values, so a file only lists what it changes. Load
/// from TOML with [`SessionConfig::from_toml_file`] or start from a preset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Session identity and timing.
    #[serde(default)]
    pub session: SessionSection,
    /// HTTP server settings for `--serve`.
    #[serde(default)]
    pub server: ServerConfig,
    /// Log filter and format.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Project setup values.
    #[serde(default)]
    pub project: ProjectPatch,
    /// Component switches and layout.
    #[serde(default)]
    pub system: SystemConfigPatch,
    /// Discount rate and currency.
    #[serde(default)]
    pub economics: EconomicSettingsPatch,
    /// Per-component technology parameters, keyed by component. Each table
    /// is read as the parameter patch of that component's kind.
    #[serde(default)]
    pub technology: BTreeMap<ComponentKey, toml::Table>,
    /// Load profile source.
    #[serde(default)]
    pub load: LoadConfig,
    /// Grid uncertainty model.
    #[serde(default)]
    pub uncertainty: UncertaintyConfig,
    /// Renewable potential sources, keyed by resource.
    #[serde(default)]
    pub resources: BTreeMap<Resource, ResourceSource>,
}

/// Session identity and timing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionSection {
    /// Identifier sent with every submission.
    pub project_id: String,
    /// Seed for the generated fallback load profile.
    pub seed: u64,
    /// Simulated handler latency in milliseconds.
    pub latency_ms: u64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            project_id: DEFAULT_PROJECT_ID.to_string(),
            seed: 42,
            latency_ms: 1000,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Logging settings. `RUST_LOG` takes precedence over `filter`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive string.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,tower_http=info".to_string(),
            json: false,
        }
    }
}

/// Load profile source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadConfig {
    /// CSV file to import. Takes precedence over `sample`.
    pub profile_csv: Option<PathBuf>,
    /// Start from the built-in winter/summer sample. When `false` and no CSV
    /// is given, a seeded random profile is submitted.
    pub sample: bool,
    /// Series shown in the chart. All series when unset.
    pub visible_seasons: Option<Vec<String>>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            profile_csv: None,
            sample: true,
            visible_seasons: None,
        }
    }
}

/// Grid uncertainty model.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UncertaintyConfig {
    pub model: UncertaintyModel,
    pub parameters: OutageParametersPatch,
    /// Grid availability matrix for the linear model.
    pub grid_availability: Option<PathBuf>,
}

/// Configuration error with field path and constraint description.
#[derive(Debug, thiserror::Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"project.location.latitude"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl SessionConfig {
    /// Returns the off-grid solar preset: the wizard's initial values.
    pub fn offgrid_solar() -> Self {
        Self {
            project: ProjectPatch {
                project_name: Some("Off-grid solar home system".to_string()),
                ..ProjectPatch::default()
            },
            ..Self::default()
        }
    }

    /// Returns the grid-backup preset: grid supply with diesel backup (layout 10).
    pub fn grid_backup() -> Self {
        Self {
            project: ProjectPatch {
                project_name: Some("Grid-connected clinic with diesel backup".to_string()),
                time_horizon: Some(15),
                ..ProjectPatch::default()
            },
            system: SystemConfigPatch {
                enabled_components: Some(EnabledComponentsPatch {
                    solar_pv: Some(false),
                    battery: Some(false),
                    diesel_generator: Some(true),
                    grid_connection: Some(true),
                    fully_ac: Some(true),
                    ..EnabledComponentsPatch::default()
                }),
                ..SystemConfigPatch::default()
            },
            uncertainty: UncertaintyConfig {
                model: UncertaintyModel::Expected,
                parameters: OutageParametersPatch {
                    expected_outage_frequency: Some(24.0),
                    expected_outage_duration: Some(3.0),
                    ..OutageParametersPatch::default()
                },
                grid_availability: None,
            },
            ..Self::default()
        }
    }

    /// Returns the hybrid mini-grid preset: solar, diesel and battery (layout 3).
    pub fn hybrid_minigrid() -> Self {
        Self {
            project: ProjectPatch {
                project_name: Some("Hybrid village mini-grid".to_string()),
                seasonality_enabled: Some(true),
                seasonality_option: Some(Seasonality::Four),
                ..ProjectPatch::default()
            },
            system: SystemConfigPatch {
                enabled_components: Some(EnabledComponentsPatch {
                    diesel_generator: Some(true),
                    ..EnabledComponentsPatch::default()
                }),
                layout_id: Some(3),
                ..SystemConfigPatch::default()
            },
            economics: EconomicSettingsPatch {
                discount_rate: Some(8.0),
                currency: None,
            },
            uncertainty: UncertaintyConfig {
                model: UncertaintyModel::Probabilistic,
                parameters: OutageParametersPatch {
                    probability_model: Some(ChanceConstraint::Joint),
                    probability_of_outage: Some(0.05),
                    probability_of_islanding: Some(0.9),
                    ..OutageParametersPatch::default()
                },
                grid_availability: None,
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["offgrid_solar", "grid_backup", "hybrid_minigrid"];

    /// Loads a session from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "offgrid_solar" => Ok(Self::offgrid_solar()),
            "grid_backup" => Ok(Self::grid_backup()),
            "hybrid_minigrid" => Ok(Self::hybrid_minigrid()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a session from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("session", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a session from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Component switches after applying `[system]` to the initial state.
    pub fn enabled_components(&self) -> EnabledComponents {
        let mut enabled = EnabledComponents::default();
        if let Some(patch) = &self.system.enabled_components {
            patch.apply(&mut enabled);
        }
        enabled
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.session.project_id.trim().is_empty() {
            errors.push(ConfigError::new("session.project_id", "must not be empty"));
        }
        if self.server.port == 0 {
            errors.push(ConfigError::new("server.port", "must be > 0"));
        }
        if let Err(e) = tracing_subscriber::EnvFilter::try_new(&self.logging.filter) {
            errors.push(ConfigError::new("logging.filter", e.to_string()));
        }

        let p = &self.project;
        if p.project_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            errors.push(ConfigError::new("project.project_name", "must not be empty"));
        }
        if let Some(LocationPatch {
            latitude,
            longitude,
        }) = p.location
        {
            if latitude.is_some_and(|v| !(-90.0..=90.0).contains(&v)) {
                errors.push(ConfigError::new(
                    "project.location.latitude",
                    "must be in [-90, 90]",
                ));
            }
            if longitude.is_some_and(|v| !(-180.0..=180.0).contains(&v)) {
                errors.push(ConfigError::new(
                    "project.location.longitude",
                    "must be in [-180, 180]",
                ));
            }
        }
        if p.time_horizon == Some(0) {
            errors.push(ConfigError::new("project.time_horizon", "must be > 0"));
        }

        if let Some(id) = self.system.layout_id {
            if id == 0 || usize::from(id) > CATALOG_LEN {
                errors.push(ConfigError::new(
                    "system.layout_id",
                    format!("must be in [1, {CATALOG_LEN}], got {id}"),
                ));
            } else {
                let offered = compatible_layouts(&self.enabled_components());
                if !offered.layouts.iter().any(|l| l.id == id) {
                    let ids: Vec<String> =
                        offered.layouts.iter().map(|l| l.id.to_string()).collect();
                    errors.push(ConfigError::new(
                        "system.layout_id",
                        format!(
                            "layout {id} is not compatible with the enabled components (offered: {})",
                            ids.join(", ")
                        ),
                    ));
                }
            }
        }

        let e = &self.economics;
        if e.discount_rate.is_some_and(|r| r < 0.0) {
            errors.push(ConfigError::new("economics.discount_rate", "must be >= 0"));
        }
        if let Some(c) = &e.currency {
            if !(c.len() == 3 && c.chars().all(|ch| ch.is_ascii_uppercase())) {
                errors.push(ConfigError::new(
                    "economics.currency",
                    format!("must be a three-letter ISO code, got \"{c}\""),
                ));
            }
        }

        for (key, table) in &self.technology {
            if let Err(e) = technology_patch(*key, table) {
                errors.push(e);
            }
        }

        let u = &self.uncertainty.parameters;
        for (field, value) in [
            ("probability_of_outage", u.probability_of_outage),
            ("probability_of_islanding", u.probability_of_islanding),
        ] {
            if value.is_some_and(|v| !(0.0..=1.0).contains(&v)) {
                errors.push(ConfigError::new(
                    format!("uncertainty.parameters.{field}"),
                    "must be in [0.0, 1.0]",
                ));
            }
        }
        for (field, value) in [
            ("expected_outage_frequency", u.expected_outage_frequency),
            ("expected_outage_duration", u.expected_outage_duration),
        ] {
            if value.is_some_and(|v| v < 0.0) {
                errors.push(ConfigError::new(
                    format!("uncertainty.parameters.{field}"),
                    "must be >= 0",
                ));
            }
        }

        errors
    }

    /// Builds wizard state with every section applied.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a technology patch does not fit its
    /// component or the load profile CSV cannot be imported.
    pub fn build_state(&self) -> Result<WizardState, ConfigError> {
        let mut state = WizardState::new(&self.session.project_id, self.session.seed);

        state.project.update(&self.project);
        state.system.update(&self.system);
        state.tech.update_economic_settings(&self.economics);
        for (key, table) in &self.technology {
            let patch = technology_patch(*key, table)?;
            state
                .tech
                .update_component_params(*key, &patch)
                .map_err(|e| ConfigError::new(format!("technology.{key}"), e.to_string()))?;
        }

        let load = &self.load;
        if let Some(path) = &load.profile_csv {
            state
                .load
                .load_csv_path(path)
                .map_err(|e| ConfigError::new("load.profile_csv", e.to_string()))?;
        } else if !load.sample {
            state.load.clear();
        }
        if let Some(visible) = &load.visible_seasons {
            let names: Vec<String> = state
                .load
                .profile()
                .map(|p| p.series_names().map(str::to_string).collect())
                .unwrap_or_default();
            for name in names {
                state.load.toggle_season(&name, visible.contains(&name));
            }
        }

        state.uncertainty.select_model(self.uncertainty.model);
        state
            .uncertainty
            .update_parameters(&self.uncertainty.parameters);
        if let Some(path) = &self.uncertainty.grid_availability {
            state.uncertainty.set_grid_availability(path);
        }

        for (resource, source) in &self.resources {
            state.renewable.set_source(*resource, source.clone());
        }

        Ok(state)
    }
}

/// Reads a `[technology.<key>]` table as the patch type of that component.
fn technology_patch(
    key: ComponentKey,
    table: &toml::Table,
) -> Result<ComponentParamsPatch, ConfigError> {
    let field = format!("technology.{key}");
    let kind = ParamKind::for_component(key)
        .ok_or_else(|| ConfigError::new(&field, "system toggles take no parameters"))?;
    let value = toml::Value::Table(table.clone());
    let patch = match kind {
        ParamKind::Renewable => value.try_into().map(ComponentParamsPatch::Renewable),
        ParamKind::Battery => value.try_into().map(ComponentParamsPatch::Battery),
        ParamKind::FuelGenerator => value.try_into().map(ComponentParamsPatch::FuelGenerator),
    };
    patch.map_err(|e| ConfigError::new(field, format!("invalid {kind} parameters: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::{ComponentParams, TimeResolution};

    #[test]
    fn default_session_valid() {
        let cfg = SessionConfig::default();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "default should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = SessionConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in SessionConfig::PRESETS {
            let cfg = SessionConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
            assert!(cfg.map(|c| c.build_state().is_ok()).unwrap_or(false));
        }
    }

    #[test]
    fn presets_select_expected_layouts() {
        let layout = |cfg: SessionConfig| cfg.build_state().map(|s| s.system.config().layout_id).ok();
        assert_eq!(layout(SessionConfig::offgrid_solar()), Some(1));
        assert_eq!(layout(SessionConfig::grid_backup()), Some(10));
        assert_eq!(layout(SessionConfig::hybrid_minigrid()), Some(3));
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[session]
project_id = "lamu-01"
seed = 7
latency_ms = 0

[server]
port = 8080

[project]
project_name = "Lamu"
time_resolution = "15-minutes"
location = { latitude = -2.27 }

[system]
enabled_components = { wind_turbine = true }

[economics]
currency = "KES"

[technology.wind_turbine]
investment_cost = 1500.0
lifetime = 20

[technology.battery]
soc_min = 15.0

[load]
sample = false

[uncertainty]
model = "probabilistic"
parameters = { probability_model = "JCC", probability_of_outage = 0.1 }

[resources.solar_pv]
kind = "download"
provider = "PVGIS"
"#;
        let cfg = SessionConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.unwrap();
        assert!(cfg.validate().is_empty());
        assert_eq!(cfg.server.port, 8080);

        let state = cfg.build_state().unwrap();
        assert_eq!(state.project.data().project_name, "Lamu");
        assert_eq!(state.project.data().time_resolution, TimeResolution::QuarterHour);
        assert_eq!(state.project.data().location.latitude, -2.27);
        assert_eq!(state.project.data().location.longitude, 41.11023900111167);
        assert!(state.system.config().enabled_components.wind_turbine);
        assert_eq!(state.system.config().project_id, "lamu-01");
        assert_eq!(state.tech.params().project_economic_settings.currency, "KES");
        assert_eq!(state.tech.params().project_economic_settings.discount_rate, 6.5);
        assert!(matches!(
            state.tech.component(ComponentKey::WindTurbine),
            Some(ComponentParams::Renewable(r)) if r.lifetime == 20 && r.subsidy == 10.0
        ));
        assert!(state.load.profile().is_none());
        assert_eq!(state.uncertainty.data().selected_model, UncertaintyModel::Probabilistic);
        assert_eq!(
            state.uncertainty.data().parameters.probability_model,
            ChanceConstraint::Joint
        );
        assert!(state.renewable.source(Resource::SolarPv).is_some());
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[project]
project_name = "x"
bogus_field = true
"#;
        assert!(SessionConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn unknown_component_key_is_rejected() {
        let toml = r#"
[system]
enabled_components = { nuclear = true }
"#;
        assert!(SessionConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn validation_catches_bad_latitude() {
        let mut cfg = SessionConfig::default();
        cfg.project.location = Some(LocationPatch {
            latitude: Some(91.0),
            longitude: None,
        });
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "project.location.latitude"));
    }

    #[test]
    fn validation_catches_zero_horizon() {
        let mut cfg = SessionConfig::default();
        cfg.project.time_horizon = Some(0);
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "project.time_horizon"));
    }

    #[test]
    fn validation_catches_incompatible_layout() {
        let mut cfg = SessionConfig::default();
        cfg.system.layout_id = Some(10);
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "system.layout_id"));

        cfg.system.layout_id = Some(13);
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.message.contains("[1, 12]")));
    }

    #[test]
    fn validation_catches_bad_currency() {
        let mut cfg = SessionConfig::default();
        cfg.economics.currency = Some("usd".to_string());
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "economics.currency"));
    }

    #[test]
    fn validation_catches_parameters_for_toggle() {
        let toml = r#"
[technology.grid_connection]
subsidy = 5.0
"#;
        let cfg = SessionConfig::from_toml_str(toml).unwrap();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "technology.grid_connection"));
        assert!(cfg.build_state().is_err());
    }

    #[test]
    fn technology_fields_must_fit_component_kind() {
        let toml = r#"
[technology.solar_pv]
soc_min = 10.0
"#;
        let cfg = SessionConfig::from_toml_str(toml).unwrap();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "technology.solar_pv"));
    }

    #[test]
    fn validation_catches_probability_range() {
        let mut cfg = SessionConfig::default();
        cfg.uncertainty.parameters.probability_of_islanding = Some(1.5);
        let errors = cfg.validate();
        assert!(
            errors
                .iter()
                .any(|e| e.field == "uncertainty.parameters.probability_of_islanding")
        );
    }

    #[test]
    fn validation_catches_bad_log_filter() {
        let mut cfg = SessionConfig::default();
        cfg.logging.filter = "info,[".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "logging.filter"));
    }

    #[test]
    fn missing_profile_csv_fails_build() {
        let mut cfg = SessionConfig::default();
        cfg.load.profile_csv = Some(PathBuf::from("/nonexistent/profile.csv"));
        let err = cfg.build_state().unwrap_err();
        assert_eq!(err.field, "load.profile_csv");
    }

    #[test]
    fn visible_seasons_hide_others() {
        let mut cfg = SessionConfig::default();
        cfg.load.visible_seasons = Some(vec!["winter".to_string()]);
        let state = cfg.build_state().unwrap();
        assert!(state.load.is_visible("winter"));
        assert!(!state.load.is_visible("summer"));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[session]
seed = 99
"#;
        let cfg = SessionConfig::from_toml_str(toml);
        assert!(cfg.is_ok());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.session.seed), Some(99));
        assert_eq!(cfg.as_ref().map(|c| c.session.latency_ms), Some(1000));
        assert_eq!(
            cfg.as_ref().map(|c| c.session.project_id.as_str()),
            Some("abc123")
        );
    }
}
