//! Energy-system building blocks that a user can switch on or off.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifies one component of a decentralized energy system.
///
/// `GridConnection` and `FullyAc` are design toggles rather than physical
/// generation or storage units; they never carry technology parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKey {
    SolarPv,
    WindTurbine,
    MiniHydro,
    Battery,
    DieselGenerator,
    BiogasGenerator,
    GridConnection,
    FullyAc,
}

impl ComponentKey {
    /// All keys in display order.
    pub const ALL: [ComponentKey; 8] = [
        ComponentKey::SolarPv,
        ComponentKey::WindTurbine,
        ComponentKey::MiniHydro,
        ComponentKey::Battery,
        ComponentKey::DieselGenerator,
        ComponentKey::BiogasGenerator,
        ComponentKey::GridConnection,
        ComponentKey::FullyAc,
    ];

    /// Wire name, e.g. `"solar_pv"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SolarPv => "solar_pv",
            Self::WindTurbine => "wind_turbine",
            Self::MiniHydro => "mini_hydro",
            Self::Battery => "battery",
            Self::DieselGenerator => "diesel_generator",
            Self::BiogasGenerator => "biogas_generator",
            Self::GridConnection => "grid_connection",
            Self::FullyAc => "fully_ac",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::SolarPv => "Solar PV",
            Self::WindTurbine => "Wind Turbine",
            Self::MiniHydro => "Mini-Hydro",
            Self::Battery => "Battery",
            Self::DieselGenerator => "Diesel",
            Self::BiogasGenerator => "Biomass",
            Self::GridConnection => "Main Grid Connection",
            Self::FullyAc => "Fully AC System",
        }
    }

    /// Returns `true` for the two system-level switches.
    pub fn is_toggle_only(self) -> bool {
        matches!(self, Self::GridConnection | Self::FullyAc)
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown component key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown component \"{0}\"")]
pub struct UnknownComponent(pub String);

impl FromStr for ComponentKey {
    type Err = UnknownComponent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownComponent(s.to_string()))
    }
}

/// On/off state of every component key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnabledComponents {
    pub solar_pv: bool,
    pub wind_turbine: bool,
    pub mini_hydro: bool,
    pub battery: bool,
    pub diesel_generator: bool,
    pub biogas_generator: bool,
    pub grid_connection: bool,
    pub fully_ac: bool,
}

impl Default for EnabledComponents {
    fn default() -> Self {
        Self {
            solar_pv: true,
            wind_turbine: false,
            mini_hydro: false,
            battery: true,
            diesel_generator: false,
            biogas_generator: false,
            grid_connection: false,
            fully_ac: true,
        }
    }
}

impl EnabledComponents {
    /// Everything switched off.
    pub fn none() -> Self {
        Self {
            solar_pv: false,
            wind_turbine: false,
            mini_hydro: false,
            battery: false,
            diesel_generator: false,
            biogas_generator: false,
            grid_connection: false,
            fully_ac: false,
        }
    }

    /// Builds a state with exactly the given keys switched on.
    pub fn with(keys: &[ComponentKey]) -> Self {
        let mut enabled = Self::none();
        for key in keys {
            enabled.set(*key, true);
        }
        enabled
    }

    pub fn is_enabled(&self, key: ComponentKey) -> bool {
        match key {
            ComponentKey::SolarPv => self.solar_pv,
            ComponentKey::WindTurbine => self.wind_turbine,
            ComponentKey::MiniHydro => self.mini_hydro,
            ComponentKey::Battery => self.battery,
            ComponentKey::DieselGenerator => self.diesel_generator,
            ComponentKey::BiogasGenerator => self.biogas_generator,
            ComponentKey::GridConnection => self.grid_connection,
            ComponentKey::FullyAc => self.fully_ac,
        }
    }

    pub fn set(&mut self, key: ComponentKey, enabled: bool) {
        let slot = match key {
            ComponentKey::SolarPv => &mut self.solar_pv,
            ComponentKey::WindTurbine => &mut self.wind_turbine,
            ComponentKey::MiniHydro => &mut self.mini_hydro,
            ComponentKey::Battery => &mut self.battery,
            ComponentKey::DieselGenerator => &mut self.diesel_generator,
            ComponentKey::BiogasGenerator => &mut self.biogas_generator,
            ComponentKey::GridConnection => &mut self.grid_connection,
            ComponentKey::FullyAc => &mut self.fully_ac,
        };
        *slot = enabled;
    }

    /// Keys currently switched on, in [`ComponentKey::ALL`] order.
    pub fn enabled_keys(&self) -> Vec<ComponentKey> {
        ComponentKey::ALL
            .into_iter()
            .filter(|k| self.is_enabled(*k))
            .collect()
    }
}

/// Partial update for [`EnabledComponents`]; `None` leaves a key untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnabledComponentsPatch {
    pub solar_pv: Option<bool>,
    pub wind_turbine: Option<bool>,
    pub mini_hydro: Option<bool>,
    pub battery: Option<bool>,
    pub diesel_generator: Option<bool>,
    pub biogas_generator: Option<bool>,
    pub grid_connection: Option<bool>,
    pub fully_ac: Option<bool>,
}

impl EnabledComponentsPatch {
    /// A patch touching a single key.
    pub fn single(key: ComponentKey, enabled: bool) -> Self {
        let mut patch = Self::default();
        patch.set(key, enabled);
        patch
    }

    pub fn get(&self, key: ComponentKey) -> Option<bool> {
        match key {
            ComponentKey::SolarPv => self.solar_pv,
            ComponentKey::WindTurbine => self.wind_turbine,
            ComponentKey::MiniHydro => self.mini_hydro,
            ComponentKey::Battery => self.battery,
            ComponentKey::DieselGenerator => self.diesel_generator,
            ComponentKey::BiogasGenerator => self.biogas_generator,
            ComponentKey::GridConnection => self.grid_connection,
            ComponentKey::FullyAc => self.fully_ac,
        }
    }

    pub fn set(&mut self, key: ComponentKey, enabled: bool) {
        let slot = match key {
            ComponentKey::SolarPv => &mut self.solar_pv,
            ComponentKey::WindTurbine => &mut self.wind_turbine,
            ComponentKey::MiniHydro => &mut self.mini_hydro,
            ComponentKey::Battery => &mut self.battery,
            ComponentKey::DieselGenerator => &mut self.diesel_generator,
            ComponentKey::BiogasGenerator => &mut self.biogas_generator,
            ComponentKey::GridConnection => &mut self.grid_connection,
            ComponentKey::FullyAc => &mut self.fully_ac,
        };
        *slot = Some(enabled);
    }

    /// Merges the patch into `target`. Returns `true` if any value changed.
    pub fn apply(&self, target: &mut EnabledComponents) -> bool {
        let mut changed = false;
        for key in ComponentKey::ALL {
            if let Some(value) = self.get(key) {
                changed |= target.is_enabled(key) != value;
                target.set(key, value);
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_initial_wizard_state() {
        let enabled = EnabledComponents::default();
        assert_eq!(
            enabled.enabled_keys(),
            vec![
                ComponentKey::SolarPv,
                ComponentKey::Battery,
                ComponentKey::FullyAc
            ]
        );
    }

    #[test]
    fn parse_round_trips_wire_names() {
        for key in ComponentKey::ALL {
            assert_eq!(key.as_str().parse::<ComponentKey>(), Ok(key));
        }
        assert!("nuclear".parse::<ComponentKey>().is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&ComponentKey::DieselGenerator).unwrap();
        assert_eq!(json, "\"diesel_generator\"");
    }

    #[test]
    fn patch_preserves_absent_keys() {
        let mut enabled = EnabledComponents::default();
        let changed = EnabledComponentsPatch::single(ComponentKey::WindTurbine, true).apply(&mut enabled);
        assert!(changed);
        assert!(enabled.wind_turbine);
        assert!(enabled.solar_pv);
        assert!(enabled.battery);
        assert!(enabled.fully_ac);
    }

    #[test]
    fn patch_reports_no_change_when_value_equal() {
        let mut enabled = EnabledComponents::default();
        let changed = EnabledComponentsPatch::single(ComponentKey::SolarPv, true).apply(&mut enabled);
        assert!(!changed);
    }

    #[test]
    fn toggle_only_keys() {
        let toggles: Vec<_> = ComponentKey::ALL
            .into_iter()
            .filter(|k| k.is_toggle_only())
            .collect();
        assert_eq!(toggles, vec![ComponentKey::GridConnection, ComponentKey::FullyAc]);
    }
}
