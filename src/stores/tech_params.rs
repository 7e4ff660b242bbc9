use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{DEFAULT_PROJECT_ID, StoreError};
use crate::backend::{Backend, SubmitError, submit_json};
use crate::components::{ComponentKey, EnabledComponents};
use crate::endpoints::Endpoint;

macro_rules! merge_fields {
    ($patch:expr, $target:expr, [$($field:ident),+ $(,)?]) => {
        $(
            if let Some(v) = &$patch.$field {
                $target.$field.clone_from(v);
            }
        )+
    };
}

/// Project-wide financial assumptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicSettings {
    /// Annual discount rate in percent.
    pub discount_rate: f64,
    /// ISO 4217 code.
    pub currency: String,
}

impl Default for EconomicSettings {
    fn default() -> Self {
        Self {
            discount_rate: 6.5,
            currency: "USD".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EconomicSettingsPatch {
    pub discount_rate: Option<f64>,
    pub currency: Option<String>,
}

impl EconomicSettingsPatch {
    pub fn apply(&self, target: &mut EconomicSettings) {
        merge_fields!(self, target, [discount_rate, currency]);
    }
}

/// Cost parameters shared by solar PV, wind and mini-hydro.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenewableParams {
    /// Currency per kW.
    pub investment_cost: f64,
    /// Currency per kW per year.
    pub operation_cost: f64,
    /// Percent of investment.
    pub subsidy: f64,
    /// Years.
    pub lifetime: u32,
}

impl Default for RenewableParams {
    fn default() -> Self {
        Self {
            investment_cost: 1000.0,
            operation_cost: 2.0,
            subsidy: 10.0,
            lifetime: 25,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenewableParamsPatch {
    pub investment_cost: Option<f64>,
    pub operation_cost: Option<f64>,
    pub subsidy: Option<f64>,
    pub lifetime: Option<u32>,
}

/// Battery storage parameters. Efficiencies and SoC bounds are percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatteryParams {
    /// kWh.
    pub nominal_capacity: f64,
    pub investment_cost: f64,
    pub operation_cost: f64,
    pub lifetime: u32,
    /// Hours for a full charge.
    pub charge_time: f64,
    /// Hours for a full discharge.
    pub discharge_time: f64,
    pub charging_efficiency: f64,
    pub discharging_efficiency: f64,
    pub soc_min: f64,
    pub soc_max: f64,
    pub soc_initial: f64,
}

impl Default for BatteryParams {
    fn default() -> Self {
        Self {
            nominal_capacity: 10.0,
            investment_cost: 400.0,
            operation_cost: 1.5,
            lifetime: 10,
            charge_time: 5.0,
            discharge_time: 5.0,
            charging_efficiency: 95.0,
            discharging_efficiency: 95.0,
            soc_min: 20.0,
            soc_max: 90.0,
            soc_initial: 50.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryParamsPatch {
    pub nominal_capacity: Option<f64>,
    pub investment_cost: Option<f64>,
    pub operation_cost: Option<f64>,
    pub lifetime: Option<u32>,
    pub charge_time: Option<f64>,
    pub discharge_time: Option<f64>,
    pub charging_efficiency: Option<f64>,
    pub discharging_efficiency: Option<f64>,
    pub soc_min: Option<f64>,
    pub soc_max: Option<f64>,
    pub soc_initial: Option<f64>,
}

/// Diesel or biogas generator parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FuelGeneratorParams {
    /// kW.
    pub nominal_capacity: f64,
    /// Percent.
    pub nominal_efficiency: f64,
    pub partial_load_enabled: bool,
    /// Points on the part-load efficiency curve.
    pub efficiency_samples: u32,
    pub investment_cost: f64,
    pub operation_cost: f64,
    pub lifetime: u32,
    pub fuel_type: String,
    /// kWh per litre.
    pub lower_heating_value: f64,
    /// Currency per litre.
    pub fuel_cost: f64,
    pub fuel_limit_enabled: bool,
    /// Litres per year.
    pub fuel_limit_max: f64,
}

impl FuelGeneratorParams {
    pub fn diesel() -> Self {
        Self {
            nominal_capacity: 5.0,
            nominal_efficiency: 30.0,
            partial_load_enabled: true,
            efficiency_samples: 5,
            investment_cost: 500.0,
            operation_cost: 3.0,
            lifetime: 15,
            fuel_type: "diesel".to_string(),
            lower_heating_value: 10.5,
            fuel_cost: 1.0,
            fuel_limit_enabled: true,
            fuel_limit_max: 1000.0,
        }
    }

    pub fn biogas() -> Self {
        Self {
            fuel_type: "biogas".to_string(),
            ..Self::diesel()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FuelGeneratorParamsPatch {
    pub nominal_capacity: Option<f64>,
    pub nominal_efficiency: Option<f64>,
    pub partial_load_enabled: Option<bool>,
    pub efficiency_samples: Option<u32>,
    pub investment_cost: Option<f64>,
    pub operation_cost: Option<f64>,
    pub lifetime: Option<u32>,
    pub fuel_type: Option<String>,
    pub lower_heating_value: Option<f64>,
    pub fuel_cost: Option<f64>,
    pub fuel_limit_enabled: Option<bool>,
    pub fuel_limit_max: Option<f64>,
}

/// Which parameter record a component takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Renewable,
    Battery,
    FuelGenerator,
}

impl ParamKind {
    /// `None` for the system toggles.
    pub fn for_component(key: ComponentKey) -> Option<Self> {
        match key {
            ComponentKey::SolarPv | ComponentKey::WindTurbine | ComponentKey::MiniHydro => {
                Some(Self::Renewable)
            }
            ComponentKey::Battery => Some(Self::Battery),
            ComponentKey::DieselGenerator | ComponentKey::BiogasGenerator => {
                Some(Self::FuelGenerator)
            }
            ComponentKey::GridConnection | ComponentKey::FullyAc => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Renewable => "renewable",
            Self::Battery => "battery",
            Self::FuelGenerator => "fuel generator",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameter record of one component. Serializes as the bare record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentParams {
    Battery(BatteryParams),
    FuelGenerator(FuelGeneratorParams),
    Renewable(RenewableParams),
}

impl ComponentParams {
    /// Starting record for a component, or `None` for the system toggles.
    pub fn defaults_for(key: ComponentKey) -> Option<Self> {
        match key {
            ComponentKey::SolarPv | ComponentKey::WindTurbine | ComponentKey::MiniHydro => {
                Some(Self::Renewable(RenewableParams::default()))
            }
            ComponentKey::Battery => Some(Self::Battery(BatteryParams::default())),
            ComponentKey::DieselGenerator => Some(Self::FuelGenerator(FuelGeneratorParams::diesel())),
            ComponentKey::BiogasGenerator => Some(Self::FuelGenerator(FuelGeneratorParams::biogas())),
            ComponentKey::GridConnection | ComponentKey::FullyAc => None,
        }
    }

    pub fn kind(&self) -> ParamKind {
        match self {
            Self::Renewable(_) => ParamKind::Renewable,
            Self::Battery(_) => ParamKind::Battery,
            Self::FuelGenerator(_) => ParamKind::FuelGenerator,
        }
    }
}

/// Partial update for one [`ComponentParams`] record.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentParamsPatch {
    Battery(BatteryParamsPatch),
    FuelGenerator(FuelGeneratorParamsPatch),
    Renewable(RenewableParamsPatch),
}

impl ComponentParamsPatch {
    pub fn kind(&self) -> ParamKind {
        match self {
            Self::Renewable(_) => ParamKind::Renewable,
            Self::Battery(_) => ParamKind::Battery,
            Self::FuelGenerator(_) => ParamKind::FuelGenerator,
        }
    }

    /// Merges into a record of the same kind. Returns `false` on a kind mismatch.
    fn apply(&self, target: &mut ComponentParams) -> bool {
        match (self, target) {
            (Self::Renewable(p), ComponentParams::Renewable(t)) => {
                merge_fields!(p, t, [investment_cost, operation_cost, subsidy, lifetime]);
            }
            (Self::Battery(p), ComponentParams::Battery(t)) => {
                merge_fields!(
                    p,
                    t,
                    [
                        nominal_capacity,
                        investment_cost,
                        operation_cost,
                        lifetime,
                        charge_time,
                        discharge_time,
                        charging_efficiency,
                        discharging_efficiency,
                        soc_min,
                        soc_max,
                        soc_initial,
                    ]
                );
            }
            (Self::FuelGenerator(p), ComponentParams::FuelGenerator(t)) => {
                merge_fields!(
                    p,
                    t,
                    [
                        nominal_capacity,
                        nominal_efficiency,
                        partial_load_enabled,
                        efficiency_samples,
                        investment_cost,
                        operation_cost,
                        lifetime,
                        fuel_type,
                        lower_heating_value,
                        fuel_cost,
                        fuel_limit_enabled,
                        fuel_limit_max,
                    ]
                );
            }
            _ => return false,
        }
        true
    }
}

/// Contents of the technology parameters step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologyParameters {
    pub project_id: String,
    pub project_economic_settings: EconomicSettings,
    pub technology_parameters: BTreeMap<ComponentKey, ComponentParams>,
    /// Component whose form is open. Never sent.
    #[serde(skip)]
    pub selected_component: Option<ComponentKey>,
}

impl TechnologyParameters {
    pub fn new(project_id: impl Into<String>) -> Self {
        let technology_parameters = [
            ComponentKey::SolarPv,
            ComponentKey::Battery,
            ComponentKey::DieselGenerator,
        ]
        .into_iter()
        .filter_map(|key| ComponentParams::defaults_for(key).map(|p| (key, p)))
        .collect();

        Self {
            project_id: project_id.into(),
            project_economic_settings: EconomicSettings::default(),
            technology_parameters,
            selected_component: None,
        }
    }
}

impl Default for TechnologyParameters {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT_ID)
    }
}

/// Store for step 3.
#[derive(Debug, Clone, Default)]
pub struct TechParamsStore {
    params: TechnologyParameters,
}

impl TechParamsStore {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            params: TechnologyParameters::new(project_id),
        }
    }

    pub fn params(&self) -> &TechnologyParameters {
        &self.params
    }

    /// Record for `key`, if one has been set or seeded.
    pub fn component(&self, key: ComponentKey) -> Option<&ComponentParams> {
        self.params.technology_parameters.get(&key)
    }

    pub fn update_economic_settings(&mut self, patch: &EconomicSettingsPatch) {
        patch.apply(&mut self.params.project_economic_settings);
        debug!(
            discount_rate = self.params.project_economic_settings.discount_rate,
            currency = %self.params.project_economic_settings.currency,
            "economic settings updated"
        );
    }

    /// Merges `patch` into the record of `key`, starting from that
    /// component's defaults if it has no record yet.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotConfigurable`] for the system toggles,
    /// [`StoreError::KindMismatch`] if the patch is for another kind of record.
    pub fn update_component_params(
        &mut self,
        key: ComponentKey,
        patch: &ComponentParamsPatch,
    ) -> Result<(), StoreError> {
        let kind = ParamKind::for_component(key).ok_or(StoreError::NotConfigurable(key))?;
        if patch.kind() != kind {
            return Err(StoreError::KindMismatch {
                component: key,
                kind: patch.kind().as_str(),
            });
        }

        let record = match self.params.technology_parameters.entry(key) {
            std::collections::btree_map::Entry::Occupied(e) => e.into_mut(),
            std::collections::btree_map::Entry::Vacant(e) => {
                let defaults =
                    ComponentParams::defaults_for(key).ok_or(StoreError::NotConfigurable(key))?;
                e.insert(defaults)
            }
        };
        if !patch.apply(record) {
            return Err(StoreError::KindMismatch {
                component: key,
                kind: patch.kind().as_str(),
            });
        }
        debug!(component = %key, "component parameters updated");
        Ok(())
    }

    pub fn select_component(&mut self, key: Option<ComponentKey>) {
        self.params.selected_component = key;
    }

    pub fn selected_component(&self) -> Option<ComponentKey> {
        self.params.selected_component
    }

    /// Enabled components that take parameters, in display order.
    pub fn configurable_components(enabled: &EnabledComponents) -> Vec<ComponentKey> {
        enabled
            .enabled_keys()
            .into_iter()
            .filter(|k| !k.is_toggle_only())
            .collect()
    }

    pub fn reset(&mut self) {
        self.params = TechnologyParameters::new(std::mem::take(&mut self.params.project_id));
    }

    /// Posts the parameters to `/api/technology-parameters`.
    ///
    /// # Errors
    ///
    /// See [`submit_json`].
    pub async fn submit<B: Backend>(&self, backend: &B) -> Result<Value, SubmitError> {
        submit_json(backend, Endpoint::TechnologyParameters, &self.params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalBackend;

    #[test]
    fn defaults_seed_solar_battery_and_diesel() {
        let store = TechParamsStore::default();
        let keys: Vec<_> = store.params().technology_parameters.keys().copied().collect();
        assert_eq!(
            keys,
            vec![
                ComponentKey::SolarPv,
                ComponentKey::Battery,
                ComponentKey::DieselGenerator
            ]
        );
        assert_eq!(store.params().project_economic_settings.discount_rate, 6.5);
        assert_eq!(store.params().project_economic_settings.currency, "USD");
    }

    #[test]
    fn economic_patch_keeps_currency() {
        let mut store = TechParamsStore::default();
        store.update_economic_settings(&EconomicSettingsPatch {
            discount_rate: Some(8.0),
            currency: None,
        });
        assert_eq!(store.params().project_economic_settings.discount_rate, 8.0);
        assert_eq!(store.params().project_economic_settings.currency, "USD");
    }

    #[test]
    fn component_patch_merges_one_level_deep() {
        let mut store = TechParamsStore::default();
        store
            .update_component_params(
                ComponentKey::Battery,
                &ComponentParamsPatch::Battery(BatteryParamsPatch {
                    soc_min: Some(10.0),
                    ..Default::default()
                }),
            )
            .unwrap();
        let Some(ComponentParams::Battery(b)) = store.component(ComponentKey::Battery) else {
            panic!("battery record missing");
        };
        assert_eq!(b.soc_min, 10.0);
        assert_eq!(b.soc_max, 90.0);
        assert_eq!(b.nominal_capacity, 10.0);
    }

    #[test]
    fn new_component_starts_from_defaults() {
        let mut store = TechParamsStore::default();
        store
            .update_component_params(
                ComponentKey::BiogasGenerator,
                &ComponentParamsPatch::FuelGenerator(FuelGeneratorParamsPatch {
                    fuel_cost: Some(0.4),
                    ..Default::default()
                }),
            )
            .unwrap();
        let Some(ComponentParams::FuelGenerator(g)) = store.component(ComponentKey::BiogasGenerator)
        else {
            panic!("biogas record missing");
        };
        assert_eq!(g.fuel_type, "biogas");
        assert_eq!(g.fuel_cost, 0.4);
        assert_eq!(g.lifetime, 15);
    }

    #[test]
    fn toggles_are_not_configurable() {
        let mut store = TechParamsStore::default();
        let err = store
            .update_component_params(
                ComponentKey::GridConnection,
                &ComponentParamsPatch::Renewable(RenewableParamsPatch::default()),
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::NotConfigurable(ComponentKey::GridConnection)));
    }

    #[test]
    fn mismatched_patch_is_rejected() {
        let mut store = TechParamsStore::default();
        let err = store
            .update_component_params(
                ComponentKey::SolarPv,
                &ComponentParamsPatch::Battery(BatteryParamsPatch::default()),
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::KindMismatch { .. }));
    }

    #[test]
    fn selected_component_is_not_serialized() {
        let mut store = TechParamsStore::default();
        store.select_component(Some(ComponentKey::Battery));
        let json = serde_json::to_value(store.params()).unwrap();
        assert!(json.get("selected_component").is_none());
        assert_eq!(json["technology_parameters"]["solar_pv"]["lifetime"], 25);
        assert_eq!(json["technology_parameters"]["diesel_generator"]["fuel_type"], "diesel");
    }

    #[test]
    fn configurable_components_skip_toggles() {
        let keys = TechParamsStore::configurable_components(&EnabledComponents::default());
        assert_eq!(keys, vec![ComponentKey::SolarPv, ComponentKey::Battery]);
    }

    #[tokio::test]
    async fn submit_returns_ok() {
        let store = TechParamsStore::default();
        let ack = store.submit(&LocalBackend::default()).await.unwrap();
        assert_eq!(ack["message"], "Technology parameters saved successfully");
    }
}
