//! Per-step form state.
//!
//! Each store owns the data of one wizard step, merges partial updates into
//! it and submits a snapshot to the step's endpoint. Stores never validate
//! their contents; that is left to the handlers and to
//! [`SessionConfig::validate`](crate::config::SessionConfig::validate).

use crate::components::ComponentKey;

/// Load profile state and CSV import.
pub mod load_demand;
/// Project setup form.
pub mod project;
/// Renewable resource sources.
pub mod renewable;
/// Component selection and layout.
pub mod system_config;
/// Economic settings and per-component technology parameters.
pub mod tech_params;
/// Grid uncertainty model.
pub mod uncertainty;

pub use load_demand::{LoadDemandPayload, LoadDemandStore, LoadProfile};
pub use project::{
    Location, LocationPatch, ProjectData, ProjectPatch, ProjectStore, Seasonality, TimeResolution,
};
pub use renewable::{RenewablePotentialStore, Resource, ResourceSource};
pub use system_config::{SystemConfig, SystemConfigPatch, SystemConfigStore};
pub use tech_params::{
    BatteryParams, BatteryParamsPatch, ComponentParams, ComponentParamsPatch, EconomicSettings,
    EconomicSettingsPatch, FuelGeneratorParams, FuelGeneratorParamsPatch, ParamKind,
    RenewableParams, RenewableParamsPatch, TechParamsStore, TechnologyParameters,
};
pub use uncertainty::{
    ChanceConstraint, ModelUncertainties, OutageParameters, OutageParametersPatch,
    UncertaintyModel, UncertaintyStore,
};

/// Project identifier used until a real one is assigned.
pub const DEFAULT_PROJECT_ID: &str = "abc123";

/// Errors raised by store mutations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} is a system toggle and has no technology parameters")]
    NotConfigurable(ComponentKey),

    #[error("{component} does not take {kind} parameters")]
    KindMismatch {
        component: ComponentKey,
        kind: &'static str,
    },

    #[error("invalid load profile: {0}")]
    Profile(#[from] crate::io::ProfileError),
}
