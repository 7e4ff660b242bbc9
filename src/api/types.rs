//! API response and query types.

use serde::{Deserialize, Serialize};

use crate::components::EnabledComponents;
use crate::layouts::{Compatibility, Layout};

/// Query for `GET /api/layouts/compatible`. Omitted keys count as off.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompatibleQuery {
    pub solar_pv: bool,
    pub wind_turbine: bool,
    pub mini_hydro: bool,
    pub battery: bool,
    pub diesel_generator: bool,
    pub biogas_generator: bool,
    pub grid_connection: bool,
    pub fully_ac: bool,
}

impl From<CompatibleQuery> for EnabledComponents {
    fn from(q: CompatibleQuery) -> Self {
        Self {
            solar_pv: q.solar_pv,
            wind_turbine: q.wind_turbine,
            mini_hydro: q.mini_hydro,
            battery: q.battery,
            diesel_generator: q.diesel_generator,
            biogas_generator: q.biogas_generator,
            grid_connection: q.grid_connection,
            fully_ac: q.fully_ac,
        }
    }
}

/// Filter result for a set of enabled components.
#[derive(Debug, Serialize)]
pub struct CompatibleResponse {
    /// Components the filter was evaluated against.
    pub enabled_components: EnabledComponents,
    /// Layouts on offer, in catalog order.
    pub layouts: Vec<&'static Layout>,
    /// `true` when nothing matched and the full catalog is returned.
    pub fallback: bool,
}

impl CompatibleResponse {
    pub fn new(enabled_components: EnabledComponents, c: Compatibility) -> Self {
        Self {
            enabled_components,
            layouts: c.layouts,
            fallback: c.fallback,
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
