//! Built-in table of validated system topologies.

use serde::Serialize;

use crate::components::ComponentKey;
use ComponentKey::{
    Battery, BiogasGenerator, DieselGenerator, GridConnection, MiniHydro, SolarPv, WindTurbine,
};

/// A predefined topology describing which components connect via which buses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Layout {
    /// Catalog identifier (1..=12, unique).
    pub id: u8,
    pub name: &'static str,
    pub description: &'static str,
    /// Components that must all be enabled for the layout to be offered.
    pub components: &'static [ComponentKey],
    /// Layout needs the fully-AC toggle on.
    pub requires_ac: bool,
    /// Layout needs the grid-connection toggle on (and is hidden when it is on but not needed).
    pub requires_grid: bool,
}

/// Number of entries in [`CATALOG`].
pub const CATALOG_LEN: usize = 12;

/// The twelve layouts offered by the system-configuration step, in display order.
pub static CATALOG: [Layout; CATALOG_LEN] = [
    Layout {
        id: 1,
        name: "Solar + Battery + AC Load (Fully AC Off-Grid)",
        description: "Solar PV connected to a battery via a charge controller. The battery feeds an inverter, which powers the AC load. This simple off-grid setup is ideal for household-scale or micro-enterprise usage.",
        components: &[SolarPv, Battery],
        requires_ac: true,
        requires_grid: false,
    },
    Layout {
        id: 2,
        name: "Solar + Battery + Grid (Fully AC On-Grid)",
        description: "Solar PV charges the battery, which discharges through an inverter to supply the AC load. The grid supplements supply when solar and battery are insufficient and can charge the battery when needed.",
        components: &[SolarPv, Battery, GridConnection],
        requires_ac: true,
        requires_grid: true,
    },
    Layout {
        id: 3,
        name: "Hybrid AC Mini-Grid (Solar + Diesel + Battery)",
        description: "Solar PV and diesel generator charge the battery. The inverter supplies the AC load. Diesel covers peak or nighttime demand, while solar provides the daytime base load.",
        components: &[SolarPv, DieselGenerator, Battery],
        requires_ac: true,
        requires_grid: false,
    },
    Layout {
        id: 4,
        name: "Fully Renewable AC Mini-Grid (Solar + Wind + Battery)",
        description: "Solar and wind turbine feed a battery storage system. The battery discharges through an inverter to power the AC load. Wind compensates for solar variability.",
        components: &[SolarPv, WindTurbine, Battery],
        requires_ac: true,
        requires_grid: false,
    },
    Layout {
        id: 5,
        name: "DC Microgrid (Solar + Battery + DC Load)",
        description: "Solar PV charges the battery directly via a charge controller. The battery powers DC loads without needing an inverter, suitable for telecom towers, appliances, or small productive systems.",
        components: &[SolarPv, Battery],
        requires_ac: false,
        requires_grid: false,
    },
    Layout {
        id: 6,
        name: "Hydro + Battery + AC Load",
        description: "Mini-hydro generator powers the AC load and charges the battery. The battery supports load balancing and covers demand fluctuations or dry season variations.",
        components: &[MiniHydro, Battery],
        requires_ac: true,
        requires_grid: false,
    },
    Layout {
        id: 7,
        name: "Solar + Battery + DC + AC Loads",
        description: "Battery powers both DC and AC loads via direct feed and inverter. Useful in systems with mixed appliances.",
        components: &[SolarPv, Battery],
        requires_ac: true,
        requires_grid: false,
    },
    Layout {
        id: 8,
        name: "Wind + Battery + AC Load (Off-Grid)",
        description: "Wind turbine charges the battery, which powers the AC load through an inverter. Useful in areas with strong wind resources and limited solar potential.",
        components: &[WindTurbine, Battery],
        requires_ac: true,
        requires_grid: false,
    },
    Layout {
        id: 9,
        name: "Biogas + Battery + AC Load",
        description: "Dispatchable biogas generator feeds the inverter and charges the battery. Battery provides short-term balancing; inverter supplies AC loads.",
        components: &[BiogasGenerator, Battery],
        requires_ac: true,
        requires_grid: false,
    },
    Layout {
        id: 10,
        name: "On-Grid + Diesel Backup + AC Load",
        description: "Grid supplies AC loads under normal conditions. Diesel generator provides backup power through the inverter when the grid is unavailable.",
        components: &[GridConnection, DieselGenerator],
        requires_ac: true,
        requires_grid: true,
    },
    Layout {
        id: 11,
        name: "Solar + Biogas + Grid + Battery + AC Load",
        description: "Solar and biogas feed a battery that supplies AC load via an inverter. Grid acts as a backup or peak provider. Fully renewable primary generation, with grid support.",
        components: &[SolarPv, BiogasGenerator, GridConnection, Battery],
        requires_ac: true,
        requires_grid: true,
    },
    Layout {
        id: 12,
        name: "Solar + Diesel + AC Load (No battery)",
        description: "Solar PV covers daytime loads, diesel handles evening peaks. Simplified system without storage.",
        components: &[SolarPv, DieselGenerator],
        requires_ac: true,
        requires_grid: false,
    },
];

/// Looks up a layout by its catalog id.
pub fn by_id(id: u8) -> Option<&'static Layout> {
    CATALOG.iter().find(|l| l.id == id)
}
