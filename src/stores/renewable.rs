use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

/// A renewable resource whose site potential can be supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    SolarPv,
    WindTurbine,
    MiniHydro,
}

impl Resource {
    /// Carousel order.
    pub const ALL: [Resource; 3] = [Resource::SolarPv, Resource::WindTurbine, Resource::MiniHydro];

    pub fn label(self) -> &'static str {
        match self {
            Self::SolarPv => "Solar PV",
            Self::WindTurbine => "Wind Turbine",
            Self::MiniHydro => "Mini-Hydro",
        }
    }

    /// What an uploaded CSV is expected to contain.
    pub fn upload_hint(self) -> &'static str {
        match self {
            Self::SolarPv | Self::WindTurbine => {
                "CSV file with electricity production profile per unit of nominal capacity"
            }
            Self::MiniHydro => "CSV file with water flow rate data for mini-hydro potential assessment",
        }
    }

    /// External data service offered for this resource.
    pub fn provider(self) -> &'static str {
        match self {
            Self::SolarPv | Self::WindTurbine => "PVGIS",
            Self::MiniHydro => "Hydro API",
        }
    }

    pub fn provider_hint(self) -> &'static str {
        match self {
            Self::SolarPv => {
                "Download irradiance data from PVGIS API and simulate PV electricity production"
            }
            Self::WindTurbine => {
                "Download wind speed data from PVGIS API and simulate wind electricity production"
            }
            Self::MiniHydro => "Download hydrological data from external APIs",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where the potential data for a resource comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceSource {
    Upload { path: PathBuf },
    Download { provider: String },
}

/// Renewable potential sources, browsed one resource at a time.
///
/// This step has no endpoint; the wizard advances past it without a request.
#[derive(Debug, Clone, Default)]
pub struct RenewablePotentialStore {
    index: usize,
    sources: [Option<ResourceSource>; 3],
}

impl RenewablePotentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Resource {
        Resource::ALL[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Moves to the next resource. Returns `false` at the last one.
    pub fn next(&mut self) -> bool {
        if self.index + 1 < Resource::ALL.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Moves to the previous resource. Returns `false` at the first one.
    pub fn prev(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    /// Records an uploaded file for the current resource.
    pub fn attach_upload(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        info!(resource = %self.current(), path = %path.display(), "potential data attached");
        self.set_source(self.current(), ResourceSource::Upload { path });
    }

    /// Requests the current resource's data from its provider.
    pub fn request_download(&mut self) {
        let resource = self.current();
        info!(%resource, provider = resource.provider(), "potential data download requested");
        self.set_source(
            resource,
            ResourceSource::Download {
                provider: resource.provider().to_string(),
            },
        );
    }

    pub fn set_source(&mut self, resource: Resource, source: ResourceSource) {
        self.sources[resource as usize] = Some(source);
    }

    pub fn source(&self, resource: Resource) -> Option<&ResourceSource> {
        self.sources[resource as usize].as_ref()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carousel_stays_in_bounds() {
        let mut store = RenewablePotentialStore::new();
        assert_eq!(store.current(), Resource::SolarPv);
        assert!(!store.prev());
        assert!(store.next());
        assert!(store.next());
        assert!(!store.next());
        assert_eq!(store.current(), Resource::MiniHydro);
    }

    #[test]
    fn sources_are_per_resource() {
        let mut store = RenewablePotentialStore::new();
        store.attach_upload("data/pv.csv");
        store.next();
        store.request_download();
        store.next();
        store.request_download();

        assert_eq!(
            store.source(Resource::SolarPv),
            Some(&ResourceSource::Upload {
                path: PathBuf::from("data/pv.csv")
            })
        );
        assert_eq!(
            store.source(Resource::WindTurbine),
            Some(&ResourceSource::Download {
                provider: "PVGIS".into()
            })
        );
        assert_eq!(
            store.source(Resource::MiniHydro),
            Some(&ResourceSource::Download {
                provider: "Hydro API".into()
            })
        );
    }

    #[test]
    fn reset_clears_sources() {
        let mut store = RenewablePotentialStore::new();
        store.request_download();
        store.next();
        store.reset();
        assert_eq!(store.index(), 0);
        assert!(store.source(Resource::SolarPv).is_none());
    }
}
