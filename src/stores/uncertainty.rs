use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::DEFAULT_PROJECT_ID;
use crate::backend::{Backend, SubmitError, submit_json};
use crate::endpoints::Endpoint;

/// How grid outages are represented in the optimization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UncertaintyModel {
    /// Deterministic, driven by a grid availability matrix.
    #[default]
    Linear,
    /// Forecast errors and outages replaced by expected values.
    Expected,
    /// Chance-constrained formulation.
    Probabilistic,
}

impl UncertaintyModel {
    pub const ALL: [UncertaintyModel; 3] = [
        UncertaintyModel::Linear,
        UncertaintyModel::Expected,
        UncertaintyModel::Probabilistic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Expected => "expected",
            Self::Probabilistic => "probabilistic",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Linear => "Linear model",
            Self::Expected => "Expected-value model",
            Self::Probabilistic => "Probabilistic model",
        }
    }
}

impl fmt::Display for UncertaintyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Individual or joint chance constraints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChanceConstraint {
    #[default]
    #[serde(rename = "ICC")]
    Individual,
    #[serde(rename = "JCC")]
    Joint,
}

impl ChanceConstraint {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "ICC",
            Self::Joint => "JCC",
        }
    }
}

/// Outage statistics. Unset values are sent as `null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OutageParameters {
    /// Outages per year.
    pub expected_outage_frequency: Option<f64>,
    /// Hours per outage.
    pub expected_outage_duration: Option<f64>,
    pub probability_model: ChanceConstraint,
    /// 0..=1.
    pub probability_of_outage: Option<f64>,
    /// 0..=1.
    pub probability_of_islanding: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutageParametersPatch {
    pub expected_outage_frequency: Option<f64>,
    pub expected_outage_duration: Option<f64>,
    pub probability_model: Option<ChanceConstraint>,
    pub probability_of_outage: Option<f64>,
    pub probability_of_islanding: Option<f64>,
}

impl OutageParametersPatch {
    pub fn apply(&self, target: &mut OutageParameters) {
        if let Some(v) = self.expected_outage_frequency {
            target.expected_outage_frequency = Some(v);
        }
        if let Some(v) = self.expected_outage_duration {
            target.expected_outage_duration = Some(v);
        }
        if let Some(v) = self.probability_model {
            target.probability_model = v;
        }
        if let Some(v) = self.probability_of_outage {
            target.probability_of_outage = Some(v);
        }
        if let Some(v) = self.probability_of_islanding {
            target.probability_of_islanding = Some(v);
        }
    }
}

/// Contents of the model uncertainties step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelUncertainties {
    pub project_id: String,
    pub selected_model: UncertaintyModel,
    pub parameters: OutageParameters,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_availability: Option<PathBuf>,
}

/// Store for step 5.
#[derive(Debug, Clone)]
pub struct UncertaintyStore {
    data: ModelUncertainties,
}

impl Default for UncertaintyStore {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT_ID)
    }
}

impl UncertaintyStore {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            data: ModelUncertainties {
                project_id: project_id.into(),
                selected_model: UncertaintyModel::default(),
                parameters: OutageParameters::default(),
                grid_availability: None,
            },
        }
    }

    pub fn data(&self) -> &ModelUncertainties {
        &self.data
    }

    pub fn select_model(&mut self, model: UncertaintyModel) {
        debug!(%model, "uncertainty model selected");
        self.data.selected_model = model;
    }

    pub fn update_parameters(&mut self, patch: &OutageParametersPatch) {
        patch.apply(&mut self.data.parameters);
    }

    /// Attaches the grid availability matrix used by the linear model.
    pub fn set_grid_availability(&mut self, path: impl AsRef<Path>) {
        self.data.grid_availability = Some(path.as_ref().to_path_buf());
    }

    pub fn reset(&mut self) {
        *self = Self::new(std::mem::take(&mut self.data.project_id));
    }

    /// Posts the model choice to `/api/model-uncertainties`.
    ///
    /// # Errors
    ///
    /// See [`submit_json`].
    pub async fn submit<B: Backend>(&self, backend: &B) -> Result<Value, SubmitError> {
        submit_json(backend, Endpoint::ModelUncertainties, &self.data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalBackend;

    #[test]
    fn parameters_use_camel_case() {
        let store = UncertaintyStore::default();
        let json = serde_json::to_value(store.data()).unwrap();
        assert_eq!(json["selected_model"], "linear");
        assert_eq!(json["parameters"]["probabilityModel"], "ICC");
        assert!(json["parameters"]["expectedOutageFrequency"].is_null());
        assert!(json.get("grid_availability").is_none());
    }

    #[test]
    fn patch_keeps_unset_parameters() {
        let mut store = UncertaintyStore::default();
        store.update_parameters(&OutageParametersPatch {
            probability_of_outage: Some(0.05),
            ..Default::default()
        });
        store.update_parameters(&OutageParametersPatch {
            probability_model: Some(ChanceConstraint::Joint),
            ..Default::default()
        });
        let p = store.data().parameters;
        assert_eq!(p.probability_of_outage, Some(0.05));
        assert_eq!(p.probability_model, ChanceConstraint::Joint);
        assert_eq!(p.expected_outage_duration, None);
    }

    #[tokio::test]
    async fn submit_acknowledges() {
        let mut store = UncertaintyStore::new("abc123");
        store.select_model(UncertaintyModel::Probabilistic);
        let ack = store.submit(&LocalBackend::default()).await.unwrap();
        assert_eq!(ack["status"], "ok");
        assert_eq!(ack["message"], "Model uncertainties saved successfully");
        assert_eq!(ack["project_id"], "abc123");
    }
}
