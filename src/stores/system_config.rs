use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::DEFAULT_PROJECT_ID;
use crate::backend::{Backend, SubmitError, submit_json};
use crate::components::{ComponentKey, EnabledComponents, EnabledComponentsPatch};
use crate::endpoints::Endpoint;
use crate::layouts::catalog::by_id;
use crate::layouts::{Layout, LayoutCarousel};

/// Contents of the system configuration step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub project_id: String,
    pub enabled_components: EnabledComponents,
    pub layout_id: u8,
}

impl SystemConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            enabled_components: EnabledComponents::default(),
            layout_id: 1,
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT_ID)
    }
}

/// Partial update for [`SystemConfig`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SystemConfigPatch {
    pub project_id: Option<String>,
    pub enabled_components: Option<EnabledComponentsPatch>,
    pub layout_id: Option<u8>,
}

/// Store for step 2.
///
/// Keeps `layout_id` pointing at a layout from the compatible subset whenever
/// the enabled components change.
#[derive(Debug, Clone)]
pub struct SystemConfigStore {
    config: SystemConfig,
    carousel: LayoutCarousel,
}

impl Default for SystemConfigStore {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT_ID)
    }
}

impl SystemConfigStore {
    pub fn new(project_id: impl Into<String>) -> Self {
        let config = SystemConfig::new(project_id);
        let mut carousel = LayoutCarousel::new(&config.enabled_components);
        carousel.select_id(config.layout_id);
        Self { config, carousel }
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Merges `patch`. Component changes re-run the layout filter before an
    /// explicit `layout_id` in the same patch is applied.
    pub fn update(&mut self, patch: &SystemConfigPatch) {
        if let Some(id) = &patch.project_id {
            self.config.project_id.clone_from(id);
        }
        if let Some(components) = &patch.enabled_components {
            components.apply(&mut self.config.enabled_components);
            self.sync_layout();
        }
        if let Some(id) = patch.layout_id {
            if !self.carousel.select_id(id) {
                debug!(layout_id = id, "layout not among compatible layouts");
            }
            self.config.layout_id = id;
        }
    }

    /// Switches one component on or off. Returns the resulting layout id.
    pub fn toggle(&mut self, key: ComponentKey, enabled: bool) -> u8 {
        self.update(&SystemConfigPatch {
            enabled_components: Some(EnabledComponentsPatch::single(key, enabled)),
            ..Default::default()
        });
        self.config.layout_id
    }

    fn sync_layout(&mut self) {
        let id = self.carousel.refresh(&self.config.enabled_components);
        if id != self.config.layout_id {
            debug!(from = self.config.layout_id, to = id, "layout re-synced");
        }
        self.config.layout_id = id;
    }

    /// Advances the carousel. Returns `false` at the last layout.
    pub fn next_layout(&mut self) -> bool {
        self.carousel
            .next()
            .map(|id| self.config.layout_id = id)
            .is_some()
    }

    /// Steps the carousel back. Returns `false` at the first layout.
    pub fn prev_layout(&mut self) -> bool {
        self.carousel
            .prev()
            .map(|id| self.config.layout_id = id)
            .is_some()
    }

    pub fn select_layout_index(&mut self, index: usize) -> bool {
        self.carousel
            .select(index)
            .map(|id| self.config.layout_id = id)
            .is_some()
    }

    /// The layout `layout_id` refers to.
    pub fn current_layout(&self) -> &'static Layout {
        by_id(self.config.layout_id).unwrap_or_else(|| self.carousel.current())
    }

    pub fn available_layouts(&self) -> &[&'static Layout] {
        self.carousel.available()
    }

    pub fn carousel(&self) -> &LayoutCarousel {
        &self.carousel
    }

    pub fn reset(&mut self) {
        *self = Self::new(std::mem::take(&mut self.config.project_id));
    }

    /// Posts the configuration to `/api/system-configuration`.
    ///
    /// # Errors
    ///
    /// See [`submit_json`].
    pub async fn submit<B: Backend>(&self, backend: &B) -> Result<Value, SubmitError> {
        submit_json(backend, Endpoint::SystemConfiguration, &self.config).await
    }
}
