//! Narrows the layout catalog to the topologies the enabled components can build.

use tracing::debug;

use super::catalog::{CATALOG, Layout};
use crate::components::EnabledComponents;

/// Result of filtering the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compatibility {
    /// Layouts offered to the user, in catalog order. Never empty.
    pub layouts: Vec<&'static Layout>,
    /// `true` when nothing matched and the full catalog is offered instead.
    pub fallback: bool,
}

/// Checks a single layout against the enabled components.
///
/// All three predicates must hold:
/// - every component the layout lists is enabled
/// - `requires_grid` equals the grid-connection toggle
/// - a layout that `requires_ac` needs the fully-AC toggle; one that doesn't always passes
pub fn is_compatible(layout: &Layout, enabled: &EnabledComponents) -> bool {
    let required_match = layout.components.iter().all(|c| enabled.is_enabled(*c));
    let grid_match = layout.requires_grid == enabled.grid_connection;
    let ac_match = !layout.requires_ac || enabled.fully_ac;
    required_match && grid_match && ac_match
}

/// Filters [`CATALOG`], falling back to the whole catalog when no layout matches.
pub fn compatible_layouts(enabled: &EnabledComponents) -> Compatibility {
    let layouts: Vec<&'static Layout> = CATALOG
        .iter()
        .filter(|l| is_compatible(l, enabled))
        .collect();

    if layouts.is_empty() {
        debug!("no compatible layout, offering the full catalog");
        Compatibility {
            layouts: CATALOG.iter().collect(),
            fallback: true,
        }
    } else {
        Compatibility {
            layouts,
            fallback: false,
        }
    }
}

/// Selection state over the currently compatible layouts.
///
/// Mirrors the layout carousel of the system-configuration step: the user
/// pages through the available layouts and the selected one becomes the
/// configuration's `layout_id`.
#[derive(Debug, Clone)]
pub struct LayoutCarousel {
    available: Vec<&'static Layout>,
    index: usize,
    fallback: bool,
}

impl LayoutCarousel {
    /// Creates a carousel positioned on the first compatible layout.
    pub fn new(enabled: &EnabledComponents) -> Self {
        let Compatibility { layouts, fallback } = compatible_layouts(enabled);
        Self {
            available: layouts,
            index: 0,
            fallback,
        }
    }

    /// Recomputes the available layouts after the components changed.
    ///
    /// Keeps the current index when it is still in range, otherwise resets to
    /// the first layout. Entering fallback always selects catalog entry 1.
    /// Returns the id of the selected layout.
    pub fn refresh(&mut self, enabled: &EnabledComponents) -> u8 {
        let Compatibility { layouts, fallback } = compatible_layouts(enabled);
        let entering_fallback = fallback && !self.fallback;
        self.available = layouts;
        self.fallback = fallback;
        if entering_fallback {
            debug!("no compatible layout, selecting catalog entry 1");
            self.index = 0;
        } else if self.index >= self.available.len() {
            debug!(
                index = self.index,
                available = self.available.len(),
                "selection out of range, resetting to first layout"
            );
            self.index = 0;
        }
        self.current().id
    }

    /// Layouts currently offered.
    pub fn available(&self) -> &[&'static Layout] {
        &self.available
    }

    /// Zero-based position of the selection.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether the carousel is showing the unfiltered catalog.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// The selected layout.
    pub fn current(&self) -> &'static Layout {
        // `available` is never empty and `index` is kept in range.
        debug_assert!(self.index < self.available.len());
        self.available.get(self.index).copied().unwrap_or(&CATALOG[0])
    }

    /// Moves to the next layout. Returns the new id, or `None` at the end.
    pub fn next(&mut self) -> Option<u8> {
        if self.index + 1 < self.available.len() {
            self.index += 1;
            Some(self.current().id)
        } else {
            None
        }
    }

    /// Moves to the previous layout. Returns the new id, or `None` at the start.
    pub fn prev(&mut self) -> Option<u8> {
        if self.index > 0 {
            self.index -= 1;
            Some(self.current().id)
        } else {
            None
        }
    }

    /// Selects by position. Out-of-range positions are ignored.
    pub fn select(&mut self, index: usize) -> Option<u8> {
        if index < self.available.len() {
            self.index = index;
            Some(self.current().id)
        } else {
            None
        }
    }

    /// Selects by layout id if that layout is on offer.
    pub fn select_id(&mut self, id: u8) -> bool {
        match self.available.iter().position(|l| l.id == id) {
            Some(pos) => {
                self.index = pos;
                true
            }
            None => false,
        }
    }

    /// `"2 of 3"`-style position label.
    pub fn position(&self) -> String {
        format!("{} of {}", self.index + 1, self.available.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ComponentKey::*;

    fn ids(c: &Compatibility) -> Vec<u8> {
        c.layouts.iter().map(|l| l.id).collect()
    }

    #[test]
    fn default_components_offer_off_grid_solar_layouts() {
        let c = compatible_layouts(&EnabledComponents::default());
        assert_eq!(ids(&c), vec![1, 5, 7]);
        assert!(!c.fallback);
    }

    #[test]
    fn off_grid_solar_battery_excludes_grid_layouts() {
        let enabled = EnabledComponents::with(&[SolarPv, Battery, FullyAc]);
        let c = compatible_layouts(&enabled);
        assert!(ids(&c).contains(&1));
        assert!(c.layouts.iter().all(|l| !l.requires_grid));
    }

    #[test]
    fn grid_diesel_ac_offers_layout_ten() {
        let enabled = EnabledComponents::with(&[GridConnection, FullyAc, DieselGenerator]);
        let c = compatible_layouts(&enabled);
        assert_eq!(ids(&c), vec![10]);
    }

    #[test]
    fn grid_toggle_is_equality_not_implication() {
        // Grid on hides layouts that do not need it.
        let enabled = EnabledComponents::with(&[SolarPv, Battery, FullyAc, GridConnection]);
        let c = compatible_layouts(&enabled);
        assert_eq!(ids(&c), vec![2]);
    }

    #[test]
    fn ac_check_is_asymmetric() {
        // Fully AC on still shows the DC microgrid.
        let on = compatible_layouts(&EnabledComponents::with(&[SolarPv, Battery, FullyAc]));
        assert!(ids(&on).contains(&5));
        // Fully AC off leaves only the DC microgrid.
        let off = compatible_layouts(&EnabledComponents::with(&[SolarPv, Battery]));
        assert_eq!(ids(&off), vec![5]);
    }

    #[test]
    fn nothing_enabled_falls_back_to_full_catalog() {
        let c = compatible_layouts(&EnabledComponents::none());
        assert!(c.fallback);
        assert_eq!(c.layouts.len(), 12);
    }

    #[test]
    fn never_empty_for_any_configuration() {
        for bits in 0u16..256 {
            let mut enabled = EnabledComponents::none();
            for (i, key) in crate::components::ComponentKey::ALL.into_iter().enumerate() {
                enabled.set(key, bits & (1 << i) != 0);
            }
            assert!(!compatible_layouts(&enabled).layouts.is_empty(), "bits={bits:08b}");
        }
    }

    #[test]
    fn carousel_resets_when_list_shrinks() {
        let mut carousel = LayoutCarousel::new(&EnabledComponents::default());
        assert_eq!(carousel.select(2), Some(7));

        let id = carousel.refresh(&EnabledComponents::with(&[SolarPv, Battery]));
        assert_eq!(carousel.index(), 0);
        assert_eq!(id, 5);
    }

    #[test]
    fn entering_fallback_selects_first_catalog_entry() {
        let mut carousel = LayoutCarousel::new(&EnabledComponents::default());
        assert_eq!(carousel.select(2), Some(7));

        let id = carousel.refresh(&EnabledComponents::none());
        assert!(carousel.is_fallback());
        assert_eq!(carousel.index(), 0);
        assert_eq!(id, 1);

        // Paging inside the fallback list survives a refresh that stays in fallback.
        assert_eq!(carousel.select(4), Some(5));
        let mut still_none = EnabledComponents::none();
        still_none.set(WindTurbine, true);
        assert_eq!(carousel.refresh(&still_none), 5);
    }

    #[test]
    fn carousel_keeps_index_in_range() {
        let mut carousel = LayoutCarousel::new(&EnabledComponents::default());
        carousel.select(1);
        let id = carousel.refresh(&EnabledComponents::default());
        assert_eq!(carousel.index(), 1);
        assert_eq!(id, 5);
    }

    #[test]
    fn carousel_stops_at_edges() {
        let mut carousel = LayoutCarousel::new(&EnabledComponents::default());
        assert_eq!(carousel.prev(), None);
        assert_eq!(carousel.next(), Some(5));
        assert_eq!(carousel.next(), Some(7));
        assert_eq!(carousel.next(), None);
        assert_eq!(carousel.position(), "3 of 3");
    }

    #[test]
    fn select_id_only_accepts_offered_layouts() {
        let mut carousel = LayoutCarousel::new(&EnabledComponents::default());
        assert!(carousel.select_id(7));
        assert_eq!(carousel.index(), 2);
        assert!(!carousel.select_id(10));
        assert_eq!(carousel.index(), 2);
    }
}
