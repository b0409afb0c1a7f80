//! Panel Registry
//!
//! Arena of panels addressed by [`PanelId`]. Parent/child links are ids, not
//! references, so removing a panel never leaves anything dangling.
//!
//! Iteration is ordered by id, which keeps tick order and sibling scans
//! deterministic from run to run.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::messages::PanelId;
use crate::panel::Panel;

/// Errors raised when registering a panel
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A panel with this id is already registered
    #[error("panel '{0}' is already registered")]
    DuplicatePanel(PanelId),

    /// The panel names a parent that is not registered
    #[error("panel '{panel}' names unregistered parent '{parent}'")]
    UnknownParent {
        /// Panel being registered
        panel: PanelId,
        /// Missing parent
        parent: PanelId,
    },
}

/// Registry of live panels
#[derive(Debug, Default)]
pub struct PanelRegistry {
    panels: BTreeMap<PanelId, Panel>,
}

impl PanelRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a panel and link it to its parent
    ///
    /// The first registration of an id wins; later ones are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicatePanel`] if the id is taken and
    /// [`RegistryError::UnknownParent`] if the parent is not registered.
    pub fn register(&mut self, panel: Panel) -> Result<(), RegistryError> {
        let id = panel.id().clone();
        if self.panels.contains_key(&id) {
            tracing::warn!(panel = %id, "Duplicate panel registration ignored");
            return Err(RegistryError::DuplicatePanel(id));
        }

        if let Some(parent_id) = panel.parent().cloned() {
            let Some(parent) = self.panels.get_mut(&parent_id) else {
                tracing::warn!(panel = %id, parent = %parent_id, "Panel names unregistered parent");
                return Err(RegistryError::UnknownParent {
                    panel: id,
                    parent: parent_id,
                });
            };
            parent.add_child(id.clone());
        }

        tracing::info!(panel = %id, parent = ?panel.parent().map(PanelId::as_str), "Panel registered");
        self.panels.insert(id, panel);
        Ok(())
    }

    /// Remove a panel
    ///
    /// The panel is detached from its parent and its children become roots.
    pub fn unregister(&mut self, id: &PanelId) -> Option<Panel> {
        let mut panel = self.panels.remove(id)?;

        if let Some(parent) = panel.parent().and_then(|p| self.panels.get_mut(p)) {
            parent.remove_child(id);
        }
        for child in panel.take_children() {
            if let Some(child) = self.panels.get_mut(&child) {
                child.set_parent(None);
            }
        }
        panel.set_parent(None);

        tracing::info!(panel = %id, "Panel unregistered");
        Some(panel)
    }

    /// Look up a panel
    #[must_use]
    pub fn get(&self, id: &PanelId) -> Option<&Panel> {
        self.panels.get(id)
    }

    /// Look up a panel mutably
    pub fn get_mut(&mut self, id: &PanelId) -> Option<&mut Panel> {
        self.panels.get_mut(id)
    }

    /// Whether `id` is registered
    #[must_use]
    pub fn contains(&self, id: &PanelId) -> bool {
        self.panels.contains_key(id)
    }

    /// Registered ids, in iteration order
    #[must_use]
    pub fn ids(&self) -> Vec<PanelId> {
        self.panels.keys().cloned().collect()
    }

    /// Iterate over every panel
    pub fn iter(&self) -> impl Iterator<Item = (&PanelId, &Panel)> {
        self.panels.iter()
    }

    /// Iterate mutably over every panel
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&PanelId, &mut Panel)> {
        self.panels.iter_mut()
    }

    /// Panels sharing `id`'s parent, excluding `id` itself
    ///
    /// Roots are siblings of each other.
    #[must_use]
    pub fn siblings_of(&self, id: &PanelId) -> Vec<PanelId> {
        let Some(panel) = self.panels.get(id) else {
            return Vec::new();
        };
        let parent = panel.parent();
        self.panels
            .iter()
            .filter(|(other, p)| *other != id && p.parent() == parent)
            .map(|(other, _)| other.clone())
            .collect()
    }

    /// Ancestors of `id`, nearest first
    #[must_use]
    pub fn ancestors_of(&self, id: &PanelId) -> Vec<PanelId> {
        let mut ancestors = Vec::new();
        let mut current = self.panels.get(id).and_then(Panel::parent);
        while let Some(parent) = current {
            if ancestors.contains(parent) || ancestors.len() >= self.panels.len() {
                break;
            }
            ancestors.push(parent.clone());
            current = self.panels.get(parent).and_then(Panel::parent);
        }
        ancestors
    }

    /// Number of registered panels
    #[must_use]
    pub fn len(&self) -> usize {
        self.panels.len()
    }

    /// Whether no panels are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Remove every panel
    pub fn clear(&mut self) {
        self.panels.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::PanelSettings;

    use pretty_assertions::assert_eq;

    fn panel(id: &str) -> Panel {
        Panel::new(id, PanelSettings::default())
    }

    fn ids(names: &[&str]) -> Vec<PanelId> {
        names.iter().map(|n| PanelId::new(*n)).collect()
    }

    fn tree() -> PanelRegistry {
        let mut registry = PanelRegistry::new();
        registry.register(panel("root")).unwrap();
        registry.register(panel("menu").with_parent("root")).unwrap();
        registry.register(panel("inventory").with_parent("menu")).unwrap();
        registry.register(panel("map").with_parent("menu")).unwrap();
        registry.register(panel("quests").with_parent("menu")).unwrap();
        registry
    }

    #[test]
    fn test_register_links_children() {
        let registry = tree();
        assert_eq!(registry.len(), 5);
        assert_eq!(
            registry.get(&PanelId::new("menu")).unwrap().children(),
            ids(&["inventory", "map", "quests"]).as_slice()
        );
    }

    #[test]
    fn test_duplicate_first_wins() {
        let mut registry = PanelRegistry::new();
        registry.register(panel("menu")).unwrap();

        let err = registry
            .register(panel("menu").with_parent("elsewhere"))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicatePanel(PanelId::new("menu")));
        assert_eq!(registry.get(&PanelId::new("menu")).unwrap().parent(), None);
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let mut registry = PanelRegistry::new();
        let err = registry.register(panel("map").with_parent("menu")).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownParent { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_siblings_and_ancestors() {
        let registry = tree();
        assert_eq!(
            registry.siblings_of(&PanelId::new("map")),
            ids(&["inventory", "quests"])
        );
        assert_eq!(
            registry.ancestors_of(&PanelId::new("map")),
            ids(&["menu", "root"])
        );
        assert!(registry.ancestors_of(&PanelId::new("root")).is_empty());
        assert!(registry.siblings_of(&PanelId::new("missing")).is_empty());
    }

    #[test]
    fn test_roots_are_siblings() {
        let mut registry = PanelRegistry::new();
        registry.register(panel("hud")).unwrap();
        registry.register(panel("pause")).unwrap();
        assert_eq!(registry.siblings_of(&PanelId::new("hud")), ids(&["pause"]));
    }

    #[test]
    fn test_unregister_orphans_children() {
        let mut registry = tree();
        let removed = registry.unregister(&PanelId::new("menu")).unwrap();

        assert_eq!(removed.id(), &PanelId::new("menu"));
        assert!(registry.get(&PanelId::new("root")).unwrap().children().is_empty());
        assert_eq!(registry.get(&PanelId::new("map")).unwrap().parent(), None);
        assert!(registry.unregister(&PanelId::new("menu")).is_none());
    }
}
