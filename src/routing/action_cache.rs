//! Precomputed action tables per controller type.
//!
//! # Responsibilities
//! - Collect each controller's actions, including inherited ones
//! - Answer "is this action callable" and "which invoker" in O(1)
//!
//! # Design Decisions
//! - Built when a route is registered, never at request time
//! - Keyed by the leaf type; a subclass action shadows its parent's
//! - No invalidation: controller types are fixed after startup

use std::collections::HashMap;
use std::sync::Arc;

use crate::controller::{Action, ControllerId, ControllerType};

/// Controller type → action name → invoker.
#[derive(Debug, Default)]
pub struct ActionCache {
    entries: HashMap<ControllerId, HashMap<String, Arc<Action>>>,
}

impl ActionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Precompute the action table for `controller` and its ancestors.
    /// Adding a type twice is a no-op.
    pub fn add(&mut self, controller: &ControllerType) {
        if self.entries.contains_key(&controller.id()) {
            return;
        }

        let mut actions: HashMap<String, Arc<Action>> = HashMap::new();
        for ty in controller.ancestors() {
            for action in ty.declared_actions() {
                actions
                    .entry(action.name().to_string())
                    .or_insert_with(|| Arc::clone(action));
            }
        }

        tracing::debug!(
            controller = %controller.name(),
            actions = actions.len(),
            "Action table built"
        );
        self.entries.insert(controller.id(), actions);
    }

    pub fn is_present(&self, controller: ControllerId, action: &str) -> bool {
        self.entries
            .get(&controller)
            .is_some_and(|actions| actions.contains_key(action))
    }

    pub fn invoker(&self, controller: ControllerId, action: &str) -> Option<&Arc<Action>> {
        self.entries.get(&controller)?.get(action)
    }

    /// Sorted action names for a controller type.
    pub fn action_names(&self, controller: ControllerId) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .entries
            .get(&controller)
            .map(|actions| actions.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Controller, Outcome};

    fn hierarchy() -> (Arc<ControllerType>, Arc<ControllerType>) {
        let parent = ControllerType::builder("A")
            .action("index", |_: &mut Controller| "A#index")
            .action("shared", |_: &mut Controller| "A#shared")
            .build();
        let child = ControllerType::builder("B")
            .extends(&parent)
            .action("shared", |_: &mut Controller| "B#shared")
            .action("extra", |_: &mut Controller, _id: String| ())
            .build();
        (parent, child)
    }

    fn invoke(cache: &ActionCache, ty: &Arc<ControllerType>, action: &str) -> Outcome {
        let request = axum::http::Request::builder().body(Default::default()).unwrap();
        let route_match = crate::controller::RouteMatch {
            controller: ty.name().to_string(),
            route_path: "/".into(),
            action: action.into(),
            params: vec![],
        };
        let mut c = Controller::new(Arc::clone(ty), request, route_match, "/".into());
        cache.invoker(ty.id(), action).unwrap().invoke(&mut c, &[]).unwrap()
    }

    #[test]
    fn test_inherited_actions_present() {
        let (parent, child) = hierarchy();
        let mut cache = ActionCache::new();
        cache.add(&child);

        assert!(cache.is_present(child.id(), "index"));
        assert!(cache.is_present(child.id(), "shared"));
        assert!(cache.is_present(child.id(), "extra"));
        assert!(!cache.is_present(child.id(), "missing"));
        // The parent was never added on its own.
        assert!(!cache.is_present(parent.id(), "index"));
    }

    #[test]
    fn test_subclass_shadows_parent() {
        let (parent, child) = hierarchy();
        let mut cache = ActionCache::new();
        cache.add(&parent);
        cache.add(&child);

        assert_eq!(invoke(&cache, &child, "shared"), Outcome::Text("B#shared".into()));
        assert_eq!(invoke(&cache, &child, "index"), Outcome::Text("A#index".into()));
        assert_eq!(invoke(&cache, &parent, "shared"), Outcome::Text("A#shared".into()));
        assert!(!cache.is_present(parent.id(), "extra"));
    }

    #[test]
    fn test_add_is_idempotent() {
        let (_, child) = hierarchy();
        let mut cache = ActionCache::new();
        cache.add(&child);
        cache.add(&child);
        assert_eq!(cache.action_names(child.id()), vec!["extra", "index", "shared"]);
    }
}
