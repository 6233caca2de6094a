//! Controller type descriptors.
//!
//! # Responsibilities
//! - Declare a controller's actions, hooks and settings once at startup
//! - Link a controller to its parent for inherited actions and settings
//!
//! # Design Decisions
//! - Immutable after `build()`; shared via Arc by the route table
//! - Identity is a process-unique `ControllerId`, not the name
//! - Settings resolve controller → parents → application defaults

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::ControllerDefaults;
use crate::controller::context::Controller;
use crate::controller::handler::{Action, ActionError, Handler};
use crate::templates::selector::TemplateSelector;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a controller type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControllerId(u64);

type HookFn = dyn Fn(&mut Controller) -> Result<(), ActionError> + Send + Sync;

/// A before/after hook, optionally limited to some actions.
#[derive(Clone)]
pub struct Hook {
    only: Option<HashSet<String>>,
    run: Arc<HookFn>,
}

impl Hook {
    pub fn applies_to(&self, action: &str) -> bool {
        self.only.as_ref().is_none_or(|only| only.contains(action))
    }

    pub fn run(&self, controller: &mut Controller) -> Result<(), ActionError> {
        (self.run)(controller)
    }
}

/// Settings declared directly on one controller type. Unset values fall
/// through to the parent, then to [`ControllerDefaults`].
#[derive(Debug, Clone, Default)]
pub struct ControllerSettings {
    pub default_action: Option<String>,
    pub default_view: Option<TemplateSelector>,
    pub default_layout: Option<TemplateSelector>,
}

/// Descriptor of a controller: its actions, hooks, settings and parent.
pub struct ControllerType {
    id: ControllerId,
    name: String,
    parent: Option<Arc<ControllerType>>,
    actions: HashMap<String, Arc<Action>>,
    before: Vec<Hook>,
    after: Vec<Hook>,
    settings: ControllerSettings,
}

impl ControllerType {
    pub fn builder(name: impl Into<String>) -> ControllerTypeBuilder {
        ControllerTypeBuilder {
            name: name.into(),
            parent: None,
            actions: HashMap::new(),
            before: Vec::new(),
            after: Vec::new(),
            settings: ControllerSettings::default(),
        }
    }

    pub fn id(&self) -> ControllerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<ControllerType>> {
        self.parent.as_ref()
    }

    /// This type followed by its parents, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &ControllerType> {
        std::iter::successors(Some(self), |ty| ty.parent.as_deref())
    }

    /// Actions declared on this type only.
    pub fn declared_actions(&self) -> impl Iterator<Item = &Arc<Action>> {
        self.actions.values()
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// First value `pick` finds walking from this type up its parents.
    pub fn resolve_setting<T>(&self, pick: impl Fn(&ControllerSettings) -> Option<&T>) -> Option<&T> {
        self.ancestors().find_map(|ty| pick(&ty.settings))
    }

    pub fn default_action<'a>(&'a self, defaults: &'a ControllerDefaults) -> &'a str {
        self.resolve_setting(|s| s.default_action.as_ref())
            .unwrap_or(&defaults.default_action)
    }

    pub fn default_view(&self, defaults: &ControllerDefaults) -> Option<TemplateSelector> {
        self.resolve_setting(|s| s.default_view.as_ref())
            .cloned()
            .or_else(|| defaults.default_view.clone().map(TemplateSelector::Fixed))
    }

    pub fn default_layout(&self, defaults: &ControllerDefaults) -> Option<TemplateSelector> {
        self.resolve_setting(|s| s.default_layout.as_ref())
            .cloned()
            .or_else(|| defaults.default_layout.clone().map(TemplateSelector::Fixed))
    }

    /// Before hooks for `action`, outermost ancestor first.
    pub fn before_hooks(&self, action: &str) -> Vec<Hook> {
        let mut chain: Vec<&ControllerType> = self.ancestors().collect();
        chain.reverse();
        chain
            .into_iter()
            .flat_map(|ty| ty.before.iter())
            .filter(|hook| hook.applies_to(action))
            .cloned()
            .collect()
    }

    /// After hooks for `action`, this type first.
    pub fn after_hooks(&self, action: &str) -> Vec<Hook> {
        self.ancestors()
            .flat_map(|ty| ty.after.iter())
            .filter(|hook| hook.applies_to(action))
            .cloned()
            .collect()
    }
}

impl std::fmt::Debug for ControllerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut actions: Vec<_> = self.actions.keys().collect();
        actions.sort();
        f.debug_struct("ControllerType")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("actions", &actions)
            .finish()
    }
}

/// Builder for [`ControllerType`].
pub struct ControllerTypeBuilder {
    name: String,
    parent: Option<Arc<ControllerType>>,
    actions: HashMap<String, Arc<Action>>,
    before: Vec<Hook>,
    after: Vec<Hook>,
    settings: ControllerSettings,
}

impl ControllerTypeBuilder {
    /// Inherit actions, hooks and settings from `parent`.
    pub fn extends(mut self, parent: &Arc<ControllerType>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// Declare an action. Redeclaring a name replaces the earlier handler.
    pub fn action<H, Args>(mut self, name: impl Into<String>, handler: H) -> Self
    where
        H: Handler<Args>,
        Args: 'static,
    {
        let action = Action::new(name, handler);
        self.actions.insert(action.name().to_string(), Arc::new(action));
        self
    }

    pub fn before<F>(self, hook: F) -> Self
    where
        F: Fn(&mut Controller) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.push_before(None, hook)
    }

    pub fn before_only<F>(self, actions: &[&str], hook: F) -> Self
    where
        F: Fn(&mut Controller) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.push_before(Some(only(actions)), hook)
    }

    pub fn after<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Controller) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.after.push(Hook {
            only: None,
            run: Arc::new(hook),
        });
        self
    }

    pub fn after_only<F>(mut self, actions: &[&str], hook: F) -> Self
    where
        F: Fn(&mut Controller) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.after.push(Hook {
            only: Some(only(actions)),
            run: Arc::new(hook),
        });
        self
    }

    pub fn default_action(mut self, action: impl Into<String>) -> Self {
        self.settings.default_action = Some(action.into());
        self
    }

    pub fn default_view(mut self, selector: impl Into<TemplateSelector>) -> Self {
        self.settings.default_view = Some(selector.into());
        self
    }

    pub fn default_layout(mut self, selector: impl Into<TemplateSelector>) -> Self {
        self.settings.default_layout = Some(selector.into());
        self
    }

    pub fn build(self) -> Arc<ControllerType> {
        Arc::new(ControllerType {
            id: ControllerId(NEXT_ID.fetch_add(1, Ordering::Relaxed)),
            name: self.name,
            parent: self.parent,
            actions: self.actions,
            before: self.before,
            after: self.after,
            settings: self.settings,
        })
    }

    fn push_before<F>(mut self, only: Option<HashSet<String>>, hook: F) -> Self
    where
        F: Fn(&mut Controller) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.before.push(Hook {
            only,
            run: Arc::new(hook),
        });
        self
    }
}

fn only(actions: &[&str]) -> HashSet<String> {
    actions.iter().map(|a| a.to_string()).collect()
}
