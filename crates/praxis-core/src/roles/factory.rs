//! Role factory - registry mapping the closed role set to strategies
//!
//! Dispatch is explicit: an unregistered role yields a distinguishable
//! error, and the orchestrator's Coder fallback is a named method here
//! rather than a side effect of exception handling.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use super::{AgentRole, CoderRole, PlannerRole, TesterRole};
use crate::error::{Error, Result};
use crate::types::RoleKind;

type RoleConstructor = Box<dyn Fn() -> Arc<dyn AgentRole> + Send + Sync>;

/// Registry of role constructors.
///
/// Supports runtime (re)registration - swap in a custom Coder or a no-op
/// Tester without touching the orchestrator.
pub struct RoleFactory {
    constructors: HashMap<RoleKind, RoleConstructor>,
}

impl RoleFactory {
    /// Empty factory with no roles registered
    #[must_use]
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Factory with the three built-in strategies registered
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut factory = Self::new();
        factory.register(RoleKind::Planner, || Arc::new(PlannerRole::new()));
        factory.register(RoleKind::Coder, || Arc::new(CoderRole::new()));
        factory.register(RoleKind::Tester, || Arc::new(TesterRole::new()));
        factory
    }

    /// Register (or replace) the constructor for a role
    pub fn register<F>(&mut self, kind: RoleKind, constructor: F)
    where
        F: Fn() -> Arc<dyn AgentRole> + Send + Sync + 'static,
    {
        self.constructors.insert(kind, Box::new(constructor));
    }

    /// Create the strategy for a role.
    ///
    /// Fails with [`Error::UnsupportedRole`] when the role has no
    /// registered constructor.
    pub fn create(&self, kind: RoleKind) -> Result<Arc<dyn AgentRole>> {
        self.constructors
            .get(&kind)
            .map(|ctor| ctor())
            .ok_or_else(|| Error::UnsupportedRole {
                role: kind.to_string(),
            })
    }

    /// Create the strategy for a role, falling back to the Coder.
    ///
    /// The intentional default for unsupported roles at dispatch time: the
    /// pipeline degrades to "just write code" rather than aborting the
    /// whole task.
    #[must_use]
    pub fn create_or_coder(&self, kind: RoleKind) -> Arc<dyn AgentRole> {
        match self.create(kind) {
            Ok(role) => role,
            Err(e) => {
                warn!(role = %kind, error = %e, "role unsupported, falling back to coder");
                self.create(RoleKind::Coder)
                    .unwrap_or_else(|_| Arc::new(CoderRole::new()))
            }
        }
    }

    /// Whether a role has a registered constructor
    #[must_use]
    pub fn supports(&self, kind: RoleKind) -> bool {
        self.constructors.contains_key(&kind)
    }
}

impl Default for RoleFactory {
    fn default() -> Self {
        Self::with_defaults()
    }
}
