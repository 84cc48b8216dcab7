//! Capability registry.
//!
//! The [`CapabilityRegistry`] binds capability names to adapters. It is
//! filled during start-up, then moved into a
//! [`Dispatcher`](crate::dispatcher::Dispatcher), which only ever reads it.
//! There is no global instance.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::adapter::{Adapter, FnAdapter};
use crate::capability::{CapabilityDescriptor, Category};
use crate::config::DispatchConfig;
use crate::error::{AdapterResult, DispatchError, DispatchResult};
use crate::interop::RawOutput;
use crate::params::Parameters;

/// What `register` does when the name is already bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Last registration wins; the previous adapter is handed back.
    #[default]
    Replace,
    /// Fail with [`DispatchError::DuplicateCapability`].
    Reject,
}

/// Name → adapter table.
pub struct CapabilityRegistry {
    adapters: FxHashMap<String, Arc<dyn Adapter>>,
    policy: ConflictPolicy,
}

impl CapabilityRegistry {
    /// Create an empty registry with the default [`ConflictPolicy::Replace`].
    pub fn new() -> Self {
        Self::with_policy(ConflictPolicy::default())
    }

    /// Create an empty registry with an explicit conflict policy.
    pub fn with_policy(policy: ConflictPolicy) -> Self {
        Self {
            adapters: FxHashMap::default(),
            policy,
        }
    }

    /// Create an empty registry using the configured conflict policy.
    pub fn from_config(config: &DispatchConfig) -> Self {
        Self::with_policy(config.conflict_policy)
    }

    /// Conflict policy applied by [`register`](Self::register).
    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Bind `adapter` to `name`.
    ///
    /// Under `Replace`, returns the adapter previously bound to `name`, if
    /// any. Under `Reject`, fails if `name` is taken.
    ///
    /// If the descriptor carries a library requirement, the reported
    /// library version must satisfy it or registration fails with
    /// [`DispatchError::IncompatibleVersion`]. An adapter that reports no
    /// version is accepted with a warning.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        adapter: Arc<dyn Adapter>,
    ) -> DispatchResult<Option<Arc<dyn Adapter>>> {
        let name = name.into();
        if self.policy == ConflictPolicy::Reject && self.adapters.contains_key(&name) {
            return Err(DispatchError::DuplicateCapability(name));
        }
        check_version(&name, adapter.describe())?;
        debug!(
            capability = %name,
            library = %adapter.describe().library,
            "Registering capability"
        );
        let previous = self.adapters.insert(name.clone(), adapter);
        if previous.is_some() {
            debug!(capability = %name, "Replaced previously registered adapter");
        }
        Ok(previous)
    }

    /// Register an adapter under the name in its own descriptor.
    pub fn register_adapter(
        &mut self,
        adapter: impl Adapter + 'static,
    ) -> DispatchResult<Option<Arc<dyn Adapter>>> {
        let name = adapter.describe().name.clone();
        self.register(name, Arc::new(adapter))
    }

    /// Register a synchronous closure as the adapter for `descriptor`.
    pub fn register_fn<F>(
        &mut self,
        descriptor: CapabilityDescriptor,
        f: F,
    ) -> DispatchResult<Option<Arc<dyn Adapter>>>
    where
        F: Fn(&Parameters) -> AdapterResult<RawOutput> + Send + Sync + 'static,
    {
        self.register_adapter(FnAdapter::blocking(descriptor, f))
    }

    /// Adapter bound to `name`.
    pub fn resolve(&self, name: &str) -> DispatchResult<Arc<dyn Adapter>> {
        let adapter = self
            .adapters
            .get(name)
            .cloned()
            .ok_or_else(|| DispatchError::UnknownCapability(name.to_string()))?;
        debug!(capability = %name, library = %adapter.describe().library, "Resolved capability");
        Ok(adapter)
    }

    /// Remove and return the adapter bound to `name`.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn Adapter>> {
        let removed = self.adapters.remove(name);
        if removed.is_some() {
            debug!(capability = %name, "Unregistered capability");
        }
        removed
    }

    /// Returns `true` if an adapter is bound to `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.adapters.contains_key(name)
    }

    /// Number of bound capabilities.
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Registered capability names, sorted.
    pub fn capabilities(&self) -> Vec<String> {
        let mut names: Vec<_> = self.adapters.keys().cloned().collect();
        names.sort();
        names
    }

    /// Descriptors of all bound adapters, sorted by registered name.
    pub fn descriptors(&self) -> Vec<&CapabilityDescriptor> {
        let mut entries: Vec<_> = self.adapters.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter().map(|(_, a)| a.describe()).collect()
    }

    /// Registered names whose adapter belongs to `category`, sorted.
    pub fn by_category(&self, category: Category) -> Vec<String> {
        let mut names: Vec<_> = self
            .adapters
            .iter()
            .filter(|(_, a)| a.describe().category == category)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }
}

fn check_version(name: &str, descriptor: &CapabilityDescriptor) -> DispatchResult<()> {
    let Some(required) = descriptor.requires else {
        return Ok(());
    };
    match &descriptor.version {
        Some(found) if !required.matches_str(found) => Err(DispatchError::IncompatibleVersion {
            capability: name.to_string(),
            library: descriptor.library.clone(),
            required: required.to_string(),
            found: found.clone(),
        }),
        Some(_) => Ok(()),
        None => {
            warn!(
                capability = %name,
                library = %descriptor.library,
                requirement = %required,
                "Library version not reported; requirement not checked"
            );
            Ok(())
        }
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("capabilities", &self.capabilities())
            .field("policy", &self.policy)
            .finish()
    }
}
