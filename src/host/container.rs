//! A disposable dependency-injection container for host components.
//!
//! Components with a role marker are wrapped in the [`Traced`] decorator when
//! the container hands them out, so every call that crosses a controller,
//! service or repository boundary is visible to the call recorder.

use super::component::{SharedComponent, Wiring};
use super::program::ComponentCatalog;
use super::provider::{TypeMetadataProvider, TypeRegistry};
use crate::recorder::Traced;
use crate::{DebuggerError, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// How long a lookup waits for another caller's first construction of the
/// same component.
const WIRING_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerOptions {
    /// Containers started for a debug session never bind a web listener.
    pub web_listener: bool,
}

pub struct Container {
    id: String,
    types: Arc<TypeRegistry>,
    catalog: Arc<ComponentCatalog>,
    options: ContainerOptions,
    instances: Mutex<HashMap<String, SharedComponent>>,
    build_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    running: AtomicBool,
}

impl Container {
    pub fn start(
        types: Arc<TypeRegistry>,
        catalog: Arc<ComponentCatalog>,
        options: ContainerOptions,
    ) -> Result<Arc<Self>> {
        if options.web_listener {
            return Err(DebuggerError::ContainerError(
                "debug containers must be started with the web listener disabled".to_string(),
            ));
        }
        let container = Arc::new(Self {
            id: uuid::Uuid::new_v4().to_string(),
            types,
            catalog,
            options,
            instances: Mutex::new(HashMap::new()),
            build_locks: Mutex::new(HashMap::new()),
            running: AtomicBool::new(true),
        });
        info!(container = %container.id, "Container started (web listener disabled)");
        Ok(container)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn options(&self) -> ContainerOptions {
        self.options
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Number of component instances created so far.
    pub fn instance_count(&self) -> usize {
        self.instances.lock().len()
    }

    /// Get (creating on first use) the managed instance for `type_name`.
    ///
    /// `type_name` may name a capability; the unique managed implementor is
    /// returned in that case.
    pub fn managed_instance(&self, type_name: &str) -> Result<SharedComponent> {
        self.instance_in_chain(type_name, &[])
    }

    /// Resolve `type_name` while wiring the components in `chain`. The chain
    /// belongs to one resolution, so concurrent callers never see each
    /// other's in-progress components as cycles.
    fn instance_in_chain(&self, type_name: &str, chain: &[String]) -> Result<SharedComponent> {
        if !self.is_running() {
            return Err(DebuggerError::ContainerError(format!(
                "container {} is closed",
                self.id
            )));
        }

        let concrete = self.concrete_type_for(type_name)?;
        if let Some(existing) = self.instances.lock().get(&concrete) {
            return Ok(existing.clone());
        }

        if chain.contains(&concrete) {
            let mut cycle = chain.to_vec();
            cycle.push(concrete);
            return Err(DebuggerError::ContainerError(format!(
                "circular wiring: {}",
                cycle.join(" -> ")
            )));
        }

        // First construction of a type is serialized; later callers wait and
        // then take the finished instance.
        let build_lock = self
            .build_locks
            .lock()
            .entry(concrete.clone())
            .or_default()
            .clone();
        let Some(_building) = build_lock.try_lock_for(WIRING_TIMEOUT) else {
            return Err(DebuggerError::ContainerError(format!(
                "timed out waiting for {} to be wired",
                concrete
            )));
        };
        if let Some(existing) = self.instances.lock().get(&concrete) {
            return Ok(existing.clone());
        }

        let mut path = chain.to_vec();
        path.push(concrete.clone());
        let instance = self.build(&concrete, path)?;

        let instance = self
            .instances
            .lock()
            .entry(concrete.clone())
            .or_insert(instance)
            .clone();
        debug!(container = %self.id, component = %concrete, "Managed instance ready");
        Ok(instance)
    }

    /// Tear down: drop every instance and refuse further lookups.
    pub fn close(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            let dropped = {
                let mut instances = self.instances.lock();
                let count = instances.len();
                instances.clear();
                count
            };
            info!(container = %self.id, instances = dropped, "Container closed");
        }
    }

    fn build(&self, concrete: &str, chain: Vec<String>) -> Result<SharedComponent> {
        let constructor = self.catalog.wired_constructor(concrete).ok_or_else(|| {
            DebuggerError::ContainerError(format!("{} has no managed constructor", concrete))
        })?;
        let instance = constructor(&ContainerWiring {
            container: self,
            chain,
        })?;

        let managed = self
            .types
            .lookup(concrete)
            .map(|meta| meta.is_container_managed())
            .unwrap_or(false);
        if managed {
            Ok(Arc::new(Traced::new(instance)))
        } else {
            Ok(instance)
        }
    }

    fn concrete_type_for(&self, type_name: &str) -> Result<String> {
        if self.catalog.wired_constructor(type_name).is_some() {
            return Ok(type_name.to_string());
        }

        let mut implementors: Vec<String> = self
            .types
            .iter()
            .filter(|meta| meta.name != type_name)
            .filter(|meta| self.catalog.wired_constructor(&meta.name).is_some())
            .filter(|meta| self.types.is_subtype(&meta.name, type_name))
            .map(|meta| meta.name.clone())
            .collect();
        implementors.sort();

        match implementors.len() {
            0 => Err(DebuggerError::ContainerError(format!(
                "no managed component for {}",
                type_name
            ))),
            1 => Ok(implementors.remove(0)),
            _ => Err(DebuggerError::ContainerError(format!(
                "ambiguous component for {}: {}",
                type_name,
                implementors.join(", ")
            ))),
        }
    }
}

impl Drop for Container {
    fn drop(&mut self) {
        self.close();
    }
}

struct ContainerWiring<'a> {
    container: &'a Container,
    chain: Vec<String>,
}

impl Wiring for ContainerWiring<'_> {
    fn collaborator(&self, type_name: &str) -> Result<SharedComponent> {
        self.container.instance_in_chain(type_name, &self.chain)
    }
}

/// Scoped access to a container. Owned containers are closed on drop,
/// whatever the outcome of the work done through the lease.
pub struct ContainerLease {
    container: Arc<Container>,
    owned: bool,
}

impl ContainerLease {
    pub fn owned(container: Arc<Container>) -> Self {
        Self {
            container,
            owned: true,
        }
    }

    pub fn borrowed(container: Arc<Container>) -> Self {
        Self {
            container,
            owned: false,
        }
    }

    pub fn is_owned(&self) -> bool {
        self.owned
    }
}

impl std::ops::Deref for ContainerLease {
    type Target = Container;

    fn deref(&self) -> &Container {
        &self.container
    }
}

impl Drop for ContainerLease {
    fn drop(&mut self) {
        if self.owned {
            self.container.close();
        }
    }
}

pub trait ContainerProvider: Send + Sync {
    fn acquire(&self) -> Result<ContainerLease>;
}

/// Starts a fresh container per acquisition, or lends the host's running
/// container when `reuse_running` is set and one is available.
pub struct LocalContainerProvider {
    types: Arc<TypeRegistry>,
    catalog: Arc<ComponentCatalog>,
    options: ContainerOptions,
    running: Option<Arc<Container>>,
    reuse_running: bool,
}

impl LocalContainerProvider {
    pub fn new(
        types: Arc<TypeRegistry>,
        catalog: Arc<ComponentCatalog>,
        options: ContainerOptions,
    ) -> Self {
        Self {
            types,
            catalog,
            options,
            running: None,
            reuse_running: false,
        }
    }

    pub fn with_running(mut self, container: Option<Arc<Container>>, reuse: bool) -> Self {
        self.running = container;
        self.reuse_running = reuse;
        self
    }
}

impl ContainerProvider for LocalContainerProvider {
    fn acquire(&self) -> Result<ContainerLease> {
        if self.reuse_running {
            if let Some(running) = self.running.as_ref().filter(|c| c.is_running()) {
                debug!(container = %running.id(), "Reusing running host container");
                return Ok(ContainerLease::borrowed(running.clone()));
            }
        }
        let container = Container::start(self.types.clone(), self.catalog.clone(), self.options)?;
        Ok(ContainerLease::owned(container))
    }
}
