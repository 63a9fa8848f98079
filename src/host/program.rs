use super::component::{NoArgConstructor, SharedComponent, Wiring, WiredConstructor};
use super::container::{Container, ContainerOptions};
use super::modules::{InMemoryModules, ModuleSource};
use super::provider::{TypeMetadataProvider, TypeRegistry};
use super::types::TypeMeta;
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default, Clone)]
struct CatalogEntry {
    no_arg: Option<NoArgConstructor>,
    wired: Option<WiredConstructor>,
}

/// How each program type is instantiated.
#[derive(Default, Clone)]
pub struct ComponentCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl ComponentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freestanding constructor for `type_name`.
    pub fn no_arg<F>(&mut self, type_name: &str, constructor: F) -> &mut Self
    where
        F: Fn() -> SharedComponent + Send + Sync + 'static,
    {
        self.entries
            .entry(type_name.to_string())
            .or_default()
            .no_arg = Some(Arc::new(constructor));
        self
    }

    /// Register a container-managed constructor for `type_name`.
    pub fn wired<F>(&mut self, type_name: &str, constructor: F) -> &mut Self
    where
        F: Fn(&dyn Wiring) -> Result<SharedComponent> + Send + Sync + 'static,
    {
        self.entries
            .entry(type_name.to_string())
            .or_default()
            .wired = Some(Arc::new(constructor));
        self
    }

    pub fn no_arg_constructor(&self, type_name: &str) -> Option<&NoArgConstructor> {
        self.entries.get(type_name).and_then(|e| e.no_arg.as_ref())
    }

    pub(crate) fn wired_constructor(&self, type_name: &str) -> Option<&WiredConstructor> {
        self.entries.get(type_name).and_then(|e| e.wired.as_ref())
    }
}

/// Everything the engine consumes from the program under debug.
#[derive(Clone)]
pub struct HostProgram {
    name: String,
    types: Arc<TypeRegistry>,
    modules: Arc<dyn ModuleSource>,
    catalog: Arc<ComponentCatalog>,
    running_container: Option<Arc<Container>>,
}

impl HostProgram {
    pub fn new(
        name: impl Into<String>,
        types: TypeRegistry,
        modules: Arc<dyn ModuleSource>,
        catalog: ComponentCatalog,
    ) -> Self {
        Self {
            name: name.into(),
            types: Arc::new(types),
            modules,
            catalog: Arc::new(catalog),
            running_container: None,
        }
    }

    /// Build a program whose distribution is exactly its registered types.
    pub fn packaged(
        name: impl Into<String>,
        types: TypeRegistry,
        catalog: ComponentCatalog,
    ) -> Result<Self> {
        let mut modules = InMemoryModules::new();
        for meta in types.iter() {
            modules.add_type(meta)?;
        }
        Ok(Self::new(name, types, Arc::new(modules), catalog))
    }

    /// Attach the host's own running container so sessions may reuse it.
    pub fn with_running_container(mut self, container: Arc<Container>) -> Self {
        self.running_container = Some(container);
        self
    }

    /// Start the host's own container and attach it, as a host that is
    /// already serving would have one.
    pub fn start_running_container(self) -> Result<Self> {
        let container = Container::start(
            self.types.clone(),
            self.catalog.clone(),
            ContainerOptions::default(),
        )?;
        tracing::info!(program = %self.name, container = %container.id(), "Host container running");
        Ok(self.with_running_container(container))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn types(&self) -> &Arc<TypeRegistry> {
        &self.types
    }

    pub fn provider(&self) -> &dyn TypeMetadataProvider {
        self.types.as_ref()
    }

    pub fn lookup(&self, type_name: &str) -> Option<Arc<TypeMeta>> {
        self.types.lookup(type_name)
    }

    pub fn modules(&self) -> &dyn ModuleSource {
        self.modules.as_ref()
    }

    pub fn catalog(&self) -> &Arc<ComponentCatalog> {
        &self.catalog
    }

    pub fn running_container(&self) -> Option<Arc<Container>> {
        self.running_container.clone()
    }
}
