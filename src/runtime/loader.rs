//! Isolated module namespace for freestanding execution.
//!
//! A [`SandboxNamespace`] is populated from a resolved [`ModuleClosure`]:
//! - Closure members are read from the host's distribution and served from
//!   the namespace's local table, up to a byte budget.
//! - Modules outside the closure (or past the budget, or not present in the
//!   distribution) delegate to the host's normal type lookup.
//!
//! The local definition of a type always wins over the host's, so a session
//! runs against the bytes it loaded even if the host registry differs.

use crate::host::{
    decode_module, module_id_for, HostProgram, SharedComponent, TypeMeta,
};
use crate::resolver::ModuleClosure;
use crate::{DebuggerError, Result};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where a module request is served from.
#[derive(Debug, PartialEq, Eq)]
pub enum ModuleResolution<'a> {
    Local(&'a [u8]),
    Delegate,
}

pub struct SandboxNamespace<'h> {
    host: &'h HostProgram,
    local: HashMap<String, LocalModule>,
    budget: usize,
    used: usize,
}

struct LocalModule {
    bytes: Vec<u8>,
    digest: String,
}

impl<'h> SandboxNamespace<'h> {
    /// Load every closure member the distribution carries, within `budget`
    /// bytes.
    #[tracing::instrument(skip_all, fields(modules = closure.len()))]
    pub fn load(host: &'h HostProgram, closure: &ModuleClosure, budget: usize) -> Result<Self> {
        let mut namespace = Self {
            host,
            local: HashMap::new(),
            budget,
            used: 0,
        };

        for module_id in closure.iter() {
            let Some(bytes) = host.modules().read_module_bytes(module_id)? else {
                debug!(module = %module_id, "Module absent from distribution; delegating");
                continue;
            };
            if namespace.used + bytes.len() > namespace.budget {
                warn!(
                    module = %module_id,
                    size = bytes.len(),
                    budget = namespace.budget,
                    "Sandbox byte budget exhausted; delegating"
                );
                continue;
            }
            let digest = hex::encode(Sha256::digest(&bytes));
            debug!(module = %module_id, sha256 = %digest, "Loaded module");
            namespace.used += bytes.len();
            namespace
                .local
                .insert(module_id.to_string(), LocalModule { bytes, digest });
        }

        info!(
            local = namespace.local.len(),
            bytes = namespace.used,
            "Sandbox namespace ready"
        );
        Ok(namespace)
    }

    pub fn resolve(&self, module_id: &str) -> ModuleResolution<'_> {
        match self.local.get(module_id) {
            Some(module) => ModuleResolution::Local(&module.bytes),
            None => ModuleResolution::Delegate,
        }
    }

    /// Define `type_name` from local bytes, or from the host when delegated.
    pub fn define_type(&self, type_name: &str) -> Result<Arc<TypeMeta>> {
        let module_id = module_id_for(type_name);
        match self.resolve(&module_id) {
            ModuleResolution::Local(bytes) => {
                let meta = decode_module(&module_id, bytes)?;
                if meta.name != type_name {
                    return Err(DebuggerError::ModuleLoadError(format!(
                        "{} defines {} instead of {}",
                        module_id, meta.name, type_name
                    )));
                }
                Ok(Arc::new(meta))
            }
            ModuleResolution::Delegate => self
                .host
                .lookup(type_name)
                .ok_or_else(|| DebuggerError::TypeNotFound(type_name.to_string())),
        }
    }

    /// Create a fresh instance through the type's no-argument constructor.
    pub fn instantiate(&self, type_name: &str) -> Result<SharedComponent> {
        let meta = self.define_type(type_name)?;
        if !meta.has_no_arg_constructor() {
            return Err(DebuggerError::InvocationError(format!(
                "{} has no no-argument constructor",
                type_name
            )));
        }
        let constructor = self
            .host
            .catalog()
            .no_arg_constructor(type_name)
            .ok_or_else(|| {
                DebuggerError::InvocationError(format!(
                    "{} cannot be instantiated outside a container",
                    type_name
                ))
            })?;
        Ok(constructor())
    }

    pub fn local_count(&self) -> usize {
        self.local.len()
    }

    pub fn local_bytes(&self) -> usize {
        self.used
    }

    /// Hex SHA-256 of a locally loaded module.
    pub fn digest(&self, module_id: &str) -> Option<&str> {
        self.local.get(module_id).map(|m| m.digest.as_str())
    }
}

impl Drop for SandboxNamespace<'_> {
    fn drop(&mut self) {
        debug!(local = self.local.len(), "Sandbox namespace released");
    }
}
