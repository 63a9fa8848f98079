//! Access to module bytes in the host program's packaged distribution.
//!
//! A module is the JSON-encoded [`TypeMeta`] of the single type it defines,
//! stored under its module id (`a/b/C.mod`).

use super::types::TypeMeta;
use crate::{DebuggerError, Result};
use std::collections::HashMap;
use std::path::{Component as PathComponent, Path, PathBuf};

pub trait ModuleSource: Send + Sync {
    /// Bytes of `module_id`, or `None` when the distribution does not ship it.
    fn read_module_bytes(&self, module_id: &str) -> Result<Option<Vec<u8>>>;
}

pub fn encode_module(meta: &TypeMeta) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(meta)?)
}

pub fn decode_module(module_id: &str, bytes: &[u8]) -> Result<TypeMeta> {
    serde_json::from_slice(bytes).map_err(|e| {
        DebuggerError::ModuleLoadError(format!("{} is not a valid module: {}", module_id, e))
    })
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryModules {
    modules: HashMap<String, Vec<u8>>,
}

impl InMemoryModules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, module_id: impl Into<String>, bytes: Vec<u8>) {
        self.modules.insert(module_id.into(), bytes);
    }

    /// Encode and store the module for `meta`.
    pub fn add_type(&mut self, meta: &TypeMeta) -> Result<()> {
        self.insert(meta.module_id(), encode_module(meta)?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ModuleSource for InMemoryModules {
    fn read_module_bytes(&self, module_id: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.modules.get(module_id).cloned())
    }
}

/// A distribution unpacked into a directory on disk.
#[derive(Debug, Clone)]
pub struct DistributionDir {
    root: PathBuf,
}

impl DistributionDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write every type in `types` into the directory.
    pub fn export<'a>(&self, types: impl IntoIterator<Item = &'a TypeMeta>) -> Result<usize> {
        let mut written = 0;
        for meta in types {
            let path = self.root.join(meta.module_id());
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, encode_module(meta)?)?;
            written += 1;
        }
        Ok(written)
    }
}

impl ModuleSource for DistributionDir {
    fn read_module_bytes(&self, module_id: &str) -> Result<Option<Vec<u8>>> {
        let relative = Path::new(module_id);
        if relative
            .components()
            .any(|c| !matches!(c, PathComponent::Normal(_)))
        {
            return Err(DebuggerError::ModuleLoadError(format!(
                "Module id escapes the distribution: {}",
                module_id
            )));
        }
        let path = self.root.join(relative);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
