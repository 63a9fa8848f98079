//! The host-program boundary.
//!
//! Sub-modules:
//! - [`types`]     — Type references and per-type metadata.
//! - [`provider`]  — The introspection capability and the in-memory registry.
//! - [`value`]     — Structured values crossing operation boundaries.
//! - [`component`] — Executable component instances and failures.
//! - [`modules`]   — Module bytes from the packaged distribution.
//! - [`container`] — Disposable dependency-injection container.
//! - [`program`]   — Component catalog and the [`HostProgram`] bundle.

pub mod component;
pub mod container;
pub mod modules;
pub mod program;
pub mod provider;
pub mod types;
pub mod value;

pub use component::{CallResult, Component, Failure, SharedComponent, Wiring};
pub use container::{
    Container, ContainerLease, ContainerOptions, ContainerProvider, LocalContainerProvider,
};
pub use modules::{decode_module, encode_module, DistributionDir, InMemoryModules, ModuleSource};
pub use program::{ComponentCatalog, HostProgram};
pub use provider::{TypeMetadataProvider, TypeRegistry};
pub use types::{
    module_id_for, ConstructorMeta, FieldMeta, OperationMeta, PrimitiveKind, Role, TypeKind,
    TypeMeta, TypeRef,
};
pub use value::Value;
