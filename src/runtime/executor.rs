use super::invoker::{find_operation, invoke_operation};
use super::loader::SandboxNamespace;
use super::parser::convert_args;
use super::result::{format_call_result, format_engine_error, ExecutionRecord, ExecutionStrategy};
use crate::host::{
    ContainerOptions, ContainerProvider, HostProgram, LocalContainerProvider, TypeMeta, Value,
};
use crate::resolver::Resolution;
use crate::{DebuggerError, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Default cap on module bytes loaded into one sandbox namespace.
pub const DEFAULT_MAX_MODULE_BYTES: usize = 16 * 1024 * 1024;

/// Runs a resolved operation exactly once, isolated from earlier sessions.
pub struct SandboxExecutor {
    program: Arc<HostProgram>,
    containers: Arc<dyn ContainerProvider>,
    max_module_bytes: usize,
}

impl SandboxExecutor {
    /// Executor that starts a fresh container whenever one is needed.
    pub fn new(program: Arc<HostProgram>) -> Self {
        let containers = LocalContainerProvider::new(
            program.types().clone(),
            program.catalog().clone(),
            ContainerOptions::default(),
        );
        Self {
            program,
            containers: Arc::new(containers),
            max_module_bytes: DEFAULT_MAX_MODULE_BYTES,
        }
    }

    pub fn with_containers(mut self, containers: Arc<dyn ContainerProvider>) -> Self {
        self.containers = containers;
        self
    }

    pub fn with_max_module_bytes(mut self, max_module_bytes: usize) -> Self {
        self.max_module_bytes = max_module_bytes;
        self
    }

    pub fn program(&self) -> &Arc<HostProgram> {
        &self.program
    }

    /// Container-managed types go through a container; everything else runs
    /// freestanding.
    pub fn strategy_for(meta: &TypeMeta) -> ExecutionStrategy {
        if meta.is_container_managed() {
            ExecutionStrategy::Container
        } else {
            ExecutionStrategy::Freestanding
        }
    }

    /// Coerce `raw_input` and invoke the resolved operation. Every problem
    /// past resolution lands in the record's error text.
    #[tracing::instrument(skip_all, fields(target = %resolution.descriptor))]
    pub fn execute(&self, resolution: &Resolution, raw_input: Option<Value>) -> ExecutionRecord {
        let type_name = resolution.descriptor.type_name();
        let strategy = self
            .program
            .lookup(type_name)
            .map(|meta| Self::strategy_for(&meta))
            .unwrap_or(ExecutionStrategy::Freestanding);
        info!(strategy = ?strategy, "Executing target");

        let arguments = match convert_args(&resolution.descriptor, raw_input.clone(), self.program.provider()) {
            Ok(arguments) => arguments,
            Err(e) => {
                return ExecutionRecord {
                    strategy,
                    arguments: raw_input.into_iter().collect(),
                    result: Err(format_engine_error(&e)),
                }
            }
        };

        let outcome = match strategy {
            ExecutionStrategy::Container => self.run_managed(resolution, arguments.clone()),
            ExecutionStrategy::Freestanding => self.run_freestanding(resolution, arguments.clone()),
        };
        let result = match outcome {
            Ok(call) => format_call_result(call),
            Err(e) => Err(format_engine_error(&e)),
        };

        ExecutionRecord {
            strategy,
            arguments,
            result,
        }
    }

    fn run_managed(
        &self,
        resolution: &Resolution,
        arguments: Vec<Value>,
    ) -> Result<crate::host::CallResult> {
        let type_name = resolution.descriptor.type_name();
        let meta = self
            .program
            .lookup(type_name)
            .ok_or_else(|| DebuggerError::TypeNotFound(type_name.to_string()))?;

        let lease = self.containers.acquire()?;
        debug!(container = %lease.id(), owned = lease.is_owned(), "Container acquired");
        let instance = lease.managed_instance(type_name)?;
        let operation = self.lookup_operation(&meta, resolution, &arguments)?;
        Ok(invoke_operation(instance.as_ref(), &operation, arguments))
    }

    fn run_freestanding(
        &self,
        resolution: &Resolution,
        arguments: Vec<Value>,
    ) -> Result<crate::host::CallResult> {
        let type_name = resolution.descriptor.type_name();
        let namespace =
            SandboxNamespace::load(&self.program, &resolution.closure, self.max_module_bytes)?;
        let meta = namespace.define_type(type_name)?;
        let operation = self.lookup_operation(&meta, resolution, &arguments)?;
        let instance = namespace.instantiate(type_name)?;
        Ok(invoke_operation(instance.as_ref(), &operation, arguments))
    }

    fn lookup_operation(
        &self,
        meta: &TypeMeta,
        resolution: &Resolution,
        arguments: &[Value],
    ) -> Result<crate::host::OperationMeta> {
        find_operation(
            self.program.provider(),
            meta,
            &resolution.descriptor,
            resolution.exact_operation.as_ref(),
            arguments,
        )
        .ok_or_else(|| {
            DebuggerError::InvocationError(format!(
                "no overload of {} accepts {} argument(s) of kinds [{}]",
                resolution.descriptor,
                arguments.len(),
                arguments
                    .iter()
                    .map(Value::kind_name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })
    }
}
