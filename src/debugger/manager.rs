use super::session::DebugSession;
use super::step::{SourceType, Step};
use super::store::SessionStore;
use crate::config::ReplayConfig;
use crate::host::{HostProgram, LocalContainerProvider, TypeMetadataProvider, Value};
use crate::recorder::CallRecorder;
use crate::resolver::{DependencyResolver, Resolution};
use crate::runtime::{ExecutionStrategy, SandboxExecutor};
use crate::Result;
use chrono::Utc;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, info};

/// Creates debug sessions and drives their cursors.
///
/// `start` runs the target on the calling thread, which must not be shared
/// with another concurrent `start`: the call recorder is scoped to the
/// thread.
pub struct DebugSessionManager {
    executor: SandboxExecutor,
    store: SessionStore,
    dedupe_root: bool,
}

impl DebugSessionManager {
    pub fn new(program: Arc<HostProgram>) -> Self {
        Self {
            executor: SandboxExecutor::new(program),
            store: SessionStore::new(),
            dedupe_root: true,
        }
    }

    pub fn from_config(program: Arc<HostProgram>, config: &ReplayConfig) -> Self {
        let options = crate::host::ContainerOptions {
            web_listener: config.container.web_listener,
        };
        let containers = LocalContainerProvider::new(
            program.types().clone(),
            program.catalog().clone(),
            options,
        )
        .with_running(program.running_container(), config.container.reuse_running);

        let executor = SandboxExecutor::new(program)
            .with_containers(Arc::new(containers))
            .with_max_module_bytes(config.sandbox.max_module_bytes);
        Self {
            executor,
            store: SessionStore::new(),
            dedupe_root: config.sandbox.dedupe_root_step,
        }
    }

    pub fn with_dedupe_root(mut self, dedupe_root: bool) -> Self {
        self.dedupe_root = dedupe_root;
        self
    }

    pub fn program(&self) -> &Arc<HostProgram> {
        self.executor.program()
    }

    /// Resolve, execute once while recording, and store a new session.
    ///
    /// Resolution failures are returned and leave no session behind. A
    /// failing target still yields a session whose root step carries the
    /// error. A JSON `null` input counts as no input.
    #[tracing::instrument(skip(self, input))]
    pub fn start(&self, specifier: &str, input: Option<&JsonValue>) -> Result<DebugSession> {
        let resolution = DependencyResolver::new(self.program().provider()).resolve(specifier)?;
        let raw_input = input.filter(|v| !v.is_null()).map(Value::from_json);

        let scope = CallRecorder::start();
        let start_time = Utc::now();
        let record = self.executor.execute(&resolution, raw_input);
        let end_time = Utc::now();
        let nested = scope.finish();

        let root = Step::finalized(
            resolution.descriptor.type_name(),
            resolution.descriptor.operation_name(),
            record.arguments.clone(),
            record.return_value(),
            record.error_text().map(str::to_string),
            start_time,
            end_time,
            0,
        );
        let nested = self.prepare_nested(nested, &resolution, record.strategy);

        let session = DebugSession::new(specifier, root, nested);
        info!(
            session = %session.id(),
            steps = session.steps().len(),
            state = ?session.state(),
            "Debug session created"
        );
        self.store.insert(session.clone());
        Ok(session)
    }

    /// Advance a session's cursor by one, stopping at the last step.
    pub fn next(&self, session_id: &str) -> Result<(DebugSession, Step)> {
        let (session, step) = self.store.advance(session_id)?;
        debug!(
            session = %session_id,
            index = session.current_step_index(),
            "Advanced session cursor"
        );
        Ok((session, step))
    }

    pub fn session(&self, session_id: &str) -> Result<DebugSession> {
        self.store.get(session_id)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Classify nested steps by origin and, on the container path, drop the
    /// root call's own intercepted record when configured to.
    fn prepare_nested(
        &self,
        nested: Vec<Step>,
        resolution: &Resolution,
        strategy: ExecutionStrategy,
    ) -> Vec<Step> {
        let root_type = resolution.descriptor.type_name();
        let root_operation = resolution.descriptor.operation_name();
        let dedupe = self.dedupe_root && strategy == ExecutionStrategy::Container;
        let provider = self.program().provider();
        // The container may hand out an implementor of the named type.
        let is_root_call = |step: &Step| {
            step.depth() == 0
                && step.operation_name() == root_operation
                && provider.is_subtype(step.type_name(), root_type)
        };

        let before = nested.len();
        let kept: Vec<Step> = nested
            .into_iter()
            .filter(|step| !(dedupe && is_root_call(step)))
            .map(|step| {
                let source = source_type_of(provider, step.type_name());
                step.with_source_type(source)
            })
            .collect();
        if kept.len() != before {
            debug!(dropped = before - kept.len(), "Dropped intercepted root call records");
        }
        kept
    }
}

/// `Project` for types the host registry knows, `External` otherwise.
pub fn source_type_of(provider: &dyn TypeMetadataProvider, type_name: &str) -> SourceType {
    if provider.lookup(type_name).is_some() {
        SourceType::Project
    } else {
        SourceType::External
    }
}
