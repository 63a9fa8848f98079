use crate::cli::args::{InspectArgs, OutputFormat, RunArgs, ServeArgs, Verbosity};
use crate::config::ReplayConfig;
use crate::debugger::{DebugSession, DebugSessionManager, SessionState, Step};
use crate::host::{HostProgram, TypeKind, TypeMeta};
use crate::protocol::StartResponse;
use crate::resolver::DependencyResolver;
use crate::runtime::SandboxExecutor;
use crate::server::{self, ControlApi};
use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{json, Value as JsonValue};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Run the control server until interrupted.
pub fn serve(args: ServeArgs, verbosity: Verbosity, config_path: Option<&Path>) -> Result<()> {
    let config = ReplayConfig::discover(config_path)?;
    let bind = args.bind.unwrap_or(config.server.bind);
    let program = host_program(&config)?;
    let manager = Arc::new(DebugSessionManager::from_config(program, &config));
    let api = Arc::new(ControlApi::new(manager));

    if verbosity != Verbosity::Quiet {
        println!("{} control API on http://{}", "Serving".green().bold(), bind);
    }
    info!(%bind, "Starting control server");

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(server::serve(api, bind))?;
    Ok(())
}

/// Start one session and print it.
pub fn run(args: RunArgs, verbosity: Verbosity, config_path: Option<&Path>) -> Result<()> {
    let config = ReplayConfig::discover(config_path)?;
    let input = args.input.as_deref().map(parse_input);
    let program = host_program(&config)?;
    let mut manager = DebugSessionManager::from_config(program, &config);
    if args.keep_root_record {
        manager = manager.with_dedupe_root(false);
    }

    let show_progress = verbosity != Verbosity::Quiet && args.output == OutputFormat::Pretty;
    let outcome = {
        // RAII guard: the spinner is cleared even if start fails.
        let _guard = show_progress.then(|| ProgressGuard::spinner(&args.target));
        manager.start(&args.target, input.as_ref())
    };

    match args.output {
        OutputFormat::Json => {
            let document = match &outcome {
                Ok(session) => StartResponse::from_session(session),
                Err(e) => StartResponse::failure(e.to_string()),
            };
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        OutputFormat::Pretty => {
            if let Ok(session) = &outcome {
                print_session(session);
            }
        }
    }

    let session = outcome.with_context(|| format!("Could not start session for {}", args.target))?;
    debug!(session = %session.id(), "Run complete");
    Ok(())
}

/// Describe a target without executing it, or list the program's types.
pub fn inspect(args: InspectArgs, _verbosity: Verbosity, _config_path: Option<&Path>) -> Result<()> {
    let program = crate::demo::program()?;
    match &args.target {
        Some(target) => inspect_target(&program, target, args.output),
        None => list_types(&program, args.output),
    }
}

fn inspect_target(program: &HostProgram, target: &str, output: OutputFormat) -> Result<()> {
    let resolution = DependencyResolver::new(program.provider())
        .resolve(target)
        .with_context(|| format!("Could not resolve {}", target))?;
    let strategy = program
        .lookup(resolution.descriptor.type_name())
        .map(|meta| SandboxExecutor::strategy_for(&meta));
    let external: Vec<&str> = resolution.closure.external().collect();

    if output == OutputFormat::Json {
        let document = json!({
            "descriptor": resolution.descriptor,
            "strategy": strategy,
            "exactOperation": resolution.exact_operation.as_ref().map(|op| op.signature()),
            "modules": resolution.closure.iter().collect::<Vec<_>>(),
            "external": external,
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    println!("{} {}", "Target:".bold(), resolution.descriptor);
    if let Some(strategy) = strategy {
        println!("{} {:?}", "Strategy:".bold(), strategy);
    }
    match &resolution.exact_operation {
        Some(op) => println!("{} {}", "Operation:".bold(), op.signature()),
        None => println!("{} matched by arity at invocation", "Operation:".bold()),
    }
    println!("{} ({})", "Module closure".bold(), resolution.closure.len());
    for module in resolution.closure.iter() {
        if external.contains(&module) {
            println!("  {} {}", module.dimmed(), "(external)".yellow());
        } else {
            println!("  {}", module);
        }
    }
    Ok(())
}

fn list_types(program: &HostProgram, output: OutputFormat) -> Result<()> {
    let mut types: Vec<TypeMeta> = program.types().iter().map(|m| m.as_ref().clone()).collect();
    types.sort_by(|a, b| a.name.cmp(&b.name));

    if output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&types)?);
        return Ok(());
    }

    for meta in &types {
        let kind = match &meta.kind {
            TypeKind::Class => "class",
            TypeKind::Capability => "capability",
            TypeKind::Enumeration { .. } => "enum",
        };
        let roles = meta
            .roles
            .iter()
            .map(|r| format!("{:?}", r))
            .collect::<Vec<_>>()
            .join(", ");
        if roles.is_empty() {
            println!("{} {}", kind.dimmed(), meta.name.bold());
        } else {
            println!("{} {} [{}]", kind.dimmed(), meta.name.bold(), roles.cyan());
        }
        for op in program.provider().declared_operations(meta) {
            println!("    {}", op.signature());
        }
    }
    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

/// The demo program, with its own container running when sessions are
/// configured to reuse it.
fn host_program(config: &ReplayConfig) -> Result<Arc<HostProgram>> {
    let program = crate::demo::program()?;
    let program = if config.container.reuse_running {
        program.start_running_container()?
    } else {
        program
    };
    Ok(Arc::new(program))
}

/// Bare words that are not JSON are taken as text.
fn parse_input(raw: &str) -> JsonValue {
    serde_json::from_str(raw).unwrap_or_else(|_| {
        debug!(input = raw, "Input is not JSON; passing it as text");
        JsonValue::String(raw.to_string())
    })
}

struct ProgressGuard(ProgressBar);

impl ProgressGuard {
    fn spinner(target: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Running {}", target));
        pb.enable_steady_tick(Duration::from_millis(80));
        Self(pb)
    }
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        self.0.finish_and_clear();
    }
}

fn print_session(session: &DebugSession) {
    let state = match session.state() {
        SessionState::CompletedSuccess => "completed".green().bold(),
        SessionState::CompletedError => "failed".red().bold(),
        SessionState::NotStarted | SessionState::Running => "pending".yellow().bold(),
    };
    println!("{} {} {}", "Session".bold(), session.id(), state);
    println!("{} {}", "Target:".bold(), session.target_specifier());
    println!();

    for (index, step) in session.steps().iter().enumerate() {
        print_step(index, step, index == session.current_step_index());
    }
}

fn print_step(index: usize, step: &Step, current: bool) {
    let marker = if current { ">" } else { " " };
    // Nested steps sit one level below the root.
    let indent = if index == 0 { 0 } else { step.depth() + 1 };
    let args = serde_json::to_string(step.arguments()).unwrap_or_default();
    let outcome = match (step.error_text(), step.return_value()) {
        (Some(error), _) => format!("!! {}", error).red().to_string(),
        (None, Some(value)) => format!("=> {}", value).green().to_string(),
        (None, None) => "=> (none)".dimmed().to_string(),
    };
    println!(
        "{} [{}] {}{}({}) {} {}",
        marker,
        index,
        "  ".repeat(indent),
        step.display_name().bold(),
        args.trim_start_matches('[').trim_end_matches(']'),
        outcome,
        format!("{}ms", step.duration_millis()).dimmed()
    );
}
