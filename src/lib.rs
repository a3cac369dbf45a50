// src/lib.rs

pub mod cli;
pub mod command;
pub mod config;
pub mod errors;
pub mod exec;
pub mod flow;
pub mod locate;
pub mod logging;
pub mod trigger;
pub mod types;

use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::cli::{CliArgs, Command, RequestArgs};
use crate::command::build_command;
use crate::config::{default_config_path, load_or_default, ConfigFile};
use crate::errors::PixError;
use crate::exec::RealProcessBackend;
use crate::flow::request::{
    PARAM_NEED_GUI, PARAM_ROBOT_PATH, PARAM_SCRIPT_PARAMETERS, PARAM_SCRIPT_PATH,
};
use crate::flow::{
    runner_run_name, starter_run_name, FlowController, FlowDefinition, InvocationRequest,
};
use crate::locate::{locator_from_config, LocatorStrategy};
use crate::trigger::{CrossFlowTrigger, LocalOrchestrator};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - locator selection
/// - flow controller + process backend
/// - (for `trigger`) the local orchestrator and Ctrl-C cancellation
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = match &args.config {
        Some(path) => load_or_default(path, true)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => load_or_default(default_config_path(), false)?,
    };

    match args.command {
        Command::Run(run_args) => {
            let request = request_from_args(&run_args.request)?;
            if run_args.dry_run {
                return print_dry_run(&cfg, &request);
            }
            let controller = build_controller(&cfg)?;
            let result = controller.execute(request).await?;
            info!(exit_code = result.exit_code, "robot run finished");
            Ok(())
        }
        Command::Trigger(trigger_args) => {
            let request = request_from_args(&trigger_args.request)?;
            run_trigger(&cfg, &trigger_args.name, request).await
        }
        Command::Locate => {
            let locator = locator_from_config(&cfg)?;
            let path = locator.locate()?;
            let path = std::path::absolute(&path).unwrap_or(path);
            println!("{}", path.display());
            Ok(())
        }
        Command::Describe => {
            print_description(&cfg);
            Ok(())
        }
    }
}

/// Construct the flow controller described by `cfg`, backed by real
/// processes.
pub fn build_controller(cfg: &ConfigFile) -> Result<FlowController> {
    let locator: Arc<dyn LocatorStrategy> = Arc::from(locator_from_config(cfg)?);
    let encoding = cfg.encoding()?;
    Ok(FlowController::new(
        locator,
        Arc::new(RealProcessBackend::new()),
        encoding,
    ))
}

/// Merge the optional request file with command-line overrides and bind the
/// result.
pub fn request_from_args(args: &RequestArgs) -> Result<InvocationRequest> {
    let mut params: Map<String, Value> = match &args.request {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading request file {}", path.display()))?;
            match serde_json::from_str::<Value>(&text).map_err(PixError::from)? {
                Value::Object(map) => map,
                _ => {
                    return Err(PixError::ConfigError(format!(
                        "request file {} must contain a JSON object",
                        path.display()
                    ))
                    .into());
                }
            }
        }
        None => Map::new(),
    };

    if let Some(script) = &args.script {
        params.insert(PARAM_SCRIPT_PATH.to_string(), Value::String(script.clone()));
    }
    if let Some(raw) = &args.params {
        params.insert(PARAM_SCRIPT_PARAMETERS.to_string(), Value::String(raw.clone()));
    }
    if let Some(json) = &args.params_json {
        let value: Value = serde_json::from_str(json).map_err(|e| {
            PixError::InvalidParameter(format!("--params-json is not valid JSON: {e}"))
        })?;
        if !value.is_object() {
            return Err(PixError::InvalidParameter(
                "--params-json must be a JSON object".to_string(),
            )
            .into());
        }
        params.insert(PARAM_SCRIPT_PARAMETERS.to_string(), value);
    }
    if let Some(robot) = &args.robot_path {
        params.insert(
            PARAM_ROBOT_PATH.to_string(),
            Value::String(robot.to_string_lossy().into_owned()),
        );
    }
    if let Some(need_gui) = &args.need_gui {
        params.insert(PARAM_NEED_GUI.to_string(), Value::String(need_gui.clone()));
    }

    Ok(InvocationRequest::from_params(&params)?)
}

async fn run_trigger(cfg: &ConfigFile, name: &str, request: InvocationRequest) -> Result<()> {
    let definition = FlowDefinition::run_pix(&cfg.flow);
    let controller = build_controller(cfg)?;
    let flow_name = definition.name.clone();
    let project = definition.project.clone();

    let orchestrator = Arc::new(LocalOrchestrator::new(definition, controller));
    let trigger = CrossFlowTrigger::new(orchestrator, flow_name, project);

    let parent = starter_run_name(name);
    let run_name = runner_run_name(name);
    info!(parent = %parent, child = %run_name, "starting runner flow");
    let cancel = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C; run cannot be cancelled");
            std::future::pending::<()>().await;
        }
    };

    let triggered = trigger.trigger_until(&run_name, &request, cancel).await?;
    info!(run_id = triggered.id, run_name = %triggered.run_name, "triggered run finished");
    Ok(())
}

/// Print the command that would be executed, without running it.
fn print_dry_run(cfg: &ConfigFile, request: &InvocationRequest) -> Result<()> {
    let locator = locator_from_config(cfg)?;
    let cmd = build_command(
        &request.script_path,
        request.script_parameters.as_ref(),
        request.robot_path.as_deref(),
        locator.as_ref(),
    )?;
    let variant = crate::exec::RunnerVariant::for_gui(request.need_gui);

    println!("pixrun dry-run");
    println!("  runner: {variant} ({})", variant.task_name());
    println!("  command:");
    for token in cmd.tokens() {
        println!("    {token}");
    }
    Ok(())
}

/// Print the flow definition: parameters, tasks and their resource tags,
/// plus the deploy secrets and whether they resolve.
fn print_description(cfg: &ConfigFile) {
    let def = FlowDefinition::run_pix(&cfg.flow);

    println!("flow {} (project {})", def.name, def.project);
    if !def.labels.is_empty() {
        println!("  labels: {:?}", def.labels);
    }
    println!("  locator: {:?}", cfg.locator.strategy);
    println!("  encoding: {}", cfg.robot.encoding);
    println!();

    println!("parameters ({}):", def.parameters.len());
    for p in &def.parameters {
        let mut line = format!("  - {}", p.name);
        if p.required {
            line.push_str(" (required)");
        }
        if let Some(default) = &p.default {
            line.push_str(&format!(" default={default}"));
        }
        println!("{line}");
    }
    println!();

    println!("tasks ({}):", def.tasks.len());
    for t in &def.tasks {
        println!("  - {}", t.name);
        for tag in &t.tags {
            println!("      tag: {tag}");
        }
    }
    println!();

    println!("deploy secrets:");
    for (name, value) in cfg.deploy.resolve_from_env() {
        let status = if value.is_some() { "set" } else { "missing" };
        println!("  - {name}: {status}");
    }
}
