use std::path::PathBuf;

use crate::cache;
use crate::cli::{Cli, Commands};
use crate::context::Context;
use crate::environment::{
    ensure_module, provision, seed, IsolatedEnvironment, Provisioned, PythonBackend,
};
use crate::error::PjError;
use crate::execution::{execute, resolve, Activation};
use crate::project::Project;
use crate::relaunch::{current_state, relaunch, EnvState};

/// Prompt shown by the tool's own environment.
const OWN_PROMPT: &str = "pj";

impl Cli {
    /// Locate the project, make sure we run inside our own environment, then
    /// dispatch. Returns the process exit code.
    pub fn execute(self, ctx: &Context) -> Result<i32, PjError> {
        let project = Project::locate(ctx)?;
        let own_env = cache::own_environment(ctx, &project.root);
        let project_env = project.environment(&ctx.settings);

        match current_state(ctx.prefix.as_deref(), &own_env, &project_env) {
            EnvState::OwnEnv => self.command.execute(ctx, &project, &own_env, &project_env),
            state if ctx.relaunched => Err(PjError::UnsupportedState(format!(
                "relaunched as {:?} instead of inside {}",
                state,
                own_env.path().display()
            ))),
            state => {
                tracing::debug!(?state, "not running inside own environment");
                bootstrap_own_environment(ctx, &own_env)?;
                relaunch(ctx, &own_env)
            }
        }
    }
}

impl Commands {
    pub fn execute(
        &self,
        ctx: &Context,
        project: &Project,
        own_env: &IsolatedEnvironment,
        project_env: &IsolatedEnvironment,
    ) -> Result<i32, PjError> {
        match self {
            Commands::Run { program, args } => {
                ensure_project_environment(ctx, project, own_env, project_env)?;
                let activation = Activation::new(project_env, ctx.path.as_deref())?;
                let executable = resolve(program, activation.search_path(), &ctx.working_dir)?;
                execute(
                    program,
                    &executable,
                    args,
                    &ctx.working_dir,
                    Some(&activation),
                    &ctx.reporter,
                )
            }
            Commands::Build { args } => {
                let backend = PythonBackend::for_environment(own_env);
                ensure_module(own_env, &backend, "build", None, &ctx.reporter)?;
                execute(
                    "python3",
                    &own_env.python(),
                    &build_args(args),
                    &ctx.working_dir,
                    None,
                    &ctx.reporter,
                )
            }
            // TODO: write the requirement into pyproject.toml, then install it.
            Commands::Add { .. } => Err(PjError::NotImplemented("add")),
            Commands::Shell => {
                ensure_project_environment(ctx, project, own_env, project_env)?;
                let activation = Activation::new(project_env, ctx.path.as_deref())?;
                let shell = ctx.shell.clone().unwrap_or_else(default_shell);
                let program = shell.to_string_lossy().into_owned();
                let executable = resolve(&program, activation.search_path(), &ctx.working_dir)?;
                execute(
                    &program,
                    &executable,
                    &[],
                    &ctx.working_dir,
                    Some(&activation),
                    &ctx.reporter,
                )
            }
        }
    }
}

/// Create the tool's own environment from the bootstrap interpreter and
/// install its dependencies into it.
fn bootstrap_own_environment(ctx: &Context, own_env: &IsolatedEnvironment) -> Result<(), PjError> {
    if own_env.is_provisioned() {
        return Ok(());
    }

    let backend = PythonBackend::discover(ctx).ok_or_else(|| PjError::Provisioning {
        path: own_env.path().to_path_buf(),
        source: "no Python interpreter found on PATH".into(),
    })?;
    tracing::debug!(interpreter = %backend.interpreter().display(), "bootstrapping own environment");

    if provision(own_env, &backend, OWN_PROMPT, &ctx.reporter)? == Provisioned::Created {
        seed(own_env, &backend, &ctx.reporter);
    }
    Ok(())
}

/// The project environment is created from the own environment's interpreter.
fn ensure_project_environment(
    ctx: &Context,
    project: &Project,
    own_env: &IsolatedEnvironment,
    project_env: &IsolatedEnvironment,
) -> Result<(), PjError> {
    let backend = PythonBackend::for_environment(own_env);
    let prompt = project
        .name
        .clone()
        .or_else(|| {
            project
                .root
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "venv".to_string());

    provision(project_env, &backend, &prompt, &ctx.reporter)?;
    Ok(())
}

fn build_args(args: &[String]) -> Vec<String> {
    ["-m", "build"]
        .iter()
        .map(|s| s.to_string())
        .chain(args.iter().cloned())
        .collect()
}

fn default_shell() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("cmd.exe")
    } else {
        PathBuf::from("sh")
    }
}
