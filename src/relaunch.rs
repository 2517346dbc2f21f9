use std::path::Path;
use std::process::Command;

use crate::context::Context;
use crate::environment::IsolatedEnvironment;
use crate::error::PjError;
#[cfg(not(unix))]
use crate::execution::exit_code;

/// Set on the relaunched process so a second relaunch is detectable.
pub const RELAUNCH_VAR: &str = "PJ_RELAUNCHED";

/// Which environment the running process belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvState {
    Unmanaged,
    OwnEnv,
    ProjectEnv,
}

/// Classify the process prefix. The own environment is checked first so that
/// a project configured to share it still counts as `OwnEnv`.
pub fn current_state(
    prefix: Option<&Path>,
    own: &IsolatedEnvironment,
    project: &IsolatedEnvironment,
) -> EnvState {
    match prefix {
        Some(prefix) if own.is_prefix(prefix) => EnvState::OwnEnv,
        Some(prefix) if project.is_prefix(prefix) => EnvState::ProjectEnv,
        _ => EnvState::Unmanaged,
    }
}

fn relaunch_command(ctx: &Context, own: &IsolatedEnvironment) -> Result<Command, PjError> {
    let exe = std::env::current_exe()?;
    let mut cmd = Command::new(exe);
    cmd.args(&ctx.args)
        .current_dir(&ctx.working_dir)
        .env("VIRTUAL_ENV", own.path())
        .env(RELAUNCH_VAR, "1")
        .env_remove("PYTHONHOME");
    Ok(cmd)
}

/// Re-execute `pj` inside its own environment with the original arguments.
///
/// On Unix the process image is replaced and this only returns on failure.
#[cfg(unix)]
pub fn relaunch(ctx: &Context, own: &IsolatedEnvironment) -> Result<i32, PjError> {
    use std::os::unix::process::CommandExt;

    tracing::debug!(env = %own.path().display(), "replacing process");
    let err = relaunch_command(ctx, own)?.exec();
    Err(PjError::Spawn {
        program: "pj".to_string(),
        source: err,
    })
}

/// Re-execute `pj` inside its own environment with the original arguments.
///
/// Without `exec`, run the new process to completion and hand back its code.
#[cfg(not(unix))]
pub fn relaunch(ctx: &Context, own: &IsolatedEnvironment) -> Result<i32, PjError> {
    tracing::debug!(env = %own.path().display(), "relaunching");
    let status = relaunch_command(ctx, own)?
        .status()
        .map_err(|source| PjError::Spawn {
            program: "pj".to_string(),
            source,
        })?;
    Ok(exit_code(status))
}
