use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use crate::environment::IsolatedEnvironment;
use crate::error::PjError;
use crate::output::Reporter;
use crate::relaunch::RELAUNCH_VAR;

/// Environment variables that put a child process inside an environment.
///
/// Applied to the child `Command` only; `pj`'s own process environment is
/// never touched.
#[derive(Debug, Clone)]
pub struct Activation {
    virtual_env: PathBuf,
    path: OsString,
}

impl Activation {
    /// Prepend the environment's executable directory to `current_path`.
    pub fn new(env: &IsolatedEnvironment, current_path: Option<&OsStr>) -> Result<Self, PjError> {
        let mut entries = vec![env.bin_dir()];
        if let Some(current) = current_path {
            entries.extend(std::env::split_paths(current));
        }
        let path = std::env::join_paths(entries).map_err(|e| {
            PjError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
        })?;

        Ok(Self {
            virtual_env: env.path().to_path_buf(),
            path,
        })
    }

    pub fn search_path(&self) -> &OsStr {
        &self.path
    }

    pub fn apply(&self, cmd: &mut Command) {
        cmd.env("VIRTUAL_ENV", &self.virtual_env)
            .env("PATH", &self.path)
            .env_remove("PYTHONHOME");
    }
}

/// Find `program` on `search_path`, relative names resolved against `cwd`.
pub fn resolve(program: &str, search_path: &OsStr, cwd: &Path) -> Result<PathBuf, PjError> {
    which::which_in(program, Some(search_path), cwd)
        .map_err(|_| PjError::ExecutableNotFound(program.to_string()))
}

/// Run `executable` to completion with inherited stdio and return its exit
/// code. A non-zero code is reported but is not an error.
pub fn execute(
    program: &str,
    executable: &Path,
    args: &[String],
    cwd: &Path,
    activation: Option<&Activation>,
    reporter: &Reporter,
) -> Result<i32, PjError> {
    let mut command = Command::new(executable);
    // Children may run `pj` again; that call starts over from the top.
    command.args(args).current_dir(cwd).env_remove(RELAUNCH_VAR);
    set_arg0(&mut command, program);
    if let Some(activation) = activation {
        activation.apply(&mut command);
    }

    tracing::debug!(program, executable = %executable.display(), ?args, "executing");
    let status = command.status().map_err(|source| PjError::Spawn {
        program: program.to_string(),
        source,
    })?;

    let code = exit_code(status);
    if code != 0 {
        reporter.err(&format!("'{}' exited with code {}", program, code));
    }
    Ok(code)
}

#[cfg(unix)]
fn set_arg0(command: &mut Command, program: &str) {
    use std::os::unix::process::CommandExt;
    command.arg0(program);
}

#[cfg(not(unix))]
fn set_arg0(_command: &mut Command, _program: &str) {}

/// The code a shell would report for `status`; 128+N for death by signal N.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
