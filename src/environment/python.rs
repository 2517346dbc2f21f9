use anyhow::{bail, Context as _, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use super::{Backend, IsolatedEnvironment};
use crate::context::Context;
use crate::error::BoxError;

/// Interpreter names tried, in order, when no interpreter is configured.
const BOOTSTRAP_INTERPRETERS: &[&str] = &["python3", "python"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Creator {
    Virtualenv,
    Venv,
}

/// Drives a Python interpreter to build environments.
#[derive(Debug, Clone)]
pub struct PythonBackend {
    interpreter: PathBuf,
}

impl PythonBackend {
    pub fn new(interpreter: PathBuf) -> Self {
        Self { interpreter }
    }

    /// Use the interpreter of an existing environment as the base.
    pub fn for_environment(env: &IsolatedEnvironment) -> Self {
        Self::new(env.python())
    }

    /// The configured interpreter, or the first of `python3`/`python` on `PATH`.
    pub fn discover(ctx: &Context) -> Option<Self> {
        if let Some(python) = &ctx.settings.python {
            return Some(Self::new(python.clone()));
        }

        BOOTSTRAP_INTERPRETERS.iter().find_map(|name| {
            which::which_in(name, ctx.path.as_ref(), &ctx.working_dir)
                .ok()
                .map(Self::new)
        })
    }

    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    fn creator(&self) -> Creator {
        if can_import(&self.interpreter, "virtualenv") {
            Creator::Virtualenv
        } else {
            Creator::Venv
        }
    }

    fn create_command(&self, creator: Creator, target: &Path, prompt: &str) -> Command {
        let mut cmd = Command::new(&self.interpreter);
        match creator {
            Creator::Virtualenv => {
                cmd.args(["-m", "virtualenv", "--quiet", "--python"]);
                cmd.arg(&self.interpreter);
            }
            Creator::Venv => {
                cmd.args(["-m", "venv"]);
                if cfg!(unix) {
                    cmd.arg("--symlinks");
                }
            }
        }
        cmd.arg("--prompt").arg(prompt);
        cmd.arg(target);
        cmd
    }
}

impl Backend for PythonBackend {
    fn create(&self, target: &Path, prompt: &str) -> Result<(), BoxError> {
        self.run_create(target, prompt).map_err(Into::into)
    }

    fn has_module(&self, env: &IsolatedEnvironment, module: &str) -> bool {
        can_import(&env.python(), module)
    }

    fn install(&self, env: &IsolatedEnvironment, packages: &[String]) -> Result<(), BoxError> {
        run_install(&env.python(), packages).map_err(Into::into)
    }
}

impl PythonBackend {
    fn run_create(&self, target: &Path, prompt: &str) -> Result<()> {
        let creator = self.creator();
        tracing::debug!(
            interpreter = %self.interpreter.display(),
            ?creator,
            target = %target.display(),
            "creating environment"
        );
        let output = self
            .create_command(creator, target, prompt)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("failed to start {}", self.interpreter.display()))?;
        check(&self.interpreter, output)
    }
}

fn run_install(python: &Path, packages: &[String]) -> Result<()> {
    let output = install_command(python, packages)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("failed to start {}", python.display()))?;
    check(python, output)
}

fn install_command(python: &Path, packages: &[String]) -> Command {
    let mut cmd = Command::new(python);
    cmd.args(["-m", "pip", "install", "--upgrade", "--quiet"]);
    cmd.args(packages);
    cmd
}

fn can_import(python: &Path, module: &str) -> bool {
    Command::new(python)
        .arg("-c")
        .arg(format!("import {}", module))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

fn check(program: &Path, output: Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = stderr.lines().last().unwrap_or("").trim();
    let code = output
        .status
        .code()
        .map_or_else(|| "a signal".to_string(), |c| format!("code {}", c));
    if detail.is_empty() {
        bail!("{} exited with {}", program.display(), code)
    }
    bail!("{} exited with {}: {}", program.display(), code, detail)
}
