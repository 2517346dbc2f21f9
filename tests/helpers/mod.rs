use anyhow::Result;
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch home with a Python project and a provisioned tool environment.
pub struct Sandbox {
    pub temp_dir: TempDir,
}

impl Sandbox {
    pub fn home(&self) -> PathBuf {
        self.temp_dir.path().join("home")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.home().join(".cache")
    }

    pub fn own_env(&self) -> PathBuf {
        self.cache_dir().join("pj").join("virtualenv")
    }

    pub fn project(&self) -> PathBuf {
        self.home().join("project")
    }

    pub fn project_env(&self) -> PathBuf {
        self.project().join(".venv")
    }

    /// `pj` with a clean, predictable environment, run from `dir`.
    pub fn pj(&self, dir: &Path) -> Result<Command> {
        let mut cmd = Command::cargo_bin("pj")?;
        cmd.current_dir(dir)
            .env("HOME", self.home())
            .env("XDG_CACHE_HOME", self.cache_dir())
            .env_remove("VIRTUAL_ENV")
            .env_remove("PJ_RELAUNCHED")
            .env_remove("PJ_CACHE_DIR")
            .env_remove("PJ_VENV_NAME")
            .env_remove("PJ_PYTHON")
            .env_remove("PJ_COLOR")
            .env_remove("PJ_LOG")
            .env_remove("NO_COLOR")
            .env_remove("FORCE_COLOR");
        Ok(cmd)
    }
}

pub fn create_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

/// A directory that passes as a provisioned environment.
pub fn create_fake_environment(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir.join("bin"))?;
    create_file(
        &dir.join("pyvenv.cfg"),
        "home = /usr/bin\ninclude-system-site-packages = false\nversion = 3.12.0\n",
    )
}

pub fn setup_sandbox() -> Result<Sandbox> {
    let sandbox = Sandbox {
        temp_dir: TempDir::new()?,
    };

    create_file(
        &sandbox.project().join("pyproject.toml"),
        r#"
[project]
name = "sandbox"
version = "0.1.0"
"#,
    )?;
    create_fake_environment(&sandbox.own_env())?;
    create_fake_environment(&sandbox.project_env())?;

    Ok(sandbox)
}
