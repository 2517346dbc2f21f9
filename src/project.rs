use std::fs;
use std::path::Path;
use std::path::PathBuf;

use toml::Value;

use crate::config::Settings;
use crate::context::Context;
use crate::environment::IsolatedEnvironment;
use crate::error::PjError;

pub const MANIFEST: &str = "pyproject.toml";

pub struct Project {
    pub name: Option<String>,
    pub root: PathBuf,
}

impl Project {
    pub fn locate(ctx: &Context) -> Result<Project, PjError> {
        let root = locate_root(&ctx.install_dir, &ctx.working_dir)?;
        tracing::debug!(root = %root.display(), "located project root");
        Ok(Project {
            name: read_project_name(&root),
            root,
        })
    }

    /// The project's own environment, `<root>/<venv_name>`.
    pub fn environment(&self, settings: &Settings) -> IsolatedEnvironment {
        IsolatedEnvironment::new(self.root.join(&settings.venv_name))
    }
}

/// A working directory at or below the install directory belongs to the
/// project `pj` ships with; anything else is resolved by searching upwards
/// for the manifest.
pub fn locate_root(install_dir: &Path, working_dir: &Path) -> Result<PathBuf, PjError> {
    if working_dir.starts_with(install_dir) {
        return Ok(install_dir.to_path_buf());
    }

    search_upwards_for_manifest(working_dir)
        .ok_or_else(|| PjError::RootNotFound(working_dir.to_path_buf()))
}

fn search_upwards_for_manifest(dir: &Path) -> Option<PathBuf> {
    let mut current_dir = Some(dir);

    while let Some(dir) = current_dir {
        if dir.join(MANIFEST).is_file() {
            return Some(dir.to_path_buf());
        }
        current_dir = dir.parent();
    }

    None
}

/// `[project].name`, or `[tool.poetry].name` for Poetry projects.
fn read_project_name(root: &Path) -> Option<String> {
    let content = fs::read_to_string(root.join(MANIFEST)).ok()?;
    let pyproject = content.parse::<Value>().ok()?;

    pyproject
        .get("project")
        .and_then(|p| p.get("name"))
        .or_else(|| {
            pyproject
                .get("tool")
                .and_then(|t| t.get("poetry"))
                .and_then(|p| p.get("name"))
        })
        .and_then(Value::as_str)
        .map(str::to_string)
}
