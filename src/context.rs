use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::PjError;
use crate::output::Reporter;
use crate::relaunch::RELAUNCH_VAR;
use crate::themes::ColorMode;

/// Process state gathered once at startup and handed to every stage.
#[derive(Debug, Clone)]
pub struct Context {
    pub working_dir: PathBuf,
    /// Directory holding the running `pj` executable
    pub install_dir: PathBuf,
    /// Arguments after argv[0], passed through untouched on relaunch
    pub args: Vec<OsString>,
    /// `VIRTUAL_ENV` of this process
    pub prefix: Option<PathBuf>,
    pub relaunched: bool,
    pub xdg_cache_home: Option<PathBuf>,
    #[cfg_attr(not(windows), allow(dead_code))]
    pub local_app_data: Option<PathBuf>,
    pub path: Option<OsString>,
    pub shell: Option<PathBuf>,
    pub settings: Settings,
    pub reporter: Reporter,
}

impl Context {
    /// `color` comes from the command line and beats every other source.
    pub fn gather(color: Option<ColorMode>) -> Result<Self, PjError> {
        let working_dir = std::env::current_dir()?;
        let settings = Settings::new(&working_dir)?;
        let install_dir = install_dir()?;

        Ok(Self {
            args: std::env::args_os().skip(1).collect(),
            prefix: non_blank_path("VIRTUAL_ENV"),
            relaunched: std::env::var_os(RELAUNCH_VAR).is_some(),
            xdg_cache_home: non_blank_path("XDG_CACHE_HOME"),
            local_app_data: non_blank_path("LOCALAPPDATA"),
            path: std::env::var_os("PATH"),
            shell: non_blank_path(if cfg!(windows) { "COMSPEC" } else { "SHELL" }),
            reporter: Reporter::new(color.unwrap_or_else(|| ColorMode::from_env(settings.color))),
            working_dir,
            install_dir,
            settings,
        })
    }
}

fn install_dir() -> Result<PathBuf, PjError> {
    let exe = std::env::current_exe()?;
    let exe = std::fs::canonicalize(&exe).unwrap_or(exe);
    Ok(exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("/")))
}

fn non_blank_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|value| !value.to_string_lossy().trim().is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
impl Context {
    /// A context rooted at `working_dir` that does not look at the real process.
    pub fn for_tests(working_dir: &Path, install_dir: &Path) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            install_dir: install_dir.to_path_buf(),
            args: Vec::new(),
            prefix: None,
            relaunched: false,
            xdg_cache_home: None,
            local_app_data: None,
            path: None,
            shell: None,
            settings: Settings::default(),
            reporter: Reporter::new(ColorMode::Never),
        }
    }
}
