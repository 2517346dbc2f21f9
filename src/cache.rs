use std::fs;
use std::path::{Path, PathBuf};

use crate::context::Context;
use crate::environment::IsolatedEnvironment;

/// Directory name of the fallback environment inside the project root.
pub const FALLBACK_VENV_NAME: &str = ".pjvenv";

/// Where the tool's own environment lives below the cache directory.
pub fn own_environment_subpath() -> PathBuf {
    Path::new("pj").join("virtualenv")
}

/// Resolve the per-user cache directory.
///
/// A non-blank configured `cache_dir` wins, then `XDG_CACHE_HOME` on every
/// platform, then the platform convention. Relative values are taken from the
/// working directory.
pub fn locate_cache_dir(ctx: &Context) -> Option<PathBuf> {
    ctx.settings
        .cache_dir
        .clone()
        .filter(|dir| !is_blank(dir))
        .or_else(|| ctx.xdg_cache_home.clone())
        .or_else(|| platform_cache_dir(ctx))
        .map(|dir| absolute(&ctx.working_dir, &dir))
}

fn is_blank(path: &Path) -> bool {
    path.as_os_str().to_string_lossy().trim().is_empty()
}

fn absolute(base: &Path, dir: &Path) -> PathBuf {
    let joined = base.join(dir);
    fs::canonicalize(&joined).unwrap_or(joined)
}

#[cfg(windows)]
fn platform_cache_dir(ctx: &Context) -> Option<PathBuf> {
    // Known-folder API first, the plain environment variable if that fails.
    dirs::cache_dir().or_else(|| ctx.local_app_data.clone())
}

#[cfg(not(windows))]
fn platform_cache_dir(_ctx: &Context) -> Option<PathBuf> {
    // ~/Library/Caches on macOS, ~/.cache elsewhere.
    dirs::cache_dir()
}

/// The tool's own environment. Falls back to a directory inside the project
/// root, with a warning, when no cache directory can be determined.
pub fn own_environment(ctx: &Context, project_root: &Path) -> IsolatedEnvironment {
    match locate_cache_dir(ctx) {
        Some(cache_dir) => {
            tracing::debug!(cache_dir = %cache_dir.display(), "using cache directory");
            IsolatedEnvironment::new(cache_dir.join(own_environment_subpath()))
        }
        None => {
            let path = project_root.join(FALLBACK_VENV_NAME);
            ctx.reporter.warn(&format!(
                "Cannot determine a cache directory, using {}",
                path.display()
            ));
            IsolatedEnvironment::new(path)
        }
    }
}
