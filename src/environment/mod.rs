mod python;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BoxError, PjError};
use crate::output::Reporter;

pub use python::PythonBackend;

/// File whose presence marks a provisioned environment.
pub const MARKER: &str = "pyvenv.cfg";

/// The tool's own runtime dependencies, installed once after creation.
pub const SEED_PACKAGES: &[&str] = &["pip", "build", "shellingham", "virtualenv"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsolatedEnvironment {
    path: PathBuf,
}

impl IsolatedEnvironment {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_provisioned(&self) -> bool {
        self.path.join(MARKER).is_file()
    }

    pub fn bin_dir(&self) -> PathBuf {
        if cfg!(windows) {
            self.path.join("Scripts")
        } else {
            self.path.join("bin")
        }
    }

    pub fn python(&self) -> PathBuf {
        if cfg!(windows) {
            self.bin_dir().join("python.exe")
        } else {
            self.bin_dir().join("python")
        }
    }

    /// Whether `prefix` names this environment.
    pub fn is_prefix(&self, prefix: &Path) -> bool {
        match (fs::canonicalize(&self.path), fs::canonicalize(prefix)) {
            (Ok(ours), Ok(theirs)) => ours == theirs,
            _ => self.path == prefix,
        }
    }
}

/// Creates environments and installs packages into them.
#[cfg_attr(test, mockall::automock)]
pub trait Backend {
    fn create(&self, target: &Path, prompt: &str) -> Result<(), BoxError>;
    fn has_module(&self, env: &IsolatedEnvironment, module: &str) -> bool;
    fn install(&self, env: &IsolatedEnvironment, packages: &[String]) -> Result<(), BoxError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    AlreadyPresent,
    Created,
}

/// Make sure `env` exists, creating it through `backend` when its marker is
/// missing.
///
/// Two invocations may race to create the same directory. A failed creation
/// whose marker shows up anyway counts as present; nothing here is atomic.
pub fn provision(
    env: &IsolatedEnvironment,
    backend: &dyn Backend,
    prompt: &str,
    reporter: &Reporter,
) -> Result<Provisioned, PjError> {
    if env.is_provisioned() {
        tracing::debug!(env = %env.path().display(), "environment already provisioned");
        return Ok(Provisioned::AlreadyPresent);
    }

    reporter.doing("Initializing environment");

    let target = env.path().to_path_buf();
    let cleanup = scopeguard::guard(!target.exists(), move |created_dir| {
        if created_dir {
            let _ = fs::remove_dir_all(&target);
        }
    });

    match backend.create(env.path(), prompt) {
        Ok(()) if env.is_provisioned() => {
            scopeguard::ScopeGuard::into_inner(cleanup);
            reporter.done();
            Ok(Provisioned::Created)
        }
        Ok(()) => {
            reporter.failed();
            Err(PjError::Provisioning {
                path: env.path().to_path_buf(),
                source: format!("{} was not written", MARKER).into(),
            })
        }
        Err(source) if env.is_provisioned() => {
            scopeguard::ScopeGuard::into_inner(cleanup);
            reporter.done();
            tracing::debug!(%source, "environment appeared while creating it");
            Ok(Provisioned::AlreadyPresent)
        }
        Err(source) => {
            reporter.failed();
            Err(PjError::Provisioning {
                path: env.path().to_path_buf(),
                source,
            })
        }
    }
}

/// Install [`SEED_PACKAGES`]. Needs the network, so failure only warns.
pub fn seed(env: &IsolatedEnvironment, backend: &dyn Backend, reporter: &Reporter) {
    let packages: Vec<String> = SEED_PACKAGES.iter().map(|p| p.to_string()).collect();

    reporter.doing("Installing pj dependencies");
    match backend.install(env, &packages) {
        Ok(()) => reporter.done(),
        Err(e) => {
            reporter.failed();
            reporter.warn(&format!(
                "Could not install {}: {}",
                SEED_PACKAGES.join(", "),
                e
            ));
        }
    }
}

/// Install `package` into `env` unless `module` already imports there.
pub fn ensure_module(
    env: &IsolatedEnvironment,
    backend: &dyn Backend,
    module: &str,
    package: Option<&str>,
    reporter: &Reporter,
) -> Result<(), PjError> {
    if backend.has_module(env, module) {
        return Ok(());
    }

    let package = package.unwrap_or(module);
    reporter.doing(&format!("Installing '{}'", package));
    backend
        .install(env, &[package.to_string()])
        .map_err(|source| {
            reporter.failed();
            PjError::Install {
                package: package.to_string(),
                source,
            }
        })?;
    reporter.done();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::project_dir_mocks::create_fake_environment;
    use crate::themes::ColorMode;
    use mockall::predicate::eq;
    use tempfile::TempDir;

    fn reporter() -> Reporter {
        Reporter::new(ColorMode::Never)
    }

    fn write_marker(target: &Path) -> Result<(), BoxError> {
        fs::create_dir_all(target)?;
        fs::write(target.join(MARKER), "home = /usr/bin\n")?;
        Ok(())
    }

    #[test]
    fn test_provision_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let env = IsolatedEnvironment::new(temp_dir.path().join("venv"));

        let mut backend = MockBackend::new();
        backend
            .expect_create()
            .times(1)
            .returning(|target, _| write_marker(target));

        assert_eq!(
            provision(&env, &backend, "pj", &reporter()).unwrap(),
            Provisioned::Created
        );
        assert_eq!(
            provision(&env, &backend, "pj", &reporter()).unwrap(),
            Provisioned::AlreadyPresent
        );
        assert!(env.is_provisioned());
    }

    #[test]
    fn test_existing_environment_is_left_alone() {
        let temp_dir = TempDir::new().unwrap();
        let env = create_fake_environment(&temp_dir.path().join("venv")).unwrap();

        let mut backend = MockBackend::new();
        backend.expect_create().never();

        assert_eq!(
            provision(&env, &backend, "pj", &reporter()).unwrap(),
            Provisioned::AlreadyPresent
        );
    }

    #[test]
    fn test_failed_creation_reports_cause_and_cleans_up() {
        let temp_dir = TempDir::new().unwrap();
        let env = IsolatedEnvironment::new(temp_dir.path().join("venv"));

        let mut backend = MockBackend::new();
        backend.expect_create().times(1).returning(|target, _| {
            fs::create_dir_all(target.join("lib"))?;
            Err("No space left on device".into())
        });

        let err = provision(&env, &backend, "pj", &reporter()).unwrap_err();
        match err {
            PjError::Provisioning { path, source } => {
                assert_eq!(path, env.path());
                assert_eq!(source.to_string(), "No space left on device");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!env.path().exists());
    }

    #[test]
    fn test_preexisting_directory_is_not_removed_on_failure() {
        let temp_dir = TempDir::new().unwrap();
        let env = IsolatedEnvironment::new(temp_dir.path().join("venv"));
        fs::create_dir_all(env.path()).unwrap();
        fs::write(env.path().join("keep.txt"), "mine").unwrap();

        let mut backend = MockBackend::new();
        backend
            .expect_create()
            .returning(|_, _| Err("Permission denied".into()));

        assert!(provision(&env, &backend, "pj", &reporter()).is_err());
        assert!(env.path().join("keep.txt").exists());
    }

    #[test]
    fn test_concurrently_created_environment_counts_as_present() {
        let temp_dir = TempDir::new().unwrap();
        let env = IsolatedEnvironment::new(temp_dir.path().join("venv"));

        let mut backend = MockBackend::new();
        backend.expect_create().times(1).returning(|target, _| {
            write_marker(target)?;
            Err("File exists".into())
        });

        assert_eq!(
            provision(&env, &backend, "pj", &reporter()).unwrap(),
            Provisioned::AlreadyPresent
        );
        assert!(env.is_provisioned());
    }

    #[test]
    fn test_creation_without_marker_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let env = IsolatedEnvironment::new(temp_dir.path().join("venv"));

        let mut backend = MockBackend::new();
        backend.expect_create().returning(|target, _| {
            fs::create_dir_all(target)?;
            Ok(())
        });

        assert!(matches!(
            provision(&env, &backend, "pj", &reporter()),
            Err(PjError::Provisioning { .. })
        ));
    }

    #[test]
    fn test_prompt_is_forwarded() {
        let temp_dir = TempDir::new().unwrap();
        let env = IsolatedEnvironment::new(temp_dir.path().join("venv"));

        let mut backend = MockBackend::new();
        backend
            .expect_create()
            .withf(|_, prompt| prompt == "my-project")
            .times(1)
            .returning(|target, _| write_marker(target));

        provision(&env, &backend, "my-project", &reporter()).unwrap();
    }

    #[test]
    fn test_seed_failure_is_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let env = create_fake_environment(&temp_dir.path().join("venv")).unwrap();

        let mut backend = MockBackend::new();
        backend
            .expect_install()
            .withf(|_, packages| {
                packages.iter().map(String::as_str).collect::<Vec<_>>() == SEED_PACKAGES
            })
            .times(1)
            .returning(|_, _| Err("network unreachable".into()));

        seed(&env, &backend, &reporter());
    }

    #[test]
    fn test_ensure_module_skips_installed_module() {
        let temp_dir = TempDir::new().unwrap();
        let env = create_fake_environment(&temp_dir.path().join("venv")).unwrap();

        let mut backend = MockBackend::new();
        backend
            .expect_has_module()
            .with(eq(env.clone()), eq("build"))
            .return_const(true);
        backend.expect_install().never();

        ensure_module(&env, &backend, "build", None, &reporter()).unwrap();
    }

    #[test]
    fn test_ensure_module_installs_missing_package() {
        let temp_dir = TempDir::new().unwrap();
        let env = create_fake_environment(&temp_dir.path().join("venv")).unwrap();

        let mut backend = MockBackend::new();
        backend.expect_has_module().return_const(false);
        backend
            .expect_install()
            .withf(|_, packages| packages.to_vec() == vec!["PyYAML".to_string()])
            .times(1)
            .returning(|_, _| Ok(()));

        ensure_module(&env, &backend, "yaml", Some("PyYAML"), &reporter()).unwrap();
    }

    #[test]
    fn test_ensure_module_install_failure_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let env = create_fake_environment(&temp_dir.path().join("venv")).unwrap();

        let mut backend = MockBackend::new();
        backend.expect_has_module().return_const(false);
        backend
            .expect_install()
            .returning(|_, _| Err("pip exited with code 1".into()));

        let err = ensure_module(&env, &backend, "build", None, &reporter()).unwrap_err();
        assert!(matches!(err, PjError::Install { ref package, .. } if package == "build"));
    }

    #[test]
    fn test_is_prefix_compares_canonical_paths() {
        let temp_dir = TempDir::new().unwrap();
        let env = create_fake_environment(&temp_dir.path().join("venv")).unwrap();

        assert!(env.is_prefix(&temp_dir.path().join("venv").join("bin").join("..")));
        assert!(!env.is_prefix(temp_dir.path()));
        assert!(!env.is_prefix(Path::new("/definitely/not/here")));
    }
}
