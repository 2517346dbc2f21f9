use std::path::PathBuf;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Exit code used when the process finds itself in an environment it should
/// never be able to reach.
pub const UNSUPPORTED_STATE_EXIT_CODE: i32 = 42;

/// Errors that abort a `pj` invocation.
#[derive(Debug, thiserror::Error)]
pub enum PjError {
    #[error(
        "Cannot find project root. Make sure pyproject.toml exists in {} or one of its parents",
        .0.display()
    )]
    RootNotFound(PathBuf),

    #[error("failed to create environment at {}: {source}", .path.display())]
    Provisioning {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("{0}: could not find executable")]
    ExecutableNotFound(String),

    #[error("failed to install '{package}': {source}")]
    Install {
        package: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("You... shouldn't be here ({0})")]
    UnsupportedState(String),

    #[error("'{0}' is not implemented yet")]
    NotImplemented(&'static str),

    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PjError {
    pub fn exit_code(&self) -> i32 {
        match self {
            PjError::UnsupportedState(_) => UNSUPPORTED_STATE_EXIT_CODE,
            _ => 1,
        }
    }
}
