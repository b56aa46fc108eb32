use std::process;

use tracing::error;

pub const EXIT_ERROR: i32 = 1;

/// Failure of a CLI run.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Nestree(#[from] nestree::Error),
    #[error("stored root hash {stored} at {path} does not match recomputed {computed}")]
    HashMismatch {
        path: String,
        stored: u64,
        computed: u64,
    },
    #[error("root hash {computed} does not match the expected {expected}")]
    RootMismatch { expected: u64, computed: u64 },
}

/// Logs the error and terminates with [`EXIT_ERROR`].
pub fn exit_with_error(err: CliError) -> ! {
    error!("{err}");
    process::exit(EXIT_ERROR)
}

pub type CliResult<T> = Result<T, CliError>;
