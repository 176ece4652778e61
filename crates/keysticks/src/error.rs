use keysticks_profile::{ProfileError, StateVector, WatcherError};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("unable to set up logger: {0}")]
    Logger(#[from] log::SetLoggerError),
    #[error("unable to load profile: {0}")]
    Profile(#[from] ProfileError),
    #[error("unable to watch profile: {0}")]
    Watcher(#[from] WatcherError),
    #[error("failed to set Ctrl+C handler: {0}")]
    Signal(#[from] ctrlc::Error),
    #[error("situation {0} is not part of the profile")]
    UnknownSituation(StateVector),
    #[error("mode {0} has no grid")]
    NoGrid(u32),
}

pub(crate) type Result<T> = std::result::Result<T, CliError>;
