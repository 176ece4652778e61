mod parse;
mod profile;

use thiserror::Error;

use crate::error::EditError;

pub use profile::ProfileV1;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid id: {0}")]
    InvalidId(String),
    #[error("duplicate id: {0}")]
    DuplicateId(String),
    #[error("unknown control preset: {0}")]
    UnknownPreset(String),
    #[error("invalid controls for {0}")]
    InvalidControls(String),
    #[error("actions for {0} are declared twice")]
    DuplicateActions(String),
    #[error("invalid actions: {0}")]
    InvalidActions(#[from] EditError),
}
