use thiserror::Error;

use hangar_provider::ResolveError;
use hangar_store::StoreError;

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("unknown add-on: {0}")]
    UnknownAddon(String),
    #[error("add-on {addon} has no track {url}")]
    UnknownTrack { addon: String, url: String },
    #[error("add-on {0} has no usable track")]
    NoTrack(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

pub type ManagerResult<T> = Result<T, ManagerError>;
