use std::path::PathBuf;

use shared::error::RemoteCallError;
use thiserror::Error;

use crate::orchestrator::Stage;

#[derive(Error, Debug)]
pub enum ProvisionError {
    /// Forwarded verbatim from the Ads API client.
    #[error(transparent)]
    Remote(#[from] RemoteCallError),
    /// A stage needed an identifier that was never produced.
    #[error("{stage} reference missing")]
    MissingReference { stage: Stage },
    #[error("failed to read image {}: {source}", path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ProvisionError {
    pub fn remote(&self) -> Option<&RemoteCallError> {
        match self {
            ProvisionError::Remote(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
