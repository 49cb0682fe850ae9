use thiserror::Error;

/// Failure to resolve the latest version of a track.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },
    #[error("could not parse {what}: {message}")]
    Parse { what: String, message: String },
    #[error("{0} not found")]
    NotFound(String),
}

impl ResolveError {
    pub fn network(url: &str, message: impl ToString) -> Self {
        Self::Network {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    pub fn parse(what: &str, message: impl ToString) -> Self {
        Self::Parse {
            what: what.to_string(),
            message: message.to_string(),
        }
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;
