use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid repository format, expected owner/name: {0}")]
    InvalidRepoFormat(String),
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),
}
