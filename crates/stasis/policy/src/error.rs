use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("unknown dissolution mode `{0}`")]
    UnknownDissolutionMode(String),
}
