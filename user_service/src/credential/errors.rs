use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CredentialError {
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
