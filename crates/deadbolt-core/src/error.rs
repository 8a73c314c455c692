use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Credential errors
    #[error("Invalid token encoding: {0}")]
    InvalidTokenEncoding(String),

    // Controller errors
    #[error("Invalid phase transition from {from} to {to}")]
    InvalidPhaseTransition { from: String, to: String },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
