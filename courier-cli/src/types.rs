use rst_common::with_errors::thiserror::{self, Error};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("config error: {0}")]
    ConfigError(String),

    #[error("profile error: {0}")]
    ProfileError(String),

    #[error("envelope error: {0}")]
    EnvelopeError(String),

    #[error("packer error: {0}")]
    PackerError(String),

    #[error("io error: {0}")]
    IOError(String),
}
