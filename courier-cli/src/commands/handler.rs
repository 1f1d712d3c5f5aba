use std::sync::Arc;

use rst_common::with_logging::log::debug;

use prople_courier_core::config::{validate, Config, Parser};
use prople_courier_core::packer::{PlainPacker, Registry};
use prople_courier_core::profile::ProtocolVersion;

use crate::types::CliError;

/// `ContextHandler` carries what every command needs: the loaded configuration and the
/// packer registry available without any key material
pub struct ContextHandler {
    config: Config,
    registry: Registry,
}

impl ContextHandler {
    pub fn new(config_file: Option<String>) -> Result<Self, CliError> {
        let config = match config_file {
            Some(file) => {
                debug!("[ctx] loading config: {}", file);
                Parser::new(file)
                    .parse()
                    .map_err(|err| CliError::ConfigError(err.to_string()))?
            }
            None => Config::default(),
        };

        validate(config.clone()).map_err(|err| CliError::ConfigError(err.to_string()))?;

        let mut registry = Registry::new();
        registry.register(vec![Arc::new(PlainPacker::new())]);

        Ok(Self { config, registry })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn protocol_version(&self) -> Result<ProtocolVersion, CliError> {
        self.config
            .profile()
            .protocol_version()
            .map_err(|err| CliError::ConfigError(err.to_string()))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

pub async fn read_file(path: &str) -> Result<Vec<u8>, CliError> {
    rst_common::with_tokio::tokio::fs::read(path)
        .await
        .map_err(|err| CliError::IOError(format!("{}: {}", path, err)))
}
