use std::str::FromStr;

use rst_common::standard::serde::{self, Deserialize};

use crate::profile::types::PROTOCOL_VERSION_V1;
use crate::profile::ProtocolVersion;

use super::types::{CommonError, ToValidate};

#[derive(Deserialize, Debug, Clone)]
#[serde(crate = "self::serde")]
pub struct ProfileConfig {
    #[serde(default = "default_protocol_version")]
    pub(super) protocol_version: String,
}

fn default_protocol_version() -> String {
    PROTOCOL_VERSION_V1.to_string()
}

impl ProfileConfig {
    pub fn protocol_version(&self) -> Result<ProtocolVersion, CommonError> {
        ProtocolVersion::from_str(&self.protocol_version)
            .map_err(|err| CommonError::ValidationError(format!("config: profile: {}", err)))
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            protocol_version: default_protocol_version(),
        }
    }
}

impl ToValidate for ProfileConfig {
    fn validate(&self) -> Result<(), CommonError> {
        if self.protocol_version.is_empty() {
            return Err(CommonError::ValidationError(
                "config: profile:protocol_version is missing".to_string(),
            ));
        }

        _ = self.protocol_version()?;
        Ok(())
    }
}
