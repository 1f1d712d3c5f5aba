use rst_common::standard::serde::{self, Deserialize};

use super::types::{CommonError, ToValidate};
use super::{ProfileConfig, ZkpConfig};

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(crate = "self::serde")]
pub struct Config {
    #[serde(default)]
    pub(super) profile: ProfileConfig,

    #[serde(default)]
    pub(super) zkp: ZkpConfig,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile(&self) -> &ProfileConfig {
        &self.profile
    }

    pub fn zkp(&self) -> &ZkpConfig {
        &self.zkp
    }
}

impl ToValidate for Config {
    fn validate(&self) -> Result<(), CommonError> {
        _ = self.profile.validate()?;
        _ = self.zkp.validate()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::validate;

    #[test]
    fn test_validate_default() {
        let cfg = Config::default();
        assert!(!validate(cfg).is_err())
    }

    #[test]
    fn test_validation_failed() {
        let cfg = Config {
            profile: ProfileConfig::default(),
            zkp: ZkpConfig::new(0, 0),
        };

        let validation = validate(cfg);
        assert!(validation.is_err());
        assert!(matches!(
            validation.unwrap_err(),
            CommonError::ValidationError(_)
        ))
    }
}
