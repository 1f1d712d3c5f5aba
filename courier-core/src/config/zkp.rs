use std::time::Duration;

use rst_common::standard::serde::{self, Deserialize};

use crate::profile::CircuitId;

use super::types::{CommonError, ToValidate};

pub const DEFAULT_AUTH_STATE_TRANSITION_DELAY_SECS: u64 = 5 * 60;
pub const DEFAULT_STATE_TRANSITION_DELAY_SECS: u64 = 60 * 60;

/// `ZkpConfig` holds the accepted identity state transition delays
///
/// A proof computed against a superseded identity state is still accepted when the
/// supersession happened less than the delay ago
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "self::serde")]
pub struct ZkpConfig {
    #[serde(default = "default_auth_state_transition_delay_secs")]
    pub(super) auth_state_transition_delay_secs: u64,

    #[serde(default = "default_state_transition_delay_secs")]
    pub(super) state_transition_delay_secs: u64,
}

fn default_auth_state_transition_delay_secs() -> u64 {
    DEFAULT_AUTH_STATE_TRANSITION_DELAY_SECS
}

fn default_state_transition_delay_secs() -> u64 {
    DEFAULT_STATE_TRANSITION_DELAY_SECS
}

impl ZkpConfig {
    pub fn new(auth_state_transition_delay_secs: u64, state_transition_delay_secs: u64) -> Self {
        Self {
            auth_state_transition_delay_secs,
            state_transition_delay_secs,
        }
    }

    pub fn delay_for(&self, circuit: CircuitId) -> Duration {
        if circuit.is_auth() {
            return Duration::from_secs(self.auth_state_transition_delay_secs);
        }

        Duration::from_secs(self.state_transition_delay_secs)
    }
}

impl Default for ZkpConfig {
    fn default() -> Self {
        Self {
            auth_state_transition_delay_secs: default_auth_state_transition_delay_secs(),
            state_transition_delay_secs: default_state_transition_delay_secs(),
        }
    }
}

impl ToValidate for ZkpConfig {
    fn validate(&self) -> Result<(), CommonError> {
        if self.auth_state_transition_delay_secs == 0 {
            return Err(CommonError::ValidationError(
                "config: zkp:auth_state_transition_delay_secs must be greater than zero"
                    .to_string(),
            ));
        }

        if self.state_transition_delay_secs == 0 {
            return Err(CommonError::ValidationError(
                "config: zkp:state_transition_delay_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
