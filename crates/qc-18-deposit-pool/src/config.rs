//! # Deposit Pool Configuration
//!
//! Runtime parameters for the deposit pool service.
//!
//! ## Requirements
//!
//! - `pool_address` MUST NOT be the zero address; it is the identity the
//!   vault attributes custody to and the registry must list as latest
//! - Limits have sane defaults with override capability

use crate::domain::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default notification channel capacity.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Deposit pool service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepositPoolConfig {
    /// Address of this deposit pool.
    pub pool_address: Address,
    /// Buffer size of the notification broadcast channel.
    pub event_channel_capacity: usize,
}

impl Default for DepositPoolConfig {
    fn default() -> Self {
        Self {
            pool_address: Address::ZERO,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }
}

impl DepositPoolConfig {
    /// Configuration for a pool at `pool_address` with default limits.
    #[must_use]
    pub fn for_pool(pool_address: Address) -> Self {
        Self {
            pool_address,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::InvalidJson(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration before the service starts.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - the pool address is the zero address
    /// - the notification channel has no capacity
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_address.is_zero() {
            return Err(ConfigError::ZeroPoolAddress);
        }
        if self.event_channel_capacity == 0 {
            return Err(ConfigError::ZeroChannelCapacity);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Pool address not set.
    #[error("pool address is the zero address")]
    ZeroPoolAddress,

    /// Notification channel would hold nothing.
    #[error("event channel capacity must be greater than zero")]
    ZeroChannelCapacity,

    /// Configuration text could not be parsed.
    #[error("invalid configuration JSON: {0}")]
    InvalidJson(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_requires_pool_address() {
        assert_eq!(
            DepositPoolConfig::default().validate(),
            Err(ConfigError::ZeroPoolAddress)
        );
        assert!(DepositPoolConfig::for_pool(Address::repeat(0xDD))
            .validate()
            .is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = DepositPoolConfig {
            event_channel_capacity: 0,
            ..DepositPoolConfig::for_pool(Address::repeat(0xDD))
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroChannelCapacity));
    }

    #[test]
    fn test_from_json() {
        let expected = DepositPoolConfig {
            pool_address: Address::repeat(0xDD),
            event_channel_capacity: 64,
        };
        let json = serde_json::to_string(&expected).unwrap();
        assert_eq!(DepositPoolConfig::from_json(&json).unwrap(), expected);

        assert!(matches!(
            DepositPoolConfig::from_json("{not json"),
            Err(ConfigError::InvalidJson(_))
        ));
        // Missing fields fall back to defaults, which fail validation.
        assert_eq!(
            DepositPoolConfig::from_json("{}"),
            Err(ConfigError::ZeroPoolAddress)
        );
    }
}
