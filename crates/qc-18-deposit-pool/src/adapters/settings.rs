//! # Deposit Settings Adapter
//!
//! Static policy held in memory, adjustable at runtime and loadable from JSON.

use crate::config::ConfigError;
use crate::domain::{CollaboratorError, DepositSettings, U256};
use crate::ports::outbound::DepositSettingsProvider;
use parking_lot::RwLock;
use tracing::info;

/// In-memory deposit policy.
#[derive(Debug, Default)]
pub struct StaticDepositSettings {
    settings: RwLock<DepositSettings>,
}

impl StaticDepositSettings {
    /// Wrap a fixed policy.
    #[must_use]
    pub fn new(settings: DepositSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }

    /// Parse a policy from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: DepositSettings =
            serde_json::from_str(json).map_err(|e| ConfigError::InvalidJson(e.to_string()))?;
        Ok(Self::new(settings))
    }

    /// Current policy values.
    #[must_use]
    pub fn current(&self) -> DepositSettings {
        self.settings.read().clone()
    }

    /// Modify the policy in place.
    pub fn update(&self, change: impl FnOnce(&mut DepositSettings)) {
        let mut settings = self.settings.write();
        change(&mut *settings);
        info!(settings = ?*settings, "deposit settings updated");
    }
}

impl DepositSettingsProvider for StaticDepositSettings {
    fn deposit_enabled(&self) -> Result<bool, CollaboratorError> {
        Ok(self.settings.read().deposit_enabled)
    }

    fn minimum_deposit(&self) -> Result<U256, CollaboratorError> {
        Ok(self.settings.read().minimum_deposit)
    }

    fn maximum_deposit_pool_size(&self) -> Result<U256, CollaboratorError> {
        Ok(self.settings.read().maximum_deposit_pool_size)
    }

    fn assign_deposits_enabled(&self) -> Result<bool, CollaboratorError> {
        Ok(self.settings.read().assign_deposits_enabled)
    }

    fn maximum_deposit_assignments(&self) -> Result<u64, CollaboratorError> {
        Ok(self.settings.read().maximum_deposit_assignments)
    }

    fn snapshot(&self) -> Result<DepositSettings, CollaboratorError> {
        Ok(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::units::ether;

    #[test]
    fn test_update_is_visible() {
        let settings = StaticDepositSettings::default();
        assert!(settings.deposit_enabled().unwrap());

        settings.update(|s| {
            s.deposit_enabled = false;
            s.maximum_deposit_assignments = 9;
        });
        assert!(!settings.deposit_enabled().unwrap());
        assert_eq!(settings.snapshot().unwrap().maximum_deposit_assignments, 9);
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::to_string(&DepositSettings {
            maximum_deposit_pool_size: ether(100),
            ..DepositSettings::default()
        })
        .unwrap();
        let settings = StaticDepositSettings::from_json(&json).unwrap();
        assert_eq!(settings.maximum_deposit_pool_size().unwrap(), ether(100));

        assert!(matches!(
            StaticDepositSettings::from_json("[]"),
            Err(ConfigError::InvalidJson(_))
        ));
    }
}
