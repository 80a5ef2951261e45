use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::domain::policy::{Permission, PolicyEngine};
use crate::domain::user::Identity;
use crate::error::Result;

/// Process-wide tariff configuration, in IDR minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub water_rate: u64,
    pub low_balance_threshold: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            water_rate: 1_000,
            low_balance_threshold: 5_000,
        }
    }
}

/// Water tariff settings. Reads are open (display-only scalar); mutation
/// requires `manage_rates`.
pub struct TariffSettings {
    policy: PolicyEngine,
    inner: RwLock<Settings>,
}

impl TariffSettings {
    pub fn new(policy: PolicyEngine) -> Self {
        Self {
            policy,
            inner: RwLock::new(Settings::default()),
        }
    }

    pub async fn settings(&self) -> Settings {
        *self.inner.read().await
    }

    pub async fn update_rate(&self, identity: Identity, water_rate: u64) -> Result<Settings> {
        self.policy.require(&identity, Permission::ManageRates)?;
        let mut settings = self.inner.write().await;
        settings.water_rate = water_rate;
        tracing::info!(water_rate, actor = %identity.user_id, "water rate updated");
        Ok(*settings)
    }

    pub async fn update_low_balance_threshold(
        &self,
        identity: Identity,
        threshold: u64,
    ) -> Result<Settings> {
        self.policy.require(&identity, Permission::ManageRates)?;
        let mut settings = self.inner.write().await;
        settings.low_balance_threshold = threshold;
        tracing::info!(threshold, actor = %identity.user_id, "low balance threshold updated");
        Ok(*settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::policy::Role;
    use crate::error::CoreError;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_rate_update_requires_manage_rates() {
        let settings = TariffSettings::new(PolicyEngine::new());
        let customer = Identity::new(Uuid::new_v4(), Role::Customer);
        let admin = Identity::new(Uuid::new_v4(), Role::Admin);

        assert!(matches!(
            settings.update_rate(customer, 1_500).await,
            Err(CoreError::Authorization(_))
        ));
        assert_eq!(settings.settings().await.water_rate, 1_000);

        settings.update_rate(admin, 1_500).await.unwrap();
        assert_eq!(settings.settings().await.water_rate, 1_500);
    }
}
