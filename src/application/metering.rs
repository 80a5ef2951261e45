use uuid::Uuid;

use crate::domain::meter::{Meter, MeterStatus};
use crate::domain::policy::{Permission, PolicyEngine};
use crate::domain::ports::{MeterStoreRef, PropertyStoreRef};
use crate::domain::property::PropertyStatus;
use crate::domain::user::Identity;
use crate::error::{CoreError, Result};

/// Meter registration and status management. A meter can only be registered
/// against an approved property owned by the caller.
pub struct MeterRegistry {
    policy: PolicyEngine,
    meters: MeterStoreRef,
    properties: PropertyStoreRef,
}

impl MeterRegistry {
    pub fn new(policy: PolicyEngine, meters: MeterStoreRef, properties: PropertyStoreRef) -> Self {
        Self {
            policy,
            meters,
            properties,
        }
    }

    pub async fn register(
        &self,
        identity: Identity,
        property_id: Uuid,
        meter_number: &str,
        location: &str,
    ) -> Result<Meter> {
        self.policy.require(&identity, Permission::CreateMeter)?;

        if meter_number.trim().is_empty() {
            return Err(CoreError::Validation(
                "meter number must not be empty".to_string(),
            ));
        }

        let property = self
            .properties
            .get(property_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("property {property_id}")))?;
        if property.owner_id != identity.user_id {
            return Err(CoreError::Authorization(
                "meters may only be registered on your own property".to_string(),
            ));
        }
        if property.status != PropertyStatus::Approved {
            return Err(CoreError::Conflict(format!(
                "property {property_id} is {}, it must be approved before hosting meters",
                property.status
            )));
        }

        if self.meters.get_by_number(meter_number).await?.is_some() {
            return Err(CoreError::Conflict(format!(
                "meter number {meter_number} already exists"
            )));
        }

        let meter = Meter::register(identity.user_id, property_id, meter_number, location);
        self.meters.store(meter.clone()).await?;
        tracing::info!(meter_id = %meter.id, meter_number, owner = %identity.user_id, "meter registered");
        Ok(meter)
    }

    /// Activates or deactivates a meter: owner or `edit_meter`.
    pub async fn set_status(
        &self,
        identity: Identity,
        meter_id: Uuid,
        status: MeterStatus,
    ) -> Result<Meter> {
        let mut meter = self
            .meters
            .get(meter_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("meter {meter_id}")))?;

        if meter.owner_id != identity.user_id {
            self.policy.require(&identity, Permission::EditMeter)?;
        }

        meter.status = status;
        self.meters.store(meter.clone()).await?;
        tracing::info!(%meter_id, status = ?status, actor = %identity.user_id, "meter status changed");
        Ok(meter)
    }

    /// Snapshot of one meter: owner always, others need `view_all_meters`.
    pub async fn meter(&self, identity: Identity, meter_id: Uuid) -> Result<Meter> {
        let meter = self
            .meters
            .get(meter_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("meter {meter_id}")))?;

        if meter.owner_id != identity.user_id {
            self.policy.require(&identity, Permission::ViewAllMeters)?;
        }
        Ok(meter)
    }

    pub async fn list_meters(&self, identity: Identity) -> Result<Vec<Meter>> {
        if self
            .policy
            .has_permission(identity.role, Permission::ViewAllMeters)
        {
            self.meters.all().await
        } else {
            self.meters.owned_by(identity.user_id).await
        }
    }
}
