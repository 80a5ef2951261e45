use chrono::Utc;
use uuid::Uuid;

use crate::domain::policy::{Permission, PolicyEngine};
use crate::domain::ports::PropertyStoreRef;
use crate::domain::property::{NewProperty, Property, PropertyStatus, VerificationDecision};
use crate::domain::user::Identity;
use crate::error::{CoreError, Result};

/// Property verification lifecycle: customer submission, admin decision,
/// resubmission of rejected properties.
pub struct VerificationWorkflow {
    policy: PolicyEngine,
    properties: PropertyStoreRef,
}

impl VerificationWorkflow {
    pub fn new(policy: PolicyEngine, properties: PropertyStoreRef) -> Self {
        Self { policy, properties }
    }

    /// Submits a new property, entering the workflow as pending.
    pub async fn submit(&self, identity: Identity, new: NewProperty) -> Result<Property> {
        self.policy.require(&identity, Permission::CreateProperty)?;

        let property = Property::submit(identity.user_id, new);
        self.properties.store(property.clone()).await?;
        tracing::info!(property_id = %property.id, owner = %identity.user_id, "property submitted for verification");
        Ok(property)
    }

    /// Approves or rejects a pending property. Rejection requires a non-empty
    /// note; decided properties are terminal and cannot be re-decided.
    pub async fn decide(
        &self,
        identity: Identity,
        property_id: Uuid,
        decision: VerificationDecision,
        note: Option<String>,
    ) -> Result<Property> {
        self.policy.require(&identity, Permission::VerifyProperty)?;

        let mut property = self
            .properties
            .get(property_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("property {property_id}")))?;

        if property.status.is_terminal() {
            return Err(CoreError::Conflict(format!(
                "property {property_id} is already {}",
                property.status
            )));
        }

        let note = note.filter(|n| !n.trim().is_empty());
        property.status = match decision {
            VerificationDecision::Approved => PropertyStatus::Approved,
            VerificationDecision::Rejected => {
                if note.is_none() {
                    return Err(CoreError::Validation(
                        "rejection requires a non-empty note".to_string(),
                    ));
                }
                PropertyStatus::Rejected
            }
        };
        property.verification_note = note;
        property.verified_by = Some(identity.user_id);
        property.verified_at = Some(Utc::now());

        self.properties.store(property.clone()).await?;
        tracing::info!(%property_id, status = %property.status, verifier = %identity.user_id, "property decided");
        Ok(property)
    }

    /// Creates a fresh pending property from a rejected one owned by the
    /// caller. The rejected original is retained for audit.
    pub async fn resubmit(&self, identity: Identity, property_id: Uuid) -> Result<Property> {
        let source = self
            .properties
            .get(property_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("property {property_id}")))?;

        if source.owner_id != identity.user_id {
            return Err(CoreError::Authorization(
                "only the property owner may resubmit".to_string(),
            ));
        }
        if source.status != PropertyStatus::Rejected {
            return Err(CoreError::Conflict(format!(
                "property {property_id} is {}, only rejected properties can be resubmitted",
                source.status
            )));
        }

        let fresh = source.resubmission();
        self.properties.store(fresh.clone()).await?;
        tracing::info!(source = %property_id, property_id = %fresh.id, "rejected property resubmitted");
        Ok(fresh)
    }

    /// Snapshot of one property: owners always, others need the view-all
    /// permission.
    pub async fn property(&self, identity: Identity, property_id: Uuid) -> Result<Property> {
        let property = self
            .properties
            .get(property_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("property {property_id}")))?;

        if property.owner_id != identity.user_id {
            self.policy.require(&identity, Permission::ViewAllProperties)?;
        }
        Ok(property)
    }

    /// Properties visible to the caller: everything with the view-all
    /// permission, otherwise only their own.
    pub async fn list_properties(&self, identity: Identity) -> Result<Vec<Property>> {
        let all = self.properties.all().await?;
        if self
            .policy
            .has_permission(identity.role, Permission::ViewAllProperties)
        {
            Ok(all)
        } else {
            Ok(all
                .into_iter()
                .filter(|p| p.owner_id == identity.user_id)
                .collect())
        }
    }
}
