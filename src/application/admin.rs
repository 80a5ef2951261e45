use uuid::Uuid;

use crate::domain::policy::{Permission, PolicyEngine, Role};
use crate::domain::ports::{MeterStoreRef, TransactionStoreRef, UserStoreRef};
use crate::domain::transaction::TransactionStatus;
use crate::domain::user::{Identity, User};
use crate::error::{CoreError, Result};

/// Role and account-status administration.
pub struct UserAdmin {
    policy: PolicyEngine,
    users: UserStoreRef,
    meters: MeterStoreRef,
    transactions: TransactionStoreRef,
}

impl UserAdmin {
    pub fn new(
        policy: PolicyEngine,
        users: UserStoreRef,
        meters: MeterStoreRef,
        transactions: TransactionStoreRef,
    ) -> Self {
        Self {
            policy,
            users,
            meters,
            transactions,
        }
    }

    /// Changes a user's role. Self-changes are rejected outright so an actor
    /// can neither escalate themselves nor lock themselves out, and only a
    /// superadmin may grant the superadmin role.
    pub async fn change_role(
        &self,
        identity: Identity,
        target_user_id: Uuid,
        new_role: Role,
    ) -> Result<User> {
        self.policy.require(&identity, Permission::ManageRoles)?;

        if target_user_id == identity.user_id {
            return Err(CoreError::Authorization(
                "cannot change your own role".to_string(),
            ));
        }
        if new_role == Role::Superadmin && identity.role != Role::Superadmin {
            return Err(CoreError::Authorization(
                "only a superadmin may grant the superadmin role".to_string(),
            ));
        }

        let mut user = self
            .users
            .get(target_user_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("user {target_user_id}")))?;
        user.role = new_role;
        self.users.store(user.clone()).await?;

        tracing::info!(user_id = %target_user_id, role = %new_role, actor = %identity.user_id, "user role changed");
        Ok(user)
    }

    /// Activates or deactivates a user account.
    pub async fn set_active(
        &self,
        identity: Identity,
        target_user_id: Uuid,
        is_active: bool,
    ) -> Result<User> {
        self.policy.require(&identity, Permission::EditUser)?;

        if target_user_id == identity.user_id {
            return Err(CoreError::Authorization(
                "cannot change your own active status".to_string(),
            ));
        }

        let mut user = self
            .users
            .get(target_user_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("user {target_user_id}")))?;
        user.is_active = is_active;
        self.users.store(user.clone()).await?;

        tracing::info!(user_id = %target_user_id, is_active, actor = %identity.user_id, "user status changed");
        Ok(user)
    }

    /// Deletes a user. Refused while the user still holds funds on a meter or
    /// has transactions awaiting reconciliation, so no money is orphaned.
    pub async fn delete_user(&self, identity: Identity, target_user_id: Uuid) -> Result<()> {
        self.policy.require(&identity, Permission::DeleteUser)?;

        if target_user_id == identity.user_id {
            return Err(CoreError::Authorization(
                "cannot delete your own account".to_string(),
            ));
        }

        self.users
            .get(target_user_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("user {target_user_id}")))?;

        let funded = self
            .meters
            .owned_by(target_user_id)
            .await?
            .iter()
            .any(|m| m.balance > 0);
        if funded {
            return Err(CoreError::Conflict(
                "user owns meters with a non-zero balance".to_string(),
            ));
        }

        let pending = self
            .transactions
            .for_customer(target_user_id)
            .await?
            .iter()
            .any(|t| t.status == TransactionStatus::Pending);
        if pending {
            return Err(CoreError::Conflict(
                "user has transactions awaiting reconciliation".to_string(),
            ));
        }

        self.users.delete(target_user_id).await?;
        tracing::info!(user_id = %target_user_id, actor = %identity.user_id, "user deleted");
        Ok(())
    }

    pub async fn list_users(&self, identity: Identity) -> Result<Vec<User>> {
        self.policy.require(&identity, Permission::ViewUsers)?;
        self.users.all().await
    }

    /// Snapshot of one user: self always, others need `view_users`.
    pub async fn user(&self, identity: Identity, user_id: Uuid) -> Result<User> {
        if user_id != identity.user_id {
            self.policy.require(&identity, Permission::ViewUsers)?;
        }
        self.users
            .get(user_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("user {user_id}")))
    }
}
