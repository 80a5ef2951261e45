use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::application::admin::UserAdmin;
use crate::application::ledger::Ledger;
use crate::application::metering::MeterRegistry;
use crate::application::purchase::TransactionOrchestrator;
use crate::application::settings::TariffSettings;
use crate::application::verification::VerificationWorkflow;
use crate::domain::policy::PolicyEngine;
use crate::domain::ports::{MeterStoreRef, TransactionStoreRef, UserStoreRef};
use crate::domain::property::NewProperty;
use crate::domain::transaction::Amount;
use crate::domain::user::{Identity, User};
use crate::error::{CoreError, Result};
use crate::infrastructure::in_memory::{
    InMemoryAdjustmentStore, InMemoryMeterStore, InMemoryPropertyStore, InMemoryTransactionStore,
    InMemoryUserStore,
};
use crate::infrastructure::sandbox::SandboxGateway;

use super::report::Report;
use super::scenario::ScenarioEvent;

const SANDBOX_SERVER_KEY: &str = "sandbox-server-key";

/// Replays scenario events against a fully wired in-memory core.
///
/// Keeps handle→id maps so scenario lines can reference users, properties,
/// and orders symbolically while the core works with generated ids.
pub struct ScenarioRunner {
    users: UserStoreRef,
    meters: MeterStoreRef,
    transactions: TransactionStoreRef,
    gateway: Arc<SandboxGateway>,
    verification: VerificationWorkflow,
    registry: MeterRegistry,
    admin: UserAdmin,
    orchestrator: TransactionOrchestrator,
    tariffs: TariffSettings,
    user_handles: HashMap<String, Uuid>,
    property_handles: HashMap<String, Uuid>,
    order_handles: HashMap<String, String>,
}

impl ScenarioRunner {
    pub fn new(gateway_timeout: Duration) -> Self {
        let policy = PolicyEngine::new();
        let users: UserStoreRef = Arc::new(InMemoryUserStore::new());
        let properties = Arc::new(InMemoryPropertyStore::new());
        let meters: MeterStoreRef = Arc::new(InMemoryMeterStore::new());
        let transactions: TransactionStoreRef = Arc::new(InMemoryTransactionStore::new());
        let adjustments = Arc::new(InMemoryAdjustmentStore::new());
        let gateway = Arc::new(SandboxGateway::new(SANDBOX_SERVER_KEY));

        let ledger = Ledger::new(meters.clone(), adjustments);
        Self {
            verification: VerificationWorkflow::new(policy, properties.clone()),
            registry: MeterRegistry::new(policy, meters.clone(), properties),
            admin: UserAdmin::new(policy, users.clone(), meters.clone(), transactions.clone()),
            orchestrator: TransactionOrchestrator::new(
                policy,
                meters.clone(),
                transactions.clone(),
                ledger,
                gateway.clone(),
                gateway_timeout,
            ),
            tariffs: TariffSettings::new(policy),
            users,
            meters,
            transactions,
            gateway,
            user_handles: HashMap::new(),
            property_handles: HashMap::new(),
            order_handles: HashMap::new(),
        }
    }

    pub async fn apply(&mut self, event: ScenarioEvent) -> Result<()> {
        match event {
            ScenarioEvent::RegisterUser {
                handle,
                name,
                email,
                role,
            } => {
                let user = User::new(name, email, role);
                self.user_handles.insert(handle, user.id);
                self.users.store(user).await
            }
            ScenarioEvent::SubmitProperty {
                actor,
                handle,
                name,
                property_type,
                address,
                city,
            } => {
                let identity = self.identity(&actor).await?;
                let property = self
                    .verification
                    .submit(
                        identity,
                        NewProperty {
                            name,
                            property_type,
                            address,
                            city,
                        },
                    )
                    .await?;
                self.property_handles.insert(handle, property.id);
                Ok(())
            }
            ScenarioEvent::DecideProperty {
                actor,
                property,
                decision,
                note,
            } => {
                let identity = self.identity(&actor).await?;
                let property_id = self.property_id(&property)?;
                self.verification
                    .decide(identity, property_id, decision, note)
                    .await?;
                Ok(())
            }
            ScenarioEvent::RegisterMeter {
                actor,
                property,
                meter_number,
                location,
            } => {
                let identity = self.identity(&actor).await?;
                let property_id = self.property_id(&property)?;
                self.registry
                    .register(identity, property_id, &meter_number, &location)
                    .await?;
                Ok(())
            }
            ScenarioEvent::Purchase {
                actor,
                meter_number,
                amount,
                payment_method,
                order,
            } => {
                let identity = self.identity(&actor).await?;
                let meter = self
                    .meters
                    .get_by_number(&meter_number)
                    .await?
                    .ok_or_else(|| CoreError::NotFound(format!("meter {meter_number}")))?;
                let intent = self
                    .orchestrator
                    .open_purchase(identity, meter.id, Amount::new(amount)?, &payment_method)
                    .await?;
                self.order_handles.insert(order, intent.order_id);
                Ok(())
            }
            ScenarioEvent::Callback { order, status } => {
                let order_id = self.order_id(&order)?;
                let tx = self
                    .transactions
                    .get_by_order(&order_id)
                    .await?
                    .ok_or_else(|| CoreError::NotFound(format!("transaction {order_id}")))?;
                // Keep the sandbox's own record in step so later polls agree
                // with what it pushed.
                self.gateway.set_status(&order_id, status).await;
                let payload = self
                    .gateway
                    .signed_callback(&order_id, status, tx.amount.value());
                self.orchestrator.reconcile(&payload).await?;
                Ok(())
            }
            ScenarioEvent::Poll { actor, order } => {
                let identity = self.identity(&actor).await?;
                let order_id = self.order_id(&order)?;
                self.orchestrator.poll_status(identity, &order_id).await?;
                Ok(())
            }
            ScenarioEvent::ChangeRole {
                actor,
                user,
                new_role,
            } => {
                let identity = self.identity(&actor).await?;
                let target = self.user_id(&user)?;
                self.admin.change_role(identity, target, new_role).await?;
                Ok(())
            }
            ScenarioEvent::SetActive {
                actor,
                user,
                is_active,
            } => {
                let identity = self.identity(&actor).await?;
                let target = self.user_id(&user)?;
                self.admin.set_active(identity, target, is_active).await?;
                Ok(())
            }
            ScenarioEvent::SetRate { actor, water_rate } => {
                let identity = self.identity(&actor).await?;
                self.tariffs.update_rate(identity, water_rate).await?;
                Ok(())
            }
        }
    }

    /// Final state of all meters and transactions.
    pub async fn report(&self) -> Result<Report> {
        Ok(Report::build(
            self.meters.all().await?,
            self.transactions.all().await?,
        ))
    }

    async fn identity(&self, handle: &str) -> Result<Identity> {
        let user_id = self.user_id(handle)?;
        let user = self
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("user {user_id}")))?;
        Ok(user.identity())
    }

    fn user_id(&self, handle: &str) -> Result<Uuid> {
        self.user_handles
            .get(handle)
            .copied()
            .ok_or_else(|| CoreError::Validation(format!("unknown user handle {handle}")))
    }

    fn property_id(&self, handle: &str) -> Result<Uuid> {
        self.property_handles
            .get(handle)
            .copied()
            .ok_or_else(|| CoreError::Validation(format!("unknown property handle {handle}")))
    }

    fn order_id(&self, handle: &str) -> Result<String> {
        self.order_handles
            .get(handle)
            .cloned()
            .ok_or_else(|| CoreError::Validation(format!("unknown order handle {handle}")))
    }
}
