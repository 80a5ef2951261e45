#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use indowater::application::admin::UserAdmin;
use indowater::application::ledger::Ledger;
use indowater::application::metering::MeterRegistry;
use indowater::application::purchase::TransactionOrchestrator;
use indowater::application::verification::VerificationWorkflow;
use indowater::domain::meter::Meter;
use indowater::domain::policy::{PolicyEngine, Role};
use indowater::domain::ports::{MeterStoreRef, TransactionStoreRef, UserStore, UserStoreRef};
use indowater::domain::property::{NewProperty, PropertyType, VerificationDecision};
use indowater::domain::user::{Identity, User};
use indowater::infrastructure::in_memory::{
    InMemoryAdjustmentStore, InMemoryMeterStore, InMemoryPropertyStore, InMemoryTransactionStore,
    InMemoryUserStore,
};
use indowater::infrastructure::sandbox::SandboxGateway;

pub const SERVER_KEY: &str = "test-server-key";

/// Fully wired core over in-memory adapters and the sandbox gateway.
pub struct TestCore {
    pub policy: PolicyEngine,
    pub users: UserStoreRef,
    pub meters: MeterStoreRef,
    pub transactions: TransactionStoreRef,
    pub gateway: Arc<SandboxGateway>,
    pub ledger: Arc<Ledger>,
    pub verification: VerificationWorkflow,
    pub registry: MeterRegistry,
    pub admin: UserAdmin,
    pub orchestrator: Arc<TransactionOrchestrator>,
}

impl TestCore {
    pub fn new() -> Self {
        let policy = PolicyEngine::new();
        let users: UserStoreRef = Arc::new(InMemoryUserStore::new());
        let properties = Arc::new(InMemoryPropertyStore::new());
        let meters: MeterStoreRef = Arc::new(InMemoryMeterStore::new());
        let transactions: TransactionStoreRef = Arc::new(InMemoryTransactionStore::new());
        let adjustments = Arc::new(InMemoryAdjustmentStore::new());
        let gateway = Arc::new(SandboxGateway::new(SERVER_KEY));
        let ledger = Ledger::new(meters.clone(), adjustments);

        Self {
            policy,
            verification: VerificationWorkflow::new(policy, properties.clone()),
            registry: MeterRegistry::new(policy, meters.clone(), properties),
            admin: UserAdmin::new(policy, users.clone(), meters.clone(), transactions.clone()),
            orchestrator: Arc::new(TransactionOrchestrator::new(
                policy,
                meters.clone(),
                transactions.clone(),
                ledger.clone(),
                gateway.clone(),
                Duration::from_millis(200),
            )),
            ledger,
            users,
            meters,
            transactions,
            gateway,
        }
    }

    pub async fn seed_user(&self, name: &str, role: Role) -> Identity {
        let user = User::new(name, format!("{name}@example.com"), role);
        let identity = user.identity();
        self.users.store(user).await.unwrap();
        identity
    }

    /// Submits a property as `owner` and approves it as `verifier`.
    pub async fn approved_property(&self, owner: Identity, verifier: Identity) -> Uuid {
        let property = self
            .verification
            .submit(owner, sample_property("Rumah Budi"))
            .await
            .unwrap();
        self.verification
            .decide(verifier, property.id, VerificationDecision::Approved, None)
            .await
            .unwrap();
        property.id
    }

    pub async fn active_meter(&self, owner: Identity, property_id: Uuid, number: &str) -> Meter {
        self.registry
            .register(owner, property_id, number, "front yard")
            .await
            .unwrap()
    }
}

pub fn sample_property(name: &str) -> NewProperty {
    NewProperty {
        name: name.to_string(),
        property_type: PropertyType::Residential,
        address: "Jl. Kenanga 12".to_string(),
        city: "Jakarta".to_string(),
    }
}
