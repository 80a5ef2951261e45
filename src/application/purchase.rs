use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use uuid::Uuid;

use crate::domain::gateway::{CallbackPayload, GatewayStatus, PaymentGatewayRef, PaymentIntent};
use crate::domain::policy::{Permission, PolicyEngine};
use crate::domain::ports::{MeterStoreRef, TransactionStoreRef};
use crate::domain::transaction::{Amount, Transaction, TransactionStatus};
use crate::domain::user::Identity;
use crate::error::{CoreError, Result};
use crate::infrastructure::locks::LockRegistry;

use super::ledger::Ledger;

/// Business floor for a single credit purchase, in IDR minor units. Enforced
/// here regardless of what any client already validated.
pub const MIN_PURCHASE: u64 = 10_000;

/// Result of funnelling a gateway outcome into the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The transaction transitioned to this terminal status just now.
    Applied(TransactionStatus),
    /// Replayed callback for an already-terminal transaction, absorbed.
    AlreadySettled(TransactionStatus),
    /// The gateway still reports pending; nothing to apply yet.
    StillPending,
}

/// Credit purchase and payment reconciliation state machine.
///
/// `pending → {settlement, capture}` on success (with exactly one ledger
/// credit), `pending → {expired, cancelled, denied, failed}` on failure.
/// Terminal states are immutable. Push callbacks and active polls converge on
/// the same per-order-serialized reconcile path.
pub struct TransactionOrchestrator {
    policy: PolicyEngine,
    meters: MeterStoreRef,
    transactions: TransactionStoreRef,
    ledger: Arc<Ledger>,
    gateway: PaymentGatewayRef,
    gateway_timeout: Duration,
    order_locks: LockRegistry<String>,
}

impl TransactionOrchestrator {
    pub fn new(
        policy: PolicyEngine,
        meters: MeterStoreRef,
        transactions: TransactionStoreRef,
        ledger: Arc<Ledger>,
        gateway: PaymentGatewayRef,
        gateway_timeout: Duration,
    ) -> Self {
        Self {
            policy,
            meters,
            transactions,
            ledger,
            gateway,
            gateway_timeout,
            order_locks: LockRegistry::new(),
        }
    }

    /// Opens a purchase intent for one of the caller's own meters.
    ///
    /// The pending transaction is persisted before the gateway call, so a
    /// timeout leaves a reconcilable record rather than dropping the order.
    pub async fn open_purchase(
        &self,
        identity: Identity,
        meter_id: Uuid,
        amount: Amount,
        payment_method: &str,
    ) -> Result<PaymentIntent> {
        let meter = self
            .meters
            .get(meter_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("meter {meter_id}")))?;
        if meter.owner_id != identity.user_id {
            return Err(CoreError::Authorization(
                "customers may only fund their own meters".to_string(),
            ));
        }
        if amount.value() < MIN_PURCHASE {
            return Err(CoreError::Validation(format!(
                "minimum purchase amount is {MIN_PURCHASE} minor units"
            )));
        }

        let tx = Transaction::open(identity.user_id, meter_id, amount, payment_method);
        self.transactions.store(tx.clone()).await?;

        let intent = match timeout(
            self.gateway_timeout,
            self.gateway.create_intent(&tx.order_id, amount, payment_method),
        )
        .await
        {
            Ok(Ok(intent)) => intent,
            Ok(Err(err)) => {
                tracing::warn!(order_id = %tx.order_id, %err, "gateway rejected intent creation");
                return Err(err);
            }
            Err(_) => {
                tracing::warn!(order_id = %tx.order_id, "gateway intent creation timed out");
                return Err(CoreError::GatewayUnavailable(format!(
                    "intent creation for order {} timed out",
                    tx.order_id
                )));
            }
        };

        tracing::info!(order_id = %tx.order_id, %meter_id, amount = amount.value(), "purchase opened");
        Ok(intent)
    }

    /// Applies a push callback from the gateway. Fails closed: a payload that
    /// does not verify is rejected and logged, never applied.
    pub async fn reconcile(&self, payload: &CallbackPayload) -> Result<ReconcileOutcome> {
        let status = match self.gateway.verify_callback(payload) {
            Ok(status) => status,
            Err(err) => {
                tracing::warn!(order_id = %payload.order_id, %err, "unverifiable gateway callback rejected");
                return Err(err);
            }
        };
        self.apply_outcome(&payload.order_id, status).await
    }

    /// Actively polls the gateway for an order's status and funnels the
    /// result through the same reconcile path as push callbacks.
    pub async fn poll_status(&self, identity: Identity, order_id: &str) -> Result<ReconcileOutcome> {
        let tx = self
            .transactions
            .get_by_order(order_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("transaction {order_id}")))?;
        if tx.customer_id != identity.user_id {
            self.policy
                .require(&identity, Permission::ViewAllTransactions)?;
        }

        let status = timeout(self.gateway_timeout, self.gateway.fetch_status(order_id))
            .await
            .map_err(|_| {
                CoreError::GatewayUnavailable(format!("status poll for order {order_id} timed out"))
            })??;
        self.apply_outcome(order_id, status).await
    }

    async fn apply_outcome(&self, order_id: &str, status: GatewayStatus) -> Result<ReconcileOutcome> {
        let lock = self.order_locks.lock_for(order_id.to_string()).await;
        let _guard = lock.lock().await;

        let mut tx = self
            .transactions
            .get_by_order(order_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("transaction {order_id}")))?;

        if tx.status.is_terminal() {
            tracing::debug!(%order_id, status = %tx.status, "replayed gateway outcome absorbed");
            return Ok(ReconcileOutcome::AlreadySettled(tx.status));
        }

        let Some(settled) = status.settled_status() else {
            return Ok(ReconcileOutcome::StillPending);
        };

        if settled.is_success() {
            // Ledger first: a crash between the two writes replays into the
            // idempotent adjustment, not into a double credit.
            let delta = i64::try_from(tx.amount.value()).map_err(|_| {
                CoreError::Validation(format!("amount of order {order_id} exceeds ledger range"))
            })?;
            self.ledger.apply_adjustment(tx.meter_id, delta, tx.id).await?;
        }
        tx.status = settled;
        self.transactions.store(tx.clone()).await?;

        tracing::info!(%order_id, status = %settled, "transaction reconciled");
        Ok(ReconcileOutcome::Applied(settled))
    }

    /// Snapshot of one transaction: the paying customer or `view_all_transactions`.
    pub async fn transaction(&self, identity: Identity, order_id: &str) -> Result<Transaction> {
        let tx = self
            .transactions
            .get_by_order(order_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("transaction {order_id}")))?;
        if tx.customer_id != identity.user_id {
            self.policy
                .require(&identity, Permission::ViewAllTransactions)?;
        }
        Ok(tx)
    }

    pub async fn list_transactions(&self, identity: Identity) -> Result<Vec<Transaction>> {
        if self
            .policy
            .has_permission(identity.role, Permission::ViewAllTransactions)
        {
            self.transactions.all().await
        } else {
            self.transactions.for_customer(identity.user_id).await
        }
    }
}
