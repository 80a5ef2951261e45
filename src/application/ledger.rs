use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::meter::Adjustment;
use crate::domain::ports::{AdjustmentStoreRef, MeterStoreRef};
use crate::error::{CoreError, Result};
use crate::infrastructure::locks::LockRegistry;

/// Meter balance accounting.
///
/// The only writer of `meter.balance`. Adjustments are appended exactly once
/// per causing transaction; replays return the current balance unchanged.
/// Per-meter locking serializes racing adjustments on the same meter.
pub struct Ledger {
    meters: MeterStoreRef,
    adjustments: AdjustmentStoreRef,
    meter_locks: LockRegistry<Uuid>,
}

impl Ledger {
    pub fn new(meters: MeterStoreRef, adjustments: AdjustmentStoreRef) -> Arc<Self> {
        Arc::new(Self {
            meters,
            adjustments,
            meter_locks: LockRegistry::new(),
        })
    }

    /// Derived balance of a meter, never directly settable.
    pub async fn current_balance(&self, meter_id: Uuid) -> Result<u64> {
        let meter = self
            .meters
            .get(meter_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("meter {meter_id}")))?;
        Ok(meter.balance)
    }

    /// Applies a balance delta caused by a reconciled transaction.
    ///
    /// Idempotent per `caused_by`: the second and later calls for the same
    /// transaction are absorbed as no-ops. Fails with Validation if the delta
    /// would drive the balance below zero.
    pub async fn apply_adjustment(
        &self,
        meter_id: Uuid,
        delta: i64,
        caused_by: Uuid,
    ) -> Result<u64> {
        let lock = self.meter_locks.lock_for(meter_id).await;
        let _guard = lock.lock().await;

        if self.adjustments.exists(caused_by).await? {
            tracing::debug!(%meter_id, %caused_by, "duplicate adjustment absorbed");
            return self.current_balance(meter_id).await;
        }

        let mut meter = self
            .meters
            .get(meter_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("meter {meter_id}")))?;

        let next = i128::from(meter.balance) + i128::from(delta);
        if next < 0 {
            return Err(CoreError::Validation(format!(
                "adjustment of {delta} would drive meter {meter_id} balance below zero"
            )));
        }
        meter.balance = u64::try_from(next)
            .map_err(|_| CoreError::Validation(format!("meter {meter_id} balance overflow")))?;

        self.adjustments
            .append(Adjustment {
                meter_id,
                delta,
                caused_by,
                recorded_at: Utc::now(),
            })
            .await?;
        self.meters.store(meter.clone()).await?;

        tracing::info!(%meter_id, %caused_by, delta, balance = meter.balance, "ledger adjustment applied");
        Ok(meter.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::meter::Meter;
    use crate::domain::ports::MeterStore;
    use crate::infrastructure::in_memory::{InMemoryAdjustmentStore, InMemoryMeterStore};

    async fn ledger_with_meter() -> (Arc<Ledger>, Uuid) {
        let meters = Arc::new(InMemoryMeterStore::new());
        let meter = Meter::register(Uuid::new_v4(), Uuid::new_v4(), "MTR-1", "yard");
        let meter_id = meter.id;
        meters.store(meter).await.unwrap();
        let ledger = Ledger::new(meters, Arc::new(InMemoryAdjustmentStore::new()));
        (ledger, meter_id)
    }

    #[tokio::test]
    async fn test_replayed_adjustment_is_noop() {
        let (ledger, meter_id) = ledger_with_meter().await;
        let caused_by = Uuid::new_v4();

        assert_eq!(ledger.apply_adjustment(meter_id, 50_000, caused_by).await.unwrap(), 50_000);
        for _ in 0..3 {
            assert_eq!(
                ledger.apply_adjustment(meter_id, 50_000, caused_by).await.unwrap(),
                50_000
            );
        }
        assert_eq!(ledger.current_balance(meter_id).await.unwrap(), 50_000);
    }

    #[tokio::test]
    async fn test_balance_never_goes_negative() {
        let (ledger, meter_id) = ledger_with_meter().await;
        ledger
            .apply_adjustment(meter_id, 20_000, Uuid::new_v4())
            .await
            .unwrap();

        let result = ledger.apply_adjustment(meter_id, -30_000, Uuid::new_v4()).await;
        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert_eq!(ledger.current_balance(meter_id).await.unwrap(), 20_000);
    }

    #[tokio::test]
    async fn test_unknown_meter_is_not_found() {
        let (ledger, _) = ledger_with_meter().await;
        let result = ledger.apply_adjustment(Uuid::new_v4(), 10_000, Uuid::new_v4()).await;
        assert!(matches!(result, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_racing_adjustments_all_land() {
        let (ledger, meter_id) = ledger_with_meter().await;
        let mut handles = Vec::new();
        for _ in 0..20 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                ledger
                    .apply_adjustment(meter_id, 10_000, Uuid::new_v4())
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(ledger.current_balance(meter_id).await.unwrap(), 200_000);
    }
}
