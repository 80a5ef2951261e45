use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::meter::{Adjustment, Meter};
use crate::domain::ports::{
    AdjustmentStore, MeterStore, PropertyStore, TransactionStore, UserStore,
};
use crate::domain::property::Property;
use crate::domain::transaction::Transaction;
use crate::domain::user::User;
use crate::error::Result;

/// Thread-safe in-memory user store backed by `Arc<RwLock<HashMap>>`.
#[derive(Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn store(&self, user: User) -> Result<()> {
        let mut users = self.users.write().await;
        users.insert(user.id, user);
        Ok(())
    }

    async fn get(&self, user_id: Uuid) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&user_id).cloned())
    }

    async fn delete(&self, user_id: Uuid) -> Result<()> {
        let mut users = self.users.write().await;
        users.remove(&user_id);
        Ok(())
    }

    async fn all(&self) -> Result<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryPropertyStore {
    properties: Arc<RwLock<HashMap<Uuid, Property>>>,
}

impl InMemoryPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PropertyStore for InMemoryPropertyStore {
    async fn store(&self, property: Property) -> Result<()> {
        let mut properties = self.properties.write().await;
        properties.insert(property.id, property);
        Ok(())
    }

    async fn get(&self, property_id: Uuid) -> Result<Option<Property>> {
        let properties = self.properties.read().await;
        Ok(properties.get(&property_id).cloned())
    }

    async fn all(&self) -> Result<Vec<Property>> {
        let properties = self.properties.read().await;
        Ok(properties.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryMeterStore {
    meters: Arc<RwLock<HashMap<Uuid, Meter>>>,
}

impl InMemoryMeterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MeterStore for InMemoryMeterStore {
    async fn store(&self, meter: Meter) -> Result<()> {
        let mut meters = self.meters.write().await;
        meters.insert(meter.id, meter);
        Ok(())
    }

    async fn get(&self, meter_id: Uuid) -> Result<Option<Meter>> {
        let meters = self.meters.read().await;
        Ok(meters.get(&meter_id).cloned())
    }

    async fn get_by_number(&self, meter_number: &str) -> Result<Option<Meter>> {
        let meters = self.meters.read().await;
        Ok(meters
            .values()
            .find(|m| m.meter_number == meter_number)
            .cloned())
    }

    async fn owned_by(&self, owner_id: Uuid) -> Result<Vec<Meter>> {
        let meters = self.meters.read().await;
        Ok(meters
            .values()
            .filter(|m| m.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn all(&self) -> Result<Vec<Meter>> {
        let meters = self.meters.read().await;
        Ok(meters.values().cloned().collect())
    }
}

/// Transactions are keyed by order id, the gateway-facing idempotency key.
#[derive(Default, Clone)]
pub struct InMemoryTransactionStore {
    transactions: Arc<RwLock<HashMap<String, Transaction>>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn store(&self, tx: Transaction) -> Result<()> {
        let mut transactions = self.transactions.write().await;
        transactions.insert(tx.order_id.clone(), tx);
        Ok(())
    }

    async fn get_by_order(&self, order_id: &str) -> Result<Option<Transaction>> {
        let transactions = self.transactions.read().await;
        Ok(transactions.get(order_id).cloned())
    }

    async fn for_customer(&self, customer_id: Uuid) -> Result<Vec<Transaction>> {
        let transactions = self.transactions.read().await;
        Ok(transactions
            .values()
            .filter(|t| t.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn all(&self) -> Result<Vec<Transaction>> {
        let transactions = self.transactions.read().await;
        Ok(transactions.values().cloned().collect())
    }
}

/// Adjustment log keyed by causing transaction id, so a replayed transaction
/// cannot append twice.
#[derive(Default, Clone)]
pub struct InMemoryAdjustmentStore {
    adjustments: Arc<RwLock<HashMap<Uuid, Adjustment>>>,
}

impl InMemoryAdjustmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdjustmentStore for InMemoryAdjustmentStore {
    async fn append(&self, adjustment: Adjustment) -> Result<()> {
        let mut adjustments = self.adjustments.write().await;
        adjustments.insert(adjustment.caused_by, adjustment);
        Ok(())
    }

    async fn exists(&self, caused_by: Uuid) -> Result<bool> {
        let adjustments = self.adjustments.read().await;
        Ok(adjustments.contains_key(&caused_by))
    }

    async fn for_meter(&self, meter_id: Uuid) -> Result<Vec<Adjustment>> {
        let adjustments = self.adjustments.read().await;
        Ok(adjustments
            .values()
            .filter(|a| a.meter_id == meter_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::policy::Role;
    use chrono::Utc;

    #[tokio::test]
    async fn test_user_store_roundtrip() {
        let store = InMemoryUserStore::new();
        let user = User::new("Sari", "sari@example.com", Role::Customer);

        store.store(user.clone()).await.unwrap();
        assert_eq!(store.get(user.id).await.unwrap(), Some(user.clone()));

        store.delete(user.id).await.unwrap();
        assert!(store.get(user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_meter_store_lookup_by_number() {
        let store = InMemoryMeterStore::new();
        let meter = Meter::register(Uuid::new_v4(), Uuid::new_v4(), "MTR-7", "back alley");
        store.store(meter.clone()).await.unwrap();

        let found = store.get_by_number("MTR-7").await.unwrap();
        assert_eq!(found, Some(meter));
        assert!(store.get_by_number("MTR-8").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_adjustment_store_deduplicates_by_cause() {
        let store = InMemoryAdjustmentStore::new();
        let caused_by = Uuid::new_v4();
        let meter_id = Uuid::new_v4();
        let adjustment = Adjustment {
            meter_id,
            delta: 50_000,
            caused_by,
            recorded_at: Utc::now(),
        };

        assert!(!store.exists(caused_by).await.unwrap());
        store.append(adjustment.clone()).await.unwrap();
        assert!(store.exists(caused_by).await.unwrap());

        store.append(adjustment).await.unwrap();
        assert_eq!(store.for_meter(meter_id).await.unwrap().len(), 1);
    }
}
