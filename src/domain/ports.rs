use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;

use super::meter::{Adjustment, Meter};
use super::property::Property;
use super::transaction::Transaction;
use super::user::User;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn store(&self, user: User) -> Result<()>;
    async fn get(&self, user_id: Uuid) -> Result<Option<User>>;
    async fn delete(&self, user_id: Uuid) -> Result<()>;
    async fn all(&self) -> Result<Vec<User>>;
}

#[async_trait]
pub trait PropertyStore: Send + Sync {
    async fn store(&self, property: Property) -> Result<()>;
    async fn get(&self, property_id: Uuid) -> Result<Option<Property>>;
    async fn all(&self) -> Result<Vec<Property>>;
}

#[async_trait]
pub trait MeterStore: Send + Sync {
    async fn store(&self, meter: Meter) -> Result<()>;
    async fn get(&self, meter_id: Uuid) -> Result<Option<Meter>>;
    async fn get_by_number(&self, meter_number: &str) -> Result<Option<Meter>>;
    async fn owned_by(&self, owner_id: Uuid) -> Result<Vec<Meter>>;
    async fn all(&self) -> Result<Vec<Meter>>;
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn store(&self, tx: Transaction) -> Result<()>;
    async fn get_by_order(&self, order_id: &str) -> Result<Option<Transaction>>;
    async fn for_customer(&self, customer_id: Uuid) -> Result<Vec<Transaction>>;
    async fn all(&self) -> Result<Vec<Transaction>>;
}

/// Append-only adjustment log backing the ledger. `exists` keys off the
/// causing transaction id, which is what makes replays cheap to absorb.
#[async_trait]
pub trait AdjustmentStore: Send + Sync {
    async fn append(&self, adjustment: Adjustment) -> Result<()>;
    async fn exists(&self, caused_by: Uuid) -> Result<bool>;
    async fn for_meter(&self, meter_id: Uuid) -> Result<Vec<Adjustment>>;
}

pub type UserStoreRef = Arc<dyn UserStore>;
pub type PropertyStoreRef = Arc<dyn PropertyStore>;
pub type MeterStoreRef = Arc<dyn MeterStore>;
pub type TransactionStoreRef = Arc<dyn TransactionStore>;
pub type AdjustmentStoreRef = Arc<dyn AdjustmentStore>;
