use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{CoreError, Result};

/// Positive purchase amount in IDR minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Amount(u64);

impl Amount {
    pub fn new(value: u64) -> Result<Self> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(CoreError::Validation("amount must be positive".to_string()))
        }
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for Amount {
    type Error = CoreError;

    fn try_from(value: u64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for u64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Transaction lifecycle. Everything except `Pending` is terminal and never
/// regresses; `Settlement` and `Capture` are the two success outcomes.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Settlement,
    Capture,
    Expired,
    Cancelled,
    Denied,
    Failed,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TransactionStatus::Settlement | TransactionStatus::Capture)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Settlement => "settlement",
            TransactionStatus::Capture => "capture",
            TransactionStatus::Expired => "expired",
            TransactionStatus::Cancelled => "cancelled",
            TransactionStatus::Denied => "denied",
            TransactionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credit purchase against one meter. `order_id` is unique and serves as the
/// idempotency key with the payment gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub order_id: String,
    pub customer_id: Uuid,
    pub meter_id: Uuid,
    pub amount: Amount,
    pub payment_method: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Opens a purchase intent in `Pending` with a fresh unique order id.
    pub fn open(
        customer_id: Uuid,
        meter_id: Uuid,
        amount: Amount,
        payment_method: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id: format!("water-{}-{}", meter_id.simple(), Uuid::new_v4().simple()),
            customer_id,
            meter_id,
            amount,
            payment_method: payment_method.into(),
            status: TransactionStatus::Pending,
            created_at: Utc::now(),
        }
    }
}
