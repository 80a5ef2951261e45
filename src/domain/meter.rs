use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum MeterStatus {
    Active,
    Inactive,
}

/// Prepaid water meter tied to one customer and one approved property.
///
/// `balance` is in IDR minor units and is written exclusively by the ledger;
/// there is no direct-write path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meter {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub property_id: Uuid,
    pub meter_number: String,
    pub location: String,
    pub balance: u64,
    pub status: MeterStatus,
    pub created_at: DateTime<Utc>,
}

impl Meter {
    pub fn register(
        owner_id: Uuid,
        property_id: Uuid,
        meter_number: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            property_id,
            meter_number: meter_number.into(),
            location: location.into(),
            balance: 0,
            status: MeterStatus::Active,
            created_at: Utc::now(),
        }
    }
}

/// Append-only balance change, produced only by reconciled transactions.
/// `caused_by` is the transaction id and doubles as the idempotency key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub meter_id: Uuid,
    pub delta: i64,
    pub caused_by: Uuid,
    pub recorded_at: DateTime<Utc>,
}
