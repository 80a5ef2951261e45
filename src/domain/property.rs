use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Residential,
    Commercial,
    Industrial,
    BoardingHouse,
    Rental,
    Other,
}

/// Verification lifecycle. `Approved` and `Rejected` are terminal; a rejected
/// property is never re-decided, only resubmitted as a new entity.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    Pending,
    Approved,
    Rejected,
}

impl PropertyStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PropertyStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Pending => "pending",
            PropertyStatus::Approved => "approved",
            PropertyStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome requested by a verifier.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum VerificationDecision {
    Approved,
    Rejected,
}

/// Customer-submitted property details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProperty {
    pub name: String,
    pub property_type: PropertyType,
    pub address: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub property_type: PropertyType,
    pub address: String,
    pub city: String,
    pub status: PropertyStatus,
    pub verification_note: Option<String>,
    pub verified_by: Option<Uuid>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Property {
    /// New submission, always entering the workflow as pending.
    pub fn submit(owner_id: Uuid, new: NewProperty) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: new.name,
            property_type: new.property_type,
            address: new.address,
            city: new.city,
            status: PropertyStatus::Pending,
            verification_note: None,
            verified_by: None,
            verified_at: None,
            created_at: Utc::now(),
        }
    }

    /// Fresh pending copy of this property. The rejected original stays
    /// untouched for audit.
    pub fn resubmission(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: self.owner_id,
            name: self.name.clone(),
            property_type: self.property_type,
            address: self.address.clone(),
            city: self.city.clone(),
            status: PropertyStatus::Pending,
            verification_note: None,
            verified_by: None,
            verified_at: None,
            created_at: Utc::now(),
        }
    }
}
