use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use std::fmt;
use std::sync::Arc;

use crate::error::Result;

use super::transaction::{Amount, TransactionStatus};

/// Authoritative payment outcome as reported by the gateway.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum GatewayStatus {
    Capture,
    Settlement,
    Pending,
    Deny,
    Cancel,
    Expire,
    Failure,
}

impl GatewayStatus {
    /// Terminal transaction status this outcome maps to; `None` while the
    /// gateway itself still reports pending.
    pub fn settled_status(&self) -> Option<TransactionStatus> {
        match self {
            GatewayStatus::Capture => Some(TransactionStatus::Capture),
            GatewayStatus::Settlement => Some(TransactionStatus::Settlement),
            GatewayStatus::Deny => Some(TransactionStatus::Denied),
            GatewayStatus::Cancel => Some(TransactionStatus::Cancelled),
            GatewayStatus::Expire => Some(TransactionStatus::Expired),
            GatewayStatus::Failure => Some(TransactionStatus::Failed),
            GatewayStatus::Pending => None,
        }
    }

    /// Maps a raw notification status string. Statuses outside the known set
    /// land in the generic failure bucket.
    pub fn from_notification(raw: &str) -> Self {
        match raw {
            "capture" => GatewayStatus::Capture,
            "settlement" => GatewayStatus::Settlement,
            "pending" => GatewayStatus::Pending,
            "deny" => GatewayStatus::Deny,
            "cancel" => GatewayStatus::Cancel,
            "expire" => GatewayStatus::Expire,
            _ => GatewayStatus::Failure,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayStatus::Capture => "capture",
            GatewayStatus::Settlement => "settlement",
            GatewayStatus::Pending => "pending",
            GatewayStatus::Deny => "deny",
            GatewayStatus::Cancel => "cancel",
            GatewayStatus::Expire => "expire",
            GatewayStatus::Failure => "failure",
        }
    }
}

impl fmt::Display for GatewayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Redirect/intent handle returned when a purchase is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub order_id: String,
    pub token: String,
    pub redirect_url: String,
}

/// Push-notification body plus its authenticity signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackPayload {
    pub order_id: String,
    pub status_code: String,
    pub gross_amount: u64,
    pub transaction_status: String,
    pub signature_key: String,
}

/// Midtrans-style notification signature:
/// `sha512(order_id + status_code + gross_amount + server_key)`, hex-encoded.
pub fn callback_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: u64,
    server_key: &str,
) -> String {
    let mut hasher = Sha512::new();
    hasher.update(format!("{order_id}{status_code}{gross_amount}{server_key}"));
    hex::encode(hasher.finalize())
}

/// Abstract payment gateway contract. The core only ever talks to this trait;
/// SDK details live behind an adapter.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Opens a payment intent for the given order and returns the redirect
    /// handle the customer completes payment with.
    async fn create_intent(
        &self,
        order_id: &str,
        amount: Amount,
        payment_method: &str,
    ) -> Result<PaymentIntent>;

    /// Active poll for gateways without reliable push callbacks.
    async fn fetch_status(&self, order_id: &str) -> Result<GatewayStatus>;

    /// Fail-closed authenticity check of a push callback. An unverifiable
    /// payload is an error; it must never be applied.
    fn verify_callback(&self, payload: &CallbackPayload) -> Result<GatewayStatus>;
}

pub type PaymentGatewayRef = Arc<dyn PaymentGateway>;
