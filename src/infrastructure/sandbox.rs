use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::gateway::{
    callback_signature, CallbackPayload, GatewayStatus, PaymentGateway, PaymentIntent,
};
use crate::domain::transaction::Amount;
use crate::error::{CoreError, Result};

/// Deterministic stand-in for the real payment gateway.
///
/// Issues intents, serves polled statuses, and signs callbacks with the same
/// sha512 scheme the production gateway uses, so verification paths are
/// exercised for real. Used by the scenario binary and the tests.
pub struct SandboxGateway {
    server_key: String,
    statuses: RwLock<HashMap<String, GatewayStatus>>,
}

impl SandboxGateway {
    pub fn new(server_key: impl Into<String>) -> Self {
        Self {
            server_key: server_key.into(),
            statuses: RwLock::new(HashMap::new()),
        }
    }

    /// Sets the outcome a later poll for this order will report.
    pub async fn set_status(&self, order_id: &str, status: GatewayStatus) {
        let mut statuses = self.statuses.write().await;
        statuses.insert(order_id.to_string(), status);
    }

    /// Builds a correctly signed notification, as the real gateway would
    /// emit it.
    pub fn signed_callback(
        &self,
        order_id: &str,
        status: GatewayStatus,
        gross_amount: u64,
    ) -> CallbackPayload {
        let status_code = "200";
        CallbackPayload {
            order_id: order_id.to_string(),
            status_code: status_code.to_string(),
            gross_amount,
            transaction_status: status.as_str().to_string(),
            signature_key: callback_signature(order_id, status_code, gross_amount, &self.server_key),
        }
    }
}

#[async_trait]
impl PaymentGateway for SandboxGateway {
    async fn create_intent(
        &self,
        order_id: &str,
        _amount: Amount,
        _payment_method: &str,
    ) -> Result<PaymentIntent> {
        let mut statuses = self.statuses.write().await;
        statuses.insert(order_id.to_string(), GatewayStatus::Pending);
        Ok(PaymentIntent {
            order_id: order_id.to_string(),
            token: Uuid::new_v4().simple().to_string(),
            redirect_url: format!("https://pay.sandbox.invalid/redirect/{order_id}"),
        })
    }

    async fn fetch_status(&self, order_id: &str) -> Result<GatewayStatus> {
        let statuses = self.statuses.read().await;
        statuses.get(order_id).copied().ok_or_else(|| {
            CoreError::GatewayUnavailable(format!("gateway has no record of order {order_id}"))
        })
    }

    fn verify_callback(&self, payload: &CallbackPayload) -> Result<GatewayStatus> {
        let expected = callback_signature(
            &payload.order_id,
            &payload.status_code,
            payload.gross_amount,
            &self.server_key,
        );
        if expected != payload.signature_key {
            return Err(CoreError::GatewayUnavailable(format!(
                "callback signature mismatch for order {}",
                payload.order_id
            )));
        }
        Ok(GatewayStatus::from_notification(&payload.transaction_status))
    }
}
