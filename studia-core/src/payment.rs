use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Processing,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Upi,
    Card,
    BankTransfer,
    Gateway,
    Manual,
}

/// Payment metadata recorded on an order once a completion path fires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    /// External transaction reference (UTR, gateway payment id, ...).
    pub reference: Option<String>,
    /// URL of an uploaded payment proof, if the customer attached one.
    pub proof_url: Option<String>,
    pub verified: bool,
    pub received_at: DateTime<Utc>,
}

impl PaymentDetails {
    pub fn verified(method: PaymentMethod, reference: Option<String>, at: DateTime<Utc>) -> Self {
        Self {
            method,
            reference,
            proof_url: None,
            verified: true,
            received_at: at,
        }
    }
}

/// Boundary to the payment provider. The engine only cares whether the
/// charge went through; provider-specific plumbing stays behind this trait.
#[async_trait]
pub trait PaymentAdapter: Send + Sync {
    async fn charge(
        &self,
        order_id: Uuid,
        amount_cents: i64,
        currency: &str,
    ) -> Result<PaymentStatus, Box<dyn std::error::Error + Send + Sync>>;
}
