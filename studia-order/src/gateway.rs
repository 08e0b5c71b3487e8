use async_trait::async_trait;
use rand::Rng;
use studia_core::{PaymentAdapter, PaymentStatus};
use uuid::Uuid;

/// Stand-in payment gateway with a configurable success probability.
/// Real provider plumbing lives outside this subsystem; the engine only
/// consumes the success/failure outcome.
pub struct SimulatedGateway {
    success_rate: f64,
}

impl SimulatedGateway {
    pub fn new(success_rate: f64) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
        }
    }
}

#[async_trait]
impl PaymentAdapter for SimulatedGateway {
    async fn charge(
        &self,
        order_id: Uuid,
        amount_cents: i64,
        currency: &str,
    ) -> Result<PaymentStatus, Box<dyn std::error::Error + Send + Sync>> {
        let approved = rand::thread_rng().gen_bool(self.success_rate);
        let status = if approved {
            PaymentStatus::Succeeded
        } else {
            PaymentStatus::Failed
        };
        tracing::info!(%order_id, amount_cents, currency, ?status, "simulated gateway charge");
        Ok(status)
    }
}
