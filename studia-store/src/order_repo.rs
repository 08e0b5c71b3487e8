use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use studia_core::PaymentDetails;
use studia_order::{Order, OrderRepository, OrderStatus, TransitionOutcome};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory order store. The conditional status update is the
/// linearization point for the payment lifecycle: guard check and flip
/// happen under one write lock.
pub struct MemOrderRepository {
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl MemOrderRepository {
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemOrderRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderRepository for MemOrderRepository {
    async fn insert(
        &self,
        order: &Order,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.orders.write().await.insert(order.id, order.clone());
        Ok(())
    }

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: &[OrderStatus],
        to: OrderStatus,
        payment: Option<PaymentDetails>,
    ) -> Result<Option<TransitionOutcome>, Box<dyn std::error::Error + Send + Sync>> {
        let mut orders = self.orders.write().await;
        let order = match orders.get_mut(&id) {
            Some(order) => order,
            None => return Ok(None),
        };

        if !from.contains(&order.status) {
            return Ok(Some(TransitionOutcome::Noop {
                current: order.status,
            }));
        }

        let prior = order.status;
        order.status = to;
        if let Some(payment) = payment {
            order.payment = Some(payment);
        }
        order.updated_at = Utc::now();
        Ok(Some(TransitionOutcome::Applied { from: prior }))
    }

    async fn update_pricing(
        &self,
        id: Uuid,
        discount_cents: i64,
        total_cents: i64,
        coupon_code: Option<String>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut orders = self.orders.write().await;
        if let Some(order) = orders.get_mut(&id) {
            order.discount_cents = discount_cents;
            order.total_cents = total_cents;
            order.coupon_code = coupon_code;
            order.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let orders = self.orders.read().await;
        let mut result: Vec<Order> = orders
            .values()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }
}
