use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use studia_catalog::{ItemKind, PricedLine};
use studia_core::PaymentDetails;
use studia_enrollment::{AccessTier, CourseGrant};
use uuid::Uuid;

/// Order status in the payment lifecycle. Completed, Failed and Refunded
/// are terminal; Refunded is reachable only from Completed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Refunded,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Failed | OrderStatus::Refunded
        )
    }
}

/// A frozen snapshot of a purchasable reference. Prices are captured at
/// order creation and never re-read from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub kind: ItemKind,
    pub reference_id: Uuid,
    pub title: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
}

impl OrderItem {
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * i64::from(self.quantity)
    }
}

impl From<PricedLine> for OrderItem {
    fn from(line: PricedLine) -> Self {
        Self {
            kind: line.kind,
            reference_id: line.reference_id,
            title: line.title,
            unit_price_cents: line.unit_price_cents,
            quantity: line.quantity,
        }
    }
}

/// The single source of truth for a customer's purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    /// Human-readable unique order number, e.g. STU-20260829-4F2A1C9B.
    pub order_number: String,
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub currency: String,
    pub coupon_code: Option<String>,
    pub access_tier: AccessTier,
    pub status: OrderStatus,
    pub payment: Option<PaymentDetails>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        user_id: Uuid,
        items: Vec<OrderItem>,
        tax_rate: f64,
        currency: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let subtotal_cents: i64 = items.iter().map(OrderItem::line_total_cents).sum();
        let tax_cents = (subtotal_cents as f64 * tax_rate).round() as i64;
        Self {
            id: Uuid::new_v4(),
            order_number: Self::generate_order_number(now),
            user_id,
            items,
            subtotal_cents,
            tax_cents,
            discount_cents: 0,
            total_cents: subtotal_cents + tax_cents,
            currency: currency.to_string(),
            coupon_code: None,
            access_tier: AccessTier::Standard,
            status: OrderStatus::Pending,
            payment: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Format: STU-{date}-{short uuid}.
    fn generate_order_number(now: DateTime<Utc>) -> String {
        let short = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
        format!("STU-{}-{}", now.format("%Y%m%d"), short)
    }

    /// Record the discount a validated coupon produced. The amount, not the
    /// code alone, is stored so the total stays reproducible even if the
    /// coupon later changes. Clamped so `discount <= subtotal` holds.
    pub fn apply_discount(&mut self, code: String, discount_cents: i64) {
        self.coupon_code = Some(code);
        self.discount_cents = discount_cents.clamp(0, self.subtotal_cents);
        self.recompute_total();
    }

    /// Drop the discount and re-derive the total. Used when redemption is
    /// rejected at completion time and the order proceeds at full price.
    pub fn clear_discount(&mut self) {
        self.coupon_code = None;
        self.discount_cents = 0;
        self.recompute_total();
    }

    fn recompute_total(&mut self) {
        self.total_cents = self.subtotal_cents + self.tax_cents - self.discount_cents;
        self.updated_at = Utc::now();
    }

    /// Course accesses this order grants once paid.
    pub fn course_grants(&self) -> Vec<CourseGrant> {
        self.items
            .iter()
            .filter(|item| item.kind == ItemKind::Course)
            .map(|item| CourseGrant {
                course_id: item.reference_id,
                access_tier: self.access_tier,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course_item(price_cents: i64, quantity: u32) -> OrderItem {
        OrderItem {
            kind: ItemKind::Course,
            reference_id: Uuid::new_v4(),
            title: "Course".to_string(),
            unit_price_cents: price_cents,
            quantity,
        }
    }

    #[test]
    fn totals_are_derived_from_items_and_tax() {
        let order = Order::new(
            Uuid::new_v4(),
            vec![course_item(100_000, 1), course_item(25_000, 2)],
            0.10,
            "INR",
            Utc::now(),
        );
        assert_eq!(order.subtotal_cents, 150_000);
        assert_eq!(order.tax_cents, 15_000);
        assert_eq!(order.total_cents, 165_000);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn total_is_reproducible_from_stored_fields() {
        let mut order = Order::new(
            Uuid::new_v4(),
            vec![course_item(100_000, 1)],
            0.10,
            "INR",
            Utc::now(),
        );
        order.apply_discount("SAVE20".to_string(), 20_000);
        assert_eq!(
            order.total_cents,
            order.subtotal_cents + order.tax_cents - order.discount_cents
        );

        order.clear_discount();
        assert_eq!(order.discount_cents, 0);
        assert_eq!(
            order.total_cents,
            order.subtotal_cents + order.tax_cents
        );
    }

    #[test]
    fn discount_is_clamped_to_subtotal() {
        let mut order = Order::new(
            Uuid::new_v4(),
            vec![course_item(1_000, 1)],
            0.10,
            "INR",
            Utc::now(),
        );
        order.apply_discount("HUGE".to_string(), 5_000);
        assert_eq!(order.discount_cents, 1_000);
        assert!(order.total_cents >= 0);
    }

    #[test]
    fn course_grants_skip_non_course_items() {
        let mut items = vec![course_item(1_000, 1)];
        items.push(OrderItem {
            kind: ItemKind::Ebook,
            reference_id: Uuid::new_v4(),
            title: "Ebook".to_string(),
            unit_price_cents: 500,
            quantity: 1,
        });
        let order = Order::new(Uuid::new_v4(), items, 0.10, "INR", Utc::now());
        assert_eq!(order.course_grants().len(), 1);
    }

    #[test]
    fn order_number_is_date_stamped() {
        let order = Order::new(Uuid::new_v4(), vec![], 0.10, "INR", Utc::now());
        assert!(order.order_number.starts_with("STU-"));
        assert_eq!(order.order_number.len(), "STU-YYYYMMDD-".len() + 8);
    }
}
