use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::OrderId;

/// Fallback title for order items stored without one.
pub const UNNAMED_ITEM_LABEL: &str = "Producto sin nombre";

/// Coarse classification of the payment processor's free-text status.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatusClass {
    /// Counts toward revenue: `approved` or `accredited`.
    Successful,
    /// `rejected` or `cancelled`.
    Failed,
    /// Anything else (pending, in process, unknown).
    Pending,
}

impl OrderStatusClass {
    /// Classifies a raw status string, case-insensitively.
    pub fn classify(status: &str) -> Self {
        match status.trim().to_lowercase().as_str() {
            "approved" | "accredited" => Self::Successful,
            "rejected" | "cancelled" => Self::Failed,
            _ => Self::Pending,
        }
    }
}

/// One line of an order, extracted from the stored payment payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub title: String,
    pub quantity: i32,
    pub unit_price: f64,
}

/// A sales order recorded by the external payment webhook.
///
/// Orders are read-only from this application's perspective.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: OrderId,
    /// Payment reference at the payment processor.
    pub payment_id: String,
    /// Raw status as reported by the processor; see [`Order::status_class`].
    pub status: String,
    pub amount: f64,
    pub currency: String,
    pub payer_email: String,
    pub items: Vec<OrderItem>,
    pub date_approved: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl Order {
    pub fn status_class(&self) -> OrderStatusClass {
        OrderStatusClass::classify(&self.status)
    }

    pub fn is_successful(&self) -> bool {
        self.status_class() == OrderStatusClass::Successful
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_statuses_case_insensitively() {
        assert_eq!(
            OrderStatusClass::classify("Approved"),
            OrderStatusClass::Successful
        );
        assert_eq!(
            OrderStatusClass::classify("ACCREDITED"),
            OrderStatusClass::Successful
        );
        assert_eq!(
            OrderStatusClass::classify("rejected"),
            OrderStatusClass::Failed
        );
        assert_eq!(
            OrderStatusClass::classify("Cancelled"),
            OrderStatusClass::Failed
        );
        assert_eq!(
            OrderStatusClass::classify("in_process"),
            OrderStatusClass::Pending
        );
    }
}
