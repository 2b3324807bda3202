use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::order::{Order as DomainOrder, OrderItem, UNNAMED_ITEM_LABEL};
use crate::domain::types::TypeConstraintError;

/// Diesel model representing the `orders` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::orders)]
pub struct Order {
    pub id: i32,
    pub payment_id: String,
    pub status: String,
    pub amount: f64,
    pub currency: String,
    pub payer_email: String,
    pub payment_data: Option<String>,
    pub date_approved: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

/// Extracts order items from the raw payment payload.
///
/// The payload is whatever the payment processor posted; a malformed or
/// missing `additional_info.items` section yields an empty item list rather
/// than failing the order.
fn parse_items(payment_data: Option<&str>) -> Vec<OrderItem> {
    let Some(raw) = payment_data else {
        return Vec::new();
    };
    let Ok(payload) = serde_json::from_str::<serde_json::Value>(raw) else {
        return Vec::new();
    };

    payload["additional_info"]["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|item| OrderItem {
                    title: item["title"]
                        .as_str()
                        .filter(|title| !title.is_empty())
                        .unwrap_or(UNNAMED_ITEM_LABEL)
                        .to_string(),
                    quantity: item["quantity"]
                        .as_i64()
                        .or_else(|| item["quantity"].as_str().and_then(|q| q.parse().ok()))
                        .unwrap_or(0) as i32,
                    unit_price: item["unit_price"]
                        .as_f64()
                        .or_else(|| item["unit_price"].as_str().and_then(|p| p.parse().ok()))
                        .unwrap_or(0.0),
                })
                .collect()
        })
        .unwrap_or_default()
}

impl TryFrom<Order> for DomainOrder {
    type Error = TypeConstraintError;

    fn try_from(order: Order) -> Result<Self, Self::Error> {
        let items = parse_items(order.payment_data.as_deref());

        Ok(Self {
            id: order.id.try_into()?,
            payment_id: order.payment_id,
            status: order.status,
            amount: order.amount,
            currency: order.currency,
            payer_email: order.payer_email,
            items,
            date_approved: order.date_approved,
            created_at: order.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_items_from_payment_payload() {
        let payload = r#"{
            "additional_info": {
                "items": [
                    {"title": "Funda", "quantity": 2, "unit_price": 1500.0},
                    {"quantity": "1", "unit_price": "2000"}
                ]
            }
        }"#;

        let items = parse_items(Some(payload));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Funda");
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[1].title, UNNAMED_ITEM_LABEL);
        assert_eq!(items[1].quantity, 1);
        assert_eq!(items[1].unit_price, 2000.0);
    }

    #[test]
    fn malformed_payload_yields_no_items() {
        assert!(parse_items(Some("{broken")).is_empty());
        assert!(parse_items(None).is_empty());
    }
}
