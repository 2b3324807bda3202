use crate::auth::AuthenticatedUser;
use crate::domain::order::Order;
use crate::repository::{OrderListQuery, OrderReader};

use super::{ServiceError, ServiceResult};

/// Applies the sales view filter: case-insensitive substring match on payer
/// email, payment reference and item titles. Input ordering is preserved.
pub fn filter_orders(orders: Vec<Order>, search: Option<&str>) -> Vec<Order> {
    let Some(needle) = search
        .map(str::trim)
        .filter(|needle| !needle.is_empty())
        .map(str::to_lowercase)
    else {
        return orders;
    };

    orders
        .into_iter()
        .filter(|order| {
            order.payer_email.to_lowercase().contains(&needle)
                || order.payment_id.to_lowercase().contains(&needle)
                || order
                    .items
                    .iter()
                    .any(|item| item.title.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Sum of amounts over the successful orders of a (possibly filtered) list.
pub fn approved_total(orders: &[Order]) -> f64 {
    orders
        .iter()
        .filter(|order| order.is_successful())
        .map(|order| order.amount)
        .sum()
}

/// Core business logic for rendering the sales page: all orders newest
/// first, narrowed by the search term, plus the approved total of the
/// filtered set.
pub fn show_sales<R>(
    search: Option<&str>,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<(Vec<Order>, f64)>
where
    R: OrderReader,
{
    if !user.has_access() {
        return Err(ServiceError::Unauthorized);
    }

    let orders = match repo.list_orders(OrderListQuery::default()) {
        Ok(orders) => orders,
        Err(e) => {
            log::error!("Failed to list orders: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let filtered = filter_orders(orders, search);
    let total = approved_total(&filtered);

    Ok((filtered, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderItem;
    use crate::domain::types::OrderId;

    fn order(id: i32, status: &str, email: &str, item: &str) -> Order {
        let epoch = chrono::DateTime::from_timestamp(0, 0).unwrap().naive_utc();
        Order {
            id: OrderId::new(id).unwrap(),
            payment_id: format!("MP-{id}"),
            status: status.to_string(),
            amount: 1000.0,
            currency: "ARS".to_string(),
            payer_email: email.to_string(),
            items: vec![OrderItem {
                title: item.to_string(),
                quantity: 1,
                unit_price: 1000.0,
            }],
            date_approved: Some(epoch),
            created_at: epoch,
        }
    }

    #[test]
    fn search_matches_email_payment_id_and_item_titles() {
        let orders = vec![
            order(1, "approved", "ana@example.com", "Funda"),
            order(2, "approved", "juan@example.com", "Cargador"),
        ];

        assert_eq!(filter_orders(orders.clone(), Some("ANA")).len(), 1);
        assert_eq!(filter_orders(orders.clone(), Some("mp-2")).len(), 1);
        assert_eq!(filter_orders(orders.clone(), Some("cargador")).len(), 1);
        assert_eq!(filter_orders(orders, Some("inexistente")).len(), 0);
    }

    #[test]
    fn approved_total_ignores_unsuccessful_orders() {
        let orders = vec![
            order(1, "approved", "a@example.com", "Funda"),
            order(2, "accredited", "b@example.com", "Funda"),
            order(3, "rejected", "c@example.com", "Funda"),
            order(4, "pending", "d@example.com", "Funda"),
        ];

        assert_eq!(approved_total(&orders), 2000.0);
    }
}
