use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::Serialize;

use crate::auth::AuthenticatedUser;
use crate::domain::order::Order;
use crate::domain::product::Product;
use crate::repository::{OrderListQuery, OrderReader, ProductReader};

use super::{ServiceError, ServiceResult};

/// Length of the trailing sales window shown on the dashboard.
pub const SALES_WINDOW_DAYS: i64 = 30;

/// Number of orders shown in the recent-sales widget.
pub const RECENT_SALES_LIMIT: i64 = 5;

/// Revenue of one calendar day, for the sales chart.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailySales {
    pub date: NaiveDate,
    pub sales: f64,
}

/// Aggregate figures derived from the successful orders in the window.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SalesMetrics {
    pub total_revenue: f64,
    pub total_sales_count: usize,
    pub new_sales_today: usize,
    /// Revenue per day, ascending by date. Days without sales are omitted
    /// rather than zero-filled.
    pub chart_data: Vec<DailySales>,
}

/// Everything the dashboard page needs.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardData {
    pub metrics: SalesMetrics,
    pub low_stock_products: Vec<Product>,
    pub recent_sales: Vec<Order>,
}

/// Derives the dashboard figures from the orders of the trailing window.
///
/// Orders that do not classify as successful are ignored, so the function is
/// safe to call on unfiltered input. "Today" is an explicit calendar date
/// supplied by the caller and compared against the date part of
/// `date_approved`.
pub fn build_sales_metrics(orders: &[Order], today: NaiveDate) -> SalesMetrics {
    let successful: Vec<&Order> = orders.iter().filter(|order| order.is_successful()).collect();

    let total_revenue = successful.iter().map(|order| order.amount).sum();

    let new_sales_today = successful
        .iter()
        .filter(|order| {
            order
                .date_approved
                .is_some_and(|approved| approved.date() == today)
        })
        .count();

    let mut sales_by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for order in &successful {
        if let Some(approved) = order.date_approved {
            *sales_by_day.entry(approved.date()).or_insert(0.0) += order.amount;
        }
    }

    SalesMetrics {
        total_revenue,
        total_sales_count: successful.len(),
        new_sales_today,
        chart_data: sales_by_day
            .into_iter()
            .map(|(date, sales)| DailySales { date, sales })
            .collect(),
    }
}

/// Core business logic for rendering the dashboard page.
pub fn show_dashboard<R>(
    today: NaiveDate,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<DashboardData>
where
    R: OrderReader + ProductReader,
{
    if !user.has_access() {
        return Err(ServiceError::Unauthorized);
    }

    let window_start =
        (today - Duration::days(SALES_WINDOW_DAYS)).and_time(NaiveTime::MIN);

    let window_orders = match repo.list_orders(
        OrderListQuery::default()
            .successful()
            .approved_since(window_start),
    ) {
        Ok(orders) => orders,
        Err(e) => {
            log::error!("Failed to list window orders: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let metrics = build_sales_metrics(&window_orders, today);

    let low_stock_products = match repo.list_low_stock_products() {
        Ok(products) => products,
        Err(e) => {
            log::error!("Failed to list low stock products: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let recent_sales =
        match repo.list_orders(OrderListQuery::default().limit(RECENT_SALES_LIMIT)) {
            Ok(orders) => orders,
            Err(e) => {
                log::error!("Failed to list recent orders: {e}");
                return Err(ServiceError::Internal);
            }
        };

    Ok(DashboardData {
        metrics,
        low_stock_products,
        recent_sales,
    })
}
