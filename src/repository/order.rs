use diesel::define_sql_function;
use diesel::prelude::*;
use diesel::sql_types::Text;

use crate::domain::order::Order;
use crate::models::order::Order as DbOrder;
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, OrderListQuery, OrderReader};

define_sql_function! {
    /// SQLite `lower()`, used for case-insensitive status comparisons.
    fn lower(x: Text) -> Text;
}

/// Statuses reported by the payment processor that count as a completed sale.
const SUCCESSFUL_STATUSES: [&str; 2] = ["approved", "accredited"];

impl OrderReader for DieselRepository {
    fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<Vec<Order>> {
        use crate::schema::orders;

        let mut conn = self.conn()?;

        let mut items = orders::table
            .order(orders::created_at.desc())
            .into_boxed::<diesel::sqlite::Sqlite>();

        if query.successful_only {
            items = items.filter(lower(orders::status).eq_any(SUCCESSFUL_STATUSES));
        }

        if let Some(since) = query.approved_since {
            items = items.filter(orders::date_approved.ge(since));
        }

        if let Some(limit) = query.limit {
            items = items.limit(limit);
        }

        let items = items
            .load::<DbOrder>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Order>, _>>()?;

        Ok(items)
    }
}
