//! SQL-backed order ledger.

use std::collections::BTreeMap;

use bazaar_db::{params, Db, Executor};
use serde::Deserialize;

use crate::checkout::{
    NewOrder, Order, OrderDetail, OrderLine, OrderSummary, OrderTotals, OrderWriter,
};
use crate::error::CommerceError;
use crate::ids::{OrderId, OrderItemId, ProductId};
use crate::money::{Currency, Money};
use crate::store::catalog::decrement_stock;

const ORDER_COLUMNS: &str = "id, reference, first_name, last_name, phone_number, email, \
                             address, city, region, country, status, payment_type, placed_at";

/// Order and order item access.
#[derive(Debug, Clone)]
pub struct OrderLedger {
    db: Db,
    currency: Currency,
}

#[derive(Debug, Deserialize)]
struct LineRow {
    item_id: OrderItemId,
    order_id: OrderId,
    product_id: ProductId,
    product_name: String,
    price: i64,
    quantity: i64,
}

impl OrderLedger {
    pub fn new(db: Db, currency: Currency) -> Self {
        Self { db, currency }
    }

    /// Every order with its totals, oldest first.
    pub fn list_orders(&self) -> Result<Vec<OrderSummary>, CommerceError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM \"order\" ORDER BY id");
        let orders: Vec<Order> = self.db.query_as(&sql, params![])?;

        let mut lines_by_order: BTreeMap<OrderId, Vec<(i64, i64)>> = BTreeMap::new();
        for row in self.line_rows(None)? {
            lines_by_order
                .entry(row.order_id)
                .or_default()
                .push((row.quantity, row.price));
        }

        orders
            .into_iter()
            .map(|order| {
                let lines = lines_by_order.remove(&order.id).unwrap_or_default();
                let totals = OrderTotals::compute(lines, self.currency)?;
                Ok(OrderSummary { order, totals })
            })
            .collect()
    }

    /// One order with its lines, or [`CommerceError::OrderNotFound`].
    pub fn get_order(&self, id: OrderId) -> Result<OrderDetail, CommerceError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM \"order\" WHERE id = ?");
        let order: Order = self
            .db
            .query_optional(&sql, params![id])?
            .ok_or(CommerceError::OrderNotFound(id))?;

        let rows = self.line_rows(Some(id))?;
        let totals = OrderTotals::compute(rows.iter().map(|r| (r.quantity, r.price)), self.currency)?;

        let lines = rows
            .into_iter()
            .map(|row| {
                let unit_price = Money::new(row.price, self.currency);
                let total = unit_price
                    .try_multiply(row.quantity)
                    .ok_or(CommerceError::Overflow)?;
                Ok(OrderLine {
                    item_id: row.item_id,
                    product_id: row.product_id,
                    product_name: row.product_name,
                    unit_price,
                    quantity: row.quantity,
                    total,
                })
            })
            .collect::<Result<Vec<_>, CommerceError>>()?;

        Ok(OrderDetail {
            order,
            lines,
            totals,
        })
    }

    pub fn count(&self) -> Result<i64, CommerceError> {
        Ok(self
            .db
            .query_scalar("SELECT COUNT(*) FROM \"order\"", params![])?)
    }

    fn line_rows(&self, order_id: Option<OrderId>) -> Result<Vec<LineRow>, CommerceError> {
        let base = "SELECT oi.id AS item_id, oi.order_id AS order_id, \
                    oi.product_id AS product_id, p.name AS product_name, \
                    p.price AS price, oi.quantity AS quantity \
                    FROM order_item oi JOIN product p ON p.id = oi.product_id";
        let rows = match order_id {
            Some(id) => self
                .db
                .query_as(&format!("{base} WHERE oi.order_id = ? ORDER BY oi.id"), params![id])?,
            None => self.db.query_as(&format!("{base} ORDER BY oi.id"), params![])?,
        };
        Ok(rows)
    }
}

impl OrderWriter for OrderLedger {
    /// Insert the order header, one item per line and the stock decrements
    /// in a single transaction.
    fn record_order(&self, order: &NewOrder) -> Result<OrderId, CommerceError> {
        self.db.transaction(|tx| {
            let customer = &order.customer;
            let order_id = OrderId::new(tx.insert(
                "INSERT INTO \"order\" (reference, first_name, last_name, phone_number, email, \
                 address, city, region, country, status, payment_type, placed_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    order.reference.as_str(),
                    customer.first_name.as_str(),
                    customer.last_name.as_str(),
                    customer.phone_number.as_str(),
                    customer.email.as_str(),
                    customer.address.as_str(),
                    customer.city.as_str(),
                    customer.region.as_str(),
                    customer.country.as_str(),
                    order.status.as_str(),
                    customer.payment_type.as_str(),
                    order.placed_at.to_rfc3339()
                ],
            )?);

            for item in &order.items {
                tx.insert(
                    "INSERT INTO order_item (order_id, product_id, quantity) VALUES (?, ?, ?)",
                    params![order_id, item.product_id, item.quantity],
                )?;
                decrement_stock(tx, item.product_id, item.quantity)?;
            }

            Ok::<_, CommerceError>(order_id)
        })
    }
}
