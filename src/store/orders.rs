// src/store/orders.rs
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::domain::{AuctionId, Errors, Order, OrderId, OrderStatus, User, UserId};

/// Order rows. Creation is funneled through [`OrderStore::insert_or_existing`]
/// so that an auction can never end up with two live orders, no matter how
/// many confirmation calls race.
pub struct OrderStore {
    rows: RwLock<Vec<Order>>,
}

impl Default for OrderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderStore {
    pub fn new() -> Self {
        OrderStore {
            rows: RwLock::new(Vec::new()),
        }
    }

    /// Insert the order unless the auction already has a non-cancelled one;
    /// in that case hand back the existing row so the caller can answer
    /// idempotently.
    pub fn insert_or_existing(&self, order: Order) -> Result<Order, Order> {
        let mut rows = self.rows.write().unwrap();
        if let Some(existing) = rows
            .iter()
            .find(|o| o.auction == order.auction && o.status != OrderStatus::Cancelled)
        {
            return Err(existing.clone());
        }
        rows.push(order.clone());
        Ok(order)
    }

    /// The auction's live (non-cancelled) order, if any.
    pub fn active_for_auction(&self, auction_id: AuctionId) -> Option<Order> {
        let rows = self.rows.read().unwrap();
        rows.iter()
            .find(|o| o.auction == auction_id && o.status != OrderStatus::Cancelled)
            .cloned()
    }

    pub fn for_buyer(&self, user_id: &UserId) -> Vec<Order> {
        self.filtered(|o| &o.buyer == user_id)
    }

    pub fn for_seller(&self, user_id: &UserId) -> Vec<Order> {
        self.filtered(|o| &o.seller == user_id)
    }

    fn filtered(&self, keep: impl Fn(&Order) -> bool) -> Vec<Order> {
        let rows = self.rows.read().unwrap();
        let mut result: Vec<Order> = rows.iter().filter(|o| keep(o)).cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result
    }

    /// Guarded status mutation: only the order's seller (or support staff)
    /// may move an order along, stamping `paid_at`/`delivered_at` the first
    /// time those states are reached.
    pub fn update_status(
        &self,
        order_id: OrderId,
        actor: &User,
        status: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<Order, Errors> {
        let mut rows = self.rows.write().unwrap();
        let row = rows
            .iter_mut()
            .find(|o| o.order_id == order_id)
            .ok_or(Errors::UnknownOrder(order_id))?;

        if &row.seller != actor.user_id() && !actor.is_support() {
            return Err(Errors::NotYourOrder(actor.user_id().clone()));
        }

        row.status = status;
        if status == OrderStatus::Paid && row.paid_at.is_none() {
            row.paid_at = Some(now);
        }
        if status == OrderStatus::Delivered && row.delivered_at.is_none() {
            row.delivered_at = Some(now);
        }
        Ok(row.clone())
    }

    pub fn all(&self) -> Vec<Order> {
        self.rows.read().unwrap().clone()
    }

    pub fn restore(&self, rows: Vec<Order>) {
        *self.rows.write().unwrap() = rows;
    }
}
