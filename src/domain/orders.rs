// src/domain/orders.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::core::{AuctionId, UserId};
use crate::money::Amount;

pub type OrderId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

/// Shipping destination captured at confirmation time, so later profile
/// edits never change where a paid order ships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    #[serde(rename = "zipCode")]
    pub zip_code: String,
    pub country: String,
}

/// A won auction turned into a purchase. Created exactly once per auction
/// (at most one non-cancelled order may exist for an auction).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "id")]
    pub order_id: OrderId,
    pub buyer: UserId,
    pub seller: UserId,
    #[serde(rename = "auctionId")]
    pub auction: AuctionId,
    pub amount: Amount,
    pub status: OrderStatus,
    #[serde(rename = "shippingAddress")]
    pub shipping_address: ShippingAddress,
    #[serde(rename = "transactionRef")]
    pub transaction_ref: String,
    #[serde(rename = "paidAt")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(rename = "deliveredAt")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// A freshly confirmed purchase: payment has cleared, nothing shipped.
    pub fn paid(
        buyer: UserId,
        seller: UserId,
        auction: AuctionId,
        amount: Amount,
        transaction_ref: String,
        shipping_address: ShippingAddress,
        now: DateTime<Utc>,
    ) -> Self {
        Order {
            order_id: Uuid::new_v4(),
            buyer,
            seller,
            auction,
            amount,
            status: OrderStatus::Paid,
            shipping_address,
            transaction_ref,
            paid_at: Some(now),
            delivered_at: None,
            created_at: now,
        }
    }
}
