// src/domain/notifications.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::core::{AuctionId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Outbid,
    AuctionEnded,
    AuctionWon,
    ItemSold,
    PaymentSuccess,
}

/// Durable per-user notification row. This is the system of record for
/// deliveries; the real-time push is best-effort on top of it. Only the
/// recipient marking it read ever mutates a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "id")]
    pub notification_id: Uuid,
    #[serde(rename = "user")]
    pub recipient: UserId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    #[serde(rename = "auctionId")]
    pub auction: Option<AuctionId>,
    #[serde(rename = "isRead")]
    pub is_read: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        recipient: UserId,
        kind: NotificationKind,
        message: String,
        auction: Option<AuctionId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Notification {
            notification_id: Uuid::new_v4(),
            recipient,
            kind,
            message,
            auction,
            is_read: false,
            created_at,
        }
    }
}
