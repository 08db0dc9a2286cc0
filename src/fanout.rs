// src/fanout.rs
use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::{AuctionId, Errors, Notification, NotificationKind, UserId};
use crate::money::AmountValue;
use crate::store::NotificationStore;

/// A real-time channel a client may join: everyone watching one auction, or
/// one user's personal feed. The fanout knows nothing beyond membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    Auction(AuctionId),
    User(UserId),
}

/// Events pushed over the live channels. Best-effort: subscribers that are
/// not connected or that lag simply miss events; the durable notification
/// row is the system of record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum RealtimeEvent {
    #[serde(rename = "bid_update")]
    BidUpdate {
        #[serde(rename = "auctionId")]
        auction_id: AuctionId,
        #[serde(rename = "currentBid")]
        current_bid: AmountValue,
        #[serde(rename = "bidCount")]
        bid_count: u32,
        bidder: String,
    },
    #[serde(rename = "auction_ended")]
    AuctionEnded {
        #[serde(rename = "auctionId")]
        auction_id: AuctionId,
        winner: Option<UserId>,
    },
    #[serde(rename = "notification")]
    Notification { notification: Notification },
    #[serde(rename = "cart_update")]
    CartUpdate,
    #[serde(rename = "sales_update")]
    SalesUpdate,
}

/// Two delivery paths per event: a durable row in the notification store
/// (always written) and a push onto the recipient's broadcast channel
/// (best-effort, no retry). Channels are created lazily on first use; one
/// sender per channel, one receiver per subscriber.
pub struct Fanout {
    notifications: NotificationStore,
    channels: RwLock<HashMap<Channel, broadcast::Sender<RealtimeEvent>>>,
    capacity: usize,
}

impl Fanout {
    pub fn new(capacity: usize) -> Self {
        Fanout {
            notifications: NotificationStore::new(),
            channels: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    pub fn notifications(&self) -> &NotificationStore {
        &self.notifications
    }

    /// Join a channel. Every subscriber gets its own receiver side of the
    /// channel's broadcast pair.
    pub fn subscribe(&self, channel: Channel) -> broadcast::Receiver<RealtimeEvent> {
        let mut channels = self.channels.write().unwrap();
        channels
            .entry(channel)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Push to a channel's current members. A channel nobody ever joined, or
    /// whose members have all disconnected, swallows the event.
    pub fn broadcast(&self, channel: &Channel, event: RealtimeEvent) {
        let channels = self.channels.read().unwrap();
        if let Some(sender) = channels.get(channel) {
            let _ = sender.send(event);
        }
    }

    /// Persist a notification for `recipient` and push it onto their
    /// personal channel. The row is written unconditionally; the push may be
    /// lost.
    pub fn notify(
        &self,
        recipient: &UserId,
        kind: NotificationKind,
        message: String,
        auction: Option<AuctionId>,
        now: DateTime<Utc>,
    ) -> Notification {
        let notification = Notification::new(recipient.clone(), kind, message, auction, now);
        self.notifications.push(notification.clone());
        self.broadcast(
            &Channel::User(recipient.clone()),
            RealtimeEvent::Notification {
                notification: notification.clone(),
            },
        );
        notification
    }

    pub fn mark_read(&self, notification_id: Uuid, user_id: &UserId) -> Result<Notification, Errors> {
        self.notifications.mark_read(notification_id, user_id)
    }
}
