// src/services.rs
use std::sync::Arc;

use crate::email::{EmailSender, LogMailer};
use crate::fanout::Fanout;
use crate::payment::{DemoGateway, PaymentProcessor};
use crate::persistence::json_file::StoreSnapshot;
use crate::store::{AuctionStore, BidLedger, OrderStore};

pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Everything the engine's operations run against: the four stores, the
/// fanout, and the two external collaborators behind their trait seams.
pub struct Services {
    pub auctions: AuctionStore,
    pub ledger: BidLedger,
    pub fanout: Fanout,
    pub orders: OrderStore,
    pub payment: Box<dyn PaymentProcessor>,
    pub mailer: Box<dyn EmailSender>,
}

impl Services {
    pub fn new(
        payment: Box<dyn PaymentProcessor>,
        mailer: Box<dyn EmailSender>,
        channel_capacity: usize,
    ) -> Arc<Self> {
        Arc::new(Services {
            auctions: AuctionStore::new(),
            ledger: BidLedger::new(),
            fanout: Fanout::new(channel_capacity),
            orders: OrderStore::new(),
            payment,
            mailer,
        })
    }

    pub fn with_defaults() -> Arc<Self> {
        Self::new(
            Box::new(DemoGateway),
            Box::new(LogMailer),
            DEFAULT_CHANNEL_CAPACITY,
        )
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            auctions: self.auctions.all(),
            bids: self.ledger.all(),
            notifications: self.fanout.notifications().all(),
            orders: self.orders.all(),
        }
    }

    pub fn restore(&self, snapshot: StoreSnapshot) {
        self.auctions.restore(snapshot.auctions);
        self.ledger.restore(snapshot.bids);
        self.fanout.notifications().restore(snapshot.notifications);
        self.orders.restore(snapshot.orders);
    }
}
