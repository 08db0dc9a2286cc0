// src/store/ledger.rs
use std::sync::RwLock;

use crate::domain::{AuctionId, Bid, UserId};

/// Append-only record of every accepted bid. Rows are only ever appended
/// (inside the auction's commit section) and queried; nothing mutates them.
pub struct BidLedger {
    bids: RwLock<Vec<Bid>>,
}

impl Default for BidLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl BidLedger {
    pub fn new() -> Self {
        BidLedger {
            bids: RwLock::new(Vec::new()),
        }
    }

    pub fn append(&self, bid: Bid) {
        self.bids.write().unwrap().push(bid);
    }

    /// Bid history for one auction, highest amount first.
    pub fn history(&self, auction_id: AuctionId) -> Vec<Bid> {
        let bids = self.bids.read().unwrap();
        let mut history: Vec<Bid> = bids
            .iter()
            .filter(|b| b.for_auction == auction_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.bid_amount.value().cmp(&a.bid_amount.value()));
        history
    }

    /// The strongest bid on this auction by anyone other than `bidder`: the
    /// user who is being outbid right now.
    pub fn top_rival(&self, auction_id: AuctionId, bidder: &UserId) -> Option<Bid> {
        let bids = self.bids.read().unwrap();
        bids.iter()
            .filter(|b| b.for_auction == auction_id && b.bidder.user_id() != bidder)
            .max_by_key(|b| b.bid_amount.value())
            .cloned()
    }

    pub fn all(&self) -> Vec<Bid> {
        self.bids.read().unwrap().clone()
    }

    pub fn restore(&self, bids: Vec<Bid>) {
        *self.bids.write().unwrap() = bids;
    }
}
