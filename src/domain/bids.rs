// src/domain/bids.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::core::{AuctionId, User};
use crate::money::Amount;

/// One accepted bid. Immutable once created; rejected submissions leave no
/// record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    #[serde(rename = "id")]
    pub bid_id: Uuid,
    #[serde(rename = "auctionId")]
    pub for_auction: AuctionId,
    pub bidder: User,
    pub at: DateTime<Utc>,
    #[serde(rename = "amount")]
    pub bid_amount: Amount,
}

impl Bid {
    pub fn place(for_auction: AuctionId, bidder: User, bid_amount: Amount, at: DateTime<Utc>) -> Self {
        Bid {
            bid_id: Uuid::new_v4(),
            for_auction,
            bidder,
            at,
            bid_amount,
        }
    }
}
