// src/domain/auctions.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bids::Bid;
use super::core::{AuctionId, Errors, User, UserId};
use crate::money::{Amount, AmountValue, Currency};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuctionStatus {
    Active,
    Ended,
    Sold,
}

/// One listed item with an open ascending-bid process and a fixed end time.
/// The listing fields come from the catalog when the item is published; the
/// price state (`current_bid`, `bid_count`, `winner`, `status`) is owned by
/// the engine and only ever mutated through the store's commit primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auction {
    #[serde(rename = "id")]
    pub auction_id: AuctionId,
    pub title: String,
    pub seller: User,
    #[serde(rename = "startingPrice")]
    pub starting_price: Amount,
    #[serde(rename = "minimumIncrement")]
    pub minimum_increment: Amount,
    /// 0 until the first bid commits.
    #[serde(rename = "currentBid")]
    pub current_bid: AmountValue,
    #[serde(rename = "bidCount")]
    pub bid_count: u32,
    #[serde(rename = "endTime")]
    pub end_time: DateTime<Utc>,
    pub status: AuctionStatus,
    pub winner: Option<UserId>,
    #[serde(rename = "currency")]
    pub auction_currency: Currency,
}

impl Auction {
    /// A freshly published listing: active, no bids, no winner.
    pub fn published(
        auction_id: AuctionId,
        title: String,
        seller: User,
        starting_price: Amount,
        minimum_increment: Amount,
        end_time: DateTime<Utc>,
    ) -> Self {
        let auction_currency = starting_price.currency();
        Auction {
            auction_id,
            title,
            seller,
            starting_price,
            minimum_increment,
            current_bid: 0,
            bid_count: 0,
            end_time,
            status: AuctionStatus::Active,
            winner: None,
            auction_currency,
        }
    }

    /// Smallest acceptable next bid: the starting price until someone has
    /// bid, then the standing bid plus the minimum increment.
    pub fn minimum_acceptable(&self) -> Amount {
        if self.current_bid > 0 {
            self.starting_price
                .with_value(self.current_bid)
                .raised_by(self.minimum_increment.value())
        } else {
            self.starting_price
        }
    }

    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        now >= self.end_time
    }

    pub fn is_open_for_bids(&self, now: DateTime<Utc>) -> bool {
        self.status == AuctionStatus::Active && !self.has_ended(now)
    }

    /// The standing bid as an `Amount` in the auction's currency.
    pub fn current_amount(&self) -> Amount {
        self.starting_price.with_value(self.current_bid)
    }
}

/// Bid preconditions that do not depend on time: the seller may not bid on
/// their own listing (support staff are exempt), the bid must be in the
/// auction's currency, and it must reach the minimum acceptable amount.
/// Assumes the auction has already been checked to be open.
pub fn validate_bid(bid: &Bid, auction: &Auction) -> Result<(), Errors> {
    if bid.bidder.user_id() == auction.seller.user_id() && !bid.bidder.is_support() {
        return Err(Errors::SellerCannotPlaceBids((
            bid.bidder.user_id().clone(),
            auction.auction_id,
        )));
    }

    if bid.bid_amount.currency() != auction.auction_currency {
        return Err(Errors::CurrencyMismatch(auction.auction_currency));
    }

    let minimum = auction.minimum_acceptable();
    if bid.bid_amount.value() < minimum.value() {
        return Err(Errors::BidTooLow { minimum });
    }

    Ok(())
}
