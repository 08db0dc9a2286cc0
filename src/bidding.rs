// src/bidding.rs
use chrono::{DateTime, Utc};
use log::warn;

use crate::domain::{
    validate_bid, Auction, AuctionId, AuctionStatus, Bid, Errors, NotificationKind, User,
};
use crate::fanout::{Channel, RealtimeEvent};
use crate::money::Amount;
use crate::services::Services;

/// A lost compare-and-set is re-run once against fresh state before the
/// caller ever sees a conflict.
const COMMIT_ATTEMPTS: u32 = 2;

/// Admit one bid: validate against the auction's current persisted state and
/// commit atomically, or reject. On success exactly one ledger row is
/// appended, the auction's price state advances, the previous highest rival
/// gets an outbid notification and the auction channel sees one `bid_update`.
pub fn place_bid(
    services: &Services,
    bidder: &User,
    auction_id: AuctionId,
    amount: Amount,
    now: DateTime<Utc>,
) -> Result<Bid, Errors> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let (auction, version) = services.auctions.snapshot(auction_id)?;

        if auction.status != AuctionStatus::Active {
            return Err(Errors::AuctionClosed(auction_id));
        }
        if auction.has_ended(now) {
            // the sweeper has not been here yet: close on read, then reject
            close_expired(services, &auction, version);
            return Err(Errors::AuctionClosed(auction_id));
        }

        let bid = Bid::place(auction_id, bidder.clone(), amount, now);
        validate_bid(&bid, &auction)?;

        let mut next = auction.clone();
        next.current_bid = amount.value();
        next.winner = Some(bidder.user_id().clone());
        next.bid_count += 1;

        let ledger_bid = bid.clone();
        let result = services
            .auctions
            .update(auction_id, version, next, |committed| {
                // the rival must be looked up before our own bid lands
                let rival = services.ledger.top_rival(auction_id, bidder.user_id());
                services.ledger.append(ledger_bid);
                if let Some(rival) = rival {
                    let message = format!(
                        "You have been outbid on \"{}\". New highest bid: {}",
                        committed.title,
                        committed.current_amount()
                    );
                    services.fanout.notify(
                        rival.bidder.user_id(),
                        NotificationKind::Outbid,
                        message,
                        Some(auction_id),
                        now,
                    );
                }
                services.fanout.broadcast(
                    &Channel::Auction(auction_id),
                    RealtimeEvent::BidUpdate {
                        auction_id,
                        current_bid: committed.current_bid,
                        bid_count: committed.bid_count,
                        bidder: bidder.display_name().to_string(),
                    },
                );
            });

        match result {
            Ok(_) => return Ok(bid),
            Err(Errors::ConcurrencyConflict(_)) if attempt < COMMIT_ATTEMPTS => {
                warn!(
                    "bid on auction {} lost the commit race, re-evaluating against fresh state",
                    auction_id
                );
                continue;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Lazy close for an auction observed past its end time while still marked
/// active. Losing this race just means someone else already closed it; the
/// end-of-auction fanout stays with the sweeper either way.
fn close_expired(services: &Services, auction: &Auction, version: u64) {
    let mut next = auction.clone();
    next.status = AuctionStatus::Ended;
    if let Err(Errors::ConcurrencyConflict(_)) =
        services
            .auctions
            .update(auction.auction_id, version, next, |_| {})
    {
        warn!(
            "auction {} was closed concurrently while rejecting a late bid",
            auction.auction_id
        );
    }
}
