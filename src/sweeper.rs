// src/sweeper.rs
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::domain::{Auction, AuctionStatus, Errors, NotificationKind};
use crate::fanout::{Channel, RealtimeEvent};
use crate::services::Services;

/// Recurring task that closes auctions whose end time has passed. Runs on
/// its own timer but mutates the store through the same compare-and-set
/// primitive as bid admission, so a sweep and an in-flight bid on the same
/// auction can never both win.
pub struct Sweeper {
    services: Arc<Services>,
    interval: Duration,
}

impl Sweeper {
    pub fn new(services: Arc<Services>, interval: Duration) -> Self {
        Sweeper { services, interval }
    }

    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                ticker.tick().await;
                sweep_once(&self.services, Utc::now());
            }
        })
    }
}

/// One sweep cycle; returns how many auctions were newly closed.
///
/// Two passes. First every due auction is flipped active -> ended; the flip
/// commits before any side effect and is never re-run. Then every closed
/// auction whose end-of-auction fanout is still owed gets its notifications,
/// broadcast and winner email, and is marked dispatched. A failure in either
/// pass is confined to its auction and the work is picked up again on the
/// next cycle.
pub fn sweep_once(services: &Services, now: DateTime<Utc>) -> usize {
    let mut closed = 0;
    for (auction, version) in services.auctions.due_for_close(now) {
        let mut next = auction.clone();
        next.status = AuctionStatus::Ended;
        match services.auctions.update(auction.auction_id, version, next, |_| {}) {
            Ok(_) => closed += 1,
            Err(Errors::ConcurrencyConflict(id)) => {
                info!("auction {} changed mid-sweep, re-checking next cycle", id);
            }
            Err(e) => warn!("could not close auction {}: {}", auction.auction_id, e),
        }
    }

    for auction in services.auctions.undispatched_closures() {
        dispatch_closure(services, &auction, now);
    }

    closed
}

fn dispatch_closure(services: &Services, auction: &Auction, now: DateTime<Utc>) {
    let auction_id = auction.auction_id;
    let seller = auction.seller.user_id();

    match &auction.winner {
        Some(winner) => {
            let final_amount = auction.current_amount();
            services.fanout.notify(
                winner,
                NotificationKind::AuctionWon,
                format!(
                    "Congratulations! You won the auction for \"{}\" with a bid of {}",
                    auction.title, final_amount
                ),
                Some(auction_id),
                now,
            );
            services.fanout.notify(
                seller,
                NotificationKind::AuctionEnded,
                format!(
                    "Your auction for \"{}\" has ended. Winner: {}",
                    auction.title, winner
                ),
                Some(auction_id),
                now,
            );
            services.fanout.broadcast(
                &Channel::Auction(auction_id),
                RealtimeEvent::AuctionEnded {
                    auction_id,
                    winner: Some(winner.clone()),
                },
            );
            services.auctions.mark_closure_dispatched(auction_id);

            // best-effort; the closure stands even if the relay is down
            if let Err(e) = services.mailer.send(
                winner,
                "You won the auction!",
                &format!(
                    "Congratulations! You won the auction for \"{}\". The final bid was {}.",
                    auction.title, final_amount
                ),
            ) {
                warn!("winner email for auction {} failed: {}", auction_id, e);
            }
        }
        None => {
            services.fanout.notify(
                seller,
                NotificationKind::AuctionEnded,
                format!("Your auction for \"{}\" has ended with no bids.", auction.title),
                Some(auction_id),
                now,
            );
            services.auctions.mark_closure_dispatched(auction_id);
        }
    }
}
