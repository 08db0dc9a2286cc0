// src/store/auctions.rs
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};

use crate::domain::{Auction, AuctionId, AuctionStatus, Errors};

/// A stored auction plus its optimistic-concurrency version and the sweeper's
/// closure-dispatch marker. The version increases monotonically with every
/// committed mutation; `closed_dispatched` tracks whether the end-of-auction
/// notifications for an ended auction have been delivered yet.
#[derive(Debug)]
struct Versioned {
    auction: Auction,
    version: u64,
    closed_dispatched: bool,
}

/// Single source of truth for auction price state. Every mutation goes
/// through [`AuctionStore::update`], a compare-and-set keyed on the record
/// version: bid admission, the lifecycle sweep and the order handoff all
/// share the same commit primitive, so their writes to one auction are
/// serialized against each other while auctions never contend with one
/// another (each record has its own lock).
pub struct AuctionStore {
    entries: RwLock<HashMap<AuctionId, Arc<Mutex<Versioned>>>>,
}

impl Default for AuctionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuctionStore {
    pub fn new() -> Self {
        AuctionStore {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, auction: Auction) -> Result<(), Errors> {
        let mut entries = self.entries.write().unwrap();
        if entries.contains_key(&auction.auction_id) {
            return Err(Errors::AuctionAlreadyExists(auction.auction_id));
        }
        let closed_dispatched = auction.status != AuctionStatus::Active;
        entries.insert(
            auction.auction_id,
            Arc::new(Mutex::new(Versioned {
                auction,
                version: 0,
                closed_dispatched,
            })),
        );
        Ok(())
    }

    fn entry(&self, auction_id: AuctionId) -> Result<Arc<Mutex<Versioned>>, Errors> {
        self.entries
            .read()
            .unwrap()
            .get(&auction_id)
            .cloned()
            .ok_or(Errors::UnknownAuction(auction_id))
    }

    /// The current record and its version, for a later compare-and-set.
    pub fn snapshot(&self, auction_id: AuctionId) -> Result<(Auction, u64), Errors> {
        let entry = self.entry(auction_id)?;
        let guard = entry.lock().unwrap();
        Ok((guard.auction.clone(), guard.version))
    }

    /// Commit `next` if the record is still at `expected_version`, bumping
    /// the version; otherwise fail with `ConcurrencyConflict` and change
    /// nothing. `on_commit` runs inside the record's critical section, so
    /// anything published from it (ledger rows, broadcasts) observes commits
    /// in commit order.
    pub fn update(
        &self,
        auction_id: AuctionId,
        expected_version: u64,
        next: Auction,
        on_commit: impl FnOnce(&Auction),
    ) -> Result<Auction, Errors> {
        let entry = self.entry(auction_id)?;
        let mut guard = entry.lock().unwrap();
        if guard.version != expected_version {
            return Err(Errors::ConcurrencyConflict(auction_id));
        }
        if guard.auction.status == AuctionStatus::Active && next.status == AuctionStatus::Ended {
            // freshly closed: end-of-auction fanout is still owed
            guard.closed_dispatched = false;
        }
        guard.auction = next;
        guard.version += 1;
        on_commit(&guard.auction);
        Ok(guard.auction.clone())
    }

    pub fn all(&self) -> Vec<Auction> {
        let entries = self.entries.read().unwrap();
        let mut auctions: Vec<Auction> = entries
            .values()
            .map(|entry| entry.lock().unwrap().auction.clone())
            .collect();
        auctions.sort_by_key(|a| a.auction_id);
        auctions
    }

    /// Auctions still marked active whose end time has passed.
    pub fn due_for_close(&self, now: DateTime<Utc>) -> Vec<(Auction, u64)> {
        let entries = self.entries.read().unwrap();
        let mut due = Vec::new();
        for entry in entries.values() {
            let guard = entry.lock().unwrap();
            if guard.auction.status == AuctionStatus::Active && guard.auction.has_ended(now) {
                due.push((guard.auction.clone(), guard.version));
            }
        }
        due.sort_by_key(|(a, _)| a.auction_id);
        due
    }

    /// Closed auctions whose end-of-auction notifications have not been
    /// confirmed delivered. Includes sold auctions: a sale can land before
    /// the sweep got around to dispatching the closure.
    pub fn undispatched_closures(&self) -> Vec<Auction> {
        let entries = self.entries.read().unwrap();
        let mut pending = Vec::new();
        for entry in entries.values() {
            let guard = entry.lock().unwrap();
            if guard.auction.status != AuctionStatus::Active && !guard.closed_dispatched {
                pending.push(guard.auction.clone());
            }
        }
        pending.sort_by_key(|a| a.auction_id);
        pending
    }

    /// Record that the closure fanout for this auction went out. Not a
    /// version bump: the auction itself did not change.
    pub fn mark_closure_dispatched(&self, auction_id: AuctionId) {
        if let Ok(entry) = self.entry(auction_id) {
            entry.lock().unwrap().closed_dispatched = true;
        }
    }

    /// Replace the whole store with a persisted snapshot. Restored non-active
    /// auctions are assumed to have had their closure dispatched.
    pub fn restore(&self, auctions: Vec<Auction>) {
        let mut entries = self.entries.write().unwrap();
        entries.clear();
        for auction in auctions {
            let closed_dispatched = auction.status != AuctionStatus::Active;
            entries.insert(
                auction.auction_id,
                Arc::new(Mutex::new(Versioned {
                    auction,
                    version: 0,
                    closed_dispatched,
                })),
            );
        }
    }
}
