// src/domain/core.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::money::{Amount, Currency};

pub type UserId = String;
pub type AuctionId = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum User {
    BuyerOrSeller { user_id: UserId, name: String },
    Support { user_id: UserId },
}

impl User {
    pub fn user_id(&self) -> &UserId {
        match self {
            User::BuyerOrSeller { user_id, .. } => user_id,
            User::Support { user_id } => user_id,
        }
    }

    /// Support staff carry the elevated capability that exempts them from the
    /// ordinary marketplace restrictions (self-bid ban, seller-only order
    /// updates).
    pub fn is_support(&self) -> bool {
        matches!(self, User::Support { .. })
    }

    pub fn display_name(&self) -> &str {
        match self {
            User::BuyerOrSeller { name, .. } => name,
            User::Support { user_id } => user_id,
        }
    }
}

impl<'de> Deserialize<'de> for User {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        let parts: Vec<&str> = text.split('|').collect();

        match parts.as_slice() {
            ["BuyerOrSeller", user_id, name] => Ok(User::BuyerOrSeller {
                user_id: user_id.to_string(),
                name: name.to_string(),
            }),
            ["Support", user_id] => Ok(User::Support {
                user_id: user_id.to_string(),
            }),
            _ => Err(serde::de::Error::custom(format!(
                "parsing User failed, could not interpret values: {:?}",
                parts
            ))),
        }
    }
}

impl Serialize for User {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            User::BuyerOrSeller { user_id, name } => write!(f, "BuyerOrSeller|{}|{}", user_id, name),
            User::Support { user_id } => write!(f, "Support|{}", user_id),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Errors {
    #[error("Unknown auction: {0}")]
    UnknownAuction(AuctionId),

    #[error("Unknown order: {0}")]
    UnknownOrder(Uuid),

    #[error("Unknown notification: {0}")]
    UnknownNotification(Uuid),

    #[error("Auction already exists: {0}")]
    AuctionAlreadyExists(AuctionId),

    #[error("Auction is closed: {0}")]
    AuctionClosed(AuctionId),

    #[error("Auction has not ended yet: {0}")]
    AuctionNotEnded(AuctionId),

    #[error("Seller cannot place bids: {0:?}")]
    SellerCannotPlaceBids((UserId, AuctionId)),

    #[error("Minimum bid must be at least {minimum}")]
    BidTooLow { minimum: Amount },

    #[error("Auction is traded in {0}")]
    CurrencyMismatch(Currency),

    #[error("User is not the auction winner: {0}")]
    NotWinner(UserId),

    #[error("Payment must equal the winning bid: {expected}")]
    WrongAmount { expected: Amount },

    #[error("Only the order's seller may update it: {0}")]
    NotYourOrder(UserId),

    #[error("Lost a concurrent update on auction: {0}")]
    ConcurrencyConflict(AuctionId),

    #[error("Payment declined: {0}")]
    PaymentDeclined(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl Errors {
    /// Stable machine-readable tag, the `errorKind` field of API error
    /// bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Errors::UnknownAuction(_) | Errors::UnknownOrder(_) | Errors::UnknownNotification(_) => {
                "not_found"
            }
            Errors::AuctionAlreadyExists(_) => "already_exists",
            Errors::AuctionClosed(_) => "auction_closed",
            Errors::AuctionNotEnded(_) => "auction_not_ended",
            Errors::SellerCannotPlaceBids(_) => "self_bid_forbidden",
            Errors::BidTooLow { .. } => "bid_too_low",
            Errors::CurrencyMismatch(_) => "currency_mismatch",
            Errors::NotWinner(_) => "not_winner",
            Errors::WrongAmount { .. } => "wrong_amount",
            Errors::NotYourOrder(_) => "not_your_order",
            Errors::ConcurrencyConflict(_) => "concurrency_conflict",
            Errors::PaymentDeclined(_) => "payment_declined",
            Errors::UpstreamUnavailable(_) => "upstream_unavailable",
        }
    }
}
