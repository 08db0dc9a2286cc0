// src/web/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Auction, AuctionId, Errors, Order, OrderStatus, ShippingAddress, User};
use crate::handoff::{PaymentConfirmation, PaymentOutcome};
use crate::money::{Amount, AmountValue, Currency};

/// Error body returned for every rejected request. `errorKind` is the stable
/// machine tag; a rejected bid additionally carries the minimum the caller
/// would have to offer.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(rename = "errorKind")]
    pub error_kind: String,
    pub message: String,
    #[serde(rename = "minimumRequired", skip_serializing_if = "Option::is_none")]
    pub minimum_required: Option<AmountValue>,
}

impl From<&Errors> for ApiError {
    fn from(err: &Errors) -> Self {
        let minimum_required = match err {
            Errors::BidTooLow { minimum } => Some(minimum.value()),
            _ => None,
        };
        ApiError {
            error_kind: err.kind().to_string(),
            message: err.to_string(),
            minimum_required,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BidRequest {
    #[serde(rename = "auctionId")]
    pub auction_id: AuctionId,
    pub amount: AmountValue,
    /// Defaults to the marketplace currency when omitted.
    pub currency: Option<Currency>,
}

impl BidRequest {
    pub fn bid_amount(&self) -> Amount {
        Amount::new(self.currency.unwrap_or(Currency::INR), self.amount)
    }
}

/// Catalog-facing: the listing service publishes an auction through this.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublishAuctionRequest {
    pub id: AuctionId,
    pub title: String,
    #[serde(rename = "startingPrice")]
    pub starting_price: AmountValue,
    #[serde(rename = "minimumIncrement")]
    pub minimum_increment: AmountValue,
    #[serde(rename = "endsAt")]
    pub ends_at: DateTime<Utc>,
    pub currency: Option<Currency>,
}

impl PublishAuctionRequest {
    pub fn to_auction(&self, seller: User) -> Auction {
        let currency = self.currency.unwrap_or(Currency::INR);
        Auction::published(
            self.id,
            self.title.clone(),
            seller,
            Amount::new(currency, self.starting_price),
            Amount::new(currency, self.minimum_increment),
            self.ends_at,
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfirmPaymentRequest {
    #[serde(rename = "auctionId")]
    pub auction_id: AuctionId,
    #[serde(rename = "transactionRef")]
    pub transaction_ref: String,
    pub amount: AmountValue,
    pub address: ShippingAddress,
}

impl From<ConfirmPaymentRequest> for PaymentConfirmation {
    fn from(req: ConfirmPaymentRequest) -> Self {
        PaymentConfirmation {
            auction_id: req.auction_id,
            transaction_ref: req.transaction_ref,
            amount: req.amount,
            address: req.address,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub order: Order,
    #[serde(rename = "alreadyProcessed")]
    pub already_processed: bool,
}

impl From<PaymentOutcome> for PaymentResponse {
    fn from(outcome: PaymentOutcome) -> Self {
        PaymentResponse {
            order: outcome.order,
            already_processed: outcome.already_processed,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderStatusRequest {
    pub status: OrderStatus,
}
