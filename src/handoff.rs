// src/handoff.rs
use chrono::{DateTime, Utc};
use log::warn;

use crate::domain::{
    AuctionId, AuctionStatus, Errors, NotificationKind, Order, OrderId, OrderStatus,
    ShippingAddress, User,
};
use crate::fanout::{Channel, RealtimeEvent};
use crate::money::AmountValue;
use crate::services::Services;

/// A confirmed charge reported by the payment side, ready to become an
/// order.
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    pub auction_id: AuctionId,
    pub transaction_ref: String,
    pub amount: AmountValue,
    pub address: ShippingAddress,
}

#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    pub order: Order,
    /// True when this confirmation had already been processed and the
    /// existing order is being handed back (retried webhooks are safe).
    pub already_processed: bool,
}

/// Turn a closed, won auction plus a successful charge into an order,
/// exactly once. Duplicate confirmations return the existing order without
/// touching the processor again.
pub fn confirm_payment(
    services: &Services,
    buyer: &User,
    confirmation: PaymentConfirmation,
    now: DateTime<Utc>,
) -> Result<PaymentOutcome, Errors> {
    let auction_id = confirmation.auction_id;
    let (auction, _) = services.auctions.snapshot(auction_id)?;

    if auction.status == AuctionStatus::Active {
        return Err(Errors::AuctionNotEnded(auction_id));
    }
    if auction.winner.as_deref() != Some(buyer.user_id().as_str()) {
        return Err(Errors::NotWinner(buyer.user_id().clone()));
    }
    if confirmation.amount != auction.current_bid {
        return Err(Errors::WrongAmount {
            expected: auction.current_amount(),
        });
    }

    // idempotency before the charge: a retried webhook never pays twice
    if let Some(existing) = services.orders.active_for_auction(auction_id) {
        return Ok(PaymentOutcome {
            order: existing,
            already_processed: true,
        });
    }

    let amount = auction.current_amount();
    services
        .payment
        .charge(&confirmation.transaction_ref, &amount)?;

    let order = Order::paid(
        buyer.user_id().clone(),
        auction.seller.user_id().clone(),
        auction_id,
        amount,
        confirmation.transaction_ref,
        confirmation.address,
        now,
    );

    // the store arbitrates racing confirmations: exactly one row per auction
    let order = match services.orders.insert_or_existing(order) {
        Ok(inserted) => inserted,
        Err(existing) => {
            return Ok(PaymentOutcome {
                order: existing,
                already_processed: true,
            })
        }
    };

    mark_sold(services, auction_id);

    let seller = order.seller.clone();
    services.fanout.notify(
        &order.buyer,
        NotificationKind::PaymentSuccess,
        format!(
            "Payment successful for \"{}\". Your order is being processed.",
            auction.title
        ),
        Some(auction_id),
        now,
    );
    services.fanout.notify(
        &seller,
        NotificationKind::ItemSold,
        format!(
            "Good news! \"{}\" has been paid for by {}.",
            auction.title,
            buyer.display_name()
        ),
        Some(auction_id),
        now,
    );
    services
        .fanout
        .broadcast(&Channel::User(order.buyer.clone()), RealtimeEvent::CartUpdate);
    services
        .fanout
        .broadcast(&Channel::User(seller), RealtimeEvent::SalesUpdate);

    if let Err(e) = services.mailer.send(
        &order.buyer,
        "Order Confirmation",
        &format!(
            "Your payment for \"{}\" ({}) has been processed.",
            auction.title, order.amount
        ),
    ) {
        warn!("confirmation email for auction {} failed: {}", auction_id, e);
    }

    Ok(PaymentOutcome {
        order,
        already_processed: false,
    })
}

/// Flip ended -> sold through the shared commit primitive. Retried once on a
/// lost race; if the auction is no longer ended someone else already sold
/// it. The order exists at this point, so a persistent conflict is logged
/// rather than surfaced.
fn mark_sold(services: &Services, auction_id: AuctionId) {
    for _ in 0..2 {
        let (auction, version) = match services.auctions.snapshot(auction_id) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("auction {} vanished while marking sold: {}", auction_id, e);
                return;
            }
        };
        if auction.status != AuctionStatus::Ended {
            return;
        }
        let mut next = auction;
        next.status = AuctionStatus::Sold;
        match services.auctions.update(auction_id, version, next, |_| {}) {
            Ok(_) => return,
            Err(Errors::ConcurrencyConflict(_)) => continue,
            Err(e) => {
                warn!("could not mark auction {} sold: {}", auction_id, e);
                return;
            }
        }
    }
    warn!("auction {} still contended while marking sold", auction_id);
}

/// Seller-side order progression. The guard (order's seller or support) and
/// the timestamp stamping live in the store.
pub fn update_order_status(
    services: &Services,
    actor: &User,
    order_id: OrderId,
    status: OrderStatus,
    now: DateTime<Utc>,
) -> Result<Order, Errors> {
    services.orders.update_status(order_id, actor, status, now)
}
