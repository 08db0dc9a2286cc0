use auction_house::bidding::place_bid;
use auction_house::domain::{AuctionStatus, Errors, NotificationKind};
use auction_house::email::EmailSender;
use auction_house::fanout::{Channel, RealtimeEvent};
use auction_house::payment::DemoGateway;
use auction_house::services::Services;
use auction_house::sweeper::sweep_once;

mod utils;
use utils::*;

fn won_notifications(services: &Services, user: &str) -> Vec<NotificationKind> {
    services
        .fanout
        .notifications()
        .for_user(&user.to_string())
        .into_iter()
        .map(|n| n.kind)
        .collect()
}

#[test]
fn due_auction_closes_and_notifies_winner_and_seller() {
    let services = services_with_auction();
    let id = sample_auction_id();
    place_bid(&services, &buyer_1(), id, inr(100), sample_bid_time()).unwrap();

    let closed = sweep_once(&services, after_end());
    assert_eq!(closed, 1);

    let (auction, _) = services.auctions.snapshot(id).unwrap();
    assert_eq!(auction.status, AuctionStatus::Ended);
    assert_eq!(auction.winner.as_deref(), Some("Buyer_1"));

    assert_eq!(
        won_notifications(&services, "Buyer_1"),
        vec![NotificationKind::AuctionWon]
    );
    assert_eq!(
        won_notifications(&services, "Sample_Seller"),
        vec![NotificationKind::AuctionEnded]
    );
}

#[test]
fn sweep_is_idempotent_across_cycles() {
    let services = services_with_auction();
    let id = sample_auction_id();
    place_bid(&services, &buyer_1(), id, inr(100), sample_bid_time()).unwrap();

    assert_eq!(sweep_once(&services, after_end()), 1);
    assert_eq!(sweep_once(&services, after_end()), 0);
    assert_eq!(sweep_once(&services, after_end()), 0);

    // Exactly one auction_won and one auction_ended, ever
    assert_eq!(won_notifications(&services, "Buyer_1").len(), 1);
    assert_eq!(won_notifications(&services, "Sample_Seller").len(), 1);
}

#[test]
fn auction_without_bids_notifies_the_seller_only() {
    let services = services_with_auction();

    sweep_once(&services, after_end());

    let seller_rows = services
        .fanout
        .notifications()
        .for_user(&"Sample_Seller".to_string());
    assert_eq!(seller_rows.len(), 1);
    assert_eq!(seller_rows[0].kind, NotificationKind::AuctionEnded);
    assert!(seller_rows[0].message.contains("no bids"));

    // Nobody won anything
    assert_eq!(services.fanout.notifications().all().len(), 1);
}

#[test]
fn sweep_leaves_running_auctions_alone() {
    let services = services_with_auction();

    assert_eq!(sweep_once(&services, sample_bid_time()), 0);

    let (auction, _) = services.auctions.snapshot(sample_auction_id()).unwrap();
    assert_eq!(auction.status, AuctionStatus::Active);
    assert!(services.fanout.notifications().all().is_empty());
}

struct DownMailer;

impl EmailSender for DownMailer {
    fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), Errors> {
        Err(Errors::UpstreamUnavailable("mail relay is down".to_string()))
    }
}

#[test]
fn email_failure_does_not_roll_back_the_closure() {
    let services = Services::new(Box::new(DemoGateway), Box::new(DownMailer), 16);
    services.auctions.insert(sample_auction()).unwrap();
    let id = sample_auction_id();
    place_bid(&services, &buyer_1(), id, inr(100), sample_bid_time()).unwrap();

    assert_eq!(sweep_once(&services, after_end()), 1);

    let (auction, _) = services.auctions.snapshot(id).unwrap();
    assert_eq!(auction.status, AuctionStatus::Ended);
    // Durable notifications went out even though the email did not
    assert_eq!(won_notifications(&services, "Buyer_1").len(), 1);

    // And the next cycle does not replay the dispatch
    assert_eq!(sweep_once(&services, after_end()), 0);
    assert_eq!(won_notifications(&services, "Buyer_1").len(), 1);
}

#[test]
fn lazily_closed_auction_gets_its_fanout_on_the_next_sweep() {
    let services = services_with_auction();
    let id = sample_auction_id();
    place_bid(&services, &buyer_1(), id, inr(100), sample_bid_time()).unwrap();

    // A late bid closes the auction before any sweep ran
    let err = place_bid(&services, &buyer_2(), id, inr(150), after_end()).unwrap_err();
    assert_eq!(err, Errors::AuctionClosed(id));
    let (auction, _) = services.auctions.snapshot(id).unwrap();
    assert_eq!(auction.status, AuctionStatus::Ended);
    assert!(services.fanout.notifications().all().is_empty());

    // No auction is due anymore, but the closure fanout is still owed
    assert_eq!(sweep_once(&services, after_end()), 0);
    assert_eq!(
        won_notifications(&services, "Buyer_1"),
        vec![NotificationKind::AuctionWon]
    );
    assert_eq!(
        won_notifications(&services, "Sample_Seller"),
        vec![NotificationKind::AuctionEnded]
    );
}

#[test]
fn closure_broadcast_carries_the_winner_and_follows_bid_updates() {
    let services = services_with_auction();
    let id = sample_auction_id();
    let mut rx = services.fanout.subscribe(Channel::Auction(id));

    place_bid(&services, &buyer_1(), id, inr(100), sample_bid_time()).unwrap();
    place_bid(&services, &buyer_2(), id, inr(150), sample_bid_time()).unwrap();
    sweep_once(&services, after_end());

    match rx.try_recv().unwrap() {
        RealtimeEvent::BidUpdate { current_bid, .. } => assert_eq!(current_bid, 100),
        other => panic!("expected bid_update, got {:?}", other),
    }
    match rx.try_recv().unwrap() {
        RealtimeEvent::BidUpdate { current_bid, .. } => assert_eq!(current_bid, 150),
        other => panic!("expected bid_update, got {:?}", other),
    }
    match rx.try_recv().unwrap() {
        RealtimeEvent::AuctionEnded { winner, .. } => {
            assert_eq!(winner.as_deref(), Some("Buyer_2"))
        }
        other => panic!("expected auction_ended, got {:?}", other),
    }
}
