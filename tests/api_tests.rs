use std::sync::Arc;

use actix_web::{test, web, App};
use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use auction_house::bidding::place_bid;
use auction_house::domain::Auction;
use auction_house::services::Services;
use auction_house::sweeper::sweep_once;
use auction_house::web::app::configure_app;

mod utils;
use utils::*;

fn jwt_payload(sub: &str, name: &str) -> (&'static str, String) {
    let payload = json!({ "sub": sub, "u_typ": "0", "name": name }).to_string();
    ("x-jwt-payload", general_purpose::STANDARD.encode(payload))
}

/// The HTTP layer stamps bids with the real clock, so auctions driven over
/// the API must end in the actual future.
fn live_auction_services() -> Arc<Services> {
    let services = services();
    let auction = Auction::published(
        sample_auction_id(),
        sample_title(),
        sample_seller(),
        inr(100),
        inr(50),
        Utc::now() + Duration::days(1),
    );
    services.auctions.insert(auction).unwrap();
    services
}

macro_rules! app {
    ($services:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::from(Arc::clone(&$services)))
                .configure(configure_app),
        )
        .await
    };
}

#[actix_web::test]
async fn publish_then_bid_round_trip() {
    let services = services();
    let app = app!(services);

    let ends_at = Utc::now() + Duration::days(1);
    let req = test::TestRequest::post()
        .uri("/auctions")
        .insert_header(jwt_payload("Sample_Seller", "Seller"))
        .set_json(json!({
            "id": 1,
            "title": "Vintage camera",
            "startingPrice": 100,
            "minimumIncrement": 50,
            "endsAt": ends_at.to_rfc3339(),
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let req = test::TestRequest::post()
        .uri("/bids")
        .insert_header(jwt_payload("Buyer_1", "Buyer 1"))
        .set_json(json!({ "auctionId": 1, "amount": 100 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let bid: Value = test::read_body_json(resp).await;
    assert_eq!(bid["auctionId"], 1);
    assert_eq!(bid["amount"], "INR100");
    assert_eq!(bid["bidder"], "BuyerOrSeller|Buyer_1|Buyer 1");

    let req = test::TestRequest::get().uri("/auctions/1").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let auction: Value = test::read_body_json(resp).await;
    assert_eq!(auction["currentBid"], 100);
    assert_eq!(auction["bidCount"], 1);
    assert_eq!(auction["status"], "active");
    assert_eq!(auction["winner"], "Buyer_1");
}

#[actix_web::test]
async fn listings_with_a_zero_increment_are_rejected() {
    let services = services();
    let app = app!(services);

    let req = test::TestRequest::post()
        .uri("/auctions")
        .insert_header(jwt_payload("Sample_Seller", "Seller"))
        .set_json(json!({
            "id": 1,
            "title": "Vintage camera",
            "startingPrice": 100,
            "minimumIncrement": 0,
            "endsAt": (Utc::now() + Duration::days(1)).to_rfc3339(),
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errorKind"], "invalid_listing");
}

#[actix_web::test]
async fn rejected_bid_reports_kind_and_minimum() {
    let services = live_auction_services();
    let app = app!(services);
    place_bid(
        &services,
        &buyer_1(),
        sample_auction_id(),
        inr(100),
        Utc::now(),
    )
    .unwrap();

    let req = test::TestRequest::post()
        .uri("/bids")
        .insert_header(jwt_payload("Buyer_2", "Buyer 2"))
        .set_json(json!({ "auctionId": 1, "amount": 140 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errorKind"], "bid_too_low");
    assert_eq!(body["minimumRequired"], 150);
}

#[actix_web::test]
async fn self_bid_and_unknown_auction_report_their_kinds() {
    let services = live_auction_services();
    let app = app!(services);

    let req = test::TestRequest::post()
        .uri("/bids")
        .insert_header(jwt_payload("Sample_Seller", "Seller"))
        .set_json(json!({ "auctionId": 1, "amount": 500 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errorKind"], "self_bid_forbidden");

    let req = test::TestRequest::post()
        .uri("/bids")
        .insert_header(jwt_payload("Buyer_1", "Buyer 1"))
        .set_json(json!({ "auctionId": 42, "amount": 500 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errorKind"], "not_found");
}

#[actix_web::test]
async fn bidding_requires_authentication() {
    let services = live_auction_services();
    let app = app!(services);

    let req = test::TestRequest::post()
        .uri("/bids")
        .set_json(json!({ "auctionId": 1, "amount": 100 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn bid_history_is_served_highest_first() {
    let services = live_auction_services();
    let app = app!(services);
    for (buyer, amount) in [(buyer_1(), 100), (buyer_2(), 150), (buyer_3(), 200)] {
        place_bid(
            &services,
            &buyer,
            sample_auction_id(),
            inr(amount),
            Utc::now(),
        )
        .unwrap();
    }

    let req = test::TestRequest::get().uri("/auctions/1/bids").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let bids: Value = test::read_body_json(resp).await;
    let amounts: Vec<&str> = bids
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["amount"].as_str().unwrap())
        .collect();
    assert_eq!(amounts, vec!["INR200", "INR150", "INR100"]);
}

fn sample_address_json() -> Value {
    json!({
        "street": "12 Harbour Lane",
        "city": "Mumbai",
        "state": "MH",
        "zipCode": "400001",
        "country": "India",
    })
}

#[actix_web::test]
async fn payment_confirmation_is_idempotent_over_http() {
    let services = live_auction_services();
    let app = app!(services);
    place_bid(
        &services,
        &buyer_1(),
        sample_auction_id(),
        inr(100),
        Utc::now(),
    )
    .unwrap();
    sweep_once(&services, Utc::now() + Duration::days(2));

    let body = json!({
        "auctionId": 1,
        "transactionRef": "demo_4711",
        "amount": 100,
        "address": sample_address_json(),
    });

    let req = test::TestRequest::post()
        .uri("/payments/confirm")
        .insert_header(jwt_payload("Buyer_1", "Buyer 1"))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let first: Value = test::read_body_json(resp).await;
    assert_eq!(first["alreadyProcessed"], false);
    assert_eq!(first["order"]["status"], "paid");
    assert_eq!(first["order"]["amount"], "INR100");

    let req = test::TestRequest::post()
        .uri("/payments/confirm")
        .insert_header(jwt_payload("Buyer_1", "Buyer 1"))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let second: Value = test::read_body_json(resp).await;
    assert_eq!(second["alreadyProcessed"], true);
    assert_eq!(second["order"]["id"], first["order"]["id"]);
}

#[actix_web::test]
async fn non_winner_confirmation_is_forbidden() {
    let services = live_auction_services();
    let app = app!(services);
    place_bid(
        &services,
        &buyer_1(),
        sample_auction_id(),
        inr(100),
        Utc::now(),
    )
    .unwrap();
    sweep_once(&services, Utc::now() + Duration::days(2));

    let req = test::TestRequest::post()
        .uri("/payments/confirm")
        .insert_header(jwt_payload("Buyer_2", "Buyer 2"))
        .set_json(json!({
            "auctionId": 1,
            "transactionRef": "demo_4711",
            "amount": 100,
            "address": sample_address_json(),
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errorKind"], "not_winner");
}

#[actix_web::test]
async fn notifications_can_be_listed_and_marked_read() {
    let services = live_auction_services();
    let app = app!(services);
    place_bid(
        &services,
        &buyer_1(),
        sample_auction_id(),
        inr(100),
        Utc::now(),
    )
    .unwrap();
    place_bid(
        &services,
        &buyer_2(),
        sample_auction_id(),
        inr(150),
        Utc::now(),
    )
    .unwrap();

    let req = test::TestRequest::get()
        .uri("/notifications")
        .insert_header(jwt_payload("Buyer_1", "Buyer 1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let rows: Value = test::read_body_json(resp).await;
    let rows = rows.as_array().unwrap().clone();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["type"], "outbid");
    assert_eq!(rows[0]["isRead"], false);

    let id = rows[0]["id"].as_str().unwrap();

    // Someone else cannot mark it
    let req = test::TestRequest::put()
        .uri(&format!("/notifications/{}/read", id))
        .insert_header(jwt_payload("Buyer_2", "Buyer 2"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    // The owner can
    let req = test::TestRequest::put()
        .uri(&format!("/notifications/{}/read", id))
        .insert_header(jwt_payload("Buyer_1", "Buyer 1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let row: Value = test::read_body_json(resp).await;
    assert_eq!(row["isRead"], true);
}
