// src/web/app.rs
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer, Result};
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use log::info;
use serde_json::Value;
use std::sync::Arc;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use uuid::Uuid;

use crate::bidding;
use crate::config::AppConfig;
use crate::domain::{AuctionId, Errors, User};
use crate::email::LogMailer;
use crate::fanout::{Channel, RealtimeEvent};
use crate::handoff;
use crate::payment::DemoGateway;
use crate::persistence::json_file;
use crate::services::Services;
use crate::sweeper::Sweeper;

use super::types::{
    ApiError, BidRequest, ConfirmPaymentRequest, OrderStatusRequest, PaymentResponse,
    PublishAuctionRequest,
};

// Read x-jwt-payload header and extract user information
fn get_auth_user(req: &HttpRequest) -> Option<User> {
    let auth_header = req.headers().get("x-jwt-payload")?;
    let auth_str = auth_header.to_str().ok()?;

    // Decode base64
    let decoded = general_purpose::STANDARD.decode(auth_str).ok()?;
    let json_str = String::from_utf8(decoded).ok()?;

    // Parse JSON
    let json: Value = serde_json::from_str(&json_str).ok()?;

    // Extract user fields
    let sub = json.get("sub")?.as_str()?;
    let u_typ = json.get("u_typ")?.as_str()?;

    if u_typ == "0" {
        let name = json.get("name")?.as_str()?;
        Some(User::BuyerOrSeller {
            user_id: sub.to_string(),
            name: name.to_string(),
        })
    } else if u_typ == "1" {
        Some(User::Support {
            user_id: sub.to_string(),
        })
    } else {
        None
    }
}

// Middleware to require authentication
async fn with_auth<F>(req: HttpRequest, f: F) -> Result<HttpResponse>
where
    F: FnOnce(User) -> Result<HttpResponse>,
{
    match get_auth_user(&req) {
        Some(user) => f(user),
        None => Ok(HttpResponse::Unauthorized().body("Unauthorized")),
    }
}

fn error_response(err: &Errors) -> HttpResponse {
    use actix_web::http::StatusCode;

    let status = match err {
        Errors::UnknownAuction(_) | Errors::UnknownOrder(_) | Errors::UnknownNotification(_) => {
            StatusCode::NOT_FOUND
        }
        Errors::NotWinner(_) | Errors::NotYourOrder(_) => StatusCode::FORBIDDEN,
        Errors::ConcurrencyConflict(_) => StatusCode::CONFLICT,
        Errors::PaymentDeclined(_) => StatusCode::PAYMENT_REQUIRED,
        Errors::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::BAD_REQUEST,
    };

    HttpResponse::build(status).json(ApiError::from(err))
}

// Publish a listing as a biddable auction (called by the catalog side)
async fn publish_auction(
    req: HttpRequest,
    body: web::Json<PublishAuctionRequest>,
    data: web::Data<Services>,
) -> Result<HttpResponse> {
    with_auth(req, |user| {
        // a zero increment would let equal bids tie for the win
        if body.starting_price <= 0 || body.minimum_increment <= 0 {
            return Ok(HttpResponse::BadRequest().json(ApiError {
                error_kind: "invalid_listing".to_string(),
                message: "starting price and minimum increment must be positive".to_string(),
                minimum_required: None,
            }));
        }
        let auction = body.to_auction(user);
        match data.auctions.insert(auction.clone()) {
            Ok(()) => Ok(HttpResponse::Created().json(auction)),
            Err(err) => Ok(error_response(&err)),
        }
    })
    .await
}

// Get all auctions
async fn get_auctions(data: web::Data<Services>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(data.auctions.all()))
}

// Get auction by ID
async fn get_auction(
    path: web::Path<AuctionId>,
    data: web::Data<Services>,
) -> Result<HttpResponse> {
    match data.auctions.snapshot(path.into_inner()) {
        Ok((auction, _)) => Ok(HttpResponse::Ok().json(auction)),
        Err(err) => Ok(error_response(&err)),
    }
}

// Place a bid
async fn place_bid(
    req: HttpRequest,
    body: web::Json<BidRequest>,
    data: web::Data<Services>,
) -> Result<HttpResponse> {
    with_auth(req, |user| {
        match bidding::place_bid(
            &data,
            &user,
            body.auction_id,
            body.bid_amount(),
            Utc::now(),
        ) {
            Ok(bid) => Ok(HttpResponse::Created().json(bid)),
            Err(err) => Ok(error_response(&err)),
        }
    })
    .await
}

// Bid history for an auction, highest first
async fn get_bid_history(
    path: web::Path<AuctionId>,
    data: web::Data<Services>,
) -> Result<HttpResponse> {
    let auction_id = path.into_inner();
    match data.auctions.snapshot(auction_id) {
        Ok(_) => Ok(HttpResponse::Ok().json(data.ledger.history(auction_id))),
        Err(err) => Ok(error_response(&err)),
    }
}

// Confirm a payment and create the order (idempotent)
async fn confirm_payment(
    req: HttpRequest,
    body: web::Json<ConfirmPaymentRequest>,
    data: web::Data<Services>,
) -> Result<HttpResponse> {
    with_auth(req, |user| {
        match handoff::confirm_payment(&data, &user, body.into_inner().into(), Utc::now()) {
            Ok(outcome) => Ok(HttpResponse::Ok().json(PaymentResponse::from(outcome))),
            Err(err) => Ok(error_response(&err)),
        }
    })
    .await
}

// Seller-side order progression
async fn update_order_status(
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<OrderStatusRequest>,
    data: web::Data<Services>,
) -> Result<HttpResponse> {
    with_auth(req, |user| {
        match handoff::update_order_status(&data, &user, path.into_inner(), body.status, Utc::now())
        {
            Ok(order) => Ok(HttpResponse::Ok().json(order)),
            Err(err) => Ok(error_response(&err)),
        }
    })
    .await
}

// Orders where the caller is the buyer
async fn my_orders(req: HttpRequest, data: web::Data<Services>) -> Result<HttpResponse> {
    with_auth(req, |user| {
        Ok(HttpResponse::Ok().json(data.orders.for_buyer(user.user_id())))
    })
    .await
}

// Orders where the caller is the seller
async fn my_sales(req: HttpRequest, data: web::Data<Services>) -> Result<HttpResponse> {
    with_auth(req, |user| {
        Ok(HttpResponse::Ok().json(data.orders.for_seller(user.user_id())))
    })
    .await
}

// The caller's notifications, newest first
async fn get_notifications(req: HttpRequest, data: web::Data<Services>) -> Result<HttpResponse> {
    with_auth(req, |user| {
        Ok(HttpResponse::Ok().json(data.fanout.notifications().for_user(user.user_id())))
    })
    .await
}

// Mark one notification as read
async fn mark_notification_read(
    req: HttpRequest,
    path: web::Path<Uuid>,
    data: web::Data<Services>,
) -> Result<HttpResponse> {
    with_auth(req, |user| {
        match data.fanout.mark_read(path.into_inner(), user.user_id()) {
            Ok(notification) => Ok(HttpResponse::Ok().json(notification)),
            Err(err) => Ok(error_response(&err)),
        }
    })
    .await
}

fn event_chunk(
    event: std::result::Result<RealtimeEvent, BroadcastStreamRecvError>,
) -> std::result::Result<web::Bytes, std::convert::Infallible> {
    match event {
        Ok(event) => match serde_json::to_string(&event) {
            Ok(json) => Ok(web::Bytes::from(format!("data: {}\n\n", json))),
            Err(_) => Ok(web::Bytes::from_static(b": skipped\n\n")),
        },
        // a lagged subscriber just misses events; keep the stream alive
        Err(BroadcastStreamRecvError::Lagged(_)) => Ok(web::Bytes::from_static(b": lagged\n\n")),
    }
}

fn sse_response(rx: tokio::sync::broadcast::Receiver<RealtimeEvent>) -> HttpResponse {
    let stream = BroadcastStream::new(rx).map(event_chunk);
    HttpResponse::Ok()
        .insert_header(("content-type", "text/event-stream"))
        .insert_header(("cache-control", "no-cache"))
        .streaming(stream)
}

// Join an auction's live channel (bid_update / auction_ended)
async fn auction_events(
    path: web::Path<AuctionId>,
    data: web::Data<Services>,
) -> Result<HttpResponse> {
    let auction_id = path.into_inner();
    match data.auctions.snapshot(auction_id) {
        Ok(_) => Ok(sse_response(data.fanout.subscribe(Channel::Auction(auction_id)))),
        Err(err) => Ok(error_response(&err)),
    }
}

// Join the caller's personal channel (notification / cart_update / sales_update)
async fn user_events(req: HttpRequest, data: web::Data<Services>) -> Result<HttpResponse> {
    with_auth(req, |user| {
        Ok(sse_response(
            data.fanout.subscribe(Channel::User(user.user_id().clone())),
        ))
    })
    .await
}

// Configure routes
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("")
            .route("/auctions", web::get().to(get_auctions))
            .route("/auctions", web::post().to(publish_auction))
            .route("/auctions/{id}", web::get().to(get_auction))
            .route("/auctions/{id}/bids", web::get().to(get_bid_history))
            .route("/auctions/{id}/events", web::get().to(auction_events))
            .route("/bids", web::post().to(place_bid))
            .route("/payments/confirm", web::post().to(confirm_payment))
            .route("/orders", web::get().to(my_orders))
            .route("/orders/sales", web::get().to(my_sales))
            .route("/orders/{id}/status", web::put().to(update_order_status))
            .route("/notifications", web::get().to(get_notifications))
            .route(
                "/notifications/{id}/read",
                web::put().to(mark_notification_read),
            )
            .route("/events", web::get().to(user_events)),
    );
}

// Main application
pub async fn run_app(config: AppConfig) -> std::io::Result<()> {
    let services = Services::new(
        Box::new(DemoGateway),
        Box::new(LogMailer),
        config.channel_capacity,
    );

    if let Some(path) = &config.data_file {
        match json_file::read_snapshot(path) {
            Ok(snapshot) => {
                services.restore(snapshot);
                info!("Restored stores from {}", path);
            }
            Err(e) => info!("No snapshot restored from {}: {}", path, e),
        }
    }

    Sweeper::new(Arc::clone(&services), config.sweep_interval).spawn();

    let data = web::Data::from(services);

    info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(Logger::default())
            .configure(configure_app)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}
