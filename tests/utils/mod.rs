#![allow(dead_code)]
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use auction_house::domain::{Auction, User};
use auction_house::money::{Amount, AmountValue, Currency};
use auction_house::services::Services;

// Sample data for tests

pub fn sample_auction_id() -> i64 {
    1
}

pub fn sample_title() -> String {
    "Vintage camera".to_string()
}

pub fn sample_ends_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 1, 8, 28, 0).unwrap()
}

pub fn sample_bid_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 8, 28, 0).unwrap()
}

pub fn after_end() -> DateTime<Utc> {
    sample_ends_at() + Duration::seconds(1)
}

pub fn sample_seller() -> User {
    User::BuyerOrSeller {
        user_id: "Sample_Seller".to_string(),
        name: "Seller".to_string(),
    }
}

pub fn buyer_1() -> User {
    User::BuyerOrSeller {
        user_id: "Buyer_1".to_string(),
        name: "Buyer 1".to_string(),
    }
}

pub fn buyer_2() -> User {
    User::BuyerOrSeller {
        user_id: "Buyer_2".to_string(),
        name: "Buyer 2".to_string(),
    }
}

pub fn buyer_3() -> User {
    User::BuyerOrSeller {
        user_id: "Buyer_3".to_string(),
        name: "Buyer 3".to_string(),
    }
}

pub fn support_user() -> User {
    User::Support {
        user_id: "Support_1".to_string(),
    }
}

pub fn inr(value: AmountValue) -> Amount {
    Amount::new(Currency::INR, value)
}

/// Starts at 100, every raise at least 50.
pub fn sample_auction() -> Auction {
    Auction::published(
        sample_auction_id(),
        sample_title(),
        sample_seller(),
        inr(100),
        inr(50),
        sample_ends_at(),
    )
}

pub fn services() -> Arc<Services> {
    Services::with_defaults()
}

pub fn services_with_auction() -> Arc<Services> {
    let services = Services::with_defaults();
    services.auctions.insert(sample_auction()).unwrap();
    services
}
