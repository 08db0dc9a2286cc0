// src/persistence/json_file.rs
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Auction, Bid, Notification, Order};

/// Serialisable image of all four stores, written as one JSON document.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub auctions: Vec<Auction>,
    pub bids: Vec<Bid>,
    pub notifications: Vec<Notification>,
    pub orders: Vec<Order>,
}

pub fn read_snapshot<P: AsRef<Path>>(path: P) -> Result<StoreSnapshot, String> {
    let file = File::open(path).map_err(|e| format!("Failed to open file: {}", e))?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|e| format!("Failed to parse snapshot: {}", e))
}

pub fn write_snapshot<P: AsRef<Path>>(path: P, snapshot: &StoreSnapshot) -> Result<(), String> {
    let file = File::create(path).map_err(|e| format!("Failed to open file for writing: {}", e))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer(&mut writer, snapshot)
        .map_err(|e| format!("Failed to serialize snapshot: {}", e))?;

    writer
        .flush()
        .map_err(|e| format!("Failed to write to file: {}", e))
}
