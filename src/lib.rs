// src/lib.rs
pub mod bidding;
pub mod config;
pub mod domain;
pub mod email;
pub mod fanout;
pub mod handoff;
pub mod money;
pub mod payment;
pub mod persistence;
pub mod services;
pub mod store;
pub mod sweeper;
pub mod web;

pub use domain::*;
pub use money::*;
