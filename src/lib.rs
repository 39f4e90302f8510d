// src/lib.rs

//! Content Client Library
//!
//! Typed REST clients, retrying error handling and caching stores for the
//! organization's content backend (events, news, services, research,
//! newsletter and inquiries).

pub mod client;
pub mod error;
pub mod models;
pub mod resilience;
pub mod store;
