//! waitlistd - waitlist signup and position-ranking server.
//!
//! Visitors join a waitlist, receive a queue position and a referral code,
//! and climb the list by referring others. This library exposes the core
//! ranking engine for the server binary and for tests.

pub mod config;
pub mod http;
pub mod telemetry;
pub mod waitlist;
