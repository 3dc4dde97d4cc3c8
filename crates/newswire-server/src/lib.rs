//! # newswire-server
//!
//! Axum HTTP + `WebSocket` server and news fan-out.
//!
//! - HTTP endpoints: news submission, health check, stats, static assets
//! - `WebSocket` gateway: subscriber registry, heartbeat, message dispatch
//! - News broadcasting (fan-out to all connected subscribers)
//! - Graceful shutdown via `tokio::signal` + `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod health;
pub mod server;
pub mod shutdown;
pub mod websocket;
