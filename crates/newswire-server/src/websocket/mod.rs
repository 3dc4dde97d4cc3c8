//! WebSocket subscriber registry, news fan-out, message dispatch, and session lifecycle.

pub mod broadcast;
pub mod handler;
pub mod session;
pub mod subscriber;
