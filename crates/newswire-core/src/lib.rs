//! # newswire-core
//!
//! Domain types for the news fan-out service.
//!
//! - `NewsItem`: the broadcast payload
//! - `HistoryBuffer`: bounded FIFO log with monotonic, never-reused ids
//! - Wire protocol envelopes for the `WebSocket` surface

#![deny(unsafe_code)]

pub mod history;
pub mod news;
pub mod protocol;

pub use history::{DEFAULT_MAX_HISTORY, HistoryBuffer};
pub use news::NewsItem;
pub use protocol::{InboundMessage, ServerMessage};
