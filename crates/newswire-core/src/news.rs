//! News item payload.

use serde::{Deserialize, Serialize};

/// Category assigned when a producer omits one.
pub const DEFAULT_CATEGORY: &str = "general";

/// A single published news item.
///
/// Items are immutable once created; subscribers receive clones.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Monotonically increasing id, assigned at insertion (1-based).
    pub id: u64,
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Producer-supplied category (default `"general"`).
    pub category: String,
    /// RFC 3339 creation timestamp.
    pub timestamp: String,
}
