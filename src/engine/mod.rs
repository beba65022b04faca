//! Runtime engine: the single-writer shoe session and the card capture pump.

pub mod capture;
pub mod session;

pub use capture::{pump, serve_feed, CardFeed, FeedEvent, FrameDiffer, LineFeed, PumpStats};
pub use session::{spawn_session, ShoeHandle};
