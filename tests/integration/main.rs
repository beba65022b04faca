//! End-to-end tests for the shoe session, capture pump and dashboard.

mod mock_feed;
mod properties;
mod session_flow;
