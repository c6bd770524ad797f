//! Utility modules supporting the search client.
//!
//! - [`HttpClient`]: shared `reqwest` client carrying the user agent and timeouts

mod http;

pub use http::{HttpClient, DEFAULT_USER_AGENT};
