//! Client library for SearchChat.
//!
//! Provides the HTTP client for the SearchChat server and the client-side
//! chat session that owns the transcript between turns.

pub mod error;
pub mod http;
pub mod session;

pub use error::ClientError;
pub use http::HttpClient;
pub use session::{ChatSession, DisplayMessage};
